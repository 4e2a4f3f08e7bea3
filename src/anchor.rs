//! Node anchors: the connection points windows draw links between.
//!
//! A link between two nodes is recorded on both of the anchors it joins. Every anchor keys its
//! records by the remote node, so an anchor is linked to any given node at most once.

use crate::color::Color;
use crate::impl_widget;
use crate::rect::Rect;
use crate::surface::Layer;
use crate::widget::{Request, WidgetCx, WidgetId, WidgetStore};
use crate::window::{unique_label, WindowId};
use cgmath::{Point2, Vector2};
use reqgraph_model::{Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Which side of a window an anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorType {
    Unknown,
    Up,
    Down,
    Left,
    Right,
}

impl AnchorType {
    /// The only anchor type this one can connect to.
    pub fn complement(self) -> Option<AnchorType> {
        match self {
            AnchorType::Up => Some(AnchorType::Down),
            AnchorType::Down => Some(AnchorType::Up),
            AnchorType::Left => Some(AnchorType::Right),
            AnchorType::Right => Some(AnchorType::Left),
            AnchorType::Unknown => None,
        }
    }

    pub fn accepts(self, other: AnchorType) -> bool {
        self.complement() == Some(other)
    }

    /// Up and down anchors mirror the up/down adjacency of their nodes.
    pub fn is_vertical(self) -> bool {
        match self {
            AnchorType::Up | AnchorType::Down => true,
            AnchorType::Left | AnchorType::Right | AnchorType::Unknown => false,
        }
    }
}

/// One end of a link, as seen from the other end. Also the drag-and-drop payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub anchor: WidgetId,
    pub node: NodeId,
    pub anchor_type: AnchorType,
}

/// The payload of an ongoing anchor drag.
pub type DragPayload = Connection;

/// Holds the payload of the one drag that may be in flight.
#[derive(Debug, Default)]
pub struct DragSlot {
    payload: Option<DragPayload>,
}

impl DragSlot {
    /// Starts a drag. Fails if another drag is already in flight.
    pub fn claim(&mut self, payload: DragPayload) -> bool {
        if self.payload.is_some() {
            return false;
        }
        self.payload = Some(payload);
        true
    }

    /// Ends the drag and returns its payload.
    pub fn take(&mut self) -> Option<DragPayload> {
        self.payload.take()
    }

    pub fn peek(&self) -> Option<&DragPayload> {
        self.payload.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }
}

/// Why a link was not made or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{local:?} anchors can't link to {remote:?} anchors")]
    Incompatible {
        local: AnchorType,
        remote: AnchorType,
    },
    #[error("a node can't be linked to itself")]
    SelfLink,
    #[error("already linked to {0}")]
    AlreadyConnected(NodeId),
    #[error("not linked to {0}")]
    NotConnected(NodeId),
    #[error("no anchor {0:?}")]
    NoSuchAnchor(WidgetId),
    #[error("anchor {0:?} is not bound to that node")]
    Unbound(WidgetId),
    #[error("node {0} is not in the graph")]
    MissingNode(NodeId),
    #[error("node {0} is committed")]
    Committed(NodeId),
}

/// How anchors and their links look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorStyle {
    pub radius: f64,
    pub color: Color,
    pub hover_color: Color,
    pub link_color: Color,
    pub link_thickness: f64,
    /// Horizontal distance of the inner bezier control points from the endpoints.
    pub control_offset: f64,
}

impl Default for AnchorStyle {
    fn default() -> AnchorStyle {
        AnchorStyle {
            radius: 5.,
            color: Color::WHITE,
            hover_color: Color::RED,
            link_color: Color::WHITE,
            link_thickness: 2.,
            control_offset: 50.,
        }
    }
}

/// Control points of a link leaving and arriving horizontally.
pub fn curve(from: Point2<f64>, to: Point2<f64>, offset: f64) -> [Point2<f64>; 4] {
    let offset = Vector2::new(offset, 0.);
    [from, from + offset, to - offset, to]
}

/// A draggable connection point on a node window.
#[derive(Debug)]
pub struct NodeAnchor {
    label: String,
    parent: Option<WindowId>,
    anchor_type: AnchorType,
    node: Option<NodeId>,
    center: Point2<f64>,
    style: AnchorStyle,
    hovered: bool,
    dragging: bool,
    connections: HashMap<NodeId, Connection>,
}

impl NodeAnchor {
    pub fn new(label: &str, anchor_type: AnchorType, style: AnchorStyle) -> NodeAnchor {
        NodeAnchor {
            label: unique_label(label),
            parent: None,
            anchor_type,
            node: None,
            center: Point2::new(0., 0.),
            style,
            hovered: false,
            dragging: false,
            connections: HashMap::new(),
        }
    }

    /// Binds the anchor to a node. Unbound anchors pick up their window’s node when drawn.
    pub fn bind(&mut self, node: NodeId) {
        self.node = Some(node);
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn anchor_type(&self) -> AnchorType {
        self.anchor_type
    }

    pub fn center(&self) -> Point2<f64> {
        self.center
    }

    pub fn set_center(&mut self, center: Point2<f64>) {
        self.center = center;
    }

    /// The hit region. This is the whole square around the drawn circle.
    pub fn bounds(&self) -> Rect {
        Rect::around(self.center, self.style.radius)
    }

    pub fn style(&self) -> &AnchorStyle {
        &self.style
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection(&self, node: NodeId) -> Option<&Connection> {
        self.connections.get(&node)
    }

    pub fn is_connected_to(&self, node: NodeId) -> bool {
        self.connections.contains_key(&node)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn draw_connections(&self, cx: &mut WidgetCx<'_>) {
        for connection in self.connections.values() {
            let remote = match cx.peers.anchor(connection.anchor) {
                Some(remote) => remote.center,
                None => continue,
            };
            cx.surface.bezier(
                Layer::Foreground,
                curve(self.center, remote, self.style.control_offset),
                self.style.link_color,
                self.style.link_thickness,
            );
        }
    }
}

impl_widget! {
    NodeAnchor;

    fn set_parent(&mut self, parent: WindowId) {
        self.parent = Some(parent);
    }

    fn parent(&self) -> Option<WindowId> {
        self.parent
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn begin(&mut self, cx: &mut WidgetCx<'_>) {
        if self.node.is_none() {
            self.node = cx.parent_node;
        }

        self.draw_connections(cx);

        let interaction = cx.surface.interact(&self.label, self.bounds());
        self.hovered = interaction.hovered;

        if interaction.drag_source && !self.dragging {
            match self.node {
                Some(node) => {
                    let payload = Connection {
                        anchor: cx.id,
                        node,
                        anchor_type: self.anchor_type,
                    };
                    if cx.drag.claim(payload) {
                        trace!("started dragging from {}", self.label);
                        self.dragging = true;
                    }
                }
                None => debug!("anchor {} has no node to drag", self.label),
            }
        }

        if self.dragging {
            if cx.surface.is_pointer_dragging() {
                let pointer = cx.surface.pointer_pos();
                cx.surface.bezier(
                    Layer::Foreground,
                    curve(self.center, pointer, self.style.control_offset),
                    self.style.link_color,
                    self.style.link_thickness,
                );
            } else if !cx.surface.is_pointer_down() {
                self.dragging = false;
            }
        }

        if interaction.dropped {
            if let Some(dropped) = cx.drag.take() {
                if dropped.anchor == cx.id {
                    trace!("dropped {} onto itself", self.label);
                } else {
                    cx.request(Request::Toggle {
                        target: cx.id,
                        dropped,
                    });
                }
            }
        }

        let color = if self.hovered {
            self.style.hover_color
        } else {
            self.style.color
        };
        cx.surface
            .circle_filled(Layer::Window, self.center, self.style.radius, color);
    }

    fn detach(&mut self, id: WidgetId, peers: &mut WidgetStore) {
        let node = match self.node {
            Some(node) => node,
            None => return,
        };
        for connection in self.connections.values() {
            if let Some(peer) = peers.anchor_mut(connection.anchor) {
                let points_back = peer
                    .connections
                    .get(&node)
                    .map_or(false, |record| record.anchor == id);
                if points_back {
                    peer.connections.remove(&node);
                }
            }
        }
        self.connections.clear();
    }
}

/// Updates one node’s adjacency for a link through an anchor of the given type.
fn update_adjacency(
    graph: &mut Graph,
    node: NodeId,
    anchor_type: AnchorType,
    other: NodeId,
    linked: bool,
) {
    let node = match graph.get_mut(node) {
        Some(node) => node,
        None => return,
    };
    let result = match (anchor_type, linked) {
        (AnchorType::Up, true) => node.add_up(other),
        (AnchorType::Up, false) => node.remove_up(other),
        (AnchorType::Down, true) => node.add_down(other),
        (AnchorType::Down, false) => node.remove_down(other),
        _ => Ok(()),
    };
    if let Err(err) = result {
        warn!("couldn't update adjacency of {}: {}", node.id(), err);
    }
}

fn check_editable(graph: &Graph, nodes: [NodeId; 2]) -> Result<(), Rejection> {
    for id in nodes.iter() {
        let node = graph.get(*id).ok_or(Rejection::MissingNode(*id))?;
        if node.is_committed() {
            return Err(Rejection::Committed(*id));
        }
    }
    Ok(())
}

/// Links the `local` anchor with a remote anchor and records the link on both.
///
/// With `modify_node`, the up/down adjacency of both nodes is updated to match; links between
/// left and right anchors never touch adjacency.
pub fn establish(
    widgets: &mut WidgetStore,
    graph: &mut Graph,
    local: WidgetId,
    remote: Connection,
    modify_node: bool,
) -> Result<(), Rejection> {
    let result = try_establish(widgets, graph, local, remote, modify_node);
    match &result {
        Ok(()) => trace!("linked {:?} with {}", remote.anchor_type, remote.node),
        Err(rejection) => debug!("not linking with {}: {}", remote.node, rejection),
    }
    result
}

fn try_establish(
    widgets: &mut WidgetStore,
    graph: &mut Graph,
    local: WidgetId,
    remote: Connection,
    modify_node: bool,
) -> Result<(), Rejection> {
    let (local_node, local_type) = {
        let anchor = widgets
            .anchor(local)
            .ok_or(Rejection::NoSuchAnchor(local))?;
        let node = anchor.node.ok_or(Rejection::Unbound(local))?;
        if anchor.connections.contains_key(&remote.node) {
            return Err(Rejection::AlreadyConnected(remote.node));
        }
        (node, anchor.anchor_type)
    };

    if !local_type.accepts(remote.anchor_type) {
        return Err(Rejection::Incompatible {
            local: local_type,
            remote: remote.anchor_type,
        });
    }
    if local == remote.anchor || local_node == remote.node {
        return Err(Rejection::SelfLink);
    }

    {
        let peer = widgets
            .anchor(remote.anchor)
            .ok_or(Rejection::NoSuchAnchor(remote.anchor))?;
        if peer.node != Some(remote.node) {
            return Err(Rejection::Unbound(remote.anchor));
        }
        if peer.anchor_type != remote.anchor_type {
            return Err(Rejection::Incompatible {
                local: local_type,
                remote: peer.anchor_type,
            });
        }
    }

    if modify_node && local_type.is_vertical() {
        check_editable(graph, [local_node, remote.node])?;
    }

    if let Some(anchor) = widgets.anchor_mut(local) {
        anchor.connections.insert(remote.node, remote);
    }
    if let Some(peer) = widgets.anchor_mut(remote.anchor) {
        peer.connections.insert(
            local_node,
            Connection {
                anchor: local,
                node: local_node,
                anchor_type: local_type,
            },
        );
    }

    if modify_node {
        update_adjacency(graph, local_node, local_type, remote.node, true);
        update_adjacency(graph, remote.node, remote.anchor_type, local_node, true);
    }
    Ok(())
}

/// Removes the link between the `local` anchor and the remote node from both anchors.
pub fn remove_connection(
    widgets: &mut WidgetStore,
    graph: &mut Graph,
    local: WidgetId,
    remote: Connection,
    modify_node: bool,
) -> Result<(), Rejection> {
    let (local_node, local_type, record) = {
        let anchor = widgets
            .anchor(local)
            .ok_or(Rejection::NoSuchAnchor(local))?;
        let node = anchor.node.ok_or(Rejection::Unbound(local))?;
        let record = *anchor
            .connections
            .get(&remote.node)
            .ok_or(Rejection::NotConnected(remote.node))?;
        (node, anchor.anchor_type, record)
    };
    if !local_type.accepts(remote.anchor_type) {
        return Err(Rejection::Incompatible {
            local: local_type,
            remote: remote.anchor_type,
        });
    }

    if modify_node && local_type.is_vertical() {
        check_editable(graph, [local_node, record.node])?;
    }

    if let Some(anchor) = widgets.anchor_mut(local) {
        anchor.connections.remove(&record.node);
    }
    if let Some(peer) = widgets.anchor_mut(record.anchor) {
        let points_back = peer
            .connections
            .get(&local_node)
            .map_or(false, |back| back.anchor == local);
        if points_back {
            peer.connections.remove(&local_node);
        }
    }

    if modify_node {
        update_adjacency(graph, local_node, local_type, record.node, false);
        update_adjacency(graph, record.node, record.anchor_type, local_node, false);
    }
    debug!("unlinked {} from {}", local_node, record.node);
    Ok(())
}

/// Handles a drop onto the `local` anchor: unlinks if already linked to the dropped node,
/// links otherwise. Returns whether the two are linked afterwards.
///
/// A drop from an anchor of the wrong type changes nothing, even if the nodes are linked.
pub fn toggle(
    widgets: &mut WidgetStore,
    graph: &mut Graph,
    local: WidgetId,
    dropped: Connection,
) -> Result<bool, Rejection> {
    let anchor = widgets
        .anchor(local)
        .ok_or(Rejection::NoSuchAnchor(local))?;
    if !anchor.anchor_type.accepts(dropped.anchor_type) {
        return Err(Rejection::Incompatible {
            local: anchor.anchor_type,
            remote: dropped.anchor_type,
        });
    }
    let linked = anchor.is_connected_to(dropped.node);
    if linked {
        remove_connection(widgets, graph, local, dropped, true).map(|()| false)
    } else {
        establish(widgets, graph, local, dropped, true).map(|()| true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complements_are_symmetric() {
        let types = [
            AnchorType::Unknown,
            AnchorType::Up,
            AnchorType::Down,
            AnchorType::Left,
            AnchorType::Right,
        ];
        for a in types.iter() {
            for b in types.iter() {
                assert_eq!(a.accepts(*b), b.accepts(*a), "{:?} {:?}", a, b);
            }
            assert!(!a.accepts(*a));
        }
        assert!(AnchorType::Up.accepts(AnchorType::Down));
        assert!(AnchorType::Left.accepts(AnchorType::Right));
        assert!(!AnchorType::Up.accepts(AnchorType::Left));
    }

    #[test]
    fn test_drag_slot_holds_one_payload() {
        let mut slot = DragSlot::default();
        let first = Connection {
            anchor: WidgetId::new(),
            node: NodeId::new(),
            anchor_type: AnchorType::Up,
        };
        let second = Connection {
            anchor: WidgetId::new(),
            ..first
        };
        assert!(slot.claim(first));
        assert!(!slot.claim(second));
        assert_eq!(slot.take(), Some(first));
        assert_eq!(slot.take(), None);
        assert!(slot.claim(second));
    }

    #[test]
    fn test_curve_leaves_horizontally() {
        let points = curve(Point2::new(0., 0.), Point2::new(200., 100.), 50.);
        assert_eq!(points[1], Point2::new(50., 0.));
        assert_eq!(points[2], Point2::new(150., 100.));
    }
}
