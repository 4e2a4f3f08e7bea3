//! Windows for concrete node kinds.

use crate::config::EditorConfig;
use crate::editor::Command;
use crate::error::TreeError;
use crate::impl_window;
use crate::node_window::{CommitableNodeWindow, NodeBinding, NodeWindow};
use crate::surface::Surface;
use crate::window::{unique_label, Window, WindowCx};
use reqgraph_model::{NodeId, NodeKind};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug)]
enum Base {
    Plain(NodeWindow),
    Commitable(CommitableNodeWindow),
}

impl Base {
    fn window(&self) -> &dyn Window {
        match self {
            Base::Plain(window) => window,
            Base::Commitable(window) => window,
        }
    }

    fn window_mut(&mut self) -> &mut dyn Window {
        match self {
            Base::Plain(window) => window,
            Base::Commitable(window) => window,
        }
    }

    fn node_window(&self) -> &NodeWindow {
        match self {
            Base::Plain(window) => window,
            Base::Commitable(window) => window.base(),
        }
    }

    fn node_window_mut(&mut self) -> &mut NodeWindow {
        match self {
            Base::Plain(window) => window,
            Base::Commitable(window) => window.base_mut(),
        }
    }
}

/// Turns a field name like `target_date` into a caption like `Target Date:`.
fn caption(field: &str) -> String {
    let mut caption = field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    caption.push(':');
    caption
}

#[derive(Debug)]
struct FieldEditor {
    name: &'static str,
    caption: String,
    label: String,
    buffer: String,
}

#[derive(Debug)]
struct SaveAction {
    path: String,
    path_label: String,
    button_label: String,
}

/// A node window showing the text fields of its node’s kind.
///
/// Fields are read-only unless the window is editable. Commitable kinds get a commitable base
/// window.
#[derive(Debug)]
pub struct EntityWindow {
    kind: NodeKind,
    base: Base,
    fields: Vec<FieldEditor>,
    /// Set once the field buffers have been filled from the node.
    fields_loaded: bool,
    lock_follows_editable: bool,
    save: Option<SaveAction>,
}

impl EntityWindow {
    pub fn new(kind: NodeKind, config: &EditorConfig) -> EntityWindow {
        let base = if kind.is_commitable() {
            Base::Commitable(CommitableNodeWindow::new(kind, config))
        } else {
            Base::Plain(NodeWindow::new(kind, config))
        };
        let fields = kind
            .fields()
            .iter()
            .map(|name| FieldEditor {
                name: *name,
                caption: caption(name),
                label: unique_label(&format!("##{}", name)),
                buffer: String::new(),
            })
            .collect();

        EntityWindow {
            kind,
            base,
            fields,
            fields_loaded: false,
            lock_follows_editable: false,
            save: None,
        }
    }

    pub fn with_node(kind: NodeKind, node: NodeId, config: &EditorConfig) -> EntityWindow {
        let mut window = EntityWindow::new(kind, config);
        window.add_node(node);
        window
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.base.node_window_mut().add_node(node);
    }

    pub fn node(&self) -> Option<NodeId> {
        self.base.node_window().node()
    }

    pub fn node_window(&self) -> &NodeWindow {
        self.base.node_window()
    }

    pub fn node_window_mut(&mut self) -> &mut NodeWindow {
        self.base.node_window_mut()
    }

    pub fn commitable(&self) -> Option<&CommitableNodeWindow> {
        match &self.base {
            Base::Commitable(window) => Some(window),
            Base::Plain(_) => None,
        }
    }

    /// Always shows the editing checkbox and locks the node while editing is off.
    pub fn lock_follows_editable(&mut self) {
        self.lock_follows_editable = true;
    }

    /// Adds a button that saves the graph rooted at this window’s node to a file.
    pub fn enable_save(&mut self) {
        self.save = Some(SaveAction {
            path: String::new(),
            path_label: unique_label("File"),
            button_label: unique_label("Save"),
        });
    }

    pub fn can_save(&self) -> bool {
        self.save.is_some()
    }
}

impl_window! {
    EntityWindow;

    fn init(&mut self, cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
        self.base.window_mut().init(cx)
    }

    fn beginning(&mut self, cx: &mut WindowCx<'_>) -> Result<(), TreeError> {
        self.base.window_mut().beginning(cx)
    }

    fn body(&mut self, cx: &mut WindowCx<'_>, ui: &mut dyn Surface) {
        let node_id = match self.node() {
            Some(node) if cx.graph.contains(node) => node,
            _ => {
                ui.text(&format!("This {} window doesn't have a node", self.kind));
                ui.text("This should be impossible");
                return;
            }
        };

        if self.lock_follows_editable {
            self.base.node_window_mut().set_display_editable(true);
        }
        self.base.window_mut().body(cx, ui);

        let editable = self.base.node_window().is_editable();
        let node = match cx.graph.get_mut(node_id) {
            Some(node) => node,
            None => return,
        };
        if self.lock_follows_editable {
            if editable {
                node.unlock();
            } else {
                node.lock();
            }
        }

        let refresh = !editable || !self.fields_loaded;
        self.fields_loaded = true;
        for field in &mut self.fields {
            if refresh {
                field.buffer.clear();
                field.buffer.push_str(node.field(field.name).unwrap_or(""));
            }
            ui.text(&field.caption);
            if ui.input_text(&field.label, &mut field.buffer, !editable) {
                if let Err(err) = node.set_field(field.name, &field.buffer) {
                    debug!("couldn't edit {}: {}", field.name, err);
                }
            }
        }

        if let Some(save) = &mut self.save {
            ui.input_text(&save.path_label, &mut save.path, false);
            ui.same_line();
            if ui.button(&save.button_label) {
                if save.path.is_empty() {
                    debug!("no file to save to");
                } else {
                    cx.push(Command::SaveGraph {
                        root: node_id,
                        path: PathBuf::from(&save.path),
                    });
                }
            }
        }
    }

    fn binding(&self) -> Option<NodeBinding> {
        self.base.window().binding()
    }
}

#[test]
fn test_captions() {
    assert_eq!(caption("target_date_confidence"), "Target Date Confidence:");
    assert_eq!(caption("who"), "Who:");
}
