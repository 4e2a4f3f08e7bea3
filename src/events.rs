//! Window events.

use crate::widget::WidgetStore;
use crate::window::WindowId;
use cgmath::{Point2, Vector2};
use core::fmt;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Where a window is on screen; the payload of its moved and resized signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGeometry {
    pub window: WindowId,
    pub position: Point2<f64>,
    pub size: Vector2<f64>,
}

impl WindowGeometry {
    /// Converts an offset in window coordinates to screen coordinates.
    pub fn screen(&self, offset: Vector2<f64>) -> Point2<f64> {
        self.position + offset
    }
}

/// A signal handler.
///
/// Handlers get mutable access to the widget store so they can reposition widgets.
pub struct EventHandler<T>(Arc<Mutex<dyn FnMut(&mut WidgetStore, &T) + Send>>);

impl<T> Clone for EventHandler<T> {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl<T> EventHandler<T> {
    pub fn new<F: 'static + FnMut(&mut WidgetStore, &T) + Send>(handler: F) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    fn call(&self, widgets: &mut WidgetStore, event: &T) {
        let mut handler = self.0.lock();
        (&mut *handler)(widgets, event);
    }
}

impl<T> fmt::Debug for EventHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler")
    }
}

struct Handlers<T> {
    next_id: u64,
    list: Vec<(u64, EventHandler<T>)>,
}

/// A list of handlers that are called in subscription order.
///
/// Emitting works on a snapshot of the list, so handlers may subscribe and unsubscribe while the
/// signal is being emitted; changes apply to the next emission. A handler must not emit the
/// signal it is subscribed to.
pub struct Signal<T> {
    handlers: Arc<Mutex<Handlers<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Signal {
            handlers: Arc::clone(&self.handlers),
        }
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Signal<T> {
        Signal {
            handlers: Arc::new(Mutex::new(Handlers {
                next_id: 0,
                list: Vec::new(),
            })),
        }
    }

    /// Adds a handler. It stays subscribed until the returned subscription is dropped.
    pub fn subscribe<F: 'static + FnMut(&mut WidgetStore, &T) + Send>(
        &self,
        handler: F,
    ) -> Subscription {
        let id = {
            let mut handlers = self.handlers.lock();
            let id = handlers.next_id;
            handlers.next_id += 1;
            handlers.list.push((id, EventHandler::new(handler)));
            id
        };

        let weak: Weak<Mutex<Handlers<T>>> = Arc::downgrade(&self.handlers);
        Subscription {
            id,
            detach: Some(Box::new(move |id| {
                if let Some(handlers) = weak.upgrade() {
                    handlers.lock().list.retain(|(handler_id, _)| *handler_id != id);
                }
            })),
        }
    }

    /// Calls every handler with the event.
    pub fn emit(&self, widgets: &mut WidgetStore, event: &T) {
        let snapshot: Vec<EventHandler<T>> = self
            .handlers
            .lock()
            .list
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in snapshot {
            handler.call(widgets, event);
        }
    }

    /// Removes all handlers.
    pub fn clear(&self) {
        self.handlers.lock().list.clear();
    }

    /// Returns the number of subscribed handlers.
    pub fn len(&self) -> usize {
        self.handlers.lock().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Signal::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Signal({} handlers)", self.handlers.lock().list.len())
    }
}

/// A subscribed handler. Dropping it unsubscribes the handler.
#[must_use = "dropping a subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    detach: Option<Box<dyn FnOnce(u64) + Send>>,
}

impl Subscription {
    /// Unsubscribes the handler now. Emissions already in progress still call it.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keeps the handler subscribed for as long as the signal exists.
    pub fn forget(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Subscription({})", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers_run_in_order() {
        let signal = Signal::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let a = {
            let seen = Arc::clone(&seen);
            signal.subscribe(move |_, n: &u32| seen.lock().push(("a", *n)))
        };
        let b = {
            let seen = Arc::clone(&seen);
            signal.subscribe(move |_, n: &u32| seen.lock().push(("b", *n)))
        };

        signal.emit(&mut WidgetStore::default(), &1);
        assert_eq!(*seen.lock(), vec![("a", 1), ("b", 1)]);

        a.unsubscribe();
        signal.emit(&mut WidgetStore::default(), &2);
        assert_eq!(*seen.lock(), vec![("a", 1), ("b", 1), ("b", 2)]);
        drop(b);
        assert!(signal.is_empty());
    }

    #[test]
    fn test_subscribing_during_emit_applies_next_time() {
        let signal = Signal::<()>::new();
        let count = Arc::new(Mutex::new(0));
        let late = Arc::new(Mutex::new(Vec::new()));
        let _outer = {
            let signal2 = signal.clone();
            let count = Arc::clone(&count);
            let late = Arc::clone(&late);
            signal.subscribe(move |_, _| {
                let count = Arc::clone(&count);
                late.lock()
                    .push(signal2.subscribe(move |_, _| *count.lock() += 1));
            })
        };

        signal.emit(&mut WidgetStore::default(), &());
        assert_eq!(*count.lock(), 0);
        signal.emit(&mut WidgetStore::default(), &());
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_subscription_outliving_signal() {
        let signal = Signal::<()>::new();
        let subscription = signal.subscribe(|_, _| ());
        drop(signal);
        drop(subscription);
    }
}
