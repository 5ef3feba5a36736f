//! Semantic chart events, decoupled from any backend's native event model.
//!
//! Charts forward three event names (click, hover-enter, hover-exit) to
//! caller callbacks. The rendering adapter translates native picking events
//! into [`NodeEvent`]s and dispatches them through the chart's handlers.

use std::fmt;
use std::sync::Arc;

/// Semantic event kinds delivered per scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Pointer click on a data-bound node.
    Click,
    /// Pointer entered a data-bound node.
    HoverEnter,
    /// Pointer left a data-bound node.
    HoverExit,
}

/// Event payload identifying the node by its full key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEvent {
    /// Which event fired.
    pub kind: EventKind,
    /// Ancestor chain of data keys, outermost first; the last element is the
    /// node's own key.
    pub key_path: Vec<String>,
}

impl NodeEvent {
    /// Create an event for a key path.
    #[must_use]
    pub fn new(kind: EventKind, key_path: Vec<String>) -> Self {
        Self { kind, key_path }
    }

    /// The node's own (innermost) key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key_path.last().map_or("", String::as_str)
    }
}

/// Callback invoked with a dispatched event.
pub type EventHandler = Arc<dyn Fn(&NodeEvent) + Send + Sync>;

/// Registered handlers for the three semantic events.
#[derive(Clone, Default)]
pub struct EventHandlers {
    click: Vec<EventHandler>,
    hover_enter: Vec<EventHandler>,
    hover_exit: Vec<EventHandler>,
}

impl EventHandlers {
    /// Create an empty handler set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event kind.
    pub fn on(&mut self, kind: EventKind, handler: EventHandler) {
        self.handlers_mut(kind).push(handler);
    }

    /// Dispatch an event to every handler registered for its kind.
    pub fn dispatch(&self, event: &NodeEvent) {
        for handler in self.handlers(event.kind) {
            handler(event);
        }
    }

    /// Whether any handler is registered for the kind.
    #[must_use]
    pub fn has_handlers(&self, kind: EventKind) -> bool {
        !self.handlers(kind).is_empty()
    }

    fn handlers(&self, kind: EventKind) -> &[EventHandler] {
        match kind {
            EventKind::Click => &self.click,
            EventKind::HoverEnter => &self.hover_enter,
            EventKind::HoverExit => &self.hover_exit,
        }
    }

    fn handlers_mut(&mut self, kind: EventKind) -> &mut Vec<EventHandler> {
        match kind {
            EventKind::Click => &mut self.click,
            EventKind::HoverEnter => &mut self.hover_enter,
            EventKind::HoverExit => &mut self.hover_exit,
        }
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("click", &self.click.len())
            .field("hover_enter", &self.hover_enter.len())
            .field("hover_exit", &self.hover_exit.len())
            .finish()
    }
}
