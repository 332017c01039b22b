//! Host abstraction over a DOM-like environment.
//!
//! The context menu never talks to a document directly. It goes through the
//! [`Host`] trait, which covers exactly the operations the widget needs:
//! element creation, attaching to the body, inline styles, `:hover` hit-testing,
//! focus removal, and event subscriptions on the window or on a node.
//!
//! [`HeadlessDom`] is the in-memory implementation used by tests and the demo.

mod headless;

pub use headless::{HeadlessDom, ListenerId, NodeId};

use serde::{Deserialize, Serialize};

use crate::error::MenuError;

/// Events the menu subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Secondary click, the native context-menu request.
    ContextMenu,
    /// The window lost focus.
    Blur,
    /// A pointer button was pressed.
    MouseDown,
    /// A primary click on an element.
    Click,
}

impl EventKind {
    /// Name of the event in the DOM.
    pub fn dom_name(&self) -> &'static str {
        match self {
            Self::ContextMenu => "contextmenu",
            Self::Blur => "blur",
            Self::MouseDown => "mousedown",
            Self::Click => "click",
        }
    }

    /// Parse a DOM event name.
    pub fn from_dom_name(name: &str) -> Option<Self> {
        match name {
            "contextmenu" => Some(Self::ContextMenu),
            "blur" => Some(Self::Blur),
            "mousedown" => Some(Self::MouseDown),
            "click" => Some(Self::Click),
            _ => None,
        }
    }
}

/// An event delivered to a handler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostEvent {
    /// What happened
    pub kind: EventKind,
    /// Pointer x in document coordinates
    pub page_x: f64,
    /// Pointer y in document coordinates
    pub page_y: f64,
}

impl HostEvent {
    /// Create a new event.
    pub fn new(kind: EventKind, page_x: f64, page_y: f64) -> Self {
        Self { kind, page_x, page_y }
    }

    /// An event without meaningful pointer coordinates, such as `blur`.
    pub fn without_pointer(kind: EventKind) -> Self {
        Self { kind, page_x: 0.0, page_y: 0.0 }
    }
}

/// What a handler wants done with the host's default action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventResponse {
    /// Let the host run its default action.
    #[default]
    Proceed,
    /// Suppress the default action (native menu, link navigation).
    PreventDefault,
}

impl EventResponse {
    /// Whether the default action was suppressed.
    pub fn is_prevented(&self) -> bool {
        matches!(self, Self::PreventDefault)
    }

    /// Combine the responses of several handlers for one event.
    pub fn merge(self, other: EventResponse) -> EventResponse {
        if self.is_prevented() || other.is_prevented() {
            Self::PreventDefault
        } else {
            Self::Proceed
        }
    }
}

/// Callback invoked by the host when a subscribed event fires.
pub type EventHandler = Box<dyn FnMut(&HostEvent) -> EventResponse + 'static>;

/// A DOM-like environment the menu can render into.
///
/// Implementations are cheap handles (`Clone`) onto a shared document; every
/// clone refers to the same document.
pub trait Host: Clone + 'static {
    /// Handle to an element.
    type Node: Clone + std::fmt::Debug + 'static;
    /// Handle to a registered listener, consumed by [`Host::unlisten`].
    type Listener: 'static;

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> Result<Self::Node, MenuError>;

    /// Set an attribute on an element.
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), MenuError>;

    /// Replace the text content of an element.
    fn set_text(&self, node: &Self::Node, text: &str) -> Result<(), MenuError>;

    /// Set one inline style property.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str) -> Result<(), MenuError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), MenuError>;

    /// Append `node` as the last child of the document body.
    fn append_to_body(&self, node: &Self::Node) -> Result<(), MenuError>;

    /// Detach `node` from its parent. No-op if it is already detached.
    fn remove(&self, node: &Self::Node);

    /// Whether the pointer is currently over `node` (the `:hover` state).
    fn is_hovered(&self, node: &Self::Node) -> bool;

    /// Remove input focus from `node` if it has it.
    fn blur(&self, node: &Self::Node);

    /// Subscribe to window-level events.
    fn listen_window(
        &self,
        kinds: &[EventKind],
        handler: EventHandler,
    ) -> Result<Self::Listener, MenuError>;

    /// Subscribe to an event on one element (bubbling from its descendants).
    fn listen_node(
        &self,
        node: &Self::Node,
        kind: EventKind,
        handler: EventHandler,
    ) -> Result<Self::Listener, MenuError>;

    /// Remove a subscription. Safe to call from inside the handler itself.
    fn unlisten(&self, listener: Self::Listener);
}
