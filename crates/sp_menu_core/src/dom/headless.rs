//! In-memory document implementing [`Host`].
//!
//! Models just enough of a browser document to drive the menu end to end:
//! an element tree rooted at `body`, inline styles, a single hovered element
//! with `:hover` propagating to its ancestors, a focused element, and event
//! listeners on the window or on nodes with bubbling dispatch.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use super::{EventHandler, EventKind, EventResponse, Host, HostEvent};
use crate::error::MenuError;

/// Handle to an element of a [`HeadlessDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index.
    pub fn raw(&self) -> usize {
        self.0
    }
}

/// Handle to a registered listener of a [`HeadlessDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenTarget {
    Window,
    Node(NodeId),
}

struct Registration {
    target: ListenTarget,
    kinds: SmallVec<[EventKind; 2]>,
    handler: Rc<RefCell<EventHandler>>,
}

#[derive(Debug)]
struct NodeData {
    tag: String,
    attributes: Vec<(String, String)>,
    style: Vec<(String, String)>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            style: Vec::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    fn is_focusable(&self) -> bool {
        match self.tag.as_str() {
            "a" => self.attribute("href").is_some(),
            "button" | "input" | "select" | "textarea" => true,
            _ => false,
        }
    }
}

// Nodes are never freed; detached subtrees stay addressable.
struct Document {
    nodes: Vec<NodeData>,
    body: NodeId,
    hovered: Option<NodeId>,
    pointer: (f64, f64),
    focused: Option<NodeId>,
    listeners: BTreeMap<ListenerId, Registration>,
    next_listener: u64,
}

impl Document {
    fn new() -> Self {
        Self {
            nodes: vec![NodeData::new("body")],
            body: NodeId(0),
            hovered: None,
            pointer: (0.0, 0.0),
            focused: None,
            listeners: BTreeMap::new(),
            next_listener: 0,
        }
    }

    fn node(&self, id: NodeId) -> Result<&NodeData, MenuError> {
        self.nodes.get(id.0).ok_or_else(|| MenuError::stale_node(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, MenuError> {
        self.nodes.get_mut(id.0).ok_or_else(|| MenuError::stale_node(id.0))
    }

    /// Whether `node` is `ancestor` or lies below it.
    fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.is_inclusive_descendant(node, self.body)
    }

    fn detach(&mut self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get_mut(node.0)?.parent.take()?;
        if let Some(parent_data) = self.nodes.get_mut(parent.0) {
            parent_data.children.retain(|c| *c != node);
        }
        Some(parent)
    }

    /// Event path from `node` up to the root, innermost first.
    fn propagation_path(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            path.push(id);
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        path
    }

    fn snapshot(
        &self,
        target: ListenTarget,
        kind: EventKind,
    ) -> Vec<(ListenerId, Rc<RefCell<EventHandler>>)> {
        self.listeners
            .iter()
            .filter(|(_, reg)| reg.target == target && reg.kinds.contains(&kind))
            .map(|(id, reg)| (*id, reg.handler.clone()))
            .collect()
    }

    fn register(
        &mut self,
        target: ListenTarget,
        kinds: &[EventKind],
        handler: EventHandler,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(
            id,
            Registration {
                target,
                kinds: kinds.iter().copied().collect(),
                handler: Rc::new(RefCell::new(handler)),
            },
        );
        id
    }

    fn text_content(&self, node: NodeId, out: &mut String) {
        if let Some(data) = self.nodes.get(node.0) {
            out.push_str(&data.text);
            for child in &data.children {
                self.text_content(*child, out);
            }
        }
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };
        out.push('<');
        out.push_str(&data.tag);
        for (name, value) in &data.attributes {
            out.push_str(&format!(" {name}=\"{}\"", escape(value, true)));
        }
        if !data.style.is_empty() {
            let style: Vec<String> = data.style.iter().map(|(p, v)| format!("{p}: {v};")).collect();
            out.push_str(&format!(" style=\"{}\"", escape(&style.join(" "), true)));
        }
        out.push('>');
        out.push_str(&escape(&data.text, false));
        for child in &data.children {
            self.write_html(*child, out);
        }
        out.push_str("</");
        out.push_str(&data.tag);
        out.push('>');
    }
}

fn escape(value: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Shared handle onto an in-memory document.
///
/// Clones refer to the same document.
#[derive(Clone)]
pub struct HeadlessDom {
    doc: Rc<RefCell<Document>>,
}

impl Default for HeadlessDom {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeadlessDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.doc.borrow();
        f.debug_struct("HeadlessDom")
            .field("nodes", &doc.nodes.len())
            .field("listeners", &doc.listeners.len())
            .field("hovered", &doc.hovered)
            .field("focused", &doc.focused)
            .finish()
    }
}

impl HeadlessDom {
    /// Create an empty document with a `body`.
    pub fn new() -> Self {
        Self { doc: Rc::new(RefCell::new(Document::new())) }
    }

    // ========== Tree ==========

    /// The document body.
    pub fn body(&self) -> NodeId {
        self.doc.borrow().body
    }

    /// Create a detached element.
    pub fn create(&self, tag: &str) -> NodeId {
        let mut doc = self.doc.borrow_mut();
        doc.nodes.push(NodeData::new(tag));
        NodeId(doc.nodes.len() - 1)
    }

    /// Parent of `node`, if attached to one.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.doc.borrow().nodes.get(node.0).and_then(|n| n.parent)
    }

    /// Children of `node` in order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.doc.borrow().nodes.get(node.0).map(|n| n.children.clone()).unwrap_or_default()
    }

    /// Lowercase tag name.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.doc.borrow().nodes.get(node.0).map(|n| n.tag.clone())
    }

    /// Attribute value.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.doc.borrow().nodes.get(node.0).and_then(|n| n.attribute(name).map(String::from))
    }

    /// Inline style value.
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.doc
            .borrow()
            .nodes
            .get(node.0)
            .and_then(|n| n.style.iter().find(|(p, _)| p == property).map(|(_, v)| v.clone()))
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        self.doc.borrow().text_content(node, &mut text);
        text
    }

    /// Whether `node` is connected to the document body.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.doc.borrow().is_attached(node)
    }

    /// Attached elements carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        let doc = self.doc.borrow();
        let mut found = Vec::new();
        let mut stack = vec![doc.body];
        while let Some(id) = stack.pop() {
            let Some(data) = doc.nodes.get(id.0) else {
                continue;
            };
            if data.attribute("class").is_some_and(|c| c.split_whitespace().any(|c| c == class)) {
                found.push(id);
            }
            stack.extend(data.children.iter().rev().copied());
        }
        found
    }

    /// Serialize `node` and its subtree as HTML.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut html = String::new();
        self.doc.borrow().write_html(node, &mut html);
        html
    }

    // ========== Pointer and focus ==========

    /// Move the pointer over `node` at document coordinates `(x, y)`.
    pub fn hover(&self, node: NodeId, x: f64, y: f64) -> Result<(), MenuError> {
        let mut doc = self.doc.borrow_mut();
        doc.node(node)?;
        doc.hovered = Some(node);
        doc.pointer = (x, y);
        Ok(())
    }

    /// Move the pointer out of the document.
    pub fn leave(&self) {
        self.doc.borrow_mut().hovered = None;
    }

    /// The element directly under the pointer.
    pub fn hovered(&self) -> Option<NodeId> {
        self.doc.borrow().hovered
    }

    /// Current pointer coordinates.
    pub fn pointer(&self) -> (f64, f64) {
        self.doc.borrow().pointer
    }

    /// The element holding input focus.
    pub fn focused(&self) -> Option<NodeId> {
        self.doc.borrow().focused
    }

    // ========== Events ==========

    /// Number of live listeners, window and node.
    pub fn listener_count(&self) -> usize {
        self.doc.borrow().listeners.len()
    }

    /// Number of live window-level listeners.
    pub fn window_listener_count(&self) -> usize {
        self.doc.borrow().listeners.values().filter(|r| r.target == ListenTarget::Window).count()
    }

    /// Deliver `event` to the window listeners.
    pub fn dispatch_window(&self, event: HostEvent) -> EventResponse {
        let handlers = self.doc.borrow().snapshot(ListenTarget::Window, event.kind);
        self.run(handlers, &event)
    }

    /// Deliver `event` to `node`, bubbling through its ancestors and then the window.
    pub fn dispatch_on(&self, node: NodeId, event: HostEvent) -> EventResponse {
        let path = self.doc.borrow().propagation_path(node);
        let mut response = EventResponse::Proceed;
        for id in path {
            let handlers = self.doc.borrow().snapshot(ListenTarget::Node(id), event.kind);
            response = response.merge(self.run(handlers, &event));
        }
        response.merge(self.dispatch_window(event))
    }

    /// Secondary click at the pointer: `mousedown` then `contextmenu`.
    ///
    /// Returns whether the native context menu was suppressed.
    pub fn right_click(&self) -> EventResponse {
        let target = self.event_target();
        let (x, y) = self.pointer();
        self.dispatch_on(target, HostEvent::new(EventKind::MouseDown, x, y));
        self.dispatch_on(target, HostEvent::new(EventKind::ContextMenu, x, y))
    }

    /// Primary click at the pointer: `mousedown`, focus change, then `click`.
    ///
    /// Returns whether the default action (link navigation) was suppressed.
    pub fn click(&self) -> EventResponse {
        let target = self.event_target();
        let (x, y) = self.pointer();
        self.dispatch_on(target, HostEvent::new(EventKind::MouseDown, x, y));
        {
            let mut doc = self.doc.borrow_mut();
            let focusable = doc
                .propagation_path(target)
                .into_iter()
                .find(|id| doc.nodes.get(id.0).is_some_and(NodeData::is_focusable));
            let focused = focusable.filter(|id| doc.is_attached(*id));
            doc.focused = focused;
        }
        self.dispatch_on(target, HostEvent::new(EventKind::Click, x, y))
    }

    /// The window loses focus.
    pub fn blur_window(&self) -> EventResponse {
        self.dispatch_window(HostEvent::without_pointer(EventKind::Blur))
    }

    fn event_target(&self) -> NodeId {
        let doc = self.doc.borrow();
        doc.hovered.filter(|id| doc.is_attached(*id)).unwrap_or(doc.body)
    }

    fn run(
        &self,
        handlers: Vec<(ListenerId, Rc<RefCell<EventHandler>>)>,
        event: &HostEvent,
    ) -> EventResponse {
        let mut response = EventResponse::Proceed;
        for (id, handler) in handlers {
            // Removed by an earlier handler of this dispatch.
            if !self.doc.borrow().listeners.contains_key(&id) {
                continue;
            }
            let Ok(mut handler) = handler.try_borrow_mut() else {
                tracing::trace!(
                    listener = id.0,
                    kind = ?event.kind,
                    "Skipping re-entrant dispatch"
                );
                continue;
            };
            response = response.merge((*handler)(event));
        }
        response
    }
}

impl Host for HeadlessDom {
    type Node = NodeId;
    type Listener = ListenerId;

    fn create_element(&self, tag: &str) -> Result<NodeId, MenuError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(MenuError::dom(format!("Invalid tag name {tag:?}")));
        }
        Ok(self.create(tag))
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<(), MenuError> {
        let mut doc = self.doc.borrow_mut();
        let data = doc.node_mut(*node)?;
        match data.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data.attributes.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn set_text(&self, node: &NodeId, text: &str) -> Result<(), MenuError> {
        let mut doc = self.doc.borrow_mut();
        let children = std::mem::take(&mut doc.node_mut(*node)?.children);
        for child in children {
            if let Some(child) = doc.nodes.get_mut(child.0) {
                child.parent = None;
            }
        }
        doc.node_mut(*node)?.text = text.to_string();
        Ok(())
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) -> Result<(), MenuError> {
        let mut doc = self.doc.borrow_mut();
        let data = doc.node_mut(*node)?;
        match data.style.iter_mut().find(|(p, _)| p == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data.style.push((property.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), MenuError> {
        let mut doc = self.doc.borrow_mut();
        doc.node(*parent)?;
        doc.node(*child)?;
        if doc.is_inclusive_descendant(*parent, *child) {
            return Err(MenuError::dom("Cannot append a node to itself or its descendant"));
        }
        doc.detach(*child);
        doc.node_mut(*child)?.parent = Some(*parent);
        doc.node_mut(*parent)?.children.push(*child);
        Ok(())
    }

    fn append_to_body(&self, node: &NodeId) -> Result<(), MenuError> {
        let body = self.body();
        self.append_child(&body, node)
    }

    fn remove(&self, node: &NodeId) {
        let mut doc = self.doc.borrow_mut();
        let hovered_inside = doc.hovered.is_some_and(|h| doc.is_inclusive_descendant(h, *node));
        let focused_inside = doc.focused.is_some_and(|f| doc.is_inclusive_descendant(f, *node));
        let Some(parent) = doc.detach(*node) else {
            return;
        };
        if hovered_inside {
            doc.hovered = Some(parent);
        }
        if focused_inside {
            doc.focused = None;
        }
    }

    fn is_hovered(&self, node: &NodeId) -> bool {
        let doc = self.doc.borrow();
        match doc.hovered {
            Some(hovered) => doc.is_attached(*node) && doc.is_inclusive_descendant(hovered, *node),
            None => false,
        }
    }

    fn blur(&self, node: &NodeId) {
        let mut doc = self.doc.borrow_mut();
        if doc.focused == Some(*node) {
            doc.focused = None;
        }
    }

    fn listen_window(
        &self,
        kinds: &[EventKind],
        handler: EventHandler,
    ) -> Result<ListenerId, MenuError> {
        Ok(self.doc.borrow_mut().register(ListenTarget::Window, kinds, handler))
    }

    fn listen_node(
        &self,
        node: &NodeId,
        kind: EventKind,
        handler: EventHandler,
    ) -> Result<ListenerId, MenuError> {
        let mut doc = self.doc.borrow_mut();
        doc.node(*node)?;
        Ok(doc.register(ListenTarget::Node(*node), &[kind], handler))
    }

    fn unlisten(&self, listener: ListenerId) {
        self.doc.borrow_mut().listeners.remove(&listener);
    }
}
