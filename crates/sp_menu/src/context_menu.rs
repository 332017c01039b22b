//! Context menu component for right-click menus bound to a target element.
//!
//! This module provides:
//! - ContextMenu, a cheap handle onto one menu instance
//! - MenuItem, a labeled action with a selection callback
//! - Window-level trigger (`contextmenu`) and dismissal (`blur`, `mousedown`) bindings
//! - Explicit teardown via `dispose`

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use sp_menu_core::{
    EventHandler, EventKind, EventResponse, Host, HostEvent, MenuConfig, MenuError, Position,
};
use uuid::Uuid;

use crate::markup;

// ============================================================================
// MenuItem
// ============================================================================

/// Handler type for menu item selection.
///
/// The menu that owns the item is passed explicitly.
pub type SelectHandler<H> = Rc<dyn Fn(&ContextMenu<H>) + 'static>;

/// A labeled entry of a context menu.
#[derive(Clone)]
pub struct MenuItem<H: Host> {
    label: String,
    on_select: SelectHandler<H>,
}

impl<H: Host> MenuItem<H> {
    /// Create an item with a selection handler.
    pub fn new(label: impl Into<String>, on_select: impl Fn(&ContextMenu<H>) + 'static) -> Self {
        Self { label: label.into(), on_select: Rc::new(on_select) }
    }

    /// Get the label of this item.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the selection handler against `menu`.
    pub fn select(&self, menu: &ContextMenu<H>) {
        (self.on_select)(menu)
    }
}

impl<H: Host> fmt::Debug for MenuItem<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem").field("label", &self.label).finish_non_exhaustive()
    }
}

// ============================================================================
// ContextMenu
// ============================================================================

/// Live popup: its container and the row listeners bound for it.
struct Rendering<H: Host> {
    root: H::Node,
    listeners: Vec<H::Listener>,
}

impl<H: Host> Rendering<H> {
    fn discard(self, host: &H) {
        for listener in self.listeners {
            host.unlisten(listener);
        }
        host.remove(&self.root);
    }
}

struct MenuState<H: Host> {
    /// Instance id, also written to the rendering.
    id: Uuid,
    /// Element whose right-click opens the menu.
    target: Option<H::Node>,
    /// Where the popup's top-left corner goes.
    position: Position,
    /// Entries in insertion order.
    items: Vec<MenuItem<H>>,
    /// Present iff the menu is visible.
    rendering: Option<Rendering<H>>,
    /// Window-level trigger and dismissal listeners.
    subscriptions: Vec<H::Listener>,
    config: MenuConfig,
    disposed: bool,
}

/// A contextual popup menu.
///
/// `ContextMenu` is a handle: clones refer to the same menu. Host listeners
/// only hold a weak reference, so once every handle is dropped they stop
/// doing anything. Call [`ContextMenu::dispose`] to remove them from the host.
#[derive(Clone)]
pub struct ContextMenu<H: Host> {
    host: H,
    state: Rc<RefCell<MenuState<H>>>,
}

impl<H: Host> ContextMenu<H> {
    /// Create a menu bound to `target` with the default configuration.
    ///
    /// Without a target the menu is never opened by right-clicks, but can
    /// still be shown with [`ContextMenu::show`].
    pub fn new(host: H, target: Option<H::Node>) -> Result<Self, MenuError> {
        Self::with_config(host, target, MenuConfig::default())
    }

    /// Create a menu with a custom configuration.
    pub fn with_config(
        host: H,
        target: Option<H::Node>,
        config: MenuConfig,
    ) -> Result<Self, MenuError> {
        let id = Uuid::new_v4();
        let has_target = target.is_some();
        let menu = Self {
            host,
            state: Rc::new(RefCell::new(MenuState {
                id,
                target,
                position: Position::default(),
                items: Vec::new(),
                rendering: None,
                subscriptions: Vec::new(),
                config,
                disposed: false,
            })),
        };

        if let Err(err) = menu.bind() {
            tracing::warn!(menu_id = %id, error = %err, "Failed to bind context menu");
            menu.dispose();
            return Err(err);
        }

        tracing::debug!(menu_id = %id, has_target, "Context menu created");
        Ok(menu)
    }

    // ========== Items ==========

    /// Append an entry. It shows up on the next [`ContextMenu::show`].
    pub fn add_item(
        &self,
        label: impl Into<String>,
        on_select: impl Fn(&ContextMenu<H>) + 'static,
    ) {
        self.push_item(MenuItem::new(label, on_select));
    }

    /// Append a prebuilt entry.
    pub fn push_item(&self, item: MenuItem<H>) {
        self.state.borrow_mut().items.push(item);
    }

    /// Labels of all entries, in order.
    pub fn items(&self) -> Vec<String> {
        self.state.borrow().items.iter().map(|i| i.label.clone()).collect()
    }

    /// Number of entries.
    pub fn item_count(&self) -> usize {
        self.state.borrow().items.len()
    }

    // ========== Visibility ==========

    /// Render the popup at the current position, replacing any previous one.
    pub fn show(&self) -> Result<(), MenuError> {
        let (id, items, class_name) = {
            let state = self.state.borrow();
            if state.disposed {
                return Err(MenuError::disposed(state.id));
            }
            (state.id, state.items.clone(), state.config.class_name.clone())
        };

        self.hide();

        let markup = markup::build(
            &self.host,
            &class_name,
            &id.to_string(),
            items.iter().map(MenuItem::label),
        )?;

        let mut rendering = Rendering::<H> { root: markup.root, listeners: Vec::new() };
        for (item, anchor) in items.iter().zip(&markup.anchors) {
            match self.host.listen_node(anchor, EventKind::Click, self.row_handler(item, anchor)) {
                Ok(listener) => rendering.listeners.push(listener),
                Err(err) => {
                    rendering.discard(&self.host);
                    return Err(err);
                }
            }
        }

        if let Err(err) = self.host.append_to_body(&rendering.root) {
            rendering.discard(&self.host);
            return Err(err);
        }
        self.state.borrow_mut().rendering = Some(rendering);

        if let Err(err) = self.apply_position() {
            self.hide();
            return Err(err);
        }

        tracing::debug!(menu_id = %id, items = items.len(), "Context menu shown");
        Ok(())
    }

    /// Remove the popup from the document. No-op when hidden.
    pub fn hide(&self) {
        let rendering = self.state.borrow_mut().rendering.take();
        if let Some(rendering) = rendering {
            rendering.discard(&self.host);
            tracing::debug!(menu_id = %self.id(), "Context menu hidden");
        }
    }

    /// Whether the popup is currently rendered.
    pub fn is_visible(&self) -> bool {
        self.state.borrow().rendering.is_some()
    }

    /// Container node of the live popup.
    pub fn rendered_node(&self) -> Option<H::Node> {
        self.state.borrow().rendering.as_ref().map(|r| r.root.clone())
    }

    // ========== Position ==========

    /// Horizontal position in pixels.
    pub fn x(&self) -> f64 {
        self.state.borrow().position.x
    }

    /// Set the horizontal position and move the live popup.
    pub fn set_x(&self, value: f64) {
        self.state.borrow_mut().position.x = value;
        self.update_position();
    }

    /// Vertical position in pixels.
    pub fn y(&self) -> f64 {
        self.state.borrow().position.y
    }

    /// Set the vertical position and move the live popup.
    pub fn set_y(&self, value: f64) {
        self.state.borrow_mut().position.y = value;
        self.update_position();
    }

    /// Current position.
    pub fn position(&self) -> Position {
        self.state.borrow().position
    }

    /// Set both coordinates and move the live popup.
    pub fn set_position(&self, position: Position) {
        self.state.borrow_mut().position = position;
        self.update_position();
    }

    fn update_position(&self) {
        if let Err(err) = self.apply_position() {
            tracing::warn!(menu_id = %self.id(), error = %err, "Failed to position context menu");
        }
    }

    fn apply_position(&self) -> Result<(), MenuError> {
        let (root, position) = {
            let state = self.state.borrow();
            (state.rendering.as_ref().map(|r| r.root.clone()), state.position)
        };
        let Some(root) = root else {
            return Ok(());
        };

        self.host.set_style(&root, "left", &position.left_css())?;
        self.host.set_style(&root, "top", &position.top_css())?;
        tracing::trace!(
            menu_id = %self.id(),
            x = position.x,
            y = position.y,
            "Context menu positioned"
        );
        Ok(())
    }

    // ========== Lifecycle ==========

    /// Hide the menu and remove its window listeners from the host.
    ///
    /// Without this, the listeners stay registered for as long as the host
    /// lives. Calling it more than once is a no-op.
    pub fn dispose(&self) {
        self.hide();
        let subscriptions = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            std::mem::take(&mut state.subscriptions)
        };
        for subscription in subscriptions {
            self.host.unlisten(subscription);
        }
        tracing::debug!(menu_id = %self.id(), "Context menu disposed");
    }

    /// Whether [`ContextMenu::dispose`] has run.
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    // ========== Accessors ==========

    /// Instance id.
    pub fn id(&self) -> Uuid {
        self.state.borrow().id
    }

    /// Target element, if any.
    pub fn target(&self) -> Option<H::Node> {
        self.state.borrow().target.clone()
    }

    /// Configuration the menu was created with.
    pub fn config(&self) -> MenuConfig {
        self.state.borrow().config.clone()
    }

    /// The host the menu renders into.
    pub fn host(&self) -> &H {
        &self.host
    }

    // ========== Event bindings ==========

    fn upgrade(host: &H, state: &Weak<RefCell<MenuState<H>>>) -> Option<Self> {
        state.upgrade().map(|state| Self { host: host.clone(), state })
    }

    /// Register the window-level trigger and dismissal listeners.
    fn bind(&self) -> Result<(), MenuError> {
        let weak = Rc::downgrade(&self.state);
        let host = self.host.clone();
        let trigger = self.host.listen_window(
            &[EventKind::ContextMenu],
            Box::new(move |event: &HostEvent| match Self::upgrade(&host, &weak) {
                Some(menu) => menu.handle_trigger(event),
                None => EventResponse::Proceed,
            }),
        )?;
        self.state.borrow_mut().subscriptions.push(trigger);

        let dismiss_kinds = self.state.borrow().config.dismiss_events();
        if !dismiss_kinds.is_empty() {
            let weak = Rc::downgrade(&self.state);
            let host = self.host.clone();
            let dismiss = self.host.listen_window(
                &dismiss_kinds,
                Box::new(move |event: &HostEvent| match Self::upgrade(&host, &weak) {
                    Some(menu) => menu.handle_dismiss(event),
                    None => EventResponse::Proceed,
                }),
            )?;
            self.state.borrow_mut().subscriptions.push(dismiss);
        }
        Ok(())
    }

    /// Native context-menu request anywhere in the window.
    fn handle_trigger(&self, event: &HostEvent) -> EventResponse {
        let Some(target) = self.target() else {
            return EventResponse::Proceed;
        };
        if !self.host.is_hovered(&target) {
            tracing::trace!(menu_id = %self.id(), "Context menu request outside target");
            return EventResponse::Proceed;
        }

        self.set_position(Position::new(event.page_x, event.page_y));
        if let Err(err) = self.show() {
            tracing::warn!(menu_id = %self.id(), error = %err, "Failed to show context menu");
        }
        EventResponse::PreventDefault
    }

    /// Window blur or pointer press: close unless the pointer is over the popup.
    fn handle_dismiss(&self, event: &HostEvent) -> EventResponse {
        match self.rendered_node() {
            Some(root) if self.host.is_hovered(&root) => {
                tracing::trace!(
                    menu_id = %self.id(),
                    kind = ?event.kind,
                    "Press inside context menu"
                );
            }
            _ => self.hide(),
        }
        EventResponse::Proceed
    }

    /// Click handler for one row: select, hide, drop focus, cancel navigation.
    fn row_handler(&self, item: &MenuItem<H>, anchor: &H::Node) -> EventHandler {
        let weak = Rc::downgrade(&self.state);
        let host = self.host.clone();
        let item = item.clone();
        let anchor = anchor.clone();
        Box::new(move |_event: &HostEvent| {
            let Some(menu) = Self::upgrade(&host, &weak) else {
                return EventResponse::Proceed;
            };
            tracing::debug!(menu_id = %menu.id(), label = %item.label, "Menu item selected");
            item.select(&menu);
            menu.hide();
            host.blur(&anchor);
            EventResponse::PreventDefault
        })
    }
}

impl<H: Host> fmt::Debug for ContextMenu<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ContextMenu")
            .field("id", &state.id)
            .field("target", &state.target)
            .field("position", &state.position)
            .field("items", &state.items)
            .field("visible", &state.rendering.is_some())
            .field("disposed", &state.disposed)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sp_menu_core::HeadlessDom;
    use std::cell::Cell;

    #[test]
    fn test_new_menu_defaults() {
        let dom = HeadlessDom::new();
        let menu = ContextMenu::new(dom.clone(), None).unwrap();

        assert_eq!(menu.position(), Position::new(0.0, 0.0));
        assert_eq!(menu.item_count(), 0);
        assert!(!menu.is_visible());
        assert!(menu.target().is_none());
        assert_eq!(menu.config(), MenuConfig::default());
        // Trigger plus dismissal.
        assert_eq!(dom.window_listener_count(), 2);
    }

    #[test]
    fn test_each_instance_owns_its_items() {
        let dom = HeadlessDom::new();
        let first = ContextMenu::new(dom.clone(), None).unwrap();
        let second = ContextMenu::new(dom.clone(), None).unwrap();

        first.add_item("Copy", |_| {});
        first.add_item("Copy", |_| {});

        assert_eq!(first.items(), vec!["Copy", "Copy"]);
        assert!(second.items().is_empty());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_item_select_receives_menu() {
        let dom = HeadlessDom::new();
        let menu = ContextMenu::new(dom, None).unwrap();
        let seen = Rc::new(Cell::new(None));

        let s = seen.clone();
        let item = MenuItem::new("Rename", move |m: &ContextMenu<HeadlessDom>| s.set(Some(m.id())));
        assert_eq!(item.label(), "Rename");
        item.select(&menu);
        assert_eq!(seen.get(), Some(menu.id()));
    }

    #[test]
    fn test_no_dismiss_listener_when_disabled() {
        let dom = HeadlessDom::new();
        let config =
            MenuConfig { dismiss_on_blur: false, dismiss_on_press: false, ..MenuConfig::default() };
        let _menu = ContextMenu::with_config(dom.clone(), None, config).unwrap();
        assert_eq!(dom.window_listener_count(), 1);
    }

    #[test]
    fn test_custom_class_name() {
        let dom = HeadlessDom::new();
        let config = MenuConfig::default().with_class_name("file-menu");
        let menu = ContextMenu::with_config(dom.clone(), None, config).unwrap();
        menu.add_item("Open", |_| {});
        menu.show().unwrap();

        assert!(dom.find_by_class("sp-context-menu").is_empty());
        assert_eq!(dom.find_by_class("file-menu"), vec![menu.rendered_node().unwrap()]);
    }

    #[test]
    fn test_debug_output() {
        let dom = HeadlessDom::new();
        let menu = ContextMenu::new(dom, None).unwrap();
        menu.add_item("Delete", |_| {});
        let debug = format!("{menu:?}");
        assert!(debug.contains("Delete"));
        assert!(debug.contains("visible: false"));
    }
}
