//! Browser host backed by `web-sys`.
//!
//! Nodes are live `Element`s and listeners are JS closures registered with
//! `addEventListener`. A removed listener's closure is kept alive until a
//! zero-delay timeout fires, so a handler may remove itself while running.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, MouseEvent, Window};

use sp_menu_core::{EventHandler, EventKind, Host, HostEvent, MenuError};

type JsHandler = Closure<dyn FnMut(Event)>;

fn js_error(value: JsValue) -> MenuError {
    MenuError::dom(format!("{value:?}"))
}

/// Registered browser listener.
pub struct WebListener {
    target: EventTarget,
    kinds: Vec<EventKind>,
    closure: JsHandler,
}

/// The page's window and document.
#[derive(Clone)]
pub struct WebHost {
    window: Window,
    document: Document,
    retired: Rc<RefCell<Vec<JsHandler>>>,
}

impl std::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebHost").field("retired", &self.retired.borrow().len()).finish()
    }
}

impl WebHost {
    /// Host for the current page.
    pub fn new() -> Result<Self, MenuError> {
        let window = web_sys::window().ok_or_else(|| MenuError::dom("No global window"))?;
        let document = window.document().ok_or_else(|| MenuError::dom("Window has no document"))?;
        Ok(Self { window, document, retired: Rc::new(RefCell::new(Vec::new())) })
    }

    /// First element matching a CSS selector, usually used to find the target.
    pub fn query(&self, selector: &str) -> Result<Option<Element>, MenuError> {
        self.document.query_selector(selector).map_err(js_error)
    }

    fn wrap(mut handler: EventHandler) -> JsHandler {
        Closure::wrap(Box::new(move |event: Event| {
            let Some(kind) = EventKind::from_dom_name(&event.type_()) else {
                return;
            };
            let (page_x, page_y) = event
                .dyn_ref::<MouseEvent>()
                .map(|m| (f64::from(m.page_x()), f64::from(m.page_y())))
                .unwrap_or_default();
            if handler(&HostEvent::new(kind, page_x, page_y)).is_prevented() {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(Event)>)
    }

    fn attach(
        &self,
        target: EventTarget,
        kinds: &[EventKind],
        handler: EventHandler,
    ) -> Result<WebListener, MenuError> {
        let closure = Self::wrap(handler);
        for (index, kind) in kinds.iter().enumerate() {
            let added = target.add_event_listener_with_callback(
                kind.dom_name(),
                closure.as_ref().unchecked_ref(),
            );
            if let Err(err) = added {
                let partial = WebListener { target, kinds: kinds[..index].to_vec(), closure };
                self.unlisten(partial);
                return Err(js_error(err));
            }
        }
        Ok(WebListener { target, kinds: kinds.to_vec(), closure })
    }

    /// Keep `closure` alive until the current dispatch has unwound.
    fn retire(&self, closure: JsHandler) {
        let mut retired = self.retired.borrow_mut();
        let schedule = retired.is_empty();
        retired.push(closure);
        if !schedule {
            return;
        }

        let pending = self.retired.clone();
        let sweep = Closure::once_into_js(move || pending.borrow_mut().clear());
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(sweep.unchecked_ref(), 0)
        {
            tracing::warn!(error = ?err, "Failed to schedule listener cleanup");
        }
    }
}

impl Host for WebHost {
    type Node = Element;
    type Listener = WebListener;

    fn create_element(&self, tag: &str) -> Result<Element, MenuError> {
        self.document.create_element(tag).map_err(js_error)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) -> Result<(), MenuError> {
        node.set_attribute(name, value).map_err(js_error)
    }

    fn set_text(&self, node: &Element, text: &str) -> Result<(), MenuError> {
        node.set_text_content(Some(text));
        Ok(())
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) -> Result<(), MenuError> {
        let html = node.dyn_ref::<HtmlElement>().ok_or_else(|| {
            MenuError::dom(format!("<{}> is not an HTML element", node.tag_name()))
        })?;
        html.style().set_property(property, value).map_err(js_error)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), MenuError> {
        parent.append_child(child).map(|_| ()).map_err(js_error)
    }

    fn append_to_body(&self, node: &Element) -> Result<(), MenuError> {
        let body = self.document.body().ok_or(MenuError::NoBody)?;
        body.append_child(node).map(|_| ()).map_err(js_error)
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn is_hovered(&self, node: &Element) -> bool {
        node.matches(":hover").unwrap_or(false)
    }

    fn blur(&self, node: &Element) {
        if let Some(html) = node.dyn_ref::<HtmlElement>() {
            if let Err(err) = html.blur() {
                tracing::trace!(error = ?err, "Failed to blur element");
            }
        }
    }

    fn listen_window(
        &self,
        kinds: &[EventKind],
        handler: EventHandler,
    ) -> Result<WebListener, MenuError> {
        self.attach(self.window.clone().into(), kinds, handler)
    }

    fn listen_node(
        &self,
        node: &Element,
        kind: EventKind,
        handler: EventHandler,
    ) -> Result<WebListener, MenuError> {
        self.attach(node.clone().into(), &[kind], handler)
    }

    fn unlisten(&self, listener: WebListener) {
        let WebListener { target, kinds, closure } = listener;
        for kind in kinds {
            let removed = target.remove_event_listener_with_callback(
                kind.dom_name(),
                closure.as_ref().unchecked_ref(),
            );
            if let Err(err) = removed {
                tracing::warn!(event = kind.dom_name(), error = ?err, "Failed to remove listener");
            }
        }
        self.retire(closure);
    }
}
