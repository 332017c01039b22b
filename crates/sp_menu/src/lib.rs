//! Contextual (right-click) popup menu for DOM-like hosts.
//!
//! ```
//! use sp_menu::{ContextMenu, HeadlessDom, Host};
//!
//! let dom = HeadlessDom::new();
//! let target = dom.create_element("div").unwrap();
//! dom.append_to_body(&target).unwrap();
//!
//! let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
//! menu.add_item("Delete", |menu| menu.hide());
//!
//! dom.hover(target, 40.0, 60.0).unwrap();
//! assert!(dom.right_click().is_prevented());
//! assert!(menu.is_visible());
//! menu.dispose();
//! ```

mod behavior_tests;
pub mod context_menu;
pub mod markup;
#[cfg(feature = "web")]
pub mod web;

pub use context_menu::{ContextMenu, MenuItem, SelectHandler};
pub use sp_menu_core::{
    EventKind, EventResponse, HeadlessDom, Host, HostEvent, MenuConfig, MenuError, NodeId, Position,
};
#[cfg(feature = "web")]
pub use web::WebHost;
