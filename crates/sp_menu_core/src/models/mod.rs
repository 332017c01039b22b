//! Data models for sp-menu.
//!
//! - `position` - Position of the popup in document pixels
//! - `config` - MenuConfig, loaded from JSON

pub mod config;
pub mod position;

pub use config::MenuConfig;
pub use position::Position;
