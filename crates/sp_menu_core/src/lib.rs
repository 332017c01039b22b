//! Core types and utilities for the sp-menu context menu.
//!
//! This crate provides everything the widget sits on:
//!
//! - **error**: Error handling for host operations and configuration
//! - **models**: Position and menu configuration
//! - **dom**: The `Host` abstraction, event types, and the in-memory `HeadlessDom`

pub mod dom;
pub mod error;
pub mod models;

pub use dom::{
    EventHandler, EventKind, EventResponse, HeadlessDom, Host, HostEvent, ListenerId, NodeId,
};
pub use error::MenuError;
pub use models::{MenuConfig, Position};
