//! Error types for sp-menu.
//!
//! The widget itself has very few fallible paths: everything that can fail is a
//! host DOM operation, a stale node handle, or configuration loading.

use thiserror::Error;

/// Main error type for sp-menu.
#[derive(Debug, Error)]
pub enum MenuError {
    /// A host DOM operation failed.
    #[error("DOM error: {message}")]
    Dom {
        /// Human-readable error message.
        message: String,
    },

    /// The document has no body to attach the menu to.
    #[error("Document has no body")]
    NoBody,

    /// A node handle does not refer to a node of the document.
    #[error("Stale node handle: {id}")]
    StaleNode {
        /// Raw id of the missing node.
        id: usize,
    },

    /// The menu was disposed and can no longer be shown.
    #[error("Menu {menu_id} has been disposed")]
    Disposed {
        /// Id of the disposed menu.
        menu_id: String,
    },

    /// Configuration error.
    #[error("Config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unexpected internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl MenuError {
    // ========== Constructors ==========

    /// Create a new DOM error.
    pub fn dom(message: impl Into<String>) -> Self {
        Self::Dom { message: message.into() }
    }

    /// Create a stale node error.
    pub fn stale_node(id: usize) -> Self {
        Self::StaleNode { id }
    }

    /// Create a disposed error for the given menu.
    pub fn disposed(menu_id: impl std::fmt::Display) -> Self {
        Self::Disposed { menu_id: menu_id.to_string() }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a new config error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    // ========== Methods ==========

    /// Check if this error means the menu was torn down.
    pub fn is_disposed(&self) -> bool {
        matches!(self, Self::Disposed { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Dom { .. } | Self::NoBody | Self::StaleNode { .. } => "DOM",
            Self::Disposed { .. } => "Lifecycle",
            Self::Config { .. } => "Config",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Get actionable hint for the caller.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Dom { .. } => None,
            Self::NoBody => Some("Create the menu after the document body has loaded"),
            Self::StaleNode { .. } => {
                Some("Node handles are only valid for the document that created them")
            }
            Self::Disposed { .. } => Some("Create a new menu instead of reusing a disposed one"),
            Self::Config { .. } => Some("Check the menu configuration JSON"),
            Self::Internal { .. } => Some("Please report this issue"),
        }
    }
}

// ========== Error Conversions ==========

/// Convert from std::io::Error to MenuError.
impl From<std::io::Error> for MenuError {
    fn from(err: std::io::Error) -> Self {
        MenuError::config_with_source(err.to_string(), err)
    }
}

/// Convert from serde_json::Error to MenuError.
impl From<serde_json::Error> for MenuError {
    fn from(err: serde_json::Error) -> Self {
        MenuError::config_with_source(format!("JSON error: {err}"), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_and_hints() {
        assert_eq!(MenuError::dom("boom").category(), "DOM");
        assert_eq!(MenuError::NoBody.category(), "DOM");
        assert_eq!(MenuError::stale_node(3).category(), "DOM");
        assert_eq!(MenuError::disposed("abc").category(), "Lifecycle");
        assert_eq!(MenuError::config("bad").category(), "Config");
        assert!(MenuError::dom("boom").hint().is_none());
        assert!(MenuError::NoBody.hint().is_some());
    }

    #[test]
    fn test_display() {
        assert_eq!(MenuError::stale_node(7).to_string(), "Stale node handle: 7");
        assert_eq!(MenuError::disposed("m1").to_string(), "Menu m1 has been disposed");
        assert!(MenuError::disposed("m1").is_disposed());
    }

    #[test]
    fn test_json_error_conversion_keeps_source() {
        let err: MenuError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.to_string().starts_with("Config error: JSON error"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
