//! Menu configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::dom::EventKind;
use crate::error::MenuError;

/// Default style class of the rendered list container.
pub const DEFAULT_CLASS_NAME: &str = "sp-context-menu";

/// Per-menu configuration.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MenuConfig {
    /// Style class set on the rendered list container
    pub class_name: String,
    /// Hide the menu when the window loses focus
    pub dismiss_on_blur: bool,
    /// Hide the menu on a pointer press outside of it
    pub dismiss_on_press: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            class_name: DEFAULT_CLASS_NAME.to_string(),
            dismiss_on_blur: true,
            dismiss_on_press: true,
        }
    }
}

impl MenuConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, MenuError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MenuError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MenuError::config_with_source(format!("Failed to read {}", path.display()), e)
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            class_name = %config.class_name,
            "Loaded menu config"
        );
        Ok(config)
    }

    /// Builder: set the container class.
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Window events that should dismiss the menu.
    pub fn dismiss_events(&self) -> SmallVec<[EventKind; 2]> {
        let mut kinds = SmallVec::new();
        if self.dismiss_on_blur {
            kinds.push(EventKind::Blur);
        }
        if self.dismiss_on_press {
            kinds.push(EventKind::MouseDown);
        }
        kinds
    }

    fn validate(&self) -> Result<(), MenuError> {
        if self.class_name.trim().is_empty() {
            return Err(MenuError::config("class_name must not be empty"));
        }
        if self.class_name.contains(char::is_whitespace) {
            return Err(MenuError::config(format!(
                "class_name must be a single class, got {:?}",
                self.class_name
            )));
        }
        Ok(())
    }
}
