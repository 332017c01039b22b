//! Markup of the rendered popup.
//!
//! ```html
//! <ul class="sp-context-menu" data-menu-id="…">
//!   <li><a href="#"><span>Label</span></a></li>
//! </ul>
//! ```

use sp_menu_core::{Host, MenuError};

/// Attribute carrying the owning menu's id.
pub const MENU_ID_ATTRIBUTE: &str = "data-menu-id";

/// Detached popup tree, ready to be wired and attached.
#[derive(Debug)]
pub struct MenuMarkup<N> {
    /// The list container
    pub root: N,
    /// One activatable anchor per row, in row order
    pub anchors: Vec<N>,
}

/// Build the popup tree for `labels` without attaching it to the document.
pub fn build<'a, H: Host>(
    host: &H,
    class_name: &str,
    menu_id: &str,
    labels: impl IntoIterator<Item = &'a str>,
) -> Result<MenuMarkup<H::Node>, MenuError> {
    let root = host.create_element("ul")?;
    host.set_attribute(&root, "class", class_name)?;
    host.set_attribute(&root, MENU_ID_ATTRIBUTE, menu_id)?;

    let mut anchors = Vec::new();
    for label in labels {
        let row = host.create_element("li")?;
        let anchor = host.create_element("a")?;
        host.set_attribute(&anchor, "href", "#")?;
        let text = host.create_element("span")?;
        host.set_text(&text, label)?;

        host.append_child(&anchor, &text)?;
        host.append_child(&row, &anchor)?;
        host.append_child(&root, &row)?;
        anchors.push(anchor);
    }

    Ok(MenuMarkup { root, anchors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_menu_core::HeadlessDom;

    #[test]
    fn test_build_markup() {
        let dom = HeadlessDom::new();
        let markup = build(&dom, "sp-context-menu", "m1", ["Copy", "<Paste>"]).unwrap();

        assert_eq!(markup.anchors.len(), 2);
        assert!(!dom.is_attached(markup.root));
        assert_eq!(
            dom.outer_html(markup.root),
            "<ul class=\"sp-context-menu\" data-menu-id=\"m1\">\
             <li><a href=\"#\"><span>Copy</span></a></li>\
             <li><a href=\"#\"><span>&lt;Paste&gt;</span></a></li>\
             </ul>"
        );
    }

    #[test]
    fn test_build_empty_menu() {
        let dom = HeadlessDom::new();
        let markup = build(&dom, "menu", "m2", std::iter::empty()).unwrap();
        assert!(markup.anchors.is_empty());
        assert!(dom.children(markup.root).is_empty());
    }
}
