//! End-to-end behavior of the context menu against the headless document.
//!
//! Each test drives the menu the way a user would: hovering, right-clicking,
//! pressing and clicking, then inspects the resulting document.

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use sp_menu_core::{EventResponse, HeadlessDom, Host, MenuError, NodeId};

    use crate::ContextMenu;

    const CLASS: &str = "sp-context-menu";

    /// Document with a `div#target` and an unrelated `p` next to it.
    fn page() -> (HeadlessDom, NodeId, NodeId) {
        let dom = HeadlessDom::new();
        let target = dom.create_element("div").unwrap();
        dom.set_attribute(&target, "id", "target").unwrap();
        dom.append_to_body(&target).unwrap();
        let elsewhere = dom.create_element("p").unwrap();
        dom.append_to_body(&elsewhere).unwrap();
        (dom, target, elsewhere)
    }

    fn row_labels(dom: &HeadlessDom, menu: NodeId) -> Vec<String> {
        dom.children(menu).into_iter().map(|row| dom.text_content(row)).collect()
    }

    /// Anchor of the `index`-th row.
    fn anchor(dom: &HeadlessDom, menu: NodeId, index: usize) -> NodeId {
        let row = dom.children(menu)[index];
        dom.children(row)[0]
    }

    fn counter() -> (Rc<Cell<usize>>, impl Fn(&ContextMenu<HeadlessDom>) + 'static) {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        (calls, move |_: &ContextMenu<HeadlessDom>| c.set(c.get() + 1))
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[test]
    fn test_rows_match_items_in_order() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        for label in ["Open", "Rename", "Open", "Delete"] {
            menu.add_item(label, |_| {});
        }
        menu.show().unwrap();

        let root = menu.rendered_node().unwrap();
        assert_eq!(dom.tag(root).as_deref(), Some("ul"));
        assert_eq!(dom.attribute(root, "class").as_deref(), Some(CLASS));
        assert_eq!(dom.parent(root), Some(dom.body()));
        assert_eq!(row_labels(&dom, root), vec!["Open", "Rename", "Open", "Delete"]);

        for row in dom.children(root) {
            assert_eq!(dom.tag(row).as_deref(), Some("li"));
            let link = dom.children(row)[0];
            assert_eq!(dom.tag(link).as_deref(), Some("a"));
            assert_eq!(dom.attribute(link, "href").as_deref(), Some("#"));
            assert_eq!(dom.tag(dom.children(link)[0]).as_deref(), Some("span"));
        }
    }

    #[test]
    fn test_show_then_hide_leaves_no_menu() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.add_item("Copy", |_| {});
        let listeners_before = dom.listener_count();

        menu.show().unwrap();
        assert!(menu.is_visible());
        assert_eq!(dom.listener_count(), listeners_before + 1);

        menu.hide();
        assert!(!menu.is_visible());
        assert!(dom.find_by_class(CLASS).is_empty());
        assert_eq!(dom.children(dom.body()).len(), 2);
        assert_eq!(dom.listener_count(), listeners_before);

        // Hiding again is a no-op.
        menu.hide();
        assert!(!menu.is_visible());
    }

    #[test]
    fn test_show_twice_keeps_one_popup_with_latest_items() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.add_item("Copy", |_| {});
        menu.show().unwrap();
        menu.add_item("Paste", |_| {});
        menu.show().unwrap();

        let menus = dom.find_by_class(CLASS);
        assert_eq!(menus.len(), 1);
        assert_eq!(row_labels(&dom, menus[0]), vec!["Copy", "Paste"]);
    }

    #[test]
    fn test_empty_menu_renders_empty_list() {
        let (dom, _, _) = page();
        let menu = ContextMenu::new(dom.clone(), None).unwrap();
        menu.show().unwrap();
        let root = menu.rendered_node().unwrap();
        assert!(dom.children(root).is_empty());
        assert_eq!(dom.style(root, "left").as_deref(), Some("0px"));
    }

    // =========================================================================
    // Position
    // =========================================================================

    #[test]
    fn test_setters_reposition_visible_popup() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.show().unwrap();
        let root = menu.rendered_node().unwrap();

        menu.set_x(50.0);
        assert_eq!(dom.style(root, "left").as_deref(), Some("50px"));
        menu.set_y(80.0);
        assert_eq!(dom.style(root, "top").as_deref(), Some("80px"));
        assert_eq!((menu.x(), menu.y()), (50.0, 80.0));
    }

    #[test]
    fn test_setters_while_hidden_apply_on_next_show() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.set_x(-10.0);
        menu.set_y(12.5);
        assert!(dom.find_by_class(CLASS).is_empty());

        menu.show().unwrap();
        let root = menu.rendered_node().unwrap();
        assert_eq!(dom.style(root, "left").as_deref(), Some("-10px"));
        assert_eq!(dom.style(root, "top").as_deref(), Some("12.5px"));
    }

    // =========================================================================
    // Selection
    // =========================================================================

    #[test]
    fn test_row_click_selects_once_then_hides() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        let (keep_calls, keep) = counter();
        let (delete_calls, delete) = counter();
        menu.add_item("Keep", keep);
        menu.add_item("Delete", delete);
        menu.show().unwrap();

        let link = anchor(&dom, menu.rendered_node().unwrap(), 1);
        dom.hover(link, 5.0, 5.0).unwrap();
        let response = dom.click();

        assert_eq!(delete_calls.get(), 1);
        assert_eq!(keep_calls.get(), 0);
        assert!(!menu.is_visible());
        assert!(dom.find_by_class(CLASS).is_empty());
        assert!(response.is_prevented(), "link navigation must be cancelled");
        assert_eq!(dom.focused(), None);
    }

    #[test]
    fn test_selection_runs_before_menu_is_detached() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        let visible_during_select = Rc::new(Cell::new(false));

        let v = visible_during_select.clone();
        menu.add_item("Inspect", move |m: &ContextMenu<HeadlessDom>| v.set(m.is_visible()));
        menu.show().unwrap();

        dom.hover(anchor(&dom, menu.rendered_node().unwrap(), 0), 1.0, 1.0).unwrap();
        dom.click();
        assert!(visible_during_select.get());
        assert!(!menu.is_visible());
    }

    #[test]
    fn test_callback_can_use_menu_reentrantly() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.add_item("Add entry", |m: &ContextMenu<HeadlessDom>| {
            m.add_item("Added", |_| {});
            m.set_x(99.0);
        });
        menu.show().unwrap();

        dom.hover(anchor(&dom, menu.rendered_node().unwrap(), 0), 1.0, 1.0).unwrap();
        dom.click();

        assert_eq!(menu.items(), vec!["Add entry", "Added"]);
        assert_eq!(menu.x(), 99.0);
        assert!(!menu.is_visible());
    }

    // =========================================================================
    // Trigger
    // =========================================================================

    #[test]
    fn test_right_click_on_target_shows_at_pointer() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.add_item("Copy", |_| {});

        dom.hover(target, 120.0, 45.0).unwrap();
        let response = dom.right_click();

        assert_eq!(response, EventResponse::PreventDefault);
        assert!(menu.is_visible());
        assert_eq!((menu.x(), menu.y()), (120.0, 45.0));
        let root = menu.rendered_node().unwrap();
        assert_eq!(dom.style(root, "left").as_deref(), Some("120px"));
        assert_eq!(dom.style(root, "top").as_deref(), Some("45px"));
    }

    #[test]
    fn test_right_click_on_target_child_counts_as_target() {
        let (dom, target, _) = page();
        let inner = dom.create_element("span").unwrap();
        dom.append_child(&target, &inner).unwrap();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();

        dom.hover(inner, 3.0, 4.0).unwrap();
        assert!(dom.right_click().is_prevented());
        assert!(menu.is_visible());
    }

    #[test]
    fn test_right_click_elsewhere_leaves_native_menu() {
        let (dom, target, elsewhere) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.add_item("Copy", |_| {});

        dom.hover(elsewhere, 10.0, 10.0).unwrap();
        assert_eq!(dom.right_click(), EventResponse::Proceed);
        assert!(!menu.is_visible());
        assert_eq!(menu.position(), Default::default());

        dom.leave();
        assert_eq!(dom.right_click(), EventResponse::Proceed);
        assert!(!menu.is_visible());
    }

    #[test]
    fn test_menu_without_target_never_triggers() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), None).unwrap();
        menu.add_item("Copy", |_| {});

        dom.hover(target, 10.0, 10.0).unwrap();
        assert_eq!(dom.right_click(), EventResponse::Proceed);
        assert!(!menu.is_visible());

        // Programmatic show still works.
        menu.show().unwrap();
        assert!(menu.is_visible());
    }

    #[test]
    fn test_second_right_click_moves_menu() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.add_item("Copy", |_| {});

        dom.hover(target, 10.0, 10.0).unwrap();
        dom.right_click();
        dom.hover(target, 30.0, 40.0).unwrap();
        dom.right_click();

        let menus = dom.find_by_class(CLASS);
        assert_eq!(menus.len(), 1);
        assert_eq!(dom.style(menus[0], "left").as_deref(), Some("30px"));
        assert_eq!(dom.style(menus[0], "top").as_deref(), Some("40px"));
    }

    // =========================================================================
    // Dismissal
    // =========================================================================

    #[test]
    fn test_press_inside_menu_keeps_it_open() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.add_item("Copy", |_| {});
        menu.show().unwrap();

        // Press on the container padding, not on a row.
        dom.hover(menu.rendered_node().unwrap(), 2.0, 2.0).unwrap();
        dom.click();
        assert!(menu.is_visible());

        dom.blur_window();
        assert!(menu.is_visible());
    }

    #[test]
    fn test_press_or_blur_elsewhere_hides() {
        let (dom, target, elsewhere) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.add_item("Copy", |_| {});

        menu.show().unwrap();
        dom.hover(elsewhere, 1.0, 1.0).unwrap();
        dom.click();
        assert!(!menu.is_visible());

        menu.show().unwrap();
        dom.blur_window();
        assert!(!menu.is_visible());
    }

    #[test]
    fn test_blur_dismissal_can_be_disabled() {
        let (dom, target, _) = page();
        let config = sp_menu_core::MenuConfig { dismiss_on_blur: false, ..Default::default() };
        let menu = ContextMenu::with_config(dom.clone(), Some(target), config).unwrap();
        menu.show().unwrap();

        dom.leave();
        dom.blur_window();
        assert!(menu.is_visible());
        dom.click();
        assert!(!menu.is_visible());
    }

    // =========================================================================
    // Multiple instances
    // =========================================================================

    #[test]
    fn test_instances_are_independent() {
        let (dom, target, elsewhere) = page();
        let first = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        let second = ContextMenu::new(dom.clone(), Some(elsewhere)).unwrap();
        first.add_item("First", |_| {});
        second.add_item("Second", |_| {});

        first.show().unwrap();
        second.show().unwrap();
        assert_eq!(dom.find_by_class(CLASS).len(), 2);

        second.hide();
        assert!(first.is_visible());
        assert_eq!(row_labels(&dom, dom.find_by_class(CLASS)[0]), vec!["First"]);
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    #[test]
    fn test_dispose_removes_window_listeners() {
        let (dom, target, _) = page();
        let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
        menu.add_item("Copy", |_| {});
        menu.show().unwrap();
        assert_eq!(dom.window_listener_count(), 2);

        menu.dispose();
        assert!(menu.is_disposed());
        assert!(!menu.is_visible());
        assert_eq!(dom.listener_count(), 0);

        dom.hover(target, 1.0, 1.0).unwrap();
        assert_eq!(dom.right_click(), EventResponse::Proceed);
        assert!(matches!(menu.show(), Err(MenuError::Disposed { .. })));

        // Idempotent.
        menu.dispose();
    }

    #[test]
    fn test_dropped_menu_stops_reacting() {
        let (dom, target, _) = page();
        let calls = Rc::new(RefCell::new(Vec::new()));
        {
            let menu = ContextMenu::new(dom.clone(), Some(target)).unwrap();
            let c = calls.clone();
            menu.add_item("Copy", move |_: &ContextMenu<HeadlessDom>| c.borrow_mut().push("copy"));
        }

        dom.hover(target, 1.0, 1.0).unwrap();
        assert_eq!(dom.right_click(), EventResponse::Proceed);
        assert!(dom.find_by_class(CLASS).is_empty());
        assert!(calls.borrow().is_empty());
        // Listeners are only removed by dispose.
        assert_eq!(dom.window_listener_count(), 2);
    }
}
