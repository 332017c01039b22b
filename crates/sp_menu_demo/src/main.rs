//! sp-menu demo - drives a context menu through a scripted headless session.
//!
//! Usage: `sp_menu_demo [config.json]`

mod logging;

use std::process::ExitCode;

use sp_menu::{ContextMenu, HeadlessDom, Host, MenuConfig, MenuError, NodeId};

use crate::logging::LogSettings;

fn main() -> ExitCode {
    let _logging_guard = logging::init(&LogSettings::from_env());

    tracing::info!("Starting sp-menu demo");

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, hint = e.hint().unwrap_or(""), "Demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<String>) -> Result<(), MenuError> {
    let config = match config_path {
        Some(path) => MenuConfig::load(path)?,
        None => MenuConfig::default(),
    };

    let dom = HeadlessDom::new();
    let canvas = dom.create_element("div")?;
    dom.set_attribute(&canvas, "id", "canvas")?;
    dom.append_to_body(&canvas)?;
    let sidebar = dom.create_element("aside")?;
    dom.append_to_body(&sidebar)?;

    let menu = ContextMenu::with_config(dom.clone(), Some(canvas), config)?;
    menu.add_item("Copy", |_| tracing::info!("Copy selected"));
    menu.add_item("Paste", |_| tracing::info!("Paste selected"));
    menu.add_item("Delete", |menu: &ContextMenu<HeadlessDom>| {
        tracing::info!(x = menu.x(), y = menu.y(), "Delete selected");
    });

    dom.hover(sidebar, 300.0, 20.0)?;
    let response = dom.right_click();
    tracing::info!(
        prevented = response.is_prevented(),
        visible = menu.is_visible(),
        "Right-click outside target"
    );

    dom.hover(canvas, 64.0, 48.0)?;
    let response = dom.right_click();
    tracing::info!(
        prevented = response.is_prevented(),
        visible = menu.is_visible(),
        "Right-click on target"
    );
    log_body(&dom);

    let Some(root) = menu.rendered_node() else {
        return Err(MenuError::internal("Menu did not open over its target"));
    };
    dom.hover(root, 66.0, 50.0)?;
    dom.click();
    tracing::info!(visible = menu.is_visible(), "Press inside menu");

    let delete = last_row_anchor(&dom, root)
        .ok_or_else(|| MenuError::internal("Menu has no rows"))?;
    dom.hover(delete, 70.0, 90.0)?;
    let response = dom.click();
    tracing::info!(
        prevented = response.is_prevented(),
        visible = menu.is_visible(),
        "Clicked last row"
    );
    log_body(&dom);

    menu.dispose();
    tracing::info!(listeners = dom.listener_count(), "Menu disposed");
    Ok(())
}

fn last_row_anchor(dom: &HeadlessDom, root: NodeId) -> Option<NodeId> {
    let row = *dom.children(root).last()?;
    dom.children(row).first().copied()
}

fn log_body(dom: &HeadlessDom) {
    tracing::debug!(html = %dom.outer_html(dom.body()), "Document");
}
