use crate::constants::{MENU_OPEN_CLASS, MENU_TOGGLE_SELECTOR, NAV_CONTAINER_SELECTOR};
use crate::{audio, dom, with_page};
use web_sys as web;

/// Flip the menu: every floating bubble flies in or out, with sound.
pub fn toggle(document: &web::Document) -> bool {
    let open = with_page(|page| {
        let open = !page.menu_open.get();
        page.menu_open.set(open);
        open
    });
    if open {
        audio::play_menu_sequence();
    } else {
        audio::play_pop();
    }
    if let Ok(Some(nav)) = document.query_selector(NAV_CONTAINER_SELECTOR) {
        let classes = nav.class_list();
        _ = if open {
            classes.add_1(MENU_OPEN_CLASS)
        } else {
            classes.remove_1(MENU_OPEN_CLASS)
        };
    }
    let now = dom::now_ms();
    let moved = with_page(|page| {
        page.for_each_bubble(|view| {
            if view.is_floating() {
                view.sim.set_expanded(open, now);
            }
        })
    });
    log::info!("[menu] {} ({} bubbles)", if open { "open" } else { "closed" }, moved);
    open
}

/// Hook the page's menu toggle button, if it has one.
pub fn wire(document: &web::Document) {
    let doc = document.clone();
    if dom::add_click_listener(document, MENU_TOGGLE_SELECTOR, move || {
        toggle(&doc);
    }) {
        log::info!("[menu] toggle wired");
    }
}
