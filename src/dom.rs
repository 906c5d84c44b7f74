use crate::constants::NAV_CONTAINER_SELECTOR;
use aero_core::{Rect, DEFAULT_VIEWPORT_WIDTH};
use instant::Instant;
use wasm_bindgen::JsCast;
use web_sys as web;

thread_local! {
    static EPOCH: Instant = Instant::now();
}

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Milliseconds on the page clock shared by every animation.
#[inline]
pub fn now_ms() -> f64 {
    EPOCH.with(|e| e.elapsed().as_secs_f64() * 1000.0)
}

#[inline]
pub fn rect_of(el: &web::Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
}

pub fn viewport_width() -> f32 {
    web::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .map(|v| v as f32)
        .filter(|v| *v > 0.0)
        .unwrap_or(DEFAULT_VIEWPORT_WIDTH)
}

/// Closest nav container, else the parent, else the element itself.
pub fn container_of(el: &web::Element) -> web::Element {
    el.closest(NAV_CONTAINER_SELECTOR)
        .ok()
        .flatten()
        .or_else(|| el.parent_element())
        .unwrap_or_else(|| el.clone())
}

/// The menu toggle sits right before the nav container.
#[inline]
pub fn anchor_of(container: &web::Element) -> Option<web::Element> {
    container.previous_element_sibling()
}

pub fn create_div(document: &web::Document) -> anyhow::Result<web::HtmlElement> {
    document
        .create_element("div")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into::<web::HtmlElement>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))
}

#[inline]
pub fn set_style(el: &web::HtmlElement, property: &str, value: &str) {
    if let Err(e) = el.style().set_property(property, value) {
        log::warn!("[dom] set {} failed: {:?}", property, e);
    }
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    selector: &str,
    mut handler: impl FnMut() + 'static,
) -> bool {
    match document.query_selector(selector) {
        Ok(Some(el)) => {
            let closure = wasm_bindgen::closure::Closure::wrap(
                Box::new(move || handler()) as Box<dyn FnMut()>
            );
            _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
            true
        }
        _ => false,
    }
}
