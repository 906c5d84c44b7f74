use crate::constants::BACKDROP_PROBE_VALUE;
use aero_core::settings::{DeviceHints, PreferenceStore};
use wasm_bindgen::JsValue;
use web_sys as web;

/// `window.localStorage`, when the browser lets us have it.
#[derive(Default)]
pub struct LocalStore;

impl LocalStore {
    fn storage() -> anyhow::Result<web::Storage> {
        web::window()
            .ok_or_else(|| anyhow::anyhow!("no window"))?
            .local_storage()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("localStorage unavailable"))
    }
}

impl PreferenceStore for LocalStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| anyhow::anyhow!("{:?}", e))
    }

    fn save(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| anyhow::anyhow!("{:?}", e))
    }
}

fn js_get(target: &JsValue, key: &str) -> Option<JsValue> {
    js_sys::Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Device signals from `navigator` and `window`.
pub fn device_hints() -> DeviceHints {
    let Some(window) = web::window() else {
        return DeviceHints::default();
    };
    let navigator = window.navigator();
    let has_touch = js_sys::Reflect::has(&window, &JsValue::from_str("ontouchstart"))
        .unwrap_or(false)
        || navigator.max_touch_points() > 0;
    let nav: &JsValue = navigator.as_ref();
    let save_data = js_get(nav, "connection")
        .and_then(|c| js_get(&c, "saveData"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let cores = navigator.hardware_concurrency();
    DeviceHints {
        has_touch,
        viewport_width: crate::dom::viewport_width(),
        user_agent: navigator.user_agent().unwrap_or_default(),
        device_memory_gb: js_get(nav, "deviceMemory").and_then(|v| v.as_f64()),
        hardware_concurrency: (cores > 0.0).then_some(cores as u32),
        save_data,
    }
}

/// Whether `backdrop-filter` (or its WebKit alias) accepts an SVG url.
pub fn backdrop_filter_supported() -> bool {
    ["backdrop-filter", "-webkit-backdrop-filter"]
        .iter()
        .any(|p| web::css::supports_with_property_and_value(p, BACKDROP_PROBE_VALUE).unwrap_or(false))
}
