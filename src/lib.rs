#![cfg(target_arch = "wasm32")]
//! Browser front-end: attaches the bubble simulation to DOM elements and
//! drives it from `requestAnimationFrame`.

use aero_core::settings::{GlassSettings, HeuristicProbe};
use aero_core::{FilterCache, GlassOverrides};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;

mod audio;
mod bubble;
mod constants;
mod dom;
mod events;
mod frame;
mod menu;
mod particles;
mod renderer;
mod settings;

pub use audio::MusicPlayer;
pub use bubble::BubbleHandle;

use bubble::BubbleView;
use particles::BurstLayer;

/// Page-wide state shared by every bubble.
pub(crate) struct Page {
    pub filters: RefCell<FilterCache>,
    pub burst: Rc<RefCell<BurstLayer>>,
    pub settings: RefCell<GlassSettings<settings::LocalStore>>,
    pub filter_supported: bool,
    pub menu_open: Cell<bool>,
    bubbles: RefCell<Vec<Weak<RefCell<BubbleView>>>>,
}

impl Page {
    fn new() -> Self {
        let probe = HeuristicProbe::new(settings::device_hints());
        let filter_supported = settings::backdrop_filter_supported();
        if !filter_supported {
            log::warn!("[glass] backdrop-filter url() unsupported, refraction off");
        }
        Self {
            filters: RefCell::new(FilterCache::default()),
            burst: Rc::new(RefCell::new(BurstLayer::default())),
            settings: RefCell::new(GlassSettings::load(settings::LocalStore, &probe)),
            filter_supported,
            menu_open: Cell::new(false),
            bubbles: RefCell::new(Vec::new()),
        }
    }

    pub fn glass_enabled(&self) -> bool {
        self.settings.borrow().enabled()
    }

    pub fn low_power(&self) -> bool {
        self.settings.borrow().low_power()
    }

    pub fn register(&self, view: &Rc<RefCell<BubbleView>>) {
        let mut list = self.bubbles.borrow_mut();
        list.retain(|w| w.strong_count() > 0);
        list.push(Rc::downgrade(view));
    }

    /// Visit every live bubble; returns how many were visited.
    pub fn for_each_bubble(&self, mut f: impl FnMut(&mut BubbleView)) -> usize {
        let live: Vec<_> = self
            .bubbles
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for view in &live {
            f(&mut view.borrow_mut());
        }
        live.len()
    }
}

thread_local! {
    static PAGE: Page = Page::new();
}

pub(crate) fn with_page<R>(f: impl FnOnce(&Page) -> R) -> R {
    PAGE.with(f)
}

/// Per-bubble tuning; unset fields use the defaults.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, Default)]
pub struct GlassOptions {
    pub strength: Option<f32>,
    #[wasm_bindgen(js_name = chromaticAberration)]
    pub chromatic_aberration: Option<f32>,
    pub blur: Option<f32>,
    pub depth: Option<f32>,
    pub radius: Option<f32>,
    #[wasm_bindgen(js_name = wobbleIntensity)]
    pub wobble_intensity: Option<f32>,
    #[wasm_bindgen(js_name = wobbleSpeed)]
    pub wobble_speed: Option<f32>,
}

#[wasm_bindgen]
impl GlassOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GlassOptions {
        GlassOptions::default()
    }
}

impl From<GlassOptions> for GlassOverrides {
    fn from(o: GlassOptions) -> Self {
        GlassOverrides {
            strength: o.strength,
            chromatic_aberration: o.chromatic_aberration,
            blur: o.blur,
            depth: o.depth,
            radius: o.radius,
            wobble_intensity: o.wobble_intensity,
            wobble_speed: o.wobble_speed,
        }
    }
}

#[wasm_bindgen(js_name = glassEnabled)]
pub fn glass_enabled() -> bool {
    with_page(Page::glass_enabled)
}

#[wasm_bindgen(js_name = setGlassEnabled)]
pub fn set_glass_enabled(enabled: bool) {
    with_page(|p| {
        let mut settings = p.settings.borrow_mut();
        if enabled {
            settings.enable();
        } else {
            settings.disable();
        }
    });
    log::info!("[glass] {}", if enabled { "enabled" } else { "disabled" });
}

#[wasm_bindgen(js_name = toggleGlass)]
pub fn toggle_glass() -> bool {
    let enabled = with_page(|p| p.settings.borrow_mut().toggle());
    log::info!("[glass] {}", if enabled { "enabled" } else { "disabled" });
    enabled
}

#[wasm_bindgen(js_name = toggleMenu)]
pub fn toggle_menu() -> Result<bool, JsValue> {
    let document = dom::window_document().ok_or_else(|| JsValue::from_str("no document"))?;
    Ok(menu::toggle(&document))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("aero-web starting");

    if let Err(e) = init() {
        log::error!("init error: {:?}", e);
    }
    Ok(())
}

fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let (glass, filters) = with_page(|p| (p.glass_enabled(), p.filters.borrow().capacity()));
    log::info!("[glass] enabled={} cache={}", glass, filters);
    menu::wire(&document);
    Ok(())
}
