use crate::dom;
use crate::events::{self, ListenerGuard};
use crate::frame::RafLoop;
use crate::renderer::DomRenderer;
use crate::{with_page, GlassOptions};
use aero_core::{Bubble, BubbleConfig, BubbleEvent, RenderCache, TickContext};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

/// One bubble element and its simulation.
pub struct BubbleView {
    pub sim: Bubble,
    el: web::HtmlElement,
    container: web::Element,
    renderer: DomRenderer,
    cache: RenderCache,
}

impl BubbleView {
    fn new(el: web::HtmlElement, config: BubbleConfig, now_ms: f64) -> Self {
        let container = dom::container_of(&el);
        let renderer = DomRenderer::new(el.clone());
        let mut view = Self {
            sim: Bubble::new(config, now_ms),
            el,
            container,
            renderer,
            cache: RenderCache::new(),
        };
        view.measure();
        view
    }

    /// Re-read container, toggle and element geometry, then replan.
    pub fn measure(&mut self) {
        let container = dom::rect_of(&self.container);
        let anchor = dom::anchor_of(&self.container).map(|a| dom::rect_of(&a));
        self.sim.set_bounds(container, anchor, dom::viewport_width());
        // layout size, unaffected by our own transform
        self.sim
            .set_element_size(self.el.offset_width() as f32, self.el.offset_height() as f32);
    }

    pub fn is_floating(&self) -> bool {
        self.sim.is_floating()
    }

    pub fn pop(&mut self, now_ms: f64, rect: &aero_core::Rect) -> bool {
        with_page(|page| {
            let mut layer = page.burst.borrow_mut();
            self.sim.click(now_ms, rect, layer.pool_mut())
        })
    }

    pub fn frame(&mut self, now_ms: f64) {
        let style = with_page(|page| {
            let mut filters = page.filters.borrow_mut();
            let mut layer = page.burst.borrow_mut();
            let mut ctx = TickContext {
                filters: &mut filters,
                particles: layer.pool_mut(),
                glass_enabled: page.glass_enabled(),
                filter_supported: page.filter_supported,
            };
            self.sim.tick(now_ms, &mut ctx)
        });
        let Some(style) = style else {
            return;
        };
        self.cache.commit(&style, &mut self.renderer);
        let mut spawned = false;
        for ev in self.sim.take_events() {
            match ev {
                BubbleEvent::Popped { center } => {
                    log::debug!("[bubble] popped at ({:.0}, {:.0})", center.x, center.y)
                }
                BubbleEvent::Reappeared => spawned = true,
                BubbleEvent::Settled => log::debug!("[bubble {}] settled", self.sim.index()),
            }
        }
        if spawned {
            with_page(|page| crate::particles::wake(&page.burst));
        }
    }
}

/// A live bubble attached to a DOM element. Call `destroy` when the element
/// goes away; particle effects already in flight keep playing.
#[wasm_bindgen]
pub struct BubbleHandle {
    view: Rc<RefCell<BubbleView>>,
    raf: Option<RafLoop>,
    observer: Option<(web::ResizeObserver, Closure<dyn FnMut()>)>,
    listeners: Vec<ListenerGuard>,
}

fn observe_resize(
    view: &Rc<RefCell<BubbleView>>,
    targets: &[&web::Element],
) -> Option<(web::ResizeObserver, Closure<dyn FnMut()>)> {
    let weak = Rc::downgrade(view);
    let closure = Closure::wrap(Box::new(move || {
        if let Some(view) = weak.upgrade() {
            view.borrow_mut().measure();
        }
    }) as Box<dyn FnMut()>);
    let observer = match web::ResizeObserver::new(closure.as_ref().unchecked_ref()) {
        Ok(o) => o,
        Err(e) => {
            log::warn!("[bubble] ResizeObserver unavailable: {:?}", e);
            return None;
        }
    };
    for t in targets {
        observer.observe(t);
    }
    Some((observer, closure))
}

#[wasm_bindgen]
impl BubbleHandle {
    pub fn attach(
        element: web::HtmlElement,
        floating: bool,
        index: usize,
        count: usize,
        options: Option<GlassOptions>,
    ) -> BubbleHandle {
        _ = element.set_attribute(crate::constants::BUBBLE_ATTR, "true");
        let config = BubbleConfig {
            floating,
            expanded: false,
            index,
            count,
            overrides: options.unwrap_or_default().into(),
            low_power: with_page(|p| p.low_power()),
        };
        let view = Rc::new(RefCell::new(BubbleView::new(
            element.clone(),
            config,
            dom::now_ms(),
        )));

        let weak = Rc::downgrade(&view);
        let raf = RafLoop::new(move |_| match weak.upgrade() {
            Some(view) => {
                view.borrow_mut().frame(dom::now_ms());
                true
            }
            None => false,
        });
        raf.start();

        let container = view.borrow().container.clone();
        let el_ref: &web::Element = element.as_ref();
        let observer = observe_resize(&view, &[el_ref, &container]);
        let listeners = events::wire_pointer(&view, &element);
        with_page(|p| p.register(&view));
        log::info!("[bubble {}] attached (floating={})", index, floating);

        BubbleHandle {
            view,
            raf: Some(raf),
            observer,
            listeners,
        }
    }

    #[wasm_bindgen(js_name = setExpanded)]
    pub fn set_expanded(&self, expanded: bool) {
        self.view.borrow_mut().sim.set_expanded(expanded, dom::now_ms());
    }

    #[wasm_bindgen(js_name = setFloating)]
    pub fn set_floating(&self, floating: bool) {
        self.view.borrow_mut().sim.set_floating(floating);
    }

    #[wasm_bindgen(js_name = setIndex)]
    pub fn set_index(&self, index: usize) {
        self.view.borrow_mut().sim.set_index(index);
    }

    #[wasm_bindgen(js_name = setCount)]
    pub fn set_count(&self, count: usize) {
        self.view.borrow_mut().sim.set_count(count);
    }

    #[wasm_bindgen(js_name = setOptions)]
    pub fn set_options(&self, options: GlassOptions) {
        self.view.borrow_mut().sim.set_overrides(options.into());
    }

    /// Re-measure and draw a fresh layout.
    pub fn relayout(&self) {
        self.view.borrow_mut().measure();
    }

    /// Stop the frame loop, observers and listeners. Idempotent.
    pub fn destroy(&mut self) {
        if let Some(raf) = self.raf.take() {
            raf.stop();
        }
        if let Some((observer, _closure)) = self.observer.take() {
            observer.disconnect();
        }
        self.listeners.clear();
        let view = self.view.borrow();
        view.renderer.clear();
        log::debug!("[bubble {}] destroyed", view.sim.index());
    }
}

impl Drop for BubbleHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}
