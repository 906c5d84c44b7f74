use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

struct LoopState {
    id: Cell<Option<i32>>,
    closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

/// A requestAnimationFrame loop. The callback returns whether to keep
/// running; a stopped loop can be started again. Dropping it cancels the
/// pending frame and frees the closure.
pub struct RafLoop {
    state: Rc<LoopState>,
}

impl RafLoop {
    pub fn new(mut frame: impl FnMut(f64) -> bool + 'static) -> Self {
        let state = Rc::new(LoopState {
            id: Cell::new(None),
            closure: RefCell::new(None),
        });
        let weak = Rc::downgrade(&state);
        let closure = Closure::wrap(Box::new(move |ts: f64| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.id.set(None);
            if frame(ts) {
                request(&state);
            }
        }) as Box<dyn FnMut(f64)>);
        *state.closure.borrow_mut() = Some(closure);
        Self { state }
    }

    pub fn start(&self) {
        if self.state.id.get().is_none() {
            request(&self.state);
        }
    }

    pub fn stop(&self) {
        if let Some(id) = self.state.id.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.stop();
        self.state.closure.borrow_mut().take();
    }
}

fn request(state: &LoopState) {
    let Some(w) = web::window() else {
        return;
    };
    let closure = state.closure.borrow();
    if let Some(c) = closure.as_ref() {
        match w.request_animation_frame(c.as_ref().unchecked_ref()) {
            Ok(id) => state.id.set(Some(id)),
            Err(e) => log::error!("[frame] requestAnimationFrame failed: {:?}", e),
        }
    }
}
