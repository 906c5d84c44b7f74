use crate::bubble::BubbleView;
use crate::dom;
use glam::Vec2;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// An event listener that unregisters itself when dropped.
pub struct ListenerGuard {
    target: web::EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
    }
}

pub fn listen<E>(
    target: &web::EventTarget,
    event: &'static str,
    mut handler: impl FnMut(E) + 'static,
) -> Option<ListenerGuard>
where
    E: JsCast + 'static,
{
    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        if let Ok(ev) = ev.dyn_into::<E>() {
            handler(ev);
        }
    }) as Box<dyn FnMut(web::Event)>);
    match target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        Ok(()) => Some(ListenerGuard {
            target: target.clone(),
            event,
            closure,
        }),
        Err(e) => {
            log::error!("[events] {} listener: {:?}", event, e);
            None
        }
    }
}

#[inline]
fn client_pos(ev: &web::PointerEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

fn with_view(weak: &Weak<RefCell<BubbleView>>, f: impl FnOnce(&mut BubbleView)) {
    if let Some(view) = weak.upgrade() {
        f(&mut view.borrow_mut());
    }
}

/// Hover attraction and click-to-pop on a bubble element.
pub fn wire_pointer(view: &Rc<RefCell<BubbleView>>, el: &web::HtmlElement) -> Vec<ListenerGuard> {
    let target: &web::EventTarget = el.as_ref();
    let mut guards = Vec::with_capacity(4);

    let weak = Rc::downgrade(view);
    let node = el.clone();
    guards.extend(listen(target, "pointerenter", move |ev: web::PointerEvent| {
        let rect = dom::rect_of(&node);
        with_view(&weak, |v| v.sim.pointer_enter(client_pos(&ev), &rect));
    }));

    let weak = Rc::downgrade(view);
    let node = el.clone();
    guards.extend(listen(target, "pointermove", move |ev: web::PointerEvent| {
        let rect = dom::rect_of(&node);
        with_view(&weak, |v| v.sim.pointer_move(client_pos(&ev), &rect));
    }));

    let weak = Rc::downgrade(view);
    guards.extend(listen(target, "pointerleave", move |_: web::PointerEvent| {
        with_view(&weak, |v| v.sim.pointer_leave());
    }));

    let weak = Rc::downgrade(view);
    let node = el.clone();
    guards.extend(listen(target, "click", move |_: web::MouseEvent| {
        let rect = dom::rect_of(&node);
        let Some(view) = weak.upgrade() else {
            return;
        };
        let popped = view.borrow_mut().pop(dom::now_ms(), &rect);
        if popped {
            crate::with_page(|page| crate::particles::wake(&page.burst));
        }
    }));

    guards
}
