use crate::constants::*;
use crate::dom;
use aero_core::fade::{Commands, MediaCommand, MusicLoop, EFFECT_VOLUME, MENU_EXTRA_DELAY_MS};
use rand::seq::SliceRandom;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

struct MusicInner {
    audio: web::HtmlAudioElement,
    scheduler: MusicLoop,
    timer: Option<i32>,
    tick_cb: Option<Closure<dyn FnMut()>>,
}

impl Drop for MusicInner {
    fn drop(&mut self) {
        _ = self.audio.pause();
        if let (Some(id), Some(w)) = (self.timer.take(), web::window()) {
            w.clear_timeout_with_handle(id);
        }
    }
}

fn is_autoplay_block(err: &JsValue) -> bool {
    js_sys::Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|n| n.as_string())
        .is_some_and(|n| n == "NotAllowedError")
}

fn play_element(audio: &web::HtmlAudioElement) -> anyhow::Result<JsFuture> {
    let promise = audio.play().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(JsFuture::from(promise))
}

/// Apply scheduler output, then arm the ticker if the scheduler wants one.
/// An empty batch can still start a fade.
fn execute(inner: &Rc<RefCell<MusicInner>>, cmds: Commands) {
    let audio = inner.borrow().audio.clone();
    for cmd in cmds {
        match cmd {
            MediaCommand::SetVolume(v) => audio.set_volume(v),
            MediaCommand::Pause => {
                if let Err(e) = audio.pause() {
                    log::warn!("[music] pause failed: {:?}", e);
                }
            }
            MediaCommand::Rewind => audio.set_current_time(0.0),
            MediaCommand::Play => {
                let weak = Rc::downgrade(inner);
                let fut = play_element(&audio);
                spawn_local(async move {
                    let result = match fut {
                        Ok(f) => f.await.map(|_| ()),
                        Err(e) => {
                            log::error!("[music] {:?}", e);
                            return;
                        }
                    };
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };
                    match result {
                        Ok(()) => {
                            log::info!("[music] playing");
                            inner.borrow_mut().scheduler.play_started(dom::now_ms());
                        }
                        Err(e) => {
                            let blocked = is_autoplay_block(&e);
                            if !blocked {
                                log::error!("[music] play rejected: {:?}", e);
                            }
                            inner.borrow_mut().scheduler.play_failed(blocked);
                        }
                    }
                    ensure_ticking(&inner);
                });
            }
        }
    }
    ensure_ticking(inner);
}

fn ensure_ticking(inner: &Rc<RefCell<MusicInner>>) {
    let mut m = inner.borrow_mut();
    if m.timer.is_some() || !m.scheduler.needs_tick() {
        return;
    }
    if m.tick_cb.is_none() {
        let weak = Rc::downgrade(inner);
        m.tick_cb = Some(Closure::wrap(Box::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let cmds = {
                let mut m = inner.borrow_mut();
                m.timer = None;
                m.scheduler.tick(dom::now_ms())
            };
            execute(&inner, cmds);
        }) as Box<dyn FnMut()>));
    }
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = m.tick_cb.as_ref() {
        match w.set_timeout_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            MUSIC_TICK_MS,
        ) {
            Ok(id) => m.timer = Some(id),
            Err(e) => log::error!("[music] setTimeout failed: {:?}", e),
        }
    }
}

fn listen(target: &web::EventTarget, event: &str, weak: Weak<RefCell<MusicInner>>, f: fn(&Rc<RefCell<MusicInner>>)) {
    let closure = Closure::wrap(Box::new(move || {
        if let Some(inner) = weak.upgrade() {
            f(&inner);
        }
    }) as Box<dyn FnMut()>);
    _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn on_time_update(inner: &Rc<RefCell<MusicInner>>) {
    let mut m = inner.borrow_mut();
    let (pos, dur) = (m.audio.current_time(), m.audio.duration());
    m.scheduler.time_update(dom::now_ms(), pos, dur);
    drop(m);
    ensure_ticking(inner);
}

fn on_ended(inner: &Rc<RefCell<MusicInner>>) {
    inner.borrow_mut().scheduler.ended(dom::now_ms());
    ensure_ticking(inner);
}

fn on_gesture(inner: &Rc<RefCell<MusicInner>>) {
    let cmds = inner.borrow_mut().scheduler.user_gesture();
    execute(inner, cmds);
}

/// Looping background track with stepped fades, plus the bubble sound effects.
#[wasm_bindgen]
pub struct MusicPlayer {
    inner: Rc<RefCell<MusicInner>>,
}

#[wasm_bindgen]
impl MusicPlayer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<MusicPlayer, JsValue> {
        let audio = web::HtmlAudioElement::new_with_src(MUSIC_TRACK)?;
        audio.set_preload("auto");
        audio.set_volume(0.0);
        let inner = Rc::new(RefCell::new(MusicInner {
            audio: audio.clone(),
            scheduler: MusicLoop::default(),
            timer: None,
            tick_cb: None,
        }));
        let target: &web::EventTarget = audio.as_ref();
        listen(target, "timeupdate", Rc::downgrade(&inner), on_time_update);
        listen(target, "ended", Rc::downgrade(&inner), on_ended);
        if let Some(document) = dom::window_document() {
            for ev in GESTURE_EVENTS {
                listen(document.as_ref(), ev, Rc::downgrade(&inner), on_gesture);
            }
        }
        Ok(MusicPlayer { inner })
    }

    #[wasm_bindgen(js_name = startLooping)]
    pub fn start_looping(&self) {
        let cmds = self.inner.borrow_mut().scheduler.start();
        execute(&self.inner, cmds);
    }

    #[wasm_bindgen(js_name = stopLooping)]
    pub fn stop_looping(&self) {
        let cmds = self.inner.borrow_mut().scheduler.stop(dom::now_ms());
        execute(&self.inner, cmds);
    }

    #[wasm_bindgen(getter, js_name = isLooping)]
    pub fn is_looping(&self) -> bool {
        self.inner.borrow().scheduler.is_looping()
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) {
        let cmds = self.inner.borrow_mut().scheduler.set_volume(volume);
        execute(&self.inner, cmds);
    }

    #[wasm_bindgen(js_name = playBubblePop)]
    pub fn play_bubble_pop(&self) {
        play_pop();
    }

    #[wasm_bindgen(js_name = playExtraBubbles)]
    pub fn play_extra_bubbles(&self) {
        play_extra();
    }

    #[wasm_bindgen(js_name = playMenuBubbleSequence)]
    pub fn play_menu_bubble_sequence(&self) {
        play_menu_sequence();
    }
}

fn play_effect(src: &str) {
    let audio = match web::HtmlAudioElement::new_with_src(src) {
        Ok(a) => a,
        Err(e) => {
            log::warn!("[audio] {}: {:?}", src, e);
            return;
        }
    };
    audio.set_volume(EFFECT_VOLUME);
    match play_element(&audio) {
        Ok(fut) => spawn_local(async move {
            if let Err(e) = fut.await {
                log::debug!("[audio] effect not played: {:?}", e);
            }
        }),
        Err(e) => log::debug!("[audio] effect not played: {:?}", e),
    }
}

pub fn play_pop() {
    if let Some(src) = POP_SOUNDS.choose(&mut rand::thread_rng()) {
        play_effect(src);
    }
}

pub fn play_extra() {
    if let Some(src) = EXTRA_SOUNDS.choose(&mut rand::thread_rng()) {
        play_effect(src);
    }
}

/// Pop now, bubbling flourish shortly after.
pub fn play_menu_sequence() {
    play_pop();
    let Some(w) = web::window() else {
        return;
    };
    let later = Closure::once_into_js(play_extra);
    if let Err(e) = w.set_timeout_with_callback_and_timeout_and_arguments_0(
        later.unchecked_ref(),
        MENU_EXTRA_DELAY_MS,
    ) {
        log::warn!("[audio] menu sequence: {:?}", e);
    }
}
