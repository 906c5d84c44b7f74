//! DOM side of the particle pool: a fixed overlay holding one wrapper per
//! burst, one div per live particle, and a frame loop that only runs while
//! something is alive.

use crate::constants::*;
use crate::dom;
use crate::frame::RafLoop;
use aero_core::particles::BurstId;
use aero_core::{ParticleFrame, ParticleHandle, ParticleKind, ParticlePool};
use fnv::FnvHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys as web;

/// A particle's DOM. `band` is set for the shine, whose clipped inner band
/// is what sweeps.
struct ParticleNode {
    outer: web::HtmlElement,
    band: Option<web::HtmlElement>,
}

impl ParticleNode {
    fn animated(&self) -> &web::HtmlElement {
        self.band.as_ref().unwrap_or(&self.outer)
    }
}

pub struct BurstLayer {
    pool: ParticlePool,
    overlay: Option<web::HtmlElement>,
    bursts: FnvHashMap<BurstId, web::HtmlElement>,
    nodes: FnvHashMap<ParticleHandle, ParticleNode>,
    raf: Option<RafLoop>,
}

impl Default for BurstLayer {
    fn default() -> Self {
        Self {
            pool: ParticlePool::default(),
            overlay: None,
            bursts: FnvHashMap::default(),
            nodes: FnvHashMap::default(),
            raf: None,
        }
    }
}

fn base_style(kind: ParticleKind, tint: u8) -> String {
    match kind {
        ParticleKind::Flash => FLASH_STYLE.to_owned(),
        ParticleKind::Ring => RING_STYLE.to_owned(),
        ParticleKind::RingOuter => RING_OUTER_STYLE.to_owned(),
        ParticleKind::Mist => MIST_STYLE.to_owned(),
        ParticleKind::Droplet => {
            let color = DROPLET_COLORS[tint as usize % DROPLET_COLORS.len()];
            format!(
                "border-radius: 999px; background: radial-gradient(60% 60% at 50% 50%, {color}, rgba(255,255,255,0) 70%); box-shadow: {DROPLET_SHADOW};"
            )
        }
        ParticleKind::Shard => SHARD_STYLE.to_owned(),
        ParticleKind::Shine => SHINE_CLIP_STYLE.to_owned(),
        ParticleKind::RimHalo => RIM_HALO_STYLE.to_owned(),
        ParticleKind::InnerPulse => INNER_PULSE_STYLE.to_owned(),
        ParticleKind::Ingress => INGRESS_STYLE.to_owned(),
    }
}

fn transform(f: &ParticleFrame) -> String {
    match f.kind {
        ParticleKind::Shine => format!(
            "translateX({:.1}%) skewX({}deg)",
            f.sweep * 100.0,
            SHINE_SKEW_DEG
        ),
        ParticleKind::Shard => format!(
            "translate3d({:.2}px, {:.2}px, 0) rotate({:.1}deg) scale({:.3})",
            f.dx, f.dy, f.rotation_deg, f.scale
        ),
        _ => format!(
            "translate3d({:.2}px, {:.2}px, 0) scale({:.3})",
            f.dx, f.dy, f.scale
        ),
    }
}

impl BurstLayer {
    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    fn ensure_overlay(&mut self, document: &web::Document) -> Option<web::HtmlElement> {
        if let Some(o) = &self.overlay {
            if o.is_connected() {
                return Some(o.clone());
            }
        }
        let overlay = dom::create_div(document)
            .map_err(|e| log::error!("[particles] overlay: {:?}", e))
            .ok()?;
        overlay.style().set_css_text(&format!(
            "position: fixed; left: 0; top: 0; width: 0; height: 0; overflow: visible; pointer-events: none; z-index: {BURST_LAYER_Z_INDEX};"
        ));
        let body = document.body()?;
        if let Err(e) = body.append_child(&overlay) {
            log::error!("[particles] attach overlay: {:?}", e);
            return None;
        }
        self.overlay = Some(overlay.clone());
        Some(overlay)
    }

    /// Parent for a new particle: its burst's wrapper, else the overlay.
    fn parent_for(&mut self, document: &web::Document, handle: ParticleHandle) -> Option<web::HtmlElement> {
        let overlay = self.ensure_overlay(document)?;
        let Some(id) = self.pool.group_of(handle) else {
            return Some(overlay);
        };
        if let Some(w) = self.bursts.get(&id) {
            return Some(w.clone());
        }
        let wrapper = dom::create_div(document).ok()?;
        wrapper.style().set_css_text(BURST_WRAPPER_STYLE);
        overlay.append_child(&wrapper).ok()?;
        self.bursts.insert(id, wrapper.clone());
        Some(wrapper)
    }

    fn drop_burst(&mut self, id: BurstId) {
        if let Some(w) = self.bursts.remove(&id) {
            w.remove();
        }
    }

    fn spawn_node(&mut self, handle: ParticleHandle, f: &ParticleFrame) {
        let Some(document) = dom::window_document() else {
            return;
        };
        let Some(parent) = self.parent_for(&document, handle) else {
            return;
        };
        let Ok(node) = dom::create_div(&document) else {
            return;
        };
        node.style().set_css_text(&format!(
            "position: absolute; left: {:.2}px; top: {:.2}px; width: {:.2}px; height: {:.2}px; pointer-events: none; will-change: transform, opacity; {}",
            f.x,
            f.y,
            f.width,
            f.height,
            base_style(f.kind, f.tint)
        ));
        let band = match f.kind {
            ParticleKind::Shine => {
                let Ok(band) = dom::create_div(&document) else {
                    return;
                };
                band.style().set_css_text(SHINE_BAND_STYLE);
                if node.append_child(&band).is_err() {
                    return;
                }
                Some(band)
            }
            _ => None,
        };
        if parent.append_child(&node).is_ok() {
            self.nodes.insert(handle, ParticleNode { outer: node, band });
        }
    }

    fn remove_node(&mut self, handle: &ParticleHandle) {
        if let Some(node) = self.nodes.remove(handle) {
            node.outer.remove();
        }
    }

    /// Advance every live particle. Returns whether another frame is needed.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        for h in self.pool.tick(now_ms) {
            self.remove_node(&h);
        }
        let (groups, cut) = self.pool.expire_groups(now_ms);
        for h in &cut {
            self.remove_node(h);
        }
        if !cut.is_empty() {
            log::debug!("[particles] backstop removed {} stragglers", cut.len());
        }
        for id in &groups {
            self.drop_burst(*id);
        }
        if !groups.is_empty() {
            log::trace!("[particles] retired bursts {:?}", groups);
        }
        for (handle, f) in self.pool.frames(now_ms) {
            if !self.nodes.contains_key(&handle) {
                self.spawn_node(handle, &f);
            }
            if let Some(node) = self.nodes.get(&handle) {
                dom::set_style(node.animated(), "transform", &transform(&f));
                dom::set_style(&node.outer, "opacity", &format!("{:.3}", f.opacity));
            }
        }
        // recycled slots leave orphans behind
        let stale: Vec<ParticleHandle> = self
            .nodes
            .keys()
            .filter(|h| self.pool.is_expired(**h))
            .copied()
            .collect();
        for h in &stale {
            self.remove_node(h);
        }
        !self.pool.is_idle()
    }
}

/// Make sure the overlay loop is running if anything is alive.
pub fn wake(layer: &Rc<RefCell<BurstLayer>>) {
    let mut l = layer.borrow_mut();
    if l.pool.is_idle() {
        return;
    }
    if l.raf.is_none() {
        let weak = Rc::downgrade(layer);
        l.raf = Some(RafLoop::new(move |_| {
            let Some(layer) = weak.upgrade() else {
                return false;
            };
            let more = layer.borrow_mut().frame(dom::now_ms());
            more
        }));
    }
    if let Some(raf) = &l.raf {
        raf.start();
    }
}
