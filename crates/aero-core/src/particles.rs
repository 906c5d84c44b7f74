//! Pop and reappear particle effects.
//!
//! Particles live in a fixed-size slot pool with generation-checked handles.
//! The pool only does bookkeeping and keyframe sampling; the host owns the
//! actual visuals and removes one as soon as its handle reports expired.
//! Nothing here refers back to the bubble that spawned a burst, so effects
//! finish on their own even if the bubble is torn down mid-animation.

use crate::constants::*;
use crate::easing::CubicBezier;
use crate::layout::Rect;
use glam::Vec2;
use rand::Rng;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

const EASE_BURST: CubicBezier = CubicBezier::new(0.2, 0.7, 0.2, 1.0);
const EASE_FLASH: CubicBezier = CubicBezier::new(0.2, 0.6, 0.2, 1.0);
const EASE_RING: CubicBezier = CubicBezier::new(0.25, 0.6, 0.2, 1.0);
const EASE_SHINE: CubicBezier = CubicBezier::new(0.15, 0.7, 0.2, 1.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Bright core flash at the pop center.
    Flash,
    /// Thick shockwave ring.
    Ring,
    /// Thin outer shockwave ring.
    RingOuter,
    Mist,
    /// Round water droplet flung outward.
    Droplet,
    /// Streak of torn membrane.
    Shard,
    /// Diagonal highlight sweeping across the regrown bubble.
    Shine,
    RimHalo,
    InnerPulse,
    /// Droplet pulled back into the bubble while it reforms.
    Ingress,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub offset: f32,
    pub dx: f32,
    pub dy: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Keyframe {
    pub const fn new(offset: f32, dx: f32, dy: f32, scale: f32, opacity: f32) -> Self {
        Self {
            offset,
            dx,
            dy,
            scale,
            opacity,
        }
    }

    fn lerp(&self, other: &Keyframe, t: f32) -> Keyframe {
        let l = |a: f32, b: f32| a + (b - a) * t;
        Keyframe {
            offset: l(self.offset, other.offset),
            dx: l(self.dx, other.dx),
            dy: l(self.dy, other.dy),
            scale: l(self.scale, other.scale),
            opacity: l(self.opacity, other.opacity),
        }
    }
}

/// What to spawn. `origin` is the top-left corner in viewport pixels.
#[derive(Clone, Debug)]
pub struct ParticleSpec {
    pub kind: ParticleKind,
    pub origin: Vec2,
    pub size: Vec2,
    pub rotation_deg: f32,
    /// Palette index for kinds that come in several tints.
    pub tint: u8,
    pub duration_ms: f64,
    pub easing: CubicBezier,
    pub keyframes: SmallVec<[Keyframe; 4]>,
    /// Start/end position of the shine gradient, in element widths.
    pub sweep: (f32, f32),
}

/// Sampled state of a live particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleFrame {
    pub kind: ParticleKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation_deg: f32,
    pub tint: u8,
    pub dx: f32,
    pub dy: f32,
    pub scale: f32,
    pub opacity: f32,
    pub sweep: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleHandle {
    slot: u32,
    generation: u32,
}

impl ParticleHandle {
    pub fn slot(&self) -> usize {
        self.slot as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BurstId(pub u32);

#[derive(Debug)]
struct Slot {
    generation: u32,
    alive: bool,
    started_ms: f64,
    spec: Option<ParticleSpec>,
}

#[derive(Debug)]
struct BurstGroup {
    id: BurstId,
    created_ms: f64,
    members: SmallVec<[ParticleHandle; 32]>,
}

/// One-shot guards for the reappear effects of a single pop cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReappearFlags {
    pub shine_emitted: bool,
    pub inflation_emitted: bool,
}

#[derive(Debug)]
pub struct ParticlePool {
    slots: Vec<Slot>,
    free: VecDeque<usize>,
    live: VecDeque<usize>,
    groups: Vec<BurstGroup>,
    next_group: u32,
    backstop_ms: f64,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::with_capacity(PARTICLE_POOL_CAPACITY)
    }
}

impl ParticlePool {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                alive: false,
                started_ms: 0.0,
                spec: None,
            })
            .collect();
        Self {
            slots,
            free: (0..capacity).collect(),
            live: VecDeque::with_capacity(capacity),
            groups: Vec::new(),
            next_group: 0,
            backstop_ms: BURST_BACKSTOP_MS,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_idle(&self) -> bool {
        self.live.is_empty() && self.groups.is_empty()
    }

    /// Open a burst group; particles spawned into it share a backstop timer.
    pub fn begin_group(&mut self, now_ms: f64) -> BurstId {
        let id = BurstId(self.next_group);
        self.next_group = self.next_group.wrapping_add(1);
        self.groups.push(BurstGroup {
            id,
            created_ms: now_ms,
            members: SmallVec::new(),
        });
        id
    }

    /// Claim a slot. When the pool is full the oldest live particle is
    /// recycled; its handle turns expired.
    pub fn spawn(&mut self, spec: ParticleSpec, now_ms: f64) -> ParticleHandle {
        let idx = match self.free.pop_front() {
            Some(i) => i,
            None => {
                let oldest = self.live.pop_front().unwrap_or(0);
                log::trace!("[particles] pool full, recycling slot {}", oldest);
                self.slots[oldest].alive = false;
                oldest
            }
        };
        let slot = &mut self.slots[idx];
        slot.generation = slot.generation.wrapping_add(1);
        slot.alive = true;
        slot.started_ms = now_ms;
        slot.spec = Some(spec);
        self.live.push_back(idx);
        ParticleHandle {
            slot: idx as u32,
            generation: slot.generation,
        }
    }

    pub fn spawn_in(&mut self, group: BurstId, spec: ParticleSpec, now_ms: f64) -> ParticleHandle {
        let handle = self.spawn(spec, now_ms);
        if let Some(g) = self.groups.iter_mut().find(|g| g.id == group) {
            g.members.push(handle);
        }
        handle
    }

    /// The burst a live particle was spawned into, if any.
    pub fn group_of(&self, handle: ParticleHandle) -> Option<BurstId> {
        if self.is_expired(handle) {
            return None;
        }
        self.groups
            .iter()
            .find(|g| g.members.contains(&handle))
            .map(|g| g.id)
    }

    fn release(&mut self, idx: usize) {
        let slot = &mut self.slots[idx];
        if slot.alive {
            slot.alive = false;
            slot.spec = None;
            self.free.push_back(idx);
        }
    }

    /// Retire every particle whose animation has finished. Returns the
    /// handles retired this call so the host can drop their visuals.
    pub fn tick(&mut self, now_ms: f64) -> SmallVec<[ParticleHandle; 16]> {
        let mut done = SmallVec::new();
        let mut keep = VecDeque::with_capacity(self.live.len());
        while let Some(idx) = self.live.pop_front() {
            let slot = &self.slots[idx];
            let finished = match &slot.spec {
                Some(spec) => now_ms - slot.started_ms >= spec.duration_ms,
                None => true,
            };
            if finished {
                done.push(ParticleHandle {
                    slot: idx as u32,
                    generation: slot.generation,
                });
                self.release(idx);
            } else {
                keep.push_back(idx);
            }
        }
        self.live = keep;
        done
    }

    /// Drop groups whose backstop timeout elapsed, force-retiring stragglers.
    /// Returns the ids of the dropped groups and the handles that were cut.
    pub fn expire_groups(&mut self, now_ms: f64) -> (Vec<BurstId>, Vec<ParticleHandle>) {
        let mut ids = Vec::new();
        let mut cut = Vec::new();
        let backstop = self.backstop_ms;
        let (expired, kept): (Vec<_>, Vec<_>) = self
            .groups
            .drain(..)
            .partition(|g| now_ms - g.created_ms >= backstop);
        self.groups = kept;
        for g in expired {
            ids.push(g.id);
            for h in g.members {
                if !self.is_expired(h) {
                    cut.push(h);
                    self.live.retain(|&i| i != h.slot());
                    self.release(h.slot());
                }
            }
        }
        (ids, cut)
    }

    pub fn is_expired(&self, handle: ParticleHandle) -> bool {
        match self.slots.get(handle.slot()) {
            Some(s) => !s.alive || s.generation != handle.generation,
            None => true,
        }
    }

    pub fn sample(&self, handle: ParticleHandle, now_ms: f64) -> Option<ParticleFrame> {
        if self.is_expired(handle) {
            return None;
        }
        let slot = &self.slots[handle.slot()];
        let spec = slot.spec.as_ref()?;
        Some(sample_spec(spec, now_ms - slot.started_ms))
    }

    /// Live handles with their sampled frames, oldest first.
    pub fn frames(&self, now_ms: f64) -> Vec<(ParticleHandle, ParticleFrame)> {
        self.live
            .iter()
            .filter_map(|&idx| {
                let slot = &self.slots[idx];
                let spec = slot.spec.as_ref()?;
                let handle = ParticleHandle {
                    slot: idx as u32,
                    generation: slot.generation,
                };
                Some((handle, sample_spec(spec, now_ms - slot.started_ms)))
            })
            .collect()
    }
}

fn sample_spec(spec: &ParticleSpec, age_ms: f64) -> ParticleFrame {
    let raw = if spec.duration_ms > 0.0 {
        (age_ms / spec.duration_ms).clamp(0.0, 1.0) as f32
    } else {
        1.0
    };
    let p = spec.easing.apply(raw);
    let k = interpolate(&spec.keyframes, p);
    ParticleFrame {
        kind: spec.kind,
        x: spec.origin.x,
        y: spec.origin.y,
        width: spec.size.x,
        height: spec.size.y,
        rotation_deg: spec.rotation_deg,
        tint: spec.tint,
        dx: k.dx,
        dy: k.dy,
        scale: k.scale,
        opacity: k.opacity.clamp(0.0, 1.0),
        sweep: spec.sweep.0 + (spec.sweep.1 - spec.sweep.0) * p,
    }
}

fn interpolate(frames: &[Keyframe], p: f32) -> Keyframe {
    match frames {
        [] => Keyframe::new(p, 0.0, 0.0, 1.0, 0.0),
        [only] => *only,
        _ => {
            let last = frames[frames.len() - 1];
            if p >= last.offset {
                return last;
            }
            for pair in frames.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if p <= b.offset {
                    let span = (b.offset - a.offset).max(1e-6);
                    return a.lerp(&b, ((p - a.offset) / span).clamp(0.0, 1.0));
                }
            }
            last
        }
    }
}

// ---------------- Emitters ----------------

fn spec(
    kind: ParticleKind,
    center: Vec2,
    size: Vec2,
    duration_ms: f64,
    easing: CubicBezier,
    keyframes: &[Keyframe],
) -> ParticleSpec {
    ParticleSpec {
        kind,
        origin: center - size * 0.5,
        size,
        rotation_deg: 0.0,
        tint: 0,
        duration_ms,
        easing,
        keyframes: SmallVec::from_slice(keyframes),
        sweep: (0.0, 0.0),
    }
}

pub const DROPLET_TINTS: u8 = 4;

/// Pop explosion around `center` (viewport pixels). `size_hint` is the
/// bubble's larger dimension. Returns the burst group id.
pub fn emit_burst<R: Rng + ?Sized>(
    pool: &mut ParticlePool,
    center: Vec2,
    size_hint: f32,
    now_ms: f64,
    rng: &mut R,
) -> BurstId {
    let size_hint = if size_hint > 0.0 {
        size_hint
    } else {
        DEFAULT_BUBBLE_SIZE
    };
    let group = pool.begin_group(now_ms);

    let flash = size_hint * 0.7;
    pool.spawn_in(
        group,
        spec(
            ParticleKind::Flash,
            center,
            Vec2::splat(flash),
            120.0,
            EASE_FLASH,
            &[
                Keyframe::new(0.0, 0.0, 0.0, 0.6, 0.9),
                Keyframe::new(1.0, 0.0, 0.0, 1.6, 0.0),
            ],
        ),
        now_ms,
    );

    let ring = Vec2::splat(size_hint);
    pool.spawn_in(
        group,
        spec(
            ParticleKind::Ring,
            center,
            ring,
            180.0,
            EASE_RING,
            &[
                Keyframe::new(0.0, 0.0, 0.0, 1.0, 0.9),
                Keyframe::new(1.0, 0.0, 0.0, 2.2, 0.0),
            ],
        ),
        now_ms,
    );
    pool.spawn_in(
        group,
        spec(
            ParticleKind::RingOuter,
            center,
            ring,
            300.0,
            EASE_FLASH,
            &[
                Keyframe::new(0.0, 0.0, 0.0, 1.0, 0.7),
                Keyframe::new(1.0, 0.0, 0.0, 3.0, 0.0),
            ],
        ),
        now_ms,
    );

    for _ in 0..2 {
        let s = size_hint * (0.7 + rng.gen::<f32>() * 0.4);
        pool.spawn_in(
            group,
            spec(
                ParticleKind::Mist,
                center,
                Vec2::splat(s),
                320.0 + rng.gen::<f64>() * 120.0,
                EASE_FLASH,
                &[
                    Keyframe::new(0.0, 0.0, 0.0, 0.8, 0.45),
                    Keyframe::new(1.0, 0.0, 0.0, 1.6, 0.0),
                ],
            ),
            now_ms,
        );
    }

    let droplets = rng.gen_range(18..28);
    for _ in 0..droplets {
        let s = 3.0 + rng.gen::<f32>() * 4.5;
        let angle = rng.gen::<f32>() * TAU;
        let distance = 50.0 + rng.gen::<f32>() * 110.0;
        let dx = angle.cos() * distance;
        // droplets sag a little as they fly
        let dy = angle.sin() * distance + 8.0 + rng.gen::<f32>() * 18.0;
        let mut d = spec(
            ParticleKind::Droplet,
            center,
            Vec2::splat(s),
            280.0 + rng.gen::<f64>() * 240.0,
            EASE_BURST,
            &[
                Keyframe::new(0.0, 0.0, 0.0, 0.9, 0.98),
                Keyframe::new(0.5, dx * 0.7, dy * 0.7, 0.75, 0.7),
                Keyframe::new(1.0, dx, dy + 12.0, 0.6, 0.0),
            ],
        );
        d.tint = rng.gen_range(0..DROPLET_TINTS);
        pool.spawn_in(group, d, now_ms);
    }

    let shards = rng.gen_range(10..18);
    for _ in 0..shards {
        let length = 10.0 + rng.gen::<f32>() * 18.0;
        let thickness = 1.0 + rng.gen::<f32>() * 2.0;
        let angle = rng.gen::<f32>() * TAU;
        let reach = 60.0 + rng.gen::<f32>() * 120.0;
        let mut s = spec(
            ParticleKind::Shard,
            center,
            Vec2::new(length, thickness),
            260.0 + rng.gen::<f64>() * 240.0,
            EASE_BURST,
            &[
                Keyframe::new(0.0, 0.0, 0.0, 1.0, 0.95),
                Keyframe::new(1.0, angle.cos() * reach, angle.sin() * reach, 1.0, 0.0),
            ],
        );
        // streaks start at the center and point along their flight
        s.origin = Vec2::new(center.x, center.y - thickness * 0.5);
        s.rotation_deg = angle * 180.0 / PI;
        pool.spawn_in(group, s, now_ms);
    }

    log::debug!(
        "[particles] burst {:?}: {} droplets, {} shards",
        group,
        droplets,
        shards
    );
    group
}

/// Highlight sweep across the freshly reformed bubble.
pub fn emit_reappear_shine(pool: &mut ParticlePool, rect: &Rect, now_ms: f64) -> ParticleHandle {
    let rect = rect.or_size(DEFAULT_BUBBLE_SIZE, DEFAULT_BUBBLE_SIZE);
    let mut s = spec(
        ParticleKind::Shine,
        rect.center(),
        Vec2::new(rect.width, rect.height),
        420.0,
        EASE_SHINE,
        &[
            Keyframe::new(0.0, 0.0, 0.0, 1.0, 0.85),
            Keyframe::new(1.0, 0.0, 0.0, 1.0, 0.0),
        ],
    );
    s.sweep = (-1.6, 1.6);
    pool.spawn(s, now_ms)
}

/// Rim halo, inner pulse ring and droplets merging back into the bubble.
pub fn emit_inflation<R: Rng + ?Sized>(
    pool: &mut ParticlePool,
    rect: &Rect,
    now_ms: f64,
    rng: &mut R,
) -> usize {
    let rect = rect.or_size(DEFAULT_BUBBLE_SIZE, DEFAULT_BUBBLE_SIZE);
    let center = rect.center();
    let (w, h) = (rect.width, rect.height);
    let mut spawned = 0;

    pool.spawn(
        spec(
            ParticleKind::RimHalo,
            center,
            Vec2::new(w, h),
            520.0,
            CubicBezier::new(0.2, 0.7, 0.2, 1.0),
            &[
                Keyframe::new(0.0, 0.0, 0.0, 0.8, 0.0),
                Keyframe::new(0.33, 0.0, 0.0, 1.05, 0.85),
                Keyframe::new(0.67, 0.0, 0.0, 1.0, 0.2),
                Keyframe::new(1.0, 0.0, 0.0, 1.0, 0.0),
            ],
        ),
        now_ms,
    );
    spawned += 1;

    let inner = w.min(h) * 0.48;
    pool.spawn(
        spec(
            ParticleKind::InnerPulse,
            center,
            Vec2::splat(inner),
            360.0,
            EASE_FLASH,
            &[
                Keyframe::new(0.0, 0.0, 0.0, 0.6, 0.0),
                Keyframe::new(0.5, 0.0, 0.0, 1.2, 0.9),
                Keyframe::new(1.0, 0.0, 0.0, 1.8, 0.0),
            ],
        ),
        now_ms,
    );
    spawned += 1;

    let ingress = rng.gen_range(5..9);
    for _ in 0..ingress {
        let s = 2.0 + rng.gen::<f32>() * 3.0;
        let angle = rng.gen::<f32>() * TAU;
        let radius = (w.min(h) / 2.0) * (0.8 + rng.gen::<f32>() * 0.2);
        let start = Vec2::new(angle.cos() * radius, angle.sin() * radius);
        let drift = Vec2::new(
            (rng.gen::<f32>() - 0.5) * 6.0,
            (rng.gen::<f32>() - 0.5) * 6.0,
        );
        pool.spawn(
            spec(
                ParticleKind::Ingress,
                center,
                Vec2::splat(s),
                300.0 + rng.gen::<f64>() * 180.0,
                EASE_BURST,
                &[
                    Keyframe::new(0.0, start.x, start.y, 1.0, 0.9),
                    Keyframe::new(1.0, drift.x, drift.y, 1.0, 0.0),
                ],
            ),
            now_ms,
        );
        spawned += 1;
    }
    spawned
}

/// Both reappear effects, each at most once per pop cycle.
pub fn emit_reappear_effects<R: Rng + ?Sized>(
    pool: &mut ParticlePool,
    rect: &Rect,
    now_ms: f64,
    rng: &mut R,
    flags: &mut ReappearFlags,
) -> usize {
    let mut spawned = 0;
    if !flags.shine_emitted {
        flags.shine_emitted = true;
        emit_reappear_shine(pool, rect, now_ms);
        spawned += 1;
    }
    if !flags.inflation_emitted {
        flags.inflation_emitted = true;
        spawned += emit_inflation(pool, rect, now_ms, rng);
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(duration_ms: f64) -> ParticleSpec {
        spec(
            ParticleKind::Droplet,
            Vec2::ZERO,
            Vec2::splat(4.0),
            duration_ms,
            EASE_BURST,
            &[
                Keyframe::new(0.0, 0.0, 0.0, 1.0, 1.0),
                Keyframe::new(1.0, 10.0, 0.0, 1.0, 0.0),
            ],
        )
    }

    #[test]
    fn interpolation_respects_offsets() {
        let frames = [
            Keyframe::new(0.0, 0.0, 0.0, 1.0, 1.0),
            Keyframe::new(0.5, 10.0, 0.0, 1.0, 0.5),
            Keyframe::new(1.0, 10.0, 10.0, 1.0, 0.0),
        ];
        let k = interpolate(&frames, 0.25);
        assert!((k.dx - 5.0).abs() < 1e-5);
        assert!((k.opacity - 0.75).abs() < 1e-5);
        let end = interpolate(&frames, 1.0);
        assert_eq!(end.dy, 10.0);
    }

    #[test]
    fn slot_reuse_bumps_generation() {
        let mut pool = ParticlePool::with_capacity(1);
        let a = pool.spawn(dot(10.0), 0.0);
        pool.tick(20.0);
        assert!(pool.is_expired(a));
        let b = pool.spawn(dot(10.0), 20.0);
        assert_eq!(a.slot(), b.slot());
        assert!(pool.is_expired(a));
        assert!(!pool.is_expired(b));
    }

    #[test]
    fn full_pool_recycles_oldest() {
        let mut pool = ParticlePool::with_capacity(2);
        let a = pool.spawn(dot(100.0), 0.0);
        let b = pool.spawn(dot(100.0), 1.0);
        let c = pool.spawn(dot(100.0), 2.0);
        assert!(pool.is_expired(a));
        assert!(!pool.is_expired(b));
        assert!(!pool.is_expired(c));
        assert_eq!(pool.live_count(), 2);
    }
}
