//! Per-bubble motion simulation.
//!
//! A [`Bubble`] owns everything that makes one element move: its randomized
//! signature motion, the open/close tween, pointer attraction and the
//! pop -> reappear cycle. [`Bubble::tick`] turns that state into a
//! [`FrameStyle`] without touching any scene graph.
//!
//! Two state axes run side by side. The open tween always drives position;
//! the pop phase, when not idle, takes over scale, opacity and shape.

use crate::constants::*;
use crate::easing::{ease_in_cubic, ease_in_out_cubic, ease_in_quint, ease_out_cubic, ease_out_quint, lerp};
use crate::glass::{FilterCache, GlassParams};
use crate::layout::{plan_layout, LayoutPlan, Rect};
use crate::particles::{emit_burst, emit_reappear_effects, ParticlePool, ReappearFlags};
use crate::render::{FrameStyle, PointerEvents, Shape, Transform};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use std::f32::consts::TAU;
use std::rc::Rc;

/// Optional per-instance tuning supplied by the embedding page.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlassOverrides {
    pub strength: Option<f32>,
    pub chromatic_aberration: Option<f32>,
    pub blur: Option<f32>,
    pub depth: Option<f32>,
    pub radius: Option<f32>,
    pub wobble_intensity: Option<f32>,
    pub wobble_speed: Option<f32>,
}

impl GlassOverrides {
    fn intensity(&self) -> f32 {
        self.wobble_intensity
            .filter(|v| v.is_finite())
            .unwrap_or(1.0)
            .clamp(0.0, WOBBLE_OVERRIDE_MAX)
    }

    fn speed(&self) -> f32 {
        self.wobble_speed
            .filter(|v| v.is_finite())
            .unwrap_or(1.0)
            .clamp(0.0, WOBBLE_OVERRIDE_MAX)
    }

    /// Synthesizer input for an element of the given size.
    pub fn glass_params(&self, size: Vec2) -> GlassParams {
        let w = size.x.max(1.0);
        let h = size.y.max(1.0);
        GlassParams {
            width: w,
            height: h,
            radius: self.radius.unwrap_or(w.min(h) * 0.5),
            depth: self.depth.unwrap_or(GLASS_DEPTH_DEFAULT),
            strength: self.strength.unwrap_or(GLASS_STRENGTH_DEFAULT),
            chromatic_aberration: self
                .chromatic_aberration
                .unwrap_or(GLASS_ABERRATION_DEFAULT),
            blur: self.blur.unwrap_or(GLASS_BLUR_DEFAULT),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BubbleConfig {
    pub floating: bool,
    pub expanded: bool,
    pub index: usize,
    pub count: usize,
    pub overrides: GlassOverrides,
    pub low_power: bool,
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            floating: false,
            expanded: false,
            index: 0,
            count: 1,
            overrides: GlassOverrides::default(),
            low_power: false,
        }
    }
}

/// Signature motion, drawn once per bubble.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    pub drift_amplitude: Vec2,
    pub drift_speed: Vec2,
    pub drift_phase: Vec2,
    pub wobble_speed: f32,
    pub wobble_amplitude_deg: f32,
    pub tether_radius: f32,
    pub morph_phase: f32,
    pub morph_speed: f32,
    pub morph_amplitude: f32,
    pub morph_anisotropy: f32,
    pub open_duration_ms: f64,
    pub open_delay_ms: f64,
}

impl MotionParams {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            drift_amplitude: Vec2::new(
                DRIFT_AMPLITUDE_MIN + rng.gen::<f32>() * DRIFT_AMPLITUDE_SPAN,
                DRIFT_AMPLITUDE_MIN + rng.gen::<f32>() * DRIFT_AMPLITUDE_SPAN,
            ),
            drift_speed: Vec2::new(
                DRIFT_SPEED_MIN + rng.gen::<f32>() * DRIFT_SPEED_SPAN,
                DRIFT_SPEED_MIN + rng.gen::<f32>() * DRIFT_SPEED_SPAN,
            ),
            drift_phase: Vec2::new(rng.gen::<f32>() * TAU, rng.gen::<f32>() * TAU),
            wobble_speed: WOBBLE_SPEED_MIN + rng.gen::<f32>() * WOBBLE_SPEED_SPAN,
            wobble_amplitude_deg: WOBBLE_AMPLITUDE_MIN_DEG
                + rng.gen::<f32>() * WOBBLE_AMPLITUDE_SPAN_DEG,
            tether_radius: TETHER_RADIUS_MIN + rng.gen::<f32>() * TETHER_RADIUS_SPAN,
            morph_phase: rng.gen::<f32>() * TAU,
            morph_speed: MORPH_SPEED_MIN + rng.gen::<f32>() * MORPH_SPEED_SPAN,
            morph_amplitude: MORPH_AMPLITUDE_MIN + rng.gen::<f32>() * MORPH_AMPLITUDE_SPAN,
            morph_anisotropy: MORPH_ANISOTROPY_MIN + rng.gen::<f32>() * MORPH_ANISOTROPY_SPAN,
            open_duration_ms: OPEN_DURATION_MIN_MS + rng.gen::<f64>() * OPEN_DURATION_SPAN_MS,
            open_delay_ms: rng.gen::<f64>() * OPEN_STAGGER_MAX_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenState {
    Opening,
    Closing,
    Settled,
}

/// Open/close progress tween. Opening decelerates, closing accelerates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpenTween {
    progress: f32,
    from: f32,
    target: bool,
    started_ms: Option<f64>,
    duration_ms: f64,
    delay_ms: f64,
}

impl OpenTween {
    pub fn new(expanded: bool, duration_ms: f64, delay_ms: f64) -> Self {
        Self {
            progress: if expanded { 1.0 } else { 0.0 },
            from: if expanded { 1.0 } else { 0.0 },
            target: expanded,
            started_ms: None,
            duration_ms: duration_ms.max(1.0),
            delay_ms: delay_ms.max(0.0),
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn target(&self) -> bool {
        self.target
    }

    /// Start a new tween toward `expanded` from wherever progress is now.
    pub fn retarget(&mut self, expanded: bool, now_ms: f64) {
        self.from = self.progress;
        self.target = expanded;
        self.started_ms = Some(now_ms);
    }

    /// Total time from `retarget` until the tween locks.
    pub fn total_ms(&self) -> f64 {
        self.delay_ms + self.duration_ms
    }

    pub fn state(&self, now_ms: f64) -> TweenState {
        match self.started_ms {
            Some(start) if now_ms - start - self.delay_ms < self.duration_ms => {
                if self.target {
                    TweenState::Opening
                } else {
                    TweenState::Closing
                }
            }
            _ => TweenState::Settled,
        }
    }

    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let goal = if self.target { 1.0 } else { 0.0 };
        let Some(start) = self.started_ms else {
            self.progress = goal;
            return goal;
        };
        let elapsed = (now_ms - start - self.delay_ms).max(0.0);
        let raw = (elapsed / self.duration_ms).min(1.0);
        if raw >= 1.0 {
            self.progress = goal;
        } else {
            let eased = if self.target {
                ease_out_quint(raw as f32)
            } else {
                ease_in_quint(raw as f32)
            };
            self.progress = (self.from + (goal - self.from) * eased).clamp(0.0, 1.0);
        }
        self.progress
    }
}

/// Pop lifecycle. Exactly one phase governs scale/opacity/shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PopPhase {
    Idle,
    Popping {
        started_ms: f64,
        reappear_at_ms: f64,
        rect: Rect,
    },
    Reappearing {
        started_ms: f64,
        rect: Rect,
    },
}

impl PopPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, PopPhase::Idle)
    }
}

/// Notifications a host may use, e.g. to play a sound on pop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BubbleEvent {
    Popped { center: Vec2 },
    Reappeared,
    Settled,
}

/// Skips work until a minimum interval has passed since the last frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameThrottle {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl FrameThrottle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    pub fn for_power(low_power: bool) -> Self {
        Self::new(if low_power {
            FRAME_INTERVAL_LOW_POWER_MS
        } else {
            FRAME_INTERVAL_MS
        })
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
struct FilterState {
    size: Option<Vec2>,
    synthesized_ms: f64,
    current: Option<Rc<str>>,
}

/// Shared resources and capability flags handed to every tick.
pub struct TickContext<'a> {
    pub filters: &'a mut FilterCache,
    pub particles: &'a mut ParticlePool,
    pub glass_enabled: bool,
    pub filter_supported: bool,
}

/// Scale `offset` down so its length never exceeds `radius`.
#[inline]
pub fn clamp_to_tether(offset: Vec2, radius: f32) -> Vec2 {
    let len = offset.length();
    if len > radius && len > 0.0 {
        offset * (radius / len)
    } else {
        offset
    }
}

/// Pointer pull toward the pointer: capped at `HOVER_MAX_PULL` inside the
/// capture radius, weaker the farther out the pointer is.
#[inline]
pub fn attraction_offset(pointer: Vec2, center: Vec2) -> Vec2 {
    let d = pointer - center;
    let distance = d.length().max(1.0);
    let falloff = (HOVER_CAPTURE_RADIUS / distance).min(1.0);
    d.normalize_or_zero() * HOVER_MAX_PULL * falloff
}

pub struct Bubble {
    floating: bool,
    expanded: bool,
    index: usize,
    count: usize,
    overrides: GlassOverrides,
    params: MotionParams,
    rng: StdRng,

    plan: LayoutPlan,
    container: Rect,
    anchor: Option<Rect>,
    viewport_width: f32,
    element_size: Vec2,

    hovering: bool,
    hover_offset: Vec2,
    current_scale: f32,
    target_scale: f32,

    tween: OpenTween,
    phase: PopPhase,
    reappear_flags: ReappearFlags,

    created_ms: f64,
    throttle: FrameThrottle,
    filter: FilterState,
    last_offset: Vec2,
    events: SmallVec<[BubbleEvent; 4]>,
}

impl Bubble {
    /// New bubble with motion drawn from system entropy.
    pub fn new(config: BubbleConfig, now_ms: f64) -> Self {
        Self::from_rng(config, StdRng::from_entropy(), now_ms)
    }

    /// Deterministic bubble; the same seed always yields the same motion.
    pub fn with_seed(config: BubbleConfig, seed: u64, now_ms: f64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed), now_ms)
    }

    fn from_rng(config: BubbleConfig, mut rng: StdRng, now_ms: f64) -> Self {
        let params = MotionParams::draw(&mut rng);
        let expanded = config.floating && config.expanded;
        let mut bubble = Self {
            floating: config.floating,
            expanded: config.expanded,
            index: config.index,
            count: config.count.max(1),
            overrides: config.overrides,
            params,
            rng,
            plan: LayoutPlan::default(),
            container: Rect::new(0.0, 0.0, DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT),
            anchor: None,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            element_size: Vec2::splat(DEFAULT_BUBBLE_SIZE),
            hovering: false,
            hover_offset: Vec2::ZERO,
            current_scale: 1.0,
            target_scale: 1.0,
            tween: OpenTween::new(expanded, params.open_duration_ms, params.open_delay_ms),
            phase: PopPhase::Idle,
            reappear_flags: ReappearFlags::default(),
            created_ms: now_ms,
            throttle: FrameThrottle::for_power(config.low_power),
            filter: FilterState::default(),
            last_offset: Vec2::ZERO,
            events: SmallVec::new(),
        };
        bubble.replan();
        log::debug!(
            "[bubble {}] created floating={} tether={:.1}",
            bubble.index,
            bubble.floating,
            bubble.params.tether_radius
        );
        bubble
    }

    // ---------------- Inputs ----------------

    pub fn set_expanded(&mut self, expanded: bool, now_ms: f64) {
        let changed = expanded != self.expanded;
        self.expanded = expanded;
        if self.floating && changed {
            self.tween.retarget(expanded, now_ms);
        }
    }

    pub fn set_floating(&mut self, floating: bool) {
        self.floating = floating;
        if floating && self.tween.target() != self.expanded {
            // snap: the expanded flag changed while we were inline
            self.tween = OpenTween::new(
                self.expanded,
                self.params.open_duration_ms,
                self.params.open_delay_ms,
            );
        }
        self.replan();
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
        self.replan();
    }

    pub fn set_count(&mut self, count: usize) {
        self.count = count.max(1);
        self.replan();
    }

    pub fn set_overrides(&mut self, overrides: GlassOverrides) {
        self.overrides = overrides;
        self.filter = FilterState::default();
    }

    pub fn set_low_power(&mut self, low_power: bool) {
        self.throttle = FrameThrottle::for_power(low_power);
    }

    /// New container/anchor/viewport measurements; replans the layout.
    /// Unmeasurable (zero-sized) rects fall back to defaults.
    pub fn set_bounds(&mut self, container: Rect, anchor: Option<Rect>, viewport_width: f32) {
        self.container = container.or_size(DEFAULT_CONTAINER_WIDTH, DEFAULT_CONTAINER_HEIGHT);
        self.anchor = anchor.filter(Rect::is_measured);
        if viewport_width > 0.0 && viewport_width.is_finite() {
            self.viewport_width = viewport_width;
        }
        self.replan();
    }

    pub fn set_element_size(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.element_size = Vec2::new(width, height);
        }
    }

    /// Draw a fresh layout. Only floating bubbles have one.
    pub fn replan(&mut self) {
        if !self.floating {
            return;
        }
        self.plan = plan_layout(
            self.index,
            self.count,
            &self.container,
            self.anchor.as_ref(),
            self.viewport_width,
            &mut self.rng,
        );
    }

    pub fn pointer_enter(&mut self, pointer: Vec2, element: &Rect) {
        self.hovering = true;
        self.target_scale = HOVER_SCALE;
        self.hover_offset = attraction_offset(pointer, element.center());
    }

    pub fn pointer_move(&mut self, pointer: Vec2, element: &Rect) {
        if !self.hovering {
            return;
        }
        self.hover_offset = attraction_offset(pointer, element.center());
    }

    pub fn pointer_leave(&mut self) {
        self.hovering = false;
        self.target_scale = 1.0;
        self.hover_offset = Vec2::ZERO;
    }

    /// Pop the bubble. Ignored while a pop cycle is already running.
    /// Returns whether the pop started.
    pub fn click(&mut self, now_ms: f64, element: &Rect, particles: &mut ParticlePool) -> bool {
        if !self.phase.is_idle() {
            return false;
        }
        let element = element.or_size(self.element_size.x, self.element_size.y);
        let delay = POP_DELAY_MIN_MS + self.rng.gen::<f64>() * POP_DELAY_SPAN_MS;
        self.phase = PopPhase::Popping {
            started_ms: now_ms,
            reappear_at_ms: now_ms + delay,
            rect: element,
        };
        self.reappear_flags = ReappearFlags::default();
        self.pointer_leave();
        self.current_scale = 1.0;
        let center = element.center();
        emit_burst(
            particles,
            center,
            element.width.max(element.height),
            now_ms,
            &mut self.rng,
        );
        self.events.push(BubbleEvent::Popped { center });
        log::debug!("[bubble {}] pop, reappear in {:.0}ms", self.index, delay);
        true
    }

    // ---------------- Accessors ----------------

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    pub fn plan(&self) -> LayoutPlan {
        self.plan
    }

    pub fn progress(&self) -> f32 {
        self.tween.progress()
    }

    pub fn tween(&self) -> &OpenTween {
        &self.tween
    }

    pub fn phase(&self) -> PopPhase {
        self.phase
    }

    pub fn is_floating(&self) -> bool {
        self.floating
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current_scale(&self) -> f32 {
        self.current_scale
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    /// Drift + hover offset applied on the last processed frame.
    pub fn last_offset(&self) -> Vec2 {
        self.last_offset
    }

    pub fn take_events(&mut self) -> SmallVec<[BubbleEvent; 4]> {
        std::mem::take(&mut self.events)
    }

    // ---------------- Frame ----------------

    /// Advance to `now_ms`. Returns `None` when throttled.
    pub fn tick(&mut self, now_ms: f64, ctx: &mut TickContext<'_>) -> Option<FrameStyle> {
        if !self.throttle.ready(now_ms) {
            return None;
        }
        Some(self.step(now_ms, ctx))
    }

    fn step(&mut self, now_ms: f64, ctx: &mut TickContext<'_>) -> FrameStyle {
        let t = ((now_ms - self.created_ms) / 1000.0) as f32;

        if self.floating {
            self.tween.advance(now_ms);
        }
        let progress = self.tween.progress();

        if self.phase.is_idle() {
            self.current_scale += (self.target_scale - self.current_scale) * SCALE_SMOOTHING;
        }

        let (drift, wobble) = self.drift(t);
        let rest = Vec2::new(
            lerp(self.plan.entry_x, self.plan.rest_x, progress),
            lerp(self.plan.entry_y, self.plan.rest_y, progress),
        );
        let hover = if self.hovering {
            self.hover_offset
        } else {
            Vec2::ZERO
        };
        let offset = clamp_to_tether(drift + hover, self.params.tether_radius);
        self.last_offset = offset;

        let size = self.element_size.x.max(self.element_size.y);
        let mut tx = if self.floating { rest.x } else { 0.0 } + offset.x;
        let mut ty = if self.floating { rest.y } else { 0.0 } + offset.y;
        if self.floating {
            tx -= size * 0.5;
        }
        if progress > OPEN_CLAMP_PROGRESS {
            let max_x = self.container.width - size - CONTAINER_MARGIN;
            let max_y = self.container.height - size - CONTAINER_MARGIN;
            tx = tx.min(max_x).max(CONTAINER_MARGIN);
            ty = ty.min(max_y).max(CONTAINER_MARGIN);
        }
        let closed = self.floating && !self.expanded && progress <= CLOSED_FORCE_PROGRESS;
        if closed {
            tx = -self.viewport_width - self.container.left - ENTRY_OFFSCREEN_MARGIN - size;
        }

        let (scale, opacity, shape) = self.regime(now_ms, t, ctx);

        let mut pointer_events = if !self.floating || progress > OPEN_INTERACTIVE_PROGRESS {
            PointerEvents::Auto
        } else {
            PointerEvents::None
        };
        if !self.phase.is_idle() || closed {
            pointer_events = PointerEvents::None;
        }

        let filter = self.filter_for_frame(now_ms, ctx);

        FrameStyle {
            transform: Transform {
                tx,
                ty,
                rotate_deg: wobble,
                scale_x: scale.x,
                scale_y: scale.y,
            },
            opacity,
            shape,
            filter,
            pointer_events,
            screen_x: self.container.left + tx,
        }
    }

    /// Idle drift offset and rotational wobble (degrees) at time `t`.
    fn drift(&self, t: f32) -> (Vec2, f32) {
        let p = &self.params;
        let intensity = self.overrides.intensity();
        let speed = self.overrides.speed();
        let amp = p.drift_amplitude * intensity;
        let sp = p.drift_speed * speed;
        let x = ((t + p.drift_phase.x) * TAU * sp.x).sin() * amp.x
            + ((t + p.drift_phase.x * DRIFT_SECONDARY_PHASE_X) * TAU * sp.x * DRIFT_SECONDARY_RATIO_X)
                .sin()
                * amp.x
                * DRIFT_SECONDARY_GAIN;
        let y = ((t + p.drift_phase.y) * TAU * sp.y).cos() * amp.y
            + ((t + p.drift_phase.y * DRIFT_SECONDARY_PHASE_Y) * TAU * sp.y * DRIFT_SECONDARY_RATIO_Y)
                .cos()
                * amp.y
                * DRIFT_SECONDARY_GAIN;
        let wobble = (t * TAU * p.wobble_speed * speed).sin() * p.wobble_amplitude_deg * intensity;
        (Vec2::new(x, y), wobble)
    }

    /// Corner percentages and jelly factor for the idle morph at time `t`.
    fn morph(&self, t: f32) -> (Shape, f32) {
        let p = &self.params;
        let intensity = self.overrides.intensity();
        let w = t * TAU * p.morph_speed * self.overrides.speed();
        let ph = p.morph_phase;
        let amp = p.morph_amplitude * intensity;
        let waves = [
            0.6 * (w + ph).sin() + 0.4 * (w * 1.37 + ph * 0.7).cos(),
            0.6 * (w * 0.83 + ph + 1.1).cos() + 0.4 * (w * 1.61 + ph * 1.3).sin(),
            0.6 * (w * 1.19 + ph + 2.3).sin() + 0.4 * (w * 0.71 + ph * 0.5).cos(),
            0.6 * (w * 0.93 + ph + 3.7).cos() + 0.4 * (w * 1.43 + ph * 1.9).sin(),
        ];
        let corners =
            waves.map(|v| (50.0 + amp * v).clamp(CORNER_PERCENT_MIN, CORNER_PERCENT_MAX));
        let jelly = ((w + ph).sin() * p.morph_anisotropy * intensity).clamp(-JELLY_MAX, JELLY_MAX);
        (Shape { corners }, jelly)
    }

    /// Scale (x, y), opacity and shape for the active pop phase.
    fn regime(&mut self, now_ms: f64, t: f32, ctx: &mut TickContext<'_>) -> (Vec2, f32, Shape) {
        if let PopPhase::Popping {
            started_ms,
            reappear_at_ms,
            rect,
        } = self.phase
        {
            if now_ms < reappear_at_ms {
                return pop_frame(now_ms - started_ms);
            }
            self.phase = PopPhase::Reappearing {
                started_ms: now_ms,
                rect,
            };
            let spawned = emit_reappear_effects(
                ctx.particles,
                &rect,
                now_ms,
                &mut self.rng,
                &mut self.reappear_flags,
            );
            self.events.push(BubbleEvent::Reappeared);
            log::trace!("[bubble {}] reappearing, {} effects", self.index, spawned);
        }

        if let PopPhase::Reappearing { started_ms, .. } = self.phase {
            let e = now_ms - started_ms;
            if e < REAPPEAR_TOTAL_MS {
                return reappear_frame(e);
            }
            self.phase = PopPhase::Idle;
            self.current_scale = 1.0;
            self.events.push(BubbleEvent::Settled);
            log::trace!("[bubble {}] settled", self.index);
            return (Vec2::ONE, 1.0, Shape::round());
        }

        let (shape, jelly) = self.morph(t);
        let s = self.current_scale;
        (Vec2::new(s * (1.0 + jelly), s * (1.0 - jelly)), 1.0, shape)
    }

    fn filter_for_frame(&mut self, now_ms: f64, ctx: &mut TickContext<'_>) -> Option<Rc<str>> {
        if !(ctx.glass_enabled && ctx.filter_supported) {
            self.filter = FilterState::default();
            return None;
        }
        let size = self.element_size;
        let moved = match self.filter.size {
            Some(prev) => {
                (prev - size).abs().max_element() >= FILTER_RESIZE_EPSILON_PX
            }
            None => true,
        };
        let due = self.filter.current.is_none()
            || now_ms - self.filter.synthesized_ms >= FILTER_THROTTLE_MS;
        if moved && due {
            let params = self.overrides.glass_params(size);
            self.filter.current = Some(ctx.filters.get_or_build(&params));
            self.filter.size = Some(size);
            self.filter.synthesized_ms = now_ms;
        }
        self.filter.current.clone()
    }
}

/// Popping: brief jiggle, then a cubic shrink of scale and opacity to zero.
fn pop_frame(e: f64) -> (Vec2, f32, Shape) {
    if e < POP_JIGGLE_MS {
        let decay = 1.0 - (e / POP_JIGGLE_MS) as f32;
        let osc = ((e / 1000.0) as f32 * TAU * POP_JIGGLE_HZ).sin() * POP_JIGGLE_AMPLITUDE * decay;
        return (Vec2::new(1.0 + osc, 1.0 - osc), 1.0, Shape::round());
    }
    if e >= POP_SHRINK_END_MS {
        return (Vec2::ZERO, 0.0, Shape::round());
    }
    let p = ((e - POP_JIGGLE_MS) / (POP_SHRINK_END_MS - POP_JIGGLE_MS)) as f32;
    let remain = 1.0 - ease_in_cubic(p);
    (Vec2::splat(remain), remain, Shape::round())
}

/// Reappearing: overshoot growth with squash/stretch, then settle to 1.
fn reappear_frame(e: f64) -> (Vec2, f32, Shape) {
    let (scale, opacity) = if e <= REAPPEAR_GROW_MS {
        let p = (e / REAPPEAR_GROW_MS) as f32;
        let s = REAPPEAR_START_SCALE
            + (REAPPEAR_PEAK_SCALE - REAPPEAR_START_SCALE) * ease_in_out_cubic(p);
        (s, (p * REAPPEAR_OPACITY_RATE).min(1.0))
    } else if e <= REAPPEAR_GROW_MS + REAPPEAR_SETTLE_MS {
        let p = ((e - REAPPEAR_GROW_MS) / REAPPEAR_SETTLE_MS) as f32;
        (
            REAPPEAR_PEAK_SCALE + (1.0 - REAPPEAR_PEAK_SCALE) * ease_out_cubic(p),
            1.0,
        )
    } else {
        (1.0, 1.0)
    };
    let (sx, sy) = if e <= REAPPEAR_SQUASH_MS {
        let p = (e / REAPPEAR_SQUASH_MS) as f32;
        let squash = (p * std::f32::consts::PI * 0.9).sin();
        (1.0 + 0.06 * squash, 1.0 - 0.05 * squash)
    } else {
        let p = ((e - REAPPEAR_SQUASH_MS) / (REAPPEAR_TOTAL_MS - REAPPEAR_SQUASH_MS)) as f32;
        let squash = ((1.0 - p.min(1.0)) * std::f32::consts::PI * 0.6).sin();
        (1.0 - 0.03 * squash, 1.0 + 0.04 * squash)
    };
    (Vec2::new(scale * sx, scale * sy), opacity, Shape::round())
}
