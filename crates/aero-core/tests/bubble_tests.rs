// Host-side integration tests for the bubble motion simulator.

use aero_core::*;
use glam::Vec2;
use std::rc::Rc;

const FRAME: f64 = 16.0;

struct Harness {
    filters: FilterCache,
    particles: ParticlePool,
    glass: bool,
}

impl Harness {
    fn new() -> Self {
        Self {
            filters: FilterCache::default(),
            particles: ParticlePool::default(),
            glass: false,
        }
    }

    fn tick(&mut self, bubble: &mut Bubble, now: f64) -> Option<FrameStyle> {
        let mut ctx = TickContext {
            filters: &mut self.filters,
            particles: &mut self.particles,
            glass_enabled: self.glass,
            filter_supported: true,
        };
        bubble.tick(now, &mut ctx)
    }
}

fn floating(seed: u64, expanded: bool) -> Bubble {
    let mut b = Bubble::with_seed(
        BubbleConfig {
            floating: true,
            expanded,
            index: 1,
            count: 4,
            ..BubbleConfig::default()
        },
        seed,
        0.0,
    );
    b.set_bounds(
        Rect::new(24.0, 80.0, 240.0, 400.0),
        Some(Rect::new(40.0, 20.0, 48.0, 48.0)),
        1280.0,
    );
    b.set_element_size(96.0, 96.0);
    b
}

fn inline(seed: u64) -> Bubble {
    let mut b = Bubble::with_seed(BubbleConfig::default(), seed, 0.0);
    b.set_element_size(96.0, 96.0);
    b
}

#[test]
fn closed_bubble_stays_fully_offscreen() {
    for seed in 0..16u64 {
        for &(left, width, vw) in &[
            (0.0, 240.0, 1280.0),
            (900.0, 300.0, 1024.0),
            (-50.0, 10.0, 320.0),
            (3000.0, 240.0, 390.0),
        ] {
            let mut h = Harness::new();
            let mut b = floating(seed, false);
            b.set_bounds(Rect::new(left, 0.0, width, 400.0), None, vw);
            let mut now = 0.0;
            for _ in 0..20 {
                if let Some(style) = h.tick(&mut b, now) {
                    assert!(b.progress() <= CLOSED_EPSILON);
                    let size = 96.0 * style.transform.scale_x.max(style.transform.scale_y);
                    assert!(
                        style.screen_x + size < 0.0,
                        "seed {seed}: visible at x={} (vw {vw})",
                        style.screen_x
                    );
                    assert_eq!(style.pointer_events, PointerEvents::None);
                }
                now += FRAME;
            }
        }
    }
}

#[test]
fn closing_after_open_returns_offscreen() {
    let mut h = Harness::new();
    let mut b = floating(7, false);
    b.set_expanded(true, 0.0);
    let mut now = 0.0;
    while now <= b.tween().total_ms() + 100.0 {
        h.tick(&mut b, now);
        now += FRAME;
    }
    assert_eq!(b.progress(), 1.0);
    let start = now;
    b.set_expanded(false, start);
    let mut last = None;
    while now <= start + b.tween().total_ms() + 100.0 {
        if let Some(s) = h.tick(&mut b, now) {
            last = Some(s);
        }
        now += FRAME;
    }
    assert_eq!(b.progress(), 0.0);
    let style = last.expect("frames were produced");
    assert!(style.screen_x + 96.0 * 1.2 < 0.0);
}

#[test]
fn open_tween_is_monotonic_and_converges() {
    let mut h = Harness::new();
    let mut b = floating(3, false);
    b.set_expanded(true, 0.0);
    let total = b.tween().total_ms();
    let mut prev = 0.0_f32;
    let mut now = 0.0;
    while now <= total + 64.0 {
        h.tick(&mut b, now);
        let p = b.progress();
        assert!((0.0..=1.0).contains(&p));
        assert!(p >= prev, "progress went backwards at {now}: {p} < {prev}");
        prev = p;
        now += FRAME;
    }
    assert_eq!(b.progress(), 1.0);

    let start = now;
    b.set_expanded(false, start);
    prev = 1.0;
    while now <= start + total + 64.0 {
        h.tick(&mut b, now);
        let p = b.progress();
        assert!((0.0..=1.0).contains(&p));
        assert!(p <= prev, "progress went forwards at {now}: {p} > {prev}");
        prev = p;
        now += FRAME;
    }
    assert_eq!(b.progress(), 0.0);
}

#[test]
fn tween_respects_stagger_delay() {
    let mut tween = OpenTween::new(false, 1000.0, 100.0);
    tween.retarget(true, 0.0);
    assert_eq!(tween.advance(50.0), 0.0);
    assert_eq!(tween.state(50.0), TweenState::Opening);
    assert!(tween.advance(600.0) > 0.0);
    assert_eq!(tween.advance(1100.0), 1.0);
    assert_eq!(tween.state(1100.0), TweenState::Settled);
}

#[test]
fn interrupted_tween_starts_from_current_progress() {
    let mut tween = OpenTween::new(false, 1000.0, 0.0);
    tween.retarget(true, 0.0);
    let mid = tween.advance(300.0);
    assert!(mid > 0.0 && mid < 1.0);
    tween.retarget(false, 300.0);
    let first = tween.advance(316.0);
    assert!(first <= mid && first > 0.0);
}

#[test]
fn offset_never_exceeds_tether() {
    for seed in 0..24u64 {
        let mut h = Harness::new();
        let mut b = inline(seed);
        b.set_overrides(GlassOverrides {
            wobble_intensity: Some(4.0),
            ..GlassOverrides::default()
        });
        let element = Rect::new(100.0, 100.0, 96.0, 96.0);
        b.pointer_enter(Vec2::new(180.0, 190.0), &element);
        let tether = b.params().tether_radius;
        let mut now = 0.0;
        for i in 0..400 {
            if i % 7 == 0 {
                let angle = i as f32 * 0.37;
                let p = element.center() + Vec2::new(angle.cos(), angle.sin()) * 60.0;
                b.pointer_move(p, &element);
            }
            if h.tick(&mut b, now).is_some() {
                assert!(
                    b.last_offset().length() <= tether + 1e-3,
                    "seed {seed}: offset {} > tether {tether}",
                    b.last_offset().length()
                );
            }
            now += 97.0;
        }
    }
}

#[test]
fn clamp_to_tether_scales_proportionally() {
    let v = clamp_to_tether(Vec2::new(30.0, 40.0), 10.0);
    assert!((v.length() - 10.0).abs() < 1e-4);
    assert!((v.x / v.y - 0.75).abs() < 1e-4);
    assert_eq!(clamp_to_tether(Vec2::new(1.0, 1.0), 10.0), Vec2::new(1.0, 1.0));
}

#[test]
fn pop_cycle_completes_and_ignores_repeat_clicks() {
    let mut h = Harness::new();
    let mut b = inline(11);
    let rect = Rect::new(200.0, 200.0, 96.0, 96.0);
    let click_at = 1000.0;
    let mut now = 0.0;
    while now < click_at {
        h.tick(&mut b, now);
        now += FRAME;
    }
    assert!(b.click(click_at, &rect, &mut h.particles));
    assert!(h.particles.live_count() > 0);

    let mut saw_zero = false;
    let mut peak = 0.0_f32;
    let mut settled_at = None;
    let mut prev_phase = b.phase();
    let deadline = click_at + POP_DELAY_MIN_MS + POP_DELAY_SPAN_MS + REAPPEAR_TOTAL_MS + 200.0;
    while now < deadline {
        if let Some(style) = h.tick(&mut b, now) {
            let phase = b.phase();
            match phase {
                PopPhase::Popping { .. } => {
                    if style.transform.scale_x == 0.0
                        && style.transform.scale_y == 0.0
                        && style.opacity == 0.0
                    {
                        saw_zero = true;
                    }
                    assert!(!b.click(now, &rect, &mut h.particles));
                }
                PopPhase::Reappearing { .. } => {
                    peak = peak.max(style.transform.scale_x.max(style.transform.scale_y));
                    assert_eq!(style.pointer_events, PointerEvents::None);
                    assert!(!b.click(now, &rect, &mut h.particles));
                }
                PopPhase::Idle => {
                    if matches!(prev_phase, PopPhase::Reappearing { .. }) {
                        assert_eq!(style.transform.scale_x, 1.0);
                        assert_eq!(style.transform.scale_y, 1.0);
                        assert_eq!(style.opacity, 1.0);
                        settled_at = Some(now);
                    }
                }
            }
            prev_phase = phase;
        }
        now += FRAME;
    }
    assert!(saw_zero, "pop never shrank to nothing");
    assert!(peak > 1.0, "reappear never overshot (peak {peak})");
    let settled = settled_at.expect("bubble never settled");
    assert!(
        settled - click_at
            <= POP_DELAY_MIN_MS + POP_DELAY_SPAN_MS + REAPPEAR_TOTAL_MS + 2.0 * FRAME
    );
    assert!(b.phase().is_idle());

    let events = b.take_events();
    assert!(matches!(events[0], BubbleEvent::Popped { .. }));
    assert!(events.contains(&BubbleEvent::Reappeared));
    assert!(events.contains(&BubbleEvent::Settled));
}

#[test]
fn reappear_effects_fire_once_per_cycle() {
    let mut h = Harness::new();
    let mut b = inline(5);
    let rect = Rect::new(0.0, 0.0, 96.0, 96.0);
    b.click(0.0, &rect, &mut h.particles);
    let mut now = 0.0;
    let mut reappear_frames = 0;
    let mut shines = 0;
    let mut seen = std::collections::HashSet::new();
    while now < 2000.0 {
        h.tick(&mut b, now);
        if matches!(b.phase(), PopPhase::Reappearing { .. }) {
            reappear_frames += 1;
        }
        for (handle, frame) in h.particles.frames(now) {
            if frame.kind == ParticleKind::Shine && seen.insert(handle) {
                shines += 1;
            }
        }
        h.particles.tick(now);
        now += FRAME;
    }
    assert!(reappear_frames > 10);
    assert_eq!(shines, 1);
}

#[test]
fn idle_corners_stay_in_band() {
    let mut h = Harness::new();
    let mut b = inline(21);
    b.set_overrides(GlassOverrides {
        wobble_intensity: Some(25.0),
        wobble_speed: Some(3.0),
        ..GlassOverrides::default()
    });
    let mut now = 0.0;
    let mut varied = false;
    for i in 0..5000u64 {
        if let Some(style) = h.tick(&mut b, now) {
            for c in style.shape.corners {
                assert!((CORNER_PERCENT_MIN..=CORNER_PERCENT_MAX).contains(&c));
                if (c - 50.0).abs() > 1.0 {
                    varied = true;
                }
            }
        }
        now += if i % 2 == 0 { FRAME } else { 12_345.678 };
    }
    assert!(varied);
}

#[test]
fn extreme_wobble_keeps_idle_scale_round() {
    let mut h = Harness::new();
    let mut b = inline(8);
    b.set_overrides(GlassOverrides {
        wobble_intensity: Some(60.0),
        wobble_speed: Some(1000.0),
        ..GlassOverrides::default()
    });
    let mut now = 0.0;
    let mut frames = 0;
    for i in 0..2000u64 {
        if let Some(style) = h.tick(&mut b, now) {
            let t = style.transform;
            assert!(t.scale_x > 0.0 && t.scale_x < 1.2, "scale_x {}", t.scale_x);
            assert!(t.scale_y > 0.0 && t.scale_y < 1.2, "scale_y {}", t.scale_y);
            assert!((t.scale_x - t.scale_y).abs() <= 2.0 * JELLY_MAX + 1e-5);
            frames += 1;
        }
        now += if i % 3 == 0 { FRAME } else { 777.7 };
    }
    assert!(frames > 1000);
}

#[test]
fn hover_scales_up_and_leave_restores() {
    let mut h = Harness::new();
    let mut b = inline(2);
    let rect = Rect::new(0.0, 0.0, 96.0, 96.0);
    b.pointer_enter(Vec2::new(60.0, 40.0), &rect);
    let mut now = 0.0;
    for _ in 0..60 {
        h.tick(&mut b, now);
        now += FRAME;
    }
    assert!((b.current_scale() - HOVER_SCALE).abs() < 1e-3);
    b.pointer_leave();
    for _ in 0..60 {
        h.tick(&mut b, now);
        now += FRAME;
    }
    assert!((b.current_scale() - 1.0).abs() < 1e-3);
    assert!(!b.is_hovering());
}

#[test]
fn throttled_ticks_return_none() {
    let mut h = Harness::new();
    let mut b = inline(1);
    assert!(h.tick(&mut b, 0.0).is_some());
    assert!(h.tick(&mut b, 5.0).is_none());
    assert!(h.tick(&mut b, 16.0).is_some());

    let mut slow = Bubble::with_seed(
        BubbleConfig {
            low_power: true,
            ..BubbleConfig::default()
        },
        1,
        0.0,
    );
    assert!(h.tick(&mut slow, 0.0).is_some());
    assert!(h.tick(&mut slow, 32.0).is_none());
    assert!(h.tick(&mut slow, 40.0).is_some());
}

#[test]
fn filter_is_reused_until_size_changes() {
    let mut h = Harness::new();
    h.glass = true;
    let mut b = inline(9);
    let first = h.tick(&mut b, 0.0).and_then(|s| s.filter).expect("filter");
    let again = h.tick(&mut b, 100.0).and_then(|s| s.filter).expect("filter");
    assert!(Rc::ptr_eq(&first, &again));
    assert_eq!(h.filters.len(), 1);

    // sub-threshold jitter keeps the filter
    b.set_element_size(97.0, 96.5);
    let jitter = h.tick(&mut b, 200.0).and_then(|s| s.filter).expect("filter");
    assert!(Rc::ptr_eq(&first, &jitter));

    b.set_element_size(140.0, 140.0);
    let grown = h.tick(&mut b, 300.0).and_then(|s| s.filter).expect("filter");
    assert!(!Rc::ptr_eq(&first, &grown));
    assert_eq!(h.filters.len(), 2);
}

#[test]
fn resynthesis_is_rate_limited() {
    let mut h = Harness::new();
    h.glass = true;
    let mut b = inline(9);
    let first = h.tick(&mut b, 0.0).and_then(|s| s.filter).expect("filter");
    b.set_element_size(200.0, 200.0);
    // 16ms later: size changed but the filter throttle has not elapsed
    let early = h.tick(&mut b, 16.0).and_then(|s| s.filter).expect("filter");
    assert!(Rc::ptr_eq(&first, &early));
    let later = h.tick(&mut b, 16.0 + FILTER_THROTTLE_MS).and_then(|s| s.filter).expect("filter");
    assert!(!Rc::ptr_eq(&first, &later));
}

#[test]
fn disabled_glass_omits_filter_but_keeps_animating() {
    let mut h = Harness::new();
    let mut b = inline(4);
    let a = h.tick(&mut b, 0.0).expect("frame");
    let c = h.tick(&mut b, 2000.0).expect("frame");
    assert!(a.filter.is_none() && c.filter.is_none());
    assert_ne!(a.transform, c.transform);
    assert!(h.filters.is_empty());
}

#[test]
fn unsupported_filter_primitive_degrades() {
    let mut filters = FilterCache::default();
    let mut particles = ParticlePool::default();
    let mut ctx = TickContext {
        filters: &mut filters,
        particles: &mut particles,
        glass_enabled: true,
        filter_supported: false,
    };
    let mut b = inline(4);
    let style = b.tick(0.0, &mut ctx).expect("frame");
    assert!(style.filter.is_none());
}

#[test]
fn same_seed_same_signature_motion() {
    let a = Bubble::with_seed(BubbleConfig::default(), 99, 0.0);
    let b = Bubble::with_seed(BubbleConfig::default(), 99, 0.0);
    let c = Bubble::with_seed(BubbleConfig::default(), 100, 0.0);
    assert_eq!(a.params(), b.params());
    assert_ne!(a.params(), c.params());
}

#[test]
fn motion_params_do_not_change_on_replan() {
    let mut b = floating(8, true);
    let before = *b.params();
    b.set_index(3);
    b.set_count(5);
    b.set_bounds(Rect::new(0.0, 0.0, 500.0, 600.0), None, 1920.0);
    assert_eq!(*b.params(), before);
}

#[test]
fn open_bubble_is_clamped_into_container() {
    let mut h = Harness::new();
    let mut b = floating(12, true);
    b.set_bounds(
        Rect::new(0.0, 0.0, 120.0, 120.0),
        Some(Rect::new(100.0, 100.0, 48.0, 48.0)),
        1280.0,
    );
    b.set_index(3);
    let mut now = 0.0;
    for _ in 0..50 {
        if let Some(style) = h.tick(&mut b, now) {
            assert!(b.progress() > 0.8);
            assert!(style.transform.tx >= CONTAINER_MARGIN - 1e-4);
            assert!(style.transform.ty >= CONTAINER_MARGIN - 1e-4);
            assert_eq!(style.pointer_events, PointerEvents::Auto);
        }
        now += FRAME;
    }
}

#[test]
fn render_cache_skips_unchanged_frames() {
    let mut h = Harness::new();
    let mut b = inline(6);
    let mut cache = RenderCache::new();
    let mut out = RecordingRenderer::default();
    let style = h.tick(&mut b, 0.0).expect("frame");
    assert_eq!(cache.commit(&style, &mut out), 5);
    assert_eq!(cache.commit(&style, &mut out), 0);
    assert!(out.transform.as_deref().unwrap_or("").starts_with("translate3d("));
}
