// Host-side tests for constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use aero_core::constants::*;
use aero_core::fade::{FADE_DURATION_MS, FADE_STEPS, MENU_EXTRA_DELAY_MS};
use aero_core::particles::DROPLET_TINTS;
use constants::*;

#[test]
fn every_droplet_tint_has_a_color() {
    assert_eq!(DROPLET_COLORS.len(), DROPLET_TINTS as usize);
    for c in DROPLET_COLORS {
        assert!(c.starts_with("rgba("), "{c}");
    }
}

#[test]
fn sound_assets_are_mp3() {
    assert!(MUSIC_TRACK.ends_with(".mp3"));
    for src in POP_SOUNDS.iter().chain(EXTRA_SOUNDS.iter()) {
        assert!(src.ends_with(".mp3"), "{src}");
    }
    assert!(!POP_SOUNDS.is_empty() && !EXTRA_SOUNDS.is_empty());
}

#[test]
fn selectors_are_class_selectors() {
    assert!(NAV_CONTAINER_SELECTOR.starts_with('.'));
    assert!(MENU_TOGGLE_SELECTOR.starts_with('.'));
    assert!(!MENU_OPEN_CLASS.starts_with('.'));
}

#[test]
fn music_tick_matches_fade_step() {
    let step = FADE_DURATION_MS / FADE_STEPS as f64;
    assert!((MUSIC_TICK_MS as f64 - step).abs() < 1.0);
    assert!(MENU_EXTRA_DELAY_MS > 0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn motion_constants_are_consistent() {
    // Throttles
    assert!(FRAME_INTERVAL_MS < FRAME_INTERVAL_LOW_POWER_MS);
    assert!(FILTER_THROTTLE_MS >= FRAME_INTERVAL_MS);

    // Corner band straddles a circle
    assert!(CORNER_PERCENT_MIN < 50.0 && CORNER_PERCENT_MAX > 50.0);

    // Reappear sub-phases fit inside the whole
    assert!(REAPPEAR_GROW_MS <= REAPPEAR_TOTAL_MS);
    assert!(REAPPEAR_SQUASH_MS <= REAPPEAR_TOTAL_MS);
    assert!(POP_JIGGLE_MS < POP_SHRINK_END_MS);
    assert!(POP_SHRINK_END_MS < POP_DELAY_MIN_MS);

    // Progress thresholds are ordered
    assert!(CLOSED_FORCE_PROGRESS < OPEN_INTERACTIVE_PROGRESS);
    assert!(OPEN_INTERACTIVE_PROGRESS < OPEN_CLAMP_PROGRESS);

    assert!(REAPPEAR_START_SCALE < 1.0 && REAPPEAR_PEAK_SCALE > 1.0);
    assert!(GLASS_STRENGTH_DEFAULT <= GLASS_STRENGTH_MAX);
    assert!(GLASS_ABERRATION_DEFAULT <= GLASS_ABERRATION_MAX);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn particle_budget_covers_a_burst() {
    assert!(PARTICLE_POOL_CAPACITY >= 64);
    assert!(BURST_BACKSTOP_MS > POP_SHRINK_END_MS);
    assert!(FILTER_CACHE_CAPACITY > 0);
}

#[test]
fn shine_band_is_clipped_by_its_container() {
    // the band moves, the container stays on the bubble and clips it
    assert!(SHINE_CLIP_STYLE.contains("overflow: hidden"));
    assert!(SHINE_CLIP_STYLE.contains("border-radius"));
    assert!(!SHINE_CLIP_STYLE.contains("background"));
    assert!(SHINE_BAND_STYLE.contains("position: absolute"));
    assert!(SHINE_BAND_STYLE.contains("inset: 0"));
    assert!(SHINE_BAND_STYLE.contains("border-radius: inherit"));
    assert!(SHINE_BAND_STYLE.contains("linear-gradient"));
}

#[test]
fn burst_wrappers_do_not_take_input() {
    assert!(BURST_WRAPPER_STYLE.contains("pointer-events: none"));
    assert!(!BURST_WRAPPER_STYLE.contains("position: fixed"));
}
