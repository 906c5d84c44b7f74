use aero_core::glass::{displacement_filter, displacement_map};
use aero_core::*;
use std::rc::Rc;

#[test]
fn descriptor_layers_in_order() {
    let css = build_backdrop_filter(&GlassParams::default());
    assert!(css.starts_with("blur(1.26px) url('data:image/svg+xml;utf8,"));
    assert!(css.ends_with("#displace') blur(1.62px) contrast(1.04) brightness(1.02) saturate(1.02)"));
}

#[test]
fn filter_has_three_channel_passes() {
    let uri = displacement_filter(&GlassParams::sized(96.0, 96.0));
    assert_eq!(uri.matches("feDisplacementMap").count(), 3);
    assert_eq!(uri.matches("feColorMatrix").count(), 3);
    assert_eq!(uri.matches("lighten").count(), 2);
    // blue pass runs at the base strength, red carries twice the aberration
    assert!(uri.contains("scale%3D%22200%22"));
    assert!(uri.contains("scale%3D%22202.8%22"));
}

#[test]
fn map_ramp_tracks_depth() {
    let shallow = displacement_map(100.0, 100.0, 50.0, 0.0);
    let deep = displacement_map(100.0, 100.0, 50.0, 10.0);
    // ramp never drops below 2px
    assert!(shallow.contains("x%3D%222%22"));
    assert!(deep.contains("x%3D%2229%22"));
}

#[test]
fn strength_and_aberration_are_clamped() {
    let wild = GlassParams {
        strength: 50_000.0,
        chromatic_aberration: -3.0,
        width: f32::NAN,
        ..GlassParams::default()
    }
    .sanitized();
    assert_eq!(wild.strength, GLASS_STRENGTH_MAX);
    assert_eq!(wild.chromatic_aberration, 0.0);
    assert_eq!(wild.width, 1.0);

    let uri = displacement_filter(&GlassParams {
        strength: 9999.0,
        chromatic_aberration: 500.0,
        ..GlassParams::default()
    });
    // 1200 + 2 * 120 on the red channel
    assert!(uri.contains("scale%3D%221440%22"));
}

#[test]
fn identical_params_share_one_descriptor() {
    let mut cache = FilterCache::default();
    let a = cache.get_or_build(&GlassParams::sized(96.0, 96.0));
    let b = cache.get_or_build(&GlassParams::sized(96.0, 96.0));
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats(), (1, 1));
}

#[test]
fn sub_grid_sizes_collapse() {
    let mut cache = FilterCache::default();
    let a = cache.get_or_build(&GlassParams::sized(95.2, 96.9));
    let b = cache.get_or_build(&GlassParams::sized(97.0, 94.0));
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(
        FilterKey::from_params(&GlassParams::sized(0.2, 3.0)).width,
        FILTER_GRID_PX as u32
    );
}

#[test]
fn cache_evicts_oldest_at_capacity() {
    let mut cache = FilterCache::with_capacity(4);
    let keys: Vec<FilterKey> = (1..=5)
        .map(|i| {
            let p = GlassParams::sized(i as f32 * 40.0, 48.0);
            cache.get_or_build(&p);
            FilterKey::from_params(&p)
        })
        .collect();
    assert_eq!(cache.len(), 4);
    assert!(!cache.contains(&keys[0]));
    for k in &keys[1..] {
        assert!(cache.contains(k));
    }

    // a re-request of the evicted key is a rebuild, and evicts the next oldest
    cache.get_or_build(&GlassParams::sized(40.0, 48.0));
    assert_eq!(cache.len(), 4);
    assert!(!cache.contains(&keys[1]));
}

#[test]
fn cache_never_exceeds_capacity() {
    let mut cache = FilterCache::with_capacity(FILTER_CACHE_CAPACITY);
    for w in 0..(FILTER_CACHE_CAPACITY * 3) {
        cache.get_or_build(&GlassParams::sized(8.0 * (w + 1) as f32, 64.0));
        assert!(cache.len() <= FILTER_CACHE_CAPACITY);
    }
    assert_eq!(cache.len(), FILTER_CACHE_CAPACITY);
}
