use aero_core::particles::{emit_burst, emit_reappear_effects, ReappearFlags, DROPLET_TINTS};
use aero_core::*;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn count(pool: &ParticlePool, kind: ParticleKind) -> usize {
    pool.frames(0.0).iter().filter(|(_, f)| f.kind == kind).count()
}

#[test]
fn burst_has_every_layer() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pool = ParticlePool::default();
        emit_burst(&mut pool, Vec2::new(300.0, 200.0), 96.0, 0.0, &mut rng);
        assert_eq!(count(&pool, ParticleKind::Flash), 1);
        assert_eq!(count(&pool, ParticleKind::Ring), 1);
        assert_eq!(count(&pool, ParticleKind::RingOuter), 1);
        assert_eq!(count(&pool, ParticleKind::Mist), 2);
        assert!((18..28).contains(&count(&pool, ParticleKind::Droplet)));
        assert!((10..18).contains(&count(&pool, ParticleKind::Shard)));
        assert_eq!(pool.group_count(), 1);
    }
}

#[test]
fn droplet_tints_stay_in_palette() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut pool = ParticlePool::default();
    emit_burst(&mut pool, Vec2::ZERO, 48.0, 0.0, &mut rng);
    for (_, f) in pool.frames(10.0) {
        assert!(f.tint < DROPLET_TINTS);
    }
}

#[test]
fn particles_retire_after_their_animation() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut pool = ParticlePool::default();
    emit_burst(&mut pool, Vec2::ZERO, 96.0, 0.0, &mut rng);
    let live = pool.live_count();
    assert!(pool.tick(100.0).len() < live);
    pool.tick(600.0);
    assert_eq!(pool.live_count(), 0);
    // the group outlives its particles until the backstop
    assert!(!pool.is_idle());
    let (ids, cut) = pool.expire_groups(BURST_BACKSTOP_MS);
    assert_eq!(ids.len(), 1);
    assert!(cut.is_empty());
    assert!(pool.is_idle());
}

#[test]
fn burst_particles_report_their_group() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut pool = ParticlePool::default();
    let first = emit_burst(&mut pool, Vec2::ZERO, 96.0, 0.0, &mut rng);
    let second = emit_burst(&mut pool, Vec2::new(200.0, 0.0), 96.0, 300.0, &mut rng);
    assert_ne!(first, second);

    let frames = pool.frames(300.0);
    let in_first = frames.iter().filter(|(h, _)| pool.group_of(*h) == Some(first)).count();
    let in_second = frames.iter().filter(|(h, _)| pool.group_of(*h) == Some(second)).count();
    assert!(in_first > 0 && in_second > 0);
    assert_eq!(in_first + in_second, frames.len());

    // only the older burst has reached its backstop
    let (ids, cut) = pool.expire_groups(BURST_BACKSTOP_MS);
    assert_eq!(ids, vec![first]);
    for h in &cut {
        assert_eq!(pool.group_of(*h), None);
    }
    assert_eq!(pool.group_count(), 1);
}

#[test]
fn reappear_effects_are_ungrouped() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut pool = ParticlePool::default();
    let mut flags = ReappearFlags::default();
    let rect = Rect::new(10.0, 10.0, 96.0, 96.0);
    emit_reappear_effects(&mut pool, &rect, 0.0, &mut rng, &mut flags);
    assert!(pool.live_count() > 0);
    for (h, _) in pool.frames(0.0) {
        assert_eq!(pool.group_of(h), None);
    }
}

#[test]
fn backstop_removes_stragglers() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut pool = ParticlePool::default();
    emit_burst(&mut pool, Vec2::ZERO, 96.0, 0.0, &mut rng);
    let live = pool.live_count();
    assert!(pool.expire_groups(BURST_BACKSTOP_MS - 1.0).0.is_empty());
    let (_, cut) = pool.expire_groups(BURST_BACKSTOP_MS);
    assert_eq!(cut.len(), live);
    for h in cut {
        assert!(pool.is_expired(h));
    }
    assert!(pool.is_idle());
}

#[test]
fn full_pool_recycles_oldest() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut pool = ParticlePool::with_capacity(8);
    emit_burst(&mut pool, Vec2::ZERO, 96.0, 0.0, &mut rng);
    assert_eq!(pool.live_count(), 8);
    // the flash went first
    assert_eq!(count(&pool, ParticleKind::Flash), 0);
}

#[test]
fn samples_fade_out_over_lifetime() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut pool = ParticlePool::default();
    emit_burst(&mut pool, Vec2::new(50.0, 50.0), 96.0, 0.0, &mut rng);
    let (flash, start) = pool
        .frames(0.0)
        .into_iter()
        .find(|(_, f)| f.kind == ParticleKind::Flash)
        .expect("flash");
    let end = pool.sample(flash, 119.0).expect("still live");
    assert!(start.opacity > end.opacity);
    assert!(end.scale > start.scale);
    // frames are positioned by their top-left corner
    assert_eq!(start.x, 50.0 - start.width / 2.0);
    assert_eq!(start.y, 50.0 - start.height / 2.0);
}

#[test]
fn reappear_effects_guarded_per_cycle() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut pool = ParticlePool::default();
    let mut flags = ReappearFlags::default();
    let rect = Rect::new(0.0, 0.0, 96.0, 96.0);
    let first = emit_reappear_effects(&mut pool, &rect, 0.0, &mut rng, &mut flags);
    // shine + halo + pulse + 5..=8 ingress droplets
    assert!((8..=11).contains(&first));
    assert_eq!(emit_reappear_effects(&mut pool, &rect, 16.0, &mut rng, &mut flags), 0);
    assert_eq!(count(&pool, ParticleKind::Shine), 1);
    assert_eq!(count(&pool, ParticleKind::RimHalo), 1);
}
