use super::*;
use crate::core::Vec2;
use crate::domain::{FountainConfig, MassSpringConfig, SimError};
use crate::store::Spring;

fn cloth(n: u32) -> MassSpringSystem {
    MassSpringSystem::new(MassSpringConfig::square(n)).unwrap()
}

fn small_fountain() -> FountainSystem {
    FountainSystem::new(FountainConfig {
        particle_count: 256,
        initial_active: 32,
        ..FountainConfig::default()
    })
    .unwrap()
}

#[test]
fn step_swaps_the_published_buffer() {
    let mut sim = cloth(4);
    let before = sim.current_state().as_ptr();
    sim.step(1.0 / 60.0).unwrap();
    let after = sim.current_state().as_ptr();
    assert_ne!(before, after);
    assert_eq!(sim.step_count(), 1);

    sim.step(1.0 / 60.0).unwrap();
    assert_eq!(sim.current_state().as_ptr(), before);
}

#[test]
fn free_particles_fall_and_pinned_row_holds() {
    let mut sim = cloth(8);
    let start: Vec<_> = sim.current_state().to_vec();
    for _ in 0..60 {
        sim.step(1.0 / 60.0).unwrap();
    }
    let end = sim.current_state();
    for (a, b) in start.iter().zip(end) {
        if a.pinned {
            assert!(a.position.bits_eq(&b.position));
            assert!(a.velocity.bits_eq(&b.velocity));
        }
    }
    let bottom = end.len() - 1;
    assert!(end[bottom].position.y < start[bottom].position.y);
}

#[test]
fn zero_dt_counts_a_step_without_motion() {
    let mut sim = cloth(4);
    let start: Vec<_> = sim.current_state().to_vec();
    sim.step(0.0).unwrap();
    assert_eq!(sim.step_count(), 1);
    for (a, b) in start.iter().zip(sim.current_state()) {
        assert!(a.position.bits_eq(&b.position));
    }
}

#[test]
fn bad_dt_is_skipped() {
    let mut sim = cloth(4);
    sim.step(f32::NAN).unwrap();
    sim.step(-0.5).unwrap();
    sim.step(f32::INFINITY).unwrap();
    assert_eq!(sim.step_count(), 0);
    assert!(!sim.state().is_failed());
}

#[test]
fn reset_restores_initial_layout() {
    let mut sim = cloth(6);
    let initial: Vec<_> = sim.current_state().to_vec();
    for _ in 0..25 {
        sim.step(1.0 / 60.0).unwrap();
    }
    sim.reset();
    assert_eq!(sim.step_count(), 0);
    assert_eq!(sim.current_state(), &initial[..]);
    assert!(sim.stability().is_quiet());

    sim.reset();
    assert_eq!(sim.current_state(), &initial[..]);
}

#[test]
fn reset_keeps_custom_springs() {
    let config = MassSpringConfig {
        grid_width: 3,
        grid_height: 1,
        ..MassSpringConfig::default()
    };
    let springs = vec![Spring::new(0, 2, 0.2, 3.0)];
    let mut sim = MassSpringSystem::with_springs(config, springs.clone()).unwrap();
    sim.step(0.01).unwrap();
    sim.reset();
    assert_eq!(sim.springs(), &springs[..]);
}

#[test]
fn set_spring_stiffness_restores_lattice() {
    let mut sim = cloth(3);
    sim.replace_springs(vec![Spring::new(0, 1, 0.1, 1.0)]).unwrap();
    assert_eq!(sim.springs().len(), 1);
    sim.set_spring_stiffness(9.0).unwrap();
    assert_eq!(sim.springs().len(), crate::store::lattice_spring_count(3, 3));
    assert!(sim.springs().iter().all(|s| s.stiffness == 9.0));
}

#[test]
fn rejected_springs_leave_topology_untouched() {
    let mut sim = cloth(3);
    let before = sim.springs().to_vec();
    let err = sim.replace_springs(vec![Spring::new(0, 99, 0.1, 1.0)]).unwrap_err();
    assert!(matches!(err, SimError::Configuration(_)));
    assert_eq!(sim.springs(), &before[..]);
}

#[test]
fn reset_springs_keeps_step_counter() {
    let mut sim = cloth(3);
    sim.step(0.01).unwrap();
    sim.step(0.01).unwrap();
    sim.reset_springs().unwrap();
    assert_eq!(sim.step_count(), 2);
}

#[test]
fn pin_out_of_range_changes_nothing() {
    let mut sim = cloth(3);
    let before: Vec<_> = sim.current_state().to_vec();
    let err = sim.pin(&[0, 9]).unwrap_err();
    assert!(matches!(err, SimError::Configuration(_)));
    assert_eq!(sim.current_state(), &before[..]);
}

#[test]
fn unpinned_top_row_starts_to_fall() {
    let mut sim = cloth(3);
    sim.unpin(&[0, 1, 2]).unwrap();
    let y0 = sim.current_state()[1].position.y;
    for _ in 0..10 {
        sim.step(1.0 / 60.0).unwrap();
    }
    assert!(sim.current_state()[1].position.y < y0);
}

#[test]
fn lost_context_is_terminal_until_initialize() {
    let mut sim = cloth(4);
    sim.step(0.01).unwrap();
    sim.lose_context("device lost");
    let err = sim.step(0.01).unwrap_err();
    assert!(err.is_terminal());
    assert!(matches!(sim.step(0.01), Err(SimError::ResourceFailure(_))));
    assert_eq!(sim.step_count(), 1);

    sim.initialize(MassSpringConfig::square(4)).unwrap();
    assert!(!sim.state().is_failed());
    sim.step(0.01).unwrap();
    assert_eq!(sim.step_count(), 1);
}

#[test]
fn failed_initialize_keeps_failed_state() {
    let mut sim = cloth(4);
    sim.lose_context("gone");
    assert!(sim.initialize(MassSpringConfig::square(0)).is_err());
    assert!(sim.state().is_failed());
}

#[test]
fn run_guarded_turns_panics_into_messages() {
    assert_eq!(run_guarded(|| 7), Ok(7));
    let err = run_guarded(|| -> u32 { panic!("worker died") }).unwrap_err();
    assert_eq!(err, "worker died");
    let err = run_guarded(|| -> u32 { panic!("{} workers died", 3) }).unwrap_err();
    assert_eq!(err, "3 workers died");
}

#[test]
fn usable_dt_accepts_zero() {
    assert!(usable_dt(0.0));
    assert!(usable_dt(1.0 / 60.0));
    assert!(!usable_dt(-1e-6));
    assert!(!usable_dt(f32::NAN));
}

#[test]
fn stability_report_accumulates() {
    let mut report = StabilityReport::default();
    assert!(report.is_quiet());
    report.record(3, 0);
    report.record(0, 2);
    assert_eq!(report.last_step_clamped, 0);
    assert_eq!(report.last_step_non_finite, 2);
    assert_eq!(report.total_clamped, 3);
    assert_eq!(report.total_non_finite, 2);
    assert!(!report.is_quiet());
}

#[test]
fn perf_stats_only_when_enabled() {
    let mut sim = cloth(4);
    sim.step(0.01).unwrap();
    assert_eq!(sim.get_perf_stats().particle_count, 0);

    sim.enable_perf_metrics(true);
    sim.step(0.01).unwrap();
    let stats = sim.get_perf_stats();
    assert_eq!(stats.particle_count, 16);
    assert_eq!(stats.spring_count, 24);
    assert!(stats.memory_bytes > 0);
    assert!(stats.step_ms >= 0.0);
}

#[test]
fn perf_memory_counts_both_buffers_and_springs() {
    let mut sim = cloth(4);
    sim.enable_perf_metrics(true);
    sim.step(0.01).unwrap();
    let expected = 2 * 16 * std::mem::size_of::<crate::domain::MassParticle>()
        + 24 * (std::mem::size_of::<Spring>() + std::mem::size_of::<Vec2>());
    assert_eq!(sim.get_perf_stats().memory_bytes as usize, expected);
}

#[test]
fn oversized_engines_are_refused_not_allocated() {
    let err = MassSpringSystem::new(MassSpringConfig::square(65535)).err();
    assert!(matches!(err, Some(SimError::Configuration(_))));

    let err = FountainSystem::new(FountainConfig {
        particle_count: u32::MAX,
        ..FountainConfig::default()
    })
    .err();
    assert!(matches!(err, Some(SimError::Configuration(_))));
}

#[test]
fn allocation_failure_is_a_resource_failure() {
    let mut v: Vec<u64> = Vec::new();
    let err = v.try_reserve_exact(usize::MAX).unwrap_err();
    assert!(allocation_failure("test buffers", err).is_terminal());
}

#[test]
fn fountain_every_slot_is_live_after_a_step() {
    let mut sim = small_fountain();
    assert_eq!(sim.live_count(), 32);
    sim.step(1.0 / 60.0).unwrap();
    assert_eq!(sim.live_count(), 256);
    for _ in 0..300 {
        sim.step(1.0 / 60.0).unwrap();
        assert_eq!(sim.current_state().len(), 256);
    }
    assert_eq!(sim.live_count(), 256);
}

#[test]
fn fountain_recycles_at_the_emitter() {
    let mut sim = small_fountain();
    let origin = sim.config().emitter_origin;
    for _ in 0..150 {
        sim.step(1.0 / 60.0).unwrap();
        for p in sim.current_state() {
            assert!(p.age < p.lifespan);
            if p.age == 0.0 {
                assert_eq!(p.position, origin);
                assert!(p.velocity.y >= 0.0);
            }
        }
    }
}

#[test]
fn fountain_same_seed_same_run() {
    let mut a = small_fountain();
    let mut b = small_fountain();
    a.set_external_force(Vec2::new(0.3, 0.2));
    b.set_external_force(Vec2::new(0.3, 0.2));
    for _ in 0..120 {
        a.step(1.0 / 60.0).unwrap();
        b.step(1.0 / 60.0).unwrap();
    }
    assert_eq!(a.current_state(), b.current_state());

    b.set_seed(777);
    b.reset();
    a.reset();
    assert_ne!(a.current_state(), b.current_state());
}

#[test]
fn fountain_reset_replays_the_first_frame() {
    let mut sim = small_fountain();
    let initial: Vec<_> = sim.current_state().to_vec();
    for _ in 0..40 {
        sim.step(1.0 / 60.0).unwrap();
    }
    sim.reset();
    assert_eq!(sim.step_count(), 0);
    assert_eq!(sim.current_state(), &initial[..]);
}

#[test]
fn fountain_pointer_pulls_particles() {
    let config = FountainConfig {
        particle_count: 64,
        initial_active: 64,
        gravity: Vec2::ZERO,
        pointer_strength: 20.0,
        lifespan_min: 50.0,
        lifespan_max: 60.0,
        ..FountainConfig::default()
    };
    let mut free = FountainSystem::new(config.clone()).unwrap();
    let mut pulled = FountainSystem::new(config).unwrap();
    pulled.set_external_force(Vec2::new(1.0, -0.5));
    for _ in 0..30 {
        free.step(1.0 / 60.0).unwrap();
        pulled.step(1.0 / 60.0).unwrap();
    }
    let mean_x = |s: &FountainSystem| {
        s.current_state().iter().map(|p| p.position.x).sum::<f32>() / s.particle_count() as f32
    };
    assert!(mean_x(&pulled) > mean_x(&free));

    pulled.clear_external_force();
    assert_eq!(pulled.external_force(), None);
}

#[test]
fn fountain_lost_context_fails_steps() {
    let mut sim = small_fountain();
    sim.lose_context("worker pool terminated");
    assert!(matches!(sim.step(0.01), Err(SimError::ResourceFailure(_))));
    sim.initialize(FountainConfig::default()).unwrap();
    assert!(sim.step(0.01).is_ok());
}

#[test]
fn facade_transfer_buffer_tracks_state() {
    let mut world = MassSpringWorld::new(4).unwrap();
    assert_eq!(world.state_len_floats(), 16 * world.floats_per_particle());
    world.step(0.05).unwrap();
    world.extract_state();
    let last = world.system().current_state()[15];
    let floats = world.transfer();
    assert_eq!(floats[15 * 8], last.position.x);
    assert_eq!(floats[15 * 8 + 1], last.position.y);
    assert_eq!(floats[7], 1.0);

    let mut fountain = FountainWorld::new(10).unwrap();
    fountain.step(0.05).unwrap();
    fountain.extract_state();
    assert_eq!(fountain.transfer().len(), 80);
    assert_eq!(fountain.live_count(), 10);
}

#[cfg(feature = "parallel")]
#[test]
fn results_do_not_depend_on_thread_count() {
    fn run(threads: usize) -> Vec<crate::domain::MassParticle> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        pool.install(|| {
            let mut sim = cloth(12);
            sim.pin(&[30, 31]).unwrap();
            for _ in 0..200 {
                sim.step(1.0 / 60.0).unwrap();
            }
            sim.current_state().to_vec()
        })
    }

    let one = run(1);
    let four = run(4);
    for (a, b) in one.iter().zip(&four) {
        assert!(a.position.bits_eq(&b.position));
        assert!(a.velocity.bits_eq(&b.velocity));
    }
}
