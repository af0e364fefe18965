//! End-to-end numerical and lifecycle properties of the flowfield core.

use flowfield_core::particle::Advection;
use flowfield_core::source::{CurlNoiseField, Equation, EquationField, NoiseBackend};
use flowfield_core::{
    CoordinateMapper, FieldSource, Integrator, Particle, Projection, Simulation,
    SimulationConfig, SpawnConfig, TickSchedule, Vector2,
};

struct Constant(Vector2);

impl FieldSource for Constant {
    fn evaluate(&self, _p: Vector2, _t: f64) -> Vector2 {
        self.0
    }
}

fn solve(
    integrator: Integrator,
    field: &dyn FieldSource,
    start: Vector2,
    h: f64,
    steps: usize,
) -> Vector2 {
    (0..steps).fold(start, |p, i| integrator.advance(field, p, i as f64 * h, h, 1.0))
}

#[test]
fn constant_field_step_is_exact_for_every_scheme() {
    let field = Constant(Vector2::new(1.0, 0.0));
    for h in [0.01, 0.5, 3.0] {
        for integrator in Integrator::all() {
            let d = integrator.integrate(&field, Vector2::new(-4.0, 2.0), 0.0, h, 1.0);
            assert!(
                (d - Vector2::new(h, 0.0)).length() < 1e-12,
                "{} at h={h}: {d:?}",
                integrator.name()
            );
        }
    }
}

/// Global error at t = 1 for dx/dt = x from x(0) = 1.
fn growth_error(integrator: Integrator, h: f64) -> f64 {
    let field = EquationField::new(Equation::XY, 0);
    let steps = (1.0 / h).round() as usize;
    let end = solve(integrator, &field, Vector2::new(1.0, 0.0), h, steps);
    (end.x - std::f64::consts::E).abs()
}

#[test]
fn halving_the_step_shrinks_error_by_the_scheme_order() {
    let ratio = |integrator| growth_error(integrator, 0.1) / growth_error(integrator, 0.05);

    let euler = ratio(Integrator::Euler);
    let rk2 = ratio(Integrator::Rk2);
    let midpoint = ratio(Integrator::Midpoint);
    let rk4 = ratio(Integrator::Rk4);

    // The averaged RK2 misses the h²/2 Taylor term by half, so it stays first
    // order; the midpoint method is second order.
    assert!((1.7..2.3).contains(&euler), "euler ratio {euler}");
    assert!((1.7..2.3).contains(&rk2), "rk2 ratio {rk2}");
    assert!((3.3..4.5).contains(&midpoint), "midpoint ratio {midpoint}");
    assert!((13.0..18.0).contains(&rk4), "rk4 ratio {rk4}");
}

#[test]
fn rk2_single_step_on_growth() {
    let field = EquationField::new(Equation::XY, 0);
    let d = Integrator::Rk2.integrate(&field, Vector2::new(1.0, 0.0), 0.0, 0.1, 1.0);
    // k1 = 1, k2 = 1.05 at the half-step estimate, mean slope times step.
    assert!((d.x - 0.1025).abs() < 1e-12, "d = {d:?}");
    assert!(d.y.abs() < 1e-12);
    let back = Integrator::Rk2.integrate(&field, Vector2::new(1.0, 0.0), 0.0, 0.1, -1.0);
    assert!((back.x - 0.0975).abs() < 1e-12, "back = {back:?}");
}

#[test]
fn rk4_tracks_the_symmetric_linear_system() {
    // dx/dt = y, dy/dt = x from (1, 1): x = y = e^t.
    let field = EquationField::new(Equation::YX, 0);
    let end = solve(Integrator::Rk4, &field, Vector2::new(1.0, 1.0), 0.01, 100);
    let exact = std::f64::consts::E;
    assert!((end.x - exact).abs() < 1e-8, "x = {}", end.x);
    assert!((end.y - exact).abs() < 1e-8, "y = {}", end.y);

    // Cross-check against a much finer run of the same scheme.
    let reference = solve(Integrator::Rk4, &field, Vector2::new(1.0, 1.0), 0.0005, 2000);
    assert!((end - reference).length() < 1e-8);
}

#[test]
fn rk4_separates_off_diagonal_start_like_the_analytic_solution() {
    // From (1, 0): x = cosh t, y = sinh t.
    let field = EquationField::new(Equation::YX, 0);
    let end = solve(Integrator::Rk4, &field, Vector2::new(1.0, 0.0), 0.01, 100);
    assert!((end.x - 1f64.cosh()).abs() < 1e-8);
    assert!((end.y - 1f64.sinh()).abs() < 1e-8);
}

#[test]
fn curl_noise_is_divergence_free() {
    let field = CurlNoiseField::new(NoiseBackend::Perlin, 1234, 1.0, 1e-4, 1.0).unwrap();
    let h = 1e-3;
    let mut largest_gradient: f64 = 0.0;
    let mut largest_divergence: f64 = 0.0;
    for i in 0..20 {
        for j in 0..20 {
            let p = Vector2::new(0.137 + i as f64 * 0.21, 0.291 + j as f64 * 0.19);
            let dvx_dx = (field.evaluate(p + Vector2::X * h, 0.0).x
                - field.evaluate(p - Vector2::X * h, 0.0).x)
                / (2.0 * h);
            let dvy_dy = (field.evaluate(p + Vector2::Y * h, 0.0).y
                - field.evaluate(p - Vector2::Y * h, 0.0).y)
                / (2.0 * h);
            largest_gradient = largest_gradient.max(dvx_dx.abs());
            largest_divergence = largest_divergence.max((dvx_dx + dvy_dy).abs());
        }
    }
    assert!(largest_gradient > 0.1, "field is suspiciously flat");
    assert!(
        largest_divergence < 1e-2 * largest_gradient,
        "divergence {largest_divergence} vs gradient {largest_gradient}"
    );
}

fn divergence_at(field: &CurlNoiseField, p: Vector2, h: f64) -> (f64, f64) {
    let dvx_dx = (field.evaluate(p + Vector2::X * h, 0.0).x
        - field.evaluate(p - Vector2::X * h, 0.0).x)
        / (2.0 * h);
    let dvy_dy = (field.evaluate(p + Vector2::Y * h, 0.0).y
        - field.evaluate(p - Vector2::Y * h, 0.0).y)
        / (2.0 * h);
    (dvx_dx + dvy_dy, dvx_dx.abs().max(dvy_dy.abs()))
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-4;

    /// With the difference step equal to the curl's own epsilon, both
    /// partials sum the same four noise samples with opposite signs.
    fn assert_solenoidal(
        backend: NoiseBackend,
        seed: u32,
        x: f64,
        y: f64,
    ) -> Result<(), TestCaseError> {
        let field = CurlNoiseField::new(backend, seed, 1.0, EPSILON, 1.0).unwrap();
        let (divergence, gradient) = divergence_at(&field, Vector2::new(x, y), EPSILON);
        prop_assert!(
            divergence.abs() < 1e-6 * (1.0 + gradient),
            "{} divergence {} vs gradient {}",
            backend.name(),
            divergence,
            gradient
        );
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn perlin_curl_is_divergence_free(
            seed in any::<u32>(),
            x in -50.0_f64..50.0,
            y in -50.0_f64..50.0,
        ) {
            assert_solenoidal(NoiseBackend::Perlin, seed, x, y)?;
        }

        #[test]
        fn value_curl_is_divergence_free(
            seed in any::<u32>(),
            x in -50.0_f64..50.0,
            y in -50.0_f64..50.0,
        ) {
            assert_solenoidal(NoiseBackend::Value, seed, x, y)?;
        }

        #[test]
        fn simplex_curl_is_divergence_free(
            seed in any::<u32>(),
            x in -50.0_f64..50.0,
            y in -50.0_f64..50.0,
        ) {
            assert_solenoidal(NoiseBackend::Simplex, seed, x, y)?;
        }
    }
}

#[test]
fn population_converges_from_empty_for_any_lifespan() {
    for (min, max) in [(0, 1), (1, 3), (5, 5), (300, 600)] {
        let config = SimulationConfig {
            target_count: 25,
            spawn: SpawnConfig {
                min_lifespan: min,
                max_lifespan: max,
                ..SpawnConfig::default()
            },
            ..SimulationConfig::default()
        };
        let mut sim = Simulation::with_seed(config, 99).unwrap();
        for _ in 0..25 {
            sim.tick(60.0);
        }
        assert_eq!(sim.particles().len(), 25, "lifespan [{min}, {max})");
        for _ in 0..300 {
            let frame = sim.tick(60.0);
            assert!(frame.population.abs_diff(25) <= 1);
        }
    }
}

#[test]
fn particle_dies_strictly_after_its_lifespan() {
    let mapper = CoordinateMapper::new(100.0, 100.0, Projection::Screen).unwrap();
    let field = Constant(Vector2::new(0.1, 0.0));
    let ctx = Advection {
        field: &field,
        integrator: Integrator::Rk4,
        mapper: &mapper,
        schedule: TickSchedule::SINGLE,
        time: 0.0,
        step: 1.0,
    };
    for lifespan in [0u32, 1, 7, 50] {
        let mut p = Particle {
            position: Vector2::new(50.0, 50.0),
            last_display: Vector2::new(50.0, 50.0),
            velocity: Vector2::ZERO,
            size: 1.0,
            color: 0,
            direction: 1.0,
            age: 0,
            lifespan,
        };
        for tick in 1..=lifespan {
            p.step(&ctx);
            assert!(!p.is_dead(), "lifespan {lifespan} died at tick {tick}");
        }
        p.step(&ctx);
        assert!(p.is_dead(), "lifespan {lifespan} alive after tick {}", lifespan + 1);
    }
}

#[test]
fn double_update_schedule_halves_lifetime() {
    let mapper = CoordinateMapper::new(100.0, 100.0, Projection::Screen).unwrap();
    let field = Constant(Vector2::ZERO);
    let ticks_to_die = |schedule: TickSchedule| {
        let ctx = Advection {
            field: &field,
            integrator: Integrator::Euler,
            mapper: &mapper,
            schedule,
            time: 0.0,
            step: 1.0,
        };
        let mut p = Particle {
            position: Vector2::ZERO,
            last_display: Vector2::ZERO,
            velocity: Vector2::ZERO,
            size: 1.0,
            color: 0,
            direction: 1.0,
            age: 0,
            lifespan: 100,
        };
        let mut ticks = 0;
        while !p.is_dead() {
            p.step(&ctx);
            ticks += 1;
        }
        ticks
    };
    assert_eq!(ticks_to_die(TickSchedule::DOUBLE_STEP), 101);
    assert_eq!(ticks_to_die(TickSchedule::DOUBLE_UPDATE), 51);
}

/// One tick of Euler through `dx/dt = x` from `(1, 0)` with unit step.
fn tick_through_growth(schedule: TickSchedule) -> Particle {
    let mapper = CoordinateMapper::new(100.0, 100.0, Projection::Screen).unwrap();
    let field = EquationField::new(Equation::XY, 0);
    let ctx = Advection {
        field: &field,
        integrator: Integrator::Euler,
        mapper: &mapper,
        schedule,
        time: 0.0,
        step: 1.0,
    };
    let mut p = Particle {
        position: Vector2::new(1.0, 0.0),
        last_display: Vector2::new(1.0, 0.0),
        velocity: Vector2::ZERO,
        size: 1.0,
        color: 0,
        direction: 1.0,
        age: 0,
        lifespan: 100,
    };
    p.step(&ctx);
    p
}

#[test]
fn repeated_displacement_is_sampled_once_per_tick() {
    // The field at the start is 1, so two repeats land at 3. Re-sampling at
    // the intermediate position would reach 4.
    let single = tick_through_growth(TickSchedule::SINGLE);
    assert_eq!(single.position, Vector2::new(2.0, 0.0));

    let double_step = tick_through_growth(TickSchedule::DOUBLE_STEP);
    assert_eq!(double_step.position, Vector2::new(3.0, 0.0));
    assert_eq!(double_step.velocity, Vector2::new(1.0, 0.0));
    assert_eq!(double_step.age, 1);

    let double_update = tick_through_growth(TickSchedule::DOUBLE_UPDATE);
    assert_eq!(double_update.position, Vector2::new(3.0, 0.0));
    assert_eq!(double_update.age, 2);
}

#[test]
fn display_round_trip_for_both_projections() {
    let mappers = [
        CoordinateMapper::new(1920.0, 1080.0, Projection::Centered { field_scale: 20.0 }).unwrap(),
        CoordinateMapper::new(333.0, 777.0, Projection::Centered { field_scale: 0.5 }).unwrap(),
        CoordinateMapper::new(640.0, 480.0, Projection::Screen).unwrap(),
    ];
    for m in &mappers {
        for p in [
            Vector2::new(0.0, 0.0),
            Vector2::new(12.25, 999.5),
            Vector2::new(-40.0, 3.0),
        ] {
            let back = m.to_display(m.to_simulation(p));
            assert!((back - p).length() < 1e-9, "{p:?} -> {back:?}");
        }
    }
}
