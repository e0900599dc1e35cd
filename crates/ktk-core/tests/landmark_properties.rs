use ktk_core::spatial::Point;
use ktk_core::transform::kernel::{ThinPlateKernel, ThinPlateR2LogRKernel};
use ktk_core::transform::KernelSplineTransform;
use proptest::prelude::*;

const D: usize = 3;

/// Jittered grid so that landmarks stay well separated.
fn landmarks(jitter: &[(f64, f64, f64)]) -> Vec<Point<D>> {
    jitter
        .iter()
        .enumerate()
        .map(|(i, (jx, jy, jz))| {
            let i = i as f64;
            Point::new([
                10.0 * (i % 3.0) + jx,
                10.0 * ((i / 3.0).floor() % 3.0) + jy,
                5.0 * (i % 2.0) + 10.0 * (i / 9.0).floor() + jz,
            ])
        })
        .collect()
}

fn jitter_strategy(n: std::ops::Range<usize>) -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((-2.0f64..2.0, -2.0f64..2.0, -2.0f64..2.0), n)
}

proptest! {
    #[test]
    fn test_exact_interpolation(
        jitter in jitter_strategy(5..14),
        offsets in prop::collection::vec((-3.0f64..3.0, -3.0f64..3.0, -3.0f64..3.0), 14)
    ) {
        let source = landmarks(&jitter);
        let target: Vec<_> = source
            .iter()
            .zip(&offsets)
            .map(|(p, (dx, dy, dz))| Point::new([p[0] + dx, p[1] + dy, p[2] + dz]))
            .collect();

        let transform =
            KernelSplineTransform::with_landmarks(ThinPlateKernel, source, target).unwrap();
        for (p, q) in transform.source_landmarks().iter().zip(transform.target_landmarks()) {
            let mapped = transform.transform_point(p);
            prop_assert!(mapped.distance(q) < 1e-6 * q.coords().norm().max(1.0));
        }
    }

    #[test]
    fn test_zero_displacement_is_identity(
        jitter in jitter_strategy(4..12),
        qx in -50.0f64..50.0, qy in -50.0f64..50.0, qz in -50.0f64..50.0
    ) {
        let source = landmarks(&jitter);
        let transform = KernelSplineTransform::with_landmarks(
            ThinPlateR2LogRKernel,
            source.clone(),
            source,
        ).unwrap();

        let query = Point::new([qx, qy, qz]);
        prop_assert!(transform.transform_point(&query).distance(&query) < 1e-9);
    }

    #[test]
    fn test_jacobian_covers_all_parameters(
        jitter in jitter_strategy(1..10),
        qx in -20.0f64..20.0, qy in -20.0f64..20.0, qz in -20.0f64..20.0
    ) {
        let source = landmarks(&jitter);
        let n = source.len();
        let transform =
            KernelSplineTransform::with_landmarks(ThinPlateKernel, source.clone(), source)
                .unwrap();

        prop_assert_eq!(transform.number_of_parameters(), n * D);
        let (jacobian, indices) = transform.jacobian(&Point::new([qx, qy, qz]));
        prop_assert_eq!(jacobian.shape(), (D, n * D));
        prop_assert_eq!(indices, (0..n * D).collect::<Vec<_>>());
        prop_assert!(jacobian.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_parameter_round_trip_is_idempotent(
        jitter in jitter_strategy(5..10),
        offsets in prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0), 10),
        qx in -20.0f64..20.0, qy in -20.0f64..20.0, qz in -20.0f64..20.0
    ) {
        let source = landmarks(&jitter);
        let target: Vec<_> = source
            .iter()
            .zip(&offsets)
            .map(|(p, (dx, dy, dz))| Point::new([p[0] + dx, p[1] + dy, p[2] + dz]))
            .collect();
        let mut transform =
            KernelSplineTransform::with_landmarks(ThinPlateKernel, source, target).unwrap();
        let query = Point::new([qx, qy, qz]);
        let before = transform.transform_point(&query);

        let parameters = transform.parameters();
        transform.set_parameters(&parameters).unwrap();
        prop_assert_eq!(transform.transform_point(&query), before);
    }
}
