use ktk_core::config::{KernelKind, KernelTransformConfig};
use ktk_core::spatial::Point;
use ktk_core::transform::kernel::{
    ElasticBodyKernel, ElasticBodyReciprocalKernel, KernelFunction, ThinPlateKernel,
    ThinPlateR2LogRKernel, VolumeKernel,
};
use ktk_core::transform::{AdvancedTransform, KernelSplineTransform, SplineKernel};
use ktk_core::TransformError;

fn cube_landmarks() -> (Vec<Point<3>>, Vec<Point<3>>) {
    let mut source = Vec::new();
    for &x in &[0.0, 10.0] {
        for &y in &[0.0, 10.0] {
            for &z in &[0.0, 10.0] {
                source.push(Point::new([x, y, z]));
            }
        }
    }
    source.push(Point::new([5.0, 5.0, 5.0]));
    let target = source
        .iter()
        .enumerate()
        .map(|(i, p)| Point::new([p[0] + 0.3 * i as f64, p[1] - 0.1 * i as f64, p[2] + 0.5]))
        .collect();
    (source, target)
}

fn assert_interpolates<K: KernelFunction<3>>(kernel: K) {
    let (source, target) = cube_landmarks();
    let transform = KernelSplineTransform::with_landmarks(kernel, source, target).unwrap();
    for (p, q) in transform.source_landmarks().iter().zip(transform.target_landmarks()) {
        let mapped = transform.transform_point(p);
        let scale = q.coords().norm().max(1.0);
        assert!(
            mapped.distance(q) < 1e-6 * scale,
            "{:?}: {:?} mapped to {:?}, expected {:?}",
            transform.kernel(),
            p,
            mapped,
            q
        );
    }
}

#[test]
fn test_exact_interpolation_all_kernels() {
    assert_interpolates(ThinPlateKernel);
    assert_interpolates(ThinPlateR2LogRKernel);
    assert_interpolates(VolumeKernel);
    assert_interpolates(ElasticBodyKernel::default());
    assert_interpolates(ElasticBodyReciprocalKernel::default());
}

#[test]
fn test_single_moved_landmark_2d() {
    let source = vec![
        Point::new([0.0, 0.0]),
        Point::new([1.0, 0.0]),
        Point::new([0.0, 1.0]),
    ];
    let target = vec![
        Point::new([0.0, 0.0]),
        Point::new([1.0, 0.0]),
        Point::new([0.0, 2.0]),
    ];
    let transform =
        KernelSplineTransform::with_landmarks(ThinPlateR2LogRKernel, source, target).unwrap();

    let moved = transform.transform_point(&Point::new([0.0, 1.0]));
    assert!((moved[0] - 0.0).abs() < 1e-6);
    assert!((moved[1] - 2.0).abs() < 1e-6);

    let origin = transform.transform_point(&Point::new([0.0, 0.0]));
    assert!(origin.distance(&Point::new([0.0, 0.0])) < 1e-6);
    let corner = transform.transform_point(&Point::new([1.0, 0.0]));
    assert!(corner.distance(&Point::new([1.0, 0.0])) < 1e-6);

    // Three landmarks in 2D only determine an affine map: y is doubled.
    let inside = transform.transform_point(&Point::new([0.25, 0.5]));
    assert!((inside[0] - 0.25).abs() < 1e-6);
    assert!((inside[1] - 1.0).abs() < 1e-6);
    assert!(transform.coefficients().deformation().iter().all(|c| c.norm() < 1e-9));
}

#[test]
fn test_identity_recovery() {
    let (source, _) = cube_landmarks();
    let transform =
        KernelSplineTransform::with_landmarks(VolumeKernel, source.clone(), source).unwrap();

    for p in [
        Point::new([1.0, 2.0, 3.0]),
        Point::new([-20.0, 4.5, 100.0]),
        Point::new([5.0, 5.0, 5.0]),
    ] {
        assert!(transform.transform_point(&p).distance(&p) < 1e-9);
    }
}

#[test]
fn test_set_identity_without_solve() {
    let (source, target) = cube_landmarks();
    let mut transform =
        KernelSplineTransform::with_landmarks(ThinPlateKernel, source, target).unwrap();
    let l_inverse = transform.l_inverse().clone();

    transform.set_identity().unwrap();
    assert_eq!(*transform.l_inverse(), l_inverse);
    for p in [Point::new([3.0, -1.0, 7.5]), Point::new([10.0, 10.0, 10.0])] {
        assert_eq!(transform.transform_point(&p), p);
    }
}

#[test]
fn test_stiffness_trades_accuracy_for_smoothness() {
    let source = vec![
        Point::new([0.0, 0.0]),
        Point::new([4.0, 0.0]),
        Point::new([0.0, 4.0]),
        Point::new([4.0, 4.0]),
        Point::new([2.0, 2.0]),
        Point::new([1.0, 3.0]),
    ];
    let mut target = source.clone();
    target[4] = Point::new([2.8, 1.5]);
    target[5] = Point::new([0.6, 3.4]);

    let mut transform =
        KernelSplineTransform::with_landmarks(ThinPlateR2LogRKernel, source, target).unwrap();

    let residual = |t: &KernelSplineTransform<ThinPlateR2LogRKernel, 2>| -> f64 {
        t.source_landmarks()
            .iter()
            .zip(t.target_landmarks())
            .map(|(p, q)| t.transform_point(p).distance(q).powi(2))
            .sum::<f64>()
            .sqrt()
    };

    assert!(residual(&transform) < 1e-8);
    let mut previous = 0.0;
    for stiffness in [0.01, 0.1, 1.0, 10.0, 100.0] {
        transform.set_stiffness(stiffness).unwrap();
        let current = residual(&transform);
        assert!(
            current >= previous - 1e-12,
            "residual dropped from {} to {} at stiffness {}",
            previous,
            current,
            stiffness
        );
        previous = current;
    }
    assert!(previous > 1e-3);
}

#[test]
fn test_elastic_body_stiffness_trades_accuracy_for_smoothness() {
    let (source, target) = cube_landmarks();
    let mut transform =
        KernelSplineTransform::with_landmarks(ElasticBodyKernel::default(), source, target)
            .unwrap();

    let residual = |t: &KernelSplineTransform<ElasticBodyKernel, 3>| -> f64 {
        t.source_landmarks()
            .iter()
            .zip(t.target_landmarks())
            .map(|(p, q)| t.transform_point(p).distance(q).powi(2))
            .sum::<f64>()
            .sqrt()
    };

    assert!(residual(&transform) < 1e-5);
    let mut previous = 0.0;
    for stiffness in [0.1, 1.0, 10.0, 100.0, 1000.0] {
        transform.set_stiffness(stiffness).unwrap();
        let current = residual(&transform);
        assert!(
            current >= previous - 1e-12,
            "residual dropped from {} to {} at stiffness {}",
            previous,
            current,
            stiffness
        );
        previous = current;
    }
    assert!(previous > 1e-3);
}

#[test]
fn test_source_mutation_forces_fresh_solve() {
    let (source, target) = cube_landmarks();
    let mut transform =
        KernelSplineTransform::with_landmarks(ThinPlateKernel, source.clone(), target).unwrap();
    let query = Point::new([2.0, 7.0, 4.0]);
    let before = transform.transform_point(&query);
    let l_before = transform.l_matrix().clone();

    let shifted: Vec<_> = source.iter().map(|p| Point::new([p[0] + 1.0, p[1], p[2]])).collect();
    transform.set_source_landmarks(shifted).unwrap();

    assert!(transform.cache_state().is_complete());
    assert_ne!(*transform.l_matrix(), l_before);
    assert!(transform.transform_point(&query).distance(&before) > 1e-6);
}

#[test]
fn test_parameter_round_trip() {
    let (source, target) = cube_landmarks();
    let mut transform =
        KernelSplineTransform::with_landmarks(ElasticBodyKernel::default(), source, target)
            .unwrap();
    let queries = [Point::new([1.0, 2.0, 3.0]), Point::new([8.0, -3.0, 12.0])];
    let before: Vec<_> = queries.iter().map(|q| transform.transform_point(q)).collect();

    let parameters = transform.parameters();
    let fixed = transform.fixed_parameters();
    transform.set_parameters(&parameters).unwrap();
    transform.set_fixed_parameters(&fixed).unwrap();

    for (q, b) in queries.iter().zip(&before) {
        assert!(transform.transform_point(q).distance(b) < 1e-10);
    }
}

#[test]
fn test_number_of_parameters_tracks_landmarks() {
    let mut transform = KernelSplineTransform::<_, 3>::new(ThinPlateKernel);
    assert_eq!(transform.number_of_parameters(), 0);

    let (source, target) = cube_landmarks();
    transform.set_landmarks(source, target).unwrap();
    assert_eq!(transform.number_of_parameters(), 27);

    transform
        .set_landmark_parameters(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0], &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0])
        .unwrap();
    assert_eq!(transform.number_of_parameters(), 6);
}

#[test]
fn test_rejected_setters_keep_state() {
    let (source, target) = cube_landmarks();
    let mut transform =
        KernelSplineTransform::with_landmarks(ThinPlateKernel, source.clone(), target.clone())
            .unwrap();
    let query = Point::new([4.0, 4.0, 4.0]);
    let before = transform.transform_point(&query);

    let err = transform.set_landmarks(source.clone(), target[..5].to_vec()).unwrap_err();
    assert_eq!(err, TransformError::size_mismatch(9, 5));
    assert!(matches!(
        transform.set_target_landmarks(target[..8].to_vec()),
        Err(TransformError::SizeMismatch { .. })
    ));
    assert!(matches!(
        transform.set_parameters(&[1.0; 10]),
        Err(TransformError::InvalidParameterLength { .. })
    ));

    assert_eq!(transform.number_of_landmarks(), 9);
    assert_eq!(transform.source_landmarks(), source.as_slice());
    assert_eq!(transform.transform_point(&query), before);
}

#[test]
fn test_trait_object_capabilities() {
    let (source, target) = cube_landmarks();
    let transform =
        KernelSplineTransform::with_landmarks(ThinPlateKernel, source, target).unwrap();
    let advanced: &dyn AdvancedTransform<3> = &transform;

    assert!(!advanced.is_linear());
    assert!(advanced.has_nonzero_spatial_hessian());
    assert!(advanced.has_nonzero_jacobian_of_spatial_hessian());
    assert_eq!(advanced.number_of_parameters(), 27);

    let (jacobian, indices) = advanced.jacobian(&Point::new([1.0, 1.0, 1.0]));
    assert_eq!(jacobian.shape(), (3, 27));
    assert_eq!(indices, (0..27).collect::<Vec<_>>());
}

#[test]
fn test_config_driven_transform() {
    let config: KernelTransformConfig = KernelTransformConfig::new()
        .with_kernel(KernelKind::ElasticBody)
        .with_poisson_ratio(0.45);
    let mut transform = KernelSplineTransform::<SplineKernel, 3>::from_config(&config).unwrap();
    assert_eq!(transform.kernel().kind(), KernelKind::ElasticBody);
    assert!((transform.poisson_ratio() - 0.45).abs() < 1e-12);

    let (source, target) = cube_landmarks();
    transform.set_landmarks(source, target).unwrap();
    for (p, q) in transform.source_landmarks().iter().zip(transform.target_landmarks()) {
        assert!(transform.transform_point(p).distance(q) < 1e-6);
    }
}
