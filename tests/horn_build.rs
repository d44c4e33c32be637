use rand::prelude::StdRng;
use rand::{Rng, SeedableRng};

use waveguide_engine::geom::ProfileCache;
use waveguide_engine::horn::{
    BuildError, EnclosureParams, EnclosureSpacing, HornContext, HornParams, OsseParams, ParamValue, ProfileParams,
    RosseParams, SamplingParams, Severity, Symmetry, build_horn, build_horn_with_context, profile_radius,
    resample_slice_map, validate_params,
};

fn small_osse() -> OsseParams {
    OsseParams {
        length: 120.0.into(),
        throat_radius: 10.0.into(),
        throat_angle: 10.0.into(),
        coverage_angle: 30.0.into(),
        k: 1.0.into(),
        s: 0.0.into(),
        ..OsseParams::default()
    }
}

#[test]
fn open_horn_has_grid_counts() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(7);
    for _ in 0..12 {
        let n = 4 * rng.random_range(2..16_usize);
        let m = rng.random_range(1..24_usize);
        let params = HornParams {
            sampling: SamplingParams {
                angular_segments: n,
                length_segments: m,
                ..SamplingParams::default()
            },
            ..HornParams::default()
        };
        let build = build_horn(&params).expect("build");
        assert_eq!(build.mesh.vertex_count(), (m + 1) * n, "n={n} m={m}");
        assert_eq!(build.mesh.triangle_count(), 2 * m * n, "n={n} m={m}");
        assert_eq!(build.quality.boundary_edge_count, 2 * n);
        assert_eq!(build.quality.non_manifold_edge_count, 0);
    }
}

fn signed_volume(positions: &[[f64; 3]], indices: &[u32]) -> f64 {
    indices
        .chunks_exact(3)
        .map(|tri| {
            let [a, b, c] = [0, 1, 2].map(|k| positions[tri[k] as usize]);
            let cross = [
                b[1] * c[2] - b[2] * c[1],
                b[2] * c[0] - b[0] * c[2],
                b[0] * c[1] - b[1] * c[0],
            ];
            (a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]) / 6.0
        })
        .sum()
}

#[test]
fn closed_build_normals_point_outward() {
    let params = HornParams {
        profile: ProfileParams::Osse(small_osse()),
        sampling: SamplingParams {
            angular_segments: 24,
            length_segments: 12,
            ..SamplingParams::default()
        },
        enclosure: Some(EnclosureParams {
            depth: 200.0,
            ..EnclosureParams::default()
        }),
        ..HornParams::default()
    };
    let build = build_horn_with_context(&params, &mut HornContext::strict()).expect("strict build");
    assert_eq!(build.quality.boundary_edge_count, 0);
    assert!(build.issues.iter().all(|issue| issue.param != "enclosure.depth"));
    let volume = signed_volume(&build.mesh.positions, &build.mesh.indices);
    assert!(volume > 0.0, "signed volume {volume}");
}

#[test]
fn shallow_osse_enclosure_is_closed_but_flagged() {
    let params = HornParams {
        profile: ProfileParams::Osse(small_osse()),
        sampling: SamplingParams {
            angular_segments: 24,
            length_segments: 12,
            ..SamplingParams::default()
        },
        enclosure: Some(EnclosureParams {
            depth: 50.0,
            edge_radius: 5.0,
            spacing: EnclosureSpacing::uniform(30.0),
            ..EnclosureParams::default()
        }),
        ..HornParams::default()
    };
    let build = build_horn_with_context(&params, &mut HornContext::strict()).expect("strict build");
    let quality = &build.quality;
    assert_eq!(quality.boundary_edge_count, 0);
    assert_eq!(quality.non_manifold_edge_count, 0);
    assert_eq!(quality.component_count, 1);
    assert!(
        build
            .issues
            .iter()
            .any(|issue| issue.severity == Severity::Warning && issue.param == "enclosure.depth")
    );

    let throat = build.mesh.rings[0];
    let p = build.mesh.positions[throat.start as usize];
    assert!((p[0] - 10.0).abs() < 1e-9);
    assert!(p[1].abs() < 1e-12);
}

#[test]
fn quarter_enclosure_is_open_on_both_mirror_planes() {
    let params = HornParams {
        profile: ProfileParams::Osse(small_osse()),
        sampling: SamplingParams {
            angular_segments: 32,
            length_segments: 8,
            symmetry: Symmetry::Quarter,
            ..SamplingParams::default()
        },
        enclosure: Some(EnclosureParams {
            depth: 150.0,
            ..EnclosureParams::default()
        }),
        ..HornParams::default()
    };
    let build = build_horn(&params).expect("build");
    assert!(build.quality.boundary_edge_count > 0);
    assert_eq!(build.quality.non_manifold_edge_count, 0);
    for p in &build.mesh.positions {
        assert!(p[0] >= -1e-9 && p[2] >= -1e-9, "vertex outside the quarter: {p:?}");
    }
}

#[test]
fn resampled_maps_are_monotone() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(42);
    for _ in 0..50 {
        let len = rng.random_range(2..12_usize);
        let map: Vec<f64> = (0..len).map(|_| rng.random_range(-1.0_f64..10.0)).collect();
        let steps = rng.random_range(1..40_usize);
        let Some(out) = resample_slice_map(&map, steps) else {
            continue;
        };
        assert_eq!(out.len(), steps + 1);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[steps], 1.0);
        assert!(out.windows(2).all(|w| w[1] >= w[0]), "{map:?} -> {out:?}");
    }
}

#[test]
fn formula_parameters_shape_the_mouth() {
    let params = HornParams {
        profile: ProfileParams::ROsse(RosseParams {
            mouth_radius: ParamValue::from_formula("150 - 40 * sin(p)^2").expect("formula"),
            ..RosseParams::default()
        }),
        sampling: SamplingParams {
            angular_segments: 16,
            length_segments: 4,
            ..SamplingParams::default()
        },
        ..HornParams::default()
    };
    let build = build_horn(&params).expect("build");
    let mouth = build.mesh.mouth_ring().expect("mouth");
    let top = mouth
        .indices()
        .map(|i| build.mesh.positions[i][2])
        .fold(f64::NEG_INFINITY, f64::max);
    let right = mouth
        .indices()
        .map(|i| build.mesh.positions[i][0])
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((top - 110.0).abs() < 1e-6, "{top}");
    assert!((right - 150.0).abs() < 1e-6, "{right}");
}

#[test]
fn failing_formula_is_reported_not_fatal() {
    let params = HornParams {
        profile: ProfileParams::ROsse(RosseParams {
            // Negative under the root for part of the circle.
            coverage_angle: ParamValue::from_formula("60 * sqrt(cos(p))").expect("formula"),
            ..RosseParams::default()
        }),
        sampling: SamplingParams {
            angular_segments: 16,
            length_segments: 4,
            ..SamplingParams::default()
        },
        ..HornParams::default()
    };
    let issues = validate_params(&params);
    assert!(issues.iter().any(|issue| issue.severity == Severity::Error));

    let build = build_horn(&params).expect("non-strict build");
    assert!(build.has_param_errors());
    assert!(build.quality.non_finite_vertex_count > 0);

    let err = build_horn_with_context(&params, &mut HornContext::strict()).expect_err("strict");
    assert!(matches!(err, BuildError::InvalidParameters { .. }));
}

#[test]
fn osse_radius_is_monotone_over_random_parameters() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(1234);
    let mut cache = ProfileCache::new();
    for _ in 0..40 {
        let params = ProfileParams::Osse(OsseParams {
            length: rng.random_range(40.0_f64..300.0).into(),
            throat_radius: rng.random_range(5.0_f64..30.0).into(),
            throat_angle: rng.random_range(0.0_f64..30.0).into(),
            coverage_angle: rng.random_range(30.0_f64..80.0).into(),
            k: rng.random_range(0.5_f64..10.0).into(),
            s: rng.random_range(0.0_f64..2.0).into(),
            n: rng.random_range(1.0_f64..10.0).into(),
            q: rng.random_range(0.9_f64..1.0).into(),
            ..OsseParams::default()
        });
        let p = rng.random_range(0.0_f64..std::f64::consts::TAU);
        cache.clear();
        let mut last = profile_radius(0.0, p, &params, &mut cache);
        for i in 1..=64 {
            let r = profile_radius(f64::from(i) / 64.0, p, &params, &mut cache);
            assert!(r.is_finite());
            assert!(r >= last - 1e-9, "{params:?} at p = {p}: {r} < {last}");
            last = r;
        }
    }
}
