use std::f64::consts::FRAC_PI_2;

use crate::geom::ProfileCache;
use crate::horn::{
    GuidingCurve, OsseParams, ParamValue, ProfileParams, RosseParams, evaluate_profile, profile_length,
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
fn osse_without_termination_follows_the_expansion() {
    let profile = ProfileParams::Osse(small_osse());
    let mut cache = ProfileCache::new();

    let throat = evaluate_profile(0.0, 0.0, &profile, &mut cache);
    assert!(throat.axial.abs() < 1e-12);
    assert!((throat.radius - 10.0).abs() < 1e-9);

    let mouth = evaluate_profile(1.0, 0.0, &profile, &mut cache);
    let tan_a0 = 10f64.to_radians().tan();
    let tan_a = 30f64.to_radians().tan();
    let expected = (100.0 + 2.0 * 10.0 * 120.0 * tan_a0 + 120.0 * 120.0 * tan_a * tan_a).sqrt();
    assert!((mouth.axial - 120.0).abs() < 1e-9);
    assert!((mouth.radius - expected).abs() < 1e-9, "mouth radius {}", mouth.radius);
}

#[test]
fn osse_axial_and_radius_grow_toward_the_mouth() {
    let profile = ProfileParams::Osse(OsseParams::default());
    let mut cache = ProfileCache::new();
    let mut last = evaluate_profile(0.0, 0.3, &profile, &mut cache);
    for i in 1..=50 {
        let point = evaluate_profile(f64::from(i) / 50.0, 0.3, &profile, &mut cache);
        assert!(point.axial > last.axial);
        assert!(point.radius >= last.radius - 1e-9);
        last = point;
    }
}

#[test]
fn throat_extension_and_slot_lead_the_body() {
    let params = OsseParams {
        throat_ext_length: 10.0,
        throat_ext_angle: 5.0,
        slot_length: 5.0,
        ..small_osse()
    };
    let profile = ProfileParams::Osse(params);
    let mut cache = ProfileCache::new();
    let total = profile_length(0.0, &profile, &mut cache);
    assert!((total - 135.0).abs() < 1e-12);

    let ext_end = evaluate_profile(10.0 / total, 0.0, &profile, &mut cache);
    let body_r0 = 10.0 + 10.0 * 5f64.to_radians().tan();
    assert!((ext_end.radius - body_r0).abs() < 1e-9);

    let in_slot = evaluate_profile(12.5 / total, 0.0, &profile, &mut cache);
    assert!((in_slot.radius - body_r0).abs() < 1e-9);

    let body_start = evaluate_profile(15.0 / total, 0.0, &profile, &mut cache);
    assert!((body_start.radius - body_r0).abs() < 1e-9);
}

#[test]
fn rosse_spans_throat_to_mouth_radius() {
    let profile = ProfileParams::ROsse(RosseParams::default());
    let mut cache = ProfileCache::new();
    for p in [0.0, 0.7, FRAC_PI_2] {
        let throat = evaluate_profile(0.0, p, &profile, &mut cache);
        assert!(throat.axial.abs() < 1e-9);
        assert!((throat.radius - 12.7).abs() < 1e-9);

        let mouth = evaluate_profile(1.0, p, &profile, &mut cache);
        assert!((mouth.radius - 150.0).abs() < 1e-6);
        assert!(mouth.axial > 0.0);
    }
    assert_eq!(cache.stats().rosse_length_entries, 3);
}

#[test]
fn formula_coverage_narrows_the_vertical_plane() {
    let params = RosseParams {
        coverage_angle: ParamValue::from_formula("60 - 20 * sin(p)^2").expect("formula"),
        ..RosseParams::default()
    };
    let profile = ProfileParams::ROsse(params);
    let mut cache = ProfileCache::new();

    // Narrower coverage needs a longer horn to reach the same mouth radius.
    let horizontal = evaluate_profile(1.0, 0.0, &profile, &mut cache);
    let vertical = evaluate_profile(1.0, FRAC_PI_2, &profile, &mut cache);
    assert!(vertical.axial > horizontal.axial);
}

#[test]
fn guiding_curve_puts_the_mouth_on_the_curve() {
    let params = OsseParams {
        s: 0.0.into(),
        guiding_curve: Some(GuidingCurve::default()),
        ..OsseParams::default()
    };
    let profile = ProfileParams::Osse(params);
    let mut cache = ProfileCache::new();

    let horizontal = evaluate_profile(1.0, 0.0, &profile, &mut cache);
    let vertical = evaluate_profile(1.0, FRAC_PI_2, &profile, &mut cache);
    assert!((horizontal.radius - 150.0).abs() < 1e-6, "{}", horizontal.radius);
    assert!((vertical.radius - 90.0).abs() < 1e-6, "{}", vertical.radius);
    assert_eq!(cache.stats().coverage_entries, 2);
}
