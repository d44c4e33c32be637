//! Axial slice planning.
//!
//! Produces `steps + 1` monotone values of `t` from 0 to 1. The first
//! applicable strategy wins:
//!
//! 1. an explicit slice map, resampled to the step count
//! 2. throat/mouth target resolutions (geometric grading)
//! 3. an extension-aware split when the OSSE profile has a lead-in
//! 4. uniform spacing

use super::params::{HornParams, ProfileParams, SamplingParams};

/// Share of the axial steps given to the throat extension and slot.
pub const LEAD_IN_STEP_FRACTION: f64 = 0.2;

/// Builds the axial distribution for `steps` steps (at least one).
#[must_use]
pub fn build_slice_map(params: &HornParams, steps: usize) -> Vec<f64> {
    let steps = steps.max(1);
    let sampling = &params.sampling;

    if let Some(map) = sampling.slice_map.as_deref().and_then(|map| resample_slice_map(map, steps)) {
        log::debug!("slice map: explicit ({} source values)", sampling.slice_map.as_ref().map_or(0, Vec::len));
        return map;
    }
    if let Some(map) = graded_slices(sampling, steps) {
        log::debug!(
            "slice map: graded {} -> {}",
            sampling.throat_resolution,
            sampling.mouth_resolution
        );
        return map;
    }
    if let Some(map) = lead_in_slices(&params.profile, steps) {
        log::debug!("slice map: extension-aware");
        return map;
    }
    uniform_slices(steps)
}

#[must_use]
pub fn uniform_slices(steps: usize) -> Vec<f64> {
    let steps = steps.max(1);
    (0..=steps).map(|i| i as f64 / steps as f64).collect()
}

/// Linearly resamples `map` to `steps + 1` values normalized by its maximum.
///
/// Returns `None` when the map has fewer than two finite values or a
/// non-positive maximum. The result starts at 0, ends at 1 and never
/// decreases.
#[must_use]
pub fn resample_slice_map(map: &[f64], steps: usize) -> Option<Vec<f64>> {
    let source: Vec<f64> = map.iter().copied().filter(|v| v.is_finite()).collect();
    if source.len() < 2 {
        return None;
    }
    let max = source.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 {
        return None;
    }

    let last = source.len() - 1;
    let mut out = Vec::with_capacity(steps + 1);
    let mut running = 0.0_f64;
    for i in 0..=steps {
        // Exact integer positions when the source already has steps + 1 values.
        let u = (i * last) as f64 / steps as f64;
        let lo = (u.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        let frac = u - lo as f64;
        let value = (source[lo] + (source[hi] - source[lo]) * frac) / max;
        running = running.max(value.clamp(0.0, 1.0));
        out.push(running);
    }
    out[0] = 0.0;
    out[steps] = 1.0;
    Some(out)
}

/// Geometric grading between throat and mouth resolutions.
///
/// `t_i = (r_t (r_m / r_t)^(i / steps) - r_t) / (r_m - r_t)`
fn graded_slices(sampling: &SamplingParams, steps: usize) -> Option<Vec<f64>> {
    let throat = sampling.throat_resolution;
    let mouth = sampling.mouth_resolution;
    if !(throat > 0.0 && mouth > 0.0) || (mouth - throat).abs() <= 1e-9 * throat.max(mouth) {
        return None;
    }
    let ratio = mouth / throat;
    let mut out: Vec<f64> = (0..=steps)
        .map(|i| {
            let x = i as f64 / steps as f64;
            ((throat * ratio.powf(x) - throat) / (mouth - throat)).clamp(0.0, 1.0)
        })
        .collect();
    out[0] = 0.0;
    out[steps] = 1.0;
    Some(out)
}

/// Gives a fixed share of the steps to the OSSE extension and slot.
fn lead_in_slices(profile: &ProfileParams, steps: usize) -> Option<Vec<f64>> {
    let ProfileParams::Osse(osse) = profile else {
        return None;
    };
    let lead_in = osse.lead_in_length();
    let total = lead_in + osse.length.eval(0.0);
    if lead_in <= 0.0 || !(total > lead_in) || steps < 2 {
        return None;
    }

    let boundary = lead_in / total;
    let lead_steps = ((steps as f64 * LEAD_IN_STEP_FRACTION).round() as usize).clamp(1, steps - 1);
    let body_steps = steps - lead_steps;

    let mut out = Vec::with_capacity(steps + 1);
    out.extend((0..lead_steps).map(|i| boundary * i as f64 / lead_steps as f64));
    out.extend((0..=body_steps).map(|i| boundary + (1.0 - boundary) * i as f64 / body_steps as f64));
    out[steps] = 1.0;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_monotone(map: &[f64]) {
        assert_eq!(map.first().copied(), Some(0.0));
        assert_eq!(map.last().copied(), Some(1.0));
        assert!(map.windows(2).all(|w| w[1] >= w[0]), "not monotone: {map:?}");
    }

    #[test]
    fn uniform_has_steps_plus_one_values() {
        let map = uniform_slices(4);
        assert_eq!(map, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn explicit_map_round_trips_at_matching_count() {
        let source = [0.0, 0.05, 0.15, 0.3, 0.5, 0.75, 1.0];
        let map = resample_slice_map(&source, 6).expect("valid map");
        for (a, b) in map.iter().zip(source) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn explicit_map_is_normalized_and_sanitized() {
        let map = resample_slice_map(&[0.0, 4.0, 2.0, f64::NAN, 8.0], 8).expect("valid map");
        assert_eq!(map.len(), 9);
        assert_monotone(&map);
        assert!(resample_slice_map(&[0.0, 0.0], 4).is_none());
        assert!(resample_slice_map(&[1.0], 4).is_none());
    }

    #[test]
    fn graded_map_concentrates_at_fine_end() {
        let sampling = SamplingParams {
            throat_resolution: 1.0,
            mouth_resolution: 8.0,
            ..SamplingParams::default()
        };
        let map = graded_slices(&sampling, 10).expect("graded");
        assert_monotone(&map);
        assert!(map[1] - map[0] < map[10] - map[9]);
    }
}
