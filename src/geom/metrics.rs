//! Opt-in timing hooks for the horn mesh engine.
//!
//! Timing is only collected when the `mesh_metrics` feature is enabled and the
//! target is not WASM (`std::time::Instant` is unavailable there). Otherwise
//! every call compiles down to running the closure.
//!
//! # Usage
//!
//! ```ignore
//! use waveguide_engine::geom::{HornMetrics, TimingBucket};
//!
//! let mut metrics = HornMetrics::default();
//! metrics.begin();
//! let slices = metrics.time(TimingBucket::SlicePlanning, || build_slice_map(&params, 40));
//! if let Some(report) = metrics.end() {
//!     println!("slice planning: {} ns", report.slice_planning_ns);
//! }
//! ```

/// Phases of a horn build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Axial slice map construction.
    SlicePlanning,
    /// Angle list construction and symmetry reduction.
    AngularSampling,
    /// Profile and morph evaluation for every ring vertex.
    ProfileEvaluation,
    /// Ring-to-ring triangulation and caps.
    RingAssembly,
    /// Enclosure outline, rings and zipper stitch.
    Enclosure,
    /// Post-build quality validation.
    Validation,
}

/// Cumulative nanoseconds spent in each phase.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HornTimingReport {
    pub slice_planning_ns: u64,
    pub angular_sampling_ns: u64,
    pub profile_evaluation_ns: u64,
    pub ring_assembly_ns: u64,
    pub enclosure_ns: u64,
    pub validation_ns: u64,
}

impl HornTimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.slice_planning_ns
            .saturating_add(self.angular_sampling_ns)
            .saturating_add(self.profile_evaluation_ns)
            .saturating_add(self.ring_assembly_ns)
            .saturating_add(self.enclosure_ns)
            .saturating_add(self.validation_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing build phases.
///
/// When the `mesh_metrics` feature is disabled (or on WASM), all methods
/// are no-ops and [`end`](Self::end) returns `None`.
#[derive(Debug, Default)]
pub struct HornMetrics {
    #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
    report: HornTimingReport,
}

impl HornMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
        {
            self.report = HornTimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<HornTimingReport> {
        #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "mesh_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times the execution of `f` and accumulates the elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "mesh_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::SlicePlanning => &mut self.report.slice_planning_ns,
            TimingBucket::AngularSampling => &mut self.report.angular_sampling_ns,
            TimingBucket::ProfileEvaluation => &mut self.report.profile_evaluation_ns,
            TimingBucket::RingAssembly => &mut self.report.ring_assembly_ns,
            TimingBucket::Enclosure => &mut self.report.enclosure_ns,
            TimingBucket::Validation => &mut self.report.validation_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}
