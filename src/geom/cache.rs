//! Per-azimuth memoization for profile evaluation.
//!
//! Every ring of a build evaluates the profile at the same azimuths, so
//! azimuth-only quantities that are expensive to derive are computed once per
//! azimuth and reused for every slice:
//!
//! - the coverage angle solved against a guiding curve (a bisection search)
//! - the R-OSSE axial length solved from the target mouth radius
//!
//! The cache is an explicit object owned by the build context, never global
//! state, and is cleared at the start of each build because the cached values
//! depend on the parameter record.
//!
//! # Example
//! ```ignore
//! let mut cache = ProfileCache::default();
//! let a = cache.get_or_insert_coverage(p, || solve_coverage_angle(p));
//! assert_eq!(cache.stats().coverage_entries, 1);
//! ```

use std::collections::HashMap;

/// Azimuth key: the bit pattern of the angle in radians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct AzimuthKey(u64);

impl AzimuthKey {
    fn new(p: f64) -> Self {
        // Normalize -0.0 so both zeros share an entry.
        let p = if p == 0.0 { 0.0 } else { p };
        Self(p.to_bits())
    }
}

/// Cache statistics for diagnostics and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileCacheStats {
    pub coverage_entries: usize,
    pub rosse_length_entries: usize,
    pub hits: usize,
    pub misses: usize,
}

impl ProfileCacheStats {
    #[must_use]
    pub const fn total_entries(&self) -> usize {
        self.coverage_entries + self.rosse_length_entries
    }

    /// Cache hit rate between 0.0 and 1.0; 0.0 before any access.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ProfileCache {
    coverage: HashMap<AzimuthKey, f64>,
    rosse_length: HashMap<AzimuthKey, f64>,
    hits: usize,
    misses: usize,
}

impl ProfileCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stats(&self) -> ProfileCacheStats {
        ProfileCacheStats {
            coverage_entries: self.coverage.len(),
            rosse_length_entries: self.rosse_length.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    /// Clears all cached values and resets the counters.
    pub fn clear(&mut self) {
        self.coverage.clear();
        self.rosse_length.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Coverage angle (degrees) at azimuth `p`, computing it with `make` on a miss.
    pub fn get_or_insert_coverage(&mut self, p: f64, make: impl FnOnce() -> f64) -> f64 {
        Self::lookup(&mut self.coverage, &mut self.hits, &mut self.misses, p, make)
    }

    /// R-OSSE axial length at azimuth `p`, computing it with `make` on a miss.
    pub fn get_or_insert_rosse_length(&mut self, p: f64, make: impl FnOnce() -> f64) -> f64 {
        Self::lookup(&mut self.rosse_length, &mut self.hits, &mut self.misses, p, make)
    }

    fn lookup(
        map: &mut HashMap<AzimuthKey, f64>,
        hits: &mut usize,
        misses: &mut usize,
        p: f64,
        make: impl FnOnce() -> f64,
    ) -> f64 {
        let key = AzimuthKey::new(p);
        if let Some(&value) = map.get(&key) {
            *hits += 1;
            return value;
        }
        *misses += 1;
        let value = make();
        map.insert(key, value);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lookup_hits() {
        let mut cache = ProfileCache::new();
        let mut calls = 0;
        let a = cache.get_or_insert_coverage(0.5, || {
            calls += 1;
            42.0
        });
        let b = cache.get_or_insert_coverage(0.5, || unreachable!("cached"));
        assert_eq!(a, b);
        assert_eq!(calls, 1);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn signed_zero_shares_entry() {
        let mut cache = ProfileCache::new();
        cache.get_or_insert_rosse_length(0.0, || 1.0);
        assert_eq!(cache.get_or_insert_rosse_length(-0.0, || 2.0), 1.0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut cache = ProfileCache::new();
        cache.get_or_insert_coverage(1.0, || 1.0);
        cache.clear();
        assert_eq!(cache.stats(), ProfileCacheStats::default());
    }
}
