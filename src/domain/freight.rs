//! Direct-route freight rate table.
//!
//! Carrier price breaks keyed by desi (volumetric weight). This is static
//! configuration data: a carrier pricing change means replacing the table,
//! not the lookup algorithm.

const TIE_EPSILON: f64 = 1e-9;

/// Desi → freight € for the direct route. Ascending keys, non-uniform step:
/// half-desi granularity up to 10, whole desi above.
const DEFAULT_RATES: &[(f64, f64)] = &[
    (0.5, 13.51),
    (1.0, 13.51),
    (1.5, 13.51),
    (2.0, 13.51),
    (2.5, 16.10),
    (3.0, 16.10),
    (3.5, 16.10),
    (4.0, 16.10),
    (4.5, 16.10),
    (5.0, 28.75),
    (5.5, 28.75),
    (6.0, 28.75),
    (6.5, 28.75),
    (7.0, 28.75),
    (7.5, 28.75),
    (8.0, 28.75),
    (8.5, 28.75),
    (9.0, 28.75),
    (9.5, 28.75),
    (10.0, 28.75),
    (11.0, 58.29),
    (12.0, 60.92),
    (13.0, 63.54),
    (14.0, 66.17),
    (15.0, 68.79),
    (16.0, 71.42),
    (17.0, 74.04),
    (18.0, 76.67),
    (19.0, 79.30),
    (20.0, 81.92),
    (21.0, 84.55),
    (22.0, 87.17),
    (23.0, 89.80),
    (24.0, 92.42),
    (25.0, 95.05),
    (26.0, 97.68),
    (27.0, 100.30),
    (28.0, 102.93),
    (29.0, 105.55),
    (30.0, 108.18),
];

#[derive(Debug, Clone)]
pub struct FreightRateTable {
    entries: Vec<(f64, f64)>,
}

impl Default for FreightRateTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_RATES.to_vec(),
        }
    }
}

impl FreightRateTable {
    /// Builds a table from `(size_key, rate)` pairs, mainly for tests and
    /// alternate carrier contracts.
    pub fn from_entries(entries: Vec<(f64, f64)>) -> Self {
        Self { entries }
    }

    /// Resolves a package size to the nearest table key. Exact midpoints
    /// round to the larger key so freight is never under-quoted. Sizes that
    /// are zero, negative or not finite have no match.
    pub fn nearest_key(&self, package_size: f64) -> Option<f64> {
        if !package_size.is_finite() || package_size <= 0.0 {
            return None;
        }

        let mut best: Option<(f64, f64)> = None;
        for &(key, _) in &self.entries {
            let diff = (key - package_size).abs();
            match best {
                None => best = Some((key, diff)),
                Some((best_key, best_diff)) => {
                    if diff < best_diff - TIE_EPSILON
                        || ((diff - best_diff).abs() <= TIE_EPSILON && key > best_key)
                    {
                        best = Some((key, diff));
                    }
                }
            }
        }
        best.map(|(key, _)| key)
    }

    /// Direct-route freight for a package size, via nearest-key resolution.
    pub fn lookup(&self, package_size: f64) -> Option<f64> {
        let key = self.nearest_key(package_size)?;
        self.entries
            .iter()
            .find(|(k, _)| (k - key).abs() <= TIE_EPSILON)
            .map(|&(_, rate)| rate)
    }
}
