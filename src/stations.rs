//! # Station identity, result coordinates and result-set merging
//!
//! A station carries two identifiers: a 4-character short code (e.g. `REUN`)
//! and a 9-character international DOMES number (e.g. `97401M003`). Catalog
//! lookups can go through either one, and the two lookup modes can resolve to
//! the same physical station; [`merge_sort_unique`] collapses such duplicates.
//!
//! The matching mode is always passed explicitly as a [`KeyMatch`] value,
//! never carried as ambient state.

use itertools::Itertools;
use nalgebra::Vector3;

use crate::constants::Meter;
use crate::geodesy::topocentric_to_cartesian;
use crate::terrapos_errors::TerraposError;

/// How catalog records are matched against caller-supplied station keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    /// Compare the 4-character station codes.
    ByCode,
    /// Compare the 9-character DOMES numbers.
    ByDomes,
}

/// Composite station identifier: short code plus DOMES number.
///
/// Either half may be blank — a search key built from a bare DOMES number has
/// no code, and vice versa. Which half takes part in a comparison is decided
/// by the [`KeyMatch`] mode of the lookup, so a blank half never causes a
/// spurious match in the mode that uses the other half.
///
/// Ordering and `Display` use the composite `CODE DOMESNUMBR` rendering
/// (4 + 1 + 9 characters), the layout the catalogs themselves use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationKey {
    /// 4-character station code, stored trimmed. May be empty.
    pub code: String,
    /// 9-character DOMES number, stored trimmed. May be empty.
    pub domes: String,
}

impl StationKey {
    /// Key from both identifier halves (trailing/leading blanks dropped).
    pub fn new(code: &str, domes: &str) -> Self {
        Self {
            code: code.trim().to_uppercase(),
            domes: domes.trim().to_uppercase(),
        }
    }

    /// Search key from a 4-character station code only.
    pub fn from_code(code: &str) -> Self {
        Self::new(code, "")
    }

    /// Search key from a 9-character DOMES number only.
    pub fn from_domes(domes: &str) -> Self {
        Self::new("", domes)
    }

    /// Whether `self` and `other` designate the same station under the given
    /// matching mode.
    pub fn matches(&self, other: &StationKey, mode: KeyMatch) -> bool {
        match mode {
            KeyMatch::ByCode => self.code == other.code,
            KeyMatch::ByDomes => self.domes == other.domes,
        }
    }
}

impl std::str::FromStr for StationKey {
    type Err = TerraposError;

    /// Parse a station key from user input.
    /// - `"CODE DOMESNUMBR"` → both halves
    /// - a bare 9-character token → DOMES-only key
    /// - any other bare token → code-only key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let Some(first) = tokens.next() else {
            return Err(TerraposError::InvalidStationKey(s.to_string()));
        };
        match tokens.next() {
            Some(second) => {
                if tokens.next().is_some() {
                    return Err(TerraposError::InvalidStationKey(s.to_string()));
                }
                Ok(StationKey::new(first, second))
            }
            None if first.len() == 9 => Ok(StationKey::from_domes(first)),
            None => Ok(StationKey::from_code(first)),
        }
    }
}

impl std::fmt::Display for StationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<4} {:<9}", self.code, self.domes)
    }
}

/// A station coordinate produced by the pipeline.
///
/// The vector is in **meters** (geocentric Cartesian x, y, z) when produced
/// by [`ssc_extrapolate`](crate::catalogs::ssc_reader::ssc_extrapolate) and in
/// **millimeters** (topocentric East, North, Up) when produced by
/// [`compute_psd`](crate::catalogs::psd_reader::compute_psd).
#[derive(Debug, Clone, PartialEq)]
pub struct StationCoordinate {
    pub key: StationKey,
    pub position: Vector3<f64>,
}

impl StationCoordinate {
    pub fn new(key: StationKey, position: Vector3<f64>) -> Self {
        Self { key, position }
    }

    /// A zero-initialized accumulator for the given station.
    pub fn zero(key: StationKey) -> Self {
        Self::new(key, Vector3::zeros())
    }
}

/// Merge two result sets into one sorted list, unique by station key.
///
/// The sets are concatenated, stable-sorted by the composite key and adjacent
/// equal-key entries collapsed keeping the first. When a code lookup and a
/// DOMES lookup both resolved the same physical station, exactly one entry
/// survives; which of the two it is follows from the sort alone and is not
/// otherwise specified.
///
/// Arguments
/// -----------------
/// * `set_a`, `set_b`: The two result sets (typically the code-matched and
///   DOMES-matched results of the same catalog pass).
///
/// Return
/// ----------
/// * A single list sorted by station key, at most one entry per key.
pub fn merge_sort_unique(
    set_a: Vec<StationCoordinate>,
    set_b: Vec<StationCoordinate>,
) -> Vec<StationCoordinate> {
    set_a
        .into_iter()
        .chain(set_b)
        .sorted_by(|a, b| a.key.cmp(&b.key))
        .dedup_by(|a, b| a.key == b.key)
        .collect()
}

/// Fold post-seismic ENU corrections into extrapolated Cartesian coordinates.
///
/// For every base coordinate (meters) with a matching ENU accumulator
/// (millimeters), the correction is rotated from the station's local
/// topocentric frame into the geocentric frame using the station's own
/// geodetic latitude/longitude, converted to meters and added in place.
/// Stations without a correction entry are left untouched.
///
/// Arguments
/// -----------------
/// * `coordinates`: Extrapolated geocentric coordinates, in meters.
/// * `corrections`: Accumulated (East, North, Up) corrections in millimeters,
///   as returned by [`compute_psd`](crate::catalogs::psd_reader::compute_psd).
/// * `mode`: The matching mode the two result sets were looked up with.
pub fn apply_psd_corrections(
    coordinates: &mut [StationCoordinate],
    corrections: &[StationCoordinate],
    mode: KeyMatch,
) {
    for crd in coordinates.iter_mut() {
        if let Some(psd) = corrections.iter().find(|c| c.key.matches(&crd.key, mode)) {
            let delta_mm = topocentric_to_cartesian(&psd.position, &crd.position);
            let delta_m: Vector3<Meter> = delta_mm / 1.0e3;
            crd.position += delta_m;
        }
    }
}

#[cfg(test)]
mod stations_test {
    use super::*;

    fn crd(code: &str, domes: &str, x: f64) -> StationCoordinate {
        StationCoordinate::new(StationKey::new(code, domes), Vector3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_key_matching_modes() {
        let catalog = StationKey::new("REUN", "97401M003");

        assert!(StationKey::from_code("REUN").matches(&catalog, KeyMatch::ByCode));
        assert!(StationKey::from_code("reun").matches(&catalog, KeyMatch::ByCode));
        assert!(!StationKey::from_code("COCO").matches(&catalog, KeyMatch::ByCode));

        assert!(StationKey::from_domes("97401M003").matches(&catalog, KeyMatch::ByDomes));
        assert!(!StationKey::from_domes("92701M005").matches(&catalog, KeyMatch::ByDomes));

        // a bare-DOMES key has a blank code half and never matches by code
        assert!(!StationKey::from_domes("97401M003").matches(&catalog, KeyMatch::ByCode));
    }

    #[test]
    fn test_key_from_str() {
        let composite: StationKey = "NRMD 92701M005".parse().unwrap();
        assert_eq!(composite, StationKey::new("NRMD", "92701M005"));

        // a bare 9-character token is a DOMES number, anything else a code
        let domes: StationKey = "97401M003".parse().unwrap();
        assert_eq!(domes, StationKey::from_domes("97401M003"));
        let code: StationKey = "reun".parse().unwrap();
        assert_eq!(code, StationKey::from_code("REUN"));

        assert!("".parse::<StationKey>().is_err());
        assert!("   ".parse::<StationKey>().is_err());
        assert!("REUN 97401M003 extra".parse::<StationKey>().is_err());
    }

    #[test]
    fn test_key_display_layout() {
        let key = StationKey::new("REUN", "97401M003");
        assert_eq!(key.to_string(), "REUN 97401M003");
    }

    #[test]
    fn test_merge_dedups_by_key_not_value() {
        let a = vec![crd("K1", "", 1.0)];
        let b = vec![crd("K1", "", 2.0)];

        let merged = merge_sort_unique(a, b);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].key, StationKey::from_code("K1"));
    }

    #[test]
    fn test_merge_sorts_and_keeps_distinct_keys() {
        let a = vec![crd("REUN", "97401M003", 1.0), crd("ANKR", "20805M002", 2.0)];
        let b = vec![crd("COCO", "50127M001", 3.0), crd("REUN", "97401M003", 4.0)];

        let merged = merge_sort_unique(a, b);
        let codes: Vec<&str> = merged.iter().map(|c| c.key.code.as_str()).collect();
        assert_eq!(codes, vec!["ANKR", "COCO", "REUN"]);
    }

    #[test]
    fn test_merge_empty_sets() {
        assert!(merge_sort_unique(vec![], vec![]).is_empty());

        let only_a = merge_sort_unique(vec![crd("K1", "", 1.0)], vec![]);
        assert_eq!(only_a.len(), 1);
    }

    #[test]
    fn test_apply_corrections_skips_unmatched() {
        let mut coords = vec![StationCoordinate::new(
            StationKey::new("REUN", "97401M003"),
            Vector3::new(3_360_000.0, 4_900_000.0, -2_290_000.0),
        )];
        let before = coords[0].position;

        apply_psd_corrections(&mut coords, &[], KeyMatch::ByCode);
        assert_eq!(coords[0].position, before);

        let other = vec![StationCoordinate::new(
            StationKey::new("ANKR", "20805M002"),
            Vector3::new(5.0, 5.0, 5.0),
        )];
        apply_psd_corrections(&mut coords, &other, KeyMatch::ByCode);
        assert_eq!(coords[0].position, before);
    }

    #[test]
    fn test_apply_corrections_magnitude() {
        let mut coords = vec![StationCoordinate::new(
            StationKey::new("REUN", "97401M003"),
            Vector3::new(3_360_000.0, 4_900_000.0, -2_290_000.0),
        )];
        let before = coords[0].position;

        let psd = vec![StationCoordinate::new(
            StationKey::new("REUN", "97401M003"),
            Vector3::new(12.0, -3.0, 5.0), // mm of ENU
        )];
        apply_psd_corrections(&mut coords, &psd, KeyMatch::ByCode);

        // rotation preserves the norm; mm scaled down to meters
        let delta = coords[0].position - before;
        let expected = (12.0_f64.powi(2) + 3.0_f64.powi(2) + 5.0_f64.powi(2)).sqrt() / 1.0e3;
        approx::assert_relative_eq!(delta.norm(), expected, epsilon = 1e-9);
    }
}
