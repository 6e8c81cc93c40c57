//! # Constants and type definitions for terrapos
//!
//! This module centralizes the **ellipsoid parameters**, **conversion factors**, and
//! **common type definitions** used throughout the `terrapos` library.
//!
//! ## Overview
//!
//! - Reference ellipsoid parameters (GRS1980/WGS84)
//! - Calendar conversion factors (Julian years, seconds per day)
//! - Core unit aliases used across the crate
//!
//! These definitions are used by the catalog readers, the epoch model and the
//! geodetic conversion routines.

// -------------------------------------------------------------------------------------------------
// Ellipsoid parameters and conversion factors
// -------------------------------------------------------------------------------------------------

/// Earth equatorial radius in meters (GRS1980/WGS84)
pub const EARTH_MAJOR_AXIS: f64 = 6_378_137.0;

/// Flattening of the reference ellipsoid (GRS1980/WGS84)
pub const EARTH_FLATTENING: f64 = 0.003_352_810_681_183_637_418;

/// Number of days in a Julian year
pub const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of milliseconds in a second
pub const MILLISECONDS_PER_SECOND: i64 = 1_000;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Distance in meters
pub type Meter = f64;
/// Distance in millimeters
pub type Millimeter = f64;
/// Velocity in meters per Julian year
pub type MeterPerYear = f64;
/// Angle in radians
pub type Radian = f64;

/// Modified Julian Date (days)
pub type MJD = f64;

/// Signed time interval in fractional Julian years
pub type FractionalYears = f64;
