//! # Calendar epochs and validity windows
//!
//! Minimal calendar model for catalog timestamps: a [`CivilEpoch`] is a
//! (year, day-of-year, millisecond-of-day) triple, the unit in which SSC and
//! PSD catalogs state their dates. Arithmetic between two epochs yields a
//! signed interval in **fractional Julian years** (difference in days divided
//! by 365.25), which is the time unit of both the linear velocity model and
//! the parametric post-seismic models.
//!
//! Day-of-year and millisecond ticks are deliberately **not range-checked**:
//! catalog records are taken at face value and out-of-range components simply
//! roll over into the next day/year. Conversions to absolute time go through
//! [`hifitime::Epoch`].
//!
//! Open-ended validity intervals are modeled by [`ValidityWindow`], which uses
//! explicit `±∞` MJD sentinels rather than min/max calendar dates.

use hifitime::{Epoch, Unit};

use crate::constants::{DAYS_PER_JULIAN_YEAR, FractionalYears, MILLISECONDS_PER_SECOND, MJD};

/// Expand a two-digit catalog year into a full year.
///
/// SSC and PSD catalogs encode years on two digits. The pivot is 70:
/// `71..=99` map to the 20th century, `0..=70` to the 21st.
///
/// Arguments
/// -----------------
/// * `yy`: Two-digit year as read from the catalog.
///
/// Return
/// ----------
/// * The expanded four-digit year (`yy > 70 → 1900 + yy`, else `2000 + yy`).
pub fn expand_two_digit_year(yy: i32) -> i32 {
    if yy > 70 {
        1900 + yy
    } else {
        2000 + yy
    }
}

/// A calendar instant as stated by the catalogs: year, day-of-year and
/// millisecond-of-day.
///
/// Components are not validated; a day-of-year of 366 in a non-leap year is
/// one day into the following year. Catalog seconds-of-day fields are stored
/// as millisecond ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CivilEpoch {
    /// Full (four-digit) year.
    pub year: i32,
    /// Day of year, 1-based (January 1st is day 1).
    pub day_of_year: u32,
    /// Milliseconds elapsed since the start of the day.
    pub milliseconds: i64,
}

impl CivilEpoch {
    /// Build an epoch from its raw components. No range checking is applied.
    pub fn new(year: i32, day_of_year: u32, milliseconds: i64) -> Self {
        Self {
            year,
            day_of_year,
            milliseconds,
        }
    }

    /// Build an epoch from a year and a day-of-year, with seconds-of-day as
    /// read from a catalog timestamp field.
    pub fn from_year_doy_seconds(year: i32, day_of_year: u32, seconds: i64) -> Self {
        Self::new(year, day_of_year, seconds * MILLISECONDS_PER_SECOND)
    }

    /// January 1st, 00:00:00 of the given year.
    pub fn from_year(year: i32) -> Self {
        Self::new(year, 1, 0)
    }

    /// Build the reference epoch from the fractional year stated in an SSC
    /// header.
    ///
    /// SSC reference epochs are whole years (e.g. `2010.0`); a genuinely
    /// fractional value means the header was not understood and is rejected.
    ///
    /// Arguments
    /// -----------------
    /// * `fractional_year`: The epoch token parsed from the header line.
    ///
    /// Return
    /// ----------
    /// * January 1st of that year, or
    ///   [`TerraposError::InvalidReferenceEpoch`](crate::terrapos_errors::TerraposError::InvalidReferenceEpoch)
    ///   if the value has a fractional part.
    pub fn try_from_fractional_year(
        fractional_year: f64,
    ) -> Result<Self, crate::terrapos_errors::TerraposError> {
        if fractional_year.fract() != 0.0 {
            return Err(crate::terrapos_errors::TerraposError::InvalidReferenceEpoch(
                fractional_year,
            ));
        }
        Ok(Self::from_year(fractional_year as i32))
    }

    /// Convert to an absolute [`hifitime::Epoch`].
    ///
    /// The epoch is built as January 1st of the year plus the day and
    /// millisecond offsets, which is what keeps unchecked day-of-year values
    /// well-defined (they roll over).
    pub fn to_epoch(&self) -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(self.year, 1, 1)
            + Unit::Day * (self.day_of_year as f64 - 1.0)
            + Unit::Millisecond * self.milliseconds as f64
    }

    /// Modified Julian Date of this instant, in days.
    pub fn to_mjd(&self) -> MJD {
        self.to_epoch().to_mjd_utc_days()
    }

    /// Signed interval from `other` to `self`, in fractional Julian years.
    ///
    /// This is the `dyr` term of the extrapolation and post-seismic models:
    /// `(self − other in days) / 365.25`.
    pub fn fractional_years_since(&self, other: &CivilEpoch) -> FractionalYears {
        (self.to_epoch() - other.to_epoch()).to_unit(Unit::Day) / DAYS_PER_JULIAN_YEAR
    }

    /// Render this instant as `YYYY-MM-DD HH:MM:SS`.
    pub fn format_ymd_hms(&self) -> String {
        let (year, month, day, hour, minute, second, _) = self.to_epoch().to_gregorian_utc();
        format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")
    }
}

/// Validity interval of an SSC record, as a half-open MJD range `[from, to)`.
///
/// Records without an interval (or with an all-zero timestamp for one half)
/// are open on that side; open ends carry explicit infinity sentinels so that
/// containment is a plain comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidityWindow {
    /// Lower bound (inclusive), `-∞` when open.
    pub from: MJD,
    /// Upper bound (exclusive), `+∞` when open.
    pub to: MJD,
}

impl ValidityWindow {
    /// The unbounded window `(-∞, +∞)`.
    pub const OPEN: ValidityWindow = ValidityWindow {
        from: f64::NEG_INFINITY,
        to: f64::INFINITY,
    };

    /// Whether `t` falls inside the window (`from ≤ t < to`).
    pub fn contains(&self, t: MJD) -> bool {
        t >= self.from && t < self.to
    }
}

impl Default for ValidityWindow {
    fn default() -> Self {
        Self::OPEN
    }
}
