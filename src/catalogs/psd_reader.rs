//! # PSD catalog reader
//!
//! Utilities to parse **post-seismic deformation** catalogs and accumulate
//! the parametric corrections of [`crate::deformation`] for a wanted station
//! list.
//!
//! ## File layout
//! -----------------
//! A station record spans three lines, one per topocentric component in the
//! fixed order East, North, Up. The first line anchors the station code at
//! `[1, 6)`, the DOMES number at `[9, 18)` and the earthquake timestamp
//! (`YY:DDD:SSSSS`) at `[19, 31)`. Every line carries its component tag at
//! column 32 and a model digit at column 34, followed by 0, 2 or 4 free-width
//! numeric parameters from offset 35 depending on the model.
//!
//! Unlike the SSC pass, a matched station is **not** removed from further
//! consideration: one station can carry several earthquake records and their
//! corrections accumulate additively.

use std::fs::File;
use std::io::{BufRead, BufReader};

use camino::Utf8Path;
use thiserror::Error;

use crate::catalogs::{digit_run, next_line, FieldCursor};
use crate::deformation::{ComponentPsd, PsdModel};
use crate::epoch::{expand_two_digit_year, CivilEpoch};
use crate::stations::{KeyMatch, StationCoordinate, StationKey};
use crate::terrapos_errors::TerraposError;

/// Column of the component tag (E/N/U) on every record line.
const COMPONENT_COLUMN: usize = 32;
/// Column of the one-digit model number.
const MODEL_COLUMN: usize = 34;
/// Offset at which the free-width model parameters start.
const PARAMETER_OFFSET: usize = 35;
/// Fixed order of the three component lines of a record.
const COMPONENT_ORDER: [char; 3] = ['E', 'N', 'U'];

/// Line-level parsing errors for PSD records.
///
/// Variants
/// -----------------
/// * `TooShortLine` – A record line ends before the fields it must carry.
/// * `UnexpectedComponent` – The tag at column 32 is not the one expected for
///   this line's position in the E/N/U sequence.
/// * `InvalidModelNumber` – The model digit is not in `[0, 4]`.
/// * `InvalidNumber` – A model parameter failed to parse.
/// * `InvalidEpoch` – The earthquake timestamp could not be resolved.
/// * `UnexpectedEof` – The stream ended inside a three-line record.
#[derive(Error, Debug, PartialEq)]
pub enum ParsePsdError {
    #[error("the line is too short")]
    TooShortLine,
    #[error("expected component '{expected}', found '{found}'")]
    UnexpectedComponent { expected: char, found: char },
    #[error("model number out of range: '{0}'")]
    InvalidModelNumber(char),
    #[error("error parsing model parameter: {0}")]
    InvalidNumber(String),
    #[error("invalid earthquake timestamp: {0}")]
    InvalidEpoch(String),
    #[error("stream ended inside a three-line record")]
    UnexpectedEof,
}

/// One station record of a PSD catalog: identity, earthquake epoch and the
/// parametric model of each topocentric component.
#[derive(Debug, Clone, PartialEq)]
pub struct PsdRecord {
    pub key: StationKey,
    /// Epoch of the earthquake this record describes.
    pub earthquake: CivilEpoch,
    pub east: ComponentPsd,
    pub north: ComponentPsd,
    pub up: ComponentPsd,
}

fn malformed(e: ParsePsdError) -> TerraposError {
    TerraposError::MalformedPsdRecord(e)
}

/// Resolve the component tag, model digit and parameters of one record line.
fn parse_component_line(line: &str, expected: char) -> Result<ComponentPsd, TerraposError> {
    if line.len() < PARAMETER_OFFSET {
        return Err(malformed(ParsePsdError::TooShortLine));
    }

    let found = line.as_bytes()[COMPONENT_COLUMN] as char;
    if found != expected {
        return Err(malformed(ParsePsdError::UnexpectedComponent { expected, found }));
    }

    let digit = line.as_bytes()[MODEL_COLUMN] as char;
    let model = digit
        .to_digit(10)
        .and_then(PsdModel::from_digit)
        .ok_or_else(|| malformed(ParsePsdError::InvalidModelNumber(digit)))?;

    let mut component = ComponentPsd::none();
    component.model = model;

    let mut cursor = FieldCursor::new(line, PARAMETER_OFFSET);
    let mut read_param = || {
        cursor.next_f64().map_err(|token| {
            malformed(if token.is_empty() {
                ParsePsdError::TooShortLine
            } else {
                ParsePsdError::InvalidNumber(token.to_string())
            })
        })
    };

    if model.parameter_count() >= 2 {
        component.a1 = read_param()?;
        component.t1 = read_param()?;
    }
    if model.parameter_count() == 4 {
        component.a2 = read_param()?;
        component.t2 = read_param()?;
    }

    Ok(component)
}

/// Resolve the `YY:DDD:SSSSS` earthquake timestamp anchored at offset 19.
fn parse_earthquake_epoch(line: &str) -> Result<CivilEpoch, TerraposError> {
    let err = || {
        let slice = line.get(19..31).unwrap_or(line);
        malformed(ParsePsdError::InvalidEpoch(slice.to_string()))
    };

    let yy: i32 = line
        .get(19..21)
        .and_then(|s| s.parse().ok())
        .ok_or_else(err)?;
    let doy: u32 = line
        .get(22..25)
        .and_then(|s| s.parse().ok())
        .ok_or_else(err)?;
    let sec_digits = digit_run(line, 26);
    if sec_digits.is_empty() {
        return Err(err());
    }
    let sec: i64 = sec_digits.parse().map_err(|_| err())?;

    Ok(CivilEpoch::from_year_doy_seconds(
        expand_two_digit_year(yy),
        doy,
        sec,
    ))
}

/// Read the next three-line station record off a PSD catalog.
///
/// The stream must be positioned at the East line of a record. `Ok(None)`
/// signals clean end of data; a stream ending after the East or North line is
/// a malformed record.
///
/// Arguments
/// -----------------
/// * `stream`: The PSD catalog stream.
///
/// Return
/// ----------
/// * The next [`PsdRecord`], `None` at end of data, or
///   [`TerraposError::MalformedPsdRecord`] when a component tag is out of
///   order, the model digit is outside `[0, 4]`, or a field fails to parse.
pub fn read_next_record_psd<R: BufRead>(
    stream: &mut R,
) -> Result<Option<PsdRecord>, TerraposError> {
    let Some(line) = next_line(stream)? else {
        return Ok(None);
    };
    if line.len() < PARAMETER_OFFSET {
        return Err(malformed(ParsePsdError::TooShortLine));
    }

    // get() also rejects slices ending inside a multi-byte character
    let too_short = || malformed(ParsePsdError::TooShortLine);
    let key = StationKey::new(
        line.get(1..6).ok_or_else(too_short)?,
        line.get(9..18).ok_or_else(too_short)?,
    );
    let earthquake = parse_earthquake_epoch(&line)?;
    let east = parse_component_line(&line, COMPONENT_ORDER[0])?;

    let mut rest = [ComponentPsd::none(); 2];
    for (slot, expected) in rest.iter_mut().zip(&COMPONENT_ORDER[1..]) {
        let Some(line) = next_line(stream)? else {
            return Err(malformed(ParsePsdError::UnexpectedEof));
        };
        *slot = parse_component_line(&line, *expected)?;
    }

    Ok(Some(PsdRecord {
        key,
        earthquake,
        east,
        north: rest[0],
        up: rest[1],
    }))
}

/// Accumulate post-seismic corrections for a wanted station list over an open
/// PSD catalog stream.
///
/// Every record whose key matches a wanted key under `mode` owns a result
/// entry, created zero-initialized on first touch. When the target epoch is
/// at or after the record's earthquake, the parametric displacement of each
/// component is evaluated at the elapsed fractional years and **added** to
/// the entry's (East, North, Up) accumulator in millimeters — matched keys
/// are never consumed, so several earthquakes for one station sum up. A
/// target epoch before the earthquake contributes nothing (but the zero
/// entry remains).
///
/// Arguments
/// -----------------
/// * `stream`: The PSD catalog stream, positioned at the first record.
/// * `stations`: The wanted station keys.
/// * `target_epoch`: The epoch the corrections are wanted at.
/// * `mode`: Whether keys match by station code or by DOMES number.
///
/// Return
/// ----------
/// * Per-station accumulated (East, North, Up) corrections in millimeters.
pub fn accumulate_psd<R: BufRead>(
    stream: &mut R,
    stations: &[StationKey],
    target_epoch: &CivilEpoch,
    mode: KeyMatch,
) -> Result<Vec<StationCoordinate>, TerraposError> {
    let t_mjd = target_epoch.to_mjd();
    let mut results: Vec<StationCoordinate> = Vec::with_capacity(stations.len());

    while let Some(record) = read_next_record_psd(stream)? {
        if !stations.iter().any(|k| record.key.matches(k, mode)) {
            continue;
        }

        let idx = match results.iter().position(|c| c.key == record.key) {
            Some(idx) => idx,
            None => {
                results.push(StationCoordinate::zero(record.key.clone()));
                results.len() - 1
            }
        };

        if t_mjd >= record.earthquake.to_mjd() {
            let dyr = target_epoch.fractional_years_since(&record.earthquake);
            results[idx].position.x += record.east.displacement(dyr);
            results[idx].position.y += record.north.displacement(dyr);
            results[idx].position.z += record.up.displacement(dyr);
        }
    }

    Ok(results)
}

/// Open a PSD catalog and accumulate corrections for a wanted station list.
///
/// File-opening failures surface as [`TerraposError::IoError`] before any
/// parsing begins; see [`accumulate_psd`] for the accumulation semantics.
///
/// Arguments
/// -----------------
/// * `catalog`: Path of the PSD catalog file.
/// * `stations`: The wanted station keys.
/// * `target_epoch`: The epoch the corrections are wanted at.
/// * `mode`: Whether keys match by station code or by DOMES number.
///
/// Return
/// ----------
/// * Per-station accumulated (East, North, Up) corrections in millimeters.
pub fn compute_psd(
    catalog: &Utf8Path,
    stations: &[StationKey],
    target_epoch: &CivilEpoch,
    mode: KeyMatch,
) -> Result<Vec<StationCoordinate>, TerraposError> {
    let mut stream = BufReader::new(File::open(catalog)?);
    accumulate_psd(&mut stream, stations, target_epoch, mode)
}
