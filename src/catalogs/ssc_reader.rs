//! # SSC catalog reader
//!
//! Utilities to parse **SSC** coordinate/velocity catalogs and extrapolate
//! station coordinates to an arbitrary target epoch.
//!
//! ## Overview
//! -----------------
//! This module provides:
//! - A small error type [`ParseSscError`] describing SSC parsing failures.
//! - [`read_ssc_header`] — header line validation, returning the reference
//!   frame name and reference epoch and positioning the stream at the first
//!   data record.
//! - [`read_next_record`] — the sequential two-line-per-station record
//!   reader, producing [`SscRecord`] values.
//! - [`ssc_extrapolate`] — the linear extrapolation pass over a wanted
//!   station list.
//!
//! ## File layout
//! -----------------
//! Line 1 of a record anchors the DOMES number at `[0, 10)` and the station
//! code at `[32, 37)`; from offset 36 onward the position and its sigmas are
//! free-width numeric tokens decoded with a consumed-width cursor. An
//! optional validity interval follows, located by its `:` markers
//! (`YY:DDD:SSSSS YY:DDD:SSSSS`); an all-zero half leaves the corresponding
//! window side open. Line 2 repeats the DOMES number in its first 9
//! characters (cross-checked) and carries the velocity and its sigmas, again
//! from offset 36.
//!
//! ## Error handling
//! -----------------
//! Parser failures are wrapped into
//! [`TerraposError::MalformedSscRecord`] with a [`ParseSscError`] payload
//! carrying the offending text. Cross-field inconsistencies (the DOMES
//! continuity check) surface the same way rather than aborting the process:
//! the caller decides whether to stop the whole read.

use std::io::{BufRead, Seek, SeekFrom};

use nalgebra::Vector3;
use thiserror::Error;

use crate::catalogs::{digit_run, next_line, FieldCursor};
use crate::constants::{Meter, MeterPerYear};
use crate::epoch::{expand_two_digit_year, CivilEpoch, ValidityWindow};
use crate::stations::{KeyMatch, StationCoordinate, StationKey};
use crate::terrapos_errors::TerraposError;

/// Literal sentinel between the frame name and the reference epoch.
const HEADER_MIDDLE: &str = "STATION POSITIONS AT EPOCH";
/// Literal sentinel after the reference epoch.
const HEADER_TAIL: &str = "AND VELOCITIES";
/// Number of discarded header lines after the first.
const HEADER_FILLER_LINES: usize = 6;
/// Offset at which the free-width numeric fields of both record lines start.
const NUMERIC_OFFSET: usize = 36;

/// Line-level parsing errors for SSC records.
///
/// Variants
/// -----------------
/// * `TooShortLine` – A record line ends before the fields it must carry.
/// * `InvalidNumber` – A numeric field failed to parse; payload carries the
///   offending token.
/// * `InvalidValidityDate` – A `YY:DDD:SSSSS` validity timestamp could not be
///   resolved; payload carries the offending slice.
/// * `DomesMismatch` – Line 2 of a record does not repeat line 1's DOMES
///   number.
/// * `UnexpectedEof` – The stream ended between the two lines of a record.
#[derive(Error, Debug, PartialEq)]
pub enum ParseSscError {
    #[error("the line is too short")]
    TooShortLine,
    #[error("error parsing numeric field: {0}")]
    InvalidNumber(String),
    #[error("invalid validity timestamp: {0}")]
    InvalidValidityDate(String),
    #[error("velocity line DOMES '{found}' does not match '{expected}'")]
    DomesMismatch { expected: String, found: String },
    #[error("stream ended inside a two-line record")]
    UnexpectedEof,
}

/// One station entry of an SSC catalog: identity, validity window,
/// reference-epoch position and velocity, and their sigmas.
///
/// Sigmas take no part in the extrapolation; they are carried for
/// completeness.
#[derive(Debug, Clone, PartialEq)]
pub struct SscRecord {
    pub key: StationKey,
    pub window: ValidityWindow,
    /// Position at the reference epoch, in meters.
    pub position: Vector3<Meter>,
    /// Velocity, in meters per Julian year.
    pub velocity: Vector3<MeterPerYear>,
    /// Position sigmas, in meters.
    pub position_sigma: Vector3<Meter>,
    /// Velocity sigmas, in meters per Julian year.
    pub velocity_sigma: Vector3<MeterPerYear>,
}

fn numeric_error(token: &str) -> TerraposError {
    if token.is_empty() {
        TerraposError::MalformedSscRecord(ParseSscError::TooShortLine)
    } else {
        TerraposError::MalformedSscRecord(ParseSscError::InvalidNumber(token.to_string()))
    }
}

fn validity_error(line: &str, at: usize) -> TerraposError {
    let slice = line.get(at.saturating_sub(2)..(at + 12).min(line.len())).unwrap_or(line);
    TerraposError::MalformedSscRecord(ParseSscError::InvalidValidityDate(slice.to_string()))
}

/// Resolve one `YY:DDD:SSSSS` timestamp whose `:` sits at byte offset
/// `colon`, returning the epoch (or `None` for the all-zero open-end marker)
/// and the offset one past the seconds digits.
fn parse_validity_timestamp(
    line: &str,
    colon: usize,
) -> Result<(Option<CivilEpoch>, usize), TerraposError> {
    if colon < 2 {
        return Err(validity_error(line, colon));
    }
    let yy: i32 = line
        .get(colon - 2..colon)
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| validity_error(line, colon))?;
    let doy: u32 = line
        .get(colon + 1..colon + 4)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| validity_error(line, colon))?;
    let sec_digits = digit_run(line, colon + 5);
    if sec_digits.is_empty() {
        return Err(validity_error(line, colon));
    }
    let sec: i64 = sec_digits
        .parse()
        .map_err(|_| validity_error(line, colon))?;
    let end = colon + 5 + sec_digits.len();

    // an all-zero timestamp means the interval is open on this side
    if yy == 0 && doy == 0 && sec == 0 {
        return Ok((None, end));
    }
    let epoch = CivilEpoch::from_year_doy_seconds(expand_two_digit_year(yy), doy, sec);
    Ok((Some(epoch), end))
}

/// Read the header of an SSC catalog.
///
/// Rewinds the stream to its beginning, reads the first line, extracts the
/// reference frame name (first whitespace-delimited token), verifies the
/// literal sentinels `STATION POSITIONS AT EPOCH` and `AND VELOCITIES` in
/// their expected relative positions, parses the epoch token between them,
/// and finally consumes the 6 filler header lines so the stream is positioned
/// at the first data record.
///
/// Arguments
/// -----------------
/// * `stream`: An open SSC catalog stream. May be at any position; the
///   function seeks back to the start first, so it can be called repeatedly.
///
/// Return
/// ----------
/// * `(frame_name, reference_epoch)` with the epoch as a fractional year, or
///   [`TerraposError::InvalidSscHeader`] when any structural check fails.
pub fn read_ssc_header<R: BufRead + Seek>(
    stream: &mut R,
) -> Result<(String, f64), TerraposError> {
    stream.seek(SeekFrom::Start(0))?;

    let invalid = |line: &str| TerraposError::InvalidSscHeader(line.to_string());

    let line = next_line(stream)?.ok_or_else(|| invalid(""))?;

    let rest = line.trim_start();
    let (frame, rest) = rest.split_once(' ').ok_or_else(|| invalid(&line))?;
    if frame.is_empty() {
        return Err(invalid(&line));
    }

    let rest = rest
        .strip_prefix(HEADER_MIDDLE)
        .ok_or_else(|| invalid(&line))?;

    let rest = rest.trim_start();
    let (epoch_token, rest) = rest.split_once(' ').ok_or_else(|| invalid(&line))?;
    let reference_epoch: f64 = epoch_token.parse().map_err(|_| invalid(&line))?;

    if !rest.trim_start().starts_with(HEADER_TAIL) {
        return Err(invalid(&line));
    }

    for _ in 0..HEADER_FILLER_LINES {
        if next_line(stream)?.is_none() {
            break;
        }
    }

    Ok((frame.to_string(), reference_epoch))
}

/// Read the next two-line station record off an SSC catalog.
///
/// The stream must be positioned at the first line of a record (i.e. after
/// [`read_ssc_header`] or a previous record). `Ok(None)` signals clean end of
/// data; a stream ending *inside* a record is a malformed record, not end of
/// data.
///
/// Arguments
/// -----------------
/// * `stream`: The SSC catalog stream.
///
/// Return
/// ----------
/// * The next [`SscRecord`], `None` at end of data, or
///   [`TerraposError::MalformedSscRecord`] when a field fails to parse or
///   the velocity line does not repeat the record's DOMES number.
pub fn read_next_record<R: BufRead>(
    stream: &mut R,
) -> Result<Option<SscRecord>, TerraposError> {
    // first line: identity, position, sigmas, optional validity interval
    let Some(line) = next_line(stream)? else {
        return Ok(None);
    };
    if line.len() < NUMERIC_OFFSET + 1 {
        return Err(TerraposError::MalformedSscRecord(ParseSscError::TooShortLine));
    }

    // get() also rejects slices ending inside a multi-byte character
    let too_short = || TerraposError::MalformedSscRecord(ParseSscError::TooShortLine);
    let domes = line.get(0..10).ok_or_else(too_short)?.trim().to_string();
    let code = line.get(32..37).ok_or_else(too_short)?;
    let key = StationKey::new(code, &domes);

    let mut cursor = FieldCursor::new(&line, NUMERIC_OFFSET);
    let x = cursor.next_f64().map_err(numeric_error)?;
    let y = cursor.next_f64().map_err(numeric_error)?;
    let z = cursor.next_f64().map_err(numeric_error)?;
    let sx = cursor.next_f64().map_err(numeric_error)?;
    let sy = cursor.next_f64().map_err(numeric_error)?;
    let sz = cursor.next_f64().map_err(numeric_error)?;

    let mut window = ValidityWindow::OPEN;
    if let Some(colon) = cursor.find(':') {
        let (from, after) = parse_validity_timestamp(&line, colon)?;
        if let Some(from) = from {
            window.from = from.to_mjd();
        }
        cursor.seek(after);
        let colon = cursor.find(':').ok_or_else(|| validity_error(&line, after))?;
        let (to, _) = parse_validity_timestamp(&line, colon)?;
        if let Some(to) = to {
            window.to = to.to_mjd();
        }
    }

    // second line: velocity and its sigmas, anchored by the same DOMES number
    let Some(line) = next_line(stream)? else {
        return Err(TerraposError::MalformedSscRecord(ParseSscError::UnexpectedEof));
    };
    if line.len() < 9 {
        return Err(TerraposError::MalformedSscRecord(ParseSscError::TooShortLine));
    }
    let line2_domes = line
        .get(0..9)
        .ok_or_else(|| TerraposError::MalformedSscRecord(ParseSscError::TooShortLine))?
        .trim();
    if line2_domes != domes {
        return Err(TerraposError::MalformedSscRecord(ParseSscError::DomesMismatch {
            expected: domes,
            found: line2_domes.to_string(),
        }));
    }

    let mut cursor = FieldCursor::new(&line, NUMERIC_OFFSET);
    let vx = cursor.next_f64().map_err(numeric_error)?;
    let vy = cursor.next_f64().map_err(numeric_error)?;
    let vz = cursor.next_f64().map_err(numeric_error)?;
    let svx = cursor.next_f64().map_err(numeric_error)?;
    let svy = cursor.next_f64().map_err(numeric_error)?;
    let svz = cursor.next_f64().map_err(numeric_error)?;

    Ok(Some(SscRecord {
        key,
        window,
        position: Vector3::new(x, y, z),
        velocity: Vector3::new(vx, vy, vz),
        position_sigma: Vector3::new(sx, sy, sz),
        velocity_sigma: Vector3::new(svx, svy, svz),
    }))
}

/// Extrapolate the coordinates of a wanted station list to a target epoch.
///
/// Scans records sequentially until the stream is exhausted or every wanted
/// key has been matched. A record contributes when its key matches a
/// remaining wanted key under `mode` **and** its validity window contains the
/// target epoch; the extrapolated position is then
/// `base + velocity · (t − t0)/365.25` and the key is removed from the wanted
/// set, so each station is reported at most once. Wanted stations absent from
/// the catalog are silently omitted from the result.
///
/// Arguments
/// -----------------
/// * `stream`: An SSC catalog stream positioned at the first data record
///   (call [`read_ssc_header`] first).
/// * `stations`: The wanted station keys.
/// * `target_epoch`: The epoch to extrapolate to.
/// * `reference_epoch`: The catalog's reference epoch (from the header).
/// * `mode`: Whether keys match by station code or by DOMES number.
///
/// Return
/// ----------
/// * The extrapolated coordinates (meters) of every matched station, in
///   catalog order.
pub fn ssc_extrapolate<R: BufRead>(
    stream: &mut R,
    stations: &[StationKey],
    target_epoch: &CivilEpoch,
    reference_epoch: &CivilEpoch,
    mode: KeyMatch,
) -> Result<Vec<StationCoordinate>, TerraposError> {
    let dyr = target_epoch.fractional_years_since(reference_epoch);
    let t_mjd = target_epoch.to_mjd();

    let mut wanted: Vec<StationKey> = stations.to_vec();
    let mut results = Vec::with_capacity(wanted.len());

    while !wanted.is_empty() {
        let Some(record) = read_next_record(stream)? else {
            break;
        };
        if let Some(idx) = wanted.iter().position(|k| record.key.matches(k, mode)) {
            if record.window.contains(t_mjd) {
                wanted.remove(idx);
                let position = record.position + record.velocity * dyr;
                results.push(StationCoordinate::new(record.key, position));
            }
        }
    }

    Ok(results)
}

#[cfg(test)]
mod ssc_reader_test {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const HEADER: &str = "ITRF2014 STATION POSITIONS AT EPOCH 2010.0 AND VELOCITIES\n\
        -----------------------------------------------------------\n\
        DOMES NB. SITE NAME        TECH. ID.\n\
        -----------------------------------------------------------\n\
        \n\
        \n\
        -----------------------------------------------------------\n";

    // Two-line record with an open validity window.
    const REUN: &str = "\
97401M003 LA REUNION       GNSS REUN  3360000.000  4900000.000 -2290000.000 0.001 0.001 0.001  2 00:000:00000 00:000:00000\n\
97401M003                                 0.0120   0.0150  -0.0090  0.0005  0.0005  0.0005\n";

    // Record with an explicit validity window [2003 doy 113, 2004 doy 295 12:00).
    const GRAS: &str = "\
10002M006 GRASSE (OCA)     GNSS GRAS  4581690.900   556114.837  4389360.793 0.001 0.001 0.001  2 03:113:00000 04:295:43200\n\
10002M006                                -0.0131   0.0174   0.0108  0.0005  0.0005  0.0005\n";

    fn catalog(records: &[&str]) -> Cursor<String> {
        let mut text = String::from(HEADER);
        for r in records {
            text.push_str(r);
        }
        Cursor::new(text)
    }

    #[test]
    fn test_read_header() {
        let mut stream = catalog(&[REUN]);
        let (frame, epoch) = read_ssc_header(&mut stream).unwrap();
        assert_eq!(frame, "ITRF2014");
        assert_eq!(epoch, 2010.0);

        // the stream is now positioned at the first data record
        let record = read_next_record(&mut stream).unwrap().unwrap();
        assert_eq!(record.key, StationKey::new("REUN", "97401M003"));

        // and the header can be re-read from anywhere
        let (frame, epoch) = read_ssc_header(&mut stream).unwrap();
        assert_eq!(frame, "ITRF2014");
        assert_eq!(epoch, 2010.0);
    }

    #[test]
    fn test_header_sentinel_violations() {
        for bad in [
            "",
            "ITRF2014",
            "ITRF2014 STATION COORDINATES AT EPOCH 2010.0 AND VELOCITIES",
            "ITRF2014 STATION POSITIONS AT EPOCH 2010.0",
            "ITRF2014 STATION POSITIONS AT EPOCH twenty AND VELOCITIES",
        ] {
            let mut stream = Cursor::new(format!("{bad}\n"));
            assert!(
                matches!(
                    read_ssc_header(&mut stream),
                    Err(TerraposError::InvalidSscHeader(_))
                ),
                "accepted: {bad:?}"
            );
        }
    }

    #[test]
    fn test_read_record_open_window() {
        let mut stream = Cursor::new(REUN);
        let record = read_next_record(&mut stream).unwrap().unwrap();

        assert_eq!(record.key, StationKey::new("REUN", "97401M003"));
        assert_eq!(record.window, ValidityWindow::OPEN);
        assert_eq!(record.position, Vector3::new(3_360_000.0, 4_900_000.0, -2_290_000.0));
        assert_eq!(record.velocity, Vector3::new(0.012, 0.015, -0.009));
        assert_eq!(record.position_sigma, Vector3::new(0.001, 0.001, 0.001));

        // clean end of data after the record
        assert_eq!(read_next_record(&mut stream).unwrap(), None);
    }

    #[test]
    fn test_read_record_explicit_window() {
        let mut stream = Cursor::new(GRAS);
        let record = read_next_record(&mut stream).unwrap().unwrap();

        let from = CivilEpoch::from_year_doy_seconds(2003, 113, 0).to_mjd();
        let to = CivilEpoch::from_year_doy_seconds(2004, 295, 43_200).to_mjd();
        assert_relative_eq!(record.window.from, from, epsilon = 1e-9);
        assert_relative_eq!(record.window.to, to, epsilon = 1e-9);
    }

    #[test]
    fn test_domes_cross_check() {
        let broken = REUN.replace("\n97401M003 ", "\n97401M004 ");
        let mut stream = Cursor::new(broken);
        assert!(matches!(
            read_next_record(&mut stream),
            Err(TerraposError::MalformedSscRecord(
                ParseSscError::DomesMismatch { .. }
            ))
        ));
    }

    #[test]
    fn test_truncated_record_is_not_end_of_data() {
        let first_line_only = REUN.lines().next().unwrap().to_string() + "\n";
        let mut stream = Cursor::new(first_line_only);
        assert_eq!(
            read_next_record(&mut stream),
            Err(TerraposError::MalformedSscRecord(ParseSscError::UnexpectedEof))
        );
    }

    #[test]
    fn test_multibyte_character_in_anchor_field() {
        // 'é' spans bytes 9-10, so the DOMES field ends inside a character
        let accented = REUN.replacen("97401M003 ", "97401M003é", 1);
        let mut stream = Cursor::new(accented);
        assert_eq!(
            read_next_record(&mut stream),
            Err(TerraposError::MalformedSscRecord(ParseSscError::TooShortLine))
        );
    }

    #[test]
    fn test_bad_numeric_field() {
        let broken = REUN.replace("4900000.000", "49x0000.000");
        let mut stream = Cursor::new(broken);
        assert!(matches!(
            read_next_record(&mut stream),
            Err(TerraposError::MalformedSscRecord(
                ParseSscError::InvalidNumber(_)
            ))
        ));
    }

    #[test]
    fn test_extrapolate_linear_model() {
        let mut stream = catalog(&[GRAS, REUN]);
        let (_, ref_year) = read_ssc_header(&mut stream).unwrap();
        let t0 = CivilEpoch::try_from_fractional_year(ref_year).unwrap();
        // 2020-05-29 is day 150 of 2020
        let t = CivilEpoch::new(2020, 150, 0);

        let wanted = [StationKey::from_code("REUN")];
        let coords =
            ssc_extrapolate(&mut stream, &wanted, &t, &t0, KeyMatch::ByCode).unwrap();

        assert_eq!(coords.len(), 1);
        let dyr = t.fractional_years_since(&t0);
        assert_relative_eq!(coords[0].position.x, 3_360_000.0 + 0.012 * dyr, epsilon = 1e-9);
        assert_relative_eq!(coords[0].position.y, 4_900_000.0 + 0.015 * dyr, epsilon = 1e-9);
        assert_relative_eq!(coords[0].position.z, -2_290_000.0 - 0.009 * dyr, epsilon = 1e-9);
        // ≈ 10.4 years of 12 mm/yr eastward drift
        assert_relative_eq!(coords[0].position.x, 3_360_000.12488, epsilon = 1e-4);
    }

    #[test]
    fn test_extrapolate_outside_window_is_omitted() {
        let mut stream = catalog(&[GRAS]);
        read_ssc_header(&mut stream).unwrap();

        let t0 = CivilEpoch::from_year(2010);
        let t = CivilEpoch::new(2020, 150, 0); // after the window closes in 2004

        let wanted = [StationKey::from_code("GRAS")];
        let coords =
            ssc_extrapolate(&mut stream, &wanted, &t, &t0, KeyMatch::ByCode).unwrap();
        assert!(coords.is_empty());
    }

    #[test]
    fn test_extrapolate_by_domes_and_idempotence() {
        let t0 = CivilEpoch::from_year(2010);
        let t = CivilEpoch::new(2017, 143, 0);
        let wanted = [StationKey::from_domes("97401M003")];

        let mut first = Vec::new();
        for _ in 0..2 {
            let mut stream = catalog(&[GRAS, REUN]);
            read_ssc_header(&mut stream).unwrap();
            let coords =
                ssc_extrapolate(&mut stream, &wanted, &t, &t0, KeyMatch::ByDomes).unwrap();
            assert_eq!(coords.len(), 1);
            assert_eq!(coords[0].key, StationKey::new("REUN", "97401M003"));
            if first.is_empty() {
                first = coords;
            } else {
                assert_eq!(coords, first);
            }
        }
    }
}
