//! # terrapos
//!
//! Geodetic station coordinates in a terrestrial reference frame at an
//! arbitrary epoch, computed from:
//!
//! - an **SSC** catalog — fixed-width reference-epoch coordinates and linear
//!   velocities per station, with optional validity intervals;
//! - an optional **PSD** catalog — per-station, per-component parametric
//!   post-seismic deformation models.
//!
//! The pipeline is: read the SSC header to learn the frame and reference
//! epoch, extrapolate the wanted stations linearly to the target epoch,
//! accumulate post-seismic corrections in the local East/North/Up frame,
//! rotate them into the geocentric frame and add them, and finally merge
//! code-matched and DOMES-matched result sets into one unique-by-station
//! list. Stations can be looked up by 4-character code or by 9-character
//! DOMES number; the mode is always an explicit [`KeyMatch`] argument.
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use camino::Utf8Path;
//! use terrapos::{
//!     apply_psd_corrections, compute_psd, read_ssc_header, ssc_extrapolate, CivilEpoch,
//!     KeyMatch, StationKey,
//! };
//!
//! let mut ssc = BufReader::new(File::open("ITRF2014_GNSS.SSC.txt")?);
//! let (frame, ref_year) = read_ssc_header(&mut ssc)?;
//! let t0 = CivilEpoch::try_from_fractional_year(ref_year)?;
//! let t = CivilEpoch::new(2017, 143, 0);
//!
//! let wanted = [StationKey::from_code("REUN"), StationKey::from_code("ANKR")];
//! let mut coords = ssc_extrapolate(&mut ssc, &wanted, &t, &t0, KeyMatch::ByCode)?;
//!
//! let psd = compute_psd(Utf8Path::new("ITRF2014-psd-gnss.dat"), &wanted, &t, KeyMatch::ByCode)?;
//! apply_psd_corrections(&mut coords, &psd, KeyMatch::ByCode);
//!
//! for c in &coords {
//!     println!("{} {:15.5} {:15.5} {:15.5} {}", c.key, c.position.x, c.position.y,
//!         c.position.z, t.format_ymd_hms());
//! }
//! # Ok::<(), terrapos::TerraposError>(())
//! ```

pub mod catalogs;
pub mod constants;
pub mod deformation;
pub mod epoch;
pub mod geodesy;
pub mod stations;
pub mod terrapos_errors;

pub use catalogs::psd_reader::{accumulate_psd, compute_psd, read_next_record_psd, PsdRecord};
pub use catalogs::ssc_reader::{read_next_record, read_ssc_header, ssc_extrapolate, SscRecord};
pub use deformation::{ComponentPsd, PsdModel};
pub use epoch::{CivilEpoch, ValidityWindow};
pub use stations::{
    apply_psd_corrections, merge_sort_unique, KeyMatch, StationCoordinate, StationKey,
};
pub use terrapos_errors::TerraposError;
