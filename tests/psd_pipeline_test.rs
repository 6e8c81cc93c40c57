use std::fs::File;
use std::io::BufReader;

use approx::assert_relative_eq;
use camino::Utf8Path;
use terrapos::{
    apply_psd_corrections, compute_psd, read_ssc_header, ssc_extrapolate, CivilEpoch, KeyMatch,
    StationKey,
};

const SSC_FILE: &str = "tests/data/ITRF2014_GNSS.SSC.txt";
const PSD_FILE: &str = "tests/data/ITRF2014-psd-gnss.dat";

#[test]
fn test_compute_psd_accumulates_both_earthquakes() {
    let t = CivilEpoch::new(2017, 143, 0); // 2017-05-23
    let wanted = [StationKey::from_code("ANTC"), StationKey::from_code("REUN")];

    let psd = compute_psd(Utf8Path::new(PSD_FILE), &wanted, &t, KeyMatch::ByCode).unwrap();

    // ANTC has two earthquake records; REUN has none and gets no entry
    assert_eq!(psd.len(), 1);
    assert_eq!(psd[0].key, StationKey::new("ANTC", "41713S001"));

    // mm of East/North/Up, the 2010 and 2015 events summed
    assert_relative_eq!(psd[0].position.x, -585.181184, epsilon = 1e-3);
    assert_relative_eq!(psd[0].position.y, 117.293878, epsilon = 1e-3);
    assert_relative_eq!(psd[0].position.z, 165.465427, epsilon = 1e-3);
}

#[test]
fn test_compute_psd_before_earthquake_is_zero_entry() {
    let t = CivilEpoch::new(2009, 1, 0);
    let wanted = [StationKey::from_domes("41713S001")];

    let psd = compute_psd(Utf8Path::new(PSD_FILE), &wanted, &t, KeyMatch::ByDomes).unwrap();

    assert_eq!(psd.len(), 1);
    assert_eq!(psd[0].position, nalgebra::Vector3::zeros());
}

#[test]
fn test_full_pipeline_ssc_plus_psd() {
    let mut ssc = BufReader::new(File::open(SSC_FILE).unwrap());
    let (_, ref_year) = read_ssc_header(&mut ssc).unwrap();
    let t0 = CivilEpoch::try_from_fractional_year(ref_year).unwrap();
    let t = CivilEpoch::new(2017, 143, 0);

    let wanted = [StationKey::from_code("ANTC"), StationKey::from_code("REUN")];
    let mut coords = ssc_extrapolate(&mut ssc, &wanted, &t, &t0, KeyMatch::ByCode).unwrap();
    assert_eq!(coords.len(), 2);

    let linear_antc = coords[0].position;
    let linear_reun = coords[1].position;

    let psd = compute_psd(Utf8Path::new(PSD_FILE), &wanted, &t, KeyMatch::ByCode).unwrap();
    apply_psd_corrections(&mut coords, &psd, KeyMatch::ByCode);

    // ANTC moves by the rotated correction, about 63 cm here
    let delta = coords[0].position - linear_antc;
    assert_relative_eq!(delta.norm(), psd[0].position.norm() / 1.0e3, epsilon = 1e-9);
    assert_relative_eq!(coords[0].position.x, 1_608_539.288825, epsilon = 1e-5);
    assert_relative_eq!(coords[0].position.y, -4_816_370.315806, epsilon = 1e-5);
    assert_relative_eq!(coords[0].position.z, -3_847_798.471730, epsilon = 1e-5);

    // REUN has no post-seismic record and keeps its linear position
    assert_eq!(coords[1].position, linear_reun);
}
