//! # Geodetic conversions
//!
//! Post-seismic corrections are stated in a station's local topocentric frame
//! (East, North, Up) while catalog coordinates are geocentric Cartesian. The
//! bridge is the station's own geodetic latitude and longitude, recovered
//! from its Cartesian coordinate on the reference ellipsoid.
//!
//! The Cartesian → geodetic conversion follows the Halley-accelerated method
//! of Fukushima (*Transformation from Cartesian to geodetic coordinates
//! accelerated by Halley's method*, J. Geodesy (2006) 79(12)), a
//! non-iterative scheme accurate to well below the millimeter level for
//! Earth-bound points.

use nalgebra::{Matrix3, Vector3};

use crate::constants::{Meter, Radian, EARTH_FLATTENING, EARTH_MAJOR_AXIS};

/// Convert a geocentric Cartesian coordinate to geodetic latitude, longitude
/// and ellipsoidal height.
///
/// Arguments
/// -----------------
/// * `position`: Geocentric Cartesian coordinate in meters.
///
/// Return
/// ----------
/// * `(latitude, longitude, height)` — latitude and longitude in radians,
///   height above the ellipsoid in meters.
pub fn cartesian_to_geodetic(position: &Vector3<Meter>) -> (Radian, Radian, Meter) {
    let (x, y, z) = (position.x, position.y, position.z);
    let a = EARTH_MAJOR_AXIS;
    let f = EARTH_FLATTENING;

    // Functions of the ellipsoid parameters
    let aeps2 = a * a * 1e-32;
    let e2 = (2.0 - f) * f;
    let e4t = e2 * e2 * 1.5;
    let ep2 = 1.0 - e2;
    let ep = ep2.sqrt();
    let aep = a * ep;

    // Distance from the polar axis, squared
    let p2 = x * x + y * y;

    let lon = if p2 != 0.0 { y.atan2(x) } else { 0.0 };

    let absz = z.abs();

    let (mut lat, height);
    if p2 > aeps2 {
        // Away from the poles: one Halley step on the normalized quartic
        let p = p2.sqrt();
        let s0 = absz / a;
        let pn = p / a;
        let zp = ep * s0;

        // Newton correction factors
        let c0 = ep * pn;
        let c02 = c0 * c0;
        let c03 = c02 * c0;
        let s02 = s0 * s0;
        let s03 = s02 * s0;
        let a02 = c02 + s02;
        let a0 = a02.sqrt();
        let a03 = a02 * a0;
        let d0 = zp * a03 + e2 * s03;
        let f0 = pn * a03 - e2 * c03;

        // Halley correction factor
        let b0 = e4t * s02 * c02 * pn * (a0 - ep);
        let s1 = d0 * f0 - b0 * s0;
        let cp = ep * (f0 * f0 - b0 * c0);

        lat = (s1 / cp).atan();
        let s12 = s1 * s1;
        let cp2 = cp * cp;
        height = (p * cp + absz * s1 - a * (ep2 * s12 + cp2).sqrt()) / (s12 + cp2).sqrt();
    } else {
        // On the polar axis
        lat = std::f64::consts::FRAC_PI_2;
        height = absz - aep;
    }

    if z < 0.0 {
        lat = -lat;
    }
    (lat, lon, height)
}

/// Rotate a topocentric (East, North, Up) vector at a station into the
/// geocentric Cartesian frame.
///
/// The rotation uses the geodetic latitude/longitude computed from the
/// station's own Cartesian coordinate, so the only inputs are the local
/// vector and the station position. Units of the input vector are preserved.
///
/// Arguments
/// -----------------
/// * `enu`: Local (East, North, Up) vector at the station.
/// * `site`: Geocentric Cartesian coordinate of the station in meters.
///
/// Return
/// ----------
/// * The same displacement expressed along the geocentric (x, y, z) axes.
pub fn topocentric_to_cartesian(enu: &Vector3<f64>, site: &Vector3<Meter>) -> Vector3<f64> {
    let (lat, lon, _) = cartesian_to_geodetic(site);

    let (sl, cl) = lon.sin_cos();
    let (sf, cf) = lat.sin_cos();

    let rotation = Matrix3::new(
        -sl, -cl * sf, cl * cf, //
        cl, -sl * sf, sl * cf, //
        0.0, cf, sf,
    );

    rotation * enu
}
