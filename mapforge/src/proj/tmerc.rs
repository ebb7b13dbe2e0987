//! Transverse Mercator, Krüger n-series (Karney 2011, 6th order).
//!
//! This is the projection underlying UTM and the map's default working CRS
//! (a transverse Mercator centred on the frame). The series is accurate to
//! well below a millimetre within a few degrees of the central meridian,
//! which covers any printable map frame.

use super::ellipsoid::{Ellipsoid, WGS84};
use super::ProjError;

/// A configured transverse Mercator projection with its series
/// coefficients precomputed. Latitude of origin is the equator.
#[derive(Clone, Debug)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    central_meridian: f64,
    scale_factor: f64,
    false_easting: f64,
    false_northing: f64,
    /// Rectifying radius: a/(1+n) · (1 + n²/4 + n⁴/64).
    rectifying_radius: f64,
    forward_series: [f64; 6],
    inverse_series: [f64; 6],
}

impl TransverseMercator {
    /// `central_meridian` in degrees.
    pub fn new(
        central_meridian: f64,
        scale_factor: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let ellipsoid = WGS84;
        let n = ellipsoid.n;
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        Self {
            ellipsoid,
            central_meridian: central_meridian.to_radians(),
            scale_factor,
            false_easting,
            false_northing,
            rectifying_radius: ellipsoid.semi_major / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
            forward_series: [
                n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4
                    - 127.0 / 288.0 * n5
                    + 7891.0 / 37800.0 * n6,
                13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5
                    - 1983433.0 / 1935360.0 * n6,
                61.0 / 240.0 * n3 - 103.0 / 140.0 * n4
                    + 15061.0 / 26880.0 * n5
                    + 167603.0 / 181440.0 * n6,
                49561.0 / 161280.0 * n4 - 179.0 / 168.0 * n5 + 6601661.0 / 7257600.0 * n6,
                34729.0 / 80640.0 * n5 - 3418889.0 / 1995840.0 * n6,
                212378941.0 / 319334400.0 * n6,
            ],
            inverse_series: [
                n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4
                    - 81.0 / 512.0 * n5
                    + 96199.0 / 604800.0 * n6,
                1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5
                    - 1118711.0 / 3870720.0 * n6,
                17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5
                    + 5569.0 / 90720.0 * n6,
                4397.0 / 161280.0 * n4 - 11.0 / 504.0 * n5 - 830251.0 / 7257600.0 * n6,
                4583.0 / 161280.0 * n5 - 108847.0 / 3991680.0 * n6,
                20648693.0 / 638668800.0 * n6,
            ],
        }
    }

    /// Geodetic tangent → conformal tangent.
    fn conformal_tangent(&self, tau: f64) -> f64 {
        let e = self.ellipsoid.eccentricity();
        let sec = (1.0 + tau * tau).sqrt();
        let sigma = (e * (e * tau / sec).atanh()).sinh();
        tau * (1.0 + sigma * sigma).sqrt() - sigma * sec
    }

    /// Conformal tangent → geodetic tangent, by Newton iteration.
    fn geodetic_tangent(&self, tau_prime: f64) -> f64 {
        let e = self.ellipsoid.eccentricity();
        let e2 = self.ellipsoid.e2;
        let mut tau = tau_prime;
        for _ in 0..15 {
            let sec = (1.0 + tau * tau).sqrt();
            let sigma = (e * (e * tau / sec).atanh()).sinh();
            let estimate = tau * (1.0 + sigma * sigma).sqrt() - sigma * sec;
            let step = (tau_prime - estimate) * (1.0 + (1.0 - e2) * tau * tau)
                / ((1.0 - e2) * sec * (1.0 + estimate * estimate).sqrt());
            tau += step;
            if step.abs() < 1e-12 * (1.0 + tau.abs()) {
                break;
            }
        }
        tau
    }

    /// (longitude, latitude) in degrees → (easting, northing) in metres.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Result<(f64, f64), ProjError> {
        if !(-90.0..=90.0).contains(&lat_deg) {
            return Err(ProjError::LatitudeOutOfRange(lat_deg));
        }
        let dlam = lon_deg.to_radians() - self.central_meridian;
        let tau_prime = self.conformal_tangent(lat_deg.to_radians().tan());

        let xi_prime = tau_prime.atan2(dlam.cos());
        let eta_prime =
            (dlam.sin() / (tau_prime * tau_prime + dlam.cos() * dlam.cos()).sqrt()).asinh();

        let mut xi = xi_prime;
        let mut eta = eta_prime;
        for (j, &a) in self.forward_series.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_prime).sin() * (k * eta_prime).cosh();
            eta += a * (k * xi_prime).cos() * (k * eta_prime).sinh();
        }

        Ok((
            self.scale_factor * self.rectifying_radius * eta + self.false_easting,
            self.scale_factor * self.rectifying_radius * xi + self.false_northing,
        ))
    }

    /// (easting, northing) in metres → (longitude, latitude) in degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> Result<(f64, f64), ProjError> {
        let scaled = self.scale_factor * self.rectifying_radius;
        let eta = (easting - self.false_easting) / scaled;
        let xi = (northing - self.false_northing) / scaled;

        let mut xi_prime = xi;
        let mut eta_prime = eta;
        for (j, &b) in self.inverse_series.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_prime -= b * (k * xi).sin() * (k * eta).cosh();
            eta_prime -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let sinh_eta = eta_prime.sinh();
        let cos_xi = xi_prime.cos();
        let tau_prime = xi_prime.sin() / (sinh_eta * sinh_eta + cos_xi * cos_xi).sqrt();
        let tau = self.geodetic_tangent(tau_prime);

        Ok((
            (self.central_meridian + sinh_eta.atan2(cos_xi)).to_degrees(),
            tau.atan().to_degrees(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_central_meridian_maps_to_false_easting() {
        let tm = TransverseMercator::new(151.0, 1.0, 500_000.0, 10_000_000.0);
        let (e, _) = tm.forward(151.0, -33.5).unwrap();
        assert_relative_eq!(e, 500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_roundtrip_near_meridian() {
        let tm = TransverseMercator::new(151.0, 1.0, 500_000.0, 10_000_000.0);
        for &(lon, lat) in &[
            (151.0, -33.5),
            (150.2, -34.1),
            (152.9, -32.0),
            (151.5, 0.0),
            (149.0, -37.5),
        ] {
            let (e, n) = tm.forward(lon, lat).unwrap();
            let (lon2, lat2) = tm.inverse(e, n).unwrap();
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_utm_zone_56_sydney() {
        // Sydney sits roughly 166 km west of the zone 56 central meridian.
        let tm = TransverseMercator::new(153.0, 0.9996, 500_000.0, 10_000_000.0);
        let (e, n) = tm.forward(151.208, -33.8705).unwrap();
        assert!(e > 330_000.0 && e < 340_000.0, "easting = {e}");
        assert!(n > 6_245_000.0 && n < 6_255_000.0, "northing = {n}");
        let (lon, lat) = tm.inverse(e, n).unwrap();
        assert_relative_eq!(lon, 151.208, epsilon = 1e-9);
        assert_relative_eq!(lat, -33.8705, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_polar_latitude() {
        let tm = TransverseMercator::new(0.0, 1.0, 0.0, 0.0);
        assert!(tm.forward(10.0, 91.0).is_err());
    }
}
