//! Projection UTM (Universal Transverse Mercator), hémisphère sud
//!
//! Le territoire brésilien couvre les zones 18S à 25S, publiées en
//! SIRGAS 2000 (EPSG:31978-31985) ou WGS 84 (EPSG:32718-32725).
//!
//! Inverse par la série de Krüger tronquée à l'ordre n³ (précision
//! sub-millimétrique à l'intérieur d'une zone).

use super::ellipsoid::Ellipsoid;
use super::Geographic;

const SCALE: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Méridien central d'une zone, en radians
fn central_meridian(zone: u32) -> f64 {
    (6.0 * f64::from(zone) - 183.0).to_radians()
}

/// Coefficients de la série inverse, dépendants du seul ellipsoïde
struct KruegerInverse {
    /// Rayon rectifiant
    rectifying_radius: f64,
    beta: [f64; 3],
    delta: [f64; 3],
}

impl KruegerInverse {
    fn new(ell: Ellipsoid) -> Self {
        let n = ell.third_flattening();
        let (n2, n3) = (n * n, n * n * n);

        Self {
            rectifying_radius: ell.a / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0),
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }

    /// (easting, northing) réduits → (longitude relative, latitude) en radians
    fn invert(&self, easting: f64, northing: f64) -> (f64, f64) {
        let xi = northing / (SCALE * self.rectifying_radius);
        let eta = easting / (SCALE * self.rectifying_radius);

        let (mut xi_p, mut eta_p) = (xi, eta);
        for (j, b) in (1..=3u32).zip(self.beta) {
            let k = 2.0 * f64::from(j);
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        // Latitude conforme puis latitude géodésique
        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let lat = (1..=3u32)
            .zip(self.delta)
            .fold(chi, |acc, (j, d)| acc + d * (2.0 * f64::from(j) * chi).sin());
        let dlon = eta_p.sinh().atan2(xi_p.cos());

        (dlon, lat)
    }
}

/// Convertit UTM vers coordonnées géographiques sur l'ellipsoïde donné
pub fn utm_to_geographic(x: f64, y: f64, zone: u32, south: bool, ell: Ellipsoid) -> Geographic {
    let false_northing = if south { FALSE_NORTHING_SOUTH } else { 0.0 };
    let (dlon, lat) = KruegerInverse::new(ell).invert(x - FALSE_EASTING, y - false_northing);
    Geographic::new(central_meridian(zone) + dlon, lat)
}
