//! Projection Web Mercator (EPSG:3857)
//!
//! Certains exports de portails de données publient dans ce système.

use super::ellipsoid::WGS84;
use super::Geographic;

/// Inverse sphérique : rayon équatorial WGS84, latitude par la fonction de Gudermann
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Geographic {
    let radius = WGS84.a;
    Geographic::new(x / radius, (y / radius).sinh().atan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curitiba_from_web_mercator() {
        let geo = web_mercator_to_geographic(-5_484_700.0, -2_928_700.0);
        let (lon, lat) = geo.to_degrees();

        assert!((lon - (-49.27)).abs() < 0.01, "lon={}", lon);
        assert!((lat - (-25.43)).abs() < 0.01, "lat={}", lat);
    }

    #[test]
    fn test_origin() {
        let (lon, lat) = web_mercator_to_geographic(0.0, 0.0).to_degrees();
        assert!(lon.abs() < 1e-12);
        assert!(lat.abs() < 1e-12);
    }
}
