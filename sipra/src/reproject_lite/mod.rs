//! Inverses de projection en Rust pur, vers WGS84 (EPSG:4326)
//!
//! Systèmes rencontrés dans les données fédérales brésiliennes :
//! - SIRGAS 2000 géographique (EPSG:4674), assimilé à WGS84
//! - Web Mercator (EPSG:3857)
//! - SIRGAS 2000 / UTM 18S à 25S (EPSG:31978-31985)
//! - WGS 84 / UTM 18S à 25S (EPSG:32718-32725)

mod ellipsoid;
mod mercator;
mod smart;
mod utm;

pub use smart::SmartReprojector;

use geo::{Coord, Geometry, MapCoordsInPlace};

use crate::error::ReprojectError;
use crate::types::WGS84_EPSG;
use ellipsoid::{GRS80, WGS84};

/// Longitude / latitude en radians, sortie des projections inverses
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    pub lon: f64,
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }
}

/// Système source reconnu
#[derive(Debug, Clone, Copy, PartialEq)]
enum Source {
    /// Degrés sur un datum coïncidant avec WGS84
    Geographic,
    WebMercator,
    UtmSirgas(u32),
    UtmWgs84(u32),
}

impl Source {
    fn from_epsg(epsg: u32) -> Option<Self> {
        match epsg {
            4674 => Some(Self::Geographic),
            3857 | 900913 => Some(Self::WebMercator),
            31978..=31985 => Some(Self::UtmSirgas(epsg - 31978 + 18)),
            32718..=32725 => Some(Self::UtmWgs84(epsg - 32718 + 18)),
            _ => None,
        }
    }
}

/// Reprojection légère vers EPSG:4326
pub struct ReprojectorLite {
    source: Source,
}

impl ReprojectorLite {
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self, ReprojectError> {
        let unsupported = ReprojectError::Unsupported {
            source_epsg,
            target_epsg,
        };
        if target_epsg != WGS84_EPSG {
            return Err(unsupported);
        }
        let source = Source::from_epsg(source_epsg).ok_or(unsupported)?;
        Ok(Self { source })
    }

    /// Transforme un point (x, y) de la source vers WGS84 (degrés)
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64), ReprojectError> {
        let (lon, lat) = match self.source {
            Source::Geographic => (x, y),
            Source::WebMercator => mercator::web_mercator_to_geographic(x, y).to_degrees(),
            Source::UtmSirgas(zone) => utm::utm_to_geographic(x, y, zone, true, GRS80).to_degrees(),
            Source::UtmWgs84(zone) => utm::utm_to_geographic(x, y, zone, true, WGS84).to_degrees(),
        };

        if !lon.is_finite() || !lat.is_finite() {
            return Err(ReprojectError::Coordinate { x, y });
        }
        Ok((lon, lat))
    }

    /// Reprojette toutes les coordonnées d'une géométrie, en place
    pub fn reproject_in_place(&self, geom: &mut Geometry) -> Result<(), ReprojectError> {
        map_coords_in_place(geom, &|c: Coord| {
            let (x, y) = self.transform_point(c.x, c.y)?;
            Ok(Coord { x, y })
        })
    }
}

/// Applique une transformation faillible à chaque coordonnée, en place
///
/// Dispatch sur le type concret: l'implémentation générique de `Geometry`
/// ne s'instancie pas (récursion via `GeometryCollection`).
pub(crate) fn map_coords_in_place(
    geom: &mut Geometry,
    func: &dyn Fn(Coord) -> Result<Coord, ReprojectError>,
) -> Result<(), ReprojectError> {
    match geom {
        Geometry::Polygon(g) => g.try_map_coords_in_place(func),
        Geometry::MultiPolygon(g) => g.try_map_coords_in_place(func),
        Geometry::Point(g) => g.try_map_coords_in_place(func),
        Geometry::Line(g) => g.try_map_coords_in_place(func),
        Geometry::LineString(g) => g.try_map_coords_in_place(func),
        Geometry::MultiPoint(g) => g.try_map_coords_in_place(func),
        Geometry::MultiLineString(g) => g.try_map_coords_in_place(func),
        Geometry::Rect(g) => g.try_map_coords_in_place(func),
        Geometry::Triangle(g) => g.try_map_coords_in_place(func),
        Geometry::GeometryCollection(gc) => gc
            .0
            .iter_mut()
            .try_for_each(|g| map_coords_in_place(g, func)),
    }
}
