//! Reprojection via PROJ (feature `reproject`)
//!
//! Utilisée pour les systèmes que `reproject_lite` ne couvre pas
//! (SAD69, Córrego Alegre, projections coniques de certains états...).

use geo::{Coord, Geometry};
use proj::Proj;
use tracing::debug;

use crate::error::ReprojectError;
use crate::reproject_lite::map_coords_in_place;

/// Transformation PROJ entre deux EPSG, axes normalisés (lon, lat)
pub struct Reprojector {
    proj: Proj,
}

impl Reprojector {
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self, ReprojectError> {
        let from = format!("EPSG:{}", source_epsg);
        let to = format!("EPSG:{}", target_epsg);

        let proj = Proj::new_known_crs(&from, &to, None)
            .map_err(|e| ReprojectError::Proj(format!("{} -> {}: {}", from, to, e)))?;
        debug!(from = %from, to = %to, "PROJ transformation ready");

        Ok(Self { proj })
    }

    /// Reprojette toutes les coordonnées d'une géométrie, en place
    pub fn reproject_in_place(&self, geom: &mut Geometry) -> Result<(), ReprojectError> {
        map_coords_in_place(geom, &|c: Coord| {
            let (x, y) = self
                .proj
                .convert((c.x, c.y))
                .map_err(|e| ReprojectError::Proj(e.to_string()))?;
            if !x.is_finite() || !y.is_finite() {
                return Err(ReprojectError::Coordinate { x: c.x, y: c.y });
            }
            Ok(Coord { x, y })
        })
    }
}
