//! Choix de la méthode de reprojection vers EPSG:4326

use geo::Geometry;

use super::ReprojectorLite;
use crate::error::ReprojectError;

/// Méthode retenue pour un couple source/cible
///
/// Pure Rust quand le système est couvert, PROJ sinon (feature `reproject`).
pub enum SmartReprojector {
    /// Source déjà dans le système cible
    Identity,
    Lite(ReprojectorLite),
    #[cfg(feature = "reproject")]
    Proj(crate::reproject::Reprojector),
}

impl SmartReprojector {
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self, ReprojectError> {
        if source_epsg == target_epsg {
            return Ok(Self::Identity);
        }

        match ReprojectorLite::new(source_epsg, target_epsg) {
            Ok(lite) => Ok(Self::Lite(lite)),
            Err(unsupported) => Self::fallback(source_epsg, target_epsg, unsupported),
        }
    }

    #[cfg(feature = "reproject")]
    fn fallback(
        source_epsg: u32,
        target_epsg: u32,
        _unsupported: ReprojectError,
    ) -> Result<Self, ReprojectError> {
        crate::reproject::Reprojector::new(source_epsg, target_epsg).map(Self::Proj)
    }

    #[cfg(not(feature = "reproject"))]
    fn fallback(_: u32, _: u32, unsupported: ReprojectError) -> Result<Self, ReprojectError> {
        Err(unsupported)
    }

    /// Reprojette une géométrie (consommée, modifiée en place)
    pub fn reproject(&self, mut geom: Geometry) -> Result<Geometry, ReprojectError> {
        match self {
            Self::Identity => {}
            Self::Lite(lite) => lite.reproject_in_place(&mut geom)?,
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.reproject_in_place(&mut geom)?,
        }
        Ok(geom)
    }

    /// Libellé pour les logs
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Lite(_) => "pure Rust",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "PROJ",
        }
    }
}
