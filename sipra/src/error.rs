//! Types d'erreurs pour le crate sipra

use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement du jeu de données
///
/// Clonable: le cache de chargement rejoue la même erreur à chaque appel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// Fichier illisible
    #[error("Cannot read {path}: {reason}")]
    Io { path: String, reason: String },

    /// Contenu non décodable en GeoJSON
    #[error("Invalid GeoJSON in {path}: {reason}")]
    Parse { path: String, reason: String },

    /// Document GeoJSON valide mais pas une FeatureCollection
    #[error("{path} is not a GeoJSON FeatureCollection (found {found})")]
    NotFeatureCollection { path: String, found: &'static str },

    /// Membre `crs` présent mais illisible
    #[error("Unrecognized CRS in {path}: {crs}")]
    UnknownCrs { path: String, crs: String },

    /// Échec de la reprojection vers EPSG:4326
    #[error("Reprojection failed for {path}: {source}")]
    Reproject {
        path: String,
        #[source]
        source: ReprojectError,
    },
}

impl LoadError {
    /// Crée une erreur d'I/O avec contexte
    pub fn io(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Io {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Crée une erreur de parsing avec contexte
    pub fn parse(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Erreurs de reprojection
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReprojectError {
    /// Couple source/cible non couvert
    #[error("Reprojection EPSG:{source_epsg} -> EPSG:{target_epsg} not supported")]
    Unsupported { source_epsg: u32, target_epsg: u32 },

    /// Erreur remontée par PROJ
    #[error("PROJ error: {0}")]
    Proj(String),

    /// Coordonnée non transformable
    #[error("Coordinate ({x}, {y}) could not be transformed")]
    Coordinate { x: f64, y: f64 },
}

/// Valeur de filtre non interprétable
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Invalid value for filter '{key}': '{value}' ({expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Erreurs d'export (GeoJSON, CSV)
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Geometry encoding error: {0}")]
    Geometry(#[from] geozero::error::GeozeroError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
