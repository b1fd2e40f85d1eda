//! # sipra
//!
//! Chargement, filtrage et export des projets d'assentamento de la réforme
//! agraire brésilienne (données publiques SIPRA / INCRA).
//!
//! ## Features
//!
//! - Lecture GeoJSON avec coercition best-effort des attributs
//! - Reprojection vers EPSG:4326 (pure Rust, PROJ avec le feature `reproject`)
//! - Élimination des géométries nulles ou invalides
//! - Cache de chargement par chemin
//! - Filtres par égalité et par bornes, composés en conjonction
//! - Export GeoJSON et CSV
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sipra::{apply_filters, FilterSpec, NumericField};
//! use std::path::Path;
//!
//! let collection = sipra::load_cached(Path::new("pasbr_geo.geojson"))?;
//! let spec = FilterSpec::new()
//!     .uf("PARANÁ")
//!     .max(NumericField::AreaIncra, 5000.0);
//!
//! let selected = apply_filters(&collection, &spec);
//! let geojson = sipra::export::to_geojson(&selected)?;
//! let csv = sipra::export::to_csv(&selected, &sipra::export::CSV_COLUMNS)?;
//! ```

pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod format;
pub mod loader;
pub mod options;
#[cfg(feature = "reproject")]
pub mod reproject;
pub mod reproject_lite;
pub mod types;
pub mod validity;

pub use cache::{load_cached, DatasetCache};
pub use error::{ExportError, FilterError, LoadError, ReprojectError};
pub use filter::{apply_filters, FilterSpec, Predicate};
pub use format::format_area;
pub use loader::{load, load_with_stats, LoadStats};
pub use types::{DateField, FeatureCollection, NumericField, Settlement, TextField, WGS84_EPSG};

/// Chemin par défaut du jeu de données
pub const DEFAULT_DATASET: &str = "pasbr_geo.geojson";
