//! # sipra-map
//!
//! Filtrage, export et cartographie des projets d'assentamento (SIPRA) en
//! ligne de commande.
//!
//! ## Features
//!
//! - Filtres par état, municipalité, phase, dates, lots, familles, surfaces
//! - Export GeoJSON / CSV de la sélection
//! - Carte HTML (Leaflet) avec infobulles
//! - Couches GeoJSON distantes configurables
//!
//! ## Usage CLI
//!
//! ```bash
//! # Sélection du Paraná, surfaces INCRA de 500 à 5000 ha
//! sipra-map filter --uf PARANÁ --area-incra-min 500 --area-incra 5000 -o ./out
//!
//! # Carte de la sélection
//! sipra-map map --uf PARANÁ --municipio PALMAS
//!
//! # Table complète
//! sipra-map export-all -o ./out
//! ```

pub mod config;
pub mod layers;
pub mod map;
pub mod report;

pub use config::{Config, LayerSource};
pub use layers::{fetch_layer, fetch_layers, FetchError};
pub use map::{render_page, MapView};
pub use report::{RunReport, RunStatus};
