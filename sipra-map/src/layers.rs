//! Récupération des couches GeoJSON distantes

use std::time::Duration;

use geojson::{Feature, FeatureCollection, GeoJson};
use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{info, warn};

pub use crate::config::LayerSource;

/// Erreur de récupération d'une couche
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid GeoJSON from {url}: {reason}")]
    InvalidGeoJson { url: String, reason: String },
}

/// Résultat de récupération d'une couche
#[derive(Debug)]
pub struct LayerResult {
    pub name: String,
    pub result: Result<FeatureCollection, FetchError>,
}

/// Client HTTP bloquant avec timeout
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!("sipra-map/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
}

/// Télécharge une couche (une seule requête GET, sans retry)
pub fn fetch_layer(client: &Client, source: &LayerSource) -> Result<FeatureCollection, FetchError> {
    let url = source.url.as_str();
    let network = |source: reqwest::Error| FetchError::Network {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().map_err(network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().map_err(network)?;
    let invalid = |reason: String| FetchError::InvalidGeoJson {
        url: url.to_string(),
        reason,
    };

    match body.parse::<GeoJson>().map_err(|e| invalid(e.to_string()))? {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        GeoJson::Feature(f) => Ok(single(f)),
        GeoJson::Geometry(g) => Ok(single(Feature::from(g))),
    }
}

fn single(feature: Feature) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: vec![feature],
        foreign_members: None,
    }
}

/// Télécharge toutes les couches; un échec n'interrompt pas les autres
pub fn fetch_layers(client: &Client, sources: &[LayerSource]) -> Vec<LayerResult> {
    sources
        .iter()
        .map(|source| {
            let result = fetch_layer(client, source);
            match &result {
                Ok(fc) => info!(layer = %source.name, features = fc.features.len(), "Layer fetched"),
                Err(e) => warn!(layer = %source.name, error = %e, "Layer fetch failed"),
            }
            LayerResult {
                name: source.name.clone(),
                result,
            }
        })
        .collect()
}
