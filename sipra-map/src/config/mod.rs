//! Configuration de l'application

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Fichier GeoJSON des assentamentos
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,

    /// Répertoire de sortie des exports
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// État présélectionné
    #[serde(default = "default_state")]
    pub default_state: String,

    /// Timeout des requêtes HTTP (secondes)
    #[serde(default = "default_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub map: MapConfig,

    /// Couches distantes additionnelles
    #[serde(default)]
    pub layers: Vec<LayerSource>,
}

/// Paramètres de la carte
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapConfig {
    /// Centre (lat, lon) quand la sélection est vide
    pub center: [f64; 2],
    pub zoom: u8,
    /// Zoom initial avant ajustement sur l'emprise de la sélection
    pub selection_zoom: u8,
    pub tile_url: String,
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        let (lat, lon) = sipra::options::DEFAULT_CENTER;
        Self {
            center: [lat, lon],
            zoom: sipra::options::DEFAULT_ZOOM,
            selection_zoom: 10,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
        }
    }
}

/// Couche GeoJSON distante
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerSource {
    pub name: String,
    pub url: String,
}

fn default_dataset() -> PathBuf {
    PathBuf::from(sipra::DEFAULT_DATASET)
}

fn default_output() -> PathBuf {
    PathBuf::from("out")
}

fn default_state() -> String {
    sipra::options::DEFAULT_STATE.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            output: default_output(),
            default_state: default_state(),
            http_timeout_secs: default_timeout(),
            map: MapConfig::default(),
            layers: Vec::new(),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: default", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Preset embarqué si `spec` est un nom connu, sinon fichier JSON
    pub fn resolve(spec: Option<&str>) -> Result<Self> {
        match spec {
            None => Self::from_preset("default"),
            Some(name) if !name.ends_with(".json") && !Path::new(name).exists() => {
                Self::from_preset(name)
            }
            Some(path) => Self::load(Path::new(path)),
        }
    }

    /// Applique les variables d'environnement (SIPRA_DATASET, SIPRA_OUTPUT, SIPRA_HTTP_TIMEOUT)
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(dataset) = var("SIPRA_DATASET").filter(|v| !v.is_empty()) {
            debug!(dataset = %dataset, "Dataset from environment");
            self.dataset = PathBuf::from(dataset);
        }
        if let Some(output) = var("SIPRA_OUTPUT").filter(|v| !v.is_empty()) {
            self.output = PathBuf::from(output);
        }
        if let Some(timeout) = var("SIPRA_HTTP_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.http_timeout_secs = timeout;
        }
    }

    /// Timeout HTTP
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_preset() {
        let config = Config::from_preset("default").unwrap();
        assert_eq!(config.dataset, PathBuf::from("pasbr_geo.geojson"));
        assert_eq!(config.default_state, "PARANÁ");
        assert_eq!(config.map.center, [-24.0, -51.0]);
        assert_eq!(config.map.zoom, 7);
        assert!(config.layers.is_empty());
    }

    #[test]
    fn test_unknown_preset() {
        assert!(Config::from_preset("full").is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "layers": [{ "name": "municipios", "url": "http://localhost/m.geojson" }] }"#,
        )
        .unwrap();
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.output, PathBuf::from("out"));
        assert_eq!(config.layers.len(), 1);
        assert_eq!(config.layers[0].name, "municipios");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SIPRA_DATASET", "/data/pa.geojson"),
            ("SIPRA_OUTPUT", ""),
            ("SIPRA_HTTP_TIMEOUT", "5"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.dataset, PathBuf::from("/data/pa.geojson"));
        assert_eq!(config.output, PathBuf::from("out"));
        assert_eq!(config.http_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_timeout_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|k| (k == "SIPRA_HTTP_TIMEOUT").then(|| "abc".to_string()));
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("sipra_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "default_state": "BAHIA", "http_timeout_secs": 3 }"#).unwrap();

        let config = Config::resolve(path.to_str()).unwrap();
        assert_eq!(config.default_state, "BAHIA");
        assert_eq!(config.http_timeout_secs, 3);

        std::fs::remove_file(path).ok();
    }
}
