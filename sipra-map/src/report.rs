//! Rapport d'exécution
//!
//! Résume un chargement, la sélection obtenue, les fichiers écrits et les
//! couches distantes en échec.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use sipra::LoadStats;

/// Statut global de l'exécution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Tout s'est bien passé
    Success,
    /// Sorties écrites, mais des couches ou enregistrements ont été écartés
    PartialSuccess,
    /// Sélection vide
    Empty,
}

/// Statistiques de chargement sérialisables
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    pub read: usize,
    pub kept: usize,
    pub dropped_null: usize,
    pub dropped_invalid: usize,
    pub missing_area_incra: usize,
    pub missing_area_polig: usize,
    pub source_epsg: u32,
}

impl From<&LoadStats> for LoadSummary {
    fn from(stats: &LoadStats) -> Self {
        Self {
            read: stats.read,
            kept: stats.kept,
            dropped_null: stats.dropped_null,
            dropped_invalid: stats.dropped_invalid,
            missing_area_incra: stats.missing_area_incra,
            missing_area_polig: stats.missing_area_polig,
            source_epsg: stats.source_epsg,
        }
    }
}

/// Couche distante en échec
#[derive(Debug, Clone, Serialize)]
pub struct LayerFailure {
    pub name: String,
    pub message: String,
}

/// Fichier écrit par la commande
#[derive(Debug, Clone, Serialize)]
pub struct OutputFile {
    pub path: PathBuf,
    pub mime: Option<&'static str>,
}

/// Rapport complet d'une commande
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub command: String,
    pub dataset: PathBuf,
    pub duration_secs: f64,
    pub status: RunStatus,
    pub load: LoadSummary,
    /// Filtres actifs, lisibles
    pub filters: Vec<String>,
    pub selected: usize,
    pub outputs: Vec<OutputFile>,
    pub layer_failures: Vec<LayerFailure>,
}

impl RunReport {
    pub fn new(command: &str, dataset: &Path) -> Self {
        Self {
            command: command.to_string(),
            dataset: dataset.to_path_buf(),
            duration_secs: 0.0,
            status: RunStatus::Success,
            load: LoadSummary::default(),
            filters: Vec::new(),
            selected: 0,
            outputs: Vec::new(),
            layer_failures: Vec::new(),
        }
    }

    pub fn record_load(&mut self, stats: &LoadStats) {
        self.load = LoadSummary::from(stats);
    }

    pub fn record_output(&mut self, path: &Path) {
        self.outputs.push(OutputFile {
            path: path.to_path_buf(),
            mime: sipra::export::mime_type(path),
        });
    }

    pub fn record_layer_failure(&mut self, name: &str, message: &str) {
        self.layer_failures.push(LayerFailure {
            name: name.to_string(),
            message: message.to_string(),
        });
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let degraded = !self.layer_failures.is_empty()
            || self.load.dropped_null > 0
            || self.load.dropped_invalid > 0;

        self.status = if self.selected == 0 && self.command != "layers" {
            RunStatus::Empty
        } else if degraded {
            RunStatus::PartialSuccess
        } else {
            RunStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("SIPRA REPORT - {}", self.command);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Dataset: {}", self.dataset.display());

        println!("\n--- LOAD ---");
        println!(
            "Features: {} read, {} kept, {} without geometry, {} invalid (EPSG:{})",
            self.load.read,
            self.load.kept,
            self.load.dropped_null,
            self.load.dropped_invalid,
            self.load.source_epsg
        );
        println!(
            "Missing areas: {} area_incra, {} area_polig",
            self.load.missing_area_incra, self.load.missing_area_polig
        );

        if !self.filters.is_empty() {
            println!("\n--- FILTERS ---");
            for f in &self.filters {
                println!("  {}", f);
            }
        }
        println!("\nSelected: {}", self.selected);

        if !self.outputs.is_empty() {
            println!("\n--- OUTPUTS ---");
            for o in &self.outputs {
                match o.mime {
                    Some(mime) => println!("  {} ({})", o.path.display(), mime),
                    None => println!("  {}", o.path.display()),
                }
            }
        }

        if !self.layer_failures.is_empty() {
            println!("\n--- LAYER FAILURES ({}) ---", self.layer_failures.len());
            for f in &self.layer_failures {
                println!("  [{}] {}", f.name, f.message);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Résumé sur une ligne
    pub fn summary(&self) -> String {
        format!(
            "{}: {} selected of {} loaded, {} files written",
            self.command,
            self.selected,
            self.load.kept,
            self.outputs.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> LoadStats {
        LoadStats {
            read: 10,
            kept: 8,
            dropped_null: 1,
            dropped_invalid: 1,
            missing_area_incra: 2,
            missing_area_polig: 0,
            source_epsg: 4674,
        }
    }

    #[test]
    fn test_new_report() {
        let report = RunReport::new("filter", Path::new("pasbr_geo.geojson"));
        assert_eq!(report.status, RunStatus::Success);
        assert_eq!(report.selected, 0);
        assert!(report.outputs.is_empty());
    }

    #[test]
    fn test_finalize_empty() {
        let mut report = RunReport::new("filter", Path::new("pasbr_geo.geojson"));
        report.finalize();
        assert_eq!(report.status, RunStatus::Empty);
    }

    #[test]
    fn test_finalize_partial() {
        let mut report = RunReport::new("filter", Path::new("pasbr_geo.geojson"));
        report.record_load(&stats());
        report.selected = 3;
        report.finalize();
        assert_eq!(report.status, RunStatus::PartialSuccess);
    }

    #[test]
    fn test_finalize_layers_failure() {
        let mut report = RunReport::new("layers", Path::new("pasbr_geo.geojson"));
        report.record_layer_failure("municipios", "HTTP 500");
        report.finalize();
        assert_eq!(report.status, RunStatus::PartialSuccess);
    }

    #[test]
    fn test_summary() {
        let mut report = RunReport::new("filter", Path::new("pasbr_geo.geojson"));
        report.record_load(&stats());
        report.selected = 3;
        report.record_output(Path::new("out/dados_filtrados.csv"));
        assert_eq!(report.summary(), "filter: 3 selected of 8 loaded, 1 files written");
        assert_eq!(report.outputs[0].mime, Some("text/csv"));
    }

    #[test]
    fn test_serialize() {
        let mut report = RunReport::new("filter", Path::new("pasbr_geo.geojson"));
        report.filters.push("uf = PR".to_string());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "Success");
        assert_eq!(json["filters"][0], "uf = PR");
    }
}
