//! Définition et implémentation des commandes CLI
//!
//! - `filter`: sélection → GeoJSON + CSV
//! - `options`: valeurs proposées par les sélecteurs
//! - `layers`: téléchargement des couches distantes
//! - `map`: page HTML de la sélection
//! - `export-all`: table complète en CSV

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use sipra::export::{self, CSV_COLUMNS};
use sipra::options;
use sipra::{apply_filters, FeatureCollection, FilterSpec, LoadStats, TextField};
use tracing::{info, warn};

use sipra_map::config::Config;
use sipra_map::layers::{self, LayerSource};
use sipra_map::map::{render_page, MapView};
use sipra_map::report::RunReport;

/// Nom du fichier HTML de la carte
pub const MAP_FILE_NAME: &str = "mapa.html";

#[derive(Subcommand)]
pub enum Commands {
    /// Filter settlements and export the selection as GeoJSON and CSV
    Filter {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output directory (défaut : config / env SIPRA_OUTPUT)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Files to write
        #[arg(long, value_enum, default_value_t = ExportFormat::All)]
        format: ExportFormat,

        /// Save the run report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the values offered by each selector
    Options {
        /// State used to narrow the municipality list
        #[arg(long)]
        uf: Option<String>,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Download the configured remote GeoJSON layers
    Layers {
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only this layer (repeatable; default: every configured layer)
        #[arg(long = "layer", value_name = "NAME")]
        layers: Vec<String>,
    },

    /// Write an HTML map of the selection
    Map {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output HTML file (défaut : <output>/mapa.html)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overlay the configured remote layers
        #[arg(long)]
        with_layers: bool,

        /// Overlay only this layer (repeatable; implies --with-layers)
        #[arg(long = "layer", value_name = "NAME")]
        layers: Vec<String>,
    },

    /// Export the whole table as CSV
    ExportAll {
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Fichiers produits par `filter`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    All,
    Geojson,
    Csv,
}

/// Un flag par clé de filtre; une valeur vide désactive le filtre
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// State (défaut : état de la config s'il existe dans les données, "" pour aucun)
    #[arg(long)]
    pub uf: Option<String>,

    #[arg(long)]
    pub municipio: Option<String>,

    /// Settlement name
    #[arg(long)]
    pub nome_pa: Option<String>,

    /// SIPRA code
    #[arg(long)]
    pub cd_sipra: Option<String>,

    /// Consolidation phase
    #[arg(long)]
    pub fase: Option<String>,

    /// Acquisition method
    #[arg(long)]
    pub forma_obte: Option<String>,

    /// Created on or before (YYYY-MM-DD)
    #[arg(long)]
    pub data_criac: Option<String>,

    /// Acquired on or before (YYYY-MM-DD)
    #[arg(long)]
    pub data_obten: Option<String>,

    /// Maximum number of lots
    #[arg(long, alias = "lotes-max")]
    pub lotes: Option<String>,

    /// Maximum number of families
    #[arg(long, alias = "quant-fami-max")]
    pub quant_fami: Option<String>,

    /// Maximum INCRA area (ha)
    #[arg(long, alias = "area-incra-max")]
    pub area_incra: Option<String>,

    /// Minimum INCRA area (ha)
    #[arg(long)]
    pub area_incra_min: Option<String>,

    /// Maximum polygon area (ha)
    #[arg(long, alias = "area-polig-max")]
    pub area_polig: Option<String>,

    /// Minimum polygon area (ha)
    #[arg(long)]
    pub area_polig_min: Option<String>,
}

impl FilterArgs {
    /// Paires clé/valeur renseignées
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("uf", &self.uf),
            ("municipio", &self.municipio),
            ("nome_pa", &self.nome_pa),
            ("cd_sipra", &self.cd_sipra),
            ("fase", &self.fase),
            ("forma_obte", &self.forma_obte),
            ("data_criac", &self.data_criac),
            ("data_obten", &self.data_obten),
            ("lotes", &self.lotes),
            ("quant_fami", &self.quant_fami),
            ("area_incra", &self.area_incra),
            ("area_incra_min", &self.area_incra_min),
            ("area_polig", &self.area_polig),
            ("area_polig_min", &self.area_polig_min),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
        .collect()
    }

    /// Construit le filtre; sans `--uf`, l'état par défaut s'applique s'il existe
    pub fn to_spec(&self, collection: &FeatureCollection, default_state: &str) -> Result<FilterSpec> {
        let spec = FilterSpec::from_pairs(self.pairs()).context("Invalid filter value")?;

        if self.uf.is_none() && has_state(collection, default_state) {
            info!(uf = default_state, "Default state applied");
            return Ok(spec.uf(default_state));
        }
        Ok(spec)
    }
}

fn has_state(collection: &FeatureCollection, state: &str) -> bool {
    !state.is_empty() && collection.iter().any(|s| s.uf.as_deref() == Some(state))
}

/// Charge le jeu de données via le cache global
fn load_dataset(path: &Path) -> Result<(Arc<FeatureCollection>, LoadStats), sipra::LoadError> {
    let mut stats = None;
    let collection = sipra::cache::global().get_or_load_with(path, |p| {
        let (collection, s) = sipra::load_with_stats(p)?;
        stats = Some(s);
        Ok(collection)
    })?;

    let stats = stats.unwrap_or_else(|| LoadStats {
        read: collection.len(),
        kept: collection.len(),
        source_epsg: collection.epsg,
        ..Default::default()
    });
    Ok((collection, stats))
}

fn output_dir(config: &Config, output: Option<&Path>) -> Result<PathBuf> {
    let dir = output.map(Path::to_path_buf).unwrap_or_else(|| config.output.clone());
    std::fs::create_dir_all(&dir)
        .context(format!("Failed to create output directory: {}", dir.display()))?;
    Ok(dir)
}

fn write_geojson_file(collection: &FeatureCollection, path: &Path) -> Result<()> {
    let file = File::create(path).context(format!("Failed to create {}", path.display()))?;
    export::write_geojson(&mut BufWriter::new(file), collection)
        .context(format!("Failed to write {}", path.display()))
}

fn write_csv_file(collection: &FeatureCollection, path: &Path) -> Result<()> {
    let file = File::create(path).context(format!("Failed to create {}", path.display()))?;
    export::write_csv(BufWriter::new(file), collection, &CSV_COLUMNS)
        .context(format!("Failed to write {}", path.display()))
}

/// Exécute la commande filter
pub fn cmd_filter(
    config: &Config,
    filters: &FilterArgs,
    output: Option<&Path>,
    format: ExportFormat,
    report_path: Option<&Path>,
) -> Result<RunReport> {
    let start = Instant::now();
    let mut report = RunReport::new("filter", &config.dataset);

    let (collection, stats) = load_dataset(&config.dataset)?;
    report.record_load(&stats);

    let spec = filters.to_spec(&collection, &config.default_state)?;
    report.filters = spec.predicates().iter().map(ToString::to_string).collect();

    let selected = apply_filters(&collection, &spec);
    report.selected = selected.len();
    info!(selected = selected.len(), total = collection.len(), "Filters applied");

    if selected.is_empty() {
        warn!("Nenhum resultado encontrado para os filtros selecionados.");
    }

    let dir = output_dir(config, output)?;

    if matches!(format, ExportFormat::All | ExportFormat::Geojson) {
        let path = dir.join(export::GEOJSON_FILE_NAME);
        write_geojson_file(&selected, &path)?;
        report.record_output(&path);
    }
    if matches!(format, ExportFormat::All | ExportFormat::Csv) {
        let path = dir.join(export::CSV_FILE_NAME);
        write_csv_file(&selected, &path)?;
        report.record_output(&path);
    }

    report.set_duration(start.elapsed());
    report.finalize();

    if let Some(path) = report_path {
        report.save_to_file(path)?;
    }

    Ok(report)
}

/// Options des sélecteurs
#[derive(Debug, Clone, Serialize)]
pub struct SelectorOptions {
    pub states: Vec<String>,
    /// Index de l'état par défaut, la liste étant préfixée d'une entrée vide
    pub default_state_index: usize,
    pub municipalities: Vec<String>,
    pub settlements: Vec<String>,
    pub phases: Vec<String>,
    pub acquisition_methods: Vec<String>,
    pub lots: Vec<u32>,
    pub families: Vec<u32>,
    pub areas: Vec<u32>,
    pub date_min: String,
    pub date_max: String,
}

/// Calcule les options des sélecteurs
pub fn selector_options(collection: &FeatureCollection, uf: Option<&str>) -> SelectorOptions {
    let states = options::state_options(collection);
    let (date_min, date_max) = options::date_range();

    SelectorOptions {
        default_state_index: options::default_state_index(&states),
        states,
        municipalities: options::municipality_options(collection, uf),
        settlements: options::distinct_text(collection, TextField::NomePa),
        phases: options::distinct_text(collection, TextField::Fase),
        acquisition_methods: options::distinct_text(collection, TextField::FormaObte),
        lots: options::LOT_OPTIONS.to_vec(),
        families: options::FAMILY_OPTIONS.to_vec(),
        areas: options::AREA_OPTIONS.to_vec(),
        date_min: date_min.to_string(),
        date_max: date_max.to_string(),
    }
}

fn join_numbers(values: &[u32]) -> String {
    values.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
}

/// Exécute la commande options
pub fn cmd_options(config: &Config, uf: Option<&str>, json: bool) -> Result<()> {
    let (collection, _) = load_dataset(&config.dataset)?;
    let opts = selector_options(&collection, uf);

    if json {
        println!("{}", serde_json::to_string_pretty(&opts)?);
        return Ok(());
    }

    println!("Estados ({}): {}", opts.states.len(), opts.states.join(", "));
    println!("Municípios ({}): {}", opts.municipalities.len(), opts.municipalities.join(", "));
    println!("Fases: {}", opts.phases.join(", "));
    println!("Formas de obtenção: {}", opts.acquisition_methods.join(", "));
    println!("Lotes: {}", join_numbers(&opts.lots));
    println!("Famílias: {}", join_numbers(&opts.families));
    println!("Área (ha): {}", join_numbers(&opts.areas));
    println!("Datas: {} .. {}", opts.date_min, opts.date_max);

    Ok(())
}

/// Nom de fichier sûr pour une couche
fn layer_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}.geojson", stem)
}

/// Restreint le catalogue aux couches demandées (toutes si aucune)
pub fn select_layers(configured: &[LayerSource], names: &[String]) -> Result<Vec<LayerSource>> {
    if names.is_empty() {
        return Ok(configured.to_vec());
    }

    names
        .iter()
        .map(|name| {
            configured
                .iter()
                .find(|l| &l.name == name)
                .cloned()
                .ok_or_else(|| {
                    let known: Vec<&str> = configured.iter().map(|l| l.name.as_str()).collect();
                    anyhow!(
                        "Unknown layer '{}' (configured: {})",
                        name,
                        if known.is_empty() { "none".to_string() } else { known.join(", ") }
                    )
                })
        })
        .collect()
}

fn fetch_selected_layers(
    config: &Config,
    selection: &[LayerSource],
    report: &mut RunReport,
) -> Result<Vec<(String, geojson::FeatureCollection)>> {
    if selection.is_empty() {
        warn!("No remote layers configured");
        return Ok(Vec::new());
    }

    info!(layers = %describe_layers(selection), "Fetching remote layers");
    let client = layers::build_client(config.http_timeout()).context("Failed to build HTTP client")?;

    let mut fetched = Vec::new();
    for result in layers::fetch_layers(&client, selection) {
        match result.result {
            Ok(fc) => fetched.push((result.name, fc)),
            Err(e) => report.record_layer_failure(&result.name, &e.to_string()),
        }
    }
    Ok(fetched)
}

/// Exécute la commande layers
pub fn cmd_layers(config: &Config, output: Option<&Path>, names: &[String]) -> Result<RunReport> {
    let start = Instant::now();
    let selection = select_layers(&config.layers, names)?;
    let mut report = RunReport::new("layers", &config.dataset);
    let dir = output_dir(config, output)?;

    for (name, fc) in fetch_selected_layers(config, &selection, &mut report)? {
        let path = dir.join(layer_file_name(&name));
        std::fs::write(&path, fc.to_string())
            .context(format!("Failed to write {}", path.display()))?;
        info!(layer = %name, path = %path.display(), "Layer saved");
        report.record_output(&path);
    }

    report.set_duration(start.elapsed());
    report.finalize();
    Ok(report)
}

/// Exécute la commande map
pub fn cmd_map(
    config: &Config,
    filters: &FilterArgs,
    output: Option<&Path>,
    with_layers: bool,
    names: &[String],
) -> Result<RunReport> {
    let start = Instant::now();
    let overlays = if with_layers || !names.is_empty() {
        select_layers(&config.layers, names)?
    } else {
        Vec::new()
    };
    let mut report = RunReport::new("map", &config.dataset);

    let (collection, stats) = load_dataset(&config.dataset)?;
    report.record_load(&stats);

    let spec = filters.to_spec(&collection, &config.default_state)?;
    report.filters = spec.predicates().iter().map(ToString::to_string).collect();
    let selected = apply_filters(&collection, &spec);
    report.selected = selected.len();

    let extra = if overlays.is_empty() {
        Vec::new()
    } else {
        fetch_selected_layers(config, &overlays, &mut report)?
    };

    let html = render_page(&MapView {
        selection: &selected,
        layers: &extra,
        config: &config.map,
    });

    let path = match output {
        Some(p) => {
            if let Some(parent) = p.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            p.to_path_buf()
        }
        None => output_dir(config, None)?.join(MAP_FILE_NAME),
    };
    std::fs::write(&path, html).context(format!("Failed to write {}", path.display()))?;
    report.record_output(&path);

    report.set_duration(start.elapsed());
    report.finalize();
    Ok(report)
}

/// Exécute la commande export-all
pub fn cmd_export_all(config: &Config, output: Option<&Path>) -> Result<RunReport> {
    let start = Instant::now();
    let mut report = RunReport::new("export-all", &config.dataset);

    let (collection, stats) = load_dataset(&config.dataset)?;
    report.record_load(&stats);
    report.selected = collection.len();

    let path = output_dir(config, output)?.join(export::CSV_ALL_FILE_NAME);
    write_csv_file(&collection, &path)?;
    report.record_output(&path);

    report.set_duration(start.elapsed());
    report.finalize();
    Ok(report)
}

/// Couches configurées, pour l'affichage
pub fn describe_layers(layers: &[LayerSource]) -> String {
    layers
        .iter()
        .map(|l| format!("{} ({})", l.name, l.url))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry};
    use sipra::Settlement;

    fn collection() -> FeatureCollection {
        let make = |uf: &str, nome: &str| {
            let mut s = Settlement::new(Geometry::Polygon(polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 0.0),
            ]));
            s.uf = Some(uf.to_string());
            s.nome_pa = Some(nome.to_string());
            s.fase = Some("Em Estruturação".to_string());
            s
        };
        FeatureCollection::new(vec![make("PARANÁ", "PA Um"), make("BAHIA", "PA Dois")])
    }

    #[test]
    fn test_pairs_only_set_flags() {
        let args = FilterArgs {
            municipio: Some("PALMAS".to_string()),
            area_incra_min: Some("500".to_string()),
            ..Default::default()
        };
        assert_eq!(args.pairs(), vec![("municipio", "PALMAS"), ("area_incra_min", "500")]);
    }

    #[test]
    fn test_default_state_applied() {
        let spec = FilterArgs::default().to_spec(&collection(), "PARANÁ").unwrap();
        assert_eq!(spec.uf.as_deref(), Some("PARANÁ"));
    }

    #[test]
    fn test_default_state_absent_from_data() {
        let spec = FilterArgs::default().to_spec(&collection(), "GOIÁS").unwrap();
        assert!(spec.is_empty());
    }

    #[test]
    fn test_empty_uf_disables_default() {
        let args = FilterArgs {
            uf: Some(String::new()),
            ..Default::default()
        };
        let spec = args.to_spec(&collection(), "PARANÁ").unwrap();
        assert!(spec.uf.is_none());
    }

    #[test]
    fn test_invalid_number_rejected() {
        let args = FilterArgs {
            lotes: Some("muitos".to_string()),
            ..Default::default()
        };
        assert!(args.to_spec(&collection(), "").is_err());
    }

    #[test]
    fn test_selector_options() {
        let opts = selector_options(&collection(), Some("BAHIA"));
        assert_eq!(opts.states, vec!["BAHIA", "PARANÁ"]);
        assert_eq!(opts.default_state_index, 2);
        assert_eq!(opts.phases, vec!["Em Estruturação"]);
        assert_eq!(opts.lots.len(), 12);
        assert_eq!(opts.date_min, "1970-01-01");
        assert_eq!(opts.date_max, "2034-12-31");
    }

    #[test]
    fn test_layer_file_name() {
        assert_eq!(layer_file_name("municipios"), "municipios.geojson");
        assert_eq!(layer_file_name("terras/indígenas 2024"), "terras_indígenas_2024.geojson");
    }

    fn catalogue() -> Vec<LayerSource> {
        ["municipios", "terras_indigenas", "quilombolas"]
            .iter()
            .map(|name| LayerSource {
                name: name.to_string(),
                url: format!("http://localhost/{}.geojson", name),
            })
            .collect()
    }

    #[test]
    fn test_select_layers_narrows_catalogue() {
        let all = select_layers(&catalogue(), &[]).unwrap();
        assert_eq!(all.len(), 3);

        let picked = select_layers(
            &catalogue(),
            &["quilombolas".to_string(), "municipios".to_string()],
        )
        .unwrap();
        let names: Vec<&str> = picked.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["quilombolas", "municipios"]);
    }

    #[test]
    fn test_select_unknown_layer() {
        let err = select_layers(&catalogue(), &["rios".to_string()]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("rios"));
        assert!(message.contains("municipios, terras_indigenas, quilombolas"));

        let err = select_layers(&[], &["rios".to_string()]).unwrap_err();
        assert!(err.to_string().contains("none"));
    }
}
