//! Modules d'export (GeoJSON, CSV)

pub mod csv;
pub mod geojson;

pub use self::csv::{to_csv, write_csv, Column, CSV_COLUMNS};
pub use self::geojson::{to_geojson, write_geojson, EXPORTED_PROPERTIES};

/// Nom du fichier GeoJSON des polygones sélectionnés
pub const GEOJSON_FILE_NAME: &str = "poligonos_selecionados.geojson";
pub const GEOJSON_MIME: &str = "application/json";

/// Nom du fichier CSV de la sélection filtrée
pub const CSV_FILE_NAME: &str = "dados_filtrados.csv";
/// Nom du fichier CSV du jeu complet
pub const CSV_ALL_FILE_NAME: &str = "dados_assentamentos.csv";
pub const CSV_MIME: &str = "text/csv";

/// Type MIME d'un fichier exporté, d'après son extension
pub fn mime_type(path: &std::path::Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "geojson" | "json" => Some(GEOJSON_MIME),
        "csv" => Some(CSV_MIME),
        "html" => Some("text/html"),
        _ => None,
    }
}
