//! Chargement du jeu de données GeoJSON des assentamentos
//!
//! Étapes:
//! 1. Lecture et décodage de la FeatureCollection
//! 2. Coercition des attributs (texte, numérique, date brute)
//! 3. Reprojection vers EPSG:4326 si le `crs` déclaré diffère
//! 4. Élimination des géométries nulles ou invalides

pub mod coerce;
pub mod crs;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geojson::{GeoJson, JsonObject};
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::reproject_lite::SmartReprojector;
use crate::types::{DateField, FeatureCollection, NumericField, Settlement, TextField, WGS84_EPSG};
use crate::validity;

/// Compteurs d'un chargement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Features lues dans le fichier
    pub read: usize,
    /// Features conservées
    pub kept: usize,
    /// Features sans géométrie
    pub dropped_null: usize,
    /// Features à géométrie invalide, non surfacique ou non décodable
    pub dropped_invalid: usize,
    /// `area_incra` manquante ou illisible parmi les features conservées
    pub missing_area_incra: usize,
    /// `area_polig` manquante ou illisible parmi les features conservées
    pub missing_area_polig: usize,
    /// EPSG déclaré par le fichier
    pub source_epsg: u32,
}

/// Charge un fichier GeoJSON
pub fn load(path: &Path) -> Result<FeatureCollection, LoadError> {
    load_with_stats(path).map(|(collection, _)| collection)
}

/// Charge un fichier GeoJSON et retourne les compteurs du chargement
pub fn load_with_stats(path: &Path) -> Result<(FeatureCollection, LoadStats), LoadError> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|e| LoadError::io(&origin, e))?;

    let geojson =
        GeoJson::from_reader(BufReader::new(file)).map_err(|e| LoadError::parse(&origin, e))?;

    from_geojson(geojson, &origin)
}

/// Charge depuis un contenu GeoJSON en mémoire
pub fn load_str(content: &str, origin: &str) -> Result<(FeatureCollection, LoadStats), LoadError> {
    let geojson = content
        .parse::<GeoJson>()
        .map_err(|e| LoadError::parse(origin, e))?;
    from_geojson(geojson, origin)
}

/// Construit la collection depuis un document GeoJSON décodé
pub fn from_geojson(
    geojson: GeoJson,
    origin: &str,
) -> Result<(FeatureCollection, LoadStats), LoadError> {
    let fc = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => {
            return Err(LoadError::NotFeatureCollection {
                path: origin.to_string(),
                found: "Feature",
            })
        }
        GeoJson::Geometry(_) => {
            return Err(LoadError::NotFeatureCollection {
                path: origin.to_string(),
                found: "Geometry",
            })
        }
    };

    let source_epsg =
        crs::source_epsg(fc.foreign_members.as_ref()).map_err(|crs| LoadError::UnknownCrs {
            path: origin.to_string(),
            crs,
        })?;

    let reprojector =
        SmartReprojector::new(source_epsg, WGS84_EPSG).map_err(|source| LoadError::Reproject {
            path: origin.to_string(),
            source,
        })?;

    if source_epsg != WGS84_EPSG {
        info!(
            path = origin,
            source_epsg,
            method = reprojector.description(),
            "Reprojecting to EPSG:4326"
        );
    }

    let mut stats = LoadStats {
        read: fc.features.len(),
        source_epsg,
        ..LoadStats::default()
    };
    let mut features = Vec::with_capacity(fc.features.len());

    for (index, feature) in fc.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            stats.dropped_null += 1;
            continue;
        };

        let geometry = match geo::Geometry::<f64>::try_from(geometry) {
            Ok(g) => g,
            Err(e) => {
                debug!(index, error = %e, "Undecodable geometry, skipping feature");
                stats.dropped_invalid += 1;
                continue;
            }
        };

        // Une coordonnée non transformable écarte le seul enregistrement
        let geometry = match reprojector.reproject(geometry) {
            Ok(g) => g,
            Err(e) => {
                debug!(index, error = %e, "Geometry cannot be reprojected, skipping feature");
                stats.dropped_invalid += 1;
                continue;
            }
        };

        if !validity::is_valid(&geometry) {
            debug!(index, "Invalid geometry, skipping feature");
            stats.dropped_invalid += 1;
            continue;
        }

        let settlement = settlement_from_properties(feature.properties.as_ref(), geometry);
        if settlement.area_incra.is_none() {
            stats.missing_area_incra += 1;
        }
        if settlement.area_polig.is_none() {
            stats.missing_area_polig += 1;
        }
        features.push(settlement);
    }

    stats.kept = features.len();

    if stats.dropped_null + stats.dropped_invalid > 0 {
        warn!(
            path = origin,
            dropped_null = stats.dropped_null,
            dropped_invalid = stats.dropped_invalid,
            "Dropped features with null or invalid geometry"
        );
    }
    info!(
        path = origin,
        read = stats.read,
        kept = stats.kept,
        "Dataset loaded"
    );

    Ok((FeatureCollection::new(features), stats))
}

/// Construit un assentamento depuis les propriétés d'une feature
fn settlement_from_properties(props: Option<&JsonObject>, geometry: geo::Geometry) -> Settlement {
    let get = |key: &str| props.and_then(|p| p.get(key));
    let text = |field: TextField| coerce::text(get(field.key()));
    let number = |field: NumericField| coerce::number(get(field.key()));
    let date = |field: DateField| coerce::text(get(field.key()));

    Settlement {
        uf: text(TextField::Uf),
        municipio: text(TextField::Municipio),
        nome_pa: text(TextField::NomePa),
        cd_sipra: text(TextField::CdSipra),
        area_incra: number(NumericField::AreaIncra),
        area_polig: number(NumericField::AreaPolig),
        lotes: number(NumericField::Lotes),
        quant_fami: number(NumericField::QuantFami),
        fase: text(TextField::Fase),
        forma_obte: text(TextField::FormaObte),
        data_criac: date(DateField::DataCriac),
        data_obten: date(DateField::DataObten),
        geometry,
    }
}
