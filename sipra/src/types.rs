//! Types de données pour le crate sipra

use chrono::NaiveDate;
use geo::Geometry;

/// EPSG du système de coordonnées canonique (WGS84 géographique)
pub const WGS84_EPSG: u32 = 4326;

/// Un projet d'assentamento avec sa géométrie et ses attributs
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// Unité fédérative (ex: "PARANÁ")
    pub uf: Option<String>,

    /// Municipalité
    pub municipio: Option<String>,

    /// Nom du projet d'assentamento
    pub nome_pa: Option<String>,

    /// Code SIPRA
    pub cd_sipra: Option<String>,

    /// Surface déclarée au registre INCRA (hectares)
    pub area_incra: Option<f64>,

    /// Surface calculée depuis le polygone (hectares)
    pub area_polig: Option<f64>,

    /// Nombre de lots
    pub lotes: Option<f64>,

    /// Nombre de familles bénéficiaires
    pub quant_fami: Option<f64>,

    /// Phase de consolidation
    pub fase: Option<String>,

    /// Forme d'obtention du terrain
    pub forma_obte: Option<String>,

    /// Date de création, texte brut tel que lu
    pub data_criac: Option<String>,

    /// Date d'obtention, texte brut tel que lu
    pub data_obten: Option<String>,

    /// Polygon ou MultiPolygon en EPSG:4326
    pub geometry: Geometry,
}

impl Settlement {
    /// Crée un assentamento sans attributs
    pub fn new(geometry: Geometry) -> Self {
        Self {
            uf: None,
            municipio: None,
            nome_pa: None,
            cd_sipra: None,
            area_incra: None,
            area_polig: None,
            lotes: None,
            quant_fami: None,
            fase: None,
            forma_obte: None,
            data_criac: None,
            data_obten: None,
            geometry,
        }
    }

    pub fn text(&self, field: TextField) -> Option<&str> {
        let value = match field {
            TextField::Uf => &self.uf,
            TextField::Municipio => &self.municipio,
            TextField::NomePa => &self.nome_pa,
            TextField::CdSipra => &self.cd_sipra,
            TextField::Fase => &self.fase,
            TextField::FormaObte => &self.forma_obte,
        };
        value.as_deref()
    }

    pub fn number(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::AreaIncra => self.area_incra,
            NumericField::AreaPolig => self.area_polig,
            NumericField::Lotes => self.lotes,
            NumericField::QuantFami => self.quant_fami,
        }
    }

    /// Texte brut d'un champ date
    pub fn raw_date(&self, field: DateField) -> Option<&str> {
        match field {
            DateField::DataCriac => self.data_criac.as_deref(),
            DateField::DataObten => self.data_obten.as_deref(),
        }
    }

    /// Date interprétée, `None` si absente ou illisible
    pub fn date(&self, field: DateField) -> Option<NaiveDate> {
        self.raw_date(field).and_then(parse_date)
    }
}

/// Collection ordonnée d'assentamentos partageant le même schéma
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Settlement>,

    /// EPSG des coordonnées
    pub epsg: u32,
}

impl FeatureCollection {
    pub fn new(features: Vec<Settlement>) -> Self {
        Self {
            features,
            epsg: WGS84_EPSG,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Settlement> {
        self.features.iter()
    }
}

impl FromIterator<Settlement> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Settlement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Settlement;
    type IntoIter = std::slice::Iter<'a, Settlement>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

/// Attributs texte comparés par égalité
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Uf,
    Municipio,
    NomePa,
    CdSipra,
    Fase,
    FormaObte,
}

impl TextField {
    /// Nom de la propriété dans le GeoJSON source
    pub fn key(self) -> &'static str {
        match self {
            Self::Uf => "uf",
            Self::Municipio => "municipio",
            Self::NomePa => "nome_pa",
            Self::CdSipra => "cd_sipra",
            Self::Fase => "fase",
            Self::FormaObte => "forma_obte",
        }
    }
}

/// Attributs numériques
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    AreaIncra,
    AreaPolig,
    Lotes,
    QuantFami,
}

impl NumericField {
    pub fn key(self) -> &'static str {
        match self {
            Self::AreaIncra => "area_incra",
            Self::AreaPolig => "area_polig",
            Self::Lotes => "lotes",
            Self::QuantFami => "quant_fami",
        }
    }
}

/// Attributs date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    DataCriac,
    DataObten,
}

impl DateField {
    pub fn key(self) -> &'static str {
        match self {
            Self::DataCriac => "data_criac",
            Self::DataObten => "data_obten",
        }
    }
}

/// Formats de date rencontrés dans les exports SIPRA
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Interprète une date textuelle
///
/// Accepte aussi un horodatage ISO (`2005-03-14T00:00:00`), dont seule
/// la partie date est conservée.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }

    // "2005-03-14T00:00:00" ou "2005-03-14 00:00:00"
    let date_part = v.split(['T', ' ']).next().unwrap_or(v);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry};

    fn square() -> Geometry {
        Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ])
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2005, 3, 14);
        assert_eq!(parse_date("2005-03-14"), expected);
        assert_eq!(parse_date("2005/03/14"), expected);
        assert_eq!(parse_date("14/03/2005"), expected);
        assert_eq!(parse_date("2005-03-14T00:00:00"), expected);
        assert_eq!(parse_date(" 2005-03-14 12:30:00 "), expected);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("sem data"), None);
        assert_eq!(parse_date("2005-13-40"), None);
    }

    #[test]
    fn test_field_accessors() {
        let mut s = Settlement::new(square());
        s.uf = Some("PARANÁ".to_string());
        s.lotes = Some(42.0);
        s.data_criac = Some("1998-07-01".to_string());

        assert_eq!(s.text(TextField::Uf), Some("PARANÁ"));
        assert_eq!(s.text(TextField::Municipio), None);
        assert_eq!(s.number(NumericField::Lotes), Some(42.0));
        assert_eq!(s.number(NumericField::AreaIncra), None);
        assert_eq!(
            s.date(DateField::DataCriac),
            NaiveDate::from_ymd_opt(1998, 7, 1)
        );
        assert_eq!(s.date(DateField::DataObten), None);
    }

    #[test]
    fn test_collection_from_iter() {
        let c: FeatureCollection = (0..3).map(|_| Settlement::new(square())).collect();
        assert_eq!(c.len(), 3);
        assert_eq!(c.epsg, WGS84_EPSG);
        assert!(!c.is_empty());
    }
}
