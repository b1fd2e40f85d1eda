//! Moteur de filtrage des assentamentos
//!
//! Un `FilterSpec` porte au plus une valeur par clé. Il est traduit en une
//! liste de `Predicate` évalués en conjonction, dans un ordre fixe.
//! Un enregistrement dont l'attribut filtré est manquant est exclu.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::FilterError;
use crate::types::{parse_date, DateField, FeatureCollection, NumericField, Settlement, TextField};

/// Prédicat élémentaire sur un assentamento
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `record[field] == value`
    Equals(TextField, String),
    /// `record[field] <= value`
    AtMost(NumericField, f64),
    /// `record[field] >= value`
    AtLeast(NumericField, f64),
    /// `date(record[field]) <= value`
    DateAtMost(DateField, NaiveDate),
}

impl Predicate {
    /// Évalue le prédicat; un attribut manquant ne satisfait jamais la condition
    pub fn matches(&self, s: &Settlement) -> bool {
        match self {
            Self::Equals(field, value) => s.text(*field) == Some(value.as_str()),
            Self::AtMost(field, bound) => s.number(*field).is_some_and(|v| v <= *bound),
            Self::AtLeast(field, bound) => s.number(*field).is_some_and(|v| v >= *bound),
            Self::DateAtMost(field, bound) => s.date(*field).is_some_and(|d| d <= *bound),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equals(field, value) => write!(f, "{} = {}", field.key(), value),
            Self::AtMost(field, bound) => write!(f, "{} <= {}", field.key(), bound),
            Self::AtLeast(field, bound) => write!(f, "{} >= {}", field.key(), bound),
            Self::DateAtMost(field, bound) => write!(f, "{} <= {}", field.key(), bound),
        }
    }
}

/// Valeurs de filtre choisies par l'utilisateur
///
/// Chaque champ `None` est sans effet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub uf: Option<String>,
    pub municipio: Option<String>,
    pub nome_pa: Option<String>,
    pub cd_sipra: Option<String>,
    pub fase: Option<String>,
    pub forma_obte: Option<String>,
    pub data_criac: Option<NaiveDate>,
    pub data_obten: Option<NaiveDate>,
    pub lotes_max: Option<f64>,
    pub quant_fami_max: Option<f64>,
    pub area_incra_max: Option<f64>,
    pub area_incra_min: Option<f64>,
    pub area_polig_max: Option<f64>,
    pub area_polig_min: Option<f64>,
}

/// Chaîne vide → pas de contrainte
fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, field: TextField, value: impl Into<String>) -> Self {
        let value = non_empty(value);
        match field {
            TextField::Uf => self.uf = value,
            TextField::Municipio => self.municipio = value,
            TextField::NomePa => self.nome_pa = value,
            TextField::CdSipra => self.cd_sipra = value,
            TextField::Fase => self.fase = value,
            TextField::FormaObte => self.forma_obte = value,
        }
        self
    }

    pub fn uf(self, value: impl Into<String>) -> Self {
        self.with_text(TextField::Uf, value)
    }

    pub fn municipio(self, value: impl Into<String>) -> Self {
        self.with_text(TextField::Municipio, value)
    }

    /// Borne supérieure inclusive sur une date
    pub fn date_until(mut self, field: DateField, value: NaiveDate) -> Self {
        match field {
            DateField::DataCriac => self.data_criac = Some(value),
            DateField::DataObten => self.data_obten = Some(value),
        }
        self
    }

    /// Borne supérieure inclusive sur un attribut numérique
    pub fn max(mut self, field: NumericField, value: f64) -> Self {
        match field {
            NumericField::AreaIncra => self.area_incra_max = Some(value),
            NumericField::AreaPolig => self.area_polig_max = Some(value),
            NumericField::Lotes => self.lotes_max = Some(value),
            NumericField::QuantFami => self.quant_fami_max = Some(value),
        }
        self
    }

    /// Borne inférieure inclusive (surfaces uniquement)
    ///
    /// Les lots et familles n'ont pas de minimum: la valeur est ignorée.
    pub fn min(mut self, field: NumericField, value: f64) -> Self {
        match field {
            NumericField::AreaIncra => self.area_incra_min = Some(value),
            NumericField::AreaPolig => self.area_polig_min = Some(value),
            NumericField::Lotes | NumericField::QuantFami => {
                debug!(field = field.key(), "No minimum bound for this field, ignored");
            }
        }
        self
    }

    /// Construit un filtre depuis des paires clé/valeur textuelles
    ///
    /// Clés inconnues ignorées, valeurs vides sans effet. `area_incra` et
    /// `area_polig` seules sont des bornes maximales.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut spec = Self::default();

        for (key, value) in pairs {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }

            spec = match key {
                "uf" => spec.with_text(TextField::Uf, value),
                "municipio" => spec.with_text(TextField::Municipio, value),
                "nome_pa" => spec.with_text(TextField::NomePa, value),
                "cd_sipra" => spec.with_text(TextField::CdSipra, value),
                "fase" => spec.with_text(TextField::Fase, value),
                "forma_obte" => spec.with_text(TextField::FormaObte, value),
                "data_criac" => spec.date_until(DateField::DataCriac, date_value(key, value)?),
                "data_obten" => spec.date_until(DateField::DataObten, date_value(key, value)?),
                "lotes" | "lotes_max" => spec.max(NumericField::Lotes, number_value(key, value)?),
                "quant_fami" | "quant_fami_max" => {
                    spec.max(NumericField::QuantFami, number_value(key, value)?)
                }
                "area_incra" | "area_incra_max" => {
                    spec.max(NumericField::AreaIncra, number_value(key, value)?)
                }
                "area_incra_min" => spec.min(NumericField::AreaIncra, number_value(key, value)?),
                "area_polig" | "area_polig_max" => {
                    spec.max(NumericField::AreaPolig, number_value(key, value)?)
                }
                "area_polig_min" => spec.min(NumericField::AreaPolig, number_value(key, value)?),
                _ => {
                    debug!(key, "Unknown filter key, ignored");
                    spec
                }
            };
        }

        Ok(spec)
    }

    /// Vrai si aucun filtre n'est actif
    pub fn is_empty(&self) -> bool {
        self.predicates().is_empty()
    }

    /// Prédicats actifs, dans l'ordre d'évaluation
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        let texts = [
            (TextField::Uf, &self.uf),
            (TextField::Municipio, &self.municipio),
            (TextField::NomePa, &self.nome_pa),
            (TextField::CdSipra, &self.cd_sipra),
            (TextField::Fase, &self.fase),
            (TextField::FormaObte, &self.forma_obte),
        ];
        for (field, value) in texts {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                predicates.push(Predicate::Equals(field, v.to_string()));
            }
        }

        for (field, value) in [
            (DateField::DataCriac, self.data_criac),
            (DateField::DataObten, self.data_obten),
        ] {
            if let Some(d) = value {
                predicates.push(Predicate::DateAtMost(field, d));
            }
        }

        let bounds = [
            (NumericField::Lotes, self.lotes_max, None),
            (NumericField::QuantFami, self.quant_fami_max, None),
            (NumericField::AreaIncra, self.area_incra_max, self.area_incra_min),
            (NumericField::AreaPolig, self.area_polig_max, self.area_polig_min),
        ];
        for (field, max, min) in bounds {
            if let Some(max) = max {
                predicates.push(Predicate::AtMost(field, max));
            }
            if let Some(min) = min {
                predicates.push(Predicate::AtLeast(field, min));
            }
        }

        predicates
    }
}

/// Applique les filtres et retourne le sous-ensemble, dans l'ordre d'origine
///
/// La collection source n'est jamais modifiée.
pub fn apply_filters(collection: &FeatureCollection, spec: &FilterSpec) -> FeatureCollection {
    let predicates = spec.predicates();

    let features: Vec<Settlement> = collection
        .iter()
        .filter(|s| predicates.iter().all(|p| p.matches(s)))
        .cloned()
        .collect();

    debug!(
        filters = predicates.len(),
        input = collection.len(),
        output = features.len(),
        "Filters applied"
    );

    FeatureCollection {
        features,
        epsg: collection.epsg,
    }
}

fn number_value(key: &str, value: &str) -> Result<f64, FilterError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FilterError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "a number",
        })
}

fn date_value(key: &str, value: &str) -> Result<NaiveDate, FilterError> {
    parse_date(value).ok_or_else(|| FilterError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: "a date (YYYY-MM-DD)",
    })
}
