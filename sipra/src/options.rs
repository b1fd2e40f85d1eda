//! Données des sélecteurs (listes de valeurs, emprise de la sélection)

use std::collections::BTreeSet;

use chrono::NaiveDate;
use geo::{BoundingRect, Coord, Rect};

use crate::types::{FeatureCollection, TextField};

/// Seuils proposés pour le nombre de lots (et de familles)
pub const LOT_OPTIONS: [u32; 12] = [
    10, 50, 100, 300, 500, 800, 1200, 2000, 5000, 10000, 15000, 20000,
];

/// Seuils proposés pour le nombre de familles bénéficiaires
pub const FAMILY_OPTIONS: [u32; 12] = LOT_OPTIONS;

/// Seuils de surface proposés (hectares)
pub const AREA_OPTIONS: [u32; 10] = [
    500, 1000, 5000, 10000, 30000, 50000, 100000, 200000, 400000, 600000,
];

/// État sélectionné par défaut
pub const DEFAULT_STATE: &str = "PARANÁ";

/// Centre de carte par défaut (lat, lon) quand la sélection est vide
pub const DEFAULT_CENTER: (f64, f64) = (-24.0, -51.0);

/// Zoom par défaut
pub const DEFAULT_ZOOM: u8 = 7;

/// Plage du sélecteur de date
pub fn date_range() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2034, 12, 31).unwrap_or_default(),
    )
}

/// Valeurs distinctes non manquantes d'un attribut texte, triées
pub fn distinct_text(collection: &FeatureCollection, field: TextField) -> Vec<String> {
    collection
        .iter()
        .filter_map(|s| s.text(field))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// États disponibles
pub fn state_options(collection: &FeatureCollection) -> Vec<String> {
    distinct_text(collection, TextField::Uf)
}

/// Municipalités disponibles, restreintes à l'état choisi s'il y en a un
pub fn municipality_options(collection: &FeatureCollection, state: Option<&str>) -> Vec<String> {
    let state = state.filter(|s| !s.is_empty());
    collection
        .iter()
        .filter(|s| state.is_none() || s.uf.as_deref() == state)
        .filter_map(|s| s.municipio.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Index de l'état par défaut dans la liste des options (préfixée d'une entrée vide)
///
/// 0 (aucun état) si l'état par défaut est absent des données.
pub fn default_state_index(states: &[String]) -> usize {
    states
        .iter()
        .position(|s| s == DEFAULT_STATE)
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Emprise totale (minx, miny, maxx, maxy) de la collection
pub fn total_bounds(collection: &FeatureCollection) -> Option<Rect> {
    collection
        .iter()
        .filter_map(|s| s.geometry.bounding_rect())
        .reduce(|acc, r| {
            Rect::new(
                Coord {
                    x: acc.min().x.min(r.min().x),
                    y: acc.min().y.min(r.min().y),
                },
                Coord {
                    x: acc.max().x.max(r.max().x),
                    y: acc.max().y.max(r.max().y),
                },
            )
        })
}

/// Centre (lat, lon) de l'emprise, ou le centre par défaut
pub fn map_center(collection: &FeatureCollection) -> (f64, f64) {
    match total_bounds(collection) {
        Some(r) => {
            let c = r.center();
            (c.y, c.x)
        }
        None => DEFAULT_CENTER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Settlement;
    use geo::{polygon, Geometry};

    fn square(x0: f64, y0: f64) -> Geometry {
        Geometry::Polygon(polygon![
            (x: x0, y: y0),
            (x: x0 + 1.0, y: y0),
            (x: x0 + 1.0, y: y0 + 1.0),
            (x: x0, y: y0 + 1.0),
            (x: x0, y: y0),
        ])
    }

    fn settlement(uf: Option<&str>, municipio: Option<&str>, x0: f64, y0: f64) -> Settlement {
        let mut s = Settlement::new(square(x0, y0));
        s.uf = uf.map(str::to_string);
        s.municipio = municipio.map(str::to_string);
        s
    }

    fn sample() -> FeatureCollection {
        FeatureCollection::new(vec![
            settlement(Some("PARANÁ"), Some("PALMAS"), -52.0, -27.0),
            settlement(Some("SÃO PAULO"), Some("IARAS"), -49.0, -23.0),
            settlement(Some("PARANÁ"), Some("CANTAGALO"), -52.5, -25.5),
            settlement(None, Some("SEM UF"), -50.0, -24.0),
            settlement(Some("PARANÁ"), Some("PALMAS"), -51.9, -26.9),
        ])
    }

    #[test]
    fn test_state_options_sorted_unique() {
        assert_eq!(state_options(&sample()), vec!["PARANÁ", "SÃO PAULO"]);
    }

    #[test]
    fn test_municipality_options_cascade() {
        let c = sample();
        assert_eq!(
            municipality_options(&c, Some("PARANÁ")),
            vec!["CANTAGALO", "PALMAS"]
        );
        assert_eq!(
            municipality_options(&c, None),
            vec!["CANTAGALO", "IARAS", "PALMAS", "SEM UF"]
        );
        assert_eq!(municipality_options(&c, Some("")).len(), 4);
        assert!(municipality_options(&c, Some("BAHIA")).is_empty());
    }

    #[test]
    fn test_default_state_index() {
        let states = state_options(&sample());
        assert_eq!(default_state_index(&states), 1);
        assert_eq!(default_state_index(&["BAHIA".to_string()]), 0);
    }

    #[test]
    fn test_total_bounds() {
        let r = total_bounds(&sample()).unwrap();
        assert_eq!(r.min(), Coord { x: -52.5, y: -27.0 });
        assert_eq!(r.max(), Coord { x: -48.0, y: -22.0 });
    }

    #[test]
    fn test_empty_collection_uses_default_center() {
        let empty = FeatureCollection::new(vec![]);
        assert!(total_bounds(&empty).is_none());
        assert_eq!(map_center(&empty), DEFAULT_CENTER);
    }

    #[test]
    fn test_fixed_lists() {
        assert_eq!(LOT_OPTIONS.len(), 12);
        assert!(AREA_OPTIONS.windows(2).all(|w| w[0] < w[1]));
        let (min, max) = date_range();
        assert!(min < max);
    }
}
