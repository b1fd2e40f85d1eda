//! Tests d'intégration: fichier GeoJSON → filtres → exports

use std::path::PathBuf;

use sipra::export::{to_csv, to_geojson, CSV_COLUMNS};
use sipra::{apply_filters, DatasetCache, FilterSpec, LoadError, NumericField};

const FIXTURE: &str = r#"{
  "type": "FeatureCollection",
  "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::4674" } },
  "features": [
    {
      "type": "Feature",
      "properties": {
        "uf": "PR", "municipio": "PALMAS", "nome_pa": "PA Paraíso",
        "cd_sipra": "PR0001000", "area_incra": "1234.5", "area_polig": 1200.1,
        "lotes": 60, "quant_fami": 58, "fase": "Assentamento Consolidado",
        "data_criac": "1997-11-20", "forma_obte": "Desapropriação", "data_obten": "1997-05-02"
      },
      "geometry": { "type": "Polygon", "coordinates": [[
        [-52.0, -26.5], [-51.9, -26.5], [-51.9, -26.4], [-52.0, -26.4], [-52.0, -26.5]
      ]] }
    },
    {
      "type": "Feature",
      "properties": {
        "uf": "SP", "municipio": "IARAS", "nome_pa": "PA Zumbi",
        "area_incra": 30000, "area_polig": null, "lotes": 300, "quant_fami": 280,
        "data_criac": "2003-02-14"
      },
      "geometry": { "type": "MultiPolygon", "coordinates": [
        [[[-49.2, -22.9], [-49.1, -22.9], [-49.1, -22.8], [-49.2, -22.9]]],
        [[[-49.0, -22.9], [-48.9, -22.9], [-48.9, -22.8], [-49.0, -22.9]]]
      ] }
    },
    {
      "type": "Feature",
      "properties": {
        "uf": "PR", "municipio": "CANTAGALO", "nome_pa": "PA Recanto",
        "area_incra": "não informado", "area_polig": "85,5", "lotes": 12
      },
      "geometry": { "type": "Polygon", "coordinates": [[
        [-52.4, -25.4], [-52.3, -25.4], [-52.3, -25.3], [-52.4, -25.4]
      ]] }
    },
    {
      "type": "Feature",
      "properties": { "uf": "PR", "nome_pa": "sem geometria" },
      "geometry": null
    },
    {
      "type": "Feature",
      "properties": { "uf": "PR", "nome_pa": "gravata" },
      "geometry": { "type": "Polygon", "coordinates": [[
        [-52.0, -25.0], [-51.0, -24.0], [-51.0, -25.0], [-52.0, -24.0], [-52.0, -25.0]
      ]] }
    }
  ]
}"#;

/// Écrit la fixture dans un fichier temporaire unique
fn write_fixture(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sipra_{}_{}.geojson", name, std::process::id()));
    std::fs::write(&path, FIXTURE).unwrap();
    path
}

#[test]
fn test_load_real_file() {
    let path = write_fixture("load");
    let (collection, stats) = sipra::load_with_stats(&path).unwrap();

    assert_eq!(stats.read, 5);
    assert_eq!(stats.kept, 3);
    assert_eq!(stats.dropped_null, 1);
    assert_eq!(stats.dropped_invalid, 1);
    assert_eq!(stats.source_epsg, 4674);
    assert_eq!(collection.epsg, 4326);

    // "não informado" → manquant, sans faire échouer le chargement
    let recanto = &collection.features[2];
    assert_eq!(recanto.nome_pa.as_deref(), Some("PA Recanto"));
    assert_eq!(recanto.area_incra, None);
    assert_eq!(recanto.area_polig, Some(85.5));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_filter_by_state_keeps_order() {
    let path = write_fixture("state");
    let collection = sipra::load(&path).unwrap();

    let spec = FilterSpec::from_pairs([("uf", "PR")]).unwrap();
    let selected = apply_filters(&collection, &spec);

    let names: Vec<_> = selected.iter().filter_map(|s| s.nome_pa.as_deref()).collect();
    assert_eq!(names, vec!["PA Paraíso", "PA Recanto"]);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_identity_filter() {
    let path = write_fixture("identity");
    let collection = sipra::load(&path).unwrap();

    assert_eq!(apply_filters(&collection, &FilterSpec::new()), collection);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_min_bound_narrows_max_bound() {
    let path = write_fixture("bounds");
    let collection = sipra::load(&path).unwrap();

    let max_only = FilterSpec::new().max(NumericField::AreaIncra, 50000.0);
    let wide = apply_filters(&collection, &max_only);

    for min in [0.0, 1000.0, 2000.0, 40000.0] {
        let narrow = apply_filters(
            &collection,
            &max_only.clone().min(NumericField::AreaIncra, min),
        );
        assert!(narrow.iter().all(|s| wide.features.contains(s)));
    }

    // area_incra manquante: exclue par toute borne
    assert_eq!(wide.len(), 2);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_exports_of_selection() {
    let path = write_fixture("export");
    let collection = sipra::load(&path).unwrap();
    let selected = apply_filters(&collection, &FilterSpec::new().uf("PR"));

    let csv = String::from_utf8(to_csv(&selected, &CSV_COLUMNS).unwrap()).unwrap();
    assert_eq!(csv.lines().count(), selected.len() + 1);
    assert!(csv.starts_with("uf,municipio,cd_sipra,nome_pa,"));

    let geojson = to_geojson(&selected).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&geojson).unwrap();
    let features = doc["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    for f in features {
        let props = f["properties"].as_object().unwrap();
        assert_eq!(props.len(), 9);
        assert!(props.values().all(|v| !v.is_null()));
    }
    assert_eq!(features[1]["properties"]["area_incra"], "N/A");

    let first = &features[0]["geometry"]["coordinates"][0][0];
    assert!((first[0].as_f64().unwrap() - (-52.0)).abs() < 1e-9);
    assert!((first[1].as_f64().unwrap() - (-26.5)).abs() < 1e-9);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_cache_loads_once() {
    let path = write_fixture("cache");
    let cache = DatasetCache::new();

    let first = cache.get_or_load(&path).unwrap();

    // Le fichier disparaît: le cache sert toujours la même collection
    std::fs::remove_file(&path).unwrap();
    let second = cache.get_or_load(&path).unwrap();

    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 3);
}

#[test]
fn test_missing_file_is_load_error() {
    let cache = DatasetCache::new();
    let path = std::env::temp_dir().join("sipra_absent_pasbr_geo.geojson");

    let err = cache.get_or_load(&path).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}
