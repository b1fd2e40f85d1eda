//! Export vers GeoJSON avec geozero (streaming)
//!
//! Chaque feature porte sa géométrie et une liste fixe de neuf propriétés.
//! Une propriété manquante vaut `"N/A"`.

use std::io::Write;

use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use serde_json::Value;

use crate::error::ExportError;
use crate::format::MISSING;
use crate::types::{FeatureCollection, Settlement};

/// Propriétés exportées, dans l'ordre d'écriture
pub const EXPORTED_PROPERTIES: [&str; 9] = [
    "nome_pa",
    "area_incra",
    "area_polig",
    "lotes",
    "quant_fami",
    "fase",
    "data_criac",
    "forma_obte",
    "data_obten",
];

/// Sérialise une collection en document GeoJSON
pub fn to_geojson(collection: &FeatureCollection) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_geojson(&mut buf, collection)?;
    // Écrit uniquement de l'UTF-8 (serde_json, geozero)
    String::from_utf8(buf).map_err(|e| {
        ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Écrit une collection en GeoJSON dans un flux
pub fn write_geojson<W: Write>(
    writer: &mut W,
    collection: &FeatureCollection,
) -> Result<(), ExportError> {
    write!(writer, r#"{{"type":"FeatureCollection","features":["#)?;

    for (i, settlement) in collection.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, settlement)?;
    }

    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(())
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, s: &Settlement) -> Result<(), ExportError> {
    write!(writer, r#"{{"type":"Feature","geometry":"#)?;

    // Geometry via geozero
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    s.geometry.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(writer, r#","properties":{{"#)?;
    for (i, (key, value)) in EXPORTED_PROPERTIES
        .iter()
        .zip(property_values(s))
        .enumerate()
    {
        if i > 0 {
            write!(writer, ",")?;
        }
        serde_json::to_writer(&mut *writer, key)?;
        write!(writer, ":")?;
        serde_json::to_writer(&mut *writer, &value)?;
    }
    write!(writer, "}}}}")?;

    Ok(())
}

/// Valeurs des propriétés exportées, dans l'ordre de `EXPORTED_PROPERTIES`
fn property_values(s: &Settlement) -> [Value; 9] {
    let text = |v: &Option<String>| match v {
        Some(v) => Value::String(v.clone()),
        None => Value::String(MISSING.to_string()),
    };
    let number = |v: Option<f64>| match v.and_then(serde_json::Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(MISSING.to_string()),
    };
    // Lotes et familles sont des effectifs: entiers quand la valeur l'est
    let count = |v: Option<f64>| match v {
        Some(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Value::Number((n as i64).into()),
        other => number(other),
    };

    [
        text(&s.nome_pa),
        number(s.area_incra),
        number(s.area_polig),
        count(s.lotes),
        count(s.quant_fami),
        text(&s.fase),
        text(&s.data_criac),
        text(&s.forma_obte),
        text(&s.data_obten),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry, MultiPolygon};

    fn settlement() -> Settlement {
        let mut s = Settlement::new(Geometry::Polygon(polygon![
            (x: -51.25, y: -24.5),
            (x: -51.0, y: -24.5),
            (x: -51.0, y: -24.25),
            (x: -51.25, y: -24.5),
        ]));
        s.uf = Some("PARANÁ".to_string());
        s.nome_pa = Some("PA \"Novo\" Horizonte".to_string());
        s.area_incra = Some(1234.5);
        s.lotes = Some(70.0);
        s.fase = Some("Assentamento Criado".to_string());
        s
    }

    #[test]
    fn test_export_properties() {
        let c = FeatureCollection::new(vec![settlement()]);
        let json = to_geojson(&c).unwrap();

        let doc: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(doc["type"], "FeatureCollection");

        let props = doc["features"][0]["properties"].as_object().unwrap();
        assert_eq!(props.len(), 9);
        assert!(props.values().all(|v| !v.is_null()));
        assert_eq!(props["nome_pa"], "PA \"Novo\" Horizonte");
        assert_eq!(props["area_incra"], 1234.5);
        assert_eq!(props["area_polig"], "N/A");
        assert!(props["lotes"].is_i64());
        assert_eq!(props["lotes"], 70);
        assert_eq!(props["data_obten"], "N/A");
        // uf n'est pas exporté
        assert!(props.get("uf").is_none());
    }

    #[test]
    fn test_counts_written_as_integers() {
        let mut s = settlement();
        s.quant_fami = Some(12.5);
        let json = to_geojson(&FeatureCollection::new(vec![s])).unwrap();

        assert!(json.contains(r#""lotes":70,"#));
        assert!(json.contains(r#""quant_fami":12.5"#));
        assert!(json.contains(r#""area_incra":1234.5"#));
    }

    #[test]
    fn test_export_geometry_coordinates() {
        let c = FeatureCollection::new(vec![settlement()]);
        let json = to_geojson(&c).unwrap();

        let ::geojson::GeoJson::FeatureCollection(parsed) = json.parse::<::geojson::GeoJson>().unwrap() else {
            panic!("Expected FeatureCollection");
        };
        let geom = parsed.features[0].geometry.clone().unwrap();
        let back: Geometry = geom.try_into().unwrap();
        assert_eq!(back, c.features[0].geometry);
    }

    #[test]
    fn test_export_multipolygon() {
        let mut s = settlement();
        let Geometry::Polygon(p) = s.geometry.clone() else {
            unreachable!()
        };
        s.geometry = Geometry::MultiPolygon(MultiPolygon::new(vec![p]));

        let json = to_geojson(&FeatureCollection::new(vec![s])).unwrap();
        assert!(json.contains("MultiPolygon"));
    }

    #[test]
    fn test_export_empty_and_deterministic() {
        let empty = to_geojson(&FeatureCollection::new(vec![])).unwrap();
        assert_eq!(empty, r#"{"type":"FeatureCollection","features":[]}"#);

        let c = FeatureCollection::new(vec![settlement(), settlement()]);
        assert_eq!(to_geojson(&c).unwrap(), to_geojson(&c).unwrap());
    }
}
