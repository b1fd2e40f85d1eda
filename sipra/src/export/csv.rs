//! Export CSV de la table des assentamentos

use std::io::Write;

use crate::error::ExportError;
use crate::types::{FeatureCollection, Settlement};

/// Colonne exportable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Uf,
    Municipio,
    CdSipra,
    NomePa,
    Lotes,
    QuantFami,
    Fase,
    AreaIncra,
    AreaPolig,
    DataCriac,
    FormaObte,
    DataObten,
}

/// Projection fixe de la table exportée
pub const CSV_COLUMNS: [Column; 12] = [
    Column::Uf,
    Column::Municipio,
    Column::CdSipra,
    Column::NomePa,
    Column::Lotes,
    Column::QuantFami,
    Column::Fase,
    Column::AreaIncra,
    Column::AreaPolig,
    Column::DataCriac,
    Column::FormaObte,
    Column::DataObten,
];

impl Column {
    /// En-tête de la colonne
    pub fn header(self) -> &'static str {
        match self {
            Self::Uf => "uf",
            Self::Municipio => "municipio",
            Self::CdSipra => "cd_sipra",
            Self::NomePa => "nome_pa",
            Self::Lotes => "lotes",
            Self::QuantFami => "quant_fami",
            Self::Fase => "fase",
            Self::AreaIncra => "area_incra",
            Self::AreaPolig => "area_polig",
            Self::DataCriac => "data_criac",
            Self::FormaObte => "forma_obte",
            Self::DataObten => "data_obten",
        }
    }

    /// Valeur de la cellule, vide si manquante
    pub fn value(self, s: &Settlement) -> String {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let number = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();

        match self {
            Self::Uf => text(&s.uf),
            Self::Municipio => text(&s.municipio),
            Self::CdSipra => text(&s.cd_sipra),
            Self::NomePa => text(&s.nome_pa),
            Self::Lotes => number(s.lotes),
            Self::QuantFami => number(s.quant_fami),
            Self::Fase => text(&s.fase),
            Self::AreaIncra => number(s.area_incra),
            Self::AreaPolig => number(s.area_polig),
            Self::DataCriac => text(&s.data_criac),
            Self::FormaObte => text(&s.forma_obte),
            Self::DataObten => text(&s.data_obten),
        }
    }
}

/// Sérialise la collection en CSV UTF-8 avec en-tête
pub fn to_csv(collection: &FeatureCollection, columns: &[Column]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(&mut buf, collection, columns)?;
    Ok(buf)
}

/// Écrit la collection en CSV dans un flux, une ligne par assentamento
pub fn write_csv<W: Write>(
    writer: W,
    collection: &FeatureCollection,
    columns: &[Column],
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(columns.iter().map(|c| c.header()))?;
    for s in collection {
        wtr.write_record(columns.iter().map(|c| c.value(s)))?;
    }
    wtr.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry};

    fn settlement(name: &str) -> Settlement {
        let mut s = Settlement::new(Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]));
        s.uf = Some("PARANÁ".to_string());
        s.nome_pa = Some(name.to_string());
        s
    }

    #[test]
    fn test_header_and_row_count() {
        let c = FeatureCollection::new(vec![settlement("a"), settlement("b"), settlement("c")]);
        let bytes = to_csv(&c, &CSV_COLUMNS).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "uf,municipio,cd_sipra,nome_pa,lotes,quant_fami,fase,area_incra,area_polig,data_criac,forma_obte,data_obten"
        );
        assert_eq!(lines[1], "PARANÁ,,,a,,,,,,,,");
    }

    #[test]
    fn test_values_and_quoting() {
        let mut s = settlement("PA Vitória, Gleba 2");
        s.lotes = Some(70.0);
        s.area_incra = Some(1234.5);
        s.data_criac = Some("1998-06-08".to_string());

        let c = FeatureCollection::new(vec![s]);
        let text = String::from_utf8(to_csv(&c, &CSV_COLUMNS).unwrap()).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "PARANÁ,,,\"PA Vitória, Gleba 2\",70,,,1234.5,,1998-06-08,,");
    }

    #[test]
    fn test_empty_collection_has_header_only() {
        let text = String::from_utf8(to_csv(&FeatureCollection::new(vec![]), &CSV_COLUMNS).unwrap())
            .unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_custom_projection() {
        let c = FeatureCollection::new(vec![settlement("x")]);
        let text = String::from_utf8(to_csv(&c, &[Column::NomePa, Column::Uf]).unwrap()).unwrap();
        assert_eq!(text, "nome_pa,uf\nx,PARANÁ\n");
    }
}
