//! Détection du système de coordonnées source
//!
//! RFC 7946 impose WGS84, mais les exports SIPRA portent souvent encore
//! le membre `crs` de l'ancienne spécification GeoJSON 2008:
//! `{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::4674"}}`

use geojson::JsonObject;

use crate::types::WGS84_EPSG;

/// Retourne l'EPSG déclaré par le membre `crs`, ou 4326 en son absence
///
/// `Err` porte le nom de CRS illisible.
pub fn source_epsg(foreign_members: Option<&JsonObject>) -> Result<u32, String> {
    let Some(crs) = foreign_members.and_then(|m| m.get("crs")) else {
        return Ok(WGS84_EPSG);
    };
    if crs.is_null() {
        return Ok(WGS84_EPSG);
    }

    let name = crs
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .ok_or_else(|| crs.to_string())?;

    parse_crs_name(name).ok_or_else(|| name.to_string())
}

/// Interprète un nom de CRS
///
/// - "urn:ogc:def:crs:EPSG::4674" → 4674
/// - "urn:ogc:def:crs:EPSG:6.6:4674" → 4674
/// - "EPSG:31982" → 31982
/// - "urn:ogc:def:crs:OGC:1.3:CRS84" → 4326
pub fn parse_crs_name(name: &str) -> Option<u32> {
    let v = name.trim();
    let upper = v.to_ascii_uppercase();

    if upper.ends_with("CRS84") {
        return Some(WGS84_EPSG);
    }

    if !upper.contains("EPSG") {
        return None;
    }

    v.rsplit(':').next()?.trim().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn members(crs: serde_json::Value) -> JsonObject {
        let mut m = JsonObject::new();
        m.insert("crs".to_string(), crs);
        m
    }

    #[test]
    fn test_parse_crs_name() {
        assert_eq!(parse_crs_name("urn:ogc:def:crs:EPSG::4674"), Some(4674));
        assert_eq!(parse_crs_name("urn:ogc:def:crs:EPSG:6.6:4674"), Some(4674));
        assert_eq!(parse_crs_name("EPSG:31982"), Some(31982));
        assert_eq!(parse_crs_name("urn:ogc:def:crs:OGC:1.3:CRS84"), Some(4326));
        assert_eq!(parse_crs_name("SIRGAS 2000"), None);
        assert_eq!(parse_crs_name("EPSG:abc"), None);
    }

    #[test]
    fn test_source_epsg_default() {
        assert_eq!(source_epsg(None), Ok(4326));
        assert_eq!(source_epsg(Some(&JsonObject::new())), Ok(4326));
        assert_eq!(source_epsg(Some(&members(serde_json::Value::Null))), Ok(4326));
    }

    #[test]
    fn test_source_epsg_named() {
        let m = members(json!({
            "type": "name",
            "properties": { "name": "urn:ogc:def:crs:EPSG::4674" }
        }));
        assert_eq!(source_epsg(Some(&m)), Ok(4674));
    }

    #[test]
    fn test_source_epsg_unreadable() {
        let m = members(json!({ "type": "link", "properties": { "href": "x" } }));
        assert!(source_epsg(Some(&m)).is_err());

        let m = members(json!({
            "type": "name",
            "properties": { "name": "SIRGAS 2000" }
        }));
        assert_eq!(source_epsg(Some(&m)), Err("SIRGAS 2000".to_string()));
    }
}
