//! Coercition des propriétés GeoJSON vers les types du modèle
//!
//! Politique best-effort: une valeur illisible devient `None`, jamais une erreur.

use serde_json::Value;

/// Lit une propriété texte
///
/// - chaîne: trimée, vide → `None`
/// - nombre: rendu en texte (`41001.0` → `"41001"`)
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let v = s.trim();
            if v.is_empty() {
                None
            } else {
                Some(v.to_string())
            }
        }
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{}", f as i64))
            }
            (None, Some(f)) if f.is_finite() => Some(f.to_string()),
            _ => None,
        },
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Lit une propriété numérique
///
/// Accepte les nombres JSON et les chaînes numériques, y compris avec
/// virgule décimale (`"1234,5"`). Les valeurs non finies sont manquantes.
pub fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse un nombre textuel
///
/// - "1234.5" → 1234.5
/// - "1234,5" → 1234.5
/// - "+12" → 12.0
/// - "n/d" → None
fn parse_number(raw: &str) -> Option<f64> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }

    if let Ok(n) = v.parse::<f64>() {
        return Some(n);
    }

    // Virgule décimale seule (pas de séparateur de milliers)
    if v.matches(',').count() == 1 && !v.contains('.') {
        return v.replace(',', ".").parse::<f64>().ok();
    }

    None
}
