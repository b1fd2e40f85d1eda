//! Formatage pour l'affichage (surfaces, infobulles)

use crate::types::Settlement;

/// Valeur affichée pour une donnée manquante
pub const MISSING: &str = "N/A";

/// Formate une surface à la brésilienne: 4 décimales, `.` pour les milliers,
/// `,` pour les décimales
///
/// - 1234.5 → "1.234,5000"
/// - 0 → "0,0000"
pub fn format_area(area: f64) -> String {
    if !area.is_finite() {
        return MISSING.to_string();
    }

    let fixed = format!("{:.4}", area.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "0000"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    // Le signe est conservé même quand l'arrondi donne zéro ("-0,0000")
    let sign = if area.is_sign_negative() { "-" } else { "" };
    format!("{}{},{}", sign, grouped, frac_part)
}

/// Rend un nombre sans décimales superflues (70.0 → "70")
pub fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}", v),
        _ => MISSING.to_string(),
    }
}

/// Infobulle HTML d'un assentamento
///
/// Surfaces manquantes affichées comme 0.
pub fn tooltip_html(s: &Settlement) -> String {
    let text = |v: &Option<String>| escape_html(v.as_deref().unwrap_or(MISSING));

    format!(
        "<b>{} (Assentamento)</b><br>\
         Área: {} hectares<br>\
         Área (segundo polígono): {} hectares<br>\
         Lotes: {}<br>\
         Famílias: {}<br>\
         Fase: {}<br>\
         Data de criação: {}<br>\
         Forma de obtenção: {}<br>\
         Data de obtenção: {}",
        text(&s.nome_pa),
        format_area(s.area_incra.unwrap_or(0.0)),
        format_area(s.area_polig.unwrap_or(0.0)),
        format_number(s.lotes),
        format_number(s.quant_fami),
        text(&s.fase),
        text(&s.data_criac),
        text(&s.forma_obte),
        text(&s.data_obten),
    )
}

/// Échappe une chaîne pour HTML
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}
