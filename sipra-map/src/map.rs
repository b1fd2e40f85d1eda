//! Page HTML de la carte interactive (Leaflet)
//!
//! La page est autonome: les données sont embarquées en GeoJSON, le rendu
//! des tuiles est délégué à Leaflet.

use geojson::{Feature, FeatureCollection, JsonObject};
use sipra::format::{escape_html, tooltip_html};
use sipra::options::total_bounds;

use crate::config::MapConfig;

/// Titre de la page
pub const PAGE_TITLE: &str =
    "Mapa interativo com os projetos de assentamento de reforma agrária no Brasil";

/// Portail des données ouvertes SIPRA
pub const SOURCE_URL: &str = "https://dados.gov.br/dados/conjuntos-dados/sistema-de-informacoes-de-projetos-de-reforma-agraria---sipra";

/// Message affiché quand la sélection est vide
pub const EMPTY_SELECTION: &str = "Nenhum resultado encontrado para os filtros selecionados.";

const LAYER_COLORS: [&str; 5] = ["#e6550d", "#31a354", "#756bb1", "#636363", "#de2d26"];

/// Contenu d'une carte
pub struct MapView<'a> {
    pub selection: &'a sipra::FeatureCollection,
    pub layers: &'a [(String, FeatureCollection)],
    pub config: &'a MapConfig,
}

/// Sélection en GeoJSON, avec l'infobulle de chaque assentamento
pub fn selection_geojson(selection: &sipra::FeatureCollection) -> FeatureCollection {
    let features = selection
        .iter()
        .map(|s| {
            let mut properties = JsonObject::new();
            properties.insert("tooltip".to_string(), tooltip_html(s).into());
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&s.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// JSON sûr à l'intérieur d'une balise <script>
fn script_json(fc: &FeatureCollection) -> String {
    fc.to_string().replace("</", "<\\/")
}

fn js_string(s: &str) -> String {
    serde_json::Value::from(s).to_string().replace("</", "<\\/")
}

/// Génère la page HTML complète
pub fn render_page(view: &MapView) -> String {
    let config = view.config;
    let bounds = total_bounds(view.selection);

    let view_js = match bounds {
        Some(r) => {
            let c = r.center();
            format!(
                "map.setView([{}, {}], {});\nmap.fitBounds([[{}, {}], [{}, {}]]);",
                c.y,
                c.x,
                config.selection_zoom,
                r.min().y,
                r.min().x,
                r.max().y,
                r.max().x
            )
        }
        None => format!(
            "map.setView([{}, {}], {});",
            config.center[0], config.center[1], config.zoom
        ),
    };

    let mut layers_js = String::new();
    for (i, (name, fc)) in view.layers.iter().enumerate() {
        layers_js.push_str(&format!(
            "overlays[{}] = L.geoJSON({}, {{ style: {{ color: '{}', weight: 1 }} }}).addTo(map);\n",
            js_string(name),
            script_json(fc),
            LAYER_COLORS[i % LAYER_COLORS.len()]
        ));
    }

    let warning = if bounds.is_none() {
        format!("<p class=\"warning\">{}</p>", EMPTY_SELECTION)
    } else {
        String::new()
    };

    format!(
        r#"<!doctype html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <style>
    body {{ margin: 0; font-family: sans-serif; }}
    header {{ padding: 8px 16px; }}
    h1 {{ font-size: 1.3em; margin: 4px 0; }}
    .warning {{ color: #8a6d3b; background: #fcf8e3; padding: 6px; }}
    #map {{ position: absolute; top: 110px; bottom: 0; width: 100%; }}
  </style>
</head>
<body>
  <header>
    <h1>{title}</h1>
    <p>(As informações exibidas neste site são públicas e estão disponíveis no <a href="{source}">Portal de Dados Abertos</a>)</p>
    {warning}
  </header>
  <div id="map"></div>
  <script>
    var map = L.map('map');
    L.tileLayer({tile_url}, {{ attribution: {attribution} }}).addTo(map);
    var selection = L.geoJSON({selection}, {{
      onEachFeature: function (feature, layer) {{
        layer.bindTooltip(feature.properties.tooltip);
      }}
    }}).addTo(map);
    var overlays = {{}};
{layers}    L.control.layers(null, overlays).addTo(map);
    {view}
  </script>
</body>
</html>
"#,
        title = escape_html(PAGE_TITLE),
        source = SOURCE_URL,
        warning = warning,
        tile_url = js_string(&config.tile_url),
        attribution = js_string(&config.attribution),
        selection = script_json(&selection_geojson(view.selection)),
        layers = layers_js,
        view = view_js,
    )
}
