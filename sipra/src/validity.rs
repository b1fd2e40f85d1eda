//! Validité des géométries surfaciques (règles OGC simple features)
//!
//! Un polygone est valide si:
//! - chaque ring est fermé, a au moins 4 coordonnées finies
//! - aucun ring ne s'auto-intersecte
//! - les trous sont à l'intérieur de l'enveloppe extérieure sans la croiser
//! - les trous ne se croisent pas et ne s'emboîtent pas
//! - sa surface est non nulle
//!
//! Les membres d'un MultiPolygon sont valides et leurs intérieurs disjoints
//! (contact ponctuel seulement).

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BoundingRect, Contains, Coord, Geometry, Line, LineString, MultiPolygon, Point, Polygon, Rect};

/// Vérifie la validité d'une géométrie surfacique
///
/// Les géométries non surfaciques (points, lignes) ne sont jamais valides ici.
pub fn is_valid(geom: &Geometry) -> bool {
    match geom {
        Geometry::Polygon(p) => polygon_ok(p),
        Geometry::MultiPolygon(mp) => multipolygon_ok(mp),
        _ => false,
    }
}

fn polygon_ok(p: &Polygon) -> bool {
    if !ring_ok(p.exterior()) || !p.interiors().iter().all(ring_ok) {
        return false;
    }

    if p.unsigned_area() <= 0.0 {
        return false;
    }

    let shell = Polygon::new(p.exterior().clone(), vec![]);
    let holes_in_shell = p.interiors().iter().all(|hole| {
        !rings_cross(p.exterior(), hole)
            && hole
                .0
                .iter()
                .any(|c| shell.contains(&Point::from(*c)))
    });
    if !holes_in_shell {
        return false;
    }

    let holes = p.interiors();
    for (i, a) in holes.iter().enumerate() {
        for b in &holes[i + 1..] {
            if rings_cross(a, b) || ring_inside(a, b) || ring_inside(b, a) {
                return false;
            }
        }
    }
    true
}

fn multipolygon_ok(mp: &MultiPolygon) -> bool {
    if mp.0.is_empty() || !mp.0.iter().all(polygon_ok) {
        return false;
    }

    let bounds: Vec<Option<Rect>> = mp.0.iter().map(|p| p.bounding_rect()).collect();
    for i in 0..mp.0.len() {
        for j in (i + 1)..mp.0.len() {
            let (Some(ra), Some(rb)) = (bounds[i], bounds[j]) else {
                continue;
            };
            if rects_disjoint(ra, rb) {
                continue;
            }
            if interiors_meet(&mp.0[i], &mp.0[j]) {
                return false;
            }
        }
    }
    true
}

/// Vrai si les intérieurs de deux polygones valides se rencontrent
fn interiors_meet(a: &Polygon, b: &Polygon) -> bool {
    rings_cross(a.exterior(), b.exterior())
        || a.exterior().0.iter().any(|c| b.contains(&Point::from(*c)))
        || b.exterior().0.iter().any(|c| a.contains(&Point::from(*c)))
}

/// Vrai si un sommet de `inner` est strictement à l'intérieur de `outer`
fn ring_inside(inner: &LineString, outer: &LineString) -> bool {
    let area = Polygon::new(outer.clone(), vec![]);
    inner.0.iter().any(|c| area.contains(&Point::from(*c)))
}

fn rects_disjoint(a: Rect, b: Rect) -> bool {
    a.max().x < b.min().x || b.max().x < a.min().x || a.max().y < b.min().y || b.max().y < a.min().y
}

fn ring_ok(r: &LineString) -> bool {
    // LinearRing: >= 4 points, first == last
    if r.0.len() < 4 {
        return false;
    }
    if !r.0.iter().all(|c| c.x.is_finite() && c.y.is_finite()) {
        return false;
    }
    match (r.0.first(), r.0.last()) {
        (Some(a), Some(b)) if a == b => {}
        _ => return false,
    }
    !self_intersects(r)
}

fn segments(r: &LineString) -> Vec<Line> {
    r.lines().filter(|l| l.start != l.end).collect()
}

/// Détecte une auto-intersection dans un ring fermé
fn self_intersects(r: &LineString) -> bool {
    let segs = segments(r);
    let n = segs.len();
    if n < 3 {
        return true;
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(segs[i], segs[j]) {
                None => {}
                // Segments consécutifs: seul le sommet commun est autorisé
                Some(LineIntersection::SinglePoint { intersection, .. }) if adjacent => {
                    if !is_shared_vertex(&segs[i], &segs[j], intersection) {
                        return true;
                    }
                }
                Some(_) => return true,
            }
        }
    }
    false
}

fn is_shared_vertex(a: &Line, b: &Line, at: Coord) -> bool {
    let shared = if a.end == b.start {
        a.end
    } else if b.end == a.start {
        b.end
    } else {
        return false;
    };
    shared == at
}

/// Vrai si deux rings se croisent (contact ponctuel toléré)
fn rings_cross(a: &LineString, b: &LineString) -> bool {
    let segs_a = segments(a);
    let segs_b = segments(b);
    segs_a.iter().any(|sa| {
        segs_b.iter().any(|sb| match line_intersection(*sa, *sb) {
            Some(LineIntersection::SinglePoint { is_proper, .. }) => is_proper,
            Some(LineIntersection::Collinear { .. }) => true,
            None => false,
        })
    })
}
