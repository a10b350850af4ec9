//! Polygon overlap via integer polygon clipping.
//!
//! Contours are truncated to `i64` coordinates and intersected with Clipper
//! (through `geo-clipper`), the same integer representation the clipping
//! library works in natively. Every result contour contributes its unsigned
//! area to the intersection.

use crate::types::{Point, Polygon};
use geo::{Area, Coord, LineString, MapCoords, MultiPolygon};
use geo_clipper::ClipperInt;
use tracing::trace;

type ClipPolygon = geo::Polygon<i64>;

/// Convert a contour to the integer clipping representation.
///
/// Returns `None` for contours that cannot enclose an area.
fn to_clip_polygon(points: &[Point]) -> Option<ClipPolygon> {
    if points.len() < 3 || points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return None;
    }

    let coords: Vec<Coord<i64>> = points
        .iter()
        .map(|p| Coord {
            x: p.x.trunc() as i64,
            y: p.y.trunc() as i64,
        })
        .collect();

    Some(ClipPolygon::new(LineString::from(coords), vec![]))
}

fn clip_area(polygon: &ClipPolygon) -> f64 {
    polygon
        .map_coords(|c| Coord {
            x: c.x as f64,
            y: c.y as f64,
        })
        .unsigned_area()
}

fn clip_multi_area(polygons: &MultiPolygon<i64>) -> f64 {
    polygons.0.iter().map(clip_area).sum()
}

/// Intersection over Union between two simple polygons.
///
/// Degenerate input (fewer than three points, non-finite coordinates, zero
/// area, or a clip that yields nothing usable) scores 0.0 instead of failing.
///
/// # Example
///
/// ```
/// use roi_eval::metrics::polygon::polygon_iou;
/// use roi_eval::types::{Polygon, Rect};
///
/// let a = Polygon::from(Rect::new(0.0, 0.0, 10.0, 10.0));
/// let b = Polygon::from(Rect::new(5.0, 0.0, 10.0, 10.0));
/// let iou = polygon_iou(&a, &b);
/// assert!((iou - 1.0 / 3.0).abs() < 1e-9);
/// ```
pub fn polygon_iou(polygon1: &Polygon, polygon2: &Polygon) -> f64 {
    let (Some(clip1), Some(clip2)) = (
        to_clip_polygon(&polygon1.points),
        to_clip_polygon(&polygon2.points),
    ) else {
        trace!("degenerate polygon contour, scoring 0");
        return 0.0;
    };

    let area1 = clip_area(&clip1);
    let area2 = clip_area(&clip2);
    if area1 <= 0.0 || area2 <= 0.0 {
        trace!(area1, area2, "zero-area polygon, scoring 0");
        return 0.0;
    }

    let solution = clip1.intersection(&clip2);
    let intersection_area = clip_multi_area(&solution);
    let union_area = area1 + area2 - intersection_area;

    if !intersection_area.is_finite() || union_area <= 0.0 {
        trace!(intersection_area, union_area, "unusable clip result, scoring 0");
        return 0.0;
    }

    (intersection_area / union_area).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rect;

    fn triangle(offset: f64) -> Polygon {
        Polygon::new(vec![
            Point::new(offset, 0.0),
            Point::new(offset + 20.0, 0.0),
            Point::new(offset, 20.0),
        ])
    }

    #[test]
    fn test_identical_polygons() {
        let t = triangle(0.0);
        assert!((polygon_iou(&t, &t) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_polygons() {
        assert_eq!(polygon_iou(&triangle(0.0), &triangle(100.0)), 0.0);
    }

    #[test]
    fn test_triangle_inside_square() {
        // Triangle area 200, square area 400, triangle fully contained.
        let square = Polygon::from(Rect::new(0.0, 0.0, 20.0, 20.0));
        let iou = polygon_iou(&triangle(0.0), &square);
        assert!((iou - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_concave_polygon_overlap() {
        // U shape: 30x30 square with a 10x20 notch cut from the top middle.
        let u_shape = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 20.0),
            Point::new(20.0, 20.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(0.0, 30.0),
        ]);
        assert!((polygon_iou(&u_shape, &u_shape) - 1.0).abs() < 1e-12);

        // Horizontal bar crossing both arms: the notch splits the intersection
        // into two contours of 10x10 each.
        let bar = Polygon::from(Rect::new(0.0, 5.0, 30.0, 10.0));
        let iou = polygon_iou(&u_shape, &bar);
        let expected = 200.0 / (700.0 + 300.0 - 200.0);
        assert!((iou - expected).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_polygons_score_zero() {
        let line = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
        let collinear = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 10.0),
        ]);
        let with_nan = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 0.0),
            Point::new(0.0, 10.0),
        ]);
        let square = Polygon::from(Rect::new(0.0, 0.0, 10.0, 10.0));

        assert_eq!(polygon_iou(&line, &square), 0.0);
        assert_eq!(polygon_iou(&collinear, &square), 0.0);
        assert_eq!(polygon_iou(&with_nan, &square), 0.0);
        assert_eq!(polygon_iou(&line, &line), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let a = triangle(0.0);
        let b = Polygon::from(Rect::new(3.0, 4.0, 15.0, 9.0));
        assert!((polygon_iou(&a, &b) - polygon_iou(&b, &a)).abs() < 1e-12);
    }
}
