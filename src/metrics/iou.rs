//! Intersection over Union (IoU) calculation.

use crate::metrics::polygon::polygon_iou;
use crate::types::{Rect, Region};

/// Calculate the Intersection over Union (IoU) between two rectangles.
///
/// IoU is defined as the area of intersection divided by the area of union.
/// A degenerate rectangle (zero or negative size, non-finite coordinates)
/// scores 0.0 against anything.
///
/// # Arguments
///
/// * `rect1` - First rectangle
/// * `rect2` - Second rectangle
///
/// # Returns
///
/// Returns a value between 0.0 (no overlap) and 1.0 (perfect overlap).
///
/// # Example
///
/// ```
/// use roi_eval::metrics::iou::calculate_iou;
/// use roi_eval::types::Rect;
///
/// let rect1 = Rect::new(0.0, 0.0, 10.0, 10.0);
/// let rect2 = Rect::new(5.0, 5.0, 10.0, 10.0);
/// let iou = calculate_iou(&rect1, &rect2);
/// assert!(iou > 0.0 && iou < 1.0);
/// ```
pub fn calculate_iou(rect1: &Rect, rect2: &Rect) -> f64 {
    if !rect1.is_valid() || !rect2.is_valid() {
        return 0.0;
    }

    // Calculate intersection coordinates
    let x_left = rect1.x.max(rect2.x);
    let y_top = rect1.y.max(rect2.y);
    let x_right = rect1.right().min(rect2.right());
    let y_bottom = rect1.bottom().min(rect2.bottom());

    let width = x_right - x_left;
    let height = y_bottom - y_top;
    if width <= 0.0 || height <= 0.0 {
        return 0.0;
    }

    // Areas use the same edge arithmetic as the intersection so that
    // identical rectangles score exactly 1.0.
    let intersection_area = width * height;
    let area1 = (rect1.right() - rect1.x) * (rect1.bottom() - rect1.y);
    let area2 = (rect2.right() - rect2.x) * (rect2.bottom() - rect2.y);
    let union_area = area1 + area2 - intersection_area;

    if union_area <= 0.0 {
        return 0.0;
    }

    (intersection_area / union_area).clamp(0.0, 1.0)
}

/// Overlap score between two regions of either form.
///
/// Two rectangles use the exact rectangle formula; any pair involving a
/// polygon goes through integer polygon clipping.
///
/// # Example
///
/// ```
/// use roi_eval::metrics::iou::region_score;
/// use roi_eval::types::{Rect, Region};
///
/// let a = Region::from(Rect::new(0.0, 0.0, 10.0, 10.0));
/// assert_eq!(region_score(&a, &a), 1.0);
/// ```
pub fn region_score(a: &Region, b: &Region) -> f64 {
    match (a, b) {
        (Region::Rect(ra), Region::Rect(rb)) => calculate_iou(ra, rb),
        (Region::Polygon(pa), Region::Polygon(pb)) => polygon_iou(pa, pb),
        _ => polygon_iou(&a.to_polygon(), &b.to_polygon()),
    }
}

/// Calculate the score matrix between two sets of regions.
///
/// Returns a 2D vector where `result[i][j]` is the score between `regions1[i]`
/// and `regions2[j]`. Accepts bare regions, labeled regions or references to either.
pub fn score_matrix<A, B>(regions1: &[A], regions2: &[B]) -> Vec<Vec<f64>>
where
    A: AsRef<Region>,
    B: AsRef<Region>,
{
    regions1
        .iter()
        .map(|a| {
            regions2
                .iter()
                .map(|b| region_score(a.as_ref(), b.as_ref()))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LabeledRegion, Polygon};

    #[test]
    fn test_identical_rects() {
        let rect1 = Rect::new(0.0, 0.0, 10.0, 10.0);
        let rect2 = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(calculate_iou(&rect1, &rect2), 1.0);
    }

    #[test]
    fn test_no_overlap() {
        let rect1 = Rect::new(0.0, 0.0, 10.0, 10.0);
        let rect2 = Rect::new(20.0, 20.0, 10.0, 10.0);
        assert_eq!(calculate_iou(&rect1, &rect2), 0.0);
    }

    #[test]
    fn test_touching_edges_score_zero() {
        let rect1 = Rect::new(0.0, 0.0, 10.0, 10.0);
        let rect2 = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(calculate_iou(&rect1, &rect2), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let rect1 = Rect::new(0.0, 0.0, 10.0, 10.0);
        let rect2 = Rect::new(5.0, 5.0, 10.0, 10.0);
        let iou = calculate_iou(&rect1, &rect2);

        // 25 / (100 + 100 - 25)
        assert!((iou - 0.142857).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_rect() {
        let empty = Rect::new(0.0, 0.0, 0.0, 0.0);
        let flat = Rect::new(2.0, 2.0, 5.0, 0.0);
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(calculate_iou(&empty, &empty), 0.0);
        assert_eq!(calculate_iou(&flat, &rect), 0.0);
        assert_eq!(calculate_iou(&rect, &Rect::new(0.0, 0.0, -5.0, 10.0)), 0.0);
    }

    #[test]
    fn test_mixed_forms_agree_with_rect_formula() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 0.0, 10.0, 10.0);
        let poly_b = Region::Polygon(Polygon::from(b));
        let mixed = region_score(&Region::Rect(a), &poly_b);
        assert!((mixed - calculate_iou(&a, &b)).abs() < 1e-9);
    }

    #[test]
    fn test_score_matrix() {
        let regions1 = vec![
            Region::from(Rect::new(0.0, 0.0, 10.0, 10.0)),
            Region::from(Rect::new(5.0, 5.0, 10.0, 10.0)),
        ];
        let regions2 = vec![Region::from(Rect::new(0.0, 0.0, 10.0, 10.0))];

        let matrix = score_matrix(&regions1, &regions2);
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0].len(), 1);
        assert_eq!(matrix[0][0], 1.0);

        let labeled = vec![LabeledRegion::new(Rect::new(5.0, 5.0, 10.0, 10.0)).with_score(0.4)];
        let refs: Vec<&Region> = regions1.iter().collect();
        let mixed = score_matrix(&refs, &labeled);
        assert_eq!(mixed[1][0], 1.0);
        assert!((mixed[0][0] - 25.0 / 175.0).abs() < 1e-12);
    }
}
