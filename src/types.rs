//! Core data types for regions, image records and match outcomes.

use serde::{Deserialize, Serialize};

/// A 2-D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle (x, y, width, height).
///
/// Coordinates are in LTWH (Left-Top-Width-Height) format with the origin at
/// the upper-left corner of the image, x growing right and y growing down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from its upper-left and lower-right corners.
    pub fn from_corners(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Get the area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Get the right coordinate (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom coordinate (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.x + 0.5 * self.width, self.y + 0.5 * self.height)
    }

    /// Check if the rectangle is valid (finite, positive dimensions).
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// The four corners, clockwise from the upper-left in image coordinates.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.bottom()),
            Point::new(self.x, self.bottom()),
        ]
    }
}

/// A simple closed polygon given by its ordered contour points.
///
/// The closing edge from the last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    /// Create a polygon from contour points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Axis-aligned bounding box of the contour.
    ///
    /// Returns `None` for an empty contour.
    pub fn bounding_box(&self) -> Option<Rect> {
        let first = self.points.first()?;
        let (mut left, mut top, mut right, mut bottom) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            left = left.min(p.x);
            top = top.min(p.y);
            right = right.max(p.x);
            bottom = bottom.max(p.y);
        }
        Some(Rect::from_corners(left, top, right, bottom))
    }
}

impl From<Rect> for Polygon {
    fn from(rect: Rect) -> Self {
        Self::new(rect.corners().to_vec())
    }
}

/// A region of interest: a rectangle or a polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Region {
    Rect(Rect),
    Polygon(Polygon),
}

impl Region {
    /// Bounding rectangle of the region.
    pub fn bounding_box(&self) -> Option<Rect> {
        match self {
            Region::Rect(rect) => Some(*rect),
            Region::Polygon(polygon) => polygon.bounding_box(),
        }
    }

    /// Center of the region's bounding box, used when drawing match lines.
    pub fn center(&self) -> Option<Point> {
        self.bounding_box().map(|r| r.center())
    }

    /// Convert to polygon form.
    pub fn to_polygon(&self) -> Polygon {
        match self {
            Region::Rect(rect) => Polygon::from(*rect),
            Region::Polygon(polygon) => polygon.clone(),
        }
    }
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::Rect(rect)
    }
}

impl From<Polygon> for Region {
    fn from(polygon: Polygon) -> Self {
        Region::Polygon(polygon)
    }
}

impl AsRef<Region> for Region {
    fn as_ref(&self) -> &Region {
        self
    }
}

/// A region with optional label and confidence metadata.
///
/// The confidence is only ever used to filter computed regions; it never
/// enters the geometric score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRegion {
    pub region: Region,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl AsRef<Region> for LabeledRegion {
    fn as_ref(&self) -> &Region {
        &self.region
    }
}

impl LabeledRegion {
    /// Wrap a region without label or score.
    pub fn new(region: impl Into<Region>) -> Self {
        Self {
            region: region.into(),
            label: None,
            score: None,
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the confidence score.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Whether this region survives a confidence filter.
    ///
    /// Regions without a score are never filtered out; otherwise the score
    /// must be strictly greater than the threshold.
    pub fn passes_score_threshold(&self, threshold: Option<f64>) -> bool {
        match (threshold, self.score) {
            (Some(threshold), Some(score)) => score > threshold,
            _ => true,
        }
    }
}

/// All regions listed for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_id: String,
    #[serde(default)]
    pub regions: Vec<LabeledRegion>,
}

impl ImageRecord {
    /// Create a record from an identifier and its regions.
    pub fn new(image_id: impl Into<String>, regions: Vec<LabeledRegion>) -> Self {
        Self {
            image_id: image_id.into(),
            regions,
        }
    }

    /// Create a record of unlabeled rectangles.
    pub fn from_rects(image_id: impl Into<String>, rects: &[Rect]) -> Self {
        Self::new(image_id, rects.iter().map(|r| LabeledRegion::new(*r)).collect())
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the record lists no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// A candidate computed region for one ground-truth region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// Index into the computed record (never into a filtered view).
    pub computed_index: usize,
    pub score: f64,
}

/// Per-image classification of ground-truth and computed regions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    /// Ground-truth indices credited to each computed region.
    pub computed_matches: Vec<Vec<usize>>,
    /// Whether each computed region took part (survived the score filter).
    pub considered: Vec<bool>,
}

impl ClassificationOutcome {
    /// Whether computed region `index` was judged a false alarm.
    pub fn is_false_positive(&self, index: usize) -> bool {
        self.considered.get(index).copied().unwrap_or(false)
            && self.computed_matches.get(index).is_some_and(|m| m.is_empty())
    }

    /// All credited (ground truth, computed) pairs, for drawing match lines.
    pub fn matched_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.computed_matches
            .iter()
            .enumerate()
            .flat_map(|(computed, truths)| truths.iter().map(move |&truth| (truth, computed)))
    }

    /// Whether the image holds at least one false alarm.
    pub fn has_false_alarm(&self) -> bool {
        self.false_positives > 0
    }
}

/// Precision-Recall curve point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionRecallPoint {
    pub precision: f64,
    pub recall: f64,
    pub false_alarms: usize,
    pub threshold: f64,
}
