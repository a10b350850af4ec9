//! Region-list loading: whitespace-delimited text files and JSON records.
//!
//! Text files hold one image per line:
//!
//! ```text
//! # ground truth: <image> <n> : <label> <x> <y> <width> <height> : ...
//! frame_001.png 2 : car 10 20 30 40 : truck 100 40 80 60
//!
//! # computed: <image> <n> : <label> <score> <ulx> <uly> <lrx> <lry> : ...
//! frame_001.png 1 : car 240 12 18 41 62
//! ```

use crate::error::{RoiEvalError, Result};
use crate::types::{ImageRecord, LabeledRegion, Rect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::str::SplitWhitespace;
use tracing::debug;

/// On-disk format of a region list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    #[default]
    Text,
    Json,
}

/// Load ground-truth records in the given format.
pub fn load_truth<P: AsRef<Path>>(path: P, format: InputFormat) -> Result<Vec<ImageRecord>> {
    match format {
        InputFormat::Text => load_truth_file(path),
        InputFormat::Json => load_records_json(path),
    }
}

/// Load computed records in the given format.
pub fn load_computed<P: AsRef<Path>>(path: P, format: InputFormat) -> Result<Vec<ImageRecord>> {
    match format {
        InputFormat::Text => load_computed_file(path),
        InputFormat::Json => load_records_json(path),
    }
}

/// Load a ground-truth text file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read and
/// [`RoiEvalError::Parse`] for the first malformed line.
///
/// # Example
///
/// ```no_run
/// use roi_eval::loader::load_truth_file;
///
/// let truth = load_truth_file("truth.txt").unwrap();
/// println!("Loaded {} images", truth.len());
/// ```
pub fn load_truth_file<P: AsRef<Path>>(path: P) -> Result<Vec<ImageRecord>> {
    let records = parse_truth_str(&fs::read_to_string(path.as_ref())?)?;
    debug!(path = %path.as_ref().display(), images = records.len(), "loaded ground truth");
    Ok(records)
}

/// Load a computed-region text file.
pub fn load_computed_file<P: AsRef<Path>>(path: P) -> Result<Vec<ImageRecord>> {
    let records = parse_computed_str(&fs::read_to_string(path.as_ref())?)?;
    debug!(path = %path.as_ref().display(), images = records.len(), "loaded computed regions");
    Ok(records)
}

/// Parse ground-truth text.
///
/// # Example
///
/// ```
/// use roi_eval::loader::parse_truth_str;
///
/// let records = parse_truth_str("a.png 1 : car 10 20 30 40\nb.png 0\n").unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].regions[0].label.as_deref(), Some("car"));
/// assert!(records[1].is_empty());
/// ```
pub fn parse_truth_str(text: &str) -> Result<Vec<ImageRecord>> {
    parse_lines(text, false)
}

/// Parse computed-region text. Corners are converted to width and height.
pub fn parse_computed_str(text: &str) -> Result<Vec<ImageRecord>> {
    parse_lines(text, true)
}

fn parse_lines(text: &str, with_scores: bool) -> Result<Vec<ImageRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_line(line, index + 1, with_scores))
        .collect()
}

/// Cursor over the tokens of one line, tagging errors with the line number.
struct Fields<'a> {
    tokens: SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Fields<'a> {
    fn error(&self, message: impl Into<String>) -> RoiEvalError {
        RoiEvalError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a str> {
        self.tokens
            .next()
            .ok_or_else(|| self.error(format!("missing {}", what)))
    }

    fn number(&mut self, what: &str) -> Result<f64> {
        let token = self.next(what)?;
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.error(format!("{} '{}' is not a number", what, token))),
        }
    }

    /// A region starts with ':' followed by its label; the two may be joined.
    fn label(&mut self) -> Result<&'a str> {
        let token = self.next("':' separator")?;
        match token.strip_prefix(':') {
            Some("") => self.next("label"),
            Some(label) => Ok(label),
            None => Err(self.error(format!("expected ':' before region, found '{}'", token))),
        }
    }
}

fn parse_line(line: &str, line_number: usize, with_scores: bool) -> Result<ImageRecord> {
    let mut fields = Fields {
        tokens: line.split_whitespace(),
        line: line_number,
    };

    let image_id = fields.next("image identifier")?;
    let count_token = fields.next("region count")?;
    let count: usize = count_token
        .parse()
        .map_err(|_| fields.error(format!("region count '{}' is not a count", count_token)))?;

    let mut regions = Vec::with_capacity(count);
    for index in 0..count {
        let label = fields.label().map_err(|e| match e {
            RoiEvalError::Parse { line, message } => RoiEvalError::Parse {
                line,
                message: format!("region {} of {}: {}", index + 1, count, message),
            },
            other => other,
        })?;

        let (rect, score) = if with_scores {
            let score = fields.number("score")?;
            let left = fields.number("upper-left x")?;
            let top = fields.number("upper-left y")?;
            let right = fields.number("lower-right x")?;
            let bottom = fields.number("lower-right y")?;
            (Rect::from_corners(left, top, right, bottom), Some(score))
        } else {
            let x = fields.number("x")?;
            let y = fields.number("y")?;
            let width = fields.number("width")?;
            let height = fields.number("height")?;
            (Rect::new(x, y, width, height), None)
        };

        if rect.width < 0.0 || rect.height < 0.0 {
            return Err(fields.error(format!(
                "region {} has negative size {}x{}",
                index + 1,
                rect.width,
                rect.height
            )));
        }

        let mut region = LabeledRegion::new(rect).with_label(label);
        region.score = score;
        regions.push(region);
    }

    if let Some(extra) = fields.tokens.next() {
        return Err(fields.error(format!(
            "declared {} regions but found more input starting at '{}'",
            count, extra
        )));
    }

    Ok(ImageRecord::new(image_id, regions))
}

/// Load a JSON array of image records.
///
/// Unlike the text formats, JSON records may carry polygon regions.
pub fn load_records_json<P: AsRef<Path>>(path: P) -> Result<Vec<ImageRecord>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let records: Vec<ImageRecord> = serde_json::from_reader(reader)?;
    debug!(path = %path.as_ref().display(), images = records.len(), "loaded JSON records");
    Ok(records)
}

/// Parse a JSON array of image records.
///
/// # Example
///
/// ```
/// use roi_eval::loader::load_records_json_str;
///
/// let json = r#"[
///     {"image_id": "a.png", "regions": [
///         {"region": {"kind": "rect", "x": 0, "y": 0, "width": 5, "height": 5}, "score": 0.7}
///     ]}
/// ]"#;
/// let records = load_records_json_str(json).unwrap();
/// assert_eq!(records[0].regions[0].score, Some(0.7));
/// ```
pub fn load_records_json_str(json_str: &str) -> Result<Vec<ImageRecord>> {
    Ok(serde_json::from_str(json_str)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, Polygon, Region};

    fn rect_of(record: &ImageRecord, index: usize) -> Rect {
        match &record.regions[index].region {
            Region::Rect(rect) => *rect,
            other => panic!("expected rect, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_truth() {
        let text = "img1.png 2 : vehicle 10 20 30 40 : person 1 2 3 4\n\nimg2.png 0\n";
        let records = parse_truth_str(text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].image_id, "img1.png");
        assert_eq!(rect_of(&records[0], 0), Rect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(records[0].regions[1].label.as_deref(), Some("person"));
        assert_eq!(records[0].regions[0].score, None);
        assert!(records[1].is_empty());
    }

    #[test]
    fn test_parse_computed_converts_corners() {
        let records = parse_computed_str("img1.png 1 : vehicle 250 10 20 40 60").unwrap();
        let region = &records[0].regions[0];
        assert_eq!(region.score, Some(250.0));
        assert_eq!(rect_of(&records[0], 0), Rect::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn test_joined_separator() {
        let records = parse_truth_str("a 1 :car 0 0 1 1").unwrap();
        assert_eq!(records[0].regions[0].label.as_deref(), Some("car"));
    }

    #[test]
    fn test_parse_errors_report_line() {
        let cases = [
            ("a 1 : car 0 0 1 1\nb", 2),
            ("a x", 1),
            ("a 2 : car 0 0 1 1", 1),
            ("a 1 : car 0 0 1 1 : bus 0 0 1 1", 1),
            ("a 1 : car 0 zero 1 1", 1),
            ("a 1 car 0 0 1 1", 1),
            ("\n\na 1 : car 0 0 -1 1", 3),
        ];
        for (text, expected_line) in cases {
            match parse_truth_str(text) {
                Err(RoiEvalError::Parse { line, .. }) => assert_eq!(line, expected_line, "{:?}", text),
                other => panic!("expected parse error for {:?}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_computed_negative_size() {
        assert!(matches!(
            parse_computed_str("a 1 : car 0.9 10 10 5 20"),
            Err(RoiEvalError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_json_polygon_records() {
        let json = r#"[{"image_id": "p", "regions": [
            {"region": {"kind": "polygon", "points": [{"x": 0, "y": 0}, {"x": 4, "y": 0}, {"x": 0, "y": 4}]},
             "label": "tri"}
        ]}]"#;
        let records = load_records_json_str(json).unwrap();
        assert_eq!(
            records[0].regions[0].region,
            Region::Polygon(Polygon::new(vec![
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(0.0, 4.0),
            ]))
        );
        assert!(matches!(load_records_json_str("{"), Err(RoiEvalError::JsonError(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_truth_file("/nonexistent/truth.txt"),
            Err(RoiEvalError::IoError(_))
        ));
    }
}
