//! Minimum-cost bipartite assignment (Kuhn-Munkres / Hungarian algorithm).
//!
//! Rectangular problems are zero-padded to a square of the larger side, so
//! every row or every column (whichever side is smaller) gets a real partner
//! and the excess on the larger side stays unassigned.

use crate::error::{RoiEvalError, Result};

/// Scale used to quantize overlap scores into integer costs.
pub const COST_SCALE: f64 = 1_000_000.0;

/// Convert an overlap score in [0, 1] into a non-negative integer cost.
///
/// Lower cost means a better match; a perfect overlap costs 0.
///
/// ```
/// use roi_eval::assignment::score_to_cost;
///
/// assert_eq!(score_to_cost(1.0), 0);
/// assert_eq!(score_to_cost(0.0), 1_000_000);
/// ```
#[must_use]
pub fn score_to_cost(score: f64) -> i64 {
    let score = if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 };
    ((1.0 - score) * COST_SCALE).round() as i64
}

/// Largest cost accepted in a `rows` x `cols` matrix.
///
/// Solver potentials and the reported total stay within `i64` as long as
/// every entry is at most this value.
///
/// ```
/// use roi_eval::assignment::{max_cost, COST_SCALE};
///
/// assert!(max_cost(1000, 1000) > COST_SCALE as i64);
/// ```
#[must_use]
pub fn max_cost(rows: usize, cols: usize) -> i64 {
    let n = rows.max(cols).max(1) as i64;
    i64::MAX / 4 / (n + 1)
}

/// A dense rows x cols matrix of non-negative integer costs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl CostMatrix {
    /// Create a zero-cost matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// Build a matrix from row vectors.
    ///
    /// # Errors
    ///
    /// Returns [`RoiEvalError::InvalidCostMatrix`] for ragged rows and for
    /// costs that are negative or above [`max_cost`].
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let limit = max_cost(rows.len(), cols);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(RoiEvalError::InvalidCostMatrix(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            for (j, &cost) in row.iter().enumerate() {
                check_cost(cost, limit, i, j)?;
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Build a cost matrix from overlap scores via [`score_to_cost`].
    pub fn from_scores(scores: &[Vec<f64>]) -> Result<Self> {
        Self::from_rows(
            scores
                .iter()
                .map(|row| row.iter().map(|&s| score_to_cost(s)).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cost at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if the position is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> i64 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col]
    }

    /// Set the cost at (`row`, `col`).
    ///
    /// # Errors
    ///
    /// Returns [`RoiEvalError::InvalidCostMatrix`] for a cost outside
    /// `0..=max_cost(rows, cols)` or an out-of-bounds position.
    pub fn set(&mut self, row: usize, col: usize, cost: i64) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(RoiEvalError::InvalidCostMatrix(format!(
                "position ({}, {}) outside {}x{} matrix",
                row, col, self.rows, self.cols
            )));
        }
        check_cost(cost, max_cost(self.rows, self.cols), row, col)?;
        self.data[row * self.cols + col] = cost;
        Ok(())
    }

    /// Cost with zero padding outside the real matrix.
    fn padded(&self, row: usize, col: usize) -> i64 {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col]
        } else {
            0
        }
    }
}

fn check_cost(cost: i64, limit: i64, row: usize, col: usize) -> Result<()> {
    if cost < 0 {
        return Err(RoiEvalError::InvalidCostMatrix(format!(
            "negative cost {} at ({}, {})",
            cost, row, col
        )));
    }
    if cost > limit {
        return Err(RoiEvalError::InvalidCostMatrix(format!(
            "cost {} at ({}, {}) exceeds the limit of {}",
            cost, row, col, limit
        )));
    }
    Ok(())
}

/// Result of solving an assignment problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Column assigned to each row, `None` when the row only met padding.
    pub row_to_col: Vec<Option<usize>>,
    /// Sum of the real costs of all assigned pairs.
    pub total_cost: i64,
}

impl Assignment {
    fn empty(rows: usize) -> Self {
        Self {
            row_to_col: vec![None; rows],
            total_cost: 0,
        }
    }

    /// Assigned (row, col) pairs in row order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_to_col
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.map(|c| (row, c)))
    }
}

/// Solve the minimum-cost assignment problem.
///
/// Runs in O(n^3) for n = max(rows, cols).
///
/// # Errors
///
/// Returns [`RoiEvalError::AssignmentInfeasible`] if the solution uses a column
/// twice. That indicates a solver bug rather than bad input.
///
/// # Example
///
/// ```
/// use roi_eval::assignment::{solve, CostMatrix};
///
/// let costs = CostMatrix::from_rows(vec![vec![4, 1, 3], vec![2, 0, 5], vec![3, 2, 2]]).unwrap();
/// let assignment = solve(&costs).unwrap();
/// assert_eq!(assignment.total_cost, 5);
/// ```
pub fn solve(costs: &CostMatrix) -> Result<Assignment> {
    let rows = costs.rows();
    let cols = costs.cols();
    if rows == 0 || cols == 0 {
        return Ok(Assignment::empty(rows));
    }

    let n = rows.max(cols);
    let inf = i64::MAX / 4;

    // 1-based potentials; index 0 is the virtual start column.
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    // col_match[j] = row (1-based) matched to column j, 0 when free.
    let mut col_match = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        col_match[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![inf; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = col_match[j0];
            let mut delta = inf;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = costs.padded(i0 - 1, j - 1) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[col_match[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if col_match[j0] == 0 {
                break;
            }
        }

        // Augment along the alternating path.
        loop {
            let j1 = way[j0];
            col_match[j0] = col_match[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = Assignment::empty(rows);
    for (j, &row) in col_match.iter().enumerate().skip(1) {
        let (row, col) = (row - 1, j - 1);
        if row < rows && col < cols {
            assignment.row_to_col[row] = Some(col);
            assignment.total_cost += costs.get(row, col);
        }
    }

    check_feasibility(&assignment, cols)?;
    Ok(assignment)
}

/// Verify that no column is assigned twice.
fn check_feasibility(assignment: &Assignment, cols: usize) -> Result<()> {
    let mut seen = vec![false; cols];
    for (row, col) in assignment.pairs() {
        if col >= cols || std::mem::replace(&mut seen[col], true) {
            return Err(RoiEvalError::AssignmentInfeasible(format!(
                "column {} reused by row {}",
                col, row
            )));
        }
    }
    Ok(())
}
