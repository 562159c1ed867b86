use rand::Rng;
use serde::{Serialize, Deserialize};

/// Dense row-major matrix of `f64`.
///
/// `data[r][c]` holds row `r`, column `c`. Every row has exactly `cols`
/// elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![value; cols]; rows]
        }
    }

    /// Samples every element uniformly from [-1, 1).
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);

        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = rng.gen::<f64>() * 2.0 - 1.0;
            }
        }

        res
    }

    /// Builds a matrix from rows. Returns `None` if the rows are empty or ragged.
    pub fn from_data(data: Vec<Vec<f64>>) -> Option<Matrix> {
        let cols = data.first()?.len();
        if data.iter().any(|row| row.len() != cols) {
            return None;
        }
        Some(Matrix {
            rows: data.len(),
            cols,
            data
        })
    }

    /// Rebuilds a matrix from values laid out column by column.
    /// `values.len()` must equal `rows * cols`.
    pub fn from_column_major(rows: usize, cols: usize, values: &[f64]) -> Option<Matrix> {
        if values.len() != rows * cols {
            return None;
        }
        let mut res = Matrix::zeros(rows, cols);
        for (c, column) in values.chunks(rows.max(1)).enumerate().take(cols) {
            for (r, &x) in column.iter().enumerate() {
                res.data[r][c] = x;
            }
        }
        Some(res)
    }

    /// Iterates the elements column by column.
    pub fn iter_column_major(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.cols).flat_map(move |c| self.data.iter().map(move |row| row[c]))
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect()
        }
    }

    /// `self · v`, with `v.len() == self.cols`.
    pub fn mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.cols);
        self.data.iter()
            .map(|row| row.iter().zip(v).map(|(w, x)| w * x).sum())
            .collect()
    }

    /// `selfᵗ · v`, with `v.len() == self.rows`.
    pub fn transpose_mul_vec(&self, v: &[f64]) -> Vec<f64> {
        debug_assert_eq!(v.len(), self.rows);
        let mut res = vec![0.0; self.cols];
        for (row, &scale) in self.data.iter().zip(v) {
            for (acc, w) in res.iter_mut().zip(row) {
                *acc += w * scale;
            }
        }
        res
    }

    /// `self += u ⊗ v` where `u` indexes rows and `v` indexes columns.
    pub fn add_outer(&mut self, u: &[f64], v: &[f64]) {
        debug_assert_eq!(u.len(), self.rows);
        debug_assert_eq!(v.len(), self.cols);
        for (row, &scale) in self.data.iter_mut().zip(u) {
            for (x, &y) in row.iter_mut().zip(v) {
                *x += scale * y;
            }
        }
    }

    /// `self += alpha * other`.
    pub fn scaled_add(&mut self, alpha: f64, other: &Matrix) {
        debug_assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        for (row, other_row) in self.data.iter_mut().zip(&other.data) {
            for (x, y) in row.iter_mut().zip(other_row) {
                *x += alpha * y;
            }
        }
    }

    /// Element-wise `self += other`.
    pub fn add_assign(&mut self, other: &Matrix) {
        self.scaled_add(1.0, other);
    }

    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|row| row.fill(value));
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
