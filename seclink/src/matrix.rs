use crate::error::{Error, Result};
use std::fmt;

/// Dense row-major matrix of signed 64-bit integers, with rows, cols > 0.
#[derive(Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl Matrix {
    /// Returns the rows x cols matrix stored row-major in `data`.
    pub fn new(rows: usize, cols: usize, data: Vec<i64>) -> Result<Self> {
        check_shape(rows, cols)?;
        if data.len() != rows * cols {
            return Err(Error::InvalidParameter(format!(
                "{} entries for a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Returns the rows x cols matrix stored column-major in `data`.
    pub fn from_column_major(rows: usize, cols: usize, data: &[i64]) -> Result<Self> {
        check_shape(rows, cols)?;
        if data.len() != rows * cols {
            return Err(Error::InvalidParameter(format!(
                "{} entries for a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Self::from_fn(rows, cols, |i, j| data[j * rows + i])
    }

    pub fn from_fn<F: FnMut(usize, usize) -> i64>(rows: usize, cols: usize, mut f: F) -> Result<Self> {
        check_shape(rows, cols)?;
        let mut data: Vec<i64> = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Ok(Self { rows, cols, data })
    }

    pub fn filled(rows: usize, cols: usize, value: i64) -> Result<Self> {
        Self::from_fn(rows, cols, |_, _| value)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.data[i * self.cols + j]
    }

    pub fn row(&self, i: usize) -> &[i64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    pub fn to_column_major(&self) -> Vec<i64> {
        let mut out: Vec<i64> = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                out.push(self.get(i, j));
            }
        }
        out
    }

    /// Plaintext product, with wrapping arithmetic.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(Error::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        Self::from_fn(self.rows, other.cols, |i, j| {
            self.row(i)
                .iter()
                .enumerate()
                .fold(0i64, |acc, (l, a)| acc.wrapping_add(a.wrapping_mul(other.get(l, j))))
        })
    }

    /// Entries reduced modulo t into (-t/2, t/2].
    pub fn centered(&self, t: u64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| center(*v, t)).collect(),
        }
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix {}x{}", self.rows, self.cols)?;
        for i in 0..self.rows.min(8) {
            writeln!(f, "  {:?}{}", &self.row(i)[..self.cols.min(8)], if self.cols > 8 { " ..." } else { "" })?;
        }
        if self.rows > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

fn check_shape(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidParameter(format!("empty {}x{} matrix", rows, cols)));
    }
    Ok(())
}

/// v mod t in (-t/2, t/2].
pub fn center(v: i64, t: u64) -> i64 {
    let t: i128 = t as i128;
    let r: i128 = (v as i128).rem_euclid(t);
    if r > t >> 1 {
        (r - t) as i64
    } else {
        r as i64
    }
}
