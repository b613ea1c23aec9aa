//! General (non-symmetric) band matrix, packed by diagonal offset.

use std::sync::Arc;

use crate::dim::{BandDim, BandPosition, MatrixDim};
use crate::error::{LinalgError, Result};
use crate::matrix::{check_left_operable, check_right_operable, create_transposed_of, Band, EntryReadable, Matrix};
use crate::util::cache::LazyCache;
use crate::util::norm;
use crate::vector::{canonicalize, Vector};

struct GeneralBandMatrixData {
    band: BandDim,
    // row-major: row i holds `lower + 1 + upper` slots for columns
    // `i - lower ..= i + upper`, out-of-range slots structurally zero.
    values: Vec<f64>,
    transpose: LazyCache<Arc<dyn Matrix>>,
    norm_max: LazyCache<f64>,
}

/// A square matrix whose nonzero entries lie within `lower` diagonals below
/// and `upper` diagonals above the main diagonal.
#[derive(Clone)]
pub struct GeneralBandMatrix(Arc<GeneralBandMatrixData>);

impl GeneralBandMatrix {
    fn width(&self) -> usize {
        self.0.band.diagonals()
    }

    fn slot(&self, i: usize, j: usize) -> Option<usize> {
        let lower = self.0.band.lower() as isize;
        let offset = j as isize - i as isize + lower;
        if offset < 0 || offset as usize >= self.width() {
            None
        } else {
            Some(i * self.width() + offset as usize)
        }
    }

    fn raw_value_at(&self, i: usize, j: usize) -> f64 {
        match self.slot(i, j) {
            Some(idx) => self.0.values[idx],
            None => 0.0,
        }
    }
}

impl Matrix for GeneralBandMatrix {
    fn dim(&self) -> MatrixDim {
        self.0.band.as_matrix_dim()
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let n = self.0.band.n();
        let (lower, upper) = (self.0.band.lower(), self.0.band.upper());
        let mut out = vec![0.0; n];
        for i in 0..n {
            let lo = i.saturating_sub(lower);
            let hi = (i + upper).min(n - 1);
            let acc: f64 = (lo..=hi).map(|j| self.raw_value_at(i, j) * v.as_slice()[j]).sum();
            out[i] = canonicalize(acc);
        }
        Vector::from_slice(&out)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        check_left_operable(self.dim(), v)?;
        let n = self.0.band.n();
        let (lower, upper) = (self.0.band.lower(), self.0.band.upper());
        let mut out = vec![0.0; n];
        for j in 0..n {
            let lo = j.saturating_sub(upper);
            let hi = (j + lower).min(n - 1);
            let acc: f64 = (lo..=hi).map(|i| self.raw_value_at(i, j) * v.as_slice()[i]).sum();
            out[j] = canonicalize(acc);
        }
        Vector::from_slice(&out)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        self.0
            .transpose
            .get_or_init(|| create_transposed_of(self))
            .clone()
    }
}

impl Band for GeneralBandMatrix {
    fn band_dim(&self) -> BandDim {
        self.0.band
    }
}

impl EntryReadable for GeneralBandMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        match self.0.band.classify(i, j) {
            BandPosition::OutOfMatrix => Err(LinalgError::IndexOutOfBounds {
                index: i.max(j),
                bound: self.0.band.n(),
            }),
            _ => Ok(self.raw_value_at(i, j)),
        }
    }

    fn entry_norm_max(&self) -> f64 {
        *self.0.norm_max.get_or_init(|| norm::max_abs(&self.0.values))
    }
}

/// Single-use builder for [`GeneralBandMatrix`].
pub struct GeneralBandMatrixBuilder {
    band: BandDim,
    values: Vec<f64>,
    built: bool,
}

impl GeneralBandMatrixBuilder {
    pub fn zero_builder(band: BandDim) -> Result<GeneralBandMatrixBuilder> {
        if !band.is_accepted_for_band_matrix() {
            return Err(LinalgError::ElementsTooMany { rows: band.n(), cols: band.n() });
        }
        Ok(GeneralBandMatrixBuilder {
            band,
            values: vec![0.0; band.n() * band.diagonals()],
            built: false,
        })
    }

    fn check_not_built(&self) -> Result<()> {
        if self.built {
            Err(LinalgError::IllegalArgument("builder has already been built".to_string()))
        } else {
            Ok(())
        }
    }

    pub fn set_value(&mut self, i: usize, j: usize, x: f64) -> Result<&mut Self> {
        self.check_not_built()?;
        match self.band.classify(i, j) {
            BandPosition::OutOfMatrix | BandPosition::OutOfBand => Err(LinalgError::IllegalArgument(format!(
                "({i}, {j}) lies outside the declared band {}",
                self.band
            ))),
            _ => {
                let lower = self.band.lower() as isize;
                let width = self.band.diagonals();
                let offset = (j as isize - i as isize + lower) as usize;
                self.values[i * width + offset] = canonicalize(x);
                Ok(self)
            }
        }
    }

    pub fn build(&mut self) -> Result<GeneralBandMatrix> {
        self.check_not_built()?;
        self.built = true;
        Ok(GeneralBandMatrix(Arc::new(GeneralBandMatrixData {
            band: self.band,
            values: std::mem::take(&mut self.values),
            transpose: LazyCache::new(),
            norm_max: LazyCache::new(),
        })))
    }
}
