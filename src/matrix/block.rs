//! Block matrix: a grid of independently-typed matrix blocks, composed into
//! one operator. Empty cells are implicit zero blocks.

use std::sync::Arc;

use crate::dim::MatrixDim;
use crate::error::{LinalgError, Result};
use crate::matrix::{check_left_operable, check_right_operable, Matrix};
use crate::vector::Vector;

struct BlockMatrixData {
    row_block_dims: Vec<usize>,
    col_block_dims: Vec<usize>,
    // row-major grid, `row_block_dims.len() x col_block_dims.len()`.
    blocks: Vec<Option<Arc<dyn Matrix>>>,
}

/// A matrix assembled from a grid of blocks, each of which may be any
/// concrete [`Matrix`] implementation (including another `BlockMatrix`).
#[derive(Clone)]
pub struct BlockMatrix(Arc<BlockMatrixData>);

fn prefix_sums(dims: &[usize]) -> Vec<usize> {
    let mut sums = Vec::with_capacity(dims.len() + 1);
    sums.push(0);
    for &d in dims {
        sums.push(sums.last().unwrap() + d);
    }
    sums
}

impl BlockMatrix {
    fn n_row_blocks(&self) -> usize {
        self.0.row_block_dims.len()
    }

    fn n_col_blocks(&self) -> usize {
        self.0.col_block_dims.len()
    }

    fn block_at(&self, r: usize, c: usize) -> Option<&Arc<dyn Matrix>> {
        self.0.blocks[r * self.n_col_blocks() + c].as_ref()
    }
}

impl Matrix for BlockMatrix {
    fn dim(&self) -> MatrixDim {
        MatrixDim::new(
            self.0.row_block_dims.iter().sum(),
            self.0.col_block_dims.iter().sum(),
        )
        .expect("validated at build time")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let col_offsets = prefix_sums(&self.0.col_block_dims);
        let row_offsets = prefix_sums(&self.0.row_block_dims);
        let mut out = vec![0.0; *row_offsets.last().unwrap()];
        for r in 0..self.n_row_blocks() {
            for c in 0..self.n_col_blocks() {
                let Some(block) = self.block_at(r, c) else { continue };
                let segment = &v.as_slice()[col_offsets[c]..col_offsets[c + 1]];
                let sub = Vector::from_slice(segment)?;
                let contribution = block.operate(&sub)?;
                for (slot, &x) in out[row_offsets[r]..row_offsets[r + 1]].iter_mut().zip(contribution.as_slice()) {
                    *slot += x;
                }
            }
        }
        Vector::from_slice(&out)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        check_left_operable(self.dim(), v)?;
        let col_offsets = prefix_sums(&self.0.col_block_dims);
        let row_offsets = prefix_sums(&self.0.row_block_dims);
        let mut out = vec![0.0; *col_offsets.last().unwrap()];
        for r in 0..self.n_row_blocks() {
            for c in 0..self.n_col_blocks() {
                let Some(block) = self.block_at(r, c) else { continue };
                let segment = &v.as_slice()[row_offsets[r]..row_offsets[r + 1]];
                let sub = Vector::from_slice(segment)?;
                let contribution = block.operate_transpose(&sub)?;
                for (slot, &x) in out[col_offsets[c]..col_offsets[c + 1]].iter_mut().zip(contribution.as_slice()) {
                    *slot += x;
                }
            }
        }
        Vector::from_slice(&out)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        let n_rows = self.n_row_blocks();
        let n_cols = self.n_col_blocks();
        let mut blocks = vec![None; n_rows * n_cols];
        for r in 0..n_rows {
            for c in 0..n_cols {
                if let Some(b) = self.block_at(r, c) {
                    blocks[c * n_rows + r] = Some(b.transpose());
                }
            }
        }
        Arc::new(BlockMatrix(Arc::new(BlockMatrixData {
            row_block_dims: self.0.col_block_dims.clone(),
            col_block_dims: self.0.row_block_dims.clone(),
            blocks,
        })))
    }
}

/// Single-use builder for [`BlockMatrix`].
pub struct BlockMatrixBuilder {
    row_block_dims: Vec<usize>,
    col_block_dims: Vec<usize>,
    blocks: Vec<Option<Arc<dyn Matrix>>>,
    built: bool,
}

impl BlockMatrixBuilder {
    pub fn new(row_block_dims: Vec<usize>, col_block_dims: Vec<usize>) -> Result<BlockMatrixBuilder> {
        if row_block_dims.is_empty() || col_block_dims.is_empty() {
            return Err(LinalgError::IllegalArgument("block grid must have at least one row and column block".to_string()));
        }
        let n = row_block_dims.len() * col_block_dims.len();
        Ok(BlockMatrixBuilder {
            row_block_dims,
            col_block_dims,
            blocks: vec![None; n],
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

    pub fn set_block(&mut self, r: usize, c: usize, block: Arc<dyn Matrix>) -> Result<&mut Self> {
        self.check_not_built()?;
        if r >= self.row_block_dims.len() || c >= self.col_block_dims.len() {
            return Err(LinalgError::IndexOutOfBounds {
                index: r.max(c),
                bound: self.row_block_dims.len().max(self.col_block_dims.len()),
            });
        }
        let expected = MatrixDim::new(self.row_block_dims[r], self.col_block_dims[c])?;
        if block.dim() != expected {
            return Err(LinalgError::format_mismatch(expected.to_string(), block.dim().to_string()));
        }
        let n_cols = self.col_block_dims.len();
        self.blocks[r * n_cols + c] = Some(block);
        Ok(self)
    }

    pub fn build(&mut self) -> Result<BlockMatrix> {
        self.check_not_built()?;
        self.built = true;
        Ok(BlockMatrix(Arc::new(BlockMatrixData {
            row_block_dims: std::mem::take(&mut self.row_block_dims),
            col_block_dims: std::mem::take(&mut self.col_block_dims),
            blocks: std::mem::take(&mut self.blocks),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::general::GeneralMatrixBuilder;
    use crate::matrix::unit::UnitMatrix;

    fn block2x2() -> BlockMatrix {
        let mut top_left = GeneralMatrixBuilder::zero_builder(MatrixDim::square(2).unwrap()).unwrap();
        top_left.set_value(0, 0, 2.0).unwrap();
        top_left.set_value(1, 1, 3.0).unwrap();
        let top_left = top_left.build().unwrap();

        let mut b = BlockMatrixBuilder::new(vec![2, 1], vec![2, 1]).unwrap();
        b.set_block(0, 0, Arc::new(top_left)).unwrap();
        b.set_block(1, 1, Arc::new(UnitMatrix::new(1).unwrap())).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn operate_combines_block_contributions() {
        let m = block2x2();
        let v = Vector::from_slice(&[1.0, 1.0, 5.0]).unwrap();
        let r = m.operate(&v).unwrap();
        assert_eq!(r.entry_as_array(), vec![2.0, 3.0, 5.0]);
    }

    #[test]
    fn missing_block_acts_as_zero() {
        let m = block2x2();
        let v = Vector::from_slice(&[1.0, 1.0, 1.0]).unwrap();
        let r = m.operate(&v).unwrap();
        // off-diagonal blocks are absent, so cross terms vanish
        assert_eq!(r.entry_as_array(), vec![2.0, 3.0, 1.0]);
    }

    #[test]
    fn set_block_rejects_dimension_mismatch() {
        let mut b = BlockMatrixBuilder::new(vec![2, 1], vec![2, 1]).unwrap();
        assert!(b.set_block(1, 1, Arc::new(UnitMatrix::new(2).unwrap())).is_err());
    }
}
