//! Permutation matrix: `A e_i = e_{perm(i)}` for a bijection `perm`.

use std::sync::Arc;

use crate::det::DeterminantValue;
use crate::dim::MatrixDim;
use crate::error::{LinalgError, Result};
use crate::matrix::{check_left_operable, check_right_operable, Determinantable, EntryReadable, Matrix, Orthogonal, Permutation};
use crate::vector::Vector;

struct PermutationMatrixData {
    // `image[i]` is the row that receives column `i`'s unit vector: `A e_i = e_{image[i]}`.
    image: Vec<usize>,
    inverse_image: Vec<usize>,
}

/// A permutation of the standard basis, represented by its image array.
#[derive(Clone)]
pub struct PermutationMatrix(Arc<PermutationMatrixData>);

impl PermutationMatrix {
    pub fn from_image(image: &[usize]) -> Result<PermutationMatrix> {
        let n = image.len();
        if n == 0 {
            return Err(LinalgError::IllegalArgument("permutation must have at least one element".to_string()));
        }
        let mut seen = vec![false; n];
        for &p in image {
            if p >= n || seen[p] {
                return Err(LinalgError::IllegalArgument(format!("{image:?} is not a bijection on 0..{n}")));
            }
            seen[p] = true;
        }
        let mut inverse_image = vec![0usize; n];
        for (i, &p) in image.iter().enumerate() {
            inverse_image[p] = i;
        }
        Ok(PermutationMatrix(Arc::new(PermutationMatrixData {
            image: image.to_vec(),
            inverse_image,
        })))
    }

    pub fn identity(n: usize) -> Result<PermutationMatrix> {
        Self::from_image(&(0..n).collect::<Vec<_>>())
    }

    /// Builds the permutation that results from swapping `i` and `j` in the
    /// identity — the elementary transposition partial-pivoting LU applies
    /// at every step.
    pub fn transposition(n: usize, i: usize, j: usize) -> Result<PermutationMatrix> {
        let mut image: Vec<usize> = (0..n).collect();
        if i >= n || j >= n {
            return Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: n });
        }
        image.swap(i, j);
        Self::from_image(&image)
    }

    fn n(&self) -> usize {
        self.0.image.len()
    }
}

impl Matrix for PermutationMatrix {
    fn dim(&self) -> MatrixDim {
        MatrixDim::square(self.n()).expect("already validated")
    }

    fn operate(&self, v: &Vector) -> Result<Vector> {
        check_right_operable(self.dim(), v)?;
        let mut out = vec![0.0; self.n()];
        for (i, &p) in self.0.image.iter().enumerate() {
            out[p] = v.as_slice()[i];
        }
        Vector::from_slice(&out)
    }

    fn operate_transpose(&self, v: &Vector) -> Result<Vector> {
        check_left_operable(self.dim(), v)?;
        let mut out = vec![0.0; self.n()];
        for (i, &p) in self.0.inverse_image.iter().enumerate() {
            out[p] = v.as_slice()[i];
        }
        Vector::from_slice(&out)
    }

    fn transpose(&self) -> Arc<dyn Matrix> {
        Arc::new(PermutationMatrix(Arc::new(PermutationMatrixData {
            image: self.0.inverse_image.clone(),
            inverse_image: self.0.image.clone(),
        })))
    }
}

impl Orthogonal for PermutationMatrix {
    fn inverse(&self) -> Arc<dyn Matrix> {
        self.transpose()
    }
}

impl Permutation for PermutationMatrix {
    fn image_of(&self, i: usize) -> usize {
        self.0.image[i]
    }

    fn is_odd_parity(&self) -> bool {
        // Count inversions via cycle decomposition: a permutation is odd
        // iff it decomposes into an odd number of transpositions, which
        // equals `n - (number of cycles)` parity.
        let n = self.n();
        let mut visited = vec![false; n];
        let mut transpositions = 0usize;
        for start in 0..n {
            if visited[start] {
                continue;
            }
            let mut cycle_len = 0usize;
            let mut cur = start;
            while !visited[cur] {
                visited[cur] = true;
                cur = self.0.image[cur];
                cycle_len += 1;
            }
            if cycle_len > 0 {
                transpositions += cycle_len - 1;
            }
        }
        transpositions % 2 == 1
    }
}

impl EntryReadable for PermutationMatrix {
    fn value_at(&self, i: usize, j: usize) -> Result<f64> {
        let n = self.n();
        if i >= n || j >= n {
            return Err(LinalgError::IndexOutOfBounds { index: i.max(j), bound: n });
        }
        Ok(if self.0.image[j] == i { 1.0 } else { 0.0 })
    }

    fn entry_norm_max(&self) -> f64 {
        1.0
    }
}

impl Determinantable for PermutationMatrix {
    fn determinant_value(&self) -> DeterminantValue {
        DeterminantValue::new(if self.is_odd_parity() { -1 } else { 1 }, 0.0)
    }
}
