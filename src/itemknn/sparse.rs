use crate::interactions::ItemIdx;

/// Row-compressed sparse matrix. Column indices within each row are strictly ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T> {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<u32>,
    data: Vec<T>,
}

impl<T: Copy + Default> CsrMatrix<T> {
    /// Builds a matrix from `(row, col, value)` triplets. Duplicate coordinates are not merged,
    /// callers pass each coordinate at most once.
    pub fn from_triplets(n_rows: usize, n_cols: usize, mut triplets: Vec<(u32, u32, T)>) -> Self {
        triplets.sort_unstable_by_key(|&(row, col, _)| (row, col));
        let mut indptr = vec![0_usize; n_rows + 1];
        for (row, _, _) in triplets.iter() {
            indptr[*row as usize + 1] += 1;
        }
        for row in 0..n_rows {
            indptr[row + 1] += indptr[row];
        }
        let indices = triplets.iter().map(|&(_, col, _)| col).collect();
        let data = triplets.into_iter().map(|(_, _, value)| value).collect();
        CsrMatrix {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn row(&self, row: usize) -> (&[u32], &[T]) {
        let (start, end) = (self.indptr[row], self.indptr[row + 1]);
        (&self.indices[start..end], &self.data[start..end])
    }

    pub fn row_iter(&self, row: usize) -> impl Iterator<Item = (u32, T)> + '_ {
        let (indices, data) = self.row(row);
        indices.iter().copied().zip(data.iter().copied())
    }

    pub fn get(&self, row: usize, col: u32) -> Option<T> {
        let (indices, data) = self.row(row);
        indices.binary_search(&col).ok().map(|pos| data[pos])
    }

    /// Counting-sort transpose; rows of the result come out sorted because the input is
    /// scanned in row order.
    pub fn transpose(&self) -> CsrMatrix<T> {
        let mut indptr = vec![0_usize; self.n_cols + 1];
        for col in self.indices.iter() {
            indptr[*col as usize + 1] += 1;
        }
        for col in 0..self.n_cols {
            indptr[col + 1] += indptr[col];
        }
        let mut next = indptr.clone();
        let mut indices = vec![0_u32; self.nnz()];
        let mut data = vec![T::default(); self.nnz()];
        for row in 0..self.n_rows {
            for (col, value) in self.row_iter(row) {
                let slot = next[col as usize];
                indices[slot] = row as u32;
                data[slot] = value;
                next[col as usize] += 1;
            }
        }
        CsrMatrix {
            n_rows: self.n_cols,
            n_cols: self.n_rows,
            indptr,
            indices,
            data,
        }
    }

    /// Drops every entry on the main diagonal.
    pub fn without_diagonal(&self) -> CsrMatrix<T> {
        let mut indptr = Vec::with_capacity(self.n_rows + 1);
        let mut indices = Vec::with_capacity(self.nnz());
        let mut data = Vec::with_capacity(self.nnz());
        indptr.push(0);
        for row in 0..self.n_rows {
            for (col, value) in self.row_iter(row) {
                if col as usize != row {
                    indices.push(col);
                    data.push(value);
                }
            }
            indptr.push(indices.len());
        }
        CsrMatrix {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            indptr,
            indices,
            data,
        }
    }
}

impl CsrMatrix<u32> {
    /// Binary user x item incidence matrix.
    pub fn incidence(user_items: &[Vec<ItemIdx>], n_items: usize) -> Self {
        let mut indptr = Vec::with_capacity(user_items.len() + 1);
        let mut indices = Vec::with_capacity(user_items.iter().map(Vec::len).sum());
        indptr.push(0);
        for items in user_items.iter() {
            // items are sorted and unique
            indices.extend_from_slice(items);
            indptr.push(indices.len());
        }
        let data = vec![1_u32; indices.len()];
        CsrMatrix {
            n_rows: user_items.len(),
            n_cols: n_items,
            indptr,
            indices,
            data,
        }
    }

    /// Gram matrix `Aᵀ·A` (columns x columns), built row by row with a sparse accumulator.
    /// Only non-zero entries are materialized; the diagonal holds the column sums of squares.
    pub fn gram(&self) -> CsrMatrix<u32> {
        let by_col = self.transpose();
        let mut accumulator = vec![0_u32; self.n_cols];
        let mut touched: Vec<u32> = Vec::new();

        let mut indptr = Vec::with_capacity(self.n_cols + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for col in 0..self.n_cols {
            for (row, outer) in by_col.row_iter(col) {
                for (other, inner) in self.row_iter(row as usize) {
                    let slot = &mut accumulator[other as usize];
                    if *slot == 0 {
                        touched.push(other);
                    }
                    *slot += outer * inner;
                }
            }
            touched.sort_unstable();
            for other in touched.drain(..) {
                indices.push(other);
                data.push(accumulator[other as usize]);
                accumulator[other as usize] = 0;
            }
            indptr.push(indices.len());
        }

        CsrMatrix {
            n_rows: self.n_cols,
            n_cols: self.n_cols,
            indptr,
            indices,
            data,
        }
    }
}

#[cfg(test)]
mod sparse_test {
    use super::*;

    #[test]
    fn should_sort_triplets_into_rows() {
        let matrix = CsrMatrix::from_triplets(3, 3, vec![(2, 0, 5.0), (0, 2, 1.0), (0, 1, 2.0)]);
        assert_eq!(3, matrix.nnz());
        assert_eq!((&[1_u32, 2][..], &[2.0, 1.0][..]), matrix.row(0));
        assert!(matrix.row(1).0.is_empty());
        assert_eq!(Some(5.0), matrix.get(2, 0));
        assert_eq!(None, matrix.get(2, 1));
    }

    #[test]
    fn should_transpose() {
        let matrix = CsrMatrix::from_triplets(2, 3, vec![(0, 2, 1_u32), (1, 0, 2), (1, 2, 3)]);
        let transposed = matrix.transpose();
        assert_eq!(3, transposed.n_rows());
        assert_eq!(2, transposed.n_cols());
        assert_eq!(Some(2), transposed.get(0, 1));
        assert_eq!(&[0_u32, 1][..], transposed.row(2).0);
        assert_eq!(matrix, transposed.transpose());
    }

    #[test]
    fn should_compute_gram_of_incidence() {
        // users: {0, 1, 2}, {0, 1}, {2, 3}
        let user_items = vec![vec![0, 1, 2], vec![0, 1], vec![2, 3]];
        let gram = CsrMatrix::incidence(&user_items, 4).gram();
        assert_eq!(Some(2), gram.get(0, 0));
        assert_eq!(Some(2), gram.get(0, 1));
        assert_eq!(Some(1), gram.get(0, 2));
        assert_eq!(None, gram.get(0, 3));
        assert_eq!(Some(1), gram.get(3, 2));
        assert_eq!(Some(1), gram.get(3, 3));
        // 4 diagonal entries + 2 * 4 co-occurring pairs
        assert_eq!(12, gram.nnz());
        assert_eq!(gram, gram.transpose());

        let off_diagonal = gram.without_diagonal();
        assert_eq!(8, off_diagonal.nnz());
        assert_eq!(None, off_diagonal.get(2, 2));
    }
}
