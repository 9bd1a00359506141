use std::ops::Deref;

use crate::Mismatch;
use crate::NSetError;

/// A growable coordinate buffer, used as a mixed-radix counter while
/// walking a (possibly ragged) [`crate::NSet`].
///
/// Descending into a nested container appends a block of coordinates
/// for the child's dimensions; ascending removes it again. Only the
/// trailing block is ever incremented, so a single buffer can be
/// reused across an entire traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IndexSlice {
    buf: Vec<usize>,
}

impl IndexSlice {
    /// A slice of `len` zero coordinates.
    pub fn zeros(len: usize) -> Self {
        Self { buf: vec![0; len] }
    }

    /// Push `k` coordinates, each set to `fill`.
    pub fn append(&mut self, k: usize, fill: usize) {
        self.buf.resize(self.buf.len() + k, fill);
    }

    /// Drop the last `k` coordinates.
    pub fn remove_last(&mut self, k: usize) {
        self.buf.truncate(self.buf.len().saturating_sub(k));
    }

    /// Add one to the trailing `dims.len()` coordinates, treated as a
    /// number whose digit `i` has radix `dims[i]`. The most significant
    /// digit wraps to zero without carrying further; callers stop
    /// after the number of increments they need.
    pub fn increment(&mut self, dims: &[usize]) -> Result<(), NSetError> {
        if dims.len() > self.buf.len() {
            return Err(NSetError::ShapeMismatch(Mismatch::CoordinateCount {
                given: self.buf.len(),
                required: dims.len(),
            }));
        }

        let offset = self.buf.len() - dims.len();
        for (i, &size) in dims.iter().enumerate().rev() {
            let digit = &mut self.buf[offset + i];
            *digit += 1;
            if *digit < size {
                return Ok(());
            }
            *digit = 0;
        }
        Ok(())
    }

    /// Increment a block that is known to be present, such as the block
    /// appended for the container currently being walked.
    pub(crate) fn advance(&mut self, dims: &[usize]) {
        self.increment(dims)
            .expect("index slice holds a block for the current level")
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.buf
    }
}

impl Deref for IndexSlice {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.buf
    }
}

impl From<Vec<usize>> for IndexSlice {
    fn from(buf: Vec<usize>) -> Self {
        Self { buf }
    }
}

impl From<IndexSlice> for Vec<usize> {
    fn from(index: IndexSlice) -> Self {
        index.buf
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_increment_carries() {
        let mut index = IndexSlice::zeros(2);
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(index.to_vec());
            index.increment(&[2, 3]).unwrap();
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2],
            ]
        );
        // A full cycle wraps back to the origin.
        assert_eq!(index.as_slice(), &[0, 0]);
    }

    #[test]
    fn test_increment_only_touches_trailing_block() {
        let mut index = IndexSlice::from(vec![0, 0, 0, 1, 2, 3]);
        index.increment(&[3, 3, 4]).unwrap();
        assert_eq!(index.as_slice(), &[0, 0, 0, 2, 0, 0]);

        let mut index = IndexSlice::from(vec![7, 2, 2, 3]);
        index.increment(&[3, 3, 4]).unwrap();
        assert_eq!(index.as_slice(), &[7, 0, 0, 0]);
    }

    #[test]
    fn test_increment_longer_shape() {
        let mut index = IndexSlice::zeros(1);
        assert_matches!(
            index.increment(&[2, 2]),
            Err(NSetError::ShapeMismatch(Mismatch::CoordinateCount {
                given: 1,
                required: 2
            }))
        );
    }

    #[test]
    fn test_append_and_remove() {
        let mut index = IndexSlice::zeros(1);
        index.append(2, 0);
        index.increment(&[2, 2]).unwrap();
        assert_eq!(index.as_slice(), &[0, 0, 1]);
        index.remove_last(2);
        assert_eq!(index.as_slice(), &[0]);
        index.remove_last(5);
        assert!(index.is_empty());
    }
}
