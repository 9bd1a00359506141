use std::fmt;

use itertools::izip;

use crate::Mismatch;
use crate::NSetError;

/// The dimensions of a single container level, together with the
/// row-major strides used to linearize a coordinate into a slot
/// offset.
///
/// A shape only describes one level of an [`crate::NSet`]; nested
/// containers carry their own, independent shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<usize>,
    strides: Vec<usize>,
}

impl Shape {
    /// Creates a row-major shape from the given dimension sizes. Every
    /// size must be positive, and at least one dimension is required.
    pub fn new(dims: Vec<usize>) -> Result<Self, NSetError> {
        if dims.is_empty() {
            return Err(NSetError::EmptyShape);
        }
        if let Some(dim) = dims.iter().position(|&size| size == 0) {
            return Err(NSetError::ZeroDimension { dim });
        }

        let mut strides = vec![1usize; dims.len()];
        for i in (0..dims.len() - 1).rev() {
            strides[i] = dims[i + 1] * strides[i + 1];
        }
        Ok(Self { dims, strides })
    }

    /// The size of each dimension.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// The row-major stride of each dimension.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// The number of dimensions at this level.
    pub fn num_dim(&self) -> usize {
        self.dims.len()
    }

    /// The number of slots addressed by this shape. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.dims[0] * self.strides[0]
    }

    /// Linearize a coordinate into a slot offset. The coordinate must
    /// have exactly one entry per dimension, and each entry must lie
    /// strictly below its dimension's size.
    pub fn offset(&self, coords: &[usize]) -> Result<usize, NSetError> {
        if coords.len() != self.dims.len() {
            return Err(NSetError::ShapeMismatch(Mismatch::CoordinateCount {
                given: coords.len(),
                required: self.dims.len(),
            }));
        }

        let mut offset = 0;
        for (dim, (&index, &size, &stride)) in
            izip!(coords, &self.dims, &self.strides).enumerate()
        {
            if index >= size {
                return Err(NSetError::IndexOutOfBounds { index, dim, size });
            }
            offset += index * stride;
        }
        Ok(offset)
    }

    /// The inverse of [`Shape::offset`]: recover the coordinate of a
    /// slot from its offset.
    pub fn coordinates(&self, offset: usize) -> Result<Vec<usize>, NSetError> {
        if offset >= self.len() {
            return Err(NSetError::IndexOutOfBounds {
                index: offset,
                dim: 0,
                size: self.len(),
            });
        }

        let mut rest = offset;
        Ok(self
            .strides
            .iter()
            .map(|stride| {
                let index = rest / stride;
                rest %= stride;
                index
            })
            .collect())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, size) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "{}", size)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_row_major_strides() {
        let s = Shape::new(vec![2, 3, 4]).unwrap();
        assert_eq!(s.dims(), &[2, 3, 4]);
        assert_eq!(s.strides(), &[12, 4, 1]);
        assert_eq!(s.num_dim(), 3);
        assert_eq!(s.len(), 24);

        let s = Shape::new(vec![5]).unwrap();
        assert_eq!(s.strides(), &[1]);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn test_invalid_shapes() {
        assert_matches!(Shape::new(vec![]), Err(NSetError::EmptyShape));
        assert_matches!(
            Shape::new(vec![2, 0, 3]),
            Err(NSetError::ZeroDimension { dim: 1 })
        );
    }

    #[test]
    fn test_offset() {
        let s = Shape::new(vec![2, 3]).unwrap();
        assert_eq!(s.offset(&[0, 0]).unwrap(), 0);
        assert_eq!(s.offset(&[0, 2]).unwrap(), 2);
        assert_eq!(s.offset(&[1, 0]).unwrap(), 3);
        assert_eq!(s.offset(&[1, 2]).unwrap(), 5);
    }

    #[test]
    fn test_offset_bounds_are_strict() {
        let s = Shape::new(vec![2, 3]).unwrap();
        assert_matches!(
            s.offset(&[2, 0]),
            Err(NSetError::IndexOutOfBounds {
                index: 2,
                dim: 0,
                size: 2
            })
        );
        assert_matches!(
            s.offset(&[0, 3]),
            Err(NSetError::IndexOutOfBounds {
                index: 3,
                dim: 1,
                size: 3
            })
        );
        assert_matches!(
            s.offset(&[0]),
            Err(NSetError::ShapeMismatch(Mismatch::CoordinateCount {
                given: 1,
                required: 2
            }))
        );
    }

    #[test]
    fn test_coordinates() {
        let s = Shape::new(vec![2, 3]).unwrap();
        for offset in 0..s.len() {
            let coords = s.coordinates(offset).unwrap();
            assert_eq!(s.offset(&coords).unwrap(), offset);
        }
        assert_eq!(s.coordinates(4).unwrap(), vec![1, 1]);
        assert!(s.coordinates(6).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(vec![2, 3]).unwrap().to_string(), "[2x3]");
        assert_eq!(Shape::new(vec![7]).unwrap().to_string(), "[7]");
    }
}
