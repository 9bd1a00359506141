use crate::IndexSlice;

/// A coordinate provider: anything that can be used as (part of) a key
/// into an [`crate::NSet`].
///
/// Providers compose. Slices, arrays and tuples of providers
/// concatenate their members' coordinates in order, so a composite key
/// such as `(&state, &action)` addresses the action container nested
/// under a state.
pub trait Indexable {
    /// Append this provider's coordinates to `index`.
    fn extend_index(&self, index: &mut Vec<usize>);

    /// The flat coordinate sequence of this provider.
    fn to_index(&self) -> Vec<usize> {
        let mut index = Vec::new();
        self.extend_index(&mut index);
        index
    }
}

impl Indexable for usize {
    fn extend_index(&self, index: &mut Vec<usize>) {
        index.push(*self);
    }
}

impl Indexable for IndexSlice {
    fn extend_index(&self, index: &mut Vec<usize>) {
        index.extend_from_slice(self);
    }
}

impl<T: Indexable> Indexable for [T] {
    fn extend_index(&self, index: &mut Vec<usize>) {
        for key in self {
            key.extend_index(index);
        }
    }
}

impl<T: Indexable, const N: usize> Indexable for [T; N] {
    fn extend_index(&self, index: &mut Vec<usize>) {
        self.as_slice().extend_index(index);
    }
}

impl<T: Indexable> Indexable for Vec<T> {
    fn extend_index(&self, index: &mut Vec<usize>) {
        self.as_slice().extend_index(index);
    }
}

impl<T: Indexable + ?Sized> Indexable for &T {
    fn extend_index(&self, index: &mut Vec<usize>) {
        (**self).extend_index(index);
    }
}

macro_rules! tuple_indexable {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: Indexable),+> Indexable for ($($name,)+) {
            fn extend_index(&self, index: &mut Vec<usize>) {
                $(self.$idx.extend_index(index);)+
            }
        }
    };
}

tuple_indexable!(A 0);
tuple_indexable!(A 0, B 1);
tuple_indexable!(A 0, B 1, C 2);
tuple_indexable!(A 0, B 1, C 2, D 3);

#[cfg(test)]
mod tests {
    use super::*;

    struct Cell(usize, usize);

    impl Indexable for Cell {
        fn extend_index(&self, index: &mut Vec<usize>) {
            index.push(self.0);
            index.push(self.1);
        }
    }

    #[test]
    fn test_concatenation() {
        let state = Cell(1, 2);
        let action = vec![3usize];
        assert_eq!((&state, &action).to_index(), vec![1, 2, 3]);
        assert_eq!([Cell(0, 1), Cell(2, 3)].to_index(), vec![0, 1, 2, 3]);
        assert_eq!((4usize, &state, 5usize).to_index(), vec![4, 1, 2, 5]);
    }

    #[test]
    fn test_index_slice_key() {
        let index = IndexSlice::from(vec![2, 0, 1]);
        assert_eq!(index.to_index(), vec![2, 0, 1]);
    }
}
