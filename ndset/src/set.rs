use std::convert::Infallible;
use std::ops::Index;
use std::ops::IndexMut;

use enum_as_inner::EnumAsInner;

use crate::IndexSlice;
use crate::Indexable;
use crate::iter::Indices;
use crate::iter::Iter;
use crate::iter::IterMut;
use crate::shape::Shape;

/// Errors raised while constructing or addressing an [`NSet`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NSetError {
    #[error("index {index} out of bounds for dimension {dim} of size {size}")]
    IndexOutOfBounds {
        index: usize,
        dim: usize,
        size: usize,
    },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(Mismatch),

    #[error("iterator advanced past its last element")]
    EmptyIteration,

    #[error("a shape needs at least one dimension")]
    EmptyShape,

    #[error("dimension {dim} has size zero")]
    ZeroDimension { dim: usize },
}

/// The ways a coordinate sequence can fail to line up with the nesting
/// of an [`NSet`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Mismatch {
    #[error("{given} coordinates given where {required} are required")]
    CoordinateCount { given: usize, required: usize },

    #[error("reached a leaf with {remaining} coordinates left over")]
    LeafReached { remaining: usize },

    #[error("addressed slot holds a nested set, not a leaf")]
    NotLeaf,

    #[error("addressed slot holds a leaf, not a nested set")]
    NotNested,
}

/// The content of one position in an [`NSet`]: either a terminal value
/// or an independently shaped child set.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum Slot<E> {
    Leaf(E),
    Nested(NSet<E>),
}

/// A multi-dimensional, possibly ragged, indexed collection.
///
/// Each level is a dense row-major block of [`Slot`]s described by a
/// [`Shape`]. A slot may hold a further `NSet`, whose shape is
/// unrelated to its siblings', so the whole structure is a tree of
/// rectangular blocks. Coordinates are addressed hierarchically: the
/// first `num_dim()` entries select a slot at this level and any
/// remaining entries are resolved by the nested set in that slot.
///
/// ```
/// use ndset::NSet;
/// use ndset::Slot;
///
/// // A 2-slot root whose second slot holds a 3-slot child.
/// let set = NSet::new(&[2], |index| match index[0] {
///     0 => Slot::Leaf(0.5),
///     _ => Slot::Nested(NSet::filled(&[3], 1.0).unwrap()),
/// })
/// .unwrap();
/// assert_eq!(set.leaf_count(), 4);
/// assert_eq!(set[[1, 2]], 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NSet<E> {
    shape: Shape,
    slots: Vec<Slot<E>>,
}

// Compile-time check: sets of plain values are fully owned and can be
// moved across threads.
fn _assert_nset_traits()
where
    NSet<f64>: Send + Sync + 'static,
{
}

impl<E> NSet<E> {
    /// Build a set of the given dimensions. `generator` is called once
    /// per slot, in row-major order, with the slot's coordinate. It may
    /// return a nested set to make the structure ragged.
    pub fn new<F>(dims: &[usize], mut generator: F) -> Result<Self, NSetError>
    where
        F: FnMut(&[usize]) -> Slot<E>,
    {
        Self::try_new(dims, |index| Ok::<_, NSetError>(generator(index)))
    }

    /// Like [`NSet::new`], with a generator that can fail.
    pub fn try_new<F, Err>(dims: &[usize], mut generator: F) -> Result<Self, Err>
    where
        F: FnMut(&[usize]) -> Result<Slot<E>, Err>,
        Err: From<NSetError>,
    {
        let shape = Shape::new(dims.to_vec())?;
        let mut index = IndexSlice::zeros(shape.num_dim());
        let mut slots = Vec::with_capacity(shape.len());
        for _ in 0..shape.len() {
            slots.push(generator(index.as_slice())?);
            index.advance(shape.dims());
        }
        Ok(Self { shape, slots })
    }

    /// A dense set whose leaves are produced by `f`.
    pub fn from_fn<F>(dims: &[usize], mut f: F) -> Result<Self, NSetError>
    where
        F: FnMut(&[usize]) -> E,
    {
        Self::new(dims, |index| Slot::Leaf(f(index)))
    }

    /// A dense set with every leaf set to `value`.
    pub fn filled(dims: &[usize], value: E) -> Result<Self, NSetError>
    where
        E: Clone,
    {
        Self::from_fn(dims, |_| value.clone())
    }

    /// Build a set with exactly the shape graph of `template`: the same
    /// nesting and the same dimensions at every level. `generator` is
    /// called once per template leaf, in [`NSet::iter`] order, with the
    /// leaf's full coordinate.
    pub fn like<T, F>(template: &NSet<T>, mut generator: F) -> Self
    where
        F: FnMut(&[usize]) -> Slot<E>,
    {
        match Self::try_like(template, |index| Ok::<_, Infallible>(generator(index))) {
            Ok(set) => set,
            Err(never) => match never {},
        }
    }

    /// [`NSet::like`] with a generator producing leaf values.
    pub fn like_fn<T, F>(template: &NSet<T>, mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> E,
    {
        Self::like(template, |index| Slot::Leaf(f(index)))
    }

    /// [`NSet::like`] with a generator that can fail.
    pub fn try_like<T, F, Err>(template: &NSet<T>, mut generator: F) -> Result<Self, Err>
    where
        F: FnMut(&[usize]) -> Result<Slot<E>, Err>,
    {
        let mut index = IndexSlice::default();
        Self::copy_shape(template, &mut index, &mut generator)
    }

    fn copy_shape<T, F, Err>(
        template: &NSet<T>,
        index: &mut IndexSlice,
        generator: &mut F,
    ) -> Result<Self, Err>
    where
        F: FnMut(&[usize]) -> Result<Slot<E>, Err>,
    {
        let dims = template.shape.dims();
        index.append(dims.len(), 0);
        let mut slots = Vec::with_capacity(template.slots.len());
        for (position, slot) in template.slots.iter().enumerate() {
            if position > 0 {
                index.advance(dims);
            }
            slots.push(match slot {
                Slot::Leaf(_) => generator(index.as_slice())?,
                Slot::Nested(child) => Slot::Nested(Self::copy_shape(child, index, generator)?),
            });
        }
        index.remove_last(dims.len());
        Ok(Self {
            shape: template.shape.clone(),
            slots,
        })
    }

    /// The shape of the top level.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The number of dimensions of the top level.
    pub fn num_dim(&self) -> usize {
        self.shape.num_dim()
    }

    /// The number of slots at the top level.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The top-level slots, in row-major order.
    pub fn slots(&self) -> &[Slot<E>] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Slot<E>] {
        &mut self.slots
    }

    /// Resolve this level's share of `index`, returning the slot offset
    /// and the coordinates left for nested levels.
    fn locate<'i>(&self, index: &'i [usize]) -> Result<(usize, &'i [usize]), NSetError> {
        let num_dim = self.shape.num_dim();
        if index.len() < num_dim {
            return Err(NSetError::ShapeMismatch(Mismatch::CoordinateCount {
                given: index.len(),
                required: num_dim,
            }));
        }
        let (head, rest) = index.split_at(num_dim);
        Ok((self.shape.offset(head)?, rest))
    }

    /// The slot addressed by `index`, which may be a leaf or a nested
    /// set.
    pub fn slot(&self, index: &[usize]) -> Result<&Slot<E>, NSetError> {
        let (offset, rest) = self.locate(index)?;
        let slot = &self.slots[offset];
        if rest.is_empty() {
            return Ok(slot);
        }
        match slot {
            Slot::Nested(child) => child.slot(rest),
            Slot::Leaf(_) => Err(NSetError::ShapeMismatch(Mismatch::LeafReached {
                remaining: rest.len(),
            })),
        }
    }

    pub fn slot_mut(&mut self, index: &[usize]) -> Result<&mut Slot<E>, NSetError> {
        let (offset, rest) = self.locate(index)?;
        let slot = &mut self.slots[offset];
        if rest.is_empty() {
            return Ok(slot);
        }
        match slot {
            Slot::Nested(child) => child.slot_mut(rest),
            Slot::Leaf(_) => Err(NSetError::ShapeMismatch(Mismatch::LeafReached {
                remaining: rest.len(),
            })),
        }
    }

    /// The leaf value at `index`.
    pub fn get(&self, index: &[usize]) -> Result<&E, NSetError> {
        match self.slot(index)? {
            Slot::Leaf(value) => Ok(value),
            Slot::Nested(_) => Err(NSetError::ShapeMismatch(Mismatch::NotLeaf)),
        }
    }

    pub fn get_mut(&mut self, index: &[usize]) -> Result<&mut E, NSetError> {
        match self.slot_mut(index)? {
            Slot::Leaf(value) => Ok(value),
            Slot::Nested(_) => Err(NSetError::ShapeMismatch(Mismatch::NotLeaf)),
        }
    }

    /// Store `value` as a leaf at `index`, returning the previous
    /// content of the slot. A nested set previously held there is
    /// dropped from the structure and handed back to the caller.
    pub fn set(&mut self, index: &[usize], value: E) -> Result<Slot<E>, NSetError> {
        let slot = self.slot_mut(index)?;
        Ok(std::mem::replace(slot, Slot::Leaf(value)))
    }

    /// Apply `f` to the leaf at `index` in place.
    pub fn update<F>(&mut self, index: &[usize], f: F) -> Result<(), NSetError>
    where
        F: FnOnce(&mut E),
    {
        f(self.get_mut(index)?);
        Ok(())
    }

    /// The nested set at `index`.
    pub fn subset(&self, index: &[usize]) -> Result<&NSet<E>, NSetError> {
        match self.slot(index)? {
            Slot::Nested(child) => Ok(child),
            Slot::Leaf(_) => Err(NSetError::ShapeMismatch(Mismatch::NotNested)),
        }
    }

    pub fn subset_mut(&mut self, index: &[usize]) -> Result<&mut NSet<E>, NSetError> {
        match self.slot_mut(index)? {
            Slot::Nested(child) => Ok(child),
            Slot::Leaf(_) => Err(NSetError::ShapeMismatch(Mismatch::NotNested)),
        }
    }

    /// Replace one of this set's own slots with a whole subtree. The
    /// index must address a direct child, i.e. have exactly
    /// `num_dim()` coordinates.
    pub fn set_subset(&mut self, index: &[usize], subset: NSet<E>) -> Result<Slot<E>, NSetError> {
        if index.len() != self.shape.num_dim() {
            return Err(NSetError::ShapeMismatch(Mismatch::CoordinateCount {
                given: index.len(),
                required: self.shape.num_dim(),
            }));
        }
        let offset = self.shape.offset(index)?;
        Ok(std::mem::replace(
            &mut self.slots[offset],
            Slot::Nested(subset),
        ))
    }

    /// [`NSet::get`] keyed by one or more coordinate providers.
    pub fn get_key<K: Indexable + ?Sized>(&self, key: &K) -> Result<&E, NSetError> {
        self.get(&key.to_index())
    }

    pub fn get_key_mut<K: Indexable + ?Sized>(&mut self, key: &K) -> Result<&mut E, NSetError> {
        self.get_mut(&key.to_index())
    }

    /// [`NSet::set`] keyed by one or more coordinate providers.
    pub fn set_key<K: Indexable + ?Sized>(
        &mut self,
        key: &K,
        value: E,
    ) -> Result<Slot<E>, NSetError> {
        self.set(&key.to_index(), value)
    }

    pub fn update_key<K, F>(&mut self, key: &K, f: F) -> Result<(), NSetError>
    where
        K: Indexable + ?Sized,
        F: FnOnce(&mut E),
    {
        self.update(&key.to_index(), f)
    }

    /// The total number of leaves, across all levels.
    pub fn leaf_count(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| match slot {
                Slot::Leaf(_) => 1,
                Slot::Nested(child) => child.leaf_count(),
            })
            .sum()
    }

    /// The number of levels on the deepest path; a flat set has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .slots
            .iter()
            .filter_map(|slot| slot.as_nested().map(NSet::depth))
            .max()
            .unwrap_or(0)
    }

    /// Whether `self` and `other` have identical shape graphs, ignoring
    /// leaf values.
    pub fn same_shape<T>(&self, other: &NSet<T>) -> bool {
        self.shape == other.shape
            && self
                .slots
                .iter()
                .zip(&other.slots)
                .all(|pair| match pair {
                    (Slot::Leaf(_), Slot::Leaf(_)) => true,
                    (Slot::Nested(a), Slot::Nested(b)) => a.same_shape(b),
                    _ => false,
                })
    }

    /// Whether sibling slots anywhere in the tree differ in kind or
    /// shape, so that the structure is not a plain rectangular array.
    pub fn is_ragged(&self) -> bool {
        let Some((first, rest)) = self.slots.split_first() else {
            return false;
        };
        match first {
            Slot::Leaf(_) => rest.iter().any(Slot::is_nested),
            Slot::Nested(head) => {
                head.is_ragged()
                    || rest.iter().any(|slot| match slot {
                        Slot::Leaf(_) => true,
                        Slot::Nested(child) => !child.same_shape(head),
                    })
            }
        }
    }

    /// A set with the same shape graph whose leaves are `f` applied to
    /// this set's leaves.
    pub fn map<T, F>(&self, mut f: F) -> NSet<T>
    where
        F: FnMut(&E) -> T,
    {
        self.map_with(&mut f)
    }

    fn map_with<T, F>(&self, f: &mut F) -> NSet<T>
    where
        F: FnMut(&E) -> T,
    {
        NSet {
            shape: self.shape.clone(),
            slots: self
                .slots
                .iter()
                .map(|slot| match slot {
                    Slot::Leaf(value) => Slot::Leaf(f(value)),
                    Slot::Nested(child) => Slot::Nested(child.map_with(f)),
                })
                .collect(),
        }
    }

    /// Iterate over all leaves, depth first.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter::new(self)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, E> {
        IterMut::new(self)
    }

    /// Iterate over the full coordinate of every leaf, in the same order
    /// as [`NSet::iter`].
    pub fn indices(&self) -> Indices<'_, E> {
        Indices::new(self)
    }

    /// Pairs of leaf coordinates and values.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (Vec<usize>, &E)> + '_ {
        self.indices().zip(self.iter())
    }
}

impl<E> Index<&[usize]> for NSet<E> {
    type Output = E;

    fn index(&self, index: &[usize]) -> &E {
        self.get(index).unwrap_or_else(|err| panic!("{}", err))
    }
}

impl<E> IndexMut<&[usize]> for NSet<E> {
    fn index_mut(&mut self, index: &[usize]) -> &mut E {
        self.get_mut(index).unwrap_or_else(|err| panic!("{}", err))
    }
}

impl<E, const N: usize> Index<[usize; N]> for NSet<E> {
    type Output = E;

    fn index(&self, index: [usize; N]) -> &E {
        self.get(&index).unwrap_or_else(|err| panic!("{}", err))
    }
}

impl<E, const N: usize> IndexMut<[usize; N]> for NSet<E> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut E {
        self.get_mut(&index).unwrap_or_else(|err| panic!("{}", err))
    }
}

impl<'a, E> IntoIterator for &'a NSet<E> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, E> IntoIterator for &'a mut NSet<E> {
    type Item = &'a mut E;
    type IntoIter = IterMut<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Construct a dense [`NSet`] of the given dimensions with every leaf
/// set to a clone of the value after the `;`.
///
/// ```
/// let q = ndset::nset![2, 3; 0.0];
/// assert_eq!(q.shape().dims(), &[2, 3]);
/// assert_eq!(q.leaf_count(), 6);
/// ```
#[macro_export]
macro_rules! nset {
    ( $( $dim:expr ),+ ; $value:expr ) => {
        $crate::NSet::filled(&[ $( $dim ),+ ], $value).unwrap()
    };
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    /// Root of length 2: a leaf, then a nested set of 2 leaves.
    fn ragged() -> NSet<i32> {
        NSet::new(&[2], |index| match index[0] {
            0 => Slot::Leaf(10),
            _ => Slot::Nested(NSet::from_fn(&[2], |i| 20 + i[0] as i32).unwrap()),
        })
        .unwrap()
    }

    #[test]
    fn test_dense_get() {
        let c = NSet::from_fn(&[2, 2], |i| (i[0] * i[1]) as f64).unwrap();
        assert_eq!(c[[1, 1]], 1.0);
        assert_eq!(c[[0, 1]], 0.0);
        assert_eq!(c[[1, 0]], 0.0);
        assert_eq!(*c.get(&[1, 1]).unwrap(), 1.0);
    }

    #[test]
    fn test_generator_order() {
        let mut seen = Vec::new();
        let c = NSet::from_fn(&[2, 3], |i| {
            seen.push(i.to_vec());
            i[0] * 3 + i[1]
        })
        .unwrap();
        assert_eq!(c.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[4], vec![1, 1]);
    }

    #[test]
    fn test_set_then_get() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut c = NSet::filled(&[3, 4, 2], 0u64).unwrap();
        for _ in 0..100 {
            let index = [
                rng.gen_range(0..3),
                rng.gen_range(0..4),
                rng.gen_range(0..2),
            ];
            let value: u64 = rng.gen();
            c.set(&index, value).unwrap();
            assert_eq!(*c.get(&index).unwrap(), value);
        }
    }

    #[test]
    fn test_set_returns_previous() {
        let mut c = ragged();
        assert_eq!(c.set(&[0], 11).unwrap(), Slot::Leaf(10));
        assert_eq!(c[[0]], 11);

        let previous = c.set(&[1], 30).unwrap();
        assert_eq!(previous.into_nested().unwrap().leaf_count(), 2);
        assert_eq!(c.leaf_count(), 2);
        assert!(!c.is_ragged());
    }

    #[test]
    fn test_hierarchical_access() {
        let mut c = ragged();
        assert_eq!(c[[0]], 10);
        assert_eq!(c[[1, 0]], 20);
        assert_eq!(c[[1, 1]], 21);
        assert_eq!(c.subset(&[1]).unwrap().leaf_count(), 2);

        c[[1, 1]] += 5;
        assert_eq!(*c.get(&[1, 1]).unwrap(), 26);
        c.update(&[1, 0], |v| *v *= 2).unwrap();
        assert_eq!(c[[1, 0]], 40);
    }

    #[test]
    fn test_too_many_coordinates() {
        let mut c = ragged();
        assert_matches!(
            c.get(&[0, 0]),
            Err(NSetError::ShapeMismatch(Mismatch::LeafReached { remaining: 1 }))
        );
        assert_matches!(
            c.set(&[0, 1], 3),
            Err(NSetError::ShapeMismatch(Mismatch::LeafReached { remaining: 1 }))
        );
        let dense = nset![2, 2; 0];
        assert_matches!(
            dense.get(&[0, 0, 0, 0]),
            Err(NSetError::ShapeMismatch(Mismatch::LeafReached { remaining: 2 }))
        );
    }

    #[test]
    fn test_too_few_coordinates() {
        let c = ragged();
        assert_matches!(
            c.get(&[1]),
            Err(NSetError::ShapeMismatch(Mismatch::NotLeaf))
        );
        let dense = nset![2, 2; 0];
        assert_matches!(
            dense.get(&[1]),
            Err(NSetError::ShapeMismatch(Mismatch::CoordinateCount {
                given: 1,
                required: 2
            }))
        );
        assert_matches!(
            c.subset(&[0]),
            Err(NSetError::ShapeMismatch(Mismatch::NotNested))
        );
    }

    #[test]
    fn test_out_of_bounds() {
        let c = ragged();
        assert_matches!(
            c.get(&[2]),
            Err(NSetError::IndexOutOfBounds {
                index: 2,
                dim: 0,
                size: 2
            })
        );
        assert_matches!(
            c.get(&[1, 2]),
            Err(NSetError::IndexOutOfBounds {
                index: 2,
                dim: 0,
                size: 2
            })
        );
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_operator_panics() {
        let c = nset![2; 1.0];
        let _value = c[[2]];
    }

    #[test]
    fn test_set_subset() {
        let mut c = nset![2, 2; 0];
        let old = c.set_subset(&[0, 1], nset![3; 7]).unwrap();
        assert_eq!(old, Slot::Leaf(0));
        assert_eq!(c[[0, 1, 2]], 7);
        assert_eq!(c.leaf_count(), 6);
        assert!(c.is_ragged());

        assert_matches!(
            c.set_subset(&[0, 1, 0], nset![1; 0]),
            Err(NSetError::ShapeMismatch(Mismatch::CoordinateCount {
                given: 3,
                required: 2
            }))
        );
    }

    #[test]
    fn test_like_copies_shape_graph() {
        let template = NSet::new(&[3], |index| match index[0] {
            0 => Slot::Leaf("a"),
            1 => Slot::Nested(
                NSet::new(&[2, 1], |i| match i[0] {
                    0 => Slot::Nested(nset![4; "b"]),
                    _ => Slot::Leaf("c"),
                })
                .unwrap(),
            ),
            _ => Slot::Nested(nset![2; "d"]),
        })
        .unwrap();
        assert_eq!(template.leaf_count(), 8);

        let mut calls = Vec::new();
        let copy: NSet<usize> = NSet::like_fn(&template, |index| {
            calls.push(index.to_vec());
            calls.len()
        });
        assert_eq!(calls.len(), 8);
        assert!(copy.same_shape(&template));
        assert_eq!(copy.depth(), 3);
        assert_eq!(calls, template.indices().collect::<Vec<_>>());
        assert_eq!(calls[1], vec![1, 0, 0, 0]);
        assert_eq!(copy[[1, 0, 0, 3]], 5);
        assert_eq!(copy[[2, 1]], 8);
    }

    #[test]
    fn test_try_like_propagates_errors() {
        let template = nset![3; ()];
        let result: Result<NSet<usize>, NSetError> = NSet::try_like(&template, |index| {
            if index[0] == 2 {
                Err(NSetError::EmptyShape)
            } else {
                Ok(Slot::Leaf(index[0]))
            }
        });
        assert_matches!(result, Err(NSetError::EmptyShape));
    }

    #[test]
    fn test_same_shape_and_raggedness() {
        assert!(!nset![2, 3; 0].is_ragged());
        assert!(ragged().is_ragged());
        assert!(!nset![2, 3; 0].same_shape(&nset![3, 2; 0]));
        assert!(nset![2, 3; 0].same_shape(&nset![2, 3; "x"]));

        let uniform = NSet::new(&[2], |_| Slot::Nested(nset![3; 0])).unwrap();
        assert!(!uniform.is_ragged());
        assert_eq!(uniform.depth(), 2);
    }

    #[test]
    fn test_map() {
        let c = ragged();
        let doubled = c.map(|v| *v as f64 * 2.0);
        assert!(doubled.same_shape(&c));
        assert_eq!(doubled.iter().copied().collect::<Vec<_>>(), vec![20.0, 40.0, 42.0]);
    }

    #[test]
    fn test_invalid_dims() {
        assert_matches!(NSet::filled(&[], 0), Err(NSetError::EmptyShape));
        assert_matches!(
            NSet::filled(&[3, 0], 0),
            Err(NSetError::ZeroDimension { dim: 1 })
        );
    }
}
