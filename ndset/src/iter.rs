//! Depth-first traversal of an [`NSet`].
//!
//! Leaves are visited in increasing slot order within each set, and a
//! nested set is walked completely before any of its later siblings.
//! Ascent is driven by an explicit stack of frames held by the
//! iterator, one per open set, so sets never need to know their
//! parent.

use std::iter::FusedIterator;

use crate::IndexSlice;
use crate::NSet;
use crate::NSetError;
use crate::Slot;

/// One open set on the traversal stack.
struct Frame<'a, E> {
    set: &'a NSet<E>,
    visited: usize,
}

/// A single move of the traversal.
enum Step<'a, E> {
    /// A leaf at `position` within a set of shape `dims`.
    Leaf {
        value: &'a E,
        position: usize,
        dims: &'a [usize],
    },
    /// Entering the nested set at `position` within a set of shape `dims`.
    Descend {
        position: usize,
        dims: &'a [usize],
        child: &'a NSet<E>,
    },
    /// Leaving a set of shape `dims`.
    Ascend { dims: &'a [usize] },
}

/// The traversal shared by [`Iter`] and [`Indices`].
struct Traversal<'a, E> {
    stack: Vec<Frame<'a, E>>,
}

impl<'a, E> Traversal<'a, E> {
    fn new(root: &'a NSet<E>) -> Self {
        Self {
            stack: vec![Frame {
                set: root,
                visited: 0,
            }],
        }
    }

    fn step(&mut self) -> Option<Step<'a, E>> {
        let frame = self.stack.last_mut()?;
        let set: &'a NSet<E> = frame.set;
        let dims = set.shape().dims();
        let position = frame.visited;
        match set.slots().get(position) {
            None => {
                self.stack.pop();
                Some(Step::Ascend { dims })
            }
            Some(Slot::Leaf(value)) => {
                frame.visited += 1;
                Some(Step::Leaf {
                    value,
                    position,
                    dims,
                })
            }
            Some(Slot::Nested(child)) => {
                frame.visited += 1;
                self.stack.push(Frame {
                    set: child,
                    visited: 0,
                });
                Some(Step::Descend {
                    position,
                    dims,
                    child,
                })
            }
        }
    }

    fn is_done(&self) -> bool {
        self.stack.is_empty()
    }
}

/// Iterator over the leaves of an [`NSet`]. Created by [`NSet::iter`].
pub struct Iter<'a, E> {
    traversal: Traversal<'a, E>,
}

impl<'a, E> Iter<'a, E> {
    pub(crate) fn new(set: &'a NSet<E>) -> Self {
        Self {
            traversal: Traversal::new(set),
        }
    }

    /// The next leaf, or [`NSetError::EmptyIteration`] once every leaf
    /// has been produced.
    pub fn try_next(&mut self) -> Result<&'a E, NSetError> {
        self.next().ok_or(NSetError::EmptyIteration)
    }
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Step::Leaf { value, .. } = self.traversal.step()? {
                return Some(value);
            }
        }
    }
}

impl<E> FusedIterator for Iter<'_, E> {}

/// Iterator over the full coordinate of every leaf of an [`NSet`].
/// Created by [`NSet::indices`].
///
/// The coordinate is kept in one [`IndexSlice`]: entering a nested set
/// appends a zeroed block for its dimensions, moving to a later
/// sibling increments the innermost block, and leaving a set removes
/// its block.
pub struct Indices<'a, E> {
    traversal: Traversal<'a, E>,
    index: IndexSlice,
}

impl<'a, E> Indices<'a, E> {
    pub(crate) fn new(set: &'a NSet<E>) -> Self {
        Self {
            traversal: Traversal::new(set),
            index: IndexSlice::zeros(set.num_dim()),
        }
    }

    /// The next coordinate, or [`NSetError::EmptyIteration`] once every
    /// leaf has been visited.
    pub fn try_next(&mut self) -> Result<Vec<usize>, NSetError> {
        self.next().ok_or(NSetError::EmptyIteration)
    }
}

impl<E> Iterator for Indices<'_, E> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.traversal.step()? {
                Step::Leaf { position, dims, .. } => {
                    if position > 0 {
                        self.index.advance(dims);
                    }
                    return Some(self.index.to_vec());
                }
                Step::Descend {
                    position,
                    dims,
                    child,
                } => {
                    if position > 0 {
                        self.index.advance(dims);
                    }
                    self.index.append(child.num_dim(), 0);
                }
                Step::Ascend { dims } => {
                    if !self.traversal.is_done() {
                        self.index.remove_last(dims.len());
                    }
                }
            }
        }
    }
}

impl<E> FusedIterator for Indices<'_, E> {}

/// Mutable iterator over the leaves of an [`NSet`]. Created by
/// [`NSet::iter_mut`].
pub struct IterMut<'a, E> {
    stack: Vec<std::slice::IterMut<'a, Slot<E>>>,
}

impl<'a, E> IterMut<'a, E> {
    pub(crate) fn new(set: &'a mut NSet<E>) -> Self {
        Self {
            stack: vec![set.slots_mut().iter_mut()],
        }
    }
}

impl<'a, E> Iterator for IterMut<'a, E> {
    type Item = &'a mut E;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            match frame.next() {
                None => {
                    self.stack.pop();
                }
                Some(Slot::Leaf(value)) => return Some(value),
                Some(Slot::Nested(child)) => self.stack.push(child.slots_mut().iter_mut()),
            }
        }
    }
}

impl<E> FusedIterator for IterMut<'_, E> {}
