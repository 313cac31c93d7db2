//! Append-only storage addressed by typed handles.
//!
//! Traced waves refer to their parent by [`Handle`] instead of by reference,
//! so a whole tree of waves can live in one [`Arena`] without lifetimes
//! tying nodes together.

use std::{
    fmt::Debug,
    hash::Hash,
    marker::PhantomData,
    ops::Index,
};

#[derive(Clone, Debug)]
pub struct Arena<T> {
    slots: Vec<T>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self { slots: vec![] }
    }
}

impl<T> Arena<T> {
    pub fn insert(&mut self, value: T) -> Handle<T> {
        let index = self.slots.len();
        self.slots.push(value);
        Handle::new(index)
    }

    /// Handle of the next value to be inserted.
    pub fn next_handle(&self) -> Handle<T> {
        Handle::new(self.slots.len())
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            iter: self.slots.iter().enumerate(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T> Index<Handle<T>> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &Self::Output {
        &self.slots[handle.index]
    }
}

pub struct Handle<T> {
    index: usize,
    _phantom: PhantomData<fn(&T)>,
}

impl<T> Handle<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _phantom: PhantomData,
        }
    }

    /// Position of the value in insertion order.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Handle").field(&self.index).finish()
    }
}

#[derive(Clone, Debug)]
pub struct Iter<'a, T> {
    iter: std::iter::Enumerate<std::slice::Iter<'a, T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Handle<T>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, item) = self.iter.next()?;
        Some((Handle::new(index), item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (index, item) = self.iter.next_back()?;
        Some((Handle::new(index), item))
    }
}
