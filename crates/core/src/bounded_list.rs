use std::slice;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("list capacity of {capacity} entries reached")]
pub struct CapacityReached {
    pub capacity: usize,
}

/// Ordered list that refuses new entries once `capacity` is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedList<T> {
    capacity: usize,
    items: Vec<T>,
}

impl<T> BoundedList<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "bounded list capacity must be greater than 0");
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn push(&mut self, item: T) -> Result<(), CapacityReached> {
        if self.is_full() {
            return Err(CapacityReached {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Appends items in order and stops at the first one that does not fit.
    /// Items after that point are never consumed.
    pub fn extend_until_full<I>(&mut self, items: I) -> Result<usize, CapacityReached>
    where
        I: IntoIterator<Item = T>,
    {
        let mut pushed = 0;
        for item in items {
            self.push(item)?;
            pushed += 1;
        }
        Ok(pushed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a BoundedList<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
