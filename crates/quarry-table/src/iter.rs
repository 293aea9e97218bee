//! Borrowing iterators over a table's live entries.

#![allow(unsafe_code)]

use std::iter::FusedIterator;
use std::slice;

use crate::table::Entry;

/// Shared iterator over `(key, value)` pairs, in slot order.
///
/// Created by [`Table::iter`](crate::Table::iter).
pub struct Iter<'a, K, V> {
    slots: slice::Iter<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(slots: &'a [Entry<K, V>], live: usize) -> Self {
        Self {
            slots: slots.iter(),
            remaining: live,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.slots.find(|e| e.signature.is_occupied())?;
        self.remaining -= 1;
        // SAFETY: only occupied slots get past the filter above.
        Some(unsafe { entry.pair() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            remaining: self.remaining,
        }
    }
}

/// Iterator over `(key, value)` pairs with mutable values, in slot order.
///
/// Created by [`Table::iter_mut`](crate::Table::iter_mut).
pub struct IterMut<'a, K, V> {
    slots: slice::IterMut<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(slots: &'a mut [Entry<K, V>], live: usize) -> Self {
        Self {
            slots: slots.iter_mut(),
            remaining: live,
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.slots.find(|e| e.signature.is_occupied())?;
        self.remaining -= 1;
        // SAFETY: only occupied slots get past the filter above.
        Some(unsafe { entry.pair_mut() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}
