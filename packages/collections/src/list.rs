//! Growable, index-addressable sequence.

use crate::CollectionError;
use crate::sort::merge_sort;

/// A resizable sequence of elements addressed by zero-based position.
///
/// Elements are appended at the end and never removed; [`OrderedList::sort`]
/// returns a new list instead of reordering this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedList<T> {
    elements: Vec<T>,
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedList<T> {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Creates an empty list with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Appends an element at the end of the list.
    pub fn append(&mut self, element: T) {
        self.elements.push(element);
    }

    /// Number of elements in the list.
    #[must_use]
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] if `index` is not in
    /// `[0, size)`.
    pub fn get(&self, index: usize) -> Result<&T, CollectionError> {
        self.elements
            .get(index)
            .ok_or(CollectionError::OutOfRange {
                index,
                size: self.elements.len(),
            })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Borrows the contents as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// First `n` elements (fewer if the list is shorter).
    #[must_use]
    pub fn head(&self, n: usize) -> &[T] {
        &self.elements[..n.min(self.elements.len())]
    }

    /// Last `n` elements in list order (fewer if the list is shorter).
    #[must_use]
    pub fn tail(&self, n: usize) -> &[T] {
        let len = self.elements.len();
        &self.elements[len - n.min(len)..]
    }
}

impl<T: Clone> OrderedList<T> {
    /// Returns a new list with the elements ordered by `precedes`.
    ///
    /// `precedes(a, b)` returns `true` when `a` must come before `b`. The
    /// sort is stable: elements the predicate treats as equal keep their
    /// relative order. Multi-key orderings are expressed inside the
    /// predicate itself.
    #[must_use]
    pub fn sort<F>(&self, precedes: F) -> Self
    where
        F: Fn(&T, &T) -> bool,
    {
        let mut elements = self.elements.clone();
        merge_sort(&mut elements, &precedes);
        Self { elements }
    }
}

impl<T> From<Vec<T>> for OrderedList<T> {
    fn from(elements: Vec<T>) -> Self {
        Self { elements }
    }
}

impl<T> FromIterator<T> for OrderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for OrderedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.elements.extend(iter);
    }
}

impl<T> IntoIterator for OrderedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_get() {
        let mut list = OrderedList::new();
        list.append("a");
        list.append("b");

        assert_eq!(list.size(), 2);
        assert_eq!(list.get(0), Ok(&"a"));
        assert_eq!(list.get(1), Ok(&"b"));
    }

    #[test]
    fn get_out_of_range() {
        let list: OrderedList<i32> = vec![1, 2, 3].into();
        assert_eq!(
            list.get(3),
            Err(CollectionError::OutOfRange { index: 3, size: 3 })
        );

        let empty: OrderedList<i32> = OrderedList::new();
        assert!(empty.get(0).is_err());
    }

    #[test]
    fn sort_returns_new_list() {
        let list: OrderedList<i32> = vec![3, 1, 2].into();
        let sorted = list.sort(|a, b| a < b);

        assert_eq!(sorted.as_slice(), &[1, 2, 3]);
        assert_eq!(list.as_slice(), &[3, 1, 2]);
    }

    #[test]
    fn head_and_tail_clamp() {
        let list: OrderedList<i32> = (1..=5).collect();
        assert_eq!(list.head(2), &[1, 2]);
        assert_eq!(list.tail(2), &[4, 5]);
        assert_eq!(list.head(10), &[1, 2, 3, 4, 5]);
        assert_eq!(list.tail(10), &[1, 2, 3, 4, 5]);
        assert!(list.head(0).is_empty());
        assert!(list.tail(0).is_empty());
    }
}
