//! Array-backed binary min-heap ordered through [`Comparable`].
//!
//! The element at index 0 is always the least. Callers that mutate an
//! element in place through [`BinaryHeap::as_mut_slice`] must call
//! [`BinaryHeap::fix`] on its index before any other operation.

pub use comparable::Comparable;

#[derive(Debug, Clone)]
pub struct BinaryHeap<T> {
    data: Vec<T>,
}

impl<T> BinaryHeap<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    /// Elements in heap order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: Comparable> BinaryHeap<T> {
    /// Builds a heap from arbitrary values in O(n).
    pub fn from_vec(values: Vec<T>) -> Self {
        let mut heap = Self { data: values };
        heap.heapify();
        heap
    }

    /// Replaces the contents with `values` and re-establishes heap order.
    pub fn init(&mut self, values: Vec<T>) {
        self.data = values;
        self.heapify();
    }

    fn heapify(&mut self) {
        let n = self.data.len();
        for i in (0..n / 2).rev() {
            self.down(i, n);
        }
    }

    pub fn push(&mut self, item: T) {
        self.data.push(item);
        self.up(self.data.len() - 1);
    }

    pub fn pop(&mut self) -> Option<T> {
        let n = self.data.len().checked_sub(1)?;
        self.data.swap(0, n);
        self.down(0, n);
        self.data.pop()
    }

    /// Restores heap order after the element at `i` changed.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn fix(&mut self, i: usize) {
        self.check_index(i);
        if !self.down(i, self.data.len()) {
            self.up(i);
        }
    }

    /// Removes and returns the element at `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    pub fn remove(&mut self, i: usize) -> T {
        self.check_index(i);
        let item = self.data.swap_remove(i);
        if i < self.data.len() && !self.down(i, self.data.len()) {
            self.up(i);
        }
        item
    }

    /// Consumes the heap and returns its elements in ascending order.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut end = self.data.len();
        while end > 1 {
            end -= 1;
            self.data.swap(0, end);
            self.down(0, end);
        }
        self.data.reverse();
        self.data
    }

    fn check_index(&self, i: usize) {
        let len = self.data.len();
        assert!(i < len, "index out of bounds: the len is {len} but the index is {i}");
    }

    fn up(&mut self, mut j: usize) {
        while j > 0 {
            let i = (j - 1) / 2;
            if !self.data[j].less(&self.data[i]) {
                break;
            }
            self.data.swap(i, j);
            j = i;
        }
    }

    /// Sifts `i0` down within `data[..n]`; true if it moved.
    fn down(&mut self, i0: usize, n: usize) -> bool {
        let mut i = i0;
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let mut j = left;
            if left + 1 < n && self.data[left + 1].less(&self.data[left]) {
                j = left + 1;
            }
            if !self.data[j].less(&self.data[i]) {
                break;
            }
            self.data.swap(i, j);
            i = j;
        }
        i > i0
    }
}

impl<T> Default for BinaryHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Comparable> From<Vec<T>> for BinaryHeap<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl<T: Comparable> FromIterator<T> for BinaryHeap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Comparable> Extend<T> for BinaryHeap<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
