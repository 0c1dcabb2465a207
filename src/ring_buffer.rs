//! Fixed-capacity circular buffer for graph history and peak hold.
//!
//! Each metric widget owns one (or two, for dual metrics) of these. The
//! buffer never reallocates after construction: `push` writes at the head
//! and, once full, overwrites the oldest sample.
//!
//! # Layout
//!
//! ```text
//! capacity = 5, after pushing 1..=7:
//!
//!   storage: [6, 7, 3, 4, 5]
//!                   ^head
//!   ordered: [3, 4, 5, 6, 7]   (oldest first)
//! ```
//!
//! Readout is always oldest-first so graph renderers can walk the samples
//! left to right with the latest value landing on the right edge.

// =============================================================================
// Ring Buffer
// =============================================================================

/// Bounded FIFO with overwrite-oldest semantics.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    /// Backing storage, allocated once with `capacity` slots.
    data: Vec<T>,

    /// Next write position.
    head: usize,

    /// Number of valid samples (saturates at capacity).
    count: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create an empty buffer. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: vec![T::default(); capacity],
            head: 0,
            count: 0,
        }
    }

    /// Append a sample, evicting the oldest one when full.
    pub fn push(
        &mut self,
        value: T,
    ) {
        let cap = self.data.len();
        self.data[self.head] = value;
        self.head = (self.head + 1) % cap;
        if self.count < cap {
            self.count += 1;
        }
    }

    /// Number of valid samples.
    #[inline]
    pub const fn len(&self) -> usize { self.count }

    /// Maximum number of samples.
    #[inline]
    pub fn capacity(&self) -> usize { self.data.len() }

    #[inline]
    pub fn is_full(&self) -> bool { self.count == self.data.len() }

    #[inline]
    pub const fn is_empty(&self) -> bool { self.count == 0 }

    /// Index of the oldest valid sample in `data`.
    #[inline]
    fn start(&self) -> usize {
        let cap = self.data.len();
        (self.head + cap - self.count) % cap
    }

    /// The `i`-th sample, oldest first. Out of range returns `T::default()`.
    pub fn get(
        &self,
        i: usize,
    ) -> T {
        if i >= self.count {
            return T::default();
        }
        self.data[(self.start() + i) % self.data.len()]
    }

    /// Most recent sample, if any.
    pub fn latest(&self) -> Option<T> {
        if self.count == 0 {
            None
        } else {
            Some(self.get(self.count - 1))
        }
    }

    /// Iterate samples oldest first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ { (0..self.count).map(move |i| self.get(i)) }

    /// Freshly allocated ordered copy (oldest first).
    pub fn to_vec(&self) -> Vec<T> { self.iter().collect() }

    /// Copy into a caller-owned buffer, reusing its allocation.
    pub fn copy_into(
        &self,
        out: &mut Vec<T>,
    ) {
        out.clear();
        out.extend(self.iter());
    }

    /// Reset head and count. Storage is left as-is.
    pub const fn clear(&mut self) {
        self.head = 0;
        self.count = 0;
    }
}

impl RingBuffer<f64> {
    /// Largest sample, or `None` when empty.
    pub fn max_value(&self) -> Option<f64> { self.iter().reduce(f64::max) }
}

// =============================================================================
// Tests
// =============================================================================
