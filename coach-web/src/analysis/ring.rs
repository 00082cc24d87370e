//! Fixed-capacity rolling buffer of samples
//!
//! Keeps the last `N` values in chronological order. Backs the angle
//! smoother and the per-side visibility history.

/// Rolling buffer that maintains the last `N` samples
#[derive(Clone, Debug)]
pub struct RingBuffer<const N: usize> {
    /// Circular buffer data
    data: [f32; N],

    /// Current write position (points to next slot to write)
    write_index: usize,

    /// Whether buffer has been filled at least once
    filled: bool,
}

impl<const N: usize> RingBuffer<N> {
    pub fn new() -> Self {
        Self {
            data: [0.0; N],
            write_index: 0,
            filled: false,
        }
    }

    /// Push a sample, overwriting the oldest one once full
    pub fn push(&mut self, value: f32) {
        if N == 0 {
            return;
        }
        self.data[self.write_index] = value;
        self.write_index = (self.write_index + 1) % N;

        // Mark as filled when we wrap around
        if self.write_index == 0 {
            self.filled = true;
        }
    }

    pub fn len(&self) -> usize {
        if self.filled {
            N
        } else {
            self.write_index
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.filled
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let (start, count) = if self.filled {
            (self.write_index, N)
        } else {
            (0, self.write_index)
        };
        (0..count).map(move |i| self.data[(start + i) % N])
    }

    /// Arithmetic mean of the held samples
    pub fn mean(&self) -> Option<f32> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        Some(self.iter().sum::<f32>() / len as f32)
    }

    pub fn clear(&mut self) {
        self.data = [0.0; N];
        self.write_index = 0;
        self.filled = false;
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
