//! Double-buffered particle storage
//!
//! Two equally sized arrays; `step % 2` picks the one consumers read. The
//! integrator receives the current array as `&[T]` and the next one as
//! `&mut [T]` from a single disjoint borrow, so a step can never read what it
//! is writing.

pub struct PingPong<T> {
    buffers: [Vec<T>; 2],
    step: u64,
}

impl<T: Clone> PingPong<T> {
    pub fn new(len: usize, fill: T) -> Self {
        Self {
            buffers: [vec![fill.clone(); len], vec![fill; len]],
            step: 0,
        }
    }

    /// Allocate both buffers up front and fill them from `init(index)`.
    /// Reports allocation failure instead of aborting.
    pub fn try_from_fn(
        len: usize,
        mut init: impl FnMut(usize) -> T,
    ) -> Result<Self, std::collections::TryReserveError> {
        let mut a = Vec::new();
        a.try_reserve_exact(len)?;
        let mut b = Vec::new();
        b.try_reserve_exact(len)?;
        for i in 0..len {
            let value = init(i);
            b.push(value.clone());
            a.push(value);
        }
        Ok(Self {
            buffers: [a, b],
            step: 0,
        })
    }

    /// Rewrite both buffers from `init(index)` and restart at step 0
    pub fn reset(&mut self, mut init: impl FnMut(usize) -> T) {
        let [a, b] = &mut self.buffers;
        for (i, (slot_a, slot_b)) in a.iter_mut().zip(b.iter_mut()).enumerate() {
            let value = init(i);
            *slot_b = value.clone();
            *slot_a = value;
        }
        self.step = 0;
    }
}

impl<T> PingPong<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.buffers[0].len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffers[0].is_empty()
    }

    #[inline]
    pub fn step(&self) -> u64 {
        self.step
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        (self.step & 1) as usize
    }

    #[inline]
    pub fn current(&self) -> &[T] {
        &self.buffers[self.current_index()]
    }

    /// Mutable access to the current buffer, for edits between steps (pin/unpin)
    #[inline]
    pub fn current_mut(&mut self) -> &mut [T] {
        let idx = self.current_index();
        &mut self.buffers[idx]
    }

    /// (current, next)
    #[inline]
    pub fn split(&mut self) -> (&[T], &mut [T]) {
        let [a, b] = &mut self.buffers;
        if self.step & 1 == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        }
    }

    /// Publish the next buffer. Call once per completed pass.
    #[inline]
    pub fn advance(&mut self) {
        self.step += 1;
    }
}
