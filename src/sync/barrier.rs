//! Saturating countdown barrier.
//!
//! A [`Barrier`] defers a callback until every registered operation has
//! signalled completion. Unlike a one-shot latch it never resets on its own:
//! once the count reaches zero, every further [`Barrier::fire`] invokes the
//! callback again, and [`Barrier::increment`] re-arms it.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use bite::sync::Barrier;
//!
//! let fired = Cell::new(0);
//! let mut barrier = Barrier::with_count(|| fired.set(fired.get() + 1), 2);
//!
//! barrier.fire();
//! assert_eq!(fired.get(), 0);
//! barrier.fire();
//! assert_eq!(fired.get(), 1);
//! ```

use std::fmt;

/// Countdown latch that fires its callback whenever the count is zero.
///
/// The barrier is meant for a single logical thread of control: every
/// operation takes `&mut self` and runs the callback on the caller's stack.
pub struct Barrier<'a> {
    callback: Box<dyn FnMut() + 'a>,
    pending: usize,
}

impl<'a> Barrier<'a> {
    /// Create an unarmed barrier. The first [`fire`](Self::fire) invokes the callback.
    pub fn new(callback: impl FnMut() + 'a) -> Self {
        Self::with_count(callback, 0)
    }

    /// Create a barrier armed with `initial` pending operations.
    ///
    /// Negative counts are clamped to zero.
    pub fn with_count(callback: impl FnMut() + 'a, initial: isize) -> Self {
        Self {
            callback: Box::new(callback),
            pending: initial.max(0) as usize,
        }
    }

    /// Register one more pending operation.
    pub fn increment(&mut self) {
        self.pending += 1;
    }

    /// Signal that one operation finished.
    ///
    /// Never drives the count below zero; firing a released barrier invokes
    /// the callback again.
    pub fn fire(&mut self) {
        if self.pending > 0 {
            self.pending -= 1;
        }
        if self.pending == 0 {
            tracing::trace!("barrier released");
            (self.callback)();
        }
    }

    /// Number of operations still outstanding.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Whether the count has reached zero.
    pub fn is_released(&self) -> bool {
        self.pending == 0
    }
}

impl fmt::Debug for Barrier<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Barrier")
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
