// Copyright 2024 the conlog developers
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module defines the `Cutoff` abstraction: an externally supplied
//! criterion the search engine polls once per expanded state to decide
//! whether it should keep running. Cancellation is cooperative; the engine
//! returns promptly after the currently expanding state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// This trait encapsulates a criterion (external to the solver) which can
/// force the search to stop before it has reached a conclusion.
pub trait Cutoff {
    /// Returns true iff the search must stop now.
    fn must_stop(&self) -> bool;
}

/// _This is the default cutoff._ It lets the search run until the iteration
/// budget is exhausted or the state space is.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoCutoff;
impl Cutoff for NoCutoff {
    fn must_stop(&self) -> bool {
        false
    }
}

/// A cutoff driven by a shared boolean flag. Clone the value (or grab its
/// [`CancellationFlag::handle`]) and hand one copy to the solver; flipping
/// the flag from anywhere (another thread, a signal handler) makes the
/// running solve return `Cancelled` after the state it is currently
/// expanding.
///
/// # Example
/// ```
/// # use conlog::{Cutoff, CancellationFlag};
/// let flag = CancellationFlag::new();
/// assert!(!flag.must_stop());
/// flag.cancel();
/// assert!(flag.must_stop());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    stop: Arc<AtomicBool>,
}
impl CancellationFlag {
    /// Creates a new, unset flag.
    pub fn new() -> Self {
        Self::default()
    }
    /// Requests cancellation of any solve polling this flag.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
    /// A shared handle onto the underlying flag.
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }
}
impl Cutoff for CancellationFlag {
    fn must_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_cutoff {
    use super::*;

    #[test]
    fn no_cutoff_never_stops() {
        assert!(!NoCutoff.must_stop());
    }

    #[test]
    fn a_cancellation_flag_stops_once_cancelled() {
        let flag = CancellationFlag::new();
        assert!(!flag.must_stop());
        flag.cancel();
        assert!(flag.must_stop());
    }

    #[test]
    fn clones_of_a_flag_share_their_state() {
        let flag = CancellationFlag::new();
        let clone = flag.clone();
        flag.cancel();
        assert!(clone.must_stop());
    }

    #[test]
    fn the_raw_handle_drives_the_flag_too() {
        let flag = CancellationFlag::new();
        flag.handle().store(true, Ordering::Relaxed);
        assert!(flag.must_stop());
    }
}
