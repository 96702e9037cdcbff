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

//! This module defines the small abstract value lattice the partial
//! evaluator can run over: a value is either exactly known, known to be at
//! least (or at most) some constant, or completely unknown. Addition and
//! subtraction are total on this lattice, which is all the partial
//! evaluator needs.

use std::num::Wrapping;
use std::ops::{Add, Sub};

// ----------------------------------------------------------------------------
// --- DOMAIN -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The contract a value domain must fulfill to be usable by the partial
/// evaluator. It is implemented by `Wrapping<i64>` (the concrete domain,
/// with the same wrapping arithmetic as the plain evaluator) and by
/// [`Bound`].
pub trait Domain: Copy + Add<Output = Self> + Sub<Output = Self> {
    /// Embeds an exactly known integer into the domain.
    fn exact(value: i64) -> Self;
    /// Decides the guard of a conditional operation: `Some(true)` when the
    /// value is certainly positive, `Some(false)` when it certainly is not,
    /// and `None` when the domain cannot tell.
    fn positive(self) -> Option<bool>;
    /// The join of `self` and `self + 1`. Only ever invoked when
    /// [`Domain::positive`] returned `None` for the guard of a conditional
    /// increment.
    fn maybe_inc(self) -> Self;
    /// The join of `self - 1` and `self`. Only ever invoked when
    /// [`Domain::positive`] returned `None` for the guard of a conditional
    /// decrement.
    fn maybe_dec(self) -> Self;
}

impl Domain for Wrapping<i64> {
    fn exact(value: i64) -> Self {
        Wrapping(value)
    }
    fn positive(self) -> Option<bool> {
        Some(self.0 > 0)
    }
    fn maybe_inc(self) -> Self {
        unreachable!("the concrete domain always decides conditional guards")
    }
    fn maybe_dec(self) -> Self {
        unreachable!("the concrete domain always decides conditional guards")
    }
}

// ----------------------------------------------------------------------------
// --- BOUND ------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One abstract value: an integer about which only one-sided information may
/// be available. Bound arithmetic saturates at the i64 extremes rather than
/// wrapping; a bound pegged at an extreme carries no information anymore,
/// which keeps it conservative.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Bound {
    /// The value is exactly known.
    Known(i64),
    /// The value is at least the given constant.
    AtLeast(i64),
    /// The value is at most the given constant.
    AtMost(i64),
    /// Nothing is known about the value.
    Unknown,
}

impl Add for Bound {
    type Output = Bound;

    fn add(self, other: Bound) -> Bound {
        use Bound::*;
        match (self, other) {
            (Known(x), Known(y)) => Known(x.wrapping_add(y)),
            (Known(x), AtLeast(lb)) | (AtLeast(lb), Known(x)) => AtLeast(x.saturating_add(lb)),
            (Known(x), AtMost(ub)) | (AtMost(ub), Known(x)) => AtMost(x.saturating_add(ub)),
            (AtLeast(x), AtLeast(y)) => AtLeast(x.saturating_add(y)),
            (AtMost(x), AtMost(y)) => AtMost(x.saturating_add(y)),
            _ => Unknown,
        }
    }
}

impl Sub for Bound {
    type Output = Bound;

    fn sub(self, other: Bound) -> Bound {
        use Bound::*;
        match (self, other) {
            (Known(x), Known(y)) => Known(x.wrapping_sub(y)),
            (Known(x), AtLeast(lb)) => AtMost(x.saturating_sub(lb)),
            (Known(x), AtMost(ub)) => AtLeast(x.saturating_sub(ub)),
            (AtLeast(lb), Known(y)) => AtLeast(lb.saturating_sub(y)),
            (AtMost(ub), Known(y)) => AtMost(ub.saturating_sub(y)),
            (AtLeast(lb), AtMost(ub)) => AtLeast(lb.saturating_sub(ub)),
            (AtMost(ub), AtLeast(lb)) => AtMost(ub.saturating_sub(lb)),
            _ => Unknown,
        }
    }
}

impl Domain for Bound {
    fn exact(value: i64) -> Self {
        Bound::Known(value)
    }
    fn positive(self) -> Option<bool> {
        match self {
            Bound::Known(x) => Some(x > 0),
            Bound::AtLeast(lb) if lb > 0 => Some(true),
            Bound::AtMost(ub) if ub <= 0 => Some(false),
            _ => None,
        }
    }
    fn maybe_inc(self) -> Self {
        match self {
            Bound::Known(x) | Bound::AtLeast(x) => Bound::AtLeast(x),
            Bound::AtMost(ub) => Bound::AtMost(ub.saturating_add(1)),
            Bound::Unknown => Bound::Unknown,
        }
    }
    fn maybe_dec(self) -> Self {
        match self {
            Bound::Known(x) | Bound::AtMost(x) => Bound::AtMost(x),
            Bound::AtLeast(lb) => Bound::AtLeast(lb.saturating_sub(1)),
            Bound::Unknown => Bound::Unknown,
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
