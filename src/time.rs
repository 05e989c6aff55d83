//! Millisecond clock abstraction.

/// A point on a free-running millisecond counter.
///
/// The counter wraps at `u32::MAX`. Ordering between two instants is taken
/// from their signed wrapping difference, so comparisons stay correct across
/// a wrap as long as the instants are less than 2^31 ms apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(pub u32);

impl Millis {
    /// Counter origin.
    pub const ZERO: Self = Millis(0);

    /// Adds a millisecond offset, wrapping like the hardware counter.
    #[inline]
    pub const fn wrapping_add(self, millis: u32) -> Self {
        Millis(self.0.wrapping_add(millis))
    }

    /// Signed distance from `earlier` to `self`.
    ///
    /// Negative when `self` lies before `earlier`.
    #[inline]
    pub const fn signed_since(self, earlier: Self) -> i32 {
        self.0.wrapping_sub(earlier.0) as i32
    }

    /// Returns true if `self` lies strictly before `other`.
    #[inline]
    pub const fn is_before(self, other: Self) -> bool {
        self.signed_since(other) < 0
    }

    /// Raw counter value.
    #[inline]
    pub const fn as_millis(self) -> u32 {
        self.0
    }
}

impl From<u32> for Millis {
    fn from(millis: u32) -> Self {
        Millis(millis)
    }
}

/// Trait for abstracting the monotonic millisecond clock.
pub trait TimeSource {
    /// Returns the current counter value.
    fn now(&self) -> Millis;
}
