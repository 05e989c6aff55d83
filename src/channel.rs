//! Channel state snapshots and the output sink trait.

use core::ops::{Index, IndexMut};

/// Maximum number of brightness channels a dimmer can drive.
///
/// Bounds the fixed-size payload buffers used by the decoder.
pub const MAX_CHANNELS: usize = 16;

/// Channel count of the desk/ceiling layout.
pub const QUAD_CHANNELS: usize = 4;

/// Desk strip, warm white.
pub const DESK_WARM: usize = 0;
/// Desk strip, cold white.
pub const DESK_COLD: usize = 1;
/// Ceiling strip, warm white.
pub const CEILING_WARM: usize = 2;
/// Ceiling strip, cold white.
pub const CEILING_COLD: usize = 3;

/// Brightness of every channel at one instant.
///
/// Values map 1:1 onto the hardware duty registers. Nothing above the
/// effective PWM resolution is clipped here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelState<const N: usize>(pub [u16; N]);

impl<const N: usize> ChannelState<N> {
    /// Every channel dark.
    pub const OFF: Self = ChannelState([0; N]);

    /// Every channel at full duty.
    pub const FULL: Self = ChannelState([u16::MAX; N]);

    /// Creates a state from per-channel duty values.
    #[inline]
    pub const fn new(values: [u16; N]) -> Self {
        ChannelState(values)
    }

    /// Decodes `N` big-endian `u16` values.
    ///
    /// Returns `None` unless `bytes` holds exactly `2 * N` bytes.
    pub fn from_be_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != N * 2 {
            return None;
        }

        let mut values = [0u16; N];
        for (value, pair) in values.iter_mut().zip(bytes.chunks_exact(2)) {
            *value = u16::from_be_bytes([pair[0], pair[1]]);
        }
        Some(ChannelState(values))
    }

    /// Iterates the big-endian wire bytes, channel by channel.
    pub fn be_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().flat_map(|value| value.to_be_bytes())
    }

    /// Returns the duty of one channel, if it exists.
    #[inline]
    pub fn get(&self, channel: usize) -> Option<u16> {
        self.0.get(channel).copied()
    }

    /// Per-channel duty values in channel order.
    #[inline]
    pub const fn values(&self) -> &[u16; N] {
        &self.0
    }

    /// Number of channels.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    /// True for a zero-channel layout.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<const N: usize> Default for ChannelState<N> {
    fn default() -> Self {
        Self::OFF
    }
}

impl<const N: usize> From<[u16; N]> for ChannelState<N> {
    fn from(values: [u16; N]) -> Self {
        ChannelState(values)
    }
}

impl<const N: usize> Index<usize> for ChannelState<N> {
    type Output = u16;

    fn index(&self, channel: usize) -> &u16 {
        &self.0[channel]
    }
}

impl<const N: usize> IndexMut<usize> for ChannelState<N> {
    fn index_mut(&mut self, channel: usize) -> &mut u16 {
        &mut self.0[channel]
    }
}

/// Trait for abstracting the PWM outputs and the relay.
///
/// Implement this for your hardware (LEDC, timers, I2C PWM expanders, etc.).
/// Handle hardware errors internally; these methods cannot fail.
pub trait ChannelSink<const N: usize> {
    /// Writes every channel's duty in one go.
    ///
    /// Implementations must not leave the outputs observably half-updated
    /// between two calls.
    fn set_duties(&mut self, duties: &ChannelState<N>);

    /// Switches the relay channel.
    fn set_relay(&mut self, on: bool);
}
