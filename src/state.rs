//! Device-wide mutable state.

use crate::channel::ChannelState;
use crate::engine::{AnimationPhase, AnimationSpec, MAX_DELAY_MS, MAX_DURATION_MS};
use crate::time::Millis;

/// Everything the dimmer remembers between ticks.
///
/// Owned by the [`Dispatcher`](crate::Dispatcher), which is the only writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState<const N: usize> {
    /// Duties most recently written to the sink.
    pub output: ChannelState<N>,
    /// The single scheduled or running transition, if `active`.
    pub animation: AnimationSpec<N>,
    /// Last relay level written to the sink.
    pub relay: bool,
    /// Verbose diagnostics enabled.
    pub debug: bool,
}

impl<const N: usize> Default for DeviceState<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DeviceState<N> {
    /// Boot state: every channel dark, relay off, nothing scheduled.
    pub fn new() -> Self {
        Self {
            output: ChannelState::OFF,
            animation: AnimationSpec::default(),
            relay: false,
            debug: false,
        }
    }

    /// Overwrites the outputs and the interpolation baseline, cancelling any
    /// transition.
    pub fn set_immediate(&mut self, values: ChannelState<N>) {
        self.output = values;
        self.animation.start_state = values;
        self.animation.active = false;
    }

    /// Arms a transition towards `target`.
    ///
    /// The start snapshot is whatever baseline the last immediate set left,
    /// not the current output. `delay_ms` is clamped to [`MAX_DELAY_MS`] and
    /// `duration_ms` to [`MAX_DURATION_MS`] so the whole transition stays
    /// within the wrapping clock's comparable range.
    pub fn schedule(
        &mut self,
        now: Millis,
        delay_ms: u32,
        duration_ms: u32,
        target: ChannelState<N>,
    ) {
        self.animation.start_time = now.wrapping_add(delay_ms.min(MAX_DELAY_MS));
        self.animation.duration_ms = duration_ms.min(MAX_DURATION_MS);
        self.animation.end_state = target;
        self.animation.active = true;
    }

    /// Drops any transition; outputs keep their current values.
    pub fn cancel_animation(&mut self) {
        self.animation.active = false;
    }

    /// Phase of the current transition at `now`.
    pub fn phase(&self, now: Millis) -> AnimationPhase {
        self.animation.phase(now)
    }

    /// True while a transition is scheduled or running.
    pub fn is_animating(&self) -> bool {
        self.animation.active
    }
}
