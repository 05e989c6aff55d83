//! Time-based interpolation between two channel snapshots.
//!
//! # Progress
//!
//! ```text
//! end      = start_time + duration
//! progress = clamp((now - end) / duration / 2 + 0.5, 0.0, 1.0)
//! ```
//!
//! Progress is 0.0 at `start_time`, 0.5 at `start_time + duration` and 1.0
//! at `start_time + 2 * duration`. Callers wanting a transition that is fully
//! complete after `T` ms send `duration = T / 2`. Existing host software
//! depends on this, so it must not be "corrected".
//!
//! The clock is a wrapping 32-bit counter compared by signed difference, so a
//! whole transition has to fit in half its range. [`MAX_DELAY_MS`] and
//! [`MAX_DURATION_MS`] bound what
//! [`DeviceState::schedule`](crate::DeviceState::schedule) accepts.

use crate::channel::{ChannelSink, ChannelState};
use crate::state::DeviceState;
use crate::time::Millis;

/// Channel the legacy firmware used as the target for every channel.
pub const LEGACY_END_INDEX: usize = 1;

/// Longest delay before `start_time` that still reads as in the future.
pub const MAX_DELAY_MS: u32 = i32::MAX as u32;

/// Longest duration whose completion (`2 * duration`) stays in clock range.
pub const MAX_DURATION_MS: u32 = MAX_DELAY_MS / 2;

/// Largest `f32` below 1.0; progress only reaches 1.0 once the transition is over.
const LAST_STEP_BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// How interpolation picks each channel's end value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LerpMode {
    /// Channel `i` fades towards `end[i]`.
    #[default]
    Indexed,

    /// Every channel fades towards `end[LEGACY_END_INDEX]`.
    ///
    /// Matches one historical firmware build bit for bit. Falls back to
    /// `Indexed` on layouts with fewer than two channels.
    LegacyFixedEnd,
}

/// Where an animation is relative to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationPhase {
    /// Nothing scheduled.
    Idle,
    /// Waiting for `start_time`.
    Scheduled,
    /// Producing output every tick.
    Active,
}

/// A transition between two channel snapshots.
///
/// At most one exists per device; scheduling overwrites it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationSpec<const N: usize> {
    /// Instant progress starts counting from.
    pub start_time: Millis,
    /// Milliseconds to the visual midpoint.
    pub duration_ms: u32,
    /// Baseline captured by the last immediate set.
    pub start_state: ChannelState<N>,
    /// Target.
    pub end_state: ChannelState<N>,
    /// Scheduled or running. Cleared on completion, cancel or immediate set.
    pub active: bool,
}

impl<const N: usize> Default for AnimationSpec<N> {
    fn default() -> Self {
        Self {
            start_time: Millis::ZERO,
            duration_ms: 0,
            start_state: ChannelState::OFF,
            end_state: ChannelState::OFF,
            active: false,
        }
    }
}

impl<const N: usize> AnimationSpec<N> {
    /// Phase of this animation at `now`.
    pub fn phase(&self, now: Millis) -> AnimationPhase {
        if !self.active {
            AnimationPhase::Idle
        } else if now.is_before(self.start_time) {
            AnimationPhase::Scheduled
        } else {
            AnimationPhase::Active
        }
    }

    /// Progress of this animation at `now`. See [`progress`].
    pub fn progress(&self, now: Millis) -> f32 {
        progress(self.start_time, self.duration_ms, now)
    }
}

/// Interpolation progress in `[0.0, 1.0]`.
///
/// Evaluated as `elapsed / (2 * duration)`, which equals the midpoint formula
/// above without forming `start_time + duration` on the wrapping clock. The
/// result is exactly 1.0 iff `now` is at least `2 * duration_ms` past
/// `start_time`.
///
/// A zero `duration_ms` snaps: 0.0 before `start_time`, 1.0 from then on.
pub fn progress(start_time: Millis, duration_ms: u32, now: Millis) -> f32 {
    let elapsed = now.signed_since(start_time);
    if elapsed < 0 {
        return 0.0;
    }

    let elapsed = u64::from(elapsed.unsigned_abs());
    let span = 2 * u64::from(duration_ms);
    if elapsed >= span {
        return 1.0;
    }

    // both operands are below 2^53, so the quotient is correctly rounded
    let fraction = elapsed as f64 / span as f64;
    (fraction as f32).min(LAST_STEP_BELOW_ONE)
}

/// Blends two snapshots, rounding each channel to the nearest duty value.
pub fn lerp<const N: usize>(
    start: &ChannelState<N>,
    end: &ChannelState<N>,
    progress: f32,
    mode: LerpMode,
) -> ChannelState<N> {
    ChannelState(core::array::from_fn(|i| {
        let target = match mode {
            LerpMode::Indexed => end[i],
            LerpMode::LegacyFixedEnd => end.get(LEGACY_END_INDEX).unwrap_or(end[i]),
        };
        let value = (1.0 - progress) * f32::from(start[i]) + progress * f32::from(target);
        // float-to-int `as` saturates, so rounding overshoot stays in range
        libm::roundf(value) as u16
    }))
}

/// Result of one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOutcome<const N: usize> {
    /// No animation; outputs untouched.
    Idle,
    /// Animation scheduled for later; outputs untouched.
    Waiting,
    /// Intermediate frame written to the sink.
    Rendered(ChannelState<N>),
    /// Final frame written; the animation is now idle.
    Finished(ChannelState<N>),
}

/// Drives the device's animation forward in time.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationEngine {
    mode: LerpMode,
}

impl AnimationEngine {
    /// Creates an engine interpolating with `mode`.
    pub const fn new(mode: LerpMode) -> Self {
        Self { mode }
    }

    /// How this engine picks each channel's end value.
    pub const fn mode(&self) -> LerpMode {
        self.mode
    }

    /// Advances the animation to `now`, writing a frame when one is due.
    ///
    /// All channels go to the sink in a single call.
    pub fn step<S, const N: usize>(
        &self,
        state: &mut DeviceState<N>,
        now: Millis,
        sink: &mut S,
    ) -> StepOutcome<N>
    where
        S: ChannelSink<N>,
    {
        let animation = &mut state.animation;
        match animation.phase(now) {
            AnimationPhase::Idle => return StepOutcome::Idle,
            AnimationPhase::Scheduled => return StepOutcome::Waiting,
            AnimationPhase::Active => {}
        }

        let progress = animation.progress(now);
        let frame = lerp(
            &animation.start_state,
            &animation.end_state,
            progress,
            self.mode,
        );
        sink.set_duties(&frame);
        state.output = frame;

        if progress >= 1.0 {
            animation.active = false;
            StepOutcome::Finished(frame)
        } else {
            StepOutcome::Rendered(frame)
        }
    }
}
