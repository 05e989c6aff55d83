//! Leveled diagnostic events.
//!
//! The dispatcher reports what it does as typed [`Diagnostic`] values. Where
//! they end up (RTT, a UART, nowhere) is the job of the injected
//! [`Diagnostics`] implementation.

use crate::channel::ChannelState;
use crate::error::DecodeError;
use crate::time::Millis;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Per-frame and per-command detail.
    Debug,
    /// State changes a developer usually wants to see.
    Info,
    /// Bad input from the host. Always recorded.
    Warn,
}

/// Something worth telling a developer about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic<const N: usize> {
    /// A byte was rejected by the decoder.
    Rejected(DecodeError),
    /// Identify reply sent.
    Identified,
    /// Outputs overwritten.
    ImmediateSet(ChannelState<N>),
    /// Transition armed.
    Scheduled {
        start_time: Millis,
        duration_ms: u32,
        target: ChannelState<N>,
    },
    /// Verbose diagnostics switched on.
    DebugEnabled,
    /// Transition dropped; outputs kept.
    InterpolationCancelled,
    /// Relay driven to the given level.
    Relay(bool),
    /// Status byte sent.
    StatusReported(bool),
    /// Transition reached its end state.
    AnimationFinished(ChannelState<N>),
}

impl<const N: usize> Diagnostic<N> {
    /// Severity this event is reported at.
    pub const fn level(&self) -> Level {
        match self {
            Diagnostic::Rejected(_) => Level::Warn,
            Diagnostic::Identified
            | Diagnostic::DebugEnabled
            | Diagnostic::InterpolationCancelled
            | Diagnostic::Relay(_) => Level::Info,
            Diagnostic::ImmediateSet(_)
            | Diagnostic::Scheduled { .. }
            | Diagnostic::StatusReported(_)
            | Diagnostic::AnimationFinished(_) => Level::Debug,
        }
    }
}

/// Destination for diagnostic events.
pub trait Diagnostics<const N: usize> {
    /// Handles one event. Called only for events that pass the debug gate.
    fn record(&mut self, event: &Diagnostic<N>);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl<const N: usize> Diagnostics<N> for NoDiagnostics {
    fn record(&mut self, _event: &Diagnostic<N>) {}
}

/// Forwards events to `defmt` at their level.
#[cfg(feature = "defmt")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefmtDiagnostics;

#[cfg(feature = "defmt")]
impl<const N: usize> Diagnostics<N> for DefmtDiagnostics {
    fn record(&mut self, event: &Diagnostic<N>) {
        match event.level() {
            Level::Debug => defmt::debug!("{}", event),
            Level::Info => defmt::info!("{}", event),
            Level::Warn => defmt::warn!("{}", event),
        }
    }
}
