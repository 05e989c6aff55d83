#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Dispatcher`**: The per-tick driver; decodes one instruction, then steps the animation
//! - **`CommandDecoder`**: Incremental parser for the opcode-prefixed byte stream
//! - **`Instruction`**: A decoded command (immediate set, scheduled fade, relay, ...)
//! - **`AnimationEngine`**: Interpolates between two `ChannelState` snapshots over time
//! - **`DeviceState`**: Outputs, the single `AnimationSpec`, relay and debug flags
//! - **`ChannelSink`**: Trait to implement for your PWM outputs and relay
//! - **`TimeSource`**: Trait to implement for your millisecond counter
//! - **`Diagnostics`**: Trait receiving leveled, typed diagnostic events
//!
//! The transport is any `embedded_io` serial port implementing `Read`,
//! `ReadReady` and `Write`.

pub mod channel;
pub mod command;
pub mod config;
pub mod decoder;
pub mod diagnostics;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod state;
pub mod time;

pub use channel::{
    CEILING_COLD, CEILING_WARM, ChannelSink, ChannelState, DESK_COLD, DESK_WARM, MAX_CHANNELS,
    QUAD_CHANNELS,
};
pub use command::{Instruction, MAX_INSTRUCTION_SIZE, MAX_PAYLOAD_SIZE, Opcode};
pub use config::{ConfigBuilder, DEFAULT_IDENTIFIER, DimmerConfig};
pub use decoder::CommandDecoder;
#[cfg(feature = "defmt")]
pub use diagnostics::DefmtDiagnostics;
pub use diagnostics::{Diagnostic, Diagnostics, Level, NoDiagnostics};
pub use dispatcher::Dispatcher;
pub use engine::{
    AnimationEngine, AnimationPhase, AnimationSpec, LEGACY_END_INDEX, LerpMode, MAX_DELAY_MS,
    MAX_DURATION_MS, StepOutcome, lerp, progress,
};
pub use error::{ConfigError, DecodeError, Error};
pub use state::DeviceState;
pub use time::{Millis, TimeSource};

/// State snapshot for the desk/ceiling warm/cold layout.
pub type QuadState = ChannelState<QUAD_CHANNELS>;
