//! The control loop driver.
//!
//! Provides [`Dispatcher`], which owns the device state and on every tick
//! decodes at most one instruction from the serial link, applies it, then
//! advances the animation.

use crate::channel::{ChannelSink, ChannelState};
use crate::command::Instruction;
use crate::config::DimmerConfig;
use crate::decoder::CommandDecoder;
use crate::diagnostics::{Diagnostic, Diagnostics, Level};
use crate::engine::{AnimationEngine, AnimationPhase, StepOutcome};
use crate::error::Error;
use crate::state::DeviceState;
use crate::time::{Millis, TimeSource};
use embedded_io::{Read, ReadReady, Write};

/// Runs one dimmer: command decoding, state updates and output.
///
/// Single owner of the [`DeviceState`]; every write to channels, animation,
/// relay and debug flag goes through it.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `T` - Time source implementation type
/// * `S` - Channel sink (PWM + relay) implementation type
/// * `P` - Serial transport implementing `embedded_io` read/write traits
/// * `D` - Diagnostics implementation type
/// * `N` - Number of brightness channels
pub struct Dispatcher<'t, T, S, P, D, const N: usize>
where
    T: TimeSource,
    S: ChannelSink<N>,
    P: Read + ReadReady + Write,
    D: Diagnostics<N>,
{
    time_source: &'t T,
    sink: S,
    transport: P,
    diagnostics: D,
    decoder: CommandDecoder<N>,
    engine: AnimationEngine,
    state: DeviceState<N>,
    config: DimmerConfig,
}

impl<'t, T, S, P, D, const N: usize> Dispatcher<'t, T, S, P, D, N>
where
    T: TimeSource,
    S: ChannelSink<N>,
    P: Read + ReadReady + Write,
    D: Diagnostics<N>,
{
    /// Creates a dispatcher and drives every output to its boot value
    /// (channels dark, relay off).
    pub fn new(
        config: DimmerConfig,
        time_source: &'t T,
        mut sink: S,
        transport: P,
        diagnostics: D,
    ) -> Self {
        let mut state = DeviceState::new();
        state.debug = config.debug;

        sink.set_duties(&state.output);
        sink.set_relay(state.relay);

        Self {
            time_source,
            sink,
            transport,
            diagnostics,
            decoder: CommandDecoder::new(),
            engine: AnimationEngine::new(config.lerp_mode),
            state,
            config,
        }
    }

    /// Runs one control loop iteration.
    ///
    /// Decodes at most one instruction from whatever bytes are ready, applies
    /// it, then steps the animation. Never waits for bytes: a partial payload
    /// is carried over to the next tick while the animation keeps running.
    ///
    /// The animation is stepped even when the serial link fails, so a
    /// flaky transport never stalls a running fade.
    ///
    /// # Returns
    /// * `Ok(StepOutcome)` - What the animation engine did this tick
    /// * `Err(Error::Transport)` - The serial link failed; this tick's frame
    ///   was still rendered
    pub fn tick(&mut self) -> Result<StepOutcome<N>, Error<P::Error>> {
        let now = self.time_source.now();

        let applied = match self.decoder.poll(&mut self.transport) {
            Ok(Some(instruction)) => self.apply(instruction, now),
            Ok(None) => Ok(()),
            Err(Error::Decode(err)) => {
                self.emit(Diagnostic::Rejected(err));
                Ok(())
            }
            Err(err) => Err(err),
        };

        let outcome = self.engine.step(&mut self.state, now, &mut self.sink);
        if let StepOutcome::Finished(frame) = outcome {
            self.emit(Diagnostic::AnimationFinished(frame));
        }

        applied?;
        Ok(outcome)
    }

    /// Applies an already decoded instruction at the current time.
    ///
    /// Does not step the animation.
    pub fn execute(&mut self, instruction: Instruction<N>) -> Result<(), Error<P::Error>> {
        let now = self.time_source.now();
        self.apply(instruction, now)
    }

    fn apply(&mut self, instruction: Instruction<N>, now: Millis) -> Result<(), Error<P::Error>> {
        match instruction {
            Instruction::Identify => {
                let identifier = self.config.identifier;
                self.reply(identifier.as_bytes())?;
                self.emit(Diagnostic::Identified);
            }
            Instruction::ImmediateSet(values) => {
                self.state.set_immediate(values);
                self.sink.set_duties(&values);
                self.emit(Diagnostic::ImmediateSet(values));
            }
            Instruction::ScheduleInterpolate {
                delay_ms,
                duration_ms,
                target,
            } => {
                self.state.schedule(now, delay_ms, duration_ms, target);
                self.emit(Diagnostic::Scheduled {
                    start_time: self.state.animation.start_time,
                    duration_ms: self.state.animation.duration_ms,
                    target,
                });
            }
            Instruction::EnableDebug => {
                self.state.debug = true;
                self.emit(Diagnostic::DebugEnabled);
            }
            Instruction::CancelInterpolation => {
                self.state.cancel_animation();
                self.emit(Diagnostic::InterpolationCancelled);
            }
            Instruction::RelayControl(on) => {
                self.state.relay = on;
                self.sink.set_relay(on);
                self.emit(Diagnostic::Relay(on));
            }
            Instruction::ReadStatus => {
                let running = self.state.is_animating();
                self.reply(&[u8::from(running)])?;
                self.emit(Diagnostic::StatusReported(running));
            }
        }
        Ok(())
    }

    fn reply(&mut self, bytes: &[u8]) -> Result<(), Error<P::Error>> {
        self.transport.write_all(bytes).map_err(Error::Transport)?;
        self.transport.flush().map_err(Error::Transport)
    }

    /// Warnings always go out; everything else only with debug enabled.
    fn emit(&mut self, event: Diagnostic<N>) {
        if self.state.debug || event.level() >= Level::Warn {
            self.diagnostics.record(&event);
        }
    }

    /// Returns the device state.
    pub fn state(&self) -> &DeviceState<N> {
        &self.state
    }

    /// Duties most recently written to the sink.
    pub fn output(&self) -> ChannelState<N> {
        self.state.output
    }

    /// Animation phase at the current time.
    pub fn phase(&self) -> AnimationPhase {
        self.state.phase(self.time_source.now())
    }

    /// Returns the channel sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the channel sink mutably, bypassing the device state.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Returns the serial transport.
    pub fn transport(&self) -> &P {
        &self.transport
    }

    /// Returns the serial transport mutably.
    pub fn transport_mut(&mut self) -> &mut P {
        &mut self.transport
    }

    /// Returns the diagnostics sink.
    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Returns the decoder, e.g. to inspect a partially received instruction.
    pub fn decoder(&self) -> &CommandDecoder<N> {
        &self.decoder
    }

    /// Returns the configuration the dispatcher was built with.
    pub fn config(&self) -> &DimmerConfig {
        &self.config
    }
}
