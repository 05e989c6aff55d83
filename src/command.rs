//! Wire-level instructions.
//!
//! Every instruction starts with a one-byte opcode followed by a fixed-size,
//! big-endian payload:
//!
//! ```text
//! 0  Identify             -
//! 1  ImmediateSet         N x u16
//! 2  ScheduleInterpolate  u32 delay_ms, u32 duration_ms, N x u16
//! 3  EnableDebug          -
//! 4  CancelInterpolation  -
//! 5  RelayControl         u8 (0 = off, anything else = on)
//! 6  ReadStatus           -
//! ```
//!
//! There is no framing, length prefix or checksum.

use crate::channel::{ChannelState, MAX_CHANNELS};
use crate::error::DecodeError;
use heapless::Vec;

/// Largest payload any opcode carries (`ScheduleInterpolate` at `MAX_CHANNELS`).
pub const MAX_PAYLOAD_SIZE: usize = 4 + 4 + 2 * MAX_CHANNELS;

/// Largest encoded instruction, opcode included.
pub const MAX_INSTRUCTION_SIZE: usize = 1 + MAX_PAYLOAD_SIZE;

/// Leading byte of every instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    Identify = 0,
    ImmediateSet = 1,
    ScheduleInterpolate = 2,
    EnableDebug = 3,
    CancelInterpolation = 4,
    RelayControl = 5,
    ReadStatus = 6,
}

impl Opcode {
    /// Number of payload bytes following this opcode on a dimmer with
    /// `channels` channels.
    pub const fn payload_len(self, channels: usize) -> usize {
        match self {
            Opcode::ImmediateSet => 2 * channels,
            Opcode::ScheduleInterpolate => 4 + 4 + 2 * channels,
            Opcode::RelayControl => 1,
            Opcode::Identify
            | Opcode::EnableDebug
            | Opcode::CancelInterpolation
            | Opcode::ReadStatus => 0,
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Opcode::Identify),
            1 => Ok(Opcode::ImmediateSet),
            2 => Ok(Opcode::ScheduleInterpolate),
            3 => Ok(Opcode::EnableDebug),
            4 => Ok(Opcode::CancelInterpolation),
            5 => Ok(Opcode::RelayControl),
            6 => Ok(Opcode::ReadStatus),
            other => Err(DecodeError::UnknownOpcode(other)),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        opcode as u8
    }
}

/// A fully decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Instruction<const N: usize> {
    /// Reply with the device identifier.
    Identify,
    /// Overwrite every channel now and cancel any transition.
    ImmediateSet(ChannelState<N>),
    /// Start a transition towards `target` after `delay_ms`.
    ///
    /// `duration_ms` is the time to the visual midpoint; the target is
    /// reached after twice that.
    ScheduleInterpolate {
        delay_ms: u32,
        duration_ms: u32,
        target: ChannelState<N>,
    },
    /// Turn on verbose diagnostics.
    EnableDebug,
    /// Drop any scheduled or running transition, leaving outputs as they are.
    CancelInterpolation,
    /// Switch the relay.
    RelayControl(bool),
    /// Reply with one byte: 1 while a transition is scheduled or running.
    ReadStatus,
}

impl<const N: usize> Instruction<N> {
    /// Opcode this instruction is sent with.
    pub const fn opcode(&self) -> Opcode {
        match self {
            Instruction::Identify => Opcode::Identify,
            Instruction::ImmediateSet(_) => Opcode::ImmediateSet,
            Instruction::ScheduleInterpolate { .. } => Opcode::ScheduleInterpolate,
            Instruction::EnableDebug => Opcode::EnableDebug,
            Instruction::CancelInterpolation => Opcode::CancelInterpolation,
            Instruction::RelayControl(_) => Opcode::RelayControl,
            Instruction::ReadStatus => Opcode::ReadStatus,
        }
    }

    /// Builds an instruction from its opcode and complete payload.
    ///
    /// Returns `None` if `payload` is not exactly `opcode.payload_len(N)` long.
    pub fn from_payload(opcode: Opcode, payload: &[u8]) -> Option<Self> {
        if payload.len() != opcode.payload_len(N) {
            return None;
        }

        let instruction = match opcode {
            Opcode::Identify => Instruction::Identify,
            Opcode::ImmediateSet => {
                Instruction::ImmediateSet(ChannelState::from_be_bytes(payload)?)
            }
            Opcode::ScheduleInterpolate => {
                let (delay, rest) = payload.split_at(4);
                let (duration, target) = rest.split_at(4);
                Instruction::ScheduleInterpolate {
                    delay_ms: u32::from_be_bytes([delay[0], delay[1], delay[2], delay[3]]),
                    duration_ms: u32::from_be_bytes([
                        duration[0],
                        duration[1],
                        duration[2],
                        duration[3],
                    ]),
                    target: ChannelState::from_be_bytes(target)?,
                }
            }
            Opcode::EnableDebug => Instruction::EnableDebug,
            Opcode::CancelInterpolation => Instruction::CancelInterpolation,
            Opcode::RelayControl => Instruction::RelayControl(payload[0] != 0),
            Opcode::ReadStatus => Instruction::ReadStatus,
        };
        Some(instruction)
    }

    /// Encodes the instruction as it travels on the wire.
    ///
    /// Used by host-side controllers; the decoder accepts exactly these bytes.
    pub fn encode(&self) -> Vec<u8, MAX_INSTRUCTION_SIZE> {
        const { assert!(N <= MAX_CHANNELS, "too many channels for the wire buffers") };

        let mut out = Vec::new();
        // Capacity covers the largest instruction at MAX_CHANNELS, so the
        // pushes below cannot fail.
        let _ = out.push(u8::from(self.opcode()));
        match self {
            Instruction::ImmediateSet(state) => {
                out.extend(state.be_bytes());
            }
            Instruction::ScheduleInterpolate {
                delay_ms,
                duration_ms,
                target,
            } => {
                let _ = out.extend_from_slice(&delay_ms.to_be_bytes());
                let _ = out.extend_from_slice(&duration_ms.to_be_bytes());
                out.extend(target.be_bytes());
            }
            Instruction::RelayControl(on) => {
                let _ = out.push(u8::from(*on));
            }
            Instruction::Identify
            | Instruction::EnableDebug
            | Instruction::CancelInterpolation
            | Instruction::ReadStatus => {}
        }
        out
    }
}
