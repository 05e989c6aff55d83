//! Incremental command stream decoder.
//!
//! Bytes are fed one at a time. An instruction whose payload has not fully
//! arrived stays parked in the decoder between polls, so a slow or stalled
//! link never holds up the caller.

use crate::channel::MAX_CHANNELS;
use crate::command::{Instruction, MAX_PAYLOAD_SIZE, Opcode};
use crate::error::{DecodeError, Error};
use embedded_io::{Read, ReadReady};
use heapless::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Next byte is an opcode.
    WaitingForOpcode,
    /// Collecting `expected` payload bytes for `opcode`.
    ReadingPayload { opcode: Opcode, expected: usize },
}

/// State machine turning the raw byte stream into [`Instruction`]s.
///
/// # Type Parameters
/// * `N` - Number of brightness channels carried by set/schedule payloads
#[derive(Debug, Clone)]
pub struct CommandDecoder<const N: usize> {
    state: ParseState,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl<const N: usize> Default for CommandDecoder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CommandDecoder<N> {
    /// Creates a decoder waiting for an opcode.
    pub fn new() -> Self {
        const { assert!(N <= MAX_CHANNELS, "too many channels for the payload buffer") };

        Self {
            state: ParseState::WaitingForOpcode,
            buffer: Vec::new(),
        }
    }

    /// Drops any partially received instruction.
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForOpcode;
        self.buffer.clear();
    }

    /// Opcode whose payload is still being collected, if any.
    pub fn pending_opcode(&self) -> Option<Opcode> {
        match self.state {
            ParseState::WaitingForOpcode => None,
            ParseState::ReadingPayload { opcode, .. } => Some(opcode),
        }
    }

    /// True while an opcode has been accepted but its payload is incomplete.
    pub fn is_mid_instruction(&self) -> bool {
        self.pending_opcode().is_some()
    }

    /// Payload bytes received so far for the pending opcode.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feeds a single byte.
    ///
    /// Returns `Ok(Some(instruction))` when the byte completes one,
    /// `Ok(None)` when more bytes are needed, or `Err` if the byte was read as
    /// an opcode and is not one.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Instruction<N>>, DecodeError> {
        match self.state {
            ParseState::WaitingForOpcode => {
                let opcode = Opcode::try_from(byte)?;
                let expected = opcode.payload_len(N);
                if expected == 0 {
                    return Ok(Instruction::from_payload(opcode, &[]));
                }

                self.buffer.clear();
                self.state = ParseState::ReadingPayload { opcode, expected };
                Ok(None)
            }
            ParseState::ReadingPayload { opcode, expected } => {
                // expected <= MAX_PAYLOAD_SIZE, so this cannot overflow
                let _ = self.buffer.push(byte);
                if self.buffer.len() < expected {
                    return Ok(None);
                }

                let instruction = Instruction::from_payload(opcode, &self.buffer);
                self.reset();
                Ok(instruction)
            }
        }
    }

    /// Feeds bytes until one instruction completes.
    ///
    /// Returns the instruction and how many bytes of `bytes` were consumed.
    /// Bytes after the instruction are left untouched.
    pub fn feed_bytes(
        &mut self,
        bytes: &[u8],
    ) -> (Result<Option<Instruction<N>>, DecodeError>, usize) {
        for (index, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => {}
                done => return (done, index + 1),
            }
        }
        (Ok(None), bytes.len())
    }

    /// Pulls whatever the transport has ready, without blocking.
    ///
    /// Reads one byte at a time while `read_ready` reports data and stops as
    /// soon as one instruction completes or an opcode is rejected. A payload
    /// that runs dry is kept for the next poll.
    pub fn poll<R>(&mut self, rx: &mut R) -> Result<Option<Instruction<N>>, Error<R::Error>>
    where
        R: Read + ReadReady,
    {
        let mut byte = [0u8; 1];
        while rx.read_ready().map_err(Error::Transport)? {
            if rx.read(&mut byte).map_err(Error::Transport)? == 0 {
                break;
            }
            if let Some(instruction) = self.feed(byte[0])? {
                return Ok(Some(instruction));
            }
        }
        Ok(None)
    }
}
