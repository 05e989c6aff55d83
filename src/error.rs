//! Error types.

/// Errors produced while decoding the command stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The byte does not name any instruction. Nothing past it was consumed.
    UnknownOpcode(u8),
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeError::UnknownOpcode(byte) => {
                write!(f, "unknown opcode 0x{:02X}", byte)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Configuration validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The identify reply would be empty.
    EmptyIdentifier,

    /// The identify reply contains non-ASCII bytes.
    NonAsciiIdentifier,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::EmptyIdentifier => {
                write!(f, "device identifier must not be empty")
            }
            ConfigError::NonAsciiIdentifier => {
                write!(f, "device identifier must be plain ASCII")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Errors surfaced while polling the transport.
///
/// `E` is the transport's `embedded_io` error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Reading or writing the serial link failed.
    Transport(E),

    /// The command stream held something the decoder rejected.
    Decode(DecodeError),
}

impl<E> From<DecodeError> for Error<E> {
    fn from(err: DecodeError) -> Self {
        Error::Decode(err)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Transport(err) => write!(f, "transport error: {:?}", err),
            Error::Decode(err) => write!(f, "decode error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for Error<E> {}
