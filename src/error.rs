// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.

use std::io;

use thiserror::Error;

use crate::{frame::FunctionCode, Slave};

/// A received frame could not be decoded.
///
/// Frames failing with this error are dropped without an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The frame ended before all of its fields could be read.
    #[error("truncated frame")]
    Truncated,

    /// The frame length does not match the length implied by its content.
    #[error("invalid frame length: expected {expected} bytes, received {actual}")]
    Length { expected: usize, actual: usize },

    /// The trailing CRC does not match the frame content.
    #[error("CRC mismatch: calculated 0x{calculated:04X}, received 0x{received:04X}")]
    Checksum { calculated: u16, received: u16 },

    /// Function codes with the high bit set are reserved for exception responses.
    #[error("invalid function code: 0x{0:02X}")]
    InvalidFunction(u8),

    /// A handler was called with a frame of another function code.
    #[error("unexpected function code: expected {expected}, received {actual}")]
    UnexpectedFunction {
        expected: FunctionCode,
        actual: FunctionCode,
    },
}

impl From<io::Error> for FrameError {
    fn from(_: io::Error) -> Self {
        // Reading from an in-memory cursor only fails on premature EOF.
        Self::Truncated
    }
}

/// A bit index outside of the addressable range of a bit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bit index {index} out of bounds ({bound} bits)")]
pub struct BitIndexError {
    pub index: usize,
    pub bound: usize,
}

/// Invalid slave configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("the broadcast address cannot be assigned to a slave")]
    Broadcast,

    #[error("slave address {0} is reserved")]
    Reserved(Slave),

    #[error("a slave needs at least one coil")]
    NoCoils,
}
