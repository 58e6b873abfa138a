// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use thiserror::Error;

use crate::Slave;

/// A Modbus function code.
///
/// Only the coil function codes are served, every other code is kept
/// as [`FunctionCode::Custom`] to be able to answer it with
/// [`ExceptionCode::IllegalFunction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCode {
    /// 01 (0x01) Read Coils.
    ReadCoils,

    /// 05 (0x05) Write Single Coil
    WriteSingleCoil,

    /// 15 (0x0F) Write Multiple Coils
    WriteMultipleCoils,

    /// Any other function code.
    Custom(u8),
}

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x05 => Self::WriteSingleCoil,
            0x0F => Self::WriteMultipleCoils,
            code => Self::Custom(code),
        }
    }

    /// Gets the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::WriteSingleCoil => 0x05,
            Self::WriteMultipleCoils => 0x0F,
            Self::Custom(code) => code,
        }
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.value())
    }
}

/// A Modbus protocol address is represented by 16 bit from `0` to `65535`.
///
/// Coil addresses are 0-based protocol addresses.
pub type Address = u16;

/// A Coil represents a single bit.
///
/// - `true` is equivalent to `ON`, `1` and `0xFF00`.
/// - `false` is equivalent to `OFF`, `0` and `0x0000`.
pub type Coil = bool;

/// Modbus uses 16 bit for its data items.
///
/// Transmitted using a big-endian representation.
pub type Word = u16;

/// Number of items to process.
pub type Quantity = u16;

/// The wire value of a coil that is switched on.
pub const COIL_ON: Word = 0xFF00;

/// The wire value of a coil that is switched off.
pub const COIL_OFF: Word = 0x0000;

/// Maximum number of coils in a single read request.
pub const MAX_READ_COILS: Quantity = 2000;

/// Maximum number of coils in a single write request.
pub const MAX_WRITE_COILS: Quantity = 1968;

/// A decoded request of a master (client).
///
/// Requests borrow from the received frame and are discarded after
/// they have been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    /// A request to read multiple coils.
    /// The first parameter is the address of the first coil to read.
    /// The second parameter is the number of coils to read.
    ReadCoils(Address, Quantity),

    /// A request to write a single coil.
    /// The first parameter is the address of the coil.
    /// The second parameter is the raw value word, only [`COIL_ON`] and
    /// [`COIL_OFF`] are accepted when the request is executed.
    WriteSingleCoil(Address, Word),

    /// A request to write multiple coils.
    /// The first parameter is the address of the first coil to write.
    /// The second parameter is the number of coils to write.
    /// The third parameter contains the packed coil values as received,
    /// its length is the byte count of the request.
    WriteMultipleCoils(Address, Quantity, &'a [u8]),

    /// A request with a function code that is not served.
    Custom(u8),
}

impl Request<'_> {
    /// Get the [`FunctionCode`] of the [`Request`].
    #[must_use]
    pub const fn function_code(&self) -> FunctionCode {
        use Request::*;

        match self {
            ReadCoils(_, _) => FunctionCode::ReadCoils,
            WriteSingleCoil(_, _) => FunctionCode::WriteSingleCoil,
            WriteMultipleCoils(_, _, _) => FunctionCode::WriteMultipleCoils,
            Custom(code) => FunctionCode::Custom(*code),
        }
    }
}

/// A Modbus request with the addressed slave included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFrame<'a> {
    /// Slave id from the request, [`Slave::broadcast()`] for broadcasts.
    pub slave: Slave,
    /// A `Request` enum
    pub request: Request<'a>,
}

/// The data of a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Response to a `ReadCoils` request
    /// The parameter contains exactly the coil values that have been read.
    ReadCoils(Vec<Coil>),

    /// Response to a `WriteSingleCoil` request
    /// The first parameter contains the address of the coil that has been written to
    /// The second parameter contains the value that has been written to the coil
    WriteSingleCoil(Address, Coil),

    /// Response to a `WriteMultipleCoils` request
    /// The first parameter contains the address at the start of the range that has been written to
    /// The second parameter contains the amount of values that have been written
    WriteMultipleCoils(Address, Quantity),
}

impl Response {
    /// Get the [`FunctionCode`] of the [`Response`].
    #[must_use]
    pub const fn function_code(&self) -> FunctionCode {
        use Response::*;

        match self {
            ReadCoils(_) => FunctionCode::ReadCoils,
            WriteSingleCoil(_, _) => FunctionCode::WriteSingleCoil,
            WriteMultipleCoils(_, _) => FunctionCode::WriteMultipleCoils,
        }
    }
}

/// A server (slave) exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExceptionCode {
    /// 0x01
    #[error("Illegal function")]
    IllegalFunction,
    /// 0x02
    #[error("Illegal data address")]
    IllegalDataAddress,
    /// 0x03
    #[error("Illegal data value")]
    IllegalDataValue,
}

impl From<ExceptionCode> for u8 {
    fn from(from: ExceptionCode) -> Self {
        use crate::frame::ExceptionCode::*;
        match from {
            IllegalFunction => 0x01,
            IllegalDataAddress => 0x02,
            IllegalDataValue => 0x03,
        }
    }
}

/// A server (slave) exception response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionResponse {
    pub function: FunctionCode,
    pub exception: ExceptionCode,
}

impl fmt::Display for ExceptionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modbus function {}: {}", self.function, self.exception)
    }
}

impl std::error::Error for ExceptionResponse {}
