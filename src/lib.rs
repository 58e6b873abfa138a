// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A pure [Rust](https://www.rust-lang.org)
//! [Modbus](https://en.wikipedia.org/wiki/Modbus) RTU slave
//! serving coils.
//!
//! The slave answers the function codes _Read Coils_ (0x01),
//! _Write Single Coil_ (0x05) and _Write Multiple Coils_ (0x0F).
//! Every other function code is answered with an
//! _Illegal Function_ exception.
//!
//! Processing is synchronous and independent of any transport:
//! a complete request ADU goes in, the response ADU (if any) comes out.
//! With the `rtu` feature a [`ServerCodec`] is provided that splits a
//! serial byte stream into request ADUs.
//!
//! ## Example
//!
//! ```
//! use modbus_rtu_coils::prelude::*;
//!
//! let config = SlaveConfig::new(0x11, 16)?;
//! let mut state = SlaveState::new(&config);
//!
//! // Write Single Coil: switch on coil 5
//! let outcome = state.process(&[0x11, 0x05, 0x00, 0x05, 0xFF, 0x00, 0x9E, 0xAB]);
//! assert_eq!(outcome, Outcome::Response);
//! assert_eq!(state.coils().get(5), Ok(true));
//! # Ok::<(), modbus_rtu_coils::ConfigError>(())
//! ```

pub mod prelude;

pub mod bits;
pub mod codec;

mod config;
pub use self::config::SlaveConfig;

mod error;
pub use self::error::{BitIndexError, ConfigError, FrameError};

pub mod frame;
pub use self::frame::{
    Address, Coil, ExceptionCode, ExceptionResponse, FunctionCode, Quantity, Request,
    RequestFrame, Response, Word,
};

mod server;
pub use self::server::{DiscardReason, Outcome, SharedSlave, SlaveState};

mod slave;
pub use self::slave::{Slave, SlaveId};

#[cfg(feature = "rtu")]
pub use self::codec::rtu::ServerCodec;
