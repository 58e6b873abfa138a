// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types

///////////////////////////////////////////////////////////////////
/// Types
///////////////////////////////////////////////////////////////////
pub use crate::{ExceptionCode, Request, Response};
pub use crate::{Slave, SlaveId};

pub use crate::{DiscardReason, Outcome, SharedSlave, SlaveConfig, SlaveState};

#[cfg(feature = "rtu")]
pub use crate::ServerCodec;
