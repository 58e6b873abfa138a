// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU slave processing of coil requests.

mod coils;

use std::sync::{Arc, Mutex, PoisonError};

use bytes::{Bytes, BytesMut};
use log::{debug, trace};
use thiserror::Error;

use crate::{
    bits::Coils,
    codec,
    config::SlaveConfig,
    error::FrameError,
    frame::{ExceptionCode, ExceptionResponse, FunctionCode, Request, RequestFrame, Response},
    Slave,
};

/// Why a request has been dropped without an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiscardReason {
    /// The frame is malformed or corrupted.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The frame is addressed to another slave.
    #[error("addressed to slave {0}")]
    NotAddressed(Slave),

    /// A broadcast request failed validation. Broadcasts are never answered,
    /// not even with an exception.
    #[error("broadcast rejected: {0}")]
    Broadcast(ExceptionCode),
}

/// The result of processing a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A response is pending in the response buffer.
    Response,

    /// A broadcast request has been executed, nothing is sent back.
    Broadcast,

    /// An exception response is pending in the response buffer.
    Exception(ExceptionCode),

    /// The request has been dropped, neither state nor response buffer
    /// have been touched.
    Discarded(DiscardReason),
}

impl Outcome {
    /// Whether a frame must be sent back to the master.
    #[must_use]
    pub const fn has_response(&self) -> bool {
        matches!(self, Self::Response | Self::Exception(_))
    }
}

/// The state of a single slave device: its address, its coils and
/// the response to the most recent request.
///
/// Requests are processed synchronously and to completion, one at a time.
/// The response buffer is overwritten by every request and must be
/// handed over to the transport before the next request is processed.
#[derive(Debug)]
pub struct SlaveState {
    slave: Slave,
    coils: Coils,
    response: BytesMut,
}

impl SlaveState {
    #[must_use]
    pub fn new(config: &SlaveConfig) -> Self {
        Self {
            slave: config.slave(),
            coils: Coils::new(config.coil_count()),
            response: BytesMut::new(),
        }
    }

    #[must_use]
    pub const fn slave(&self) -> Slave {
        self.slave
    }

    #[must_use]
    pub const fn coils(&self) -> &Coils {
        &self.coils
    }

    /// Direct access to the coils for the application owning the device.
    pub fn coils_mut(&mut self) -> &mut Coils {
        &mut self.coils
    }

    /// The pending response frame, empty if there is none.
    #[must_use]
    pub fn response(&self) -> &[u8] {
        &self.response
    }

    /// Take the pending response frame out of the response buffer.
    pub fn take_response(&mut self) -> Option<Bytes> {
        if self.response.is_empty() {
            return None;
        }
        Some(self.response.split().freeze())
    }

    /// Process a request ADU received from the bus.
    ///
    /// Requests for other slaves are ignored, requests with an
    /// unsupported function code are answered with
    /// [`ExceptionCode::IllegalFunction`].
    pub fn process(&mut self, adu: &[u8]) -> Outcome {
        self.response.clear();
        trace!("{} in: {:02X?}", self.slave, adu);
        if adu.len() < codec::MIN_ADU_LEN {
            return self.discard(FrameError::Truncated.into());
        }
        let target = Slave(adu[0]);
        if !self.slave.accepts(target) {
            return self.discard(DiscardReason::NotAddressed(target));
        }
        self.handle(adu, None)
    }

    /// Process a _Read Coils_ (0x01) request ADU.
    pub fn read_coils(&mut self, adu: &[u8]) -> Outcome {
        self.response.clear();
        self.handle(adu, Some(FunctionCode::ReadCoils))
    }

    /// Process a _Write Single Coil_ (0x05) request ADU.
    pub fn write_single_coil(&mut self, adu: &[u8]) -> Outcome {
        self.response.clear();
        self.handle(adu, Some(FunctionCode::WriteSingleCoil))
    }

    /// Process a _Write Multiple Coils_ (0x0F) request ADU.
    pub fn write_multiple_coils(&mut self, adu: &[u8]) -> Outcome {
        self.response.clear();
        self.handle(adu, Some(FunctionCode::WriteMultipleCoils))
    }

    fn handle(&mut self, adu: &[u8], expected: Option<FunctionCode>) -> Outcome {
        let RequestFrame {
            slave: target,
            request,
        } = match codec::decode_request(adu) {
            Ok(frame) => frame,
            Err(err) => return self.discard(err.into()),
        };
        let function = request.function_code();
        if let Some(expected) = expected.filter(|expected| *expected != function) {
            return self.discard(
                FrameError::UnexpectedFunction {
                    expected,
                    actual: function,
                }
                .into(),
            );
        }

        let result = match request {
            Request::ReadCoils(first, quantity) => coils::read_coils(&self.coils, first, quantity),
            Request::WriteSingleCoil(address, value) => {
                coils::write_single_coil(&mut self.coils, address, value)
            }
            Request::WriteMultipleCoils(first, quantity, values) => {
                coils::write_multiple_coils(&mut self.coils, first, quantity, values)
            }
            Request::Custom(_) => Err(ExceptionCode::IllegalFunction),
        };
        match result {
            Ok(rsp) => self.respond(target, &rsp),
            Err(exception) => self.reject(target, ExceptionResponse { function, exception }),
        }
    }

    fn respond(&mut self, target: Slave, rsp: &Response) -> Outcome {
        if target.is_broadcast() {
            debug!(
                "{}: executed broadcast request {}",
                self.slave,
                rsp.function_code()
            );
            return Outcome::Broadcast;
        }
        codec::encode_response_adu(&mut self.response, self.slave, rsp);
        trace!("{} out: {:02X?}", self.slave, &self.response[..]);
        Outcome::Response
    }

    fn reject(&mut self, target: Slave, rsp: ExceptionResponse) -> Outcome {
        if target.is_broadcast() {
            return self.discard(DiscardReason::Broadcast(rsp.exception));
        }
        debug!("{}: {rsp}", self.slave);
        codec::encode_exception_adu(&mut self.response, self.slave, rsp);
        trace!("{} out: {:02X?}", self.slave, &self.response[..]);
        Outcome::Exception(rsp.exception)
    }

    fn discard(&self, reason: DiscardReason) -> Outcome {
        debug!("{}: discarding request: {reason}", self.slave);
        Outcome::Discarded(reason)
    }
}

/// A [`SlaveState`] shared between threads.
///
/// Each request is processed and its response taken under one lock,
/// so no response can be overwritten before it has been handed out.
#[derive(Debug, Clone)]
pub struct SharedSlave(Arc<Mutex<SlaveState>>);

impl SharedSlave {
    #[must_use]
    pub fn new(state: SlaveState) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    /// Process a request ADU and take its response, if any.
    pub fn process(&self, adu: &[u8]) -> (Outcome, Option<Bytes>) {
        self.with_state(|state| {
            let outcome = state.process(adu);
            (outcome, state.take_response())
        })
    }

    /// Run `f` with exclusive access to the slave state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut SlaveState) -> R) -> R {
        // A panic while holding the lock cannot leave the state half
        // updated, since coils are only modified after validation.
        let mut state = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}
