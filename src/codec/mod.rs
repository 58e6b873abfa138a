// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of request ADUs and encoding of response ADUs.

use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt as _};
use bytes::{BufMut as _, BytesMut};

use crate::{
    bits::packed_len,
    error::FrameError,
    frame::{
        Coil, ExceptionResponse, FunctionCode, Request, RequestFrame, Response, Word, COIL_OFF,
        COIL_ON,
    },
    Slave,
};

pub mod rtu;

/// addr + function + crc
pub(crate) const MIN_ADU_LEN: usize = 1 + 1 + 2;

/// Length of the `ReadCoils` and `WriteSingleCoil` request ADUs.
pub(crate) const FIXED_ADU_LEN: usize = 8;

/// Offset of the byte count within a `WriteMultipleCoils` request ADU.
pub(crate) const BYTE_COUNT_OFFSET: usize = 6;

/// addr + function + crc
const ADU_OVERHEAD: usize = 1 + 2;

#[allow(clippy::cast_possible_truncation)]
fn u8_len(len: usize) -> u8 {
    // This type conversion should always be safe, because either
    // the caller is responsible to pass a valid usize or the
    // possible values are limited by the protocol.
    debug_assert!(len <= u8::MAX.into());
    len as u8
}

fn read_u16_be(reader: &mut impl io::Read) -> io::Result<u16> {
    reader.read_u16::<BigEndian>()
}

/// Length of a complete `WriteMultipleCoils` request ADU with `byte_count` data bytes.
pub(crate) const fn write_multiple_coils_adu_len(byte_count: u8) -> usize {
    BYTE_COUNT_OFFSET + 1 + byte_count as usize + 2
}

/// Decode a complete request ADU.
///
/// The checksum is verified before any field is read. The length of the
/// ADU must match the length implied by its function code exactly.
pub fn decode_request(adu: &[u8]) -> Result<RequestFrame<'_>, FrameError> {
    if adu.len() < MIN_ADU_LEN {
        return Err(FrameError::Truncated);
    }
    let function = FunctionCode::new(adu[1]);
    let adu_len = match function {
        FunctionCode::ReadCoils | FunctionCode::WriteSingleCoil => FIXED_ADU_LEN,
        FunctionCode::WriteMultipleCoils => {
            let byte_count = adu.get(BYTE_COUNT_OFFSET).ok_or(FrameError::Truncated)?;
            write_multiple_coils_adu_len(*byte_count)
        }
        FunctionCode::Custom(code) if code >= 0x80 => {
            return Err(FrameError::InvalidFunction(code));
        }
        FunctionCode::Custom(_) => adu.len(),
    };
    let body = rtu::verify_checksum(adu, adu_len)?;

    let slave = Slave(body[0]);
    let rdr = &mut Cursor::new(&body[2..]);
    let request = match function {
        FunctionCode::ReadCoils => Request::ReadCoils(read_u16_be(rdr)?, read_u16_be(rdr)?),
        FunctionCode::WriteSingleCoil => {
            Request::WriteSingleCoil(read_u16_be(rdr)?, read_u16_be(rdr)?)
        }
        FunctionCode::WriteMultipleCoils => {
            let address = read_u16_be(rdr)?;
            let quantity = read_u16_be(rdr)?;
            let byte_count = usize::from(rdr.read_u8()?);
            let offset = BYTE_COUNT_OFFSET + 1;
            let packed_coils = body
                .get(offset..offset + byte_count)
                .ok_or(FrameError::Truncated)?;
            Request::WriteMultipleCoils(address, quantity, packed_coils)
        }
        FunctionCode::Custom(code) => Request::Custom(code),
    };
    Ok(RequestFrame { slave, request })
}

pub(crate) fn bool_to_coil(state: bool) -> Word {
    if state {
        COIL_ON
    } else {
        COIL_OFF
    }
}

pub(crate) fn coil_to_bool(coil: Word) -> Option<bool> {
    match coil {
        COIL_ON => Some(true),
        COIL_OFF => Some(false),
        _ => None,
    }
}

fn packed_coils_size(coils: &[Coil]) -> usize {
    packed_len(coils.len())
}

fn encode_packed_coils(buf: &mut BytesMut, coils: &[Coil]) -> usize {
    let packed_coils_size = packed_coils_size(coils);
    let offset = buf.len();
    buf.resize(offset + packed_coils_size, 0);
    let buf = &mut buf[offset..];
    for (i, b) in coils.iter().enumerate() {
        let v = u8::from(*b); // 0 or 1
        buf[i / 8] |= v << (i % 8);
    }
    packed_coils_size
}

fn response_pdu_size(rsp: &Response) -> usize {
    use crate::frame::Response::*;
    match rsp {
        ReadCoils(coils) => 2 + packed_coils_size(coils),
        WriteSingleCoil(_, _) | WriteMultipleCoils(_, _) => 5,
    }
}

fn encode_response_pdu(buf: &mut BytesMut, rsp: &Response) {
    use crate::frame::Response::*;
    buf.put_u8(rsp.function_code().value());
    match rsp {
        ReadCoils(coils) => {
            buf.put_u8(u8_len(packed_coils_size(coils)));
            encode_packed_coils(buf, coils);
        }
        WriteSingleCoil(address, state) => {
            buf.put_u16(*address);
            buf.put_u16(bool_to_coil(*state));
        }
        WriteMultipleCoils(address, quantity) => {
            buf.put_u16(*address);
            buf.put_u16(*quantity);
        }
    }
}

fn encode_exception_response_pdu(buf: &mut BytesMut, rsp: ExceptionResponse) {
    buf.put_u8(rsp.function.value() | 0x80);
    buf.put_u8(rsp.exception.into());
}

/// Replace the contents of `buf` with a complete ADU.
fn encode_adu(
    buf: &mut BytesMut,
    slave: Slave,
    pdu_len: usize,
    encode_pdu: impl FnOnce(&mut BytesMut),
) {
    buf.clear();
    buf.reserve(pdu_len + ADU_OVERHEAD);
    buf.put_u8(slave.into());
    encode_pdu(buf);
    debug_assert_eq!(buf.len(), pdu_len + 1);
    rtu::put_crc(buf);
}

/// Replace the contents of `buf` with the response ADU of `slave`.
pub fn encode_response_adu(buf: &mut BytesMut, slave: Slave, rsp: &Response) {
    encode_adu(buf, slave, response_pdu_size(rsp), |buf| {
        encode_response_pdu(buf, rsp);
    });
}

/// Replace the contents of `buf` with the exception response ADU of `slave`.
pub fn encode_exception_adu(buf: &mut BytesMut, slave: Slave, rsp: ExceptionResponse) {
    encode_adu(buf, slave, 2, |buf| encode_exception_response_pdu(buf, rsp));
}
