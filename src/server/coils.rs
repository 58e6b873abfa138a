// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Execution of the coil function codes against the coil memory.
//!
//! Every check fires in a fixed order and the first failure wins:
//! structural counts, then the address range, then the protocol limits.
//! Coils are only modified after all checks have passed.

use crate::{
    bits::{packed_len, Coils},
    codec::coil_to_bool,
    frame::{
        Address, ExceptionCode, Quantity, Response, Word, MAX_READ_COILS, MAX_WRITE_COILS,
    },
};

fn check_range(count: Quantity, first: Address, quantity: Quantity) -> Result<(), ExceptionCode> {
    if quantity > count {
        return Err(ExceptionCode::IllegalDataAddress);
    }
    if first >= count || u32::from(first) + u32::from(quantity) > u32::from(count) {
        return Err(ExceptionCode::IllegalDataAddress);
    }
    Ok(())
}

pub(super) fn read_coils(
    coils: &Coils,
    first: Address,
    quantity: Quantity,
) -> Result<Response, ExceptionCode> {
    if quantity == 0 {
        return Err(ExceptionCode::IllegalDataValue);
    }
    check_range(coils.count(), first, quantity)?;
    if quantity > MAX_READ_COILS {
        return Err(ExceptionCode::IllegalDataValue);
    }
    let values = coils
        .read(first, quantity)
        .map_err(|_| ExceptionCode::IllegalDataAddress)?;
    Ok(Response::ReadCoils(values))
}

pub(super) fn write_single_coil(
    coils: &mut Coils,
    address: Address,
    value: Word,
) -> Result<Response, ExceptionCode> {
    let state = coil_to_bool(value).ok_or(ExceptionCode::IllegalDataValue)?;
    if address >= coils.count() {
        return Err(ExceptionCode::IllegalDataAddress);
    }
    coils
        .set(address, state)
        .map_err(|_| ExceptionCode::IllegalDataAddress)?;
    Ok(Response::WriteSingleCoil(address, state))
}

pub(super) fn write_multiple_coils(
    coils: &mut Coils,
    first: Address,
    quantity: Quantity,
    values: &[u8],
) -> Result<Response, ExceptionCode> {
    if values.is_empty() || quantity == 0 {
        return Err(ExceptionCode::IllegalDataValue);
    }
    // The byte count locates the CRC, so it must also agree with the quantity.
    if values.len() != packed_len(quantity.into()) {
        return Err(ExceptionCode::IllegalDataValue);
    }
    check_range(coils.count(), first, quantity)?;
    if quantity > MAX_WRITE_COILS {
        return Err(ExceptionCode::IllegalDataValue);
    }
    coils
        .write_packed(first, quantity, values)
        .map_err(|_| ExceptionCode::IllegalDataAddress)?;
    Ok(Response::WriteMultipleCoils(first, quantity))
}
