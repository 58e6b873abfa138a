// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]

use modbus_rtu_coils::{codec::rtu::crc16, SlaveConfig, SlaveState};

pub const SLAVE_ID: u8 = 0x11;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn slave(coil_count: u16) -> anyhow::Result<SlaveState> {
    init_logging();
    let config = SlaveConfig::new(SLAVE_ID, coil_count)?;
    Ok(SlaveState::new(&config))
}

/// Append the CRC to `body`.
pub fn adu(body: &[u8]) -> Vec<u8> {
    let mut adu = body.to_vec();
    adu.extend_from_slice(&crc16(body).to_le_bytes());
    adu
}

pub fn read_coils(slave: u8, first: u16, quantity: u16) -> Vec<u8> {
    let [a_hi, a_lo] = first.to_be_bytes();
    let [q_hi, q_lo] = quantity.to_be_bytes();
    adu(&[slave, 0x01, a_hi, a_lo, q_hi, q_lo])
}

pub fn write_single_coil(slave: u8, address: u16, value: u16) -> Vec<u8> {
    let [a_hi, a_lo] = address.to_be_bytes();
    let [v_hi, v_lo] = value.to_be_bytes();
    adu(&[slave, 0x05, a_hi, a_lo, v_hi, v_lo])
}

pub fn write_multiple_coils(slave: u8, first: u16, quantity: u16, values: &[u8]) -> Vec<u8> {
    let [a_hi, a_lo] = first.to_be_bytes();
    let [q_hi, q_lo] = quantity.to_be_bytes();
    let byte_count = u8::try_from(values.len()).expect("too many values");
    let mut body = vec![slave, 0x0F, a_hi, a_lo, q_hi, q_lo, byte_count];
    body.extend_from_slice(values);
    adu(&body)
}
