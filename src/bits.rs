// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Packed bit buffers.
//!
//! Bits are stored LSB first: index `i` lives in byte `i / 8` at bit `i % 8`.
//! All bounds are given in bits and are additionally clamped to the bit
//! capacity of the underlying buffer.

use crate::{
    error::BitIndexError,
    frame::{Address, Coil, Quantity},
};

/// Number of bytes needed to store `nbits` packed bits.
#[must_use]
pub const fn packed_len(nbits: usize) -> usize {
    (nbits + 7) / 8
}

fn locate(buf_len: usize, bound: usize, index: usize) -> Result<(usize, u8), BitIndexError> {
    let bound = bound.min(buf_len.saturating_mul(8));
    if index >= bound {
        return Err(BitIndexError { index, bound });
    }
    Ok((index / 8, 1 << (index % 8)))
}

/// Read the bit at `index` from `buf`, considering only the first `bound` bits.
pub fn read_bit(buf: &[u8], bound: usize, index: usize) -> Result<bool, BitIndexError> {
    let (byte, mask) = locate(buf.len(), bound, index)?;
    Ok(buf[byte] & mask != 0)
}

/// Write the bit at `index` into `buf`, considering only the first `bound` bits.
pub fn write_bit(
    buf: &mut [u8],
    bound: usize,
    index: usize,
    value: bool,
) -> Result<(), BitIndexError> {
    let (byte, mask) = locate(buf.len(), bound, index)?;
    if value {
        buf[byte] |= mask;
    } else {
        buf[byte] &= !mask;
    }
    Ok(())
}

/// The coil memory of a slave device.
///
/// The number of coils is fixed on construction and the storage is never
/// resized afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coils {
    packed: Vec<u8>,
    count: Quantity,
}

impl Coils {
    /// Create `count` coils, all switched off.
    #[must_use]
    pub fn new(count: Quantity) -> Self {
        Self {
            packed: vec![0; packed_len(count.into())],
            count,
        }
    }

    /// The number of addressable coils.
    #[must_use]
    pub const fn count(&self) -> Quantity {
        self.count
    }

    /// The packed coil states, `ceil(count / 8)` bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.packed
    }

    pub fn get(&self, address: Address) -> Result<Coil, BitIndexError> {
        read_bit(&self.packed, self.count.into(), address.into())
    }

    pub fn set(&mut self, address: Address, value: Coil) -> Result<(), BitIndexError> {
        write_bit(&mut self.packed, self.count.into(), address.into(), value)
    }

    /// Check that `quantity` coils starting at `first` exist.
    pub fn check_range(&self, first: Address, quantity: Quantity) -> Result<(), BitIndexError> {
        let end = usize::from(first) + usize::from(quantity);
        if end > usize::from(self.count) {
            return Err(BitIndexError {
                index: end.saturating_sub(1),
                bound: self.count.into(),
            });
        }
        Ok(())
    }

    /// Read `quantity` coils starting at `first`.
    pub fn read(&self, first: Address, quantity: Quantity) -> Result<Vec<Coil>, BitIndexError> {
        self.check_range(first, quantity)?;
        let first = usize::from(first);
        (0..usize::from(quantity))
            .map(|offset| read_bit(&self.packed, self.count.into(), first + offset))
            .collect()
    }

    /// Write `quantity` coils starting at `first` from the packed bits in `values`.
    ///
    /// Nothing is modified unless the whole range is valid.
    pub fn write_packed(
        &mut self,
        first: Address,
        quantity: Quantity,
        values: &[u8],
    ) -> Result<(), BitIndexError> {
        self.check_range(first, quantity)?;
        let nbits = usize::from(quantity);
        if nbits > values.len() * 8 {
            return Err(BitIndexError {
                index: nbits - 1,
                bound: values.len() * 8,
            });
        }
        for offset in 0..nbits {
            let value = read_bit(values, nbits, offset)?;
            write_bit(
                &mut self.packed,
                self.count.into(),
                usize::from(first) + offset,
                value,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_lengths() {
        assert_eq!(packed_len(0), 0);
        assert_eq!(packed_len(1), 1);
        assert_eq!(packed_len(8), 1);
        assert_eq!(packed_len(9), 2);
        assert_eq!(packed_len(2000), 250);
    }

    #[test]
    fn read_bits_lsb_first() {
        let buf = [0b_0000_0101, 0b_1000_0000];
        assert_eq!(read_bit(&buf, 16, 0), Ok(true));
        assert_eq!(read_bit(&buf, 16, 1), Ok(false));
        assert_eq!(read_bit(&buf, 16, 2), Ok(true));
        assert_eq!(read_bit(&buf, 16, 15), Ok(true));
    }

    #[test]
    fn bound_is_given_in_bits() {
        let buf = [0xFF, 0xFF];
        assert_eq!(read_bit(&buf, 10, 9), Ok(true));
        assert_eq!(
            read_bit(&buf, 10, 10),
            Err(BitIndexError {
                index: 10,
                bound: 10
            })
        );
    }

    #[test]
    fn bound_is_clamped_to_buffer() {
        let mut buf = [0x00];
        assert_eq!(
            write_bit(&mut buf, 100, 8, true),
            Err(BitIndexError { index: 8, bound: 8 })
        );
        assert_eq!(buf, [0x00]);
    }

    #[test]
    fn write_bits() {
        let mut buf = [0x00, 0x00];
        write_bit(&mut buf, 16, 3, true).unwrap();
        write_bit(&mut buf, 16, 9, true).unwrap();
        assert_eq!(buf, [0b_0000_1000, 0b_0000_0010]);
        write_bit(&mut buf, 16, 3, false).unwrap();
        assert_eq!(buf, [0x00, 0b_0000_0010]);
    }

    #[test]
    fn coil_storage_size() {
        assert_eq!(Coils::new(1).as_bytes().len(), 1);
        assert_eq!(Coils::new(16).as_bytes().len(), 2);
        assert_eq!(Coils::new(17).as_bytes().len(), 3);
    }

    #[test]
    fn coils_out_of_range() {
        let mut coils = Coils::new(10);
        assert!(coils.set(9, true).is_ok());
        assert!(coils.set(10, true).is_err());
        assert!(coils.get(10).is_err());
        // The last byte has spare bits that must stay unreachable.
        assert!(coils.get(15).is_err());
    }

    #[test]
    fn read_range() {
        let mut coils = Coils::new(16);
        coils.set(3, true).unwrap();
        coils.set(5, true).unwrap();
        assert_eq!(
            coils.read(2, 4).unwrap(),
            vec![false, true, false, true]
        );
        assert!(coils.read(14, 3).is_err());
        assert!(coils.read(0, 16).is_ok());
    }

    #[test]
    fn write_packed_range() {
        let mut coils = Coils::new(16);
        coils.write_packed(4, 10, &[0xFF, 0x03]).unwrap();
        assert_eq!(coils.as_bytes(), &[0xF0, 0x3F]);
    }

    #[test]
    fn write_packed_is_all_or_nothing() {
        let mut coils = Coils::new(16);
        assert!(coils.write_packed(10, 8, &[0xFF]).is_err());
        assert!(coils.write_packed(0, 9, &[0xFF]).is_err());
        assert_eq!(coils.as_bytes(), &[0x00, 0x00]);
    }
}
