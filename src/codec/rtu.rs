// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RTU checksum and stream framing.

use byteorder::{ByteOrder as _, LittleEndian};
use bytes::{BufMut as _, BytesMut};

use super::MIN_ADU_LEN;
use crate::error::FrameError;

#[cfg(feature = "rtu")]
pub use self::framing::ServerCodec;

/// Calculate the CRC16 (Modbus) of `buf`.
///
/// The low byte of the result is transmitted first.
#[must_use]
pub fn crc16(buf: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in buf {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Append the CRC of the current contents of `buf`.
pub(crate) fn put_crc(buf: &mut BytesMut) {
    let crc = crc16(buf);
    buf.put_u16_le(crc);
}

/// Verify length and trailing CRC of `adu`, returning everything before the CRC.
pub(crate) fn verify_checksum(adu: &[u8], adu_len: usize) -> Result<&[u8], FrameError> {
    if adu.len() != adu_len {
        return Err(FrameError::Length {
            expected: adu_len,
            actual: adu.len(),
        });
    }
    if adu_len < MIN_ADU_LEN {
        return Err(FrameError::Truncated);
    }
    let (body, crc) = adu.split_at(adu_len - 2);
    let received = LittleEndian::read_u16(crc);
    let calculated = crc16(body);
    if calculated != received {
        return Err(FrameError::Checksum {
            calculated,
            received,
        });
    }
    Ok(body)
}

#[cfg(feature = "rtu")]
mod framing {
    use std::io::{self, Error, ErrorKind};

    use bytes::{BufMut as _, Bytes, BytesMut};
    use log::trace;
    use tokio_util::codec::{Decoder, Encoder};

    use crate::codec::{write_multiple_coils_adu_len, BYTE_COUNT_OFFSET, FIXED_ADU_LEN};

    /// Splits a serial byte stream into request ADUs and writes response ADUs.
    ///
    /// Decoded items are complete ADUs including their CRC, ready to be
    /// passed to [`SlaveState::process`](crate::server::SlaveState::process).
    /// The checksum is not verified here.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct ServerCodec;

    fn get_request_adu_len(buf: &BytesMut) -> io::Result<Option<usize>> {
        if buf.len() < 2 {
            // incomplete frame
            return Ok(None);
        }
        let len = match buf[1] {
            0x01..=0x06 => Some(FIXED_ADU_LEN),
            0x0F | 0x10 => buf
                .get(BYTE_COUNT_OFFSET)
                .map(|byte_count| write_multiple_coils_adu_len(*byte_count)),
            fn_code => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("unsupported function code: 0x{fn_code:02X}"),
                ));
            }
        };
        Ok(len)
    }

    impl Decoder for ServerCodec {
        type Item = Bytes;
        type Error = Error;

        fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Bytes>> {
            let Some(adu_len) = get_request_adu_len(buf)?.filter(|len| buf.len() >= *len) else {
                // incomplete frame
                return Ok(None);
            };
            let adu = buf.split_to(adu_len).freeze();
            trace!("in: {:02X?}", &adu[..]);
            Ok(Some(adu))
        }
    }

    impl Encoder<Bytes> for ServerCodec {
        type Error = Error;

        fn encode(&mut self, adu: Bytes, buf: &mut BytesMut) -> io::Result<()> {
            trace!("out: {:02X?}", &adu[..]);
            buf.reserve(adu.len());
            buf.put_slice(&adu);
            Ok(())
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_values() {
        assert_eq!(crc16(&[0x11, 0x01, 0x00, 0x13, 0x00, 0x25]), 0x840E);
        assert_eq!(crc16(&[0x11, 0x04, 0x00, 0x08, 0x00, 0x01]), 0x98B2);
        assert_eq!(crc16(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x01]), 0x0A84);
    }

    #[test]
    fn crc_of_complete_frame_is_zero() {
        assert_eq!(crc16(&[0x11, 0x01, 0x00, 0x13, 0x00, 0x25, 0x0E, 0x84]), 0);
    }

    #[test]
    fn put_crc_low_byte_first() {
        let mut buf = BytesMut::from(&[0x11, 0x01, 0x00, 0x13, 0x00, 0x25][..]);
        put_crc(&mut buf);
        assert_eq!(&buf[6..], &[0x0E, 0x84]);
    }

    #[test]
    fn verify_valid_frame() {
        let adu = [0x11, 0x01, 0x00, 0x13, 0x00, 0x25, 0x0E, 0x84];
        assert_eq!(verify_checksum(&adu, 8), Ok(&adu[..6]));
    }

    #[test]
    fn verify_length() {
        let adu = [0x11, 0x01, 0x00, 0x13, 0x00, 0x25, 0x0E, 0x84];
        assert_eq!(
            verify_checksum(&adu, 9),
            Err(FrameError::Length {
                expected: 9,
                actual: 8
            })
        );
        assert_eq!(verify_checksum(&adu[..2], 2), Err(FrameError::Truncated));
    }

    #[test]
    fn verify_every_flipped_bit() {
        let adu = [0x11, 0x01, 0x00, 0x13, 0x00, 0x25, 0x0E, 0x84];
        for byte in 0..adu.len() {
            for bit in 0..8 {
                let mut corrupted = adu;
                corrupted[byte] ^= 1 << bit;
                assert!(
                    verify_checksum(&corrupted, 8).is_err(),
                    "byte {byte} bit {bit}"
                );
            }
        }
    }
}
