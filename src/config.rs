//! Interface configuration parameters
//!
//! Configuration is exchanged as a list of `(id:2 BE, value:4 BE)` records.
//! SET_CONFIG sends `[itf][records...]`; GET_CONFIG answers with
//! `[total_len:2 BE][itf][records...]` where `total_len` counts the interface
//! byte plus the records.

use std::collections::BTreeMap;

use crate::error::{DgiError, Result};

/// Size of one encoded parameter record
pub const CONFIG_RECORD_SIZE: usize = 6;

/// GET_CONFIG response header: total length (2) + interface echo (1)
const GET_CONFIG_HEADER_SIZE: usize = 3;

/// A single interface configuration parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigParameter {
    /// Parameter ID (interface specific, see DGI_CFG_* constants)
    pub id: u16,
    /// Parameter value
    pub value: u32,
}

impl ConfigParameter {
    /// Create a new parameter
    pub fn new(id: u16, value: u32) -> Self {
        Self { id, value }
    }

    /// Pack into wire bytes
    pub fn pack(&self) -> [u8; CONFIG_RECORD_SIZE] {
        let mut buf = [0u8; CONFIG_RECORD_SIZE];
        buf[0..2].copy_from_slice(&self.id.to_be_bytes());
        buf[2..6].copy_from_slice(&self.value.to_be_bytes());
        buf
    }

    /// Unpack from wire bytes
    pub fn unpack(data: &[u8; CONFIG_RECORD_SIZE]) -> Self {
        Self {
            id: u16::from_be_bytes([data[0], data[1]]),
            value: u32::from_be_bytes([data[2], data[3], data[4], data[5]]),
        }
    }
}

impl From<(u16, u32)> for ConfigParameter {
    fn from((id, value): (u16, u32)) -> Self {
        Self::new(id, value)
    }
}

impl std::fmt::Display for ConfigParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.value)
    }
}

/// Build a SET_CONFIG payload
///
/// Records are written in iteration order.
pub fn encode_set_config<I>(itf: u8, params: I) -> Vec<u8>
where
    I: IntoIterator<Item = (u16, u32)>,
{
    let params = params.into_iter();
    let mut buf = Vec::with_capacity(1 + params.size_hint().0 * CONFIG_RECORD_SIZE);
    buf.push(itf);
    for param in params {
        buf.extend_from_slice(&ConfigParameter::from(param).pack());
    }
    buf
}

/// Decode a GET_CONFIG response payload for interface `itf`
///
/// A declared length that leaves a partial record, or that runs past the
/// received bytes, is rejected with `WrongLength`. Bytes after the declared
/// length are ignored.
pub fn decode_get_config(itf: u8, payload: &[u8]) -> Result<BTreeMap<u16, u32>> {
    if payload.len() < GET_CONFIG_HEADER_SIZE {
        return Err(DgiError::WrongLength {
            expected: GET_CONFIG_HEADER_SIZE,
            actual: payload.len(),
        });
    }

    let total_len = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    let echo_itf = payload[2];

    if echo_itf != itf {
        return Err(DgiError::InterfaceMismatch {
            expected: itf,
            actual: echo_itf,
        });
    }

    if total_len < 1 {
        return Err(DgiError::WrongLength {
            expected: 1,
            actual: total_len,
        });
    }

    let records_len = total_len - 1;
    if records_len % CONFIG_RECORD_SIZE != 0 {
        return Err(DgiError::WrongLength {
            expected: records_len - records_len % CONFIG_RECORD_SIZE,
            actual: records_len,
        });
    }

    let records = &payload[GET_CONFIG_HEADER_SIZE..];
    if records.len() < records_len {
        return Err(DgiError::WrongLength {
            expected: records_len,
            actual: records.len(),
        });
    }

    let mut config = BTreeMap::new();
    for chunk in records[..records_len].chunks_exact(CONFIG_RECORD_SIZE) {
        let mut record = [0u8; CONFIG_RECORD_SIZE];
        record.copy_from_slice(chunk);
        let param = ConfigParameter::unpack(&record);
        config.insert(param.id, param.value);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DGI_CFG_SPI_CHARLEN, DGI_CFG_SPI_MODE, DGI_ITF_ID_SPI};

    /// Wrap a SET_CONFIG payload the way the device reports it back
    fn as_get_config_response(set_payload: &[u8]) -> Vec<u8> {
        let mut rsp = (set_payload.len() as u16).to_be_bytes().to_vec();
        rsp.extend_from_slice(set_payload);
        rsp
    }

    #[test]
    fn test_parameter_pack() {
        let param = ConfigParameter::new(0x0102, 0x0304_0506);
        assert_eq!(param.pack(), [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(ConfigParameter::unpack(&param.pack()), param);
    }

    #[test]
    fn test_encode_set_config() {
        let payload = encode_set_config(DGI_ITF_ID_SPI, [(DGI_CFG_SPI_CHARLEN, 8)]);
        assert_eq!(payload, [0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08]);

        let payload = encode_set_config(DGI_ITF_ID_SPI, Vec::<(u16, u32)>::new());
        assert_eq!(payload, [0x20]);
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = BTreeMap::new();
        config.insert(DGI_CFG_SPI_CHARLEN, 8);
        config.insert(DGI_CFG_SPI_MODE, 3);
        config.insert(0xBEEF, 0xDEAD_BEEF);

        let set_payload = encode_set_config(DGI_ITF_ID_SPI, config.clone());
        let rsp = as_get_config_response(&set_payload);
        let decoded = decode_get_config(DGI_ITF_ID_SPI, &rsp).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_decode_interface_mismatch() {
        let rsp = as_get_config_response(&encode_set_config(0x21, [(0, 1)]));
        assert!(matches!(
            decode_get_config(DGI_ITF_ID_SPI, &rsp),
            Err(DgiError::InterfaceMismatch {
                expected: 0x20,
                actual: 0x21
            })
        ));
    }

    #[test]
    fn test_decode_zero_length() {
        assert!(matches!(
            decode_get_config(DGI_ITF_ID_SPI, &[0x00, 0x00, 0x20]),
            Err(DgiError::WrongLength { .. })
        ));
    }

    #[test]
    fn test_decode_no_parameters() {
        let config = decode_get_config(DGI_ITF_ID_SPI, &[0x00, 0x01, 0x20]).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_decode_short_header() {
        assert!(matches!(
            decode_get_config(DGI_ITF_ID_SPI, &[0x00, 0x01]),
            Err(DgiError::WrongLength {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_decode_partial_record() {
        // total_len = 1 + 6 + 2: one full record and two stray bytes
        let mut rsp = vec![0x00, 0x09, 0x20];
        rsp.extend_from_slice(&ConfigParameter::new(1, 2).pack());
        rsp.extend_from_slice(&[0xAA, 0xBB]);
        assert!(matches!(
            decode_get_config(DGI_ITF_ID_SPI, &rsp),
            Err(DgiError::WrongLength {
                expected: 6,
                actual: 8
            })
        ));
    }

    #[test]
    fn test_decode_truncated_records() {
        // Declares two records but carries one
        let mut rsp = vec![0x00, 0x0D, 0x20];
        rsp.extend_from_slice(&ConfigParameter::new(1, 2).pack());
        assert!(matches!(
            decode_get_config(DGI_ITF_ID_SPI, &rsp),
            Err(DgiError::WrongLength {
                expected: 12,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut rsp = as_get_config_response(&encode_set_config(DGI_ITF_ID_SPI, [(2, 1)]));
        rsp.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
        let config = decode_get_config(DGI_ITF_ID_SPI, &rsp).unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config[&2], 1);
    }
}
