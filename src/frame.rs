//! DGI command/response framing
//!
//! Requests are `[cmd:1][len:2 BE][payload]`. Responses are
//! `[echo:1][status:1][payload]` where the payload is whatever else arrived
//! in the same bulk transfer.

use crate::constants::{
    command_name, DGI_MAX_PAYLOAD, DGI_REQUEST_HEADER_SIZE, DGI_RESPONSE_HEADER_SIZE,
    DGI_RESP_DATA, DGI_RESP_OK,
};
use crate::error::{DgiError, Result};

/// Encode a command frame
///
/// # Arguments
/// * `cmd` - Command ID (one of the DGI_CMD_* constants)
/// * `payload` - Command payload (at most 65535 bytes)
pub fn encode(cmd: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > DGI_MAX_PAYLOAD {
        return Err(DgiError::PayloadTooLarge(payload.len()));
    }

    let mut buf = Vec::with_capacity(DGI_REQUEST_HEADER_SIZE + payload.len());
    buf.push(cmd);
    buf.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// DGI response frame borrowed from a receive buffer
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Response<'a> {
    /// Echoed command ID
    pub command: u8,
    /// Status code (DGI_RESP_OK or DGI_RESP_DATA)
    pub status: u8,
    /// Everything after the header
    pub payload: &'a [u8],
}

impl<'a> Response<'a> {
    /// Decode a response from the bytes of a single transport read
    pub fn decode(raw: &'a [u8]) -> Result<Self> {
        if raw.len() < DGI_RESPONSE_HEADER_SIZE {
            return Err(DgiError::ShortFrame(raw.len()));
        }

        Ok(Self {
            command: raw[0],
            status: raw[1],
            payload: &raw[DGI_RESPONSE_HEADER_SIZE..],
        })
    }

    /// Check the envelope against the command that produced it
    ///
    /// Returns the payload unchanged; status codes other than DATA are not
    /// interpreted here.
    pub fn validate(&self, cmd: u8) -> Result<&'a [u8]> {
        if self.command != cmd {
            return Err(DgiError::CommandMismatch {
                expected: cmd,
                actual: self.command,
            });
        }

        if self.status == DGI_RESP_DATA && self.payload.is_empty() {
            return Err(DgiError::EmptyDataResponse);
        }

        Ok(self.payload)
    }

    /// Check if the device returned the DATA status
    pub fn is_data(&self) -> bool {
        self.status == DGI_RESP_DATA
    }

    /// Check if the device returned the OK status
    pub fn is_ok(&self) -> bool {
        self.status == DGI_RESP_OK
    }
}

impl std::fmt::Debug for Response<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field(
                "command",
                &format_args!("0x{:02X} ({})", self.command, command_name(self.command)),
            )
            .field("status", &format_args!("0x{:02X}", self.status))
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Format bytes as space-separated hex for trace output
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
