//! Error types for the DGI library
//!
//! This module defines the error types used throughout the library
//! for handling USB transport, protocol framing and catalog lookup errors.

use thiserror::Error;

/// Result type alias for DGI operations
pub type Result<T> = std::result::Result<T, DgiError>;

/// Error types for DGI operations
#[derive(Error, Debug)]
pub enum DgiError {
    /// USB error from the rusb library
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    /// No DGI device found
    #[error("No DGI device found (VID {vendor_id:04x}, PID {product_id:04x})")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// No vendor-specific interface on the device
    #[error("DGI interface not found")]
    InterfaceNotFound,

    /// The DGI interface lacks a bulk IN or bulk OUT endpoint
    #[error("DGI bulk endpoint not found")]
    EndpointNotFound,

    /// Failed to claim interface
    #[error("Failed to claim USB interface: {0}")]
    ClaimInterface(rusb::Error),

    /// Failed to detach kernel driver
    #[error("Failed to detach kernel driver: {0}")]
    DetachKernelDriver(rusb::Error),

    /// Bulk transfer failed
    #[error("Bulk transfer failed: {0}")]
    BulkTransfer(rusb::Error),

    /// Timeout during read operation
    #[error("Read timeout")]
    ReadTimeout,

    /// Timeout during write operation
    #[error("Write timeout")]
    WriteTimeout,

    /// Response shorter than the two-byte header
    #[error("Short frame: got {0} bytes, need at least 2")]
    ShortFrame(usize),

    /// Response echoes a different command than the one sent
    #[error("Wrong command id: expected 0x{expected:02x}, got 0x{actual:02x}")]
    CommandMismatch { expected: u8, actual: u8 },

    /// DATA status with no payload
    #[error("Data response carries no data")]
    EmptyDataResponse,

    /// Payload length does not match what the response declares
    #[error("Wrong data length: expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// Response refers to a different interface than requested
    #[error("Wrong interface: expected 0x{expected:02x}, got 0x{actual:02x}")]
    InterfaceMismatch { expected: u8, actual: u8 },

    /// Request payload does not fit the 16-bit length field
    #[error("Payload too large: {0} bytes (max 65535)")]
    PayloadTooLarge(usize),

    /// String shorter than its length prefix
    #[error("Truncated string: declared {declared} bytes, got {actual}")]
    TruncatedString { declared: usize, actual: usize },

    /// Interface ID not in the catalog
    #[error("Unknown interface: 0x{0:02x}")]
    UnknownInterface(u8),

    /// Config ID not in the interface's catalog
    #[error("Unknown config ID {id} for interface 0x{itf:02x}")]
    UnknownConfigId { itf: u8, id: u16 },
}

impl DgiError {
    /// Check if this error is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            DgiError::ReadTimeout
                | DgiError::WriteTimeout
                | DgiError::Usb(rusb::Error::Timeout)
                | DgiError::BulkTransfer(rusb::Error::Timeout)
        )
    }

    /// Check if this error is a USB error
    pub fn is_usb_error(&self) -> bool {
        matches!(
            self,
            DgiError::Usb(_)
                | DgiError::ClaimInterface(_)
                | DgiError::DetachKernelDriver(_)
                | DgiError::BulkTransfer(_)
                | DgiError::ReadTimeout
                | DgiError::WriteTimeout
        )
    }

    /// Check if this error is a protocol framing error
    ///
    /// Framing errors abort the current operation but leave the session usable.
    pub fn is_framing_error(&self) -> bool {
        matches!(
            self,
            DgiError::ShortFrame(_)
                | DgiError::CommandMismatch { .. }
                | DgiError::EmptyDataResponse
                | DgiError::WrongLength { .. }
                | DgiError::InterfaceMismatch { .. }
                | DgiError::PayloadTooLarge(_)
                | DgiError::TruncatedString { .. }
        )
    }

    /// Check if this error is a catalog lookup miss
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            DgiError::UnknownInterface(_) | DgiError::UnknownConfigId { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(DgiError::ReadTimeout.is_timeout());
        assert!(DgiError::BulkTransfer(rusb::Error::Timeout).is_timeout());
        assert!(!DgiError::BulkTransfer(rusb::Error::Pipe).is_timeout());
        assert!(DgiError::BulkTransfer(rusb::Error::Pipe).is_usb_error());

        assert!(DgiError::ShortFrame(1).is_framing_error());
        assert!(DgiError::EmptyDataResponse.is_framing_error());
        assert!(!DgiError::EmptyDataResponse.is_usb_error());

        assert!(DgiError::UnknownInterface(0x99).is_lookup_error());
        assert!(!DgiError::UnknownInterface(0x99).is_framing_error());
    }

    #[test]
    fn test_display() {
        let err = DgiError::CommandMismatch {
            expected: 0x02,
            actual: 0x08,
        };
        assert_eq!(err.to_string(), "Wrong command id: expected 0x02, got 0x08");
    }
}
