//! DGI protocol constants
//!
//! This module contains the fixed protocol identifiers used on the wire:
//! command ids, response codes, mode bits, interface ids and per-interface
//! configuration ids.

// ============================================================================
// USB Vendor/Product IDs
// ============================================================================

/// Default DGI gateway vendor ID
pub const DGI_USB_VENDOR_ID: u16 = 0x03EB;
/// Default DGI gateway product ID
pub const DGI_USB_PRODUCT_ID: u16 = 0x2111;

/// USB class/subclass code marking the vendor-specific DGI interface
pub const USB_CLASS_VENDOR_SPEC: u8 = 0xFF;

/// Default receive buffer size in bytes
pub const DGI_RX_BUFFER_SIZE: usize = 16384;

/// Default bulk transfer timeout in milliseconds
pub const DGI_TRANSFER_TIMEOUT_MS: u64 = 1000;

// ============================================================================
// Frame Layout
// ============================================================================

/// Request header size: command (1) + length (2)
pub const DGI_REQUEST_HEADER_SIZE: usize = 3;
/// Response header size: command echo (1) + status (1)
pub const DGI_RESPONSE_HEADER_SIZE: usize = 2;
/// Largest payload a request length field can describe
pub const DGI_MAX_PAYLOAD: usize = u16::MAX as usize;

// ============================================================================
// Command IDs
// ============================================================================

/// Sign on, returns the gateway identification string
pub const DGI_CMD_SIGN_ON: u8 = 0x00;
/// Sign off
pub const DGI_CMD_SIGN_OFF: u8 = 0x01;
/// Get protocol version
pub const DGI_CMD_GET_VERSION: u8 = 0x02;
/// List available interfaces
pub const DGI_CMD_INTERFACES_LIST: u8 = 0x08;
/// Set operation mode
pub const DGI_CMD_SET_MODE: u8 = 0x0A;
/// Enable or disable interfaces
pub const DGI_CMD_INTERFACES_ENABLE: u8 = 0x10;
/// Get interface status
pub const DGI_CMD_INTERFACES_STATUS: u8 = 0x11;
/// Set interface configuration
pub const DGI_CMD_INTERFACES_SET_CONFIG: u8 = 0x12;
/// Get interface configuration
pub const DGI_CMD_INTERFACES_GET_CONFIG: u8 = 0x13;
/// Send data over an interface
pub const DGI_CMD_INTERFACES_SEND_DATA: u8 = 0x14;
/// Poll buffered data from an interface
pub const DGI_CMD_INTERFACES_POLL_DATA: u8 = 0x15;
/// Drive the target reset line
pub const DGI_CMD_TARGET_RESET: u8 = 0x20;

/// Get human-readable name for a command ID
pub fn command_name(cmd: u8) -> &'static str {
    match cmd {
        DGI_CMD_SIGN_ON => "SIGN_ON",
        DGI_CMD_SIGN_OFF => "SIGN_OFF",
        DGI_CMD_GET_VERSION => "GET_VERSION",
        DGI_CMD_INTERFACES_LIST => "INTERFACES_LIST",
        DGI_CMD_SET_MODE => "SET_MODE",
        DGI_CMD_INTERFACES_ENABLE => "INTERFACES_ENABLE",
        DGI_CMD_INTERFACES_STATUS => "INTERFACES_STATUS",
        DGI_CMD_INTERFACES_SET_CONFIG => "INTERFACES_SET_CONFIG",
        DGI_CMD_INTERFACES_GET_CONFIG => "INTERFACES_GET_CONFIG",
        DGI_CMD_INTERFACES_SEND_DATA => "INTERFACES_SEND_DATA",
        DGI_CMD_INTERFACES_POLL_DATA => "INTERFACES_POLL_DATA",
        DGI_CMD_TARGET_RESET => "TARGET_RESET",
        _ => "UNKNOWN",
    }
}

// ============================================================================
// Response Status Codes
// ============================================================================

/// Command accepted, no payload expected
pub const DGI_RESP_OK: u8 = 0x80;
/// Command accepted, payload follows
pub const DGI_RESP_DATA: u8 = 0xA0;

// ============================================================================
// Mode Flags (SET_MODE argument)
// ============================================================================

/// Poll responses carry an overflow indicator field
pub const DGI_MODE_OVERFLOW_INDICATOR: u8 = 1 << 0;
/// Poll responses use 4-byte length fields
pub const DGI_MODE_4BYTES_LEN: u8 = 1 << 2;

// ============================================================================
// Target Reset Levels
// ============================================================================

/// Release reset (line high)
pub const DGI_RESET_HIGH: u8 = 0;
/// Assert reset (line low)
pub const DGI_RESET_LOW: u8 = 1;

// ============================================================================
// Interface States (INTERFACES_ENABLE argument)
// ============================================================================

/// Interface disabled
pub const DGI_ITF_STATE_OFF: u8 = 0;
/// Interface enabled
pub const DGI_ITF_STATE_ON: u8 = 1;
/// Interface enabled with timestamping
pub const DGI_ITF_STATE_TIMESTAMP: u8 = 2;

// ============================================================================
// Interface IDs
// ============================================================================

/// Timestamp interface
pub const DGI_ITF_ID_TIMESTAMP: u8 = 0x00;
/// SPI interface
pub const DGI_ITF_ID_SPI: u8 = 0x20;
/// UART interface
pub const DGI_ITF_ID_UART: u8 = 0x21;
/// I2C interface
pub const DGI_ITF_ID_I2C: u8 = 0x22;
/// GPIO interface
pub const DGI_ITF_ID_GPIO: u8 = 0x30;
/// Power measurement data
pub const DGI_ITF_ID_POWER_DATA: u8 = 0x40;
/// Power measurement events
pub const DGI_ITF_ID_POWER_EVENTS: u8 = 0x41;
/// Reserved
pub const DGI_ITF_ID_RESERVED: u8 = 0xFF;

// ============================================================================
// Interface Status Flags (INTERFACES_STATUS response)
// ============================================================================

/// Interface is started
pub const DGI_ITF_STATUS_STARTED: u8 = 1 << 0;
/// Interface data is timestamped
pub const DGI_ITF_STATUS_TIMESTAMPED: u8 = 1 << 1;
/// Interface buffer overflowed
pub const DGI_ITF_STATUS_OVERFLOW: u8 = 1 << 2;

// ============================================================================
// SPI Configuration IDs
// ============================================================================

/// SPI character length
pub const DGI_CFG_SPI_CHARLEN: u16 = 0;
/// SPI mode
pub const DGI_CFG_SPI_MODE: u16 = 1;
/// SPI force chip select
pub const DGI_CFG_SPI_FORCECS: u16 = 2;
