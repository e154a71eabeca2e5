//! DGI protocol structures
//!
//! This module contains the typed results of DGI operations and the
//! session-held mode state that controls poll response decoding.

use crate::constants::{
    DGI_ITF_STATUS_OVERFLOW, DGI_ITF_STATUS_STARTED, DGI_ITF_STATUS_TIMESTAMPED,
    DGI_MODE_4BYTES_LEN, DGI_MODE_OVERFLOW_INDICATOR,
};

/// Poll decoding mode negotiated with SET_MODE
///
/// The device cannot be queried for its mode, so these flags are only
/// correct as long as they mirror the last successful SET_MODE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    /// Poll length fields are 4 bytes instead of 2
    pub len_32bit: bool,
    /// Poll responses carry a 4-byte overflow indicator
    pub overflow_indicator: bool,
}

impl ModeFlags {
    /// Derive flags from a SET_MODE byte
    pub fn from_mode(mode: u8) -> Self {
        Self {
            len_32bit: (mode & DGI_MODE_4BYTES_LEN) != 0,
            overflow_indicator: (mode & DGI_MODE_OVERFLOW_INDICATOR) != 0,
        }
    }

    /// Build the SET_MODE byte for these flags
    pub fn to_mode(&self) -> u8 {
        let mut mode = 0;
        if self.len_32bit {
            mode |= DGI_MODE_4BYTES_LEN;
        }
        if self.overflow_indicator {
            mode |= DGI_MODE_OVERFLOW_INDICATOR;
        }
        mode
    }

    /// Size of the length field in poll responses
    pub fn length_field_size(&self) -> usize {
        if self.len_32bit {
            4
        } else {
            2
        }
    }

    /// Size of the poll response header following the interface echo
    pub fn poll_header_size(&self) -> usize {
        let overflow = if self.overflow_indicator { 4 } else { 0 };
        self.length_field_size() + overflow
    }
}

impl std::fmt::Display for ModeFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Mode: 0x{:02x} (length field: {} bytes, overflow indicator: {})",
            self.to_mode(),
            self.length_field_size(),
            if self.overflow_indicator { "on" } else { "off" }
        )
    }
}

/// DGI protocol version from GET_VERSION
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
}

impl Version {
    /// Create a new version
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

/// Interface status byte from INTERFACES_STATUS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceStatus {
    /// Raw status flags (combination of DGI_ITF_STATUS_* constants)
    pub flags: u8,
}

impl InterfaceStatus {
    /// Wrap a raw status byte
    pub fn new(flags: u8) -> Self {
        Self { flags }
    }

    /// Check if the interface is started
    pub fn is_started(&self) -> bool {
        (self.flags & DGI_ITF_STATUS_STARTED) != 0
    }

    /// Check if the interface data is timestamped
    pub fn is_timestamped(&self) -> bool {
        (self.flags & DGI_ITF_STATUS_TIMESTAMPED) != 0
    }

    /// Check if the interface buffer overflowed
    pub fn is_overflow(&self) -> bool {
        (self.flags & DGI_ITF_STATUS_OVERFLOW) != 0
    }
}

impl std::fmt::Display for InterfaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Started: {}\nTimestamped: {}\nOverflow: {}",
            self.is_started(),
            self.is_timestamped(),
            self.is_overflow()
        )
    }
}

/// Data retrieved by one INTERFACES_POLL_DATA call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolledFrame {
    /// Interface the data came from
    pub interface: u8,
    /// Captured bytes, exactly the length the device declared
    pub data: Vec<u8>,
    /// Device dropped data before this poll
    pub overflow: bool,
}

impl PolledFrame {
    /// Check if the poll returned no data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of captured bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }
}
