//! DGI Protocol Implementation for Rust
//!
//! This crate provides a Rust client for the Data Gateway Interface (DGI),
//! the protocol spoken by USB data-acquisition gateways such as the EDBG
//! debugger to stream SPI, UART, I2C, GPIO and power data from a target.
//!
//! # Features
//!
//! - Sign-on, version and interface discovery
//! - Interface enable, status and configuration
//! - Data polling with 2- or 4-byte length fields and overflow indication
//! - Static name catalogs for interfaces and configuration parameters
//! - Pluggable transport, with a rusb-backed implementation included
//!
//! # Example
//!
//! ```no_run
//! use dgi::{interface_name, Session, DGI_ITF_ID_SPI, DGI_ITF_STATE_ON};
//!
//! fn main() -> dgi::Result<()> {
//!     let mut session = Session::open()?;
//!
//!     let ack = session.sign_on()?;
//!     println!("{} {}", ack, session.get_version()?);
//!
//!     for itf in session.interface_list()? {
//!         println!("Interface: {}", interface_name(itf).unwrap_or("Unknown"));
//!     }
//!
//!     session.interfaces_enable([(DGI_ITF_ID_SPI, DGI_ITF_STATE_ON)])?;
//!
//!     loop {
//!         let frame = session.poll_data(DGI_ITF_ID_SPI)?;
//!         if !frame.is_empty() {
//!             print!("{}", String::from_utf8_lossy(&frame.data));
//!         }
//!     }
//! }
//! ```
//!
//! # Supported Devices
//!
//! - Atmel/Microchip EDBG based gateways (VID: 0x03EB, PID: 0x2111)

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod poll;
pub mod session;
pub mod structures;
pub mod transport;

// Re-export main types at crate root
pub use constants::{
    // Config IDs
    DGI_CFG_SPI_CHARLEN,
    DGI_CFG_SPI_FORCECS,
    DGI_CFG_SPI_MODE,
    // Interface IDs
    DGI_ITF_ID_GPIO,
    DGI_ITF_ID_I2C,
    DGI_ITF_ID_POWER_DATA,
    DGI_ITF_ID_POWER_EVENTS,
    DGI_ITF_ID_RESERVED,
    DGI_ITF_ID_SPI,
    DGI_ITF_ID_TIMESTAMP,
    DGI_ITF_ID_UART,
    // Interface states
    DGI_ITF_STATE_OFF,
    DGI_ITF_STATE_ON,
    DGI_ITF_STATE_TIMESTAMP,
    // Interface status flags
    DGI_ITF_STATUS_OVERFLOW,
    DGI_ITF_STATUS_STARTED,
    DGI_ITF_STATUS_TIMESTAMPED,
    // Mode flags
    DGI_MODE_4BYTES_LEN,
    DGI_MODE_OVERFLOW_INDICATOR,
    // Reset levels
    DGI_RESET_HIGH,
    DGI_RESET_LOW,
};

pub use catalog::{config_name, interface_name, InterfaceDescriptor};
pub use config::ConfigParameter;
pub use error::{DgiError, Result};
pub use poll::PollHeader;
pub use session::Session;
pub use structures::{InterfaceStatus, ModeFlags, PolledFrame, Version};
pub use transport::{Transport, TransportConfig, UsbTransport};
