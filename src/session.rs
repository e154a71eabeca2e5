//! DGI session implementation
//!
//! This module provides the `Session` struct, which owns a transport to a
//! DGI gateway and exposes the protocol's command set.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::config::{decode_get_config, encode_set_config};
use crate::constants::*;
use crate::error::{DgiError, Result};
use crate::frame::{self, hex, Response};
use crate::structures::{InterfaceStatus, ModeFlags, Version};
use crate::transport::{Transport, TransportConfig, UsbTransport};

/// DGI session
///
/// Owns the transport to a gateway, the receive buffer shared by every
/// command, and the mode flags used to decode polled data. Only one command
/// may be in flight at a time, which `&mut self` enforces.
///
/// # Example
///
/// ```no_run
/// use dgi::{Session, DGI_ITF_ID_SPI, DGI_ITF_STATE_ON};
///
/// let mut session = Session::open()?;
///
/// let ack = session.sign_on()?;
/// let version = session.get_version()?;
/// println!("{} {}", ack, version);
///
/// session.interfaces_enable([(DGI_ITF_ID_SPI, DGI_ITF_STATE_ON)])?;
///
/// let frame = session.poll_data(DGI_ITF_ID_SPI)?;
/// println!("{} bytes", frame.len());
///
/// session.sign_off()?;
/// # Ok::<(), dgi::DgiError>(())
/// ```
pub struct Session<T: Transport = UsbTransport> {
    /// Link to the gateway
    pub(crate) transport: T,
    /// Receive buffer, overwritten by every read
    pub(crate) buf: Vec<u8>,
    /// Poll decoding mode from the last successful SET_MODE
    pub(crate) mode: ModeFlags,
}

impl Session<UsbTransport> {
    /// Open the gateway with default USB settings
    pub fn open() -> Result<Self> {
        Self::open_with(&TransportConfig::default())
    }

    /// Open the gateway described by `config`
    pub fn open_with(config: &TransportConfig) -> Result<Self> {
        let transport = UsbTransport::open_with(config)?;
        debug!("Opened DGI gateway {:?}", transport);
        Ok(Self::new(transport))
    }
}

impl<T: Transport> Session<T> {
    /// Create a session over an already opened transport
    pub fn new(transport: T) -> Self {
        Self::with_buffer_size(transport, DGI_RX_BUFFER_SIZE)
    }

    /// Create a session with a custom receive buffer size
    pub fn with_buffer_size(transport: T, size: usize) -> Self {
        Self {
            transport,
            buf: vec![0u8; size],
            mode: ModeFlags::default(),
        }
    }

    /// Get the current poll decoding mode
    pub fn mode(&self) -> ModeFlags {
        self.mode
    }

    /// Get a reference to the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Close the session, returning the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Sign on to the gateway
    ///
    /// # Returns
    /// The gateway identification string
    pub fn sign_on(&mut self) -> Result<String> {
        let data = self.send_command(DGI_CMD_SIGN_ON, &[])?;

        if data.len() < 2 {
            return Err(DgiError::WrongLength {
                expected: 2,
                actual: data.len(),
            });
        }

        let len = u16::from_be_bytes([data[0], data[1]]) as usize;
        let text = &data[2..];
        if text.len() < len {
            return Err(DgiError::TruncatedString {
                declared: len,
                actual: text.len(),
            });
        }

        Ok(String::from_utf8_lossy(&text[..len]).into_owned())
    }

    /// Sign off from the gateway
    pub fn sign_off(&mut self) -> Result<()> {
        self.send_command(DGI_CMD_SIGN_OFF, &[])?;
        Ok(())
    }

    /// Get the DGI protocol version
    pub fn get_version(&mut self) -> Result<Version> {
        let data = self.send_command(DGI_CMD_GET_VERSION, &[])?;

        if data.len() != 2 {
            return Err(DgiError::WrongLength {
                expected: 2,
                actual: data.len(),
            });
        }

        Ok(Version::new(data[0], data[1]))
    }

    /// List the interfaces the gateway exposes
    pub fn interface_list(&mut self) -> Result<Vec<u8>> {
        let data = self.send_command(DGI_CMD_INTERFACES_LIST, &[])?;

        let Some((&count, ids)) = data.split_first() else {
            return Err(DgiError::WrongLength {
                expected: 1,
                actual: 0,
            });
        };

        let count = count as usize;
        if ids.len() < count {
            return Err(DgiError::WrongLength {
                expected: count + 1,
                actual: data.len(),
            });
        }

        Ok(ids[..count].to_vec())
    }

    /// Set the operation mode
    ///
    /// # Arguments
    /// * `mode` - Mode byte (combination of DGI_MODE_* constants)
    ///
    /// The session's poll decoding flags follow the mode byte once the
    /// gateway has accepted it; a failed command leaves them unchanged.
    pub fn set_mode(&mut self, mode: u8) -> Result<()> {
        self.send_command(DGI_CMD_SET_MODE, &[mode])?;
        self.mode = ModeFlags::from_mode(mode);
        debug!("{}", self.mode);
        Ok(())
    }

    /// Drive the target reset line
    ///
    /// # Arguments
    /// * `level` - DGI_RESET_HIGH or DGI_RESET_LOW
    pub fn target_reset(&mut self, level: u8) -> Result<()> {
        self.send_command(DGI_CMD_TARGET_RESET, &[level])?;
        Ok(())
    }

    /// Enable or disable interfaces
    ///
    /// # Arguments
    /// * `states` - Interface ID to DGI_ITF_STATE_* pairs
    pub fn interfaces_enable<I>(&mut self, states: I) -> Result<()>
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let data: Vec<u8> = states
            .into_iter()
            .flat_map(|(itf, state)| [itf, state])
            .collect();

        self.send_command(DGI_CMD_INTERFACES_ENABLE, &data)?;
        Ok(())
    }

    /// Get the status of every interface
    pub fn interfaces_status(&mut self) -> Result<BTreeMap<u8, InterfaceStatus>> {
        let data = self.send_command(DGI_CMD_INTERFACES_STATUS, &[])?;

        if data.len() % 2 != 0 {
            return Err(DgiError::WrongLength {
                expected: data.len() + 1,
                actual: data.len(),
            });
        }

        Ok(data
            .chunks_exact(2)
            .map(|pair| (pair[0], InterfaceStatus::new(pair[1])))
            .collect())
    }

    /// Get the configuration of an interface
    ///
    /// # Returns
    /// Config ID to value mapping
    pub fn interfaces_get_config(&mut self, itf: u8) -> Result<BTreeMap<u16, u32>> {
        let data = self.send_command(DGI_CMD_INTERFACES_GET_CONFIG, &[itf])?;
        decode_get_config(itf, data)
    }

    /// Set configuration parameters of an interface
    ///
    /// Parameters are sent in iteration order.
    pub fn interfaces_set_config<I>(&mut self, itf: u8, params: I) -> Result<()>
    where
        I: IntoIterator<Item = (u16, u32)>,
    {
        let data = encode_set_config(itf, params);
        self.send_command(DGI_CMD_INTERFACES_SET_CONFIG, &data)?;
        Ok(())
    }

    /// Send data over an interface
    pub fn interfaces_send_data(&mut self, itf: u8, data: &[u8]) -> Result<()> {
        let mut payload = Vec::with_capacity(data.len() + 1);
        payload.push(itf);
        payload.extend_from_slice(data);

        self.send_command(DGI_CMD_INTERFACES_SEND_DATA, &payload)?;
        Ok(())
    }

    /// Send a command and return the validated response payload
    ///
    /// The payload borrows the receive buffer and is invalidated by the next
    /// transport read.
    pub(crate) fn send_command(&mut self, cmd: u8, payload: &[u8]) -> Result<&[u8]> {
        let request = frame::encode(cmd, payload)?;
        trace!("TX {}: {}", command_name(cmd), hex(&request));

        self.transport.write(&request)?;
        let len = self.transport.read(&mut self.buf)?;

        let raw = &self.buf[..len];
        trace!("RX {}: {}", command_name(cmd), hex(raw));

        Response::decode(raw)?.validate(cmd)
    }
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("buffer_size", &self.buf.len())
            .field("len_32bit", &self.mode.len_32bit)
            .field("overflow_indicator", &self.mode.overflow_indicator)
            .finish()
    }
}
