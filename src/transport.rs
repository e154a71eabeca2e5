//! USB bulk transport
//!
//! The session only needs two primitives from the link: write a buffer to
//! the OUT endpoint and read whatever arrives on the IN endpoint. The
//! `Transport` trait captures that; `UsbTransport` implements it over rusb.

use std::time::Duration;

use log::debug;
use rusb::{Device, DeviceHandle, Direction, GlobalContext, TransferType};

use crate::constants::{
    DGI_TRANSFER_TIMEOUT_MS, DGI_USB_PRODUCT_ID, DGI_USB_VENDOR_ID, USB_CLASS_VENDOR_SPEC,
};
use crate::error::{DgiError, Result};

/// Bulk byte link to a DGI gateway
pub trait Transport {
    /// Write a complete request frame
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read one transfer into `buf`, returning the number of bytes received
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }
}

/// USB transport settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// USB vendor ID to open
    pub vendor_id: u16,
    /// USB product ID to open
    pub product_id: u16,
    /// Bulk transfer timeout, `Duration::ZERO` blocks indefinitely
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            vendor_id: DGI_USB_VENDOR_ID,
            product_id: DGI_USB_PRODUCT_ID,
            timeout: Duration::from_millis(DGI_TRANSFER_TIMEOUT_MS),
        }
    }
}

/// Location of the DGI interface within the device descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DgiEndpoints {
    config: u8,
    interface: u8,
    setting: u8,
    ep_in: u8,
    ep_out: u8,
}

/// rusb-backed transport for a DGI gateway
pub struct UsbTransport {
    /// USB device handle
    handle: DeviceHandle<GlobalContext>,
    /// Claimed interface and its endpoints
    endpoints: DgiEndpoints,
    /// Bulk transfer timeout
    timeout: Duration,
}

impl UsbTransport {
    /// Open the gateway with the default VID/PID and timeout
    pub fn open() -> Result<Self> {
        Self::open_with(&TransportConfig::default())
    }

    /// Open the gateway described by `config`
    pub fn open_with(config: &TransportConfig) -> Result<Self> {
        let mut handle = rusb::open_device_with_vid_pid(config.vendor_id, config.product_id).ok_or(
            DgiError::DeviceNotFound {
                vendor_id: config.vendor_id,
                product_id: config.product_id,
            },
        )?;

        let device = handle.device();
        let endpoints = find_interface(&device)?;
        debug!(
            "DGI interface {} (config {}, alt {}), IN 0x{:02x}, OUT 0x{:02x}",
            endpoints.interface,
            endpoints.config,
            endpoints.setting,
            endpoints.ep_in,
            endpoints.ep_out
        );

        // Detach kernel driver on Linux/Unix
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            if handle
                .kernel_driver_active(endpoints.interface)
                .unwrap_or(false)
            {
                handle
                    .detach_kernel_driver(endpoints.interface)
                    .map_err(DgiError::DetachKernelDriver)?;
            }
        }

        if handle.active_configuration()? != endpoints.config {
            handle.set_active_configuration(endpoints.config)?;
        }

        handle
            .claim_interface(endpoints.interface)
            .map_err(DgiError::ClaimInterface)?;

        if endpoints.setting != 0 {
            handle.set_alternate_setting(endpoints.interface, endpoints.setting)?;
        }

        Ok(Self {
            handle,
            endpoints,
            timeout: config.timeout,
        })
    }

    /// Get the USB bus number
    pub fn bus(&self) -> u8 {
        self.handle.device().bus_number()
    }

    /// Get the USB device address
    pub fn address(&self) -> u8 {
        self.handle.device().address()
    }
}

impl Transport for UsbTransport {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        match self
            .handle
            .write_bulk(self.endpoints.ep_out, data, self.timeout)
        {
            Ok(_) => Ok(()),
            Err(rusb::Error::Timeout) => Err(DgiError::WriteTimeout),
            Err(e) => Err(DgiError::BulkTransfer(e)),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.handle.read_bulk(self.endpoints.ep_in, buf, self.timeout) {
            Ok(len) => Ok(len),
            Err(rusb::Error::Timeout) => Err(DgiError::ReadTimeout),
            Err(e) => Err(DgiError::BulkTransfer(e)),
        }
    }
}

impl std::fmt::Debug for UsbTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbTransport")
            .field("bus", &self.bus())
            .field("address", &self.address())
            .field("interface", &self.endpoints.interface)
            .field("ep_in", &format_args!("0x{:02x}", self.endpoints.ep_in))
            .field("ep_out", &format_args!("0x{:02x}", self.endpoints.ep_out))
            .finish()
    }
}

impl Drop for UsbTransport {
    fn drop(&mut self) {
        let _ = self.handle.release_interface(self.endpoints.interface);
    }
}

/// Find the vendor-specific interface carrying the DGI bulk endpoints
fn find_interface(device: &Device<GlobalContext>) -> Result<DgiEndpoints> {
    let desc = device.device_descriptor()?;

    for n in 0..desc.num_configurations() {
        let config = device.config_descriptor(n)?;

        for interface in config.interfaces() {
            for alt in interface.descriptors() {
                if alt.class_code() != USB_CLASS_VENDOR_SPEC
                    || alt.sub_class_code() != USB_CLASS_VENDOR_SPEC
                {
                    continue;
                }

                let mut ep_in = None;
                let mut ep_out = None;
                for ep in alt.endpoint_descriptors() {
                    if ep.transfer_type() != TransferType::Bulk {
                        continue;
                    }
                    match ep.direction() {
                        Direction::In => ep_in = Some(ep.address()),
                        Direction::Out => ep_out = Some(ep.address()),
                    }
                }

                return match (ep_in, ep_out) {
                    (Some(ep_in), Some(ep_out)) => Ok(DgiEndpoints {
                        config: config.number(),
                        interface: alt.interface_number(),
                        setting: alt.setting_number(),
                        ep_in,
                        ep_out,
                    }),
                    _ => Err(DgiError::EndpointNotFound),
                };
            }
        }
    }

    Err(DgiError::InterfaceNotFound)
}
