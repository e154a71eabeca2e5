//! Interface and configuration name catalogs
//!
//! Static lookup tables resolving protocol identifiers to display names.

use crate::constants::*;
use crate::error::{DgiError, Result};

/// Interface ID to name
const INTERFACES: &[(u8, &str)] = &[
    (DGI_ITF_ID_TIMESTAMP, "Timestamp"),
    (DGI_ITF_ID_SPI, "SPI"),
    (DGI_ITF_ID_UART, "UART"),
    (DGI_ITF_ID_I2C, "I2C"),
    (DGI_ITF_ID_GPIO, "GPIO"),
    (DGI_ITF_ID_POWER_DATA, "Power Data"),
    (DGI_ITF_ID_POWER_EVENTS, "Power Events"),
    (DGI_ITF_ID_RESERVED, "Reserved"),
];

const SPI_CONFIG: &[(u16, &str)] = &[
    (DGI_CFG_SPI_CHARLEN, "Character length"),
    (DGI_CFG_SPI_MODE, "Mode"),
    (DGI_CFG_SPI_FORCECS, "Force CS"),
];

/// Interface ID to its config ID table
const CONFIGS: &[(u8, &[(u16, &str)])] = &[(DGI_ITF_ID_SPI, SPI_CONFIG)];

/// Get the display name of an interface
pub fn interface_name(id: u8) -> Result<&'static str> {
    INTERFACES
        .iter()
        .find(|(itf, _)| *itf == id)
        .map(|(_, name)| *name)
        .ok_or(DgiError::UnknownInterface(id))
}

/// Get the display name of an interface configuration parameter
pub fn config_name(itf: u8, id: u16) -> Result<&'static str> {
    let table = CONFIGS
        .iter()
        .find(|(i, _)| *i == itf)
        .map(|(_, table)| *table)
        .ok_or(DgiError::UnknownInterface(itf))?;

    table
        .iter()
        .find(|(cfg, _)| *cfg == id)
        .map(|(_, name)| *name)
        .ok_or(DgiError::UnknownConfigId { itf, id })
}

/// Iterate over every known interface
pub fn interfaces() -> impl Iterator<Item = InterfaceDescriptor> {
    INTERFACES
        .iter()
        .map(|&(id, name)| InterfaceDescriptor { id, name })
}

/// An interface ID paired with its catalog name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    /// Interface ID
    pub id: u8,
    /// Display name
    pub name: &'static str,
}

impl InterfaceDescriptor {
    /// Resolve an interface ID against the catalog
    pub fn resolve(id: u8) -> Result<Self> {
        Ok(Self {
            id,
            name: interface_name(id)?,
        })
    }
}

impl std::fmt::Display for InterfaceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:02X})", self.name, self.id)
    }
}
