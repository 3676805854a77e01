//! Linux i2c-dev transport and controller discovery.

use super::Transport;
use crate::error::BusError;
use crate::{Error, Result};
use i2cdev::core::I2CDevice;
use i2cdev::linux::LinuxI2CDevice;
use std::path::PathBuf;
use tracing::debug;

/// Where the kernel lists i2c-dev adapters.
const SYSFS_I2C_DEV: &str = "/sys/class/i2c-dev";

/// An I2C adapter exposed through `/dev/i2c-N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I2cController {
    /// Bus number `N`.
    pub number: u32,
    /// Adapter name reported by the kernel (e.g. `bcm2835 (i2c@7e804000)`).
    pub name: String,
    /// Character device path.
    pub path: PathBuf,
}

impl I2cController {
    /// Device name, `i2c-N`.
    pub fn device_name(&self) -> String {
        format!("i2c-{}", self.number)
    }

    /// Returns true if `selector` names this controller.
    ///
    /// Accepts the device name (`i2c-1`), the device path (`/dev/i2c-1`),
    /// the bare bus number (`1`) or a case-insensitive part of the adapter name.
    pub fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        if selector.is_empty() {
            return false;
        }
        self.is_named(selector)
            || self
                .name
                .to_lowercase()
                .contains(&selector.to_lowercase())
    }

    fn is_named(&self, selector: &str) -> bool {
        selector == self.device_name()
            || PathBuf::from(selector) == self.path
            || selector.parse::<u32>().ok() == Some(self.number)
    }
}

impl std::fmt::Display for I2cController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.name)
    }
}

/// Enumerates the i2c-dev adapters, lowest bus number first.
pub async fn list_controllers() -> Result<Vec<I2cController>> {
    let mut entries = match tokio::fs::read_dir(SYSFS_I2C_DEV).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not present, is i2c-dev loaded?", SYSFS_I2C_DEV);
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::Transfer(BusError::Io(e))),
    };

    let mut controllers = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(BusError::Io)? {
        let file_name = entry.file_name();
        let Some(number) = file_name
            .to_str()
            .and_then(|n| n.strip_prefix("i2c-"))
            .and_then(|n| n.parse::<u32>().ok())
        else {
            continue;
        };

        let name = tokio::fs::read_to_string(entry.path().join("name"))
            .await
            .map(|n| n.trim().to_string())
            .unwrap_or_default();

        debug!("Found I2C controller i2c-{}: {}", number, name);
        controllers.push(I2cController {
            number,
            name,
            path: PathBuf::from(format!("/dev/i2c-{}", number)),
        });
    }

    controllers.sort_by_key(|c| c.number);
    Ok(controllers)
}

/// Picks the controller named by `selector`, or the first one if `None` or blank.
pub async fn select_controller(selector: Option<&str>) -> Result<I2cController> {
    let controllers = list_controllers().await?;
    pick_controller(controllers, selector)
}

fn pick_controller(
    controllers: Vec<I2cController>,
    selector: Option<&str>,
) -> Result<I2cController> {
    let Some(selector) = selector.map(str::trim).filter(|s| !s.is_empty()) else {
        return controllers
            .into_iter()
            .next()
            .ok_or_else(|| Error::BusUnavailable("no i2c-dev adapters found".to_string()));
    };

    // Exact device names win over adapter name fragments
    let exact = controllers.iter().position(|c| c.is_named(selector));
    let index = exact.or_else(|| controllers.iter().position(|c| c.matches(selector)));

    match index {
        Some(i) => Ok(controllers[i].clone()),
        None => Err(Error::BusUnavailable(format!(
            "no adapter matching {:?}",
            selector
        ))),
    }
}

/// PCF8574 expander reached through a Linux i2c-dev adapter.
pub struct I2cTransport {
    device: LinuxI2CDevice,
    address: u16,
}

impl I2cTransport {
    /// Opens `address` on the given controller. Blocking.
    pub fn open(controller: &I2cController, address: u16) -> std::result::Result<Self, BusError> {
        let device = LinuxI2CDevice::new(&controller.path, address)?;
        debug!("Opened {} at address 0x{:02X}", controller, address);
        Ok(Self { device, address })
    }

    /// 7-bit device address.
    pub fn address(&self) -> u16 {
        self.address
    }
}

impl std::fmt::Debug for I2cTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I2cTransport(0x{:02X})", self.address)
    }
}

impl Transport for I2cTransport {
    fn write(&mut self, bytes: &[u8]) -> std::result::Result<(), BusError> {
        self.device.write(bytes)?;
        Ok(())
    }
}
