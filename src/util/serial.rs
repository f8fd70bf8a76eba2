//! Serial port discovery.

use anyhow::{bail, Result};
use serialport::{SerialPortInfo, SerialPortType};

use crate::util::shell::Shell;

/// List every serial port on the system.
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    Ok(serialport::available_ports()?)
}

/// Names of every connected serial device.
pub fn device_names() -> Result<Vec<String>> {
    Ok(list_ports()?.into_iter().map(|p| p.port_name).collect())
}

/// Pick a port automatically: prefer one that identifies as an Arduino,
/// otherwise fall back to the first available port with a warning.
pub fn autodetect(shell: &Shell) -> Result<String> {
    let ports = list_ports()?;
    if ports.is_empty() {
        bail!("no serial device is connected at the moment");
    }

    for port in &ports {
        if describes_arduino(port) {
            return Ok(port.port_name.clone());
        }
    }

    shell.warn("no Arduino port found, choosing the first available one; pass --port to override");
    Ok(ports[0].port_name.clone())
}

fn describes_arduino(port: &SerialPortInfo) -> bool {
    match &port.port_type {
        SerialPortType::UsbPort(usb) => usb
            .product
            .as_deref()
            .or(usb.manufacturer.as_deref())
            .map(|s| s.to_lowercase().contains("arduino"))
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb_port(name: &str, product: Option<&str>) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x2341,
                pid: 0x0043,
                serial_number: None,
                manufacturer: None,
                product: product.map(|s| s.to_string()),
            }),
        }
    }

    #[test]
    fn test_describes_arduino() {
        assert!(describes_arduino(&usb_port(
            "/dev/ttyACM0",
            Some("Arduino Uno")
        )));
        assert!(!describes_arduino(&usb_port(
            "/dev/ttyUSB0",
            Some("FT232R USB UART")
        )));
        assert!(!describes_arduino(&SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: SerialPortType::Unknown,
        }));
    }
}
