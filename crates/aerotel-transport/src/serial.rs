use std::io::Read;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{classify_read, ByteSource, ReadOutcome};

/// Default link speed of the sensor payload.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial link parameters. Framing is always 8N1 without flow control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    /// Baud rate. Default: 115200.
    pub baud_rate: u32,
    /// Maximum time a single read may block. Default: 1 s.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// A UART link opened through `serialport`.
pub struct SerialSource {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialSource {
    /// Open `port` (e.g. `/dev/ttyUSB0`, `COM7`) with the given parameters.
    pub fn open(port: &str, config: &SerialConfig) -> Result<Self> {
        let handle = serialport::new(port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()
            .map_err(|source| TransportError::OpenPort {
                port: port.to_string(),
                source,
            })?;

        info!(
            port,
            baud = config.baud_rate,
            timeout_ms = config.read_timeout.as_millis() as u64,
            "opened serial port"
        );

        Ok(Self {
            port: handle,
            name: port.to_string(),
        })
    }

    /// Port identifier this source was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ByteSource for SerialSource {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        loop {
            if let Some(outcome) = classify_read(self.port.read(buf)) {
                if matches!(outcome, Ok(ReadOutcome::Closed)) {
                    debug!(port = %self.name, "serial link closed");
                }
                return outcome;
            }
        }
    }
}

impl std::fmt::Debug for SerialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialSource")
            .field("name", &self.name)
            .finish()
    }
}

/// A serial port visible on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
}

/// Enumerate serial ports.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    Ok(ports
        .into_iter()
        .map(|port| {
            let (kind, description) = match port.port_type {
                SerialPortType::UsbPort(usb) => {
                    let label = match (usb.manufacturer, usb.product) {
                        (Some(m), Some(p)) => format!("{m} {p}"),
                        (Some(m), None) => m,
                        (None, Some(p)) => p,
                        (None, None) => format!("{:04x}:{:04x}", usb.vid, usb.pid),
                    };
                    ("usb", Some(label))
                }
                SerialPortType::PciPort => ("pci", None),
                SerialPortType::BluetoothPort => ("bluetooth", None),
                SerialPortType::Unknown => ("unknown", None),
            };
            PortInfo {
                name: port.port_name,
                kind: kind.to_string(),
                description,
            }
        })
        .collect())
}
