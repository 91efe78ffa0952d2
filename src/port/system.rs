use std::io::{self, Read, Write};
use std::time::Duration;

use log::{debug, warn};
use serialport::SerialPort;

use super::{PortDriver, SerialIo};
use crate::error::SessionError;

pub struct SystemDriver;

impl PortDriver for SystemDriver {
    fn list_ports(&self) -> Vec<String> {
        match serialport::available_ports() {
            Ok(ports) => ports.into_iter().map(|x| x.port_name).collect(),
            Err(e) => {
                warn!("list_ports(), failed to enumerate: {e}");
                Vec::new()
            }
        }
    }

    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialIo>, SessionError> {
        debug!("open(), port: {port}, baud: {baud_rate}");

        // Data bits, parity, stop bits and flow control stay at driver defaults
        let handle = serialport::new(port, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|source| SessionError::Connection {
                port: port.to_string(),
                source,
            })?;

        Ok(Box::new(SystemPort(handle)))
    }
}

struct SystemPort(Box<dyn SerialPort>);

impl Read for SystemPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Write for SystemPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl SerialIo for SystemPort {
    fn bytes_to_read(&self) -> io::Result<u32> {
        Ok(self.0.bytes_to_read()?)
    }

    fn try_clone_io(&self) -> io::Result<Box<dyn SerialIo>> {
        let handle = self.0.try_clone()?;
        Ok(Box::new(SystemPort(handle)))
    }
}
