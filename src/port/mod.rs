//! Seam between the session controller and the serial driver.
//!
//! `SystemDriver` talks to real hardware through the `serialport` crate,
//! `MockDriver` lets tests script a device.

use std::io::{self, Read, Write};
use std::time::Duration;

use crate::error::SessionError;

pub mod mock;
pub mod system;

pub use mock::{MockDriver, MockPort};
pub use system::SystemDriver;

/// An open serial handle. Dropping the last clone closes the device.
pub trait SerialIo: Read + Write + Send {
    /// Number of bytes waiting in the input buffer.
    fn bytes_to_read(&self) -> io::Result<u32>;

    /// A second handle to the same device, so reads and writes can happen
    /// on different threads.
    fn try_clone_io(&self) -> io::Result<Box<dyn SerialIo>>;
}

pub trait PortDriver: Send + Sync {
    /// Device identifiers currently reported by the OS. Never cached, and
    /// empty rather than an error when nothing is attached.
    fn list_ports(&self) -> Vec<String>;

    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialIo>, SessionError>;
}
