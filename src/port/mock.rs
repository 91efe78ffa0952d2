//! Scriptable stand-in for a serial device.
//!
//! A `MockDriver` hands out `MockPort` handles that share one device state,
//! so a test can keep its own handle to feed input, inspect writes, inject
//! failures and count how many handles are still open.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use super::{PortDriver, SerialIo};
use crate::error::SessionError;

#[derive(Debug, Default)]
struct MockDeviceState {
    read_queue: VecDeque<u8>,
    written: Vec<u8>,
    // Every write is fed back into `read_queue`, like a loopback peer
    echo: bool,
    fail_read: bool,
    fail_write: bool,
    open_handles: usize,
}

#[derive(Debug, Clone, Default)]
struct MockDevice(Arc<Mutex<MockDeviceState>>);

impl MockDevice {
    fn lock(&self) -> MutexGuard<'_, MockDeviceState> {
        // A panicking test thread must not hide the device from other tests
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One open handle to the mock device. Dropping it closes the handle.
#[derive(Debug)]
pub struct MockPort {
    device: MockDevice,
    timeout: Duration,
}

impl MockPort {
    fn attach(device: MockDevice, timeout: Duration) -> Self {
        device.lock().open_handles += 1;
        Self { device, timeout }
    }
}

impl Drop for MockPort {
    fn drop(&mut self) {
        let mut state = self.device.lock();
        state.open_handles = state.open_handles.saturating_sub(1);
    }
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        {
            let mut state = self.device.lock();
            if state.fail_read {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device removed"));
            }

            if !state.read_queue.is_empty() {
                let count = buf.len().min(state.read_queue.len());
                for (slot, byte) in buf.iter_mut().zip(state.read_queue.drain(..count)) {
                    *slot = byte;
                }
                return Ok(count);
            }
        }

        // Nothing queued, behave like a driver waiting out its timeout
        thread::sleep(self.timeout);
        Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"))
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.device.lock();
        if state.fail_write {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device removed"));
        }

        state.written.extend_from_slice(buf);
        if state.echo {
            state.read_queue.extend(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SerialIo for MockPort {
    fn bytes_to_read(&self) -> io::Result<u32> {
        let state = self.device.lock();
        if state.fail_read {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device removed"));
        }
        Ok(state.read_queue.len() as u32)
    }

    fn try_clone_io(&self) -> io::Result<Box<dyn SerialIo>> {
        Ok(Box::new(MockPort::attach(self.device.clone(), self.timeout)))
    }
}

#[derive(Debug, Default)]
struct MockDriverState {
    ports: Vec<String>,
    fail_open: bool,
    opened: Vec<(String, u32)>,
}

/// Driver that enumerates a fixed list of names and opens every one of them
/// onto the same mock device.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockDriverState>>,
    device: MockDevice,
}

impl MockDriver {
    pub fn new(ports: &[&str]) -> Self {
        let driver = Self::default();
        driver.set_ports(ports);
        driver
    }

    fn state(&self) -> MutexGuard<'_, MockDriverState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_ports(&self, ports: &[&str]) {
        self.state().ports = ports.iter().map(|x| x.to_string()).collect();
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.state().fail_open = fail;
    }

    /// Every successful `open` call as `(port, baud_rate)`.
    pub fn opened(&self) -> Vec<(String, u32)> {
        self.state().opened.clone()
    }

    /// Queue bytes for the reader, as if the device sent them.
    pub fn push_input(&self, data: &[u8]) {
        self.device.lock().read_queue.extend(data);
    }

    pub fn written(&self) -> Vec<u8> {
        self.device.lock().written.clone()
    }

    pub fn set_echo(&self, echo: bool) {
        self.device.lock().echo = echo;
    }

    pub fn set_fail_read(&self, fail: bool) {
        self.device.lock().fail_read = fail;
    }

    pub fn set_fail_write(&self, fail: bool) {
        self.device.lock().fail_write = fail;
    }

    pub fn open_handles(&self) -> usize {
        self.device.lock().open_handles
    }
}

impl PortDriver for MockDriver {
    fn list_ports(&self) -> Vec<String> {
        self.state().ports.clone()
    }

    fn open(
        &self,
        port: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Box<dyn SerialIo>, SessionError> {
        let mut state = self.state();
        if state.fail_open || !state.ports.iter().any(|x| x == port) {
            return Err(SessionError::Connection {
                port: port.to_string(),
                source: serialport::Error::new(
                    serialport::ErrorKind::NoDevice,
                    "no such device",
                ),
            });
        }

        // Like the real driver, the device stays locked while any handle is open
        if self.device.lock().open_handles > 0 {
            return Err(SessionError::Connection {
                port: port.to_string(),
                source: serialport::Error::new(
                    serialport::ErrorKind::NoDevice,
                    "Unable to acquire exclusive lock on serial port",
                ),
            });
        }

        state.opened.push((port.to_string(), baud_rate));
        Ok(Box::new(MockPort::attach(self.device.clone(), timeout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_counted_until_dropped() {
        let driver = MockDriver::new(&["COM3"]);
        let port = driver.open("COM3", 9600, Duration::from_millis(1)).unwrap();
        let clone = port.try_clone_io().unwrap();
        assert_eq!(driver.open_handles(), 2);

        drop(port);
        drop(clone);
        assert_eq!(driver.open_handles(), 0);
    }

    #[test]
    fn device_is_exclusive_while_a_handle_is_open() {
        let driver = MockDriver::new(&["COM3"]);
        let port = driver.open("COM3", 9600, Duration::from_millis(1)).unwrap();

        let second = driver.open("COM3", 9600, Duration::from_millis(1));
        assert!(matches!(second, Err(SessionError::Connection { .. })));

        drop(port);
        assert!(driver.open("COM3", 9600, Duration::from_millis(1)).is_ok());
    }

    #[test]
    fn unknown_port_fails_to_open() {
        let driver = MockDriver::new(&["COM3"]);
        let result = driver.open("COM9", 9600, Duration::from_millis(1));
        assert!(matches!(result, Err(SessionError::Connection { .. })));
        assert!(driver.opened().is_empty());
    }

    #[test]
    fn echo_loops_writes_back_to_input() {
        let driver = MockDriver::new(&["COM3"]);
        driver.set_echo(true);
        let mut port = driver.open("COM3", 9600, Duration::from_millis(1)).unwrap();

        port.write_all(b"ping\n").unwrap();
        assert_eq!(port.bytes_to_read().unwrap(), 5);

        let mut buf = [0_u8; 8];
        let count = port.read(&mut buf).unwrap();
        assert_eq!(&buf[..count], b"ping\n");
    }

    #[test]
    fn empty_input_times_out() {
        let driver = MockDriver::new(&["COM3"]);
        let mut port = driver.open("COM3", 9600, Duration::from_millis(1)).unwrap();

        let mut buf = [0_u8; 8];
        let err = port.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
