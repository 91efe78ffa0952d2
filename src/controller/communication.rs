use std::io::{self, Read, Write};
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};

use crate::error::SessionError;
use crate::port::{PortDriver, SerialIo};
use crate::settings::Settings;
use crate::{BaudRate, ConnectionConfig};

/// What the read task reports back to the UI thread.
#[derive(Debug, PartialEq, Eq)]
pub enum ReaderEvent {
    Line(String),
    Failed(String),
}

/// Decode a raw line, dropping byte sequences that are not valid UTF-8.
pub fn decode_line(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

struct SerialReadActor {
    port: Box<dyn SerialIo>,
    event_send: mpsc::UnboundedSender<ReaderEvent>,
    cancel_actor_recv: watch::Receiver<bool>,
    // Dropped after the port, so the session knows the read handle is closed
    done_send: std_mpsc::Sender<()>,
    poll_interval: Duration,
    line_timeout: Duration,
}

impl SerialReadActor {
    fn run(self) {
        let Self {
            port,
            event_send,
            cancel_actor_recv,
            done_send,
            poll_interval,
            line_timeout,
        } = self;

        // `port` is consumed here and closed before the failure is reported
        let result = Self::run_internal(
            port,
            &event_send,
            &cancel_actor_recv,
            poll_interval,
            line_timeout,
        );
        if let Err(e) = result {
            error!("SerialReadActor error: {e}");
            let _ = event_send.send(ReaderEvent::Failed(e.to_string()));
        }

        drop(done_send);
    }

    // Never blocks longer than one poll interval: only bytes already waiting
    // in the driver are read, so cancellation is always seen promptly.
    fn run_internal(
        mut port: Box<dyn SerialIo>,
        event_send: &mpsc::UnboundedSender<ReaderEvent>,
        cancel_actor_recv: &watch::Receiver<bool>,
        poll_interval: Duration,
        line_timeout: Duration,
    ) -> io::Result<()> {
        let mut buffer = [0_u8; 1024];
        let mut line = Vec::new();
        let mut last_rx = Instant::now();

        loop {
            // A cancel value or a dropped session both end the task
            if !matches!(cancel_actor_recv.has_changed(), Ok(false)) {
                debug!("read_loop(), cancel actor");
                break Ok(());
            }

            let available = port.bytes_to_read()? as usize;
            if available == 0 {
                // A partial line is handed over once the device goes quiet
                if !line.is_empty()
                    && last_rx.elapsed() >= line_timeout
                    && !Self::emit_line(&mut line, event_send)
                {
                    break Ok(());
                }
                thread::sleep(poll_interval);
                continue;
            }

            let len = available.min(buffer.len());
            let count = match port.read(&mut buffer[..len]) {
                Ok(0) => {
                    break Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "device closed",
                    ));
                }
                Ok(count) => count,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                    ) =>
                {
                    continue;
                }
                Err(e) => break Err(e),
            };
            last_rx = Instant::now();

            for chunk in buffer[..count].split_inclusive(|&x| x == b'\n') {
                line.extend_from_slice(chunk);
                if chunk.ends_with(b"\n") && !Self::emit_line(&mut line, event_send) {
                    debug!("read_loop(), receiver dropped");
                    return Ok(());
                }
            }
        }
    }

    /// Returns false once the session side is gone.
    fn emit_line(line: &mut Vec<u8>, event_send: &mpsc::UnboundedSender<ReaderEvent>) -> bool {
        let text = decode_line(line);
        line.clear();

        let text = text.trim();
        if text.is_empty() {
            return true;
        }
        event_send.send(ReaderEvent::Line(text.to_string())).is_ok()
    }
}

/// One open connection. Owns the write handle and the channels to the read
/// task. Dropping it stops the task and waits until the read handle is
/// closed, so the device is free again once the drop returns.
pub struct SerialSession {
    port_name: String,
    baud_rate: BaudRate,
    writer: Box<dyn SerialIo>,
    event_recv: mpsc::UnboundedReceiver<ReaderEvent>,
    cancel_actor_send: watch::Sender<bool>,
    actor_done_recv: std_mpsc::Receiver<()>,
    shutdown_timeout: Duration,
}

impl SerialSession {
    /// Open the device and start its read task. Must be called inside a
    /// tokio runtime.
    pub fn open(
        driver: &dyn PortDriver,
        config: &ConnectionConfig,
        settings: &Settings,
    ) -> Result<Self, SessionError> {
        let (port_name, baud_rate) = config.validate()?;

        let writer = driver.open(port_name, baud_rate.value(), settings.read_timeout)?;
        let reader = writer
            .try_clone_io()
            .map_err(|e| SessionError::Connection {
                port: port_name.to_string(),
                source: e.into(),
            })?;

        let (event_send, event_recv) = mpsc::unbounded_channel();
        let (cancel_actor_send, cancel_actor_recv) = watch::channel(false);
        let (done_send, actor_done_recv) = std_mpsc::channel();

        let actor = SerialReadActor {
            port: reader,
            event_send,
            cancel_actor_recv,
            done_send,
            poll_interval: settings.poll_interval,
            line_timeout: settings.read_timeout,
        };
        tokio::task::spawn_blocking(move || actor.run());

        info!("SerialSession opened {port_name} at {baud_rate}");

        Ok(Self {
            port_name: port_name.to_string(),
            baud_rate,
            writer,
            event_recv,
            cancel_actor_send,
            actor_done_recv,
            shutdown_timeout: settings.read_timeout + settings.poll_interval,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn baud_rate(&self) -> BaudRate {
        self.baud_rate
    }

    pub fn write_line(&mut self, message: &str) -> io::Result<()> {
        let mut bytes = Vec::with_capacity(message.len() + 1);
        bytes.extend_from_slice(message.as_bytes());
        bytes.push(b'\n');

        self.writer.write_all(&bytes)?;
        self.writer.flush()
    }

    /// Next event from the read task without blocking.
    pub fn try_next_event(&mut self) -> Option<ReaderEvent> {
        self.event_recv.try_recv().ok()
    }

    /// Cancel the read task and wait until it has closed its handle.
    pub fn stop(&self) {
        // The task may already be gone after a read error
        let _ = self.cancel_actor_send.send(true);

        match self.actor_done_recv.recv_timeout(self.shutdown_timeout) {
            Ok(()) | Err(std_mpsc::RecvTimeoutError::Disconnected) => (),
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                warn!("stop(), read task on {} did not exit in time", self.port_name);
            }
        }
    }
}

impl Drop for SerialSession {
    fn drop(&mut self) {
        self.stop();
    }
}
