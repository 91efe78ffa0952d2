use std::sync::Arc;

use log::{error, info, warn};

use crate::controller::communication::{ReaderEvent, SerialSession};
use crate::error::SessionError;
use crate::port::PortDriver;
use crate::settings::Settings;
use crate::{ConnectionConfig, Direction, LogEntry};

/// Connection state machine. `session` is `Some` exactly while connected,
/// and every mutation happens on the caller's (UI) thread, including the
/// disconnect that follows a read error.
pub struct SessionController {
    driver: Arc<dyn PortDriver>,
    settings: Settings,
    session: Option<SerialSession>,
    // Entries not yet picked up by the view
    pending_log: Vec<LogEntry>,
}

impl SessionController {
    pub fn new(driver: Arc<dyn PortDriver>, settings: Settings) -> Self {
        Self {
            driver,
            settings,
            session: None,
            pending_log: Vec::new(),
        }
    }

    pub fn list_ports(&self) -> Vec<String> {
        self.driver.list_ports()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn connect(&mut self, config: &ConnectionConfig) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyConnected);
        }

        let session = SerialSession::open(self.driver.as_ref(), config, &self.settings)
            .inspect_err(|e| warn!("connect(), {e}"))?;

        self.append_log(
            Direction::Info,
            format!(
                "Connected to {} at {} baud.",
                session.port_name(),
                session.baud_rate()
            ),
        );
        self.session = Some(session);

        Ok(())
    }

    /// Safe to call in any state. Only an actual close is logged.
    pub fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            info!("disconnect(), closing {}", session.port_name());
            // Dropping the session cancels the read task and closes the writer
            drop(session);
            self.append_log(Direction::Info, "Disconnected.");
        }
    }

    pub fn send(&mut self, message: &str) -> Result<(), SessionError> {
        let Some(session) = self.session.as_mut() else {
            return Err(SessionError::NotConnected);
        };

        let message = message.trim();
        if message.is_empty() {
            return Ok(());
        }

        match session.write_line(message) {
            Ok(()) => {
                self.append_log(Direction::Tx, message);
                Ok(())
            }
            Err(e) => {
                error!("send(), write failed: {e}");
                self.append_log(Direction::Error, format!("Failed to send: {e}"));
                self.disconnect();
                Err(SessionError::Io(e))
            }
        }
    }

    /// Drain events from the read task. Called once per UI frame.
    pub fn poll(&mut self) {
        while let Some(event) = self.session.as_mut().and_then(|x| x.try_next_event()) {
            match event {
                ReaderEvent::Line(line) => self.append_log(Direction::Rx, line),
                ReaderEvent::Failed(e) => {
                    self.append_log(Direction::Error, format!("Serial read error: {e}"));
                    self.disconnect();
                }
            }
        }
    }

    pub fn take_log_entries(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.pending_log)
    }

    pub fn clear_log(&mut self) {
        self.pending_log.clear();
    }

    fn append_log(&mut self, direction: Direction, text: impl Into<String>) {
        self.pending_log.push(LogEntry::new(direction, text));
    }
}
