use std::fmt::Display;
use std::sync::Arc;

use eframe::egui::Ui;
use strum_macros::EnumIter;

pub mod controller;
pub mod error;
pub mod port;
pub mod settings;
pub mod view;

use error::SessionError;
use port::PortDriver;
use settings::Settings;

pub trait UiView {
    fn show(&mut self, ui: &mut Ui);
    fn take_request(&mut self) -> Option<ViewRequest>;
    fn handle_event(&mut self, event: ViewEvent);
}

/// Built once at startup and handed to the main window, which passes the
/// driver and settings on to the session controller.
pub struct AppContext {
    pub settings: Settings,
    pub driver: Arc<dyn PortDriver>,
}

impl AppContext {
    pub fn new(settings: Settings, driver: Arc<dyn PortDriver>) -> Self {
        Self { settings, driver }
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum ErrorType {
    #[default]
    None,
    ValidationError,
    ConnectionError,
    NotConnected,
    AlreadyConnected,
}

impl ErrorType {
    pub fn title(&self) -> &'static str {
        match self {
            ErrorType::None => "",
            ErrorType::ValidationError => "Error",
            ErrorType::ConnectionError => "Connection Error",
            ErrorType::NotConnected => "Not connected",
            ErrorType::AlreadyConnected => "Already connected",
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorType::NotConnected | ErrorType::AlreadyConnected)
    }
}

#[repr(u32)]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, EnumIter, strum_macros::Display)]
pub enum BaudRate {
    #[default]
    #[strum(to_string = "9600")]
    B9600 = 9600,
    #[strum(to_string = "19200")]
    B19200 = 19200,
    #[strum(to_string = "38400")]
    B38400 = 38400,
    #[strum(to_string = "57600")]
    B57600 = 57600,
    #[strum(to_string = "115200")]
    B115200 = 115200,
}

impl BaudRate {
    pub fn value(self) -> u32 {
        self as u32
    }
}

/// What the user picked in the connection window. Validated by the controller
/// when a connection is requested.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub port: String,
    pub baud_rate: Option<BaudRate>,
}

impl ConnectionConfig {
    pub fn new(port: &str, baud_rate: BaudRate) -> Self {
        Self {
            port: port.to_string(),
            baud_rate: Some(baud_rate),
        }
    }

    pub fn validate(&self) -> Result<(&str, BaudRate), SessionError> {
        let port = self.port.trim();
        match self.baud_rate {
            Some(baud_rate) if !port.is_empty() => Ok((port, baud_rate)),
            _ => Err(SessionError::Validation(
                "Select a port and baud rate.".to_string(),
            )),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Direction {
    Info,
    Rx,
    Tx,
    Error,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LogEntry {
    pub direction: Direction,
    pub text: String,
}

impl LogEntry {
    pub fn new(direction: Direction, text: impl Into<String>) -> Self {
        Self {
            direction,
            text: text.into(),
        }
    }
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.direction, self.text)
    }
}

#[derive(Debug)]
pub enum ViewRequest {
    // A request that wants to start connection with the selected port and baud rate
    ConnectionStart(ConnectionConfig),
    // A request that wants to stop connection from connection window
    ConnectionStop,
    // A request that wants to enumerate serial ports again
    RefreshPorts,
    // A request that wants to write a line from input window
    Send(String),
    // A request that wants to clear the output log
    ClearLog,
    // A request that wants to clear error from error window
    ErrorDismiss(ErrorType),
}

#[derive(Clone)]
pub enum ViewEvent {
    // Send error type and error message to error window
    ErrorOccurred(ErrorType, String),
    // Send current connection status to connection window
    ConnectionStatusUpdate(bool),
    // Send the latest enumerated port names to connection window
    PortListUpdate(Vec<String>),
    // Send a new session log entry to log window
    LogAppended(LogEntry),
    // Tell log window to drop all entries
    LogCleared,
    // Tell input window the last message was written
    MessageSent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn baud_rates_are_fixed_set_with_9600_default() {
        let rates: Vec<u32> = BaudRate::iter().map(BaudRate::value).collect();
        assert_eq!(rates, vec![9600, 19200, 38400, 57600, 115200]);
        assert_eq!(BaudRate::default(), BaudRate::B9600);
        assert_eq!(BaudRate::B115200.to_string(), "115200");
    }

    #[test]
    fn log_entry_format() {
        let entry = LogEntry::new(Direction::Rx, "temp=21.5");
        assert_eq!(entry.to_string(), "[RX] temp=21.5");
        assert_eq!(
            LogEntry::new(Direction::Info, "Disconnected.").to_string(),
            "[INFO] Disconnected."
        );
    }

    #[test]
    fn empty_port_or_baud_fails_validation() {
        let no_port = ConnectionConfig::new("  ", BaudRate::B9600);
        assert!(matches!(no_port.validate(), Err(SessionError::Validation(_))));

        let no_baud = ConnectionConfig {
            port: "COM3".to_string(),
            baud_rate: None,
        };
        assert!(matches!(no_baud.validate(), Err(SessionError::Validation(_))));

        let ok = ConnectionConfig::new("COM3", BaudRate::B115200);
        assert_eq!(ok.validate().ok(), Some(("COM3", BaudRate::B115200)));
    }
}
