use std::time::Duration;

use crate::BaudRate;

/// Fixed knobs for the application. There is no config file or command line,
/// everything here is set at build time.
#[derive(Debug, Clone)]
pub struct Settings {
    pub window_title: String,
    pub window_size: [f32; 2],
    // I/O timeout handed to the driver when a port is opened
    pub read_timeout: Duration,
    // How long the reader sleeps when no bytes are waiting
    pub poll_interval: Duration,
    // Upper bound between UI frames, so background RX lines show up
    pub repaint_interval: Duration,
    pub default_baud_rate: BaudRate,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_title: "USB Serial Communication".to_string(),
            window_size: [800.0, 600.0],
            read_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(10),
            repaint_interval: Duration::from_millis(50),
            default_baud_rate: BaudRate::B9600,
        }
    }
}
