use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use serial_monitor::controller::session_controller::SessionController;
use serial_monitor::error::SessionError;
use serial_monitor::port::MockDriver;
use serial_monitor::settings::Settings;
use serial_monitor::{BaudRate, ConnectionConfig, Direction, LogEntry};

fn setup() -> (MockDriver, SessionController) {
    let driver = MockDriver::new(&["COM3", "COM4"]);
    let settings = Settings {
        read_timeout: Duration::from_millis(20),
        poll_interval: Duration::from_millis(1),
        ..Default::default()
    };
    let controller = SessionController::new(Arc::new(driver.clone()), settings);
    (driver, controller)
}

/// Poll the controller like the UI does until `done` holds or a second passes.
async fn poll_until(
    controller: &mut SessionController,
    log: &mut Vec<LogEntry>,
    done: impl Fn(&SessionController, &[LogEntry]) -> bool,
) {
    for _ in 0..500 {
        controller.poll();
        log.extend(controller.take_log_entries());
        if done(controller, log) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

fn connect_com3(controller: &mut SessionController) -> Vec<LogEntry> {
    controller
        .connect(&ConnectionConfig::new("COM3", BaudRate::B9600))
        .unwrap();
    controller.take_log_entries()
}

#[test]
fn ports_are_enumerated_fresh_each_call() {
    let (driver, controller) = setup();
    assert_eq!(controller.list_ports(), vec!["COM3", "COM4"]);

    driver.set_ports(&[]);
    assert!(controller.list_ports().is_empty());
}

#[test]
fn connect_with_empty_port_is_rejected() {
    let (driver, mut controller) = setup();

    for config in [
        ConnectionConfig::new("", BaudRate::B9600),
        ConnectionConfig {
            port: "COM3".to_string(),
            baud_rate: None,
        },
    ] {
        let result = controller.connect(&config);
        assert!(matches!(result, Err(SessionError::Validation(_))));
    }

    assert!(!controller.is_connected());
    assert!(driver.opened().is_empty());
    assert_eq!(driver.open_handles(), 0);
}

#[tokio::test]
async fn connect_logs_port_and_baud_once() {
    let (driver, mut controller) = setup();

    let log = connect_com3(&mut controller);

    assert!(controller.is_connected());
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].direction, Direction::Info);
    assert!(log[0].text.contains("COM3"));
    assert!(log[0].text.contains("9600"));
    assert_eq!(driver.opened(), vec![("COM3".to_string(), 9600)]);
    // Writer plus the one read task's handle
    assert_eq!(driver.open_handles(), 2);
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let (driver, mut controller) = setup();
    connect_com3(&mut controller);

    controller.disconnect();
    controller.disconnect();

    let log = controller.take_log_entries();
    assert_eq!(log, vec![LogEntry::new(Direction::Info, "Disconnected.")]);
    assert!(!controller.is_connected());
    assert_eq!(driver.open_handles(), 0);
}

#[tokio::test]
async fn disconnect_closes_handles_with_partial_line_pending() {
    let driver = MockDriver::new(&["COM3"]);
    let mut controller = SessionController::new(Arc::new(driver.clone()), Settings::default());
    connect_com3(&mut controller);

    // No terminator, so the reader holds this as an incomplete line
    driver.push_input(b"temp=2");
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.poll();
    assert!(controller.take_log_entries().is_empty());

    controller.disconnect();
    assert_eq!(driver.open_handles(), 0);

    // The port is free again straight away
    controller
        .connect(&ConnectionConfig::new("COM3", BaudRate::B9600))
        .unwrap();
    assert!(controller.is_connected());
    assert_eq!(driver.open_handles(), 2);
}

#[tokio::test]
async fn send_writes_line_terminated_bytes() {
    let (driver, mut controller) = setup();
    connect_com3(&mut controller);

    controller.send("hello").unwrap();

    assert_eq!(driver.written(), b"hello\n".to_vec());
    assert_eq!(
        controller.take_log_entries(),
        vec![LogEntry::new(Direction::Tx, "hello")]
    );
}

#[test]
fn send_while_disconnected_warns_without_logging() {
    let (driver, mut controller) = setup();

    let result = controller.send("hello");

    assert!(matches!(result, Err(SessionError::NotConnected)));
    assert!(controller.take_log_entries().is_empty());
    assert!(driver.written().is_empty());
}

#[tokio::test]
async fn write_failure_logs_error_and_disconnects() {
    let (driver, mut controller) = setup();
    connect_com3(&mut controller);
    driver.set_fail_write(true);

    let result = controller.send("hello");

    assert!(matches!(result, Err(SessionError::Io(_))));
    assert!(!controller.is_connected());
    let log = controller.take_log_entries();
    let directions: Vec<Direction> = log.iter().map(|x| x.direction).collect();
    assert_eq!(directions, vec![Direction::Error, Direction::Info]);
}

#[tokio::test]
async fn read_error_logs_once_then_disconnects() {
    let (driver, mut controller) = setup();
    connect_com3(&mut controller);

    driver.set_fail_read(true);

    let mut log = Vec::new();
    poll_until(&mut controller, &mut log, |c, _| !c.is_connected()).await;

    assert!(!controller.is_connected());
    let directions: Vec<Direction> = log.iter().map(|x| x.direction).collect();
    assert_eq!(directions, vec![Direction::Error, Direction::Info]);
    assert!(log[0].text.starts_with("Serial read error"));
    assert_eq!(driver.open_handles(), 0);
}

#[tokio::test]
async fn echoed_message_shows_tx_then_rx() {
    let (driver, mut controller) = setup();
    driver.set_echo(true);
    connect_com3(&mut controller);

    controller.send("status?").unwrap();

    let mut log = Vec::new();
    poll_until(&mut controller, &mut log, |_, log| log.len() >= 2).await;

    assert_eq!(
        log,
        vec![
            LogEntry::new(Direction::Tx, "status?"),
            LogEntry::new(Direction::Rx, "status?"),
        ]
    );
}

#[tokio::test]
async fn invalid_bytes_are_dropped_from_rx_lines() {
    let (driver, mut controller) = setup();
    connect_com3(&mut controller);

    driver.push_input(b"\xffT=21.5\xfe\r\n");

    let mut log = Vec::new();
    poll_until(&mut controller, &mut log, |_, log| !log.is_empty()).await;

    assert_eq!(log, vec![LogEntry::new(Direction::Rx, "T=21.5")]);
}

#[tokio::test]
async fn reconnect_after_disconnect_starts_new_session() {
    let (driver, mut controller) = setup();
    connect_com3(&mut controller);
    controller.disconnect();

    controller
        .connect(&ConnectionConfig::new("COM4", BaudRate::B115200))
        .unwrap();

    assert!(controller.is_connected());
    assert_eq!(
        driver.opened(),
        vec![("COM3".to_string(), 9600), ("COM4".to_string(), 115200)]
    );
}
