//! Tests requiring actual serial hardware.
//!
//! # Running Hardware Tests
//!
//! ```bash
//! export TEST_PORT=COM3                  # or /dev/ttyUSB0 on Linux
//! export TEST_BAUD=9600                  # optional, default: 9600
//! export TEST_LOOPBACK=1                 # if port has TX-RX loopback
//!
//! cargo test --features hardware-tests -- --ignored
//! ```

use super::utils::{hardware, loopback, TimingHelper};
use crate::common::{sink, wait_until, within};
use serial_session::gateway::{GatewayError, SerialGateway};
use serial_session::port::SerialPortAdapter;
use serial_session::{registry, ReadOptions, SerialData, Session};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
#[ignore] // Run with --ignored flag
async fn test_real_port_session_open_close() {
    let Some(config) = hardware() else { return };
    println!("Testing port: {} at {} baud", config.port_name, config.baud_rate);

    let gateway = Arc::new(SerialGateway::new());
    let mut session = Session::with_gateway(config.session_options(), gateway.clone());

    for cycle in 1..=3 {
        println!("   Cycle {}/3", cycle);
        session.open().await.expect("open failed");
        assert!(gateway.is_open(&config.port_name));
        within(session.close()).await.expect("close failed");
        assert!(!gateway.is_open(&config.port_name));
    }
}

#[tokio::test]
#[ignore]
async fn test_real_port_listed_by_enumeration() {
    let Some(config) = hardware() else { return };

    let ports = registry::available_ports().await.expect("enumeration failed");
    for port in &ports {
        println!("   {} ({})", port.path, port.port_type);
    }
    assert!(
        ports.iter().any(|p| p.path == config.port_name),
        "{} not found among {} ports",
        config.port_name,
        ports.len()
    );
}

#[tokio::test]
#[ignore]
async fn test_real_port_second_session_rejected() {
    let Some(config) = hardware() else { return };

    let gateway = Arc::new(SerialGateway::new());
    let mut first = Session::with_gateway(config.session_options(), gateway.clone());
    let mut second = Session::with_gateway(config.session_options(), gateway.clone());

    first.open().await.expect("open failed");
    let err = second.open().await.unwrap_err();
    assert!(matches!(err.as_gateway(), Some(GatewayError::AlreadyOpen(_))));
    within(first.close()).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_real_port_loopback_listen() {
    let Some(config) = loopback() else { return };

    let gateway = Arc::new(SerialGateway::new());
    let mut session = Session::with_gateway(config.session_options(), gateway);
    session.open().await.expect("open failed");

    let (seen, handler) = sink();
    session.listen(handler, true).await.unwrap();
    session.read(ReadOptions::default()).await.unwrap();

    let timer = TimingHelper::new("loopback round trip");
    session.write("LOOPBACK TEST\r\n").await.unwrap();
    let complete = || {
        let text: String = seen
            .lock()
            .iter()
            .filter_map(SerialData::as_text)
            .collect();
        text.contains("LOOPBACK TEST")
    };
    assert!(wait_until(Duration::from_secs(3), complete).await);
    timer.finish();

    within(session.close()).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_real_port_baud_rate_switching() {
    let Some(config) = hardware() else { return };

    let gateway = Arc::new(SerialGateway::new());
    let mut session = Session::with_gateway(config.session_options(), gateway);
    session.open().await.expect("open failed");

    for baud in [9600, 19200, 38400, 57600, 115200] {
        println!("   Testing baud: {}", baud);
        session
            .set_baud_rate(baud)
            .await
            .unwrap_or_else(|e| panic!("failed at {baud} baud: {e}"));
        assert!(session.is_open());
    }

    within(session.close()).await.unwrap();
}

#[test]
#[ignore]
fn test_real_port_timeout_behavior() {
    let Some(config) = hardware() else { return };
    let Some(mut port) = config.open_raw(Duration::from_millis(100)) else {
        panic!("could not open {}", config.port_name);
    };

    // Drain anything the device sent before the test started.
    let mut buffer = [0u8; 100];
    while matches!(port.read_bytes(&mut buffer), Ok(n) if n > 0) {}

    let start = std::time::Instant::now();
    let result = port.read_bytes(&mut buffer);
    let elapsed = start.elapsed();
    println!("   Read result: {:?} after {:?}", result, elapsed);

    if let Err(e) = result {
        assert!(e.is_timeout(), "unexpected error: {e}");
    }
    // Should time out within reasonable time (allow some OS overhead)
    assert!(elapsed < Duration::from_millis(500), "took {elapsed:?}");
}
