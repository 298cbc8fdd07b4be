//! Utility functions for hardware testing.
//!
//! Provides port configuration from the environment, skip helpers and timing
//! utilities.

use serial_session::port::{PortConfiguration, SyncSerialPort};
use serial_session::SessionOptions;
use std::env;
use std::time::{Duration, Instant};

/// Test port configuration from environment.
pub struct TestPortConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub loopback_enabled: bool,
}

impl TestPortConfig {
    /// Get test configuration from environment variables.
    ///
    /// - `TEST_PORT`: port path (required)
    /// - `TEST_BAUD`: baud rate, default 9600
    /// - `TEST_LOOPBACK=1`: TX is wired to RX
    pub fn from_env() -> Option<Self> {
        let port_name = env::var("TEST_PORT").ok()?;
        let baud_rate = env::var("TEST_BAUD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(9600);
        let loopback_enabled = env::var("TEST_LOOPBACK").ok().as_deref() == Some("1");

        Some(TestPortConfig {
            port_name,
            baud_rate,
            loopback_enabled,
        })
    }

    /// Session options for the test port with a short read interval.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::new(&self.port_name, self.baud_rate).timeout(Duration::from_millis(50))
    }

    pub fn port_config(&self, timeout: Duration) -> PortConfiguration {
        PortConfiguration {
            baud_rate: self.baud_rate,
            timeout,
            ..Default::default()
        }
    }

    /// Open the port directly, bypassing the gateway.
    pub fn open_raw(&self, timeout: Duration) -> Option<SyncSerialPort> {
        match SyncSerialPort::open(&self.port_name, &self.port_config(timeout)) {
            Ok(port) => Some(port),
            Err(e) => {
                println!("Failed to open port: {}", e);
                None
            }
        }
    }
}

/// Returns the configuration, or prints why the test is skipped.
pub fn hardware() -> Option<TestPortConfig> {
    let config = TestPortConfig::from_env();
    if config.is_none() {
        println!("⏭️  Skipping: TEST_PORT environment variable not set");
        println!("   Set TEST_PORT=COM3 (or /dev/ttyUSB0) to run hardware tests");
    }
    config
}

/// Like [`hardware`], but also requires a loopback adapter.
pub fn loopback() -> Option<TestPortConfig> {
    let config = hardware()?;
    if !config.loopback_enabled {
        println!("⏭️  Skipping: TEST_LOOPBACK not set to 1");
        println!("   This test requires a loopback adapter (TX connected to RX)");
        return None;
    }
    Some(config)
}

/// Timing helper for measuring operation duration.
pub struct TimingHelper {
    start: Instant,
    name: String,
}

impl TimingHelper {
    pub fn new(name: &str) -> Self {
        println!("⏱️  Starting: {}", name);
        TimingHelper {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        println!("✅ Completed: {} in {:?}", self.name, elapsed);
        elapsed
    }
}
