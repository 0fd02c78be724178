//! Application supervisor and monitoring
//!
//! This module provides the start-up banner, the periodic status report and
//! the heartbeat LED.

use core::fmt::Write;

use embassy_time::{Duration, Timer};
use embedded_hal::digital::OutputPin;
use heapless::String;

use crate::channels::RenderSender;
use crate::config::*;
use crate::fatal::{halt, Fault};
use crate::render::print_text;
use crate::stats::PipelineStats;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const STATUS_INTERVAL_SECS: u32 = 60;
const UPTIME_STEP_SECS: u32 = 10;

/// Application supervisor responsible for monitoring and lifecycle management
pub struct AppSupervisor<'a> {
    stats: &'a PipelineStats,
    render: RenderSender<'a>,
    uptime_seconds: u32,
    last_heartbeat: u32,
}

impl<'a> AppSupervisor<'a> {
    pub fn new(stats: &'a PipelineStats, render: RenderSender<'a>) -> Self {
        Self {
            stats,
            render,
            uptime_seconds: 0,
            last_heartbeat: 0,
        }
    }

    /// Print application startup banner with pipeline configuration
    pub fn print_startup_banner(&self) {
        info!("========================================");
        info!("VoltGraph v{}", APP_VERSION);
        info!("Voltage strip-chart recorder");
        info!("========================================");
        info!("Hardware: RP2040 (Raspberry Pi Pico)");
        info!(
            "Sensor: I2C addr=0x{:02X} @ {} Hz",
            SENSOR_I2C_ADDRESS, I2C_FREQUENCY_HZ
        );
        info!("Display: {}x{} RGB565", DISPLAY_WIDTH, DISPLAY_HEIGHT);
        info!(
            "Sample every {} ms, redraw every {} ms",
            SAMPLE_PERIOD_MS, REDRAW_PERIOD_MS
        );
        info!("========================================");
    }

    /// Report successful start-up on the log and the status row
    pub async fn print_init_success(&self) {
        info!("VoltGraph initialized successfully");
        print_text(self.render, "VoltGraph ready").await;
    }

    /// Run the main supervisor loop
    pub async fn run(&mut self) {
        info!("Application supervisor started");

        loop {
            Timer::after(Duration::from_secs(UPTIME_STEP_SECS as u64)).await;
            self.uptime_seconds += UPTIME_STEP_SECS;

            if self.uptime_seconds - self.last_heartbeat >= STATUS_INTERVAL_SECS {
                self.report_status().await;
                self.last_heartbeat = self.uptime_seconds;
            }
        }
    }

    /// Log the counters and show the uptime on the status row
    async fn report_status(&self) {
        let snapshot = self.stats.snapshot();
        info!(
            "Status: reads={} samples={} frames={} lines={}",
            snapshot.reads_requested,
            snapshot.samples_forwarded,
            snapshot.frames_drawn,
            snapshot.lines_printed
        );

        let line = self.uptime_text::<TEXT_PAYLOAD_LEN>();
        info!("Status: {}", line.as_str());
        print_text(self.render, &line).await;
    }

    /// Uptime line for an `N`-byte row. A line that does not fit is fatal.
    fn uptime_text<const N: usize>(&self) -> String<N> {
        match self.uptime_line() {
            Ok(line) => line,
            Err(fault) => halt(fault),
        }
    }

    fn uptime_line<const N: usize>(&self) -> Result<String<N>, Fault> {
        let minutes = self.uptime_seconds / 60;
        let hours = minutes / 60;

        let mut line = String::new();
        let written = if hours > 0 {
            write!(line, "Uptime {}h{:02}m", hours, minutes % 60)
        } else {
            write!(line, "Uptime {}m", minutes)
        };
        written.map_err(|_| Fault::OversizePayload {
            len: N + 1,
            capacity: N,
        })?;
        Ok(line)
    }
}

/// Heartbeat pattern: short blink every second
pub async fn run_status_led<P: OutputPin>(mut led: P) {
    info!("Status LED task started");

    loop {
        let _ = led.set_high();
        Timer::after(Duration::from_millis(100)).await;
        let _ = led.set_low();
        Timer::after(Duration::from_millis(900)).await;
    }
}
