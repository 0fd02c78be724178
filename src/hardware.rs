//! Hardware abstraction and initialization
//!
//! Pin and peripheral bring-up for the Pico board, plus the executor task
//! wrappers that bind the generic run loops to concrete RP2040 types.

use embassy_executor::{SendSpawner, SpawnError, Spawner};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, SPI0};
use embassy_rp::spi::{self, Spi};
use embassy_rp::Peripherals;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};

use crate::bus::run_bus_service;
use crate::channels::{BUS_QUEUE, RENDER_QUEUE, SAMPLER_QUEUE};
use crate::config::*;
use crate::display::DisplayController;
use crate::fatal::{halt, Fault};
use crate::render::{run_renderer, GraphLayout, RenderContext};
use crate::sampler::{run_sampler, SamplerConfig, SamplerContext};
use crate::stats::PipelineStats;
use crate::supervisor::{run_status_led, AppSupervisor};
use crate::timer::run_ticker;
use crate::types::{RenderMessage, SamplerMessage};
use crate::Irqs;

pub type SensorBus = I2c<'static, I2C0, i2c::Async>;
pub type PanelSpi = ExclusiveDevice<Spi<'static, SPI0, spi::Blocking>, Output<'static>, NoDelay>;
pub type Panel = DisplayController<PanelSpi, Output<'static>, Output<'static>>;

/// Display controller plus the backlight line it needs held on
pub struct DisplayParts {
    pub panel: Panel,
    pub backlight: Output<'static>,
}

/// Everything the tasks need, split out of `Peripherals`
pub struct Board {
    pub sensor_bus: SensorBus,
    pub display: DisplayParts,
    pub status_led: Output<'static>,
}

impl Board {
    /// Claim the board's pins. Pin numbers match the constants in `config`.
    pub fn new(p: Peripherals) -> Self {
        info!(
            "I2C0: SDA=GP{} SCL=GP{} @ {} Hz",
            I2C_SDA_PIN, I2C_SCL_PIN, I2C_FREQUENCY_HZ
        );
        let mut i2c_config = i2c::Config::default();
        i2c_config.frequency = I2C_FREQUENCY_HZ;
        let sensor_bus = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config);

        info!(
            "SPI0: SCK=GP{} MOSI=GP{} CS=GP{} DC=GP{} RST=GP{}",
            SPI_SCK_PIN, SPI_MOSI_PIN, DISPLAY_CS_PIN, DISPLAY_DC_PIN, DISPLAY_RST_PIN
        );
        let mut spi_config = spi::Config::default();
        spi_config.frequency = SPI_BAUDRATE;
        spi_config.phase = spi::Phase::CaptureOnFirstTransition;
        spi_config.polarity = spi::Polarity::IdleLow;
        let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
        let cs = Output::new(p.PIN_8, Level::High);
        let spi = ExclusiveDevice::new_no_delay(spi, cs).unwrap_or_else(|never| match never {});

        let panel = DisplayController::new(
            spi,
            Output::new(p.PIN_14, Level::Low),
            Output::new(p.PIN_15, Level::High),
        );

        Self {
            sensor_bus,
            display: DisplayParts {
                panel,
                backlight: Output::new(p.PIN_17, Level::High),
            },
            status_led: Output::new(p.PIN_25, Level::Low),
        }
    }
}

// ===================================================================
// Sampling Side (high priority executor)
// ===================================================================

#[embassy_executor::task]
pub async fn bus_task(i2c: SensorBus) {
    run_bus_service(i2c, &BUS_QUEUE, SAMPLER_QUEUE.sender()).await
}

#[embassy_executor::task]
pub async fn sampler_task(stats: &'static PipelineStats) {
    let ctx = SamplerContext {
        inbox: &SAMPLER_QUEUE,
        bus: BUS_QUEUE.sender(),
        render: RENDER_QUEUE.sender(),
        stats,
    };
    run_sampler(SamplerConfig::voltage_sensor(), ctx).await
}

/// Spawn the bus service and the sampling task on the preempting executor
pub fn spawn_sampling_tasks(
    spawner: SendSpawner,
    sensor_bus: SensorBus,
    stats: &'static PipelineStats,
) -> Result<(), SpawnError> {
    spawner.spawn(bus_task(sensor_bus))?;
    spawner.spawn(sampler_task(stats))?;
    Ok(())
}

// ===================================================================
// Display Side (thread mode executor)
// ===================================================================

#[embassy_executor::task]
pub async fn render_task(display: DisplayParts, stats: &'static PipelineStats) {
    let DisplayParts {
        mut panel,
        backlight: _backlight,
    } = display;

    if let Err(e) = panel.init().await {
        error!("Display init failed: {:?}", e);
        halt(Fault::Display);
    }

    let ctx = RenderContext {
        inbox: &RENDER_QUEUE,
        stats,
    };
    run_renderer(panel, GraphLayout::strip_chart(), ctx).await
}

#[embassy_executor::task]
pub async fn sample_timer_task() {
    run_ticker("sampler", SAMPLER_QUEUE.sender(), SAMPLE_PERIOD, |ticks_elapsed| {
        SamplerMessage::Timer { ticks_elapsed }
    })
    .await
}

#[embassy_executor::task]
pub async fn redraw_timer_task() {
    run_ticker("render", RENDER_QUEUE.sender(), REDRAW_PERIOD, |ticks_elapsed| {
        RenderMessage::Timer { ticks_elapsed }
    })
    .await
}

/// Status LED task implementation
#[embassy_executor::task]
pub async fn status_task(status_led: Output<'static>) {
    run_status_led(status_led).await
}

#[embassy_executor::task]
pub async fn supervisor_task(mut supervisor: AppSupervisor<'static>) {
    supervisor.print_init_success().await;
    supervisor.run().await;
}

/// Spawn rendering, timers and monitoring on the thread-mode executor
pub fn spawn_display_tasks(
    spawner: Spawner,
    display: DisplayParts,
    status_led: Output<'static>,
    supervisor: AppSupervisor<'static>,
    stats: &'static PipelineStats,
) -> Result<(), SpawnError> {
    spawner.spawn(render_task(display, stats))?;
    spawner.spawn(sample_timer_task())?;
    spawner.spawn(redraw_timer_task())?;
    spawner.spawn(status_task(status_led))?;
    spawner.spawn(supervisor_task(supervisor))?;
    Ok(())
}
