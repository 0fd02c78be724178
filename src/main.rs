//! VoltGraph firmware entry point
//!
//! Hardware: Raspberry Pi Pico (RP2040)
//! Sensor: I2C voltage converter at 0x4F
//! Display: 320x240 SPI TFT, strip chart plus status row

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use panic_halt as _;
use defmt_rtt as _;
use static_cell::StaticCell;

use voltgraph::channels::RENDER_QUEUE;
use voltgraph::fatal::{halt, Fault};
use voltgraph::hardware::{self, Board};
use voltgraph::stats::PipelineStats;
use voltgraph::supervisor::AppSupervisor;

// ===================================================================
// Executors and Shared State
// ===================================================================

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

static STATS: PipelineStats = PipelineStats::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

// ===================================================================
// Main Application Entry Point
// ===================================================================

#[entry]
fn main() -> ! {
    let p = embassy_rp::init(Default::default());

    let supervisor = AppSupervisor::new(&STATS, RENDER_QUEUE.sender());
    supervisor.print_startup_banner();

    let Board {
        sensor_bus,
        display,
        status_led,
    } = Board::new(p);

    // Sampling side preempts everything in thread mode
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    if let Err(e) = hardware::spawn_sampling_tasks(high, sensor_bus, &STATS) {
        error!("Failed to spawn sampling tasks: {:?}", e);
        halt(Fault::Spawn);
    }
    info!("Sampling tasks running at P2");

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(move |spawner| {
        if let Err(e) =
            hardware::spawn_display_tasks(spawner, display, status_led, supervisor, &STATS)
        {
            error!("Failed to spawn display tasks: {:?}", e);
            halt(Fault::Spawn);
        }
    })
}
