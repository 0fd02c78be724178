//! Hardware and pipeline configuration for VoltGraph
//! RP2040-based voltage sampler with a 320x240 strip-chart display

use embassy_time::Duration;

// ===================================================================
// Message Queues
// ===================================================================

pub const QUEUE_DEPTH: usize = 10; // Records per task inbox
pub const SENSOR_PAYLOAD_LEN: usize = 8; // Sensor/graph payload limit
pub const TEXT_PAYLOAD_LEN: usize = 20; // Display text payload limit
pub const BUS_COMMAND_LEN: usize = 4; // Longest command written to a bus device

// ===================================================================
// Sensor (I2C) Configuration
// ===================================================================

pub const SENSOR_I2C_ADDRESS: u8 = 0x4F;
pub const SENSOR_INIT_COMMAND: [u8; 2] = [0xAC, 0x00]; // Configuration write, no response
pub const SENSOR_READ_COMMAND: [u8; 1] = [0xAA]; // Returns a block of conversions
pub const SENSOR_READ_LEN: usize = 8; // Bytes returned per read transaction
pub const I2C_FREQUENCY_HZ: u32 = 100_000; // Standard mode

// ===================================================================
// Timer Sources
// ===================================================================

pub const SAMPLE_PERIOD_MS: u64 = 100; // Sampler timer period
pub const REDRAW_PERIOD_MS: u64 = 250; // Renderer timer period

pub const SAMPLE_PERIOD: Duration = Duration::from_millis(SAMPLE_PERIOD_MS);
pub const REDRAW_PERIOD: Duration = Duration::from_millis(REDRAW_PERIOD_MS);

// ===================================================================
// Display Geometry
// ===================================================================

pub const DISPLAY_WIDTH: u32 = 320;
pub const DISPLAY_HEIGHT: u32 = 240;

// Plot window cleared on every redraw: x 6..320, y 0..232
pub const PLOT_LEFT: i32 = 6;
pub const PLOT_TOP: i32 = 0;
pub const PLOT_WIDTH: u32 = 314;
pub const PLOT_HEIGHT: u32 = 232;

// Text layout, 5x8 font
pub const CHAR_HEIGHT: i32 = 8;
pub const TIME_CAPTION: &str = "Time s"; // One glyph per row down the left margin
pub const VOLTAGE_CAPTION: &str = "Voltage(V)";
pub const VOLTAGE_CAPTION_X: i32 = 160;
pub const TEXT_ROW_TOP: i32 = PLOT_TOP + PLOT_HEIGHT as i32; // Bottom line, below the plot
pub const STATUS_ROW_LEFT: i32 = PLOT_LEFT;
pub const STATUS_ROW_WIDTH: u32 = 150; // Up to the voltage caption

// ===================================================================
// Graph Model
// ===================================================================

pub const GRAPH_CAPACITY: usize = 157; // Samples kept for the strip chart
pub const GRAPH_FULL_SCALE: u8 = 230; // Bottom of the trace, also the scale factor K
pub const GRAPH_POINT_SPACING: i32 = 2; // Pixels between consecutive samples
pub const GRAPH_RIGHT_EDGE: i32 = DISPLAY_WIDTH as i32 - 1; // x of the newest sample
pub const TRACE_HUE_SPAN: f32 = 120.0; // Red at the top of the plot, green at the bottom

// ===================================================================
// GPIO Pin Assignments - Raspberry Pi Pico
// ===================================================================

// I2C0 sensor bus
pub const I2C_SDA_PIN: u8 = 4;
pub const I2C_SCL_PIN: u8 = 5;

// SPI Display Interface
pub const SPI_MOSI_PIN: u8 = 19; // Data to display
pub const SPI_SCK_PIN: u8 = 18; // Clock to display
pub const SPI_BAUDRATE: u32 = 16_000_000; // 16MHz SPI clock

// Display Control Pins
pub const DISPLAY_CS_PIN: u8 = 8; // Chip select
pub const DISPLAY_DC_PIN: u8 = 14; // Data/Command select
pub const DISPLAY_RST_PIN: u8 = 15; // Reset
pub const DISPLAY_BL_PIN: u8 = 17; // Backlight enable

// Status LED
pub const LED_STATUS_PIN: u8 = 25; // Built-in LED on Pico

// ===================================================================
// Panel Commands (MIPI DCS, shared by ST7735/ILI9341-class controllers)
// ===================================================================

pub const PANEL_SWRESET: u8 = 0x01; // Software reset
pub const PANEL_SLPOUT: u8 = 0x11; // Sleep out
pub const PANEL_NORON: u8 = 0x13; // Normal display mode
pub const PANEL_INVOFF: u8 = 0x20; // Display inversion off
pub const PANEL_DISPON: u8 = 0x29; // Display on
pub const PANEL_CASET: u8 = 0x2A; // Column address set
pub const PANEL_RASET: u8 = 0x2B; // Row address set
pub const PANEL_RAMWR: u8 = 0x2C; // Memory write
pub const PANEL_MADCTL: u8 = 0x36; // Memory access control
pub const PANEL_COLMOD: u8 = 0x3A; // Color mode

pub const PANEL_COLOR_MODE_16BIT: u8 = 0x55; // RGB565 on both interfaces
pub const PANEL_MADCTL_LANDSCAPE: u8 = 0x28; // Row/column exchange + BGR order
