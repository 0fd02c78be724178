//! Display driver for the 320x240 RGB565 SPI TFT
//!
//! Raw MIPI DCS driver for ILI9341-class panels. The controller implements
//! [`DrawTarget`], so the renderer draws through `embedded-graphics` without
//! knowing which panel is attached.

use embassy_time::{Duration, Timer};
use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::config::*;

/// Pixels staged per SPI write
const CHUNK_PIXELS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    Spi,
    Pin,
}

// ===================================================================
// Display Controller Structure
// ===================================================================

pub struct DisplayController<SPI, DC, RST> {
    spi: SPI,
    dc: DC,
    rst: RST,
}

impl<SPI, DC, RST> DisplayController<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// `spi` owns chip select; `dc` selects command or data bytes.
    pub fn new(spi: SPI, dc: DC, rst: RST) -> Self {
        Self { spi, dc, rst }
    }

    /// Hardware reset and power-up sequence. Leaves the panel on, in
    /// landscape, accepting RGB565.
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        info!("Initializing display ({}x{})", DISPLAY_WIDTH, DISPLAY_HEIGHT);

        self.rst.set_low().map_err(|_| DisplayError::Pin)?;
        Timer::after(Duration::from_millis(10)).await;
        self.rst.set_high().map_err(|_| DisplayError::Pin)?;
        Timer::after(Duration::from_millis(120)).await;

        self.send_command(PANEL_SWRESET)?;
        Timer::after(Duration::from_millis(150)).await;

        self.send_command(PANEL_SLPOUT)?;
        Timer::after(Duration::from_millis(120)).await;

        self.send_command(PANEL_COLMOD)?;
        self.send_data(&[PANEL_COLOR_MODE_16BIT])?;

        self.send_command(PANEL_MADCTL)?;
        self.send_data(&[PANEL_MADCTL_LANDSCAPE])?;

        self.send_command(PANEL_INVOFF)?;
        self.send_command(PANEL_NORON)?;

        self.send_command(PANEL_DISPON)?;
        Timer::after(Duration::from_millis(10)).await;

        info!("Display initialization complete");
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::Pin)?;
        self.spi.write(&[command]).map_err(|_| DisplayError::Spi)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::Pin)?;
        self.spi.write(data).map_err(|_| DisplayError::Spi)
    }

    /// Address `area` (already clipped to the panel) and start a memory write.
    fn set_window(&mut self, area: &Rectangle) -> Result<(), DisplayError> {
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let [x0_hi, x0_lo] = (area.top_left.x as u16).to_be_bytes();
        let [x1_hi, x1_lo] = (bottom_right.x as u16).to_be_bytes();
        let [y0_hi, y0_lo] = (area.top_left.y as u16).to_be_bytes();
        let [y1_hi, y1_lo] = (bottom_right.y as u16).to_be_bytes();

        self.send_command(PANEL_CASET)?;
        self.send_data(&[x0_hi, x0_lo, x1_hi, x1_lo])?;

        self.send_command(PANEL_RASET)?;
        self.send_data(&[y0_hi, y0_lo, y1_hi, y1_lo])?;

        self.send_command(PANEL_RAMWR)
    }

    /// Stream colours into the current window, batched per SPI write.
    fn write_pixels(&mut self, colors: impl IntoIterator<Item = Rgb565>) -> Result<(), DisplayError> {
        let mut buffer = [0u8; CHUNK_PIXELS * 2];
        let mut staged = 0;

        self.dc.set_high().map_err(|_| DisplayError::Pin)?;
        for color in colors {
            let [hi, lo] = color.into_storage().to_be_bytes();
            buffer[staged * 2] = hi;
            buffer[staged * 2 + 1] = lo;
            staged += 1;

            if staged == CHUNK_PIXELS {
                self.spi.write(&buffer).map_err(|_| DisplayError::Spi)?;
                staged = 0;
            }
        }
        if staged > 0 {
            self.spi
                .write(&buffer[..staged * 2])
                .map_err(|_| DisplayError::Spi)?;
        }
        Ok(())
    }
}

impl<SPI, DC, RST> OriginDimensions for DisplayController<SPI, DC, RST> {
    fn size(&self) -> Size {
        Size::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}

impl<SPI, DC, RST> DrawTarget for DisplayController<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if !bounds.contains(point) {
                continue;
            }
            self.set_window(&Rectangle::new(point, Size::new(1, 1)))?;
            self.write_pixels([color])?;
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let clipped = area.intersection(&self.bounding_box());
        if clipped.is_zero_sized() {
            return Ok(());
        }

        if clipped == *area {
            self.set_window(area)?;
            let count = area.size.width as usize * area.size.height as usize;
            self.write_pixels(colors.into_iter().take(count))
        } else {
            // Partly off-panel: fall back to per-pixel writes
            self.draw_iter(
                area.points()
                    .zip(colors)
                    .map(|(point, color)| Pixel(point, color)),
            )
        }
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        if clipped.is_zero_sized() {
            return Ok(());
        }

        self.set_window(&clipped)?;
        let count = clipped.size.width as usize * clipped.size.height as usize;
        self.write_pixels(core::iter::repeat(color).take(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::spi::{ErrorType as SpiErrorType, Operation};
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Wire {
        Command(u8),
        Data(Vec<u8>),
        Reset(bool),
    }

    /// Shared log of everything that reaches the panel
    #[derive(Clone, Default)]
    struct Log {
        events: Rc<RefCell<Vec<Wire>>>,
        dc_high: Rc<RefCell<bool>>,
    }

    impl Log {
        fn take(&self) -> Vec<Wire> {
            self.events.borrow_mut().drain(..).collect()
        }
    }

    struct FakeSpi(Log);
    struct FakeDc(Log);
    struct FakeRst(Log);

    impl SpiErrorType for FakeSpi {
        type Error = Infallible;
    }

    impl SpiDevice for FakeSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    let event = if *self.0.dc_high.borrow() {
                        Wire::Data(bytes.to_vec())
                    } else {
                        Wire::Command(bytes[0])
                    };
                    self.0.events.borrow_mut().push(event);
                }
            }
            Ok(())
        }
    }

    impl PinErrorType for FakeDc {
        type Error = Infallible;
    }

    impl OutputPin for FakeDc {
        fn set_low(&mut self) -> Result<(), Infallible> {
            *self.0.dc_high.borrow_mut() = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            *self.0.dc_high.borrow_mut() = true;
            Ok(())
        }
    }

    impl PinErrorType for FakeRst {
        type Error = Infallible;
    }

    impl OutputPin for FakeRst {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.events.borrow_mut().push(Wire::Reset(false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.events.borrow_mut().push(Wire::Reset(true));
            Ok(())
        }
    }

    fn controller() -> (DisplayController<FakeSpi, FakeDc, FakeRst>, Log) {
        let log = Log::default();
        let controller = DisplayController::new(
            FakeSpi(log.clone()),
            FakeDc(log.clone()),
            FakeRst(log.clone()),
        );
        (controller, log)
    }

    #[test]
    fn init_sends_power_up_sequence() {
        let (mut display, log) = controller();
        block_on(display.init()).unwrap();

        assert_eq!(
            log.take(),
            [
                Wire::Reset(false),
                Wire::Reset(true),
                Wire::Command(PANEL_SWRESET),
                Wire::Command(PANEL_SLPOUT),
                Wire::Command(PANEL_COLMOD),
                Wire::Data(vec![PANEL_COLOR_MODE_16BIT]),
                Wire::Command(PANEL_MADCTL),
                Wire::Data(vec![PANEL_MADCTL_LANDSCAPE]),
                Wire::Command(PANEL_INVOFF),
                Wire::Command(PANEL_NORON),
                Wire::Command(PANEL_DISPON),
            ]
        );
    }

    #[test]
    fn fill_solid_addresses_window_then_streams_pixels() {
        let (mut display, log) = controller();
        let area = Rectangle::new(Point::new(300, 10), Size::new(2, 2));

        display.fill_solid(&area, Rgb565::RED).unwrap();

        assert_eq!(
            log.take(),
            [
                Wire::Command(PANEL_CASET),
                Wire::Data(vec![0x01, 0x2C, 0x01, 0x2D]),
                Wire::Command(PANEL_RASET),
                Wire::Data(vec![0x00, 0x0A, 0x00, 0x0B]),
                Wire::Command(PANEL_RAMWR),
                Wire::Data(vec![0xF8, 0x00, 0xF8, 0x00, 0xF8, 0x00, 0xF8, 0x00]),
            ]
        );
    }

    #[test]
    fn large_fills_are_chunked() {
        let (mut display, log) = controller();
        let area = Rectangle::new(Point::zero(), Size::new(40, 1));

        display.fill_solid(&area, Rgb565::BLACK).unwrap();

        let pixel_writes: Vec<usize> = log
            .take()
            .into_iter()
            .skip(5)
            .map(|event| match event {
                Wire::Data(bytes) => bytes.len(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(pixel_writes, [CHUNK_PIXELS * 2, (40 - CHUNK_PIXELS) * 2]);
    }

    #[test]
    fn off_panel_drawing_is_clipped() {
        let (mut display, log) = controller();

        display
            .fill_solid(&Rectangle::new(Point::new(400, 0), Size::new(4, 4)), Rgb565::RED)
            .unwrap();
        display
            .draw_iter([Pixel(Point::new(-1, 5), Rgb565::RED)])
            .unwrap();
        assert!(log.take().is_empty());

        // Straddling the right edge keeps only the on-panel column
        display
            .fill_solid(&Rectangle::new(Point::new(319, 0), Size::new(4, 1)), Rgb565::RED)
            .unwrap();
        assert_eq!(log.take()[1], Wire::Data(vec![0x01, 0x3F, 0x01, 0x3F]));
    }
}
