//! Strip-chart rendering task
//!
//! The renderer owns the [`GraphBuffer`] and the display. Graph samples are
//! scaled into plot coordinates as they arrive; each redraw tick clears the
//! plot and draws the history right to left, newest sample at the right edge.

use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

use crate::channels::{RenderQueue, RenderSender};
use crate::color::hsl_to_rgb565;
use crate::config::*;
use crate::fatal::{halt, Fault};
use crate::graph::{scale_sample, GraphBuffer};
use crate::stats::PipelineStats;
use crate::types::RenderMessage;

// ===================================================================
// Layout
// ===================================================================

/// Where everything sits on the panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphLayout {
    /// Region cleared on every redraw
    pub plot: Rectangle,
    /// x of the newest sample
    pub right_edge: i32,
    /// Pixels between consecutive samples
    pub spacing: i32,
    /// y of a zero reading; also the scale factor
    pub full_scale: u8,
    pub status_row: Rectangle,
    pub voltage_caption: Point,
    pub background: Rgb565,
    pub text_color: Rgb565,
}

impl GraphLayout {
    pub const fn strip_chart() -> Self {
        Self {
            plot: Rectangle::new(
                Point::new(PLOT_LEFT, PLOT_TOP),
                Size::new(PLOT_WIDTH, PLOT_HEIGHT),
            ),
            right_edge: GRAPH_RIGHT_EDGE,
            spacing: GRAPH_POINT_SPACING,
            full_scale: GRAPH_FULL_SCALE,
            status_row: Rectangle::new(
                Point::new(STATUS_ROW_LEFT, TEXT_ROW_TOP),
                Size::new(STATUS_ROW_WIDTH, CHAR_HEIGHT as u32),
            ),
            voltage_caption: Point::new(VOLTAGE_CAPTION_X, TEXT_ROW_TOP),
            background: Rgb565::BLACK,
            text_color: Rgb565::RED,
        }
    }

    /// Trace colour for a plotted y-coordinate
    fn trace_color(&self, y: u8) -> Rgb565 {
        let hue = TRACE_HUE_SPAN * y as f32 / self.full_scale as f32;
        hsl_to_rgb565(hue, 1.0, 0.5)
    }
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self::strip_chart()
    }
}

// ===================================================================
// Renderer
// ===================================================================

pub struct Renderer<D> {
    display: D,
    layout: GraphLayout,
    graph: GraphBuffer<GRAPH_CAPACITY>,
}

impl<D> Renderer<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(display: D, layout: GraphLayout) -> Self {
        Self {
            display,
            layout,
            graph: GraphBuffer::new(),
        }
    }

    pub fn graph(&self) -> &GraphBuffer<GRAPH_CAPACITY> {
        &self.graph
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Clear the panel and draw the axis captions.
    pub fn init(&mut self) -> Result<(), Fault> {
        self.display
            .clear(self.layout.background)
            .map_err(|_| Fault::Display)?;

        let style = MonoTextStyle::new(&FONT_5X8, self.layout.text_color);

        // Vertical caption, one glyph per text row
        for (row, (offset, glyph)) in TIME_CAPTION.char_indices().enumerate() {
            let glyph = &TIME_CAPTION[offset..offset + glyph.len_utf8()];
            let origin = Point::new(0, self.layout.plot.top_left.y + row as i32 * CHAR_HEIGHT);
            Text::with_baseline(glyph, origin, style, Baseline::Top)
                .draw(&mut self.display)
                .map_err(|_| Fault::Display)?;
        }

        Text::with_baseline(
            VOLTAGE_CAPTION,
            self.layout.voltage_caption,
            style,
            Baseline::Top,
        )
        .draw(&mut self.display)
        .map_err(|_| Fault::Display)?;

        Ok(())
    }

    pub fn handle(&mut self, msg: RenderMessage) -> Result<(), Fault> {
        match msg {
            RenderMessage::Timer { .. } => self.redraw(),
            RenderMessage::GraphSample(samples) => {
                for &raw in samples.iter() {
                    self.graph.push(scale_sample(raw, self.layout.full_scale));
                }
                Ok(())
            }
            RenderMessage::PrintText(text) => self.print(&text),
        }
    }

    fn redraw(&mut self) -> Result<(), Fault> {
        self.display
            .fill_solid(&self.layout.plot, self.layout.background)
            .map_err(|_| Fault::Display)?;

        for (age, y) in self.graph.iter_newest_first().enumerate() {
            let x = self.layout.right_edge - age as i32 * self.layout.spacing;
            let block = Rectangle::new(Point::new(x - 1, y as i32 - 1), Size::new(2, 2));
            self.display
                .fill_solid(&block, self.layout.trace_color(y))
                .map_err(|_| Fault::Display)?;
        }

        Ok(())
    }

    fn print(&mut self, bytes: &[u8]) -> Result<(), Fault> {
        // Draw whatever prefix is valid text
        let text = match core::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => core::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default(),
        };

        self.display
            .fill_solid(&self.layout.status_row, self.layout.background)
            .map_err(|_| Fault::Display)?;

        let style = MonoTextStyle::new(&FONT_5X8, self.layout.text_color);
        Text::with_baseline(text, self.layout.status_row.top_left, style, Baseline::Top)
            .draw(&mut self.display)
            .map_err(|_| Fault::Display)?;

        Ok(())
    }
}

// ===================================================================
// Rendering Task
// ===================================================================

pub struct RenderContext<'a> {
    pub inbox: &'a RenderQueue,
    pub stats: &'a PipelineStats,
}

/// Rendering task run loop
pub async fn run_renderer<D>(display: D, layout: GraphLayout, ctx: RenderContext<'_>)
where
    D: DrawTarget<Color = Rgb565>,
{
    info!("Render task started");

    let mut renderer = Renderer::new(display, layout);
    if let Err(fault) = renderer.init() {
        halt(fault);
    }

    loop {
        let msg = ctx.inbox.recv().await;
        trace!("Render message type {}", msg.type_code());

        let is_tick = matches!(msg, RenderMessage::Timer { .. });
        let is_text = matches!(msg, RenderMessage::PrintText(_));

        if let Err(fault) = renderer.handle(msg) {
            halt(fault);
        }

        if is_tick {
            ctx.stats.record_frame();
        } else if is_text {
            ctx.stats.record_line();
        }
    }
}

/// Queue `text` for the status row, waiting for room.
///
/// Text longer than the payload limit is fatal.
pub async fn print_text(render: RenderSender<'_>, text: &str) {
    let msg = match RenderMessage::print(text) {
        Ok(msg) => msg,
        Err(fault) => halt(fault),
    };

    render.send_forever(msg).await;
}
