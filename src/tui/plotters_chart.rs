//! Plotters-powered kinetics chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Series colors, shared with the legend drawn next to the chart.
pub const ZERO_ORDER_COLOR: Color = Color::Cyan;
pub const FIRST_ORDER_COLOR: Color = Color::Magenta;

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct KineticsChart<'a> {
    /// Observed `(time, quantity)` points, input order.
    pub points: &'a [(f64, f64)],
    /// Zero-order fitted curve.
    pub zero_order: &'a [(f64, f64)],
    /// First-order fitted curve, back-transformed to quantity units.
    pub first_order: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl Widget for KineticsChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let zero_color = RGBColor(0, 255, 255); // cyan
            let first_color = RGBColor(255, 0, 255); // magenta

            chart.draw_series(LineSeries::new(self.zero_order.iter().copied(), &zero_color))?;
            chart.draw_series(LineSeries::new(self.first_order.iter().copied(), &first_color))?;

            // `Circle` radii are mapped incorrectly by the ratatui backend
            // (pixel radius -> normalized canvas units); a `Pixel` gives a clean dot.
            chart.draw_series(self.points.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
