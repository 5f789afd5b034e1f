//! Ratatui-based entry form.
//!
//! Twelve time/quantity rows on the left, the fitted chart on the right.
//! `Enter` fits both models; errors and warnings land in the status line.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::pipeline::{fit_options, run_fit_with_observations};
use crate::domain::{DemoConfig, ENTRY_ROWS, FitConfig, KineticsReport};
use crate::error::{AppError, EXIT_FIT, KineticsError};
use crate::fit::FitOptions;
use crate::io::ingest::parse_entry_pairs;
use crate::report::{PLOT_TITLE, X_LABEL, Y_LABEL, first_order_equation, legend_labels, zero_order_equation};

mod plotters_chart;

use plotters_chart::{FIRST_ORDER_COLOR, KineticsChart, ZERO_ORDER_COLOR};

/// Start the TUI.
pub fn run(config: &FitConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_FIT, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(fit_options(config));
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_FIT, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_FIT, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Time,
    Quantity,
}

struct App {
    options: FitOptions,
    rows: Vec<(String, String)>,
    selected_row: usize,
    selected_col: Column,
    status: String,
    status_level: StatusLevel,
    demo_seed: u64,
    report: Option<KineticsReport>,
}

impl App {
    fn new(options: FitOptions) -> Self {
        Self {
            options,
            rows: vec![(String::new(), String::new()); ENTRY_ROWS],
            selected_row: 0,
            selected_col: Column::Time,
            status: "Enter times and quantities, then press Enter to fit.".to_string(),
            status_level: StatusLevel::Info,
            demo_seed: DemoConfig::default().seed,
            report: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_FIT, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_FIT, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_FIT, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Up => self.selected_row = self.selected_row.saturating_sub(1),
            KeyCode::Down => self.selected_row = (self.selected_row + 1).min(ENTRY_ROWS - 1),
            KeyCode::Left => self.selected_col = Column::Time,
            KeyCode::Right => self.selected_col = Column::Quantity,
            KeyCode::Tab => self.next_cell(),
            KeyCode::BackTab => self.prev_cell(),
            KeyCode::Backspace => {
                self.current_cell().pop();
            }
            KeyCode::Delete => self.current_cell().clear(),
            KeyCode::Enter => self.fit(),
            KeyCode::F(2) => self.load_demo(),
            KeyCode::F(3) => self.clear(),
            KeyCode::Char(c) if !c.is_control() => self.current_cell().push(c),
            _ => {}
        }
        false
    }

    fn current_cell(&mut self) -> &mut String {
        let row = &mut self.rows[self.selected_row];
        match self.selected_col {
            Column::Time => &mut row.0,
            Column::Quantity => &mut row.1,
        }
    }

    fn next_cell(&mut self) {
        match self.selected_col {
            Column::Time => self.selected_col = Column::Quantity,
            Column::Quantity => {
                self.selected_col = Column::Time;
                self.selected_row = (self.selected_row + 1) % ENTRY_ROWS;
            }
        }
    }

    fn prev_cell(&mut self) {
        match self.selected_col {
            Column::Quantity => self.selected_col = Column::Time,
            Column::Time => {
                self.selected_col = Column::Quantity;
                self.selected_row = (self.selected_row + ENTRY_ROWS - 1) % ENTRY_ROWS;
            }
        }
    }

    fn set_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status_level = level;
        self.status = message.into();
    }

    fn fit(&mut self) {
        let result = parse_entry_pairs(&self.rows).and_then(|set| run_fit_with_observations(&set, &self.options));
        match result {
            Ok(report) => {
                info!("tui fit on {} observation(s)", report.observations.len());
                self.set_status(
                    StatusLevel::Info,
                    format!("Fitted {} observation(s).", report.observations.len()),
                );
                self.report = Some(report);
            }
            Err(err @ KineticsError::EmptyInput) => {
                self.report = None;
                self.set_status(StatusLevel::Warning, format!("No Data: {err}"));
            }
            Err(err) => {
                self.report = None;
                self.set_status(StatusLevel::Error, err.to_string());
            }
        }
    }

    fn load_demo(&mut self) {
        let config = DemoConfig {
            seed: self.demo_seed,
            scale: self.options.scale,
            ..DemoConfig::default()
        };
        self.demo_seed = self.demo_seed.wrapping_add(1);

        match crate::data::generate_profile(&config) {
            Ok(set) => {
                self.rows = vec![(String::new(), String::new()); ENTRY_ROWS];
                for (row, obs) in self.rows.iter_mut().zip(set.iter()) {
                    *row = (format!("{}", obs.time), format!("{:.2}", obs.quantity));
                }
                self.fit();
                if self.status_level == StatusLevel::Info {
                    self.status = format!("Loaded demo profile (seed {}). {}", config.seed, self.status);
                }
            }
            Err(err) => self.set_status(StatusLevel::Error, err.to_string()),
        }
    }

    fn clear(&mut self) {
        self.rows = vec![(String::new(), String::new()); ENTRY_ROWS];
        self.report = None;
        self.selected_row = 0;
        self.selected_col = Column::Time;
        self.set_status(StatusLevel::Info, "Cleared.");
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = vec![Line::from(vec![
            Span::styled("dissolve", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {PLOT_TITLE} | scale: {}", self.options.scale)),
        ])];

        if let Some(report) = &self.report {
            let [zero_label, first_label] = legend_labels(report);
            lines.push(Line::from(vec![
                Span::styled(format!("── {zero_label}"), Style::default().fg(ZERO_ORDER_COLOR)),
                Span::raw("   "),
                Span::styled(zero_order_equation(&report.zero_order), Style::default().fg(Color::Gray)),
            ]));
            lines.push(Line::from(vec![
                Span::styled(format!("── {first_label}"), Style::default().fg(FIRST_ORDER_COLOR)),
                Span::raw("   "),
                Span::styled(first_order_equation(&report.first_order), Style::default().fg(Color::Gray)),
            ]));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let header = Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD);
        let mut lines = vec![Line::from(vec![
            Span::styled(format!("{:>4} ", "#"), header),
            Span::styled(format!("{:<12} ", X_LABEL), header),
            Span::styled(format!("{:<12}", Y_LABEL), header),
        ])];

        for (i, (time, quantity)) in self.rows.iter().enumerate() {
            let marker = if i == self.selected_row { "»" } else { " " };
            lines.push(Line::from(vec![
                Span::raw(format!("{marker}{:>3} ", i + 1)),
                Span::styled(format!("{:<12}", cell_text(time)), self.cell_style(i, Column::Time)),
                Span::raw(" "),
                Span::styled(format!("{:<12}", cell_text(quantity)), self.cell_style(i, Column::Quantity)),
            ]));
        }

        let p = Paragraph::new(Text::from(lines)).block(Block::default().title("Data").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn cell_style(&self, row: usize, col: Column) -> Style {
        if row == self.selected_row && col == self.selected_col {
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default().add_modifier(Modifier::UNDERLINED)
        }
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(PLOT_TITLE).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(report) = &self.report else {
            let msg = Paragraph::new("No fit yet.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let series = chart_series(report);
        let (chart_rect, insets) = chart_layout(inner);
        let widget = KineticsChart {
            points: &series.points,
            zero_order: &series.zero_order,
            first_order: &series.first_order,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: X_LABEL,
            y_label: Y_LABEL,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, series.x_bounds, series.y_bounds);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ row  ←/→/Tab cell  Enter fit  F2 demo  F3 clear  Esc quit";
        let status_color = match self.status_level {
            StatusLevel::Info => Color::Green,
            StatusLevel::Warning => Color::Yellow,
            StatusLevel::Error => Color::Red,
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(status_color)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn cell_text(s: &str) -> &str {
    // Keep the column width fixed; long entries show their tail.
    let n = s.chars().count();
    if n <= 12 {
        return s;
    }
    let skip = s.char_indices().nth(n - 12).map(|(i, _)| i).unwrap_or(0);
    &s[skip..]
}

struct ChartSeries {
    points: Vec<(f64, f64)>,
    zero_order: Vec<(f64, f64)>,
    first_order: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for Plotters. Curves follow input order.
fn chart_series(report: &KineticsReport) -> ChartSeries {
    let times = report.observations.times();
    let points: Vec<(f64, f64)> = report.observations.iter().map(|o| (o.time, o.quantity)).collect();
    let zero_order: Vec<(f64, f64)> = times.iter().copied().zip(report.zero_order.predicted.iter().copied()).collect();
    let first_order: Vec<(f64, f64)> =
        times.iter().copied().zip(report.first_order.predicted.iter().copied()).collect();

    let x_bounds = padded_bounds(times.iter().copied());
    let y_bounds = padded_bounds(
        points
            .iter()
            .chain(&zero_order)
            .chain(&first_order)
            .map(|&(_, y)| y),
    );

    ChartSeries {
        points,
        zero_order,
        first_order,
        x_bounds,
        y_bounds,
    }
}

fn padded_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi <= lo {
        return [lo - 0.5, hi + 0.5];
    }
    let pad = ((hi - lo) * 0.05).max(1e-12);
    [lo - pad, hi + pad]
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format!("{x_val:.0}");
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format!("{y_val:.1}");
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        let x_label = Paragraph::new(X_LABEL).alignment(Alignment::Center).style(style);
        frame.render_widget(x_label, x_rect);
    }

    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(Paragraph::new(Y_LABEL).style(style.add_modifier(Modifier::BOLD)), y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_and_fitting_builds_a_report() {
        let mut app = App::new(FitOptions::default());
        for (t, q) in [("0", "0"), ("10", "30"), ("20", "52"), ("30", "66")] {
            type_text(&mut app, t);
            app.handle_key(key(KeyCode::Tab));
            type_text(&mut app, q);
            app.handle_key(key(KeyCode::Tab));
        }
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.status_level, StatusLevel::Info, "{}", app.status);
        let report = app.report.as_ref().unwrap();
        assert_eq!(report.observations.len(), 4);
    }

    #[test]
    fn empty_form_warns() {
        let mut app = App::new(FitOptions::default());
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.status_level, StatusLevel::Warning);
        assert!(app.status.starts_with("No Data"));
        assert!(app.report.is_none());
    }

    #[test]
    fn non_numeric_entry_is_an_error_status() {
        let mut app = App::new(FitOptions::default());
        type_text(&mut app, "5");
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "lots");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.status_level, StatusLevel::Error);
        assert!(app.status.contains("row 1"));
    }

    #[test]
    fn demo_fills_every_row() {
        let mut app = App::new(FitOptions::default());
        app.handle_key(key(KeyCode::F(2)));
        assert!(app.rows.iter().all(|(t, q)| !t.is_empty() && !q.is_empty()));
        assert!(app.report.is_some(), "{}", app.status);
    }

    #[test]
    fn escape_quits() {
        let mut app = App::new(FitOptions::default());
        assert!(app.handle_key(key(KeyCode::Esc)));
    }

    #[test]
    fn padded_bounds_handle_single_value() {
        assert_eq!(padded_bounds([3.0].into_iter()), [2.5, 3.5]);
        assert_eq!(padded_bounds(std::iter::empty()), [0.0, 1.0]);
    }
}
