//! Ratatui-based terminal UI.
//!
//! The TUI shows a branch selector next to the per-product table and a chart
//! of monthly units with the fitted trend. Changing the branch or a policy
//! re-runs the pipeline over the already-loaded table.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table},
    Terminal,
};

use crate::app::pipeline::{run_analysis, AnalysisOutput};
use crate::domain::{AnalysisConfig, BranchSelection};
use crate::error::AppError;
use crate::io::ingest::{load_sales_csv, SalesTable};

mod plotters_chart;

use plotters_chart::SalesPlottersChart;

/// Start the TUI on an already-resolved CSV path.
pub fn run(csv_path: PathBuf, config: AnalysisConfig) -> Result<(), AppError> {
    // Load before touching the terminal so schema errors print normally.
    let table = load_sales_csv(&csv_path)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(csv_path, table, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
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

struct App {
    csv_path: PathBuf,
    table: SalesTable,
    config: AnalysisConfig,
    /// `All` followed by every branch in the file.
    branch_options: Vec<String>,
    selected_branch: usize,
    status: String,
    run: AnalysisOutput,
}

impl App {
    fn new(csv_path: PathBuf, table: SalesTable, mut config: AnalysisConfig) -> Self {
        let branch_options = table.branch_options();
        let mut status = format!("Loaded {} row(s).", table.rows_read);

        let selected_branch = match table.branch_index(&config.branch) {
            Some(idx) => idx,
            None => {
                status = format!("Branch '{}' not in file; showing All.", config.branch.label());
                config.branch = BranchSelection::All;
                0
            }
        };

        let run = run_analysis(&table, &config);
        Self {
            csv_path,
            table,
            config,
            branch_options,
            selected_branch,
            status,
            run,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
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

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected_branch > 0 {
                    self.select_branch(self.selected_branch - 1);
                }
            }
            KeyCode::Down => {
                if self.selected_branch + 1 < self.branch_options.len() {
                    self.select_branch(self.selected_branch + 1);
                }
            }
            KeyCode::Char('a') => {
                self.config.average = self.config.average.toggle();
                self.recompute();
                self.status = format!("average: {}", self.config.average.display_name());
            }
            KeyCode::Char('p') => {
                self.config.invalid_period = self.config.invalid_period.toggle();
                self.recompute();
                self.status = format!("invalid period: {}", self.config.invalid_period.display_name());
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn select_branch(&mut self, idx: usize) {
        self.selected_branch = idx;
        self.config.branch = self.table.branch_selection(idx);
        self.recompute();
        self.status = format!("branch: {}", self.config.branch.label());
    }

    /// Re-read the file from disk, keeping the current selection when possible.
    fn reload(&mut self) {
        match load_sales_csv(&self.csv_path) {
            Ok(table) => {
                self.branch_options = table.branch_options();
                self.table = table;
                match self.table.branch_index(&self.config.branch) {
                    Some(idx) => self.selected_branch = idx,
                    None => {
                        self.selected_branch = 0;
                        self.config.branch = BranchSelection::All;
                    }
                }
                self.recompute();
                self.status = format!("Reloaded {} row(s).", self.table.rows_read);
            }
            Err(err) => {
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    fn recompute(&mut self) {
        self.run = run_analysis(&self.table, &self.config);
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("sales", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {}", self.csv_path.display())),
        ]));

        let trend = match &self.run.trend {
            Some(t) => format!("slope={:.2} intercept={:.2}", t.slope, t.intercept),
            None => "trend: n/a".to_string(),
        };
        lines.push(Line::from(Span::styled(
            format!(
                "branch: {} | average: {} | invalid period: {} | rows={} | {trend}",
                self.config.branch.label(),
                self.config.average.display_name(),
                self.config.invalid_period.display_name(),
                self.run.rows_selected,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(0)])
            .split(area);

        self.draw_branches(frame, columns[0]);

        // Table height follows the product count, leaving the rest to the chart.
        let table_height = (self.run.products.len() as u16 + 3).min(columns[1].height / 2).max(4);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(table_height), Constraint::Min(0)])
            .split(columns[1]);

        self.draw_products(frame, right[0]);
        self.draw_chart(frame, right[1]);
    }

    fn draw_branches(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .branch_options
            .iter()
            .map(|b| ListItem::new(b.as_str()))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Branch").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_branch));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_products(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Products").borders(Borders::ALL);
        if self.run.products.is_empty() {
            let msg = Paragraph::new("No rows for this selection.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let header = Row::new(vec!["Product", "Avg unit price", "Avg margin", "Units sold"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = self.run.products.iter().map(|m| {
            Row::new(vec![
                Cell::from(m.product.clone()),
                Cell::from(fmt_cell(m.average_unit_price, |v| format!("{v:.2}"))),
                Cell::from(fmt_cell(m.average_margin, |v| format!("{:.2}%", v * 100.0))),
                Cell::from(format!("{:.0}", m.total_units_sold)),
            ])
        });

        let widths = [
            Constraint::Min(12),
            Constraint::Length(15),
            Constraint::Length(11),
            Constraint::Length(11),
        ];
        let table = Table::new(rows, widths).header(header).block(block);
        frame.render_widget(table, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Units per month").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = chart_series(&self.run) else {
            let msg = Paragraph::new("No dated rows to chart.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = SalesPlottersChart {
            observed: &series.observed,
            trend: &series.trend,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "month",
            y_label: "units",
            fmt_x: fmt_month_ordinal,
            fmt_y: fmt_units,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, series.x_bounds, series.y_bounds);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ branch  a average  p invalid period  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn fmt_cell(value: Option<f64>, f: impl Fn(f64) -> String) -> String {
    value.map(f).unwrap_or_else(|| "NaN".to_string())
}

struct ChartSeries {
    observed: Vec<(f64, f64)>,
    trend: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series for Plotters; `None` when there is nothing to draw.
fn chart_series(run: &AnalysisOutput) -> Option<ChartSeries> {
    let first = run.monthly.first()?;
    let last = run.monthly.last()?;

    let observed: Vec<(f64, f64)> = run.monthly.iter().map(|p| (p.ordinal(), p.units_sold)).collect();
    let trend: Vec<(f64, f64)> = match &run.trend {
        Some(t) => run
            .monthly
            .iter()
            .enumerate()
            .map(|(i, p)| (p.ordinal(), t.predict(i)))
            .collect(),
        None => Vec::new(),
    };

    let (mut x0, mut x1) = (first.ordinal(), last.ordinal());
    if x1 <= x0 {
        x0 -= 1.0;
        x1 += 1.0;
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in observed.iter().chain(&trend) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    Some(ChartSeries {
        observed,
        trend,
        x_bounds: [x0, x1],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

/// Inverse of `MonthlyPoint::ordinal`, formatted `YYYY-MM`.
fn fmt_month_ordinal(v: f64) -> String {
    let ordinal = v.round() as i64;
    let year = ordinal.div_euclid(12);
    let month = ordinal.rem_euclid(12) + 1;
    format!("{year:04}-{month:02}")
}

fn fmt_units(v: f64) -> String {
    format!("{v:.0}")
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
        right: 4,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
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
    let style = Style::default().fg(Color::Gray);

    // Month labels are wide; fewer ticks on narrow charts.
    let x_ticks = if chart.width >= 48 { 5usize } else { 3 };
    for i in 0..x_ticks {
        let u = i as f64 / (x_ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_month_ordinal(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let y_ticks = 5usize;
    for i in 0..y_ticks {
        let u = i as f64 / (y_ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_units(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("month")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("units")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
