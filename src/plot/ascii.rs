//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed monthly units: `o`
//! - trend line: `-`
//!
//! The x axis is calendar time, so missing months show up as gaps even though
//! the trend itself was fitted on position indices.

use crate::domain::{MonthlyPoint, ReportFile, TrendLine};

/// Render the monthly series with its trend.
pub fn render_ascii_plot(
    monthly: &[MonthlyPoint],
    trend: Option<&TrendLine>,
    width: usize,
    height: usize,
) -> String {
    let Some((first, last)) = monthly.first().zip(monthly.last()) else {
        return "Plot: no monthly data\n".to_string();
    };

    let width = width.max(10);
    let height = height.max(5);

    let observed: Vec<(f64, f64)> = monthly
        .iter()
        .map(|p| (p.ordinal(), p.units_sold))
        .collect();
    let fitted: Option<Vec<(f64, f64)>> = trend.map(|t| {
        monthly
            .iter()
            .enumerate()
            .map(|(i, p)| (p.ordinal(), t.predict(i)))
            .collect()
    });

    let (x_min, x_max) = expand_if_flat(first.ordinal(), last.ordinal());
    let (y_min, y_max) = y_range(&observed, fitted.as_deref());
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the trend first so observed points overlay it.
    if let Some(curve) = &fitted {
        draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);
    }

    for &(x, y) in &observed {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: months=[{}, {}] | units=[{y_min:.2}, {y_max:.2}]\n",
        first.label(),
        last.label()
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out.push_str(&axis_labels(&first.label(), &last.label(), width));
    out.push('\n');

    out
}

/// Render a plot from a saved JSON report.
pub fn render_ascii_plot_from_report(report: &ReportFile, width: usize, height: usize) -> String {
    render_ascii_plot(&report.monthly, report.trend.as_ref(), width, height)
}

fn expand_if_flat(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 1.0, max + 1.0) }
}

fn y_range(observed: &[(f64, f64)], curve: Option<&[(f64, f64)]>) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in observed.iter().chain(curve.unwrap_or(&[]).iter()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if !(min_y.is_finite() && max_y.is_finite()) {
        return (0.0, 1.0);
    }
    expand_if_flat(min_y, max_y)
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// First and last month labels under the grid (last one right-aligned).
fn axis_labels(first: &str, last: &str, width: usize) -> String {
    if first == last || first.len() + last.len() + 1 > width {
        return first.to_string();
    }
    let gap = width - first.len() - last.len();
    format!("{first}{}{last}", " ".repeat(gap))
}
