//! Chart images for the period reports.
//!
//! Charts are rasterised straight into an [`RgbImage`] and encoded as PNG. They carry no text;
//! titles, axis ranges and legends are printed by the document around the figure.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use log::{info, warn};

use crate::error::ChartError;
use crate::stats::{counts_by, revenue_by};
use crate::types::Transaction;

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 600;
const MARGIN_LEFT: i64 = 70;
const MARGIN_RIGHT: i64 = 40;
const MARGIN_TOP: i64 = 30;
const MARGIN_BOTTOM: i64 = 50;
const GRID_LINES: i64 = 5;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const LINE: Rgb<u8> = Rgb([31, 119, 180]);
const MARKER: Rgb<u8> = Rgb([20, 80, 130]);
const BAR: Rgb<u8> = Rgb([111, 78, 55]);

/// A chart written to disk, with the values it plots.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub path: PathBuf,
    pub title: String,
    /// Plotted points in drawing order: left to right, or bottom bar to top bar.
    pub series: Vec<(String, f64)>,
}

/// Daily revenue as a line with one marker per day.
///
/// Returns `Ok(None)` without writing anything when there is nothing to plot.
pub fn render_line_chart(
    rows: &[Transaction],
    title: &str,
    output: impl AsRef<Path>,
) -> Result<Option<Chart>, ChartError> {
    let output = output.as_ref();
    let daily = revenue_by(rows, Transaction::date);
    let (Some(first), Some(last)) = (daily.keys().next().copied(), daily.keys().last().copied())
    else {
        warn!("Skipping chart '{}': no daily revenue to plot", title);
        return Ok(None);
    };

    let span_days = (last - first).num_days().max(1) as f64;
    let (low, high) = value_range(daily.values().copied());
    let mut canvas = Canvas::new();
    canvas.grid();

    let points: Vec<(i64, i64)> = daily
        .iter()
        .map(|(date, revenue)| {
            let fraction = if daily.len() == 1 {
                0.5
            } else {
                (*date - first).num_days() as f64 / span_days
            };
            (canvas.x_at(fraction), canvas.y_at((revenue - low) / (high - low)))
        })
        .collect();

    for pair in points.windows(2) {
        canvas.line(pair[0], pair[1], LINE, 3);
    }
    for &point in &points {
        canvas.disc(point, 6, MARKER);
    }
    canvas.axes();
    canvas.save(output)?;

    info!("Saved line chart '{}' to {}", title, output.display());
    Ok(Some(Chart {
        path: output.to_path_buf(),
        title: title.to_string(),
        series: daily
            .into_iter()
            .map(|(date, revenue)| (date.to_string(), revenue))
            .collect(),
    }))
}

/// Orders per item as horizontal bars, sorted ascending so the best seller sits on top.
///
/// Rows with a blank item name have no grouping key. Returns `Ok(None)` without writing
/// anything when no row has one.
pub fn render_bar_chart(
    rows: &[Transaction],
    title: &str,
    output: impl AsRef<Path>,
) -> Result<Option<Chart>, ChartError> {
    let output = output.as_ref();
    let named: Vec<Transaction> = rows
        .iter()
        .filter(|row| !row.item.is_empty())
        .cloned()
        .collect();
    let mut counts: Vec<(String, usize)> =
        counts_by(&named, |row| row.item.clone()).into_iter().collect();
    if counts.is_empty() {
        warn!("Skipping chart '{}': no item names to group by", title);
        return Ok(None);
    }
    counts.sort_by_key(|(_, count)| *count);

    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1) as f64;
    let mut canvas = Canvas::new();
    canvas.grid_vertical();

    let slot = canvas.plot_height() as f64 / counts.len() as f64;
    let thickness = (slot * 0.7).max(1.0);
    for (index, (_, count)) in counts.iter().enumerate() {
        let center = canvas.bottom() as f64 - slot * (index as f64 + 0.5);
        let top = (center - thickness / 2.0).round() as i64;
        let bottom = (center + thickness / 2.0).round() as i64;
        let right = canvas.x_at(*count as f64 / max);
        canvas.fill_rect(canvas.left(), top, right, bottom, BAR);
    }
    canvas.axes();
    canvas.save(output)?;

    info!("Saved bar chart '{}' to {}", title, output.display());
    Ok(Some(Chart {
        path: output.to_path_buf(),
        title: title.to_string(),
        series: counts
            .into_iter()
            .map(|(item, count)| (item, count as f64))
            .collect(),
    }))
}

fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut low, mut high) = (0.0_f64, 0.0_f64);
    for value in values {
        low = low.min(value);
        high = high.max(value);
    }
    if (high - low).abs() < f64::EPSILON {
        high = low + 1.0;
    }
    (low, high + (high - low) * 0.1)
}

struct Canvas {
    image: RgbImage,
}

impl Canvas {
    fn new() -> Self {
        Self {
            image: RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND),
        }
    }

    fn left(&self) -> i64 {
        MARGIN_LEFT
    }

    fn right(&self) -> i64 {
        i64::from(WIDTH) - MARGIN_RIGHT
    }

    fn top(&self) -> i64 {
        MARGIN_TOP
    }

    fn bottom(&self) -> i64 {
        i64::from(HEIGHT) - MARGIN_BOTTOM
    }

    fn plot_height(&self) -> i64 {
        self.bottom() - self.top()
    }

    fn x_at(&self, fraction: f64) -> i64 {
        self.left() + ((self.right() - self.left()) as f64 * fraction.clamp(0.0, 1.0)).round() as i64
    }

    fn y_at(&self, fraction: f64) -> i64 {
        self.bottom() - (self.plot_height() as f64 * fraction.clamp(0.0, 1.0)).round() as i64
    }

    fn set(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && x < i64::from(WIDTH) && y < i64::from(HEIGHT) {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.set(x, y, color);
            }
        }
    }

    /// Bresenham with a square pen of side `thickness`.
    fn line(&mut self, from: (i64, i64), to: (i64, i64), color: Rgb<u8>, thickness: i64) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        let half = thickness / 2;
        loop {
            self.fill_rect(x - half, y - half, x + half, y + half, color);
            if x == to.0 && y == to.1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn disc(&mut self, center: (i64, i64), radius: i64, color: Rgb<u8>) {
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    self.set(center.0 + x, center.1 + y, color);
                }
            }
        }
    }

    fn grid(&mut self) {
        for step in 1..=GRID_LINES {
            let y = self.y_at(step as f64 / GRID_LINES as f64);
            let (left, right) = (self.left(), self.right());
            self.line((left, y), (right, y), GRID, 1);
        }
    }

    fn grid_vertical(&mut self) {
        for step in 1..=GRID_LINES {
            let x = self.x_at(step as f64 / GRID_LINES as f64);
            let (top, bottom) = (self.top(), self.bottom());
            self.line((x, top), (x, bottom), GRID, 1);
        }
    }

    fn axes(&mut self) {
        let (left, right, top, bottom) = (self.left(), self.right(), self.top(), self.bottom());
        self.line((left, top), (left, bottom), AXIS, 2);
        self.line((left, bottom), (right, bottom), AXIS, 2);
    }

    fn encode(self) -> Result<Vec<u8>, ChartError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(self.image)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        Ok(bytes)
    }

    fn save(self, path: &Path) -> Result<(), ChartError> {
        let bytes = self.encode()?;
        fs::write(path, bytes).map_err(|source| ChartError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
