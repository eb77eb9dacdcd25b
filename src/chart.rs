use crate::error::{Error, Result};
use crate::series::{AggregatePoint, SatClass, Series};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_backend::DrawingBackend;
use std::path::Path;
use tracing::info;

// Font sizes
const TITLE_FONT_SIZE: u32 = 26;
const AXIS_LABEL_FONT_SIZE: u32 = 18;
const TICK_LABEL_FONT_SIZE: u32 = 14;
const LEGEND_FONT_SIZE: u32 = 16;

// Layout: two panels of 600x600 stacked vertically, plus a legend strip on
// the right of each panel.
const PLOT_WIDTH: u32 = 600;
const LEGEND_WIDTH: u32 = 170;
const CANVAS_SIZE: (u32, u32) = (PLOT_WIDTH + LEGEND_WIDTH, 1200);
const X_LABEL_AREA_SIZE: u32 = 50;
const Y_LABEL_AREA_SIZE: u32 = 70;
const LEGEND_ROW_HEIGHT: i32 = 26;
const MARKER_SIZE: i32 = 5;

/// Whitespace kept around the content when the image is trimmed
const CROP_PADDING: u32 = 8;

const BACKGROUND: [u8; 3] = [255, 255, 255];

pub const X_DESC: &str = "Number of variables";

/// Line colours, assigned by heuristic position within a panel
const COLORS: &[RGBColor] = &[
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(148, 103, 189), // Purple
    RGBColor(140, 86, 75),   // Brown
];

/// Point marker of a line.
///
/// Only three shapes exist; with more than three heuristics in a panel the
/// shapes repeat and lines are told apart by colour alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Triangle,
    Diamond,
}

impl MarkerShape {
    pub fn all() -> &'static [MarkerShape] {
        &[MarkerShape::Circle, MarkerShape::Triangle, MarkerShape::Diamond]
    }

    pub fn for_index(idx: usize) -> MarkerShape {
        let all = Self::all();
        all[idx % all.len()]
    }
}

/// One heuristic's line in a panel
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub heuristic: String,
    pub marker: MarkerShape,
    /// Index into the colour palette
    pub color_index: usize,
    /// Points sorted by size
    pub points: Vec<AggregatePoint>,
}

impl Line {
    pub fn xs(&self) -> Vec<u32> {
        self.points.iter().map(|p| p.size).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.average).collect()
    }

    fn color(&self) -> RGBColor {
        COLORS[self.color_index % COLORS.len()]
    }

    /// Points that can be placed on a log axis
    fn drawable(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter(|p| p.average.is_finite() && p.average > 0.0)
            .map(|p| (p.size as f64, p.average))
            .collect()
    }
}

/// Everything needed to draw one subplot
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub class: SatClass,
    pub title: &'static str,
    pub y_desc: &'static str,
    pub lines: Vec<Line>,
}

fn panel_labels(class: SatClass) -> (&'static str, &'static str) {
    match class {
        SatClass::Satisfiable => ("Satisfiable runtimes", "Runtime (seconds)"),
        SatClass::Unsatisfiable => ("Unsatisfiable runtimes", "Runtime (s)"),
    }
}

/// Build the two panels (satisfiable first) from an aggregated series.
///
/// Heuristics appear in insertion order and each line's points are sorted by
/// size.
pub fn build_panels(series: &Series) -> Vec<Panel> {
    SatClass::all()
        .iter()
        .map(|&class| {
            let (title, y_desc) = panel_labels(class);
            let lines = series
                .class(class)
                .iter()
                .enumerate()
                .map(|(idx, h)| Line {
                    heuristic: h.heuristic.clone(),
                    marker: MarkerShape::for_index(idx),
                    color_index: idx,
                    points: h.sorted_points(),
                })
                .collect();
            Panel {
                class,
                title,
                y_desc,
                lines,
            }
        })
        .collect()
}

/// Axis ranges covering every drawable point of a panel
fn panel_ranges(panel: &Panel) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let points: Vec<(f64, f64)> = panel.lines.iter().flat_map(|l| l.drawable()).collect();
    if points.is_empty() {
        return (1.0..10.0, 0.1..10.0);
    }

    let (x_min, x_max) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), (x, _)| (lo.min(*x), hi.max(*x)));
    let (y_min, y_max) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), (_, y)| (lo.min(*y), hi.max(*y)));

    let x_pad = ((x_max - x_min) * 0.05).max(1.0);
    ((x_min - x_pad)..(x_max + x_pad), (y_min / 1.5)..(y_max * 1.5))
}

/// Label only powers of ten on the log axis
fn format_log_tick(value: f64) -> String {
    if value <= 0.0 {
        return String::new();
    }
    let log10 = value.log10();
    let nearest = log10.round();
    if (log10 - nearest).abs() > 1e-6 {
        return String::new();
    }
    let exp = nearest as i32;
    if (-3..=3).contains(&exp) {
        format!("{}", 10f64.powi(exp))
    } else {
        format!("1e{}", exp)
    }
}

fn diamond(center: (i32, i32), size: i32) -> Vec<(i32, i32)> {
    let (x, y) = center;
    vec![(x, y - size), (x + size, y), (x, y + size), (x - size, y)]
}

fn draw_panel(area: &DrawingArea<BitMapBackend<'_>, Shift>, panel: &Panel) -> anyhow::Result<()> {
    let (plot_area, legend_area) = area.split_horizontally(PLOT_WIDTH as i32);
    let (x_range, y_range) = panel_ranges(panel);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(panel.title, ("sans-serif", TITLE_FONT_SIZE))
        .margin(15)
        .x_label_area_size(X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE)
        .build_cartesian_2d(x_range, y_range.log_scale())?;

    chart
        .configure_mesh()
        .x_desc(X_DESC)
        .y_desc(panel.y_desc)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format_log_tick(*y))
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    for line in &panel.lines {
        let data = line.drawable();
        if data.is_empty() {
            continue;
        }
        let color = line.color();

        chart.draw_series(LineSeries::new(data.clone(), color.stroke_width(2)))?;

        match line.marker {
            MarkerShape::Circle => chart.draw_series(
                data.iter()
                    .map(|&c| Circle::new(c, MARKER_SIZE, color.filled())),
            )?,
            MarkerShape::Triangle => chart.draw_series(
                data.iter()
                    .map(|&c| TriangleMarker::new(c, MARKER_SIZE, color.filled())),
            )?,
            MarkerShape::Diamond => chart.draw_series(data.iter().map(|&c| {
                EmptyElement::at(c) + Polygon::new(diamond((0, 0), MARKER_SIZE), color.filled())
            }))?,
        };
    }

    draw_legend(&legend_area, &panel.lines)?;
    Ok(())
}

/// Legend in its own strip right of the plot, anchored a quarter up from
/// the bottom.
fn draw_legend(area: &DrawingArea<BitMapBackend<'_>, Shift>, lines: &[Line]) -> anyhow::Result<()> {
    if lines.is_empty() {
        return Ok(());
    }

    let (_, height) = area.dim_in_pixel();
    let rows = lines.len() as i32;
    let box_height = rows * LEGEND_ROW_HEIGHT + 8;
    let bottom = (height as i32 * 3) / 4;
    let top = (bottom - box_height).max(0);
    let left = 6;
    let right = LEGEND_WIDTH as i32 - 6;

    area.draw(&Rectangle::new(
        [(left, top), (right, top + box_height)],
        WHITE.filled(),
    ))?;
    area.draw(&Rectangle::new(
        [(left, top), (right, top + box_height)],
        BLACK.mix(0.3).stroke_width(1),
    ))?;

    for (row, line) in lines.iter().enumerate() {
        let color = line.color();
        let y = top + 4 + row as i32 * LEGEND_ROW_HEIGHT + LEGEND_ROW_HEIGHT / 2;
        let x = left + 8;

        area.draw(&PathElement::new(
            vec![(x, y), (x + 28, y)],
            color.stroke_width(2),
        ))?;

        let center = (x + 14, y);
        match line.marker {
            MarkerShape::Circle => area.draw(&Circle::new(center, MARKER_SIZE, color.filled()))?,
            MarkerShape::Triangle => {
                area.draw(&TriangleMarker::new(center, MARKER_SIZE, color.filled()))?
            }
            MarkerShape::Diamond => area.draw(&Polygon::new(
                diamond(center, MARKER_SIZE),
                color.filled(),
            ))?,
        }

        area.draw(&Text::new(
            line.heuristic.clone(),
            (x + 36, y),
            ("sans-serif", LEGEND_FONT_SIZE)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
    }

    Ok(())
}

/// Draw all panels into an in-memory RGB canvas
fn draw_canvas(panels: &[Panel], buffer: &mut [u8], size: (u32, u32)) -> anyhow::Result<()> {
    let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((panels.len().max(1), 1));
    for (area, panel) in areas.iter().zip(panels) {
        draw_panel(area, panel)?;
    }

    root.present()?;
    Ok(())
}

/// Bounding box `(x0, y0, x1, y1)` (exclusive end) of every pixel that differs
/// from `background`, or `None` for a blank canvas.
pub fn content_bounds(
    pixels: &[u8],
    (width, height): (u32, u32),
    background: [u8; 3],
) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            if pixels[idx..idx + 3] == background {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x + 1, y + 1),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
            });
        }
    }

    bounds
}

/// Copy the `(x0, y0, x1, y1)` region out of an RGB buffer of `width` pixels
pub fn crop(pixels: &[u8], width: u32, (x0, y0, x1, y1): (u32, u32, u32, u32)) -> Vec<u8> {
    let mut out = Vec::with_capacity(((x1 - x0) * (y1 - y0) * 3) as usize);
    for y in y0..y1 {
        let start = ((y * width + x0) * 3) as usize;
        let end = ((y * width + x1) * 3) as usize;
        out.extend_from_slice(&pixels[start..end]);
    }
    out
}

/// Content bounds grown by `padding`, clamped to the canvas
fn padded_bounds(pixels: &[u8], size: (u32, u32), padding: u32) -> (u32, u32, u32, u32) {
    let (width, height) = size;
    match content_bounds(pixels, size, BACKGROUND) {
        Some((x0, y0, x1, y1)) => (
            x0.saturating_sub(padding),
            y0.saturating_sub(padding),
            (x1 + padding).min(width),
            (y1 + padding).min(height),
        ),
        None => (0, 0, width, height),
    }
}

/// Render both panels into a single PNG at `path`, trimmed to its content.
pub fn render_chart(series: &Series, path: &Path) -> Result<()> {
    let panels = build_panels(series);
    let (width, height) = CANVAS_SIZE;

    let mut buffer = vec![0u8; (width * height * 3) as usize];
    draw_canvas(&panels, &mut buffer, CANVAS_SIZE).map_err(|e| Error::render(path, format!("{:#}", e)))?;

    let bounds = padded_bounds(&buffer, CANVAS_SIZE, CROP_PADDING);
    let cropped = crop(&buffer, width, bounds);
    let cropped_size = (bounds.2 - bounds.0, bounds.3 - bounds.1);

    let mut backend = BitMapBackend::new(path, cropped_size);
    backend
        .blit_bitmap((0, 0), cropped_size, &cropped)
        .map_err(|e| Error::render(path, e))?;
    backend.present().map_err(|e| Error::render(path, e))?;

    info!(
        width = cropped_size.0,
        height = cropped_size.1,
        "Generated: {}",
        path.display()
    );
    Ok(())
}
