//! # Tide Chart Rendering
//!
//! This module draws a labeled tide series either to an SVG file (the normal
//! output) or as an ASCII chart on the terminal for quick checks without an
//! image viewer.
//!
//! The SVG chart shows the predicted height curve through every high and low,
//! red/green markers annotated with their heights, and a translucent band
//! around each favorable tide. The document is built in memory first so a bad
//! destination never leaves a half-written file behind.

use crate::classify::LabeledSeries;
use crate::config::{Config, MAX_HIGHLIGHT_MINUTES};
use crate::TideKind;
use chrono::{Duration, NaiveDateTime};
use plotters::coord::types::RangedDateTime;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const LINE_COLOR: RGBColor = RGBColor(65, 105, 225); // royal blue
const HIGH_COLOR: RGBColor = RGBColor(214, 39, 40);
const LOW_COLOR: RGBColor = RGBColor(44, 160, 44);
const FAVORABLE_COLOR: RGBColor = RGBColor(255, 165, 0);

/// Errors raised while producing the chart.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Destination could not be written
    #[error("could not write chart to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Plotting backend failure
    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("nothing to plot")]
    Empty,
}

/// Where the chart goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// SVG file
    File(PathBuf),
    /// ASCII chart on stdout
    Terminal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Written(PathBuf),
    Displayed,
    /// Series was empty; a warning was logged and nothing was produced
    NothingToPlot,
}

/// Render `series` to `destination`.
///
/// An empty series is not an error: it logs a warning and returns
/// [`RenderOutcome::NothingToPlot`] without touching the destination.
pub fn render(
    series: &LabeledSeries,
    config: &Config,
    destination: &Destination,
) -> Result<RenderOutcome, RenderError> {
    if series.is_empty() {
        warn!(
            "Cannot plot an empty tide series for {}; check the station ID and date range",
            config.station.name
        );
        return Ok(RenderOutcome::NothingToPlot);
    }

    match destination {
        Destination::File(path) => {
            info!("Generating plot...");
            let svg = render_svg(series, config)?;
            write_chart(path, &svg)?;
            info!("Chart written to {}", path.display());
            Ok(RenderOutcome::Written(path.clone()))
        }
        Destination::Terminal => {
            print!("{}", render_ascii(series, config));
            Ok(RenderOutcome::Displayed)
        }
    }
}

fn write_chart(path: &Path, svg: &str) -> Result<(), RenderError> {
    fs::write(path, svg).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Draw the chart into an SVG document.
pub fn render_svg(series: &LabeledSeries, config: &Config) -> Result<String, RenderError> {
    let plain = series.to_series();
    let (Some((first, last)), Some((min_height, max_height))) =
        (plain.span(), plain.height_bounds())
    else {
        return Err(RenderError::Empty);
    };

    // Room on both sides for the outermost highlight bands and markers
    let band = Duration::minutes(
        config
            .output
            .highlight_minutes
            .clamp(0, MAX_HIGHLIGHT_MINUTES),
    );
    let x_pad = band + Duration::minutes(60);
    let (Some(x_start), Some(x_end)) = (
        first.checked_sub_signed(x_pad),
        last.checked_add_signed(x_pad),
    ) else {
        return Err(RenderError::Draw(format!(
            "time axis {first} to {last} is out of range"
        )));
    };
    let x_range = x_start..x_end;

    // Extra headroom for the height annotations above and below the markers
    let y_pad = if (max_height - min_height).abs() > 1e-6 {
        (max_height - min_height) * 0.2
    } else {
        1.0
    };
    let y_range = (min_height - y_pad)..(max_height + y_pad);

    let mut svg = String::new();
    {
        let size = (config.output.width, config.output.height);
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_chart(&root, series, config, band, x_range, y_range)
            .map_err(|e| RenderError::Draw(e.to_string()))?;
    }
    Ok(svg)
}

fn draw_chart(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    series: &LabeledSeries,
    config: &Config,
    band: Duration,
    x_range: Range<NaiveDateTime>,
    y_range: Range<f64>,
) -> Result<(), DrawingAreaErrorKind<io::Error>> {
    let units = config.request.units;
    let (y_min, y_max) = (y_range.start, y_range.end);

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("Tide Predictions for {}", config.station.name),
            ("sans-serif", 30),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(RangedDateTime::from(x_range), y_range)?;

    chart
        .configure_mesh()
        .x_desc(format!(
            "Date and Time ({})",
            config.request.time_zone.label()
        ))
        .y_desc(format!("Tide Height ({})", units.name()))
        .x_labels(12)
        .x_label_formatter(&|dt: &NaiveDateTime| dt.format("%m-%d %H:%M").to_string())
        .y_label_formatter(&|h: &f64| format!("{:.1}", h))
        .light_line_style(BLACK.mix(0.15))
        .draw()?;

    // Favorable windows go underneath everything else
    chart
        .draw_series(series.favorable().map(|e| {
            Rectangle::new(
                [(e.timestamp - band, y_min), (e.timestamp + band, y_max)],
                FAVORABLE_COLOR.mix(0.25).filled(),
            )
        }))?
        .label("Favorable Tide")
        .legend(|(x, y)| {
            Rectangle::new(
                [(x, y - 6), (x + 20, y + 6)],
                FAVORABLE_COLOR.mix(0.25).filled(),
            )
        });

    chart
        .draw_series(LineSeries::new(
            series
                .events
                .iter()
                .map(|e| (e.event.timestamp, e.event.height)),
            LINE_COLOR.stroke_width(3),
        ))?
        .label("Predicted Tide Height")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], LINE_COLOR.stroke_width(3)));

    for (kind, color, label, text_offset) in [
        (TideKind::High, HIGH_COLOR, "High Tide", (-22, -24)),
        (TideKind::Low, LOW_COLOR, "Low Tide", (-22, 12)),
    ] {
        let font = ("sans-serif", 13).into_font();
        chart
            .draw_series(series.of_kind(kind).map(|e| {
                let point = (e.event.timestamp, e.event.height);
                let (radius, style) = if e.label.is_favorable() {
                    (8, FAVORABLE_COLOR.filled())
                } else {
                    (6, color.filled())
                };
                EmptyElement::at(point)
                    + Circle::new((0, 0), radius, style)
                    + Text::new(
                        format!("{:.2} {}", e.event.height, units.abbreviation()),
                        text_offset,
                        font.clone(),
                    )
            }))?
            .label(label)
            .legend(move |(x, y)| Circle::new((x + 10, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 16))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Render the series as an ASCII chart: rows are heights, columns are time.
///
/// `H` and `L` mark highs and lows, `*` marks favorable tides.
pub fn render_ascii(series: &LabeledSeries, config: &Config) -> String {
    const ROWS: usize = 16;
    const COLUMNS: usize = 72;
    const Y_AXIS_WIDTH: usize = 7; // Space for Y-axis labels

    let plain = series.to_series();
    let (Some((start, end)), Some((min_height, max_height))) =
        (plain.span(), plain.height_bounds())
    else {
        return String::new();
    };

    let height_range = if max_height > min_height {
        max_height - min_height
    } else {
        1.0
    };
    let total_secs = (end - start).num_seconds().max(1) as f64;

    let tide_to_row = |height: f64| {
        let normalized = (height - min_height) / height_range;
        ((1.0 - normalized) * (ROWS as f64 - 1.0)).round() as usize
    };
    let time_to_column = |timestamp: NaiveDateTime| {
        let elapsed = (timestamp - start).num_seconds() as f64;
        (elapsed / total_secs * (COLUMNS as f64 - 1.0)).round() as usize
    };

    let mut grid = vec![vec![' '; COLUMNS + Y_AXIS_WIDTH]; ROWS];
    for row in grid.iter_mut() {
        row[Y_AXIS_WIDTH - 1] = '│';
    }

    // Y-axis labels on whole or half units, widened so there is at most one per row
    let unit_step = if height_range > 4.0 { 1.0 } else { 0.5 };
    let row_step = height_range / (ROWS as f64 - 1.0);
    let tide_step = if row_step > unit_step {
        row_step.ceil()
    } else {
        unit_step
    };
    let lowest_label = (min_height / tide_step).ceil() * tide_step;
    for step in 0..ROWS {
        let current = lowest_label + step as f64 * tide_step;
        if current > max_height {
            break;
        }
        let row = tide_to_row(current);
        if row < ROWS {
            let label = format!("{:>width$.1}", current, width = Y_AXIS_WIDTH - 2);
            for (i, ch) in label.chars().take(Y_AXIS_WIDTH - 1).enumerate() {
                grid[row][i] = ch;
            }
        }
    }

    for labeled in &series.events {
        let row = tide_to_row(labeled.event.height).min(ROWS - 1);
        let column = Y_AXIS_WIDTH + time_to_column(labeled.event.timestamp).min(COLUMNS - 1);
        grid[row][column] = if labeled.label.is_favorable() {
            '*'
        } else {
            labeled.event.kind.marker()
        };
    }

    let units = config.request.units;
    let mut out = format!(
        "Tide Predictions for {} ({})\n\n",
        config.station.name,
        units.name()
    );
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let padding = " ".repeat(Y_AXIS_WIDTH);
    out.push_str(&format!("{}{}\n", padding, "─".repeat(COLUMNS)));
    let left = start.format("%m-%d %H:%M").to_string();
    let right = end.format("%m-%d %H:%M").to_string();
    out.push_str(&format!(
        "{}{:<width$}{}\n",
        padding,
        left,
        right,
        width = COLUMNS.saturating_sub(right.len())
    ));

    let fav = &config.favorability;
    out.push_str(&format!(
        "\nH high  L low  * favorable (below {} {}, {}-{})\n",
        fav.max_height,
        units.abbreviation(),
        fav.daylight_start.format("%H:%M"),
        fav.daylight_end.format("%H:%M"),
    ));
    out
}
