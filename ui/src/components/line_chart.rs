//! Inline SVG renderer for the shared chart dataset.
//!
//! Consumes one ordered series update and draws it; layout math lives in
//! small pure helpers so the scaling is testable without a DOM. Points
//! are spaced evenly by index (category axis), which keeps log-scale
//! sweeps like epsilon readable.

use dioxus::prelude::*;

use crate::core::chart::{ChartSeriesModel, SERIES_COUNT, SERIES_NAMES};

const VIEW_WIDTH: f64 = 640.0;
const VIEW_HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 48.0;

/// Series stroke colors, in series order (same palette as the classic
/// console styling).
pub const SERIES_COLORS: [&str; SERIES_COUNT] =
    ["rgb(102, 126, 234)", "rgb(118, 75, 162)", "rgb(72, 187, 120)"];

#[component]
pub fn LineChart(model: ChartSeriesModel) -> Element {
    let plot_width = VIEW_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = VIEW_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let range = value_range(model.series());
    let points = model.labels().len();

    let polylines: Vec<(usize, String)> = model
        .series()
        .iter()
        .enumerate()
        .map(|(idx, series)| (idx, points_attribute(series, range, plot_width, plot_height)))
        .collect();

    let x_captions: Vec<(f64, String)> = model
        .labels()
        .iter()
        .enumerate()
        .filter(|(idx, _)| caption_visible(*idx, points))
        .map(|(idx, label)| {
            (
                MARGIN_LEFT + x_position(idx, points, plot_width),
                format_tick(*label),
            )
        })
        .collect();

    rsx! {
        figure { class: "line-chart",
            figcaption { class: "line-chart__title", "{model.title()}" }
            svg {
                class: "line-chart__plot",
                view_box: "0 0 {VIEW_WIDTH} {VIEW_HEIGHT}",
                preserve_aspect_ratio: "xMidYMid meet",

                // Plot frame
                rect {
                    x: MARGIN_LEFT,
                    y: MARGIN_TOP,
                    width: plot_width,
                    height: plot_height,
                    class: "line-chart__frame",
                }

                if model.is_empty() {
                    text {
                        x: VIEW_WIDTH / 2.0,
                        y: VIEW_HEIGHT / 2.0,
                        text_anchor: "middle",
                        class: "line-chart__placeholder",
                        "No data yet. Verify the connection and calculate."
                    }
                } else {
                    g { transform: "translate({MARGIN_LEFT}, {MARGIN_TOP})",
                        for (idx, attribute) in polylines {
                            if points == 1 {
                                circle {
                                    cx: x_position(0, 1, plot_width),
                                    cy: first_y(model.series()[idx].first(), range, plot_height),
                                    r: 4.0,
                                    fill: SERIES_COLORS[idx],
                                }
                            } else {
                                polyline {
                                    points: "{attribute}",
                                    fill: "none",
                                    stroke: SERIES_COLORS[idx],
                                    stroke_width: 2.0,
                                }
                            }
                        }
                    }
                    for (x, caption) in x_captions {
                        text {
                            x,
                            y: VIEW_HEIGHT - MARGIN_BOTTOM + 18.0,
                            text_anchor: "middle",
                            class: "line-chart__tick",
                            "{caption}"
                        }
                    }
                }

                text {
                    x: MARGIN_LEFT + plot_width / 2.0,
                    y: VIEW_HEIGHT - 8.0,
                    text_anchor: "middle",
                    class: "line-chart__axis-label",
                    "{model.x_axis_label()}"
                }
            }
            div { class: "line-chart__legend",
                for (idx, name) in SERIES_NAMES.iter().enumerate() {
                    span { class: "line-chart__legend-item",
                        span {
                            class: "line-chart__swatch",
                            style: "background: {SERIES_COLORS[idx]};",
                        }
                        "{name}"
                    }
                }
            }
        }
    }
}

/// Combined min/max across all three series, padded so a flat line does
/// not collapse to zero height.
fn value_range(series: &[Vec<f64>; SERIES_COUNT]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in series.iter().flatten().copied() {
        if value.is_finite() {
            min = min.min(value);
            max = max.max(value);
        }
    }
    if min > max {
        return (0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 0.5, max + 0.5);
    }
    (min, max)
}

fn x_position(index: usize, count: usize, plot_width: f64) -> f64 {
    if count <= 1 {
        plot_width / 2.0
    } else {
        index as f64 / (count - 1) as f64 * plot_width
    }
}

fn y_position(value: f64, (min, max): (f64, f64), plot_height: f64) -> f64 {
    let normalized = (value - min) / (max - min);
    (1.0 - normalized) * plot_height
}

fn first_y(value: Option<&f64>, range: (f64, f64), plot_height: f64) -> f64 {
    value
        .map(|v| y_position(*v, range, plot_height))
        .unwrap_or(plot_height / 2.0)
}

fn points_attribute(series: &[f64], range: (f64, f64), plot_width: f64, plot_height: f64) -> String {
    series
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            format!(
                "{:.1},{:.1}",
                x_position(idx, series.len(), plot_width),
                y_position(*value, range, plot_height)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// At most eight tick captions, always including the endpoints.
fn caption_visible(index: usize, count: usize) -> bool {
    if count <= 8 {
        return true;
    }
    let stride = count.div_ceil(8);
    index % stride == 0 || index == count - 1
}

fn format_tick(value: f64) -> String {
    if value != 0.0 && value.abs() < 1e-3 {
        format!("{value:.1e}")
    } else {
        format!("{value:.2}")
    }
}
