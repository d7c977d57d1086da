//! Shared chart dataset: x-axis labels plus three parallel series.
//!
//! Both the live preview and the sweep publish through the single
//! `replace` entry point, and every update is a wholesale replacement.
//! There is deliberately no append: interleaved async responses can then
//! never accumulate stale points, only overwrite each other.

use crate::core::api::{CalculationResult, SweepResult};

pub const SERIES_COUNT: usize = 3;

/// Legend names in series order: output gain, control parameter,
/// processing factor.
pub const SERIES_NAMES: [&str; SERIES_COUNT] =
    ["Output Gain", "Control Parameter", "Processing Factor"];

pub const DEFAULT_TITLE: &str = "Adaptive Control System Response";
pub const DEFAULT_X_AXIS: &str = "Parameter Value";
pub const SINGLE_POINT_TITLE: &str = "Single Point Calculation Result";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeriesModel {
    labels: Vec<f64>,
    series: [Vec<f64>; SERIES_COUNT],
    title: String,
    x_axis_label: String,
}

impl Default for ChartSeriesModel {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            series: [Vec::new(), Vec::new(), Vec::new()],
            title: DEFAULT_TITLE.to_string(),
            x_axis_label: DEFAULT_X_AXIS.to_string(),
        }
    }
}

impl ChartSeriesModel {
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn series(&self) -> &[Vec<f64>; SERIES_COUNT] {
        &self.series
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn x_axis_label(&self) -> &str {
        &self.x_axis_label
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The only mutation entry point. All four pieces swap in together;
    /// a renderer never observes labels from one update alongside series
    /// from another.
    pub fn replace(
        &mut self,
        labels: Vec<f64>,
        series: [Vec<f64>; SERIES_COUNT],
        title: String,
        x_axis_label: String,
    ) {
        debug_assert!(series.iter().all(|s| s.len() == labels.len()));
        self.labels = labels;
        self.series = series;
        self.title = title;
        self.x_axis_label = x_axis_label;
    }

    /// Publish one calculation as a single-point dataset keyed by its
    /// `h_value`. The x-axis label is left as-is.
    pub fn apply_single_point(&mut self, result: &CalculationResult) {
        let x_axis = self.x_axis_label.clone();
        self.replace(
            vec![result.h_value],
            [
                vec![result.output_gain],
                vec![result.control_parameter],
                vec![result.processing_factor],
            ],
            SINGLE_POINT_TITLE.to_string(),
            x_axis,
        );
    }

    /// Publish a sweep: labels are the swept values, each series is one
    /// response field extracted across every step in order.
    pub fn apply_sweep(&mut self, sweep: &SweepResult) {
        self.replace(
            sweep.parameter_values.clone(),
            [
                sweep.results.iter().map(|r| r.output_gain).collect(),
                sweep.results.iter().map(|r| r.control_parameter).collect(),
                sweep.results.iter().map(|r| r.processing_factor).collect(),
            ],
            format!("Parameter Sweep: {}", sweep.parameter_name),
            humanize_parameter(&sweep.parameter_name),
        );
    }
}

/// `lambda_factor` -> `LAMBDA FACTOR` for the x-axis caption.
pub fn humanize_parameter(name: &str) -> String {
    name.replace('_', " ").to_uppercase()
}
