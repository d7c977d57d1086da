//! Shared UI crate for the adaptive control console. The orchestration
//! core and the views live here; platform launchers stay thin.

pub mod core;
pub mod views;

pub mod components {
    // SVG chart consumer (components/line_chart.rs)
    pub mod line_chart;
    pub use line_chart::LineChart;
}
