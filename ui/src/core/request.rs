//! Mapping raw form text into request payloads.
//!
//! The form is treated as an untyped key/value source; all coercion
//! happens here. Two deliberate silent-drop rules carry over from the
//! upstream contract: non-numeric tokens in the base-output list are
//! discarded without complaint, and an output-label list is attached
//! only when its length matches the filtered base output exactly.

use crate::core::api::{CalculationRequest, SweepRequest};

/// Raw text of every non-credential input on the console, exactly as the
/// operator typed it.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlForm {
    pub current_h: String,
    pub previous_h: String,
    pub beta_0: String,
    pub lambda_factor: String,
    pub epsilon: String,
    pub alpha_param: String,
    pub gamma_param: String,
    pub base_output: String,
    pub output_labels: String,
    pub system_id: String,
}

impl Default for ControlForm {
    fn default() -> Self {
        Self {
            current_h: "1.0".into(),
            previous_h: String::new(),
            beta_0: "1.0".into(),
            lambda_factor: "1.0".into(),
            epsilon: "1e-10".into(),
            alpha_param: "1.0".into(),
            gamma_param: "1.0".into(),
            base_output: "1.0, 2.0, 3.0".into(),
            output_labels: String::new(),
            system_id: String::new(),
        }
    }
}

/// Contract bounds advertised on the sweep dialog's steps input. These
/// only steer the browser spinner; values outside them are still
/// forwarded and rejected upstream.
pub const STEPS_MIN: u32 = 2;
pub const STEPS_MAX: u32 = 100;

/// Raw text of the sweep dialog inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepForm {
    pub parameter: SweepParameter,
    pub start_value: String,
    pub end_value: String,
    pub steps: String,
}

impl Default for SweepForm {
    fn default() -> Self {
        SweepForm::for_parameter(SweepParameter::CurrentH)
    }
}

impl SweepForm {
    /// Dialog defaults pre-filled from the bounds table.
    pub fn for_parameter(parameter: SweepParameter) -> Self {
        let bounds = parameter.bounds();
        Self {
            parameter,
            start_value: format_bound(bounds.start),
            end_value: format_bound(bounds.end),
            steps: "20".into(),
        }
    }
}

/// The fixed set of sweepable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepParameter {
    CurrentH,
    Beta0,
    LambdaFactor,
    AlphaParam,
    GammaParam,
    Epsilon,
}

/// Dialog pre-fill ranges for one sweep parameter. Advisory only: they
/// seed the inputs and their widget min/max, but whatever the operator
/// submits is forwarded unmodified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBounds {
    pub min: f64,
    pub max: f64,
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 6] = [
        SweepParameter::CurrentH,
        SweepParameter::Beta0,
        SweepParameter::LambdaFactor,
        SweepParameter::AlphaParam,
        SweepParameter::GammaParam,
        SweepParameter::Epsilon,
    ];

    /// Field name on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            SweepParameter::CurrentH => "current_h",
            SweepParameter::Beta0 => "beta_0",
            SweepParameter::LambdaFactor => "lambda_factor",
            SweepParameter::AlphaParam => "alpha_param",
            SweepParameter::GammaParam => "gamma_param",
            SweepParameter::Epsilon => "epsilon",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SweepParameter::CurrentH => "Current H",
            SweepParameter::Beta0 => "Beta 0",
            SweepParameter::LambdaFactor => "Lambda Factor",
            SweepParameter::AlphaParam => "Alpha Param",
            SweepParameter::GammaParam => "Gamma Param",
            SweepParameter::Epsilon => "Epsilon",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.wire_name() == name)
    }

    pub fn bounds(&self) -> ParameterBounds {
        match self {
            SweepParameter::CurrentH => ParameterBounds {
                min: 0.1,
                max: 100.0,
                start: 0.5,
                end: 5.0,
                step: 0.1,
            },
            SweepParameter::Beta0 => ParameterBounds {
                min: 0.1,
                max: 5.0,
                start: 0.1,
                end: 5.0,
                step: 0.1,
            },
            SweepParameter::LambdaFactor => ParameterBounds {
                min: 0.1,
                max: 3.0,
                start: 0.1,
                end: 3.0,
                step: 0.1,
            },
            SweepParameter::AlphaParam => ParameterBounds {
                min: 0.1,
                max: 10.0,
                start: 0.1,
                end: 10.0,
                step: 0.1,
            },
            SweepParameter::GammaParam => ParameterBounds {
                min: 0.1,
                max: 5.0,
                start: 0.1,
                end: 5.0,
                step: 0.1,
            },
            SweepParameter::Epsilon => ParameterBounds {
                min: 1e-12,
                max: 1e-6,
                start: 1e-12,
                end: 1e-6,
                step: 1e-12,
            },
        }
    }
}

/// Build the single-point payload from raw form text.
pub fn build_calculation_request(form: &ControlForm) -> CalculationRequest {
    let base_output = parse_number_list(&form.base_output);
    let output_labels = parse_label_list(&form.output_labels)
        .filter(|labels| labels.len() == base_output.len());

    CalculationRequest {
        current_h: parse_scalar(&form.current_h),
        previous_h: non_empty(&form.previous_h).map(|raw| parse_scalar(raw)),
        beta_0: parse_scalar(&form.beta_0),
        lambda_factor: parse_scalar(&form.lambda_factor),
        epsilon: parse_scalar(&form.epsilon),
        base_output,
        system_id: non_empty(&form.system_id).map(str::to_string),
        output_labels,
        alpha_param: parse_scalar(&form.alpha_param),
        gamma_param: parse_scalar(&form.gamma_param),
    }
}

/// Wrap the current form as the base of a sweep. No client-side bounds
/// checking: out-of-range values surface as upstream rejections.
pub fn build_sweep_request(sweep: &SweepForm, form: &ControlForm) -> SweepRequest {
    SweepRequest {
        parameter_name: sweep.parameter.wire_name().to_string(),
        start_value: parse_scalar(&sweep.start_value),
        end_value: parse_scalar(&sweep.end_value),
        steps: sweep.steps.trim().parse().unwrap_or(0),
        base_request: build_calculation_request(form),
    }
}

/// Scalars that fail to parse become NaN, which serializes as JSON null
/// and is rejected upstream with a structured message.
fn parse_scalar(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

fn non_empty(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_number_list(raw: &str) -> Vec<f64> {
    raw.split(',')
        .filter_map(|token| token.trim().parse::<f64>().ok())
        .collect()
}

fn parse_label_list(raw: &str) -> Option<Vec<String>> {
    non_empty(raw).map(|text| text.split(',').map(|label| label.trim().to_string()).collect())
}

fn format_bound(value: f64) -> String {
    // Keep scientific notation for the epsilon range, plain decimals
    // elsewhere, so the dialog shows what the table says.
    if value != 0.0 && value.abs() < 1e-4 {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}
