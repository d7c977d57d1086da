//! Connection verification state for the upstream service.
//!
//! Credentials move from merely "present" to "verified" through a single
//! lightweight probe call. Any later credential edit throws the previous
//! outcome away. Verification is advisory, not transactional: overlapping
//! probes are tolerated and the most recently resolved one wins.

use crate::core::api::CalculationRequest;
use crate::core::credentials::Credentials;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// One or more credential fields are missing.
    #[default]
    Unconfigured,
    /// All fields present, probe not yet resolved.
    ConfiguredUnverified,
    /// Probe succeeded; requests may flow.
    Verified,
    /// Probe failed; explicit actions will re-prompt, preview stays quiet.
    Failed,
}

impl ConnectionState {
    /// The state implied by the credential fields alone, used whenever a
    /// field changes: whatever was verified before no longer counts.
    pub fn derived(credentials: &Credentials) -> Self {
        if credentials.is_configured() {
            ConnectionState::ConfiguredUnverified
        } else {
            ConnectionState::Unconfigured
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, ConnectionState::Verified)
    }

    /// Operator-facing status line for the credentials card.
    pub fn status_message(&self) -> &'static str {
        match self {
            ConnectionState::Unconfigured => {
                "Not connected. Enter the endpoint URL, key, and host to enable."
            }
            ConnectionState::ConfiguredUnverified => {
                "Credentials provided. Awaiting verification."
            }
            ConnectionState::Verified => "Connected to the upstream service.",
            ConnectionState::Failed => "Verification failed. Check credentials and retry.",
        }
    }
}

/// The fixed, side-effect-free probe payload: unit parameters and a
/// single-element base output. Cheap for the upstream to evaluate and
/// valid against its schema bounds.
pub fn probe_request() -> CalculationRequest {
    CalculationRequest {
        current_h: 1.0,
        previous_h: None,
        beta_0: 1.0,
        lambda_factor: 1.0,
        epsilon: 1e-10,
        base_output: vec![1.0],
        system_id: None,
        output_labels: None,
        alpha_param: 1.0,
        gamma_param: 1.0,
    }
}
