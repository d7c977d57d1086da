//! Session-scoped orchestration state.
//!
//! Everything the original page kept in ambient globals lives here as
//! one explicit context: credentials, connection state, the shared
//! chart dataset, the notice banner, and the preview gates. All
//! transitions are synchronous methods; the async edges (timers and
//! network calls) live in the view and report back through these
//! methods, which keeps the whole engine testable without a browser.

use crate::core::api::{ApiError, CalculationRequest, CalculationResult, SweepResult};
use crate::core::chart::ChartSeriesModel;
use crate::core::connection::{probe_request, ConnectionState};
use crate::core::credentials::{CredentialField, Credentials};
use crate::core::notify::NoticeBoard;
use crate::core::schedule::{DebounceGate, SeqGate};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub credentials: Credentials,
    pub connection: ConnectionState,
    pub chart: ChartSeriesModel,
    pub notices: NoticeBoard,
    preview_debounce: DebounceGate,
    preview_seq: SeqGate,
    pub calculate_busy: bool,
    pub sweep_busy: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests may flow only once credentials are complete and the
    /// probe has confirmed them.
    pub fn can_request(&self) -> bool {
        self.credentials.is_configured() && self.connection.is_verified()
    }

    /// A credential edit invalidates whatever the previous probe
    /// established; the state falls back to what the fields alone imply.
    pub fn set_credential(&mut self, field: CredentialField, value: String) {
        self.credentials.set(field, value);
        self.connection = ConnectionState::derived(&self.credentials);
    }

    /// Start verification. Returns the probe payload to send, or posts
    /// an error notice and returns `None` when credentials are
    /// incomplete.
    pub fn begin_verify(&mut self) -> Option<CalculationRequest> {
        self.connection = ConnectionState::derived(&self.credentials);
        if !self.credentials.is_configured() {
            self.notices.error(
                "Incomplete credentials. Enter the endpoint URL, key, and host header.",
            );
            return None;
        }
        Some(probe_request())
    }

    /// Record a probe outcome. Deliberately last-write-wins: overlapping
    /// probes are tolerated and whichever resolves last sets the state.
    pub fn resolve_verify(&mut self, outcome: Result<(), ApiError>) {
        match outcome {
            Ok(()) => {
                self.connection = ConnectionState::Verified;
                self.notices
                    .success("Verified connection to the upstream service.");
            }
            Err(err) => {
                self.connection = ConnectionState::Failed;
                self.notices.error(format!("Verification failed: {err}"));
            }
        }
    }

    /// A qualifying parameter edit: restarts the debounce window and
    /// returns the generation its timer must present to fire.
    pub fn note_parameter_edit(&mut self) -> u64 {
        self.preview_debounce.bump()
    }

    /// A debounce timer elapsed. Returns the sequence number for the
    /// preview call it should issue, or `None` when the timer is stale
    /// or the connection is not verified. Suppression is silent: no
    /// request, no banner.
    pub fn preview_ticket(&mut self, generation: u64) -> Option<u64> {
        if !self.preview_debounce.is_current(generation) {
            return None;
        }
        if !self.can_request() {
            return None;
        }
        Some(self.preview_seq.issue())
    }

    /// A preview response landed. Applies it only if it belongs to the
    /// latest issued preview call.
    pub fn apply_preview(&mut self, seq: u64, result: &CalculationResult) -> bool {
        if !self.preview_seq.is_latest(seq) {
            return false;
        }
        self.chart.apply_single_point(result);
        true
    }

    /// Start an explicit single calculation. Unlike preview, an
    /// unverified connection is surfaced here. Single-flight: a repeat
    /// request while one is in flight is refused silently, since the
    /// triggering control is already disabled.
    pub fn begin_calculate(&mut self) -> bool {
        if self.calculate_busy {
            return false;
        }
        if !self.can_request() {
            self.notices
                .error("Configure and verify the connection before making requests.");
            return false;
        }
        self.calculate_busy = true;
        true
    }

    /// Calculation finished. The busy flag clears on every path.
    pub fn resolve_calculate(
        &mut self,
        outcome: Result<CalculationResult, ApiError>,
    ) -> Option<CalculationResult> {
        self.calculate_busy = false;
        match outcome {
            Ok(result) => {
                self.chart.apply_single_point(&result);
                Some(result)
            }
            Err(err) => {
                self.notices.error(format!("Calculation failed: {err}"));
                None
            }
        }
    }

    /// Start a sweep. Single-flight: the triggering control stays
    /// disabled while `sweep_busy` holds, and a repeat request that
    /// slips in before the re-render is refused silently.
    pub fn begin_sweep(&mut self) -> bool {
        if self.sweep_busy {
            return false;
        }
        if !self.can_request() {
            self.notices
                .error("Configure and verify the connection before generating a sweep.");
            return false;
        }
        self.sweep_busy = true;
        true
    }

    /// Sweep finished. Returns `true` when the chart was updated, so the
    /// dialog can close; on failure it stays open for a retry. The busy
    /// flag clears on every path.
    pub fn resolve_sweep(&mut self, outcome: Result<SweepResult, ApiError>) -> bool {
        self.sweep_busy = false;
        match outcome {
            Ok(sweep) => {
                self.chart.apply_sweep(&sweep);
                true
            }
            Err(err) => {
                self.notices.error(format!("Sweep failed: {err}"));
                false
            }
        }
    }
}
