//! End-to-end orchestration flows against a scripted client: the same
//! session logic the console coroutine drives, exercised with real
//! futures so overlapping calls resolve in controlled orders.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use futures_channel::oneshot;

use ui::core::api::{
    ApiClient, ApiError, CalculationRequest, CalculationResult, SweepRequest, SweepResult,
    Timestamp,
};
use ui::core::credentials::CredentialField;
use ui::core::notify::NoticeKind;
use ui::core::request::{build_calculation_request, ControlForm};
use ui::core::session::Session;

/// Client scripted with canned responses, served in call order.
#[derive(Default)]
struct ScriptedClient {
    calculate_responses: RefCell<VecDeque<Result<CalculationResult, ApiError>>>,
    sweep_responses: RefCell<VecDeque<Result<SweepResult, ApiError>>>,
    calculate_calls: Cell<usize>,
    sweep_calls: Cell<usize>,
}

impl ApiClient for ScriptedClient {
    async fn calculate(
        &self,
        _request: &CalculationRequest,
    ) -> Result<CalculationResult, ApiError> {
        self.calculate_calls.set(self.calculate_calls.get() + 1);
        self.calculate_responses
            .borrow_mut()
            .pop_front()
            .expect("unexpected calculate call")
    }

    async fn sweep(&self, _request: &SweepRequest) -> Result<SweepResult, ApiError> {
        self.sweep_calls.set(self.sweep_calls.get() + 1);
        self.sweep_responses
            .borrow_mut()
            .pop_front()
            .expect("unexpected sweep call")
    }
}

/// Client whose responses resolve only when the test releases them,
/// for exercising out-of-order completion.
struct GatedClient {
    calculate_gates: RefCell<VecDeque<oneshot::Receiver<Result<CalculationResult, ApiError>>>>,
}

impl ApiClient for GatedClient {
    async fn calculate(
        &self,
        _request: &CalculationRequest,
    ) -> Result<CalculationResult, ApiError> {
        let gate = self
            .calculate_gates
            .borrow_mut()
            .pop_front()
            .expect("unexpected calculate call");
        gate.await.expect("gate dropped")
    }

    async fn sweep(&self, _request: &SweepRequest) -> Result<SweepResult, ApiError> {
        unreachable!("no sweep in this script")
    }
}

fn verified_session() -> Rc<RefCell<Session>> {
    let mut session = Session::new();
    session.set_credential(CredentialField::Endpoint, "https://up.example".into());
    session.set_credential(CredentialField::Key, "secret".into());
    session.set_credential(CredentialField::Host, "up.example".into());
    assert!(session.begin_verify().is_some());
    session.resolve_verify(Ok(()));
    Rc::new(RefCell::new(session))
}

fn result_with_gain(gain: f64) -> CalculationResult {
    CalculationResult {
        h_value: 1.0,
        delta_h: 0.0,
        processing_factor: 0.4,
        control_parameter: 1.1,
        output_gain: gain,
        timestamp: Timestamp::Number(0.0),
        processed_output: None,
        output_mapping: None,
        system_id: None,
    }
}

/// The view-level preview pipeline: take a ticket if the timer is still
/// current and the gate is open, issue the call, apply the response only
/// if it is still the latest. Failures are swallowed.
async fn run_preview<C: ApiClient>(
    session: Rc<RefCell<Session>>,
    client: Rc<C>,
    form: ControlForm,
    generation: u64,
) {
    let ticket = session.borrow_mut().preview_ticket(generation);
    if let Some(seq) = ticket {
        let request = build_calculation_request(&form);
        match client.calculate(&request).await {
            Ok(result) => {
                session.borrow_mut().apply_preview(seq, &result);
            }
            Err(_) => {}
        }
    }
}

#[test]
fn edit_burst_issues_one_call_with_latest_values() {
    let session = verified_session();
    let client = Rc::new(ScriptedClient::default());
    client
        .calculate_responses
        .borrow_mut()
        .push_back(Ok(result_with_gain(42.0)));

    // Three edits inside one window: two timers go stale, one fires.
    let g1 = session.borrow_mut().note_parameter_edit();
    let g2 = session.borrow_mut().note_parameter_edit();
    let g3 = session.borrow_mut().note_parameter_edit();

    let mut pool = LocalPool::new();
    for generation in [g1, g2, g3] {
        let form = ControlForm {
            current_h: format!("{generation}"),
            ..ControlForm::default()
        };
        pool.spawner()
            .spawn_local(run_preview(
                session.clone(),
                client.clone(),
                form,
                generation,
            ))
            .unwrap();
    }
    pool.run();

    assert_eq!(client.calculate_calls.get(), 1);
    assert_eq!(session.borrow().chart.series()[0], vec![42.0]);
}

#[test]
fn preview_issues_nothing_while_unverified() {
    let session = Rc::new(RefCell::new(Session::new()));
    let client = Rc::new(ScriptedClient::default());

    let mut pool = LocalPool::new();
    for _ in 0..5 {
        let generation = session.borrow_mut().note_parameter_edit();
        pool.spawner()
            .spawn_local(run_preview(
                session.clone(),
                client.clone(),
                ControlForm::default(),
                generation,
            ))
            .unwrap();
    }
    pool.run();

    assert_eq!(client.calculate_calls.get(), 0);
    assert!(session.borrow().chart.is_empty());
    assert!(session.borrow().notices.current().is_none());
}

#[test]
fn overlapping_previews_apply_only_the_latest_issue() {
    let session = verified_session();
    let (older_tx, older_rx) = oneshot::channel();
    let (newer_tx, newer_rx) = oneshot::channel();
    let client = Rc::new(GatedClient {
        calculate_gates: RefCell::new(VecDeque::from([older_rx, newer_rx])),
    });

    let mut pool = LocalPool::new();

    // First window elapses and its call goes out.
    let g1 = session.borrow_mut().note_parameter_edit();
    pool.spawner()
        .spawn_local(run_preview(
            session.clone(),
            client.clone(),
            ControlForm::default(),
            g1,
        ))
        .unwrap();
    pool.run_until_stalled();

    // Second window elapses while the first call is still pending.
    let g2 = session.borrow_mut().note_parameter_edit();
    pool.spawner()
        .spawn_local(run_preview(
            session.clone(),
            client.clone(),
            ControlForm::default(),
            g2,
        ))
        .unwrap();
    pool.run_until_stalled();

    // Newer response lands first, then the superseded one.
    newer_tx.send(Ok(result_with_gain(2.0))).unwrap();
    pool.run_until_stalled();
    older_tx.send(Ok(result_with_gain(1.0))).unwrap();
    pool.run();

    assert_eq!(session.borrow().chart.series()[0], vec![2.0]);
}

#[test]
fn sweep_republishes_results_as_three_series() {
    let session = verified_session();
    let client = ScriptedClient::default();
    client.sweep_responses.borrow_mut().push_back(Ok(SweepResult {
        parameter_values: vec![0.1, 0.2, 0.3],
        parameter_name: "current_h".into(),
        results: vec![
            result_with_gain(10.0),
            result_with_gain(20.0),
            result_with_gain(30.0),
        ],
    }));

    assert!(session.borrow_mut().begin_sweep());
    let request = SweepRequest {
        parameter_name: "current_h".into(),
        start_value: 0.1,
        end_value: 0.3,
        steps: 3,
        base_request: build_calculation_request(&ControlForm::default()),
    };
    let outcome = futures::executor::block_on(client.sweep(&request));
    let applied = session.borrow_mut().resolve_sweep(outcome);

    assert!(applied);
    let session = session.borrow();
    assert_eq!(session.chart.labels(), &[0.1, 0.2, 0.3]);
    assert_eq!(session.chart.series()[0], vec![10.0, 20.0, 30.0]);
    assert_eq!(session.chart.title(), "Parameter Sweep: current_h");
    assert_eq!(session.chart.x_axis_label(), "CURRENT H");
}

#[test]
fn failed_sweep_reports_detail_once_and_preserves_chart() {
    let session = verified_session();
    let client = ScriptedClient::default();
    client
        .sweep_responses
        .borrow_mut()
        .push_back(Err(ApiError::Upstream {
            status: 400,
            detail: "bad range".into(),
        }));

    let chart_before = session.borrow().chart.clone();
    assert!(session.borrow_mut().begin_sweep());
    let request = SweepRequest {
        parameter_name: "beta_0".into(),
        start_value: 5.0,
        end_value: 0.1,
        steps: 3,
        base_request: build_calculation_request(&ControlForm::default()),
    };
    let outcome = futures::executor::block_on(client.sweep(&request));
    let applied = session.borrow_mut().resolve_sweep(outcome);

    assert!(!applied);
    let session = session.borrow();
    assert_eq!(session.chart, chart_before);
    let notice = session.notices.current().expect("one visible notice");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.message.contains("bad range"));
    assert!(!session.sweep_busy);
}

#[test]
fn failed_preview_under_identical_conditions_stays_silent() {
    let session = verified_session();
    let client = Rc::new(ScriptedClient::default());
    client
        .calculate_responses
        .borrow_mut()
        .push_back(Err(ApiError::Upstream {
            status: 400,
            detail: "bad range".into(),
        }));

    let generation = session.borrow_mut().note_parameter_edit();
    let mut pool = LocalPool::new();
    pool.spawner()
        .spawn_local(run_preview(
            session.clone(),
            client.clone(),
            ControlForm::default(),
            generation,
        ))
        .unwrap();
    pool.run();

    assert_eq!(client.calculate_calls.get(), 1);
    assert!(session.borrow().notices.current().is_none());
    assert!(session.borrow().chart.is_empty());
}

#[test]
fn verification_outcome_is_whichever_resolves_last() {
    let session = verified_session();
    session
        .borrow_mut()
        .set_credential(CredentialField::Key, "rotated".into());

    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    let client = Rc::new(GatedClient {
        calculate_gates: RefCell::new(VecDeque::from([first_rx, second_rx])),
    });

    async fn run_verify(session: Rc<RefCell<Session>>, client: Rc<GatedClient>) {
        let probe = session.borrow_mut().begin_verify();
        if let Some(probe) = probe {
            let outcome = client.calculate(&probe).await.map(|_| ());
            session.borrow_mut().resolve_verify(outcome);
        }
    }

    let mut pool = LocalPool::new();
    pool.spawner()
        .spawn_local(run_verify(session.clone(), client.clone()))
        .unwrap();
    pool.spawner()
        .spawn_local(run_verify(session.clone(), client.clone()))
        .unwrap();
    pool.run_until_stalled();

    // The second call fails first; the first call succeeds later.
    second_tx
        .send(Err(ApiError::Upstream {
            status: 401,
            detail: "bad key".into(),
        }))
        .unwrap();
    pool.run_until_stalled();
    first_tx.send(Ok(result_with_gain(1.0))).unwrap();
    pool.run();

    assert!(session.borrow().connection.is_verified());
}
