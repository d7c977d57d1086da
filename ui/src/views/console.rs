//! The operator console: credentials, parameter form, chart, results
//! grid, and the sweep dialog.
//!
//! All state transitions run through one coroutine owning the
//! [`Session`]; spawned futures only sleep or perform a network call and
//! then report back as events. Timers carry the generation or notice id
//! they were scheduled for, so a stale timer is recognized and ignored
//! when it finally fires.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use dioxus::prelude::*;
use futures_channel::mpsc::UnboundedSender;
use futures_util::StreamExt;

use crate::components::LineChart;
use crate::core::api::{
    self, ApiClient, ApiError, CalculationResult, SweepResult, UpstreamClient,
};
use crate::core::credentials::CredentialField;
use crate::core::format;
use crate::core::notify::NoticeKind;
use crate::core::request::{
    build_calculation_request, build_sweep_request, ControlForm, SweepForm, SweepParameter,
    STEPS_MAX, STEPS_MIN,
};
use crate::core::schedule::{NOTICE_DISMISS_MS, PREVIEW_DEBOUNCE_MS};
use crate::core::session::Session;
use crate::core::{platform, timing};

type SenderSlot = Rc<RefCell<Option<UnboundedSender<ConsoleEvent>>>>;

#[derive(Debug)]
enum ConsoleEvent {
    CredentialEdited {
        field: CredentialField,
        value: String,
    },
    VerifyRequested,
    VerifyResolved(Result<(), ApiError>),
    ParameterEdited,
    PreviewDue {
        generation: u64,
    },
    PreviewResolved {
        seq: u64,
        outcome: Result<CalculationResult, ApiError>,
    },
    CalculateRequested,
    CalculateResolved(Result<CalculationResult, ApiError>),
    SweepRequested,
    SweepResolved(Result<SweepResult, ApiError>),
    NoticeExpired {
        id: u64,
    },
}

#[component]
pub fn Console() -> Element {
    let session = use_signal(Session::new);
    let form = use_signal(ControlForm::default);
    let sweep_form = use_signal(SweepForm::default);
    let mut sweep_open = use_signal(|| false);
    let last_result = use_signal(|| Option::<CalculationResult>::None);
    let backend = use_hook(api::backend_base);

    let sender_slot: SenderSlot = Rc::new(RefCell::new(None));
    let sender_slot_for_loop = sender_slot.clone();

    let tx = {
        let backend = backend.clone();
        let mut session_signal = session.clone();
        let form_signal = form.clone();
        let sweep_form_signal = sweep_form.clone();
        let mut sweep_open_signal = sweep_open.clone();
        let mut last_result_signal = last_result.clone();

        use_coroutine(move |mut rx: UnboundedReceiver<ConsoleEvent>| {
            let sender_slot = sender_slot_for_loop.clone();
            let backend = backend.clone();

            async move {
                // Highest notice id an expiry timer was queued for.
                let mut dismiss_queued_through = 0u64;

                while let Some(event) = rx.next().await {
                    match event {
                        ConsoleEvent::CredentialEdited { field, value } => {
                            session_signal.with_mut(|s| s.set_credential(field, value));
                        }
                        ConsoleEvent::VerifyRequested => {
                            let probe = session_signal.with_mut(|s| s.begin_verify());
                            if let Some(probe) = probe {
                                let client = upstream(&backend, &session_signal);
                                queue_call(
                                    sender_slot.clone(),
                                    async move { client.calculate(&probe).await.map(|_| ()) },
                                    ConsoleEvent::VerifyResolved,
                                );
                            }
                        }
                        ConsoleEvent::VerifyResolved(outcome) => {
                            session_signal.with_mut(|s| s.resolve_verify(outcome));
                        }
                        ConsoleEvent::ParameterEdited => {
                            let generation =
                                session_signal.with_mut(|s| s.note_parameter_edit());
                            queue_after(
                                sender_slot.clone(),
                                PREVIEW_DEBOUNCE_MS,
                                ConsoleEvent::PreviewDue { generation },
                            );
                        }
                        ConsoleEvent::PreviewDue { generation } => {
                            let ticket =
                                session_signal.with_mut(|s| s.preview_ticket(generation));
                            if let Some(seq) = ticket {
                                let request = build_calculation_request(&form_signal());
                                let client = upstream(&backend, &session_signal);
                                queue_call(
                                    sender_slot.clone(),
                                    async move { client.calculate(&request).await },
                                    move |outcome| ConsoleEvent::PreviewResolved {
                                        seq,
                                        outcome,
                                    },
                                );
                            }
                        }
                        ConsoleEvent::PreviewResolved { seq, outcome } => match outcome {
                            Ok(result) => {
                                session_signal.with_mut(|s| s.apply_preview(seq, &result));
                            }
                            // Preview runs as a side effect of typing;
                            // failures are logged, never shown.
                            Err(err) => {
                                platform::log_error("preview update failed", &err.to_string())
                            }
                        },
                        ConsoleEvent::CalculateRequested => {
                            if session_signal.with_mut(|s| s.begin_calculate()) {
                                let request = build_calculation_request(&form_signal());
                                let client = upstream(&backend, &session_signal);
                                queue_call(
                                    sender_slot.clone(),
                                    async move { client.calculate(&request).await },
                                    ConsoleEvent::CalculateResolved,
                                );
                            }
                        }
                        ConsoleEvent::CalculateResolved(outcome) => {
                            let applied =
                                session_signal.with_mut(|s| s.resolve_calculate(outcome));
                            if let Some(result) = applied {
                                last_result_signal.set(Some(result));
                            }
                        }
                        ConsoleEvent::SweepRequested => {
                            if session_signal.with_mut(|s| s.begin_sweep()) {
                                let request =
                                    build_sweep_request(&sweep_form_signal(), &form_signal());
                                let client = upstream(&backend, &session_signal);
                                queue_call(
                                    sender_slot.clone(),
                                    async move { client.sweep(&request).await },
                                    ConsoleEvent::SweepResolved,
                                );
                            }
                        }
                        ConsoleEvent::SweepResolved(outcome) => {
                            if session_signal.with_mut(|s| s.resolve_sweep(outcome)) {
                                sweep_open_signal.set(false);
                            }
                        }
                        ConsoleEvent::NoticeExpired { id } => {
                            session_signal.with_mut(|s| s.notices.expire(id));
                        }
                    }

                    // Any event may have posted a banner; queue one
                    // dismissal timer per notice id.
                    let visible = session_signal.with(|s| s.notices.current().map(|n| n.id));
                    if let Some(id) = visible {
                        if id > dismiss_queued_through {
                            dismiss_queued_through = id;
                            queue_after(
                                sender_slot.clone(),
                                NOTICE_DISMISS_MS,
                                ConsoleEvent::NoticeExpired { id },
                            );
                        }
                    }
                }
            }
        })
    };

    sender_slot.borrow_mut().replace(tx.tx());

    let snapshot = session();
    let status_class = match snapshot.connection {
        c if c.is_verified() => "status-indicator status-indicator--connected",
        _ => "status-indicator status-indicator--disconnected",
    };
    let form_now = form();
    let sweep_now = sweep_form();
    let bounds = sweep_now.parameter.bounds();
    let result_now = last_result();
    let notice = snapshot.notices.current().map(|notice| {
        let class = match notice.kind {
            NoticeKind::Success => "console__notice console__notice--success",
            NoticeKind::Error => "console__notice console__notice--error",
        };
        (class, notice.message.clone())
    });

    rsx! {
        section {
            class: "console",
            tabindex: 0,
            onkeydown: move |evt| {
                if evt.key() == Key::Escape {
                    sweep_open.set(false);
                }
                if evt.modifiers().ctrl() && evt.key() == Key::Enter {
                    tx.send(ConsoleEvent::CalculateRequested);
                }
            },

            header { class: "console__header",
                h1 { "Adaptive Control Console" }
                p { "Drive the remote adaptive-control calculation service and chart its response." }
            }

            if let Some((notice_class, notice_message)) = notice {
                div { class: notice_class, "{notice_message}" }
            }

            div { class: "card card--credentials",
                h2 { "Upstream credentials" }
                div { class: "field-grid",
                    label { "Endpoint URL"
                        input {
                            r#type: "text",
                            value: "{snapshot.credentials.endpoint}",
                            placeholder: "https://service.example.com",
                            oninput: move |evt| tx.send(ConsoleEvent::CredentialEdited {
                                field: CredentialField::Endpoint,
                                value: evt.value(),
                            }),
                        }
                    }
                    label { "API key"
                        input {
                            r#type: "password",
                            value: "{snapshot.credentials.key}",
                            oninput: move |evt| tx.send(ConsoleEvent::CredentialEdited {
                                field: CredentialField::Key,
                                value: evt.value(),
                            }),
                        }
                    }
                    label { "Host header"
                        input {
                            r#type: "text",
                            value: "{snapshot.credentials.host}",
                            placeholder: "service.example.com",
                            oninput: move |evt| tx.send(ConsoleEvent::CredentialEdited {
                                field: CredentialField::Host,
                                value: evt.value(),
                            }),
                        }
                    }
                }
                div { class: "card__actions",
                    button {
                        r#type: "button",
                        onclick: move |_| tx.send(ConsoleEvent::VerifyRequested),
                        "Connect"
                    }
                    span { class: status_class, "{snapshot.connection.status_message()}" }
                }
            }

            div { class: "card card--parameters",
                h2 { "Calculation parameters" }
                div { class: "field-grid",
                    ParameterInput {
                        label: "Current H",
                        value: form_now.current_h.clone(),
                        on_change: make_parameter_setter(form, tx, |f, v| f.current_h = v),
                    }
                    ParameterInput {
                        label: "Previous H (optional)",
                        value: form_now.previous_h.clone(),
                        on_change: make_parameter_setter(form, tx, |f, v| f.previous_h = v),
                    }
                    ParameterInput {
                        label: "Beta 0",
                        value: form_now.beta_0.clone(),
                        on_change: make_parameter_setter(form, tx, |f, v| f.beta_0 = v),
                    }
                    ParameterInput {
                        label: "Lambda Factor",
                        value: form_now.lambda_factor.clone(),
                        on_change: make_parameter_setter(form, tx, |f, v| f.lambda_factor = v),
                    }
                    ParameterInput {
                        label: "Epsilon",
                        value: form_now.epsilon.clone(),
                        on_change: make_parameter_setter(form, tx, |f, v| f.epsilon = v),
                    }
                    ParameterInput {
                        label: "Alpha Param",
                        value: form_now.alpha_param.clone(),
                        on_change: make_parameter_setter(form, tx, |f, v| f.alpha_param = v),
                    }
                    ParameterInput {
                        label: "Gamma Param",
                        value: form_now.gamma_param.clone(),
                        on_change: make_parameter_setter(form, tx, |f, v| f.gamma_param = v),
                    }
                    ParameterInput {
                        label: "System ID (optional)",
                        value: form_now.system_id.clone(),
                        on_change: make_parameter_setter(form, tx, |f, v| f.system_id = v),
                    }
                }
                label { class: "field-wide", "Base output (comma-separated)"
                    textarea {
                        value: "{form_now.base_output}",
                        oninput: make_parameter_setter(form, tx, |f, v| f.base_output = v),
                    }
                }
                label { class: "field-wide", "Output labels (comma-separated, optional)"
                    textarea {
                        value: "{form_now.output_labels}",
                        oninput: make_parameter_setter(form, tx, |f, v| f.output_labels = v),
                    }
                }
                div { class: "card__actions",
                    button {
                        r#type: "button",
                        disabled: snapshot.calculate_busy,
                        onclick: move |_| tx.send(ConsoleEvent::CalculateRequested),
                        if snapshot.calculate_busy { "Calculating…" } else { "Calculate" }
                    }
                    button {
                        r#type: "button",
                        onclick: move |_| sweep_open.set(true),
                        "Parameter sweep…"
                    }
                }
            }

            div { class: "card card--chart",
                LineChart { model: snapshot.chart.clone() }
            }

            if let Some(result) = result_now {
                ResultsGrid { result }
            }

            if sweep_open() {
                div {
                    class: "modal-overlay",
                    onclick: move |_| sweep_open.set(false),
                    div {
                        class: "modal",
                        onclick: move |evt| evt.stop_propagation(),
                        h2 { "Parameter sweep" }
                        label { "Parameter"
                            select {
                                onchange: {
                                    let mut sweep_form = sweep_form.clone();
                                    move |evt: Event<FormData>| {
                                        if let Some(parameter) =
                                            SweepParameter::from_wire_name(&evt.value())
                                        {
                                            sweep_form.set(SweepForm::for_parameter(parameter));
                                        }
                                    }
                                },
                                for parameter in SweepParameter::ALL {
                                    option {
                                        value: parameter.wire_name(),
                                        selected: parameter == sweep_now.parameter,
                                        "{parameter.label()}"
                                    }
                                }
                            }
                        }
                        div { class: "field-grid",
                            label { "Start value"
                                input {
                                    r#type: "number",
                                    min: bounds.min,
                                    max: bounds.max,
                                    step: bounds.step,
                                    value: "{sweep_now.start_value}",
                                    oninput: {
                                        let mut sweep_form = sweep_form.clone();
                                        move |evt: Event<FormData>| {
                                            sweep_form.with_mut(|f| f.start_value = evt.value());
                                        }
                                    },
                                }
                            }
                            label { "End value"
                                input {
                                    r#type: "number",
                                    min: bounds.min,
                                    max: bounds.max,
                                    step: bounds.step,
                                    value: "{sweep_now.end_value}",
                                    oninput: {
                                        let mut sweep_form = sweep_form.clone();
                                        move |evt: Event<FormData>| {
                                            sweep_form.with_mut(|f| f.end_value = evt.value());
                                        }
                                    },
                                }
                            }
                            label { "Steps"
                                input {
                                    r#type: "number",
                                    min: STEPS_MIN as f64,
                                    max: STEPS_MAX as f64,
                                    value: "{sweep_now.steps}",
                                    oninput: {
                                        let mut sweep_form = sweep_form.clone();
                                        move |evt: Event<FormData>| {
                                            sweep_form.with_mut(|f| f.steps = evt.value());
                                        }
                                    },
                                }
                            }
                        }
                        div { class: "card__actions",
                            button {
                                r#type: "button",
                                disabled: snapshot.sweep_busy,
                                onclick: move |_| tx.send(ConsoleEvent::SweepRequested),
                                if snapshot.sweep_busy { "Generating…" } else { "Generate sweep" }
                            }
                            button {
                                r#type: "button",
                                onclick: move |_| sweep_open.set(false),
                                "Cancel"
                            }
                        }
                    }
                }
            }
        }
    }
}

/// One labelled text input feeding the debounced preview.
#[component]
fn ParameterInput(
    label: &'static str,
    value: String,
    on_change: EventHandler<Event<FormData>>,
) -> Element {
    rsx! {
        label { "{label}"
            input {
                r#type: "text",
                value: "{value}",
                oninput: move |evt| on_change.call(evt),
            }
        }
    }
}

#[component]
fn ResultsGrid(result: CalculationResult) -> Element {
    let scalar_fields = [
        ("H Value", format::format_value(result.h_value)),
        ("Delta H", format::format_value(result.delta_h)),
        (
            "Processing Factor",
            format::format_value(result.processing_factor),
        ),
        (
            "Control Parameter",
            format::format_value(result.control_parameter),
        ),
        ("Output Gain", format::format_value(result.output_gain)),
        ("Timestamp", result.timestamp.to_string()),
    ];

    rsx! {
        div { class: "card card--results",
            h2 { "Latest calculation" }
            div { class: "results-grid",
                for (label, value) in scalar_fields {
                    div { class: "result-item",
                        h4 { "{label}" }
                        div { class: "result-item__value", "{value}" }
                    }
                }
                if let Some(processed) = result.processed_output.as_ref() {
                    div { class: "result-item result-item--wide",
                        h4 { "Processed Output Array" }
                        div { class: "result-item__value", {format::format_array(processed)} }
                    }
                }
                if let Some(mapping) = result.output_mapping.as_ref() {
                    div { class: "result-item result-item--wide",
                        h4 { "Output Mapping" }
                        div { class: "result-item__value result-item__value--list",
                            for (label, value) in mapping.iter() {
                                div { {format::format_mapping_entry(label, *value)} }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Shared handler shape for parameter inputs: write the raw text into
/// the form, then restart the preview debounce window.
fn make_parameter_setter(
    mut form: Signal<ControlForm>,
    tx: Coroutine<ConsoleEvent>,
    write: fn(&mut ControlForm, String),
) -> impl FnMut(Event<FormData>) + 'static {
    move |evt: Event<FormData>| {
        form.with_mut(|f| write(f, evt.value()));
        tx.send(ConsoleEvent::ParameterEdited);
    }
}

fn upstream(backend: &str, session: &Signal<Session>) -> UpstreamClient {
    UpstreamClient::new(backend.to_string(), session.with(|s| s.credentials.clone()))
}

/// Fire an event after a delay. The timer is never cancelled; the
/// receiving handler decides whether the payload is still current.
fn queue_after(sender_slot: SenderSlot, delay_ms: u64, event: ConsoleEvent) {
    if let Some(sender) = sender_slot.borrow().as_ref().cloned() {
        platform::spawn_future(async move {
            timing::sleep_ms(delay_ms).await;
            let _ = sender.unbounded_send(event);
        });
    }
}

/// Run a network call off the event loop and feed the outcome back in.
fn queue_call<T, F, W>(sender_slot: SenderSlot, call: F, wrap: W)
where
    T: 'static,
    F: Future<Output = Result<T, ApiError>> + 'static,
    W: FnOnce(Result<T, ApiError>) -> ConsoleEvent + 'static,
{
    if let Some(sender) = sender_slot.borrow().as_ref().cloned() {
        platform::spawn_future(async move {
            let outcome = call.await;
            let _ = sender.unbounded_send(wrap(outcome));
        });
    }
}
