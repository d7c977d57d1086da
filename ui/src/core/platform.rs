//! Platform glue: spawning detached futures and error logging.
//!
//! Preview failures are logged here and never surfaced; the banner is
//! reserved for explicit, operator-initiated actions.

use std::future::Future;

#[cfg(target_arch = "wasm32")]
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_future<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    tokio::task::spawn_local(future);
}

pub fn log_error(context: &str, detail: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::console::error_1(&format!("{context}: {detail}").into());
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        eprintln!("{context}: {detail}");
    }
}
