use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: Option<PrometheusHandle>,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and describe the series.
    /// If another recorder already owns the process, `/metrics` renders nothing.
    pub fn init() -> Self {
        let handle = HANDLE
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(h) => {
                    describe_series();
                    Some(h)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "prometheus recorder not installed");
                    None
                }
            })
            .clone();
        Self { handle }
    }

    pub fn render(&self) -> String {
        self.handle.as_ref().map(|h| h.render()).unwrap_or_default()
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let m = self.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let m = m.clone();
                async move { m.render() }
            }),
        )
    }
}

fn describe_series() {
    describe_counter!("digest_requests_total", "Requests handled, by endpoint.");
    describe_counter!("digest_feed_errors_total", "Feed fetch failures.");
    describe_counter!(
        "digest_completion_calls_total",
        "Calls made to the completion backend, by provider."
    );
    describe_counter!(
        "digest_no_content_total",
        "Completions that returned no usable candidate."
    );
    describe_counter!(
        "digest_interpretation_errors_total",
        "Model responses that could not be mapped to the expected shape."
    );
    describe_histogram!("digest_completion_ms", "Completion latency in milliseconds.");
}
