use crate::error::{AttemptError, FetchFailure};
use crate::http::{redact_url, HttpResponse, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};
use watch_archive_config::FetchConfig;

/// Body of a successful (HTTP 200) fetch.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub body: String,
    /// Attempts used, including the successful one
    pub attempts: u32,
}

impl Fetched {
    pub fn failed_attempts(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// GET with a bounded number of attempts and a fixed pause between them.
///
/// This is the only place network flakiness is absorbed. Anything other
/// than HTTP 200 counts as a failed attempt.
#[derive(Clone)]
pub struct ResilientFetcher {
    transport: Arc<dyn Transport>,
    max_attempts: u32,
    delay: Duration,
}

impl ResilientFetcher {
    pub fn new(transport: Arc<dyn Transport>, max_attempts: u32, delay: Duration) -> Self {
        Self {
            transport,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(transport: Arc<dyn Transport>, fetch: &FetchConfig) -> Self {
        Self::new(transport, fetch.max_attempts, fetch.retry_delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn fetch(&self, url: &str) -> Result<Fetched, FetchFailure> {
        let mut last_error = AttemptError::Transport("no attempt made".to_string());

        for attempt in 1..=self.max_attempts {
            trace!(url = %redact_url(url), attempt, "GET");
            match self.transport.get(url).await {
                Ok(HttpResponse { status: 200, body }) => {
                    return Ok(Fetched { body, attempts: attempt });
                }
                Ok(response) => last_error = AttemptError::Status(response.status),
                Err(err) => last_error = err,
            }

            warn!(
                url = %redact_url(url),
                attempt,
                max_attempts = self.max_attempts,
                cause = %last_error,
                "Attempt {} failed: {}",
                attempt,
                last_error
            );

            if attempt < self.max_attempts && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        Err(FetchFailure {
            url: redact_url(url),
            attempts: self.max_attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedTransport;

    fn fetcher(transport: Arc<ScriptedTransport>, attempts: u32) -> ResilientFetcher {
        ResilientFetcher::new(transport, attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let transport = Arc::new(ScriptedTransport::new().route_sequence(
            "example.com/flaky",
            vec![
                Ok(HttpResponse::with_status(500)),
                Ok(HttpResponse::with_status(500)),
                Ok(HttpResponse::ok("done")),
            ],
        ));

        let fetched = fetcher(transport.clone(), 3)
            .fetch("https://example.com/flaky")
            .await
            .unwrap();

        assert_eq!(fetched.text(), "done");
        assert_eq!(fetched.attempts, 3);
        assert_eq!(fetched.failed_attempts(), 2);
        assert_eq!(transport.call_count(), 3);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone();
            String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect()
        }
    }

    #[tokio::test]
    async fn test_each_failed_attempt_logs_one_warning() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        // The test runtime is single-threaded, so the thread-local default covers the fetch
        let _guard = tracing::subscriber::set_default(subscriber);

        let transport = Arc::new(ScriptedTransport::new().route_sequence(
            "example.com/flaky",
            vec![
                Ok(HttpResponse::with_status(500)),
                Ok(HttpResponse::with_status(500)),
                Ok(HttpResponse::ok("done")),
            ],
        ));
        let fetched = fetcher(transport, 3).fetch("https://example.com/flaky").await.unwrap();
        assert_eq!(fetched.text(), "done");

        let lines = logs.lines();
        assert_eq!(lines.len(), 2, "{:?}", lines);
        assert!(lines[0].contains("WARN"));
        assert!(lines[0].contains("Attempt 1 failed: HTTP status 500"));
        assert!(lines[1].contains("Attempt 2 failed: HTTP status 500"));
    }

    #[tokio::test]
    async fn test_exhausted_attempts_report_last_error() {
        let transport = Arc::new(ScriptedTransport::new().route_sequence(
            "example.com/down",
            vec![Err(AttemptError::Timeout), Ok(HttpResponse::with_status(503))],
        ));

        let failure = fetcher(transport.clone(), 3)
            .fetch("https://example.com/down")
            .await
            .unwrap_err();

        assert_eq!(failure.attempts, 3);
        assert_eq!(failure.last_error, AttemptError::Status(503));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_first_success_makes_single_call() {
        let transport = Arc::new(ScriptedTransport::new().route("example.com", 200, "ok"));
        let fetched = fetcher(transport.clone(), 3).fetch("https://example.com/").await.unwrap();
        assert_eq!(fetched.failed_attempts(), 0);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_200_success_codes_are_failures() {
        let transport = Arc::new(ScriptedTransport::new().route("example.com", 204, ""));
        let failure = fetcher(transport, 2).fetch("https://example.com/").await.unwrap_err();
        assert_eq!(failure.last_error, AttemptError::Status(204));
    }

    #[tokio::test]
    async fn test_zero_attempts_is_clamped_to_one() {
        let transport = Arc::new(ScriptedTransport::new());
        let fetcher = fetcher(transport.clone(), 0);
        assert_eq!(fetcher.max_attempts(), 1);
        assert!(fetcher.fetch("https://example.com/missing").await.is_err());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_url_is_redacted() {
        let transport = Arc::new(ScriptedTransport::new());
        let failure = fetcher(transport, 1)
            .fetch("http://www.omdbapi.com/?i=tt0078788&apikey=secret")
            .await
            .unwrap_err();
        assert!(!failure.url.contains("secret"));
        assert!(!failure.to_string().contains("secret"));
    }
}
