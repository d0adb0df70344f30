use crate::domain::model::{Endpoint, WaitReport};
use crate::domain::ports::Probe;
use crate::utils::error::{EntrypointError, Result};
use std::time::{Duration, Instant};

const LOG_EVERY_ATTEMPTS: u32 = 10;

/// Blocks until `endpoint` accepts a connection.
///
/// Without a timeout the wait is unbounded: if the endpoint never comes up, `wait`
/// never returns.
pub struct ReadinessGate<P: Probe> {
    probe: P,
    endpoint: Endpoint,
    interval: Duration,
    timeout: Option<Duration>,
}

impl<P: Probe> ReadinessGate<P> {
    pub fn new(probe: P, endpoint: Endpoint, interval: Duration) -> Self {
        Self {
            probe,
            endpoint,
            interval,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub async fn wait(&self) -> Result<WaitReport> {
        let start = Instant::now();
        let mut attempts: u32 = 0;

        tracing::info!("⏳ Waiting for {} to accept connections", self.endpoint);

        loop {
            attempts = attempts.saturating_add(1);

            match self.probe.probe(&self.endpoint).await {
                Ok(()) => {
                    let elapsed = start.elapsed();
                    tracing::info!(
                        "✅ {} is ready after {} attempt(s) ({:?})",
                        self.endpoint,
                        attempts,
                        elapsed
                    );
                    return Ok(WaitReport {
                        endpoint: self.endpoint.clone(),
                        attempts,
                        elapsed,
                    });
                }
                Err(e) if attempts == 1 || attempts % LOG_EVERY_ATTEMPTS == 0 => {
                    tracing::info!(
                        "{} not ready yet (attempt {}): {}",
                        self.endpoint,
                        attempts,
                        e
                    );
                }
                Err(e) => {
                    tracing::debug!("attempt {} against {} failed: {}", attempts, self.endpoint, e);
                }
            }

            if let Some(timeout) = self.timeout {
                let waited = start.elapsed();
                if waited + self.interval > timeout {
                    return Err(EntrypointError::ReadinessTimeout {
                        endpoint: self.endpoint.to_string(),
                        attempts,
                        waited,
                    });
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Fails until `ready_after` attempts have been made.
    struct CountingProbe {
        calls: Arc<AtomicU32>,
        ready_after: u32,
    }

    #[async_trait]
    impl Probe for CountingProbe {
        async fn probe(&self, _endpoint: &Endpoint) -> std::io::Result<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.ready_after {
                Ok(())
            } else {
                Err(std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
            }
        }
    }

    #[tokio::test]
    async fn test_wait_returns_after_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let gate = ReadinessGate::new(
            CountingProbe {
                calls: calls.clone(),
                ready_after: 3,
            },
            Endpoint::new("db", 5432),
            Duration::from_millis(5),
        );

        let report = gate.wait().await.unwrap();
        assert_eq!(report.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.endpoint, Endpoint::new("db", 5432));
    }

    #[tokio::test]
    async fn test_wait_times_out_when_bounded() {
        let gate = ReadinessGate::new(
            CountingProbe {
                calls: Arc::new(AtomicU32::new(0)),
                ready_after: u32::MAX,
            },
            Endpoint::new("db", 5432),
            Duration::from_millis(10),
        )
        .with_timeout(Some(Duration::from_millis(50)));

        match gate.wait().await {
            Err(EntrypointError::ReadinessTimeout { attempts, .. }) => assert!(attempts >= 1),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_immediately_ready_endpoint() {
        let gate = ReadinessGate::new(
            CountingProbe {
                calls: Arc::new(AtomicU32::new(0)),
                ready_after: 1,
            },
            Endpoint::new("localhost", 1),
            Duration::from_secs(60),
        );

        let report = tokio_test::block_on(gate.wait()).unwrap();
        assert_eq!(report.attempts, 1);
    }
}
