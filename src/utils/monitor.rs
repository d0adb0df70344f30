use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: String,
    pub elapsed: Duration,
}

/// Per-stage startup timings. Recording is always on; logging only when enabled.
pub struct StartupMonitor {
    start_time: Instant,
    last_mark: Mutex<Instant>,
    stages: Mutex<Vec<StageTiming>>,
    enabled: bool,
}

impl StartupMonitor {
    pub fn new(enabled: bool) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_mark: Mutex::new(now),
            stages: Mutex::new(Vec::new()),
            enabled,
        }
    }

    /// Closes the stage that started at the previous mark.
    pub fn record(&self, stage: &str) {
        let now = Instant::now();
        let elapsed = match self.last_mark.lock() {
            Ok(mut last) => {
                let elapsed = now.duration_since(*last);
                *last = now;
                elapsed
            }
            Err(_) => return,
        };

        if let Ok(mut stages) = self.stages.lock() {
            stages.push(StageTiming {
                stage: stage.to_string(),
                elapsed,
            });
        }

        if self.enabled {
            tracing::info!("📊 {} took {:?}", stage, elapsed);
        }
    }

    pub fn stages(&self) -> Vec<StageTiming> {
        self.stages
            .lock()
            .map(|stages| stages.clone())
            .unwrap_or_default()
    }

    pub fn log_final_stats(&self) {
        if self.enabled {
            let summary: Vec<String> = self
                .stages()
                .iter()
                .map(|t| format!("{}={:?}", t.stage, t.elapsed))
                .collect();
            tracing::info!(
                "📊 Startup took {:?} before handoff [{}]",
                self.start_time.elapsed(),
                summary.join(", ")
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for StartupMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_stages_in_order() {
        let monitor = StartupMonitor::new(false);
        monitor.record("wait");
        monitor.record("migrate");

        let stages: Vec<_> = monitor.stages().into_iter().map(|t| t.stage).collect();
        assert_eq!(stages, vec!["wait", "migrate"]);
        assert!(!monitor.is_enabled());
    }
}
