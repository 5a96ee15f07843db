use log::{debug, trace, warn};
use std::time::{Duration, Instant};

/// Initialize logging with a level taken from `PCM_PIPELINE_LOG_LEVEL`
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let log_level =
        std::env::var("PCM_PIPELINE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let mut builder = env_logger::Builder::new();

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "[{}] [{}:{}] {}",
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args()
        )
    });

    match log_level.to_lowercase().as_str() {
        "trace" => builder.filter_level(log::LevelFilter::Trace),
        "debug" => builder.filter_level(log::LevelFilter::Debug),
        "info" => builder.filter_level(log::LevelFilter::Info),
        "warn" => builder.filter_level(log::LevelFilter::Warn),
        "error" => builder.filter_level(log::LevelFilter::Error),
        _ => builder.filter_level(log::LevelFilter::Info),
    };

    builder.try_init()?;
    Ok(())
}

/// Timer utility for measuring operation durations
pub struct OperationTimer {
    start_time: Instant,
    operation_name: String,
}

impl OperationTimer {
    pub fn new(operation_name: String) -> Self {
        trace!("Starting operation: {}", operation_name);
        Self {
            start_time: Instant::now(),
            operation_name,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn finish(self) -> Duration {
        let duration = self.elapsed();
        trace!(
            "Completed operation '{}' in {:.2}ms",
            self.operation_name,
            duration.as_millis()
        );
        duration
    }

    pub fn finish_with_threshold(self, threshold: Duration) -> Duration {
        let duration = self.elapsed();
        if duration > threshold {
            warn!(
                "Operation '{}' took {:.2}ms (threshold: {:.2}ms)",
                self.operation_name,
                duration.as_millis(),
                threshold.as_millis()
            );
        } else {
            debug!(
                "Completed operation '{}' in {:.2}ms",
                self.operation_name,
                duration.as_millis()
            );
        }
        duration
    }
}
