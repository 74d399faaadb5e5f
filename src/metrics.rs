//! Transfer-rate computation and formatting.
//!
//! Rates are reported in MB/s and Mb/s, with 1 MB = 1024 * 1024 bytes and
//! bits = 8 * bytes. Interim samples are recomputed every time the
//! one-second reporting threshold is crossed and never persisted.

use std::time::Duration;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// How much wall-clock time must pass between interim rate reports.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// One rate observation: bytes moved over an elapsed interval.
#[derive(Debug, Clone, Copy)]
pub struct RateSample {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl RateSample {
    pub fn new(bytes: u64, elapsed: Duration) -> Self {
        Self { bytes, elapsed }
    }

    /// Megabytes per second over the sampled interval.
    pub fn mb_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes as f64 / secs / BYTES_PER_MB
    }

    /// Megabits per second over the sampled interval.
    pub fn mbit_per_sec(&self) -> f64 {
        8.0 * self.mb_per_sec()
    }
}

/// Render an interim rate line.
pub fn format_interim(sample: &RateSample) -> String {
    format!(
        "{:9.3} MB/sec ({:.3} Mb/sec)",
        sample.mb_per_sec(),
        sample.mbit_per_sec()
    )
}

/// Render the client's final average line, including how many times the
/// receive loop polled the clock.
pub fn format_final_average(sample: &RateSample, timer_calls: u64) -> String {
    format!(
        "{:8.3} MB/sec ({:.3} Mb/sec) final average; {} timer calls",
        sample.mb_per_sec(),
        sample.mbit_per_sec(),
        timer_calls
    )
}

/// Render the server's end-of-session summary.
pub fn format_session_total(sample: &RateSample) -> String {
    format!(
        "Sent {} bytes in {:.3} secs for {:.3} MB/sec ({:.3} Mb/sec)",
        sample.bytes,
        sample.elapsed.as_secs_f64(),
        sample.mb_per_sec(),
        sample.mbit_per_sec()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_math_uses_binary_megabytes() {
        let sample = RateSample::new(2 * 1024 * 1024, Duration::from_secs(1));
        assert!((sample.mb_per_sec() - 2.0).abs() < 1e-9);
        assert!((sample.mbit_per_sec() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_over_fractional_interval() {
        let sample = RateSample::new(1024 * 1024, Duration::from_millis(500));
        assert!((sample.mb_per_sec() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_is_zero_rate() {
        let sample = RateSample::new(1024, Duration::ZERO);
        assert_eq!(sample.mb_per_sec(), 0.0);
        assert_eq!(sample.mbit_per_sec(), 0.0);
    }

    #[test]
    fn test_session_total_line() {
        let sample = RateSample::new(1024 * 1024, Duration::from_secs(2));
        let line = format_session_total(&sample);
        assert!(line.starts_with("Sent 1048576 bytes in 2.000 secs"));
        assert!(line.contains("0.500 MB/sec"));
        assert!(line.contains("4.000 Mb/sec"));
    }

    #[test]
    fn test_final_average_line_mentions_timer_calls() {
        let sample = RateSample::new(0, Duration::from_secs(1));
        let line = format_final_average(&sample, 42);
        assert!(line.ends_with("42 timer calls"));
    }
}
