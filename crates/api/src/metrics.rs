use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    single_requests: AtomicUsize,
    batch_requests: AtomicUsize,

    // Timing (in microseconds)
    total_single_time_us: AtomicU64,
    total_batch_time_us: AtomicU64,

    // Batch images
    images_attempted: AtomicUsize,
    images_succeeded: AtomicUsize,
    images_skipped: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            single_requests: AtomicUsize::new(0),
            batch_requests: AtomicUsize::new(0),
            total_single_time_us: AtomicU64::new(0),
            total_batch_time_us: AtomicU64::new(0),
            images_attempted: AtomicUsize::new(0),
            images_succeeded: AtomicUsize::new(0),
            images_skipped: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_single(&self, duration: Duration) {
        self.single_requests.fetch_add(1, Ordering::Relaxed);
        self.total_single_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_batch(&self, duration: Duration) {
        self.batch_requests.fetch_add(1, Ordering::Relaxed);
        self.total_batch_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_images(&self, attempted: usize, succeeded: usize, skipped: usize) {
        self.images_attempted.fetch_add(attempted, Ordering::Relaxed);
        self.images_succeeded.fetch_add(succeeded, Ordering::Relaxed);
        self.images_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            single_requests: self.single_requests.load(Ordering::Relaxed),
            batch_requests: self.batch_requests.load(Ordering::Relaxed),
            avg_single_time_ms: self.avg_time_ms(&self.total_single_time_us, &self.single_requests),
            avg_batch_time_ms: self.avg_time_ms(&self.total_batch_time_us, &self.batch_requests),
            images_attempted: self.images_attempted.load(Ordering::Relaxed),
            images_succeeded: self.images_succeeded.load(Ordering::Relaxed),
            images_skipped: self.images_skipped.load(Ordering::Relaxed),
        }
    }

    fn avg_time_ms(&self, total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
        let total = total_us.load(Ordering::Relaxed) as f64;
        let cnt = count.load(Ordering::Relaxed) as f64;
        if cnt > 0.0 {
            total / cnt / 1000.0 // Convert to ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub single_requests: usize,
    pub batch_requests: usize,
    pub avg_single_time_ms: f64,
    pub avg_batch_time_ms: f64,
    pub images_attempted: usize,
    pub images_succeeded: usize,
    pub images_skipped: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
