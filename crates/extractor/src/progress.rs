use std::sync::Arc;

/// Receives extraction progress as a fraction in `[0.0, 1.0]`.
///
/// Reports arrive synchronously from the thread doing the copying, so
/// implementations should return quickly. Any `Fn(f64) + Send + Sync`
/// closure is a progress sink.
pub trait Progress {
    fn report(&self, fraction: f64);
}
impl<F> Progress for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

/// Shared progress sink, cheap to clone into a worker thread.
pub type ProgressHandle = Arc<dyn Progress + Send + Sync>;

/// Turns copied byte counts into fractions of a fixed total.
pub(crate) struct Tracker<'a> {
    sink: Option<&'a (dyn Progress + Send + Sync)>,
    total: u64,
    copied: u64,
    last: f64,
}

impl<'a> Tracker<'a> {
    pub(crate) fn new(sink: Option<&'a (dyn Progress + Send + Sync)>, total: u64) -> Self {
        Self { sink, total, copied: 0, last: 0.0 }
    }

    pub(crate) fn advance(&mut self, bytes: u64) {
        self.copied = self.copied.saturating_add(bytes);
        if self.total == 0 {
            return;
        }
        // Entry headers can understate the real size.
        let fraction = (self.copied as f64 / self.total as f64).min(1.0);
        self.emit(fraction);
    }

    /// Report completion, unless completion was already reported.
    pub(crate) fn finish(&mut self) {
        if self.last < 1.0 {
            self.emit(1.0);
        }
    }

    fn emit(&mut self, fraction: f64) {
        self.last = fraction;
        if let Some(sink) = self.sink {
            sink.report(fraction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<f64>>>, ProgressHandle) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            Arc::new(move |f: f64| seen.lock().unwrap().push(f)) as ProgressHandle
        };
        (seen, sink)
    }

    #[test]
    fn test_fractions() {
        let (seen, sink) = recorder();
        let mut tracker = Tracker::new(Some(sink.as_ref()), 30);
        tracker.advance(10);
        tracker.advance(20);
        tracker.finish();
        assert_eq!(*seen.lock().unwrap(), vec![10.0 / 30.0, 1.0]);
    }

    #[test]
    fn test_clamped() {
        let (seen, sink) = recorder();
        let mut tracker = Tracker::new(Some(sink.as_ref()), 10);
        tracker.advance(25);
        tracker.finish();
        assert_eq!(*seen.lock().unwrap(), vec![1.0]);
    }

    #[test]
    fn test_empty_total_reports_once() {
        let (seen, sink) = recorder();
        let mut tracker = Tracker::new(Some(sink.as_ref()), 0);
        tracker.advance(0);
        tracker.finish();
        assert_eq!(*seen.lock().unwrap(), vec![1.0]);
    }

    #[test]
    fn test_without_sink() {
        let mut tracker = Tracker::new(None, 10);
        tracker.advance(5);
        tracker.finish();
    }
}
