use tracing::debug;

use crate::types::AcknowledgedSet;

/// Callback invoked with `(percentage, phase_label)`.
///
/// `percentage` is in `[0, 100]`.
pub type ProgressCallback = Box<dyn FnMut(f64, &str) + Send>;

/// Forwards progress to an optional callback.
///
/// Values are never reported below one this reporter already reported, even
/// across [`set_callback`](Self::set_callback), and nothing is forwarded once
/// silenced.
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    last: f64,
    silenced: bool,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressCallback>) -> Self {
        Self {
            callback,
            last: 0.0,
            silenced: false,
        }
    }

    /// Reports an explicit percentage.
    pub fn report(&mut self, percentage: f64, phase: &str) {
        if self.silenced {
            return;
        }
        let percentage = percentage.clamp(0.0, 100.0);
        if percentage < self.last {
            debug!(
                last = self.last,
                percentage, "dropping regressive progress report"
            );
            return;
        }
        self.last = percentage;
        if let Some(cb) = self.callback.as_mut() {
            cb(percentage, phase);
        }
    }

    /// Reports the share of acknowledged chunks.
    pub fn report_acknowledged(&mut self, acked: &AcknowledgedSet, phase: &str) {
        self.report(acked.percentage(), phase);
    }

    /// Swaps the callback; the floor stays where it was.
    pub fn set_callback(&mut self, callback: Option<ProgressCallback>) {
        self.callback = callback;
    }

    /// Stops forwarding for good.
    pub fn silence(&mut self) {
        self.silenced = true;
    }

    /// Last reported percentage.
    pub fn last(&self) -> f64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (ProgressReporter, Arc<Mutex<Vec<(f64, String)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let reporter = ProgressReporter::new(Some(Box::new(move |p: f64, phase: &str| {
            s.lock().unwrap().push((p, phase.to_string()));
        })));
        (reporter, seen)
    }

    #[test]
    fn forwards_reports() {
        let (mut reporter, seen) = recording();
        reporter.report(50.0, "uploading");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[(50.0, "uploading".to_string())]);
    }

    #[test]
    fn drops_regression() {
        let (mut reporter, seen) = recording();
        reporter.report(60.0, "uploading");
        reporter.report(30.0, "uploading");
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(reporter.last(), 60.0);
    }

    #[test]
    fn new_callback_keeps_floor() {
        let (mut reporter, first) = recording();
        reporter.report(60.0, "uploading");

        let second = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&second);
        reporter.set_callback(Some(Box::new(move |p: f64, phase: &str| {
            s.lock().unwrap().push((p, phase.to_string()));
        })));
        reporter.report(30.0, "uploading");
        reporter.report(70.0, "uploading");

        assert_eq!(first.lock().unwrap().len(), 1);
        assert_eq!(
            second.lock().unwrap().as_slice(),
            &[(70.0, "uploading".to_string())]
        );
    }

    #[test]
    fn clamps_to_hundred() {
        let (mut reporter, seen) = recording();
        reporter.report(150.0, "done");
        assert_eq!(seen.lock().unwrap()[0].0, 100.0);
    }

    #[test]
    fn silenced_reporter_is_quiet() {
        let (mut reporter, seen) = recording();
        reporter.silence();
        reporter.report(10.0, "uploading");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn acknowledged_share() {
        let (mut reporter, seen) = recording();
        let mut acked = AcknowledgedSet::new(3);
        acked.insert(0).unwrap();
        reporter.report_acknowledged(&acked, "uploading");
        let p = seen.lock().unwrap()[0].0;
        assert!((p - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn no_callback_is_fine() {
        let mut reporter = ProgressReporter::new(None);
        reporter.report(10.0, "uploading");
        assert_eq!(reporter.last(), 10.0);
    }
}
