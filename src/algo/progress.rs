//! Progress reporting for long-running mesh passes.
//!
//! Subdivision of a high-degree sphere and the planet pipeline's relaxation
//! loop can take a while. They accept a [`Progress`] handle and call it as
//! work completes.
//!
//! # Example
//!
//! ```
//! use icosphere::algo::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(1, 4, "Subdividing");
//! ```

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives the current step, the total number of steps and a
/// short description of the stage.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report progress of a nested stage.
    ///
    /// Stage `stage` of `stages` is `sub_current / sub_total` complete. The
    /// callback sees a single scale of `stages * 1000` steps, so nested
    /// stages never move the overall counter backwards.
    #[inline]
    pub fn report_sub(
        &self,
        sub_current: usize,
        sub_total: usize,
        stage: usize,
        stages: usize,
        message: &str,
    ) {
        if sub_total == 0 || stages == 0 {
            return;
        }
        let sub_fraction = (sub_current.min(sub_total) * 1000) / sub_total;
        (self.callback)(stage * 1000 + sub_fraction, stages * 1000, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_report_sub_scales_into_stage() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        progress.report_sub(1, 2, 1, 4, "stage");
        progress.report_sub(5, 0, 1, 4, "ignored");

        assert_eq!(*seen.lock().unwrap(), vec![(1500, 4000)]);
    }

    #[test]
    fn test_none_discards() {
        Progress::none().report(1, 1, "done");
    }
}
