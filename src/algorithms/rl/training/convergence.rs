//! Convergence detection over the running total of value changes.

/// Returns true when the last `window` entries of `history` are identical.
///
/// Histories shorter than `window`, and a zero window, never count as
/// converged.
pub fn is_converged(history: &[f64], window: usize) -> bool {
    if window == 0 || history.len() < window {
        return false;
    }
    let tail = &history[history.len() - window..];
    tail.iter().all(|&value| value == tail[0])
}

/// Records the running `delta_q_total` after every non-zero update.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    window: usize,
    history: Vec<f64>,
}

impl ConvergenceTracker {
    /// Creates a tracker whose history starts at `0.0`.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            history: vec![0.0],
        }
    }

    pub fn record(&mut self, total: f64) {
        self.history.push(total);
    }

    pub fn is_converged(&self) -> bool {
        is_converged(&self.history, self.window)
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_tail_is_converged() {
        let history = [0.0, 1.0, 3.5, 4.0, 4.0, 4.0, 4.0, 4.0];
        assert!(is_converged(&history, 5));
    }

    #[test]
    fn varying_tail_is_not_converged() {
        let history = [0.0, 4.0, 4.0, 4.0, 4.0, 4.1];
        assert!(!is_converged(&history, 5));
        let history = [4.1, 4.0, 4.0, 4.0, 4.0, 3.9, 4.0];
        assert!(!is_converged(&history, 5));
    }

    #[test]
    fn short_history_is_not_converged() {
        assert!(!is_converged(&[], 5));
        assert!(!is_converged(&[2.0, 2.0, 2.0, 2.0], 5));
        assert!(is_converged(&[2.0, 2.0, 2.0, 2.0, 2.0], 5));
    }

    #[test]
    fn zero_window_never_converges() {
        assert!(!is_converged(&[1.0, 1.0], 0));
    }

    #[test]
    fn tracker_starts_at_zero() {
        let mut tracker = ConvergenceTracker::new(3);
        assert_eq!(tracker.history(), &[0.0]);
        tracker.record(1.0);
        tracker.record(1.0);
        assert!(!tracker.is_converged());
        tracker.record(1.0);
        assert!(tracker.is_converged());
    }
}
