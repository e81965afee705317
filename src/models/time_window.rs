//! Time window type.

use serde::{Deserialize, Serialize};

/// A time window constraint for service at a node.
///
/// The vehicle must start service no later than `close` and may arrive as
/// early as it likes (it waits until `open` if early).
///
/// Unlike most constructors in this crate, `new` accepts `open > close`: an
/// inverted window is a legitimate (unservable) input, reported as
/// infeasibility by the solver rather than rejected up front.
///
/// # Examples
///
/// ```
/// use pdp_routing::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0);
/// assert!(tw.is_well_formed());
/// assert!(tw.is_violated(250.0));
/// assert!(!TimeWindow::new(10.0, 2.0).is_well_formed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct TimeWindow {
    open: f64,
    close: f64,
}

impl TimeWindow {
    /// Creates a new time window `[open, close]`.
    pub fn new(open: f64, close: f64) -> Self {
        Self { open, close }
    }

    /// The window `[0, +∞)`, used for nodes without an explicit window.
    pub fn unbounded() -> Self {
        Self::new(0.0, f64::INFINITY)
    }

    /// Earliest service start.
    pub fn open(&self) -> f64 {
        self.open
    }

    /// Latest service start.
    pub fn close(&self) -> f64 {
        self.close
    }

    /// Returns `true` if `open <= close`.
    pub fn is_well_formed(&self) -> bool {
        self.open <= self.close
    }

    /// Returns `true` if either bound is NaN.
    pub(crate) fn has_nan(&self) -> bool {
        self.open.is_nan() || self.close.is_nan()
    }

    /// Returns `true` if starting service at the given time violates this window.
    pub fn is_violated(&self, time: f64) -> bool {
        time > self.close
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl From<(f64, f64)> for TimeWindow {
    fn from((open, close): (f64, f64)) -> Self {
        Self::new(open, close)
    }
}

impl From<TimeWindow> for (f64, f64) {
    fn from(tw: TimeWindow) -> Self {
        (tw.open, tw.close)
    }
}
