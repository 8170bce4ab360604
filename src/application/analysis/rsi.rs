use std::collections::VecDeque;

/// Manual RSI over a trailing window of price changes
///
/// Average gain and average loss are plain means over the last `period`
/// changes. Returns `None` until `period` changes have been seen.
pub struct WindowedRsi {
    period: usize,
    prev_close: Option<f64>,
    changes: VecDeque<f64>,
}

impl WindowedRsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            changes: VecDeque::with_capacity(period + 1),
        }
    }

    pub fn next(&mut self, close: f64) -> Option<f64> {
        let prev_close = match self.prev_close.replace(close) {
            Some(prev) => prev,
            None => return None,
        };

        // Half-steps keep the change finite for any pair of finite closes
        self.changes.push_back(close / 2.0 - prev_close / 2.0);
        if self.changes.len() > self.period {
            self.changes.pop_front();
        }
        if self.changes.len() < self.period {
            return None;
        }

        // Averaged per call over the window so rounding never accumulates
        let n = self.period as f64;
        let (avg_gain, avg_loss) = self
            .changes
            .iter()
            .fold((0.0, 0.0), |(gain, loss), &change| {
                if change > 0.0 {
                    (gain + change / n, loss)
                } else {
                    (gain, loss - change / n)
                }
            });
        Some(rsi_from_averages(avg_gain, avg_loss))
    }
}

/// `100 - 100 / (1 + avg_gain / avg_loss)`.
///
/// Zero average loss saturates at 100, flat windows included. Non-finite
/// averages fall back to the neutral 50.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return 50.0;
    }
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    if rsi.is_finite() { rsi.clamp(0.0, 100.0) } else { 50.0 }
}
