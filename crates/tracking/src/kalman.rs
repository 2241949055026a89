/// Default process noise.
pub const DEFAULT_Q: f64 = 1e-4;
/// Default measurement noise.
pub const DEFAULT_R: f64 = 1e-5;

/// One-dimensional recursive filter for a single geodetic axis.
///
/// Latitude and longitude each get their own instance; the two share no
/// state and may be stepped in either order relative to each other.
///
/// Uninitialized until the first sample arrives. Tracking restarts must
/// construct fresh instances rather than reusing converged state.
#[derive(Debug, Clone)]
pub struct ScalarKalman {
    /// State transition factor.
    a: f64,
    /// Observation factor.
    c: f64,
    /// Process noise.
    q: f64,
    /// Measurement noise.
    r: f64,
    /// (estimate, covariance), absent before the first sample.
    state: Option<(f64, f64)>,
}

impl Default for ScalarKalman {
    fn default() -> Self {
        Self::new(DEFAULT_Q, DEFAULT_R)
    }
}

impl ScalarKalman {
    pub fn new(q: f64, r: f64) -> Self {
        Self {
            a: 1.0,
            c: 1.0,
            q,
            r,
            state: None,
        }
    }

    pub fn estimate(&self) -> Option<f64> {
        self.state.map(|(x, _)| x)
    }

    /// Feeds one measurement and returns the updated estimate.
    pub fn update(&mut self, z: f64) -> f64 {
        let (x, cov) = match self.state {
            None => (z / self.c, self.q / (self.c * self.c)),
            Some((x, cov)) => {
                let pred_x = self.a * x;
                let pred_cov = self.a * cov * self.a + self.r;
                let k = (pred_cov * self.c) / (self.c * pred_cov * self.c + self.q);
                let x = pred_x + k * (z - self.c * pred_x);
                let cov = pred_cov - k * self.c * pred_cov;
                (x, cov)
            }
        };
        self.state = Some((x, cov));
        x
    }
}
