//! Acquisition supervision for the platform position source.
//!
//! The browser offers two ways to read the device location: a continuous
//! watch subscription and repeated single-fix polls (the fallback where
//! watch delivery is unreliable). Both feed the same filter pipeline, so
//! the supervisor here is a pure state machine: the host feeds it events
//! (fix arrived, error, timer fired, stop) and executes the commands it
//! emits (start/stop the platform source, schedule/cancel the retry
//! timer). Keeping it pure makes the retry policy replayable in tests.

use std::fmt;

use tracing::{debug, warn};

/// Maximum acquisition attempts before declaring the signal lost.
pub const RETRY_LIMIT: u32 = 3;
/// Fixed delay between attempts (milliseconds).
pub const RETRY_DELAY_MS: u64 = 2_000;
/// Poll cadence when the platform cannot sustain a watch (milliseconds).
pub const POLL_INTERVAL_MS: u64 = 1_000;

/// One raw reading from the device.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fix {
    pub lat: f64,
    pub lng: f64,
    pub accuracy_m: f64,
    pub timestamp_ms: u64,
}

/// How the platform can deliver fixes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SourceCapability {
    /// The platform pushes each new fix (geolocation watch).
    ContinuousWatch,
    /// Single-fix requests on a fixed interval.
    PollOnly,
}

/// Classified acquisition failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unsupported,
    Other(String),
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::PermissionDenied => write!(f, "location permission denied"),
            AcquisitionError::PositionUnavailable => write!(f, "position unavailable"),
            AcquisitionError::Timeout => write!(f, "location request timed out"),
            AcquisitionError::Unsupported => write!(f, "geolocation not supported"),
            AcquisitionError::Other(msg) => write!(f, "location error: {msg}"),
        }
    }
}

impl std::error::Error for AcquisitionError {}

/// Command for the host to execute against the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCommand {
    StartWatch { high_accuracy: bool },
    StartPoll { interval_ms: u64, high_accuracy: bool },
    StopSource,
    ScheduleRetry { delay_ms: u64 },
    CancelRetry,
}

/// Externally visible acquisition status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Idle,
    Acquiring,
    Active,
    /// Waiting out the backoff before the next attempt.
    Retrying { attempt: u32 },
    /// Retries exhausted. Track history is retained; a manual retry is
    /// the only way back.
    SignalLost,
}

/// Pure retry/backoff state machine over the platform position source.
#[derive(Debug)]
pub struct AcquisitionSupervisor {
    capability: SourceCapability,
    status: SourceStatus,
    attempts: u32,
    high_accuracy: bool,
}

impl AcquisitionSupervisor {
    pub fn new(capability: SourceCapability) -> Self {
        Self {
            capability,
            status: SourceStatus::Idle,
            attempts: 0,
            high_accuracy: true,
        }
    }

    pub fn status(&self) -> SourceStatus {
        self.status
    }

    pub fn capability(&self) -> SourceCapability {
        self.capability
    }

    /// Whether a fix delivered now should be processed at all. After
    /// signal loss the source has been commanded stopped, so a straggler
    /// fix must not revive the session; only `retry_now` can.
    pub fn accepts_fixes(&self) -> bool {
        !matches!(self.status, SourceStatus::Idle | SourceStatus::SignalLost)
    }

    /// Begins acquisition. Resets the attempt counter and accuracy mode.
    pub fn start(&mut self) -> Vec<SourceCommand> {
        self.attempts = 0;
        self.high_accuracy = true;
        self.status = SourceStatus::Acquiring;
        vec![self.start_command()]
    }

    /// Stops acquisition synchronously: the subscription and any pending
    /// retry timer are torn down before this returns, so no further fix
    /// can mutate state.
    pub fn stop(&mut self) -> Vec<SourceCommand> {
        self.status = SourceStatus::Idle;
        self.attempts = 0;
        self.high_accuracy = true;
        vec![SourceCommand::CancelRetry, SourceCommand::StopSource]
    }

    /// A fix arrived; the source is healthy again.
    pub fn on_fix(&mut self) {
        if !self.accepts_fixes() {
            return;
        }
        self.attempts = 0;
        self.status = SourceStatus::Active;
    }

    /// An acquisition error arrived. Schedules a backed-off retry until
    /// the limit is reached, downgrading accuracy after the first
    /// high-accuracy failure.
    pub fn on_error(&mut self, error: &AcquisitionError) -> Vec<SourceCommand> {
        if matches!(self.status, SourceStatus::Idle | SourceStatus::SignalLost) {
            return Vec::new();
        }

        self.attempts += 1;
        if self.attempts >= RETRY_LIMIT {
            warn!(%error, attempts = self.attempts, "signal lost after retries");
            self.status = SourceStatus::SignalLost;
            return vec![SourceCommand::CancelRetry, SourceCommand::StopSource];
        }

        if self.high_accuracy {
            self.high_accuracy = false;
        }
        debug!(%error, attempt = self.attempts, "scheduling acquisition retry");
        self.status = SourceStatus::Retrying {
            attempt: self.attempts,
        };
        vec![SourceCommand::ScheduleRetry {
            delay_ms: RETRY_DELAY_MS,
        }]
    }

    /// The backoff timer fired; restart the source.
    pub fn on_retry_timer(&mut self) -> Vec<SourceCommand> {
        match self.status {
            SourceStatus::Retrying { .. } => {
                self.status = SourceStatus::Acquiring;
                vec![self.start_command()]
            }
            // A stale timer that outlived a stop or a fix is ignored.
            _ => Vec::new(),
        }
    }

    /// User-driven retry after signal loss. Resets the policy.
    pub fn retry_now(&mut self) -> Vec<SourceCommand> {
        self.start()
    }

    fn start_command(&self) -> SourceCommand {
        match self.capability {
            SourceCapability::ContinuousWatch => SourceCommand::StartWatch {
                high_accuracy: self.high_accuracy,
            },
            SourceCapability::PollOnly => SourceCommand::StartPoll {
                interval_ms: POLL_INTERVAL_MS,
                high_accuracy: self.high_accuracy,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AcquisitionError, AcquisitionSupervisor, RETRY_DELAY_MS, SourceCapability, SourceCommand,
        SourceStatus,
    };

    #[test]
    fn start_emits_high_accuracy_watch() {
        let mut s = AcquisitionSupervisor::new(SourceCapability::ContinuousWatch);
        let cmds = s.start();
        assert_eq!(cmds, vec![SourceCommand::StartWatch { high_accuracy: true }]);
        assert_eq!(s.status(), SourceStatus::Acquiring);
    }

    #[test]
    fn poll_fallback_emits_poll_command() {
        let mut s = AcquisitionSupervisor::new(SourceCapability::PollOnly);
        let cmds = s.start();
        assert!(matches!(
            cmds.as_slice(),
            [SourceCommand::StartPoll { high_accuracy: true, .. }]
        ));
    }

    #[test]
    fn first_failure_downgrades_accuracy() {
        let mut s = AcquisitionSupervisor::new(SourceCapability::ContinuousWatch);
        s.start();
        let cmds = s.on_error(&AcquisitionError::Timeout);
        assert_eq!(
            cmds,
            vec![SourceCommand::ScheduleRetry {
                delay_ms: RETRY_DELAY_MS
            }]
        );
        let cmds = s.on_retry_timer();
        assert_eq!(
            cmds,
            vec![SourceCommand::StartWatch {
                high_accuracy: false
            }]
        );
    }

    #[test]
    fn retries_exhaust_into_signal_lost() {
        let mut s = AcquisitionSupervisor::new(SourceCapability::ContinuousWatch);
        s.start();
        s.on_error(&AcquisitionError::PositionUnavailable);
        s.on_retry_timer();
        s.on_error(&AcquisitionError::PositionUnavailable);
        s.on_retry_timer();
        let cmds = s.on_error(&AcquisitionError::PositionUnavailable);
        assert_eq!(s.status(), SourceStatus::SignalLost);
        assert!(cmds.contains(&SourceCommand::StopSource));
        // Further errors are inert once the signal is lost.
        assert!(s.on_error(&AcquisitionError::Timeout).is_empty());
    }

    #[test]
    fn fix_resets_attempt_counter() {
        let mut s = AcquisitionSupervisor::new(SourceCapability::ContinuousWatch);
        s.start();
        s.on_error(&AcquisitionError::Timeout);
        s.on_retry_timer();
        s.on_fix();
        assert_eq!(s.status(), SourceStatus::Active);
        // The counter restarted, so two more failures still retry.
        s.on_error(&AcquisitionError::Timeout);
        s.on_retry_timer();
        let cmds = s.on_error(&AcquisitionError::Timeout);
        assert!(matches!(
            cmds.as_slice(),
            [SourceCommand::ScheduleRetry { .. }]
        ));
    }

    #[test]
    fn stop_cancels_timer_and_ignores_stragglers() {
        let mut s = AcquisitionSupervisor::new(SourceCapability::ContinuousWatch);
        s.start();
        s.on_error(&AcquisitionError::Timeout);
        let cmds = s.stop();
        assert_eq!(
            cmds,
            vec![SourceCommand::CancelRetry, SourceCommand::StopSource]
        );
        assert!(!s.accepts_fixes());
        // A stale retry timer after stop emits nothing.
        assert!(s.on_retry_timer().is_empty());
    }

    #[test]
    fn straggler_fix_after_signal_lost_is_ignored() {
        let mut s = AcquisitionSupervisor::new(SourceCapability::ContinuousWatch);
        s.start();
        for _ in 0..3 {
            s.on_error(&AcquisitionError::Timeout);
            s.on_retry_timer();
        }
        assert_eq!(s.status(), SourceStatus::SignalLost);
        assert!(!s.accepts_fixes());
        // A fix that was already in flight when the source stopped must
        // not flip the status back without a start command.
        s.on_fix();
        assert_eq!(s.status(), SourceStatus::SignalLost);
    }

    #[test]
    fn manual_retry_after_signal_lost_starts_fresh() {
        let mut s = AcquisitionSupervisor::new(SourceCapability::ContinuousWatch);
        s.start();
        for _ in 0..3 {
            s.on_error(&AcquisitionError::Timeout);
            s.on_retry_timer();
        }
        assert_eq!(s.status(), SourceStatus::SignalLost);
        let cmds = s.retry_now();
        assert_eq!(cmds, vec![SourceCommand::StartWatch { high_accuracy: true }]);
        assert_eq!(s.status(), SourceStatus::Acquiring);
    }
}
