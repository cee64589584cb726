//! Handles to results that are still being computed

use mobsec_core::{CheckError, SecurityCheckResult};
use std::cell::OnceCell;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// Outcome of one check as delivered by a worker
pub type CheckOutcome = Result<SecurityCheckResult, CheckError>;

/// Eventual result of a check submitted to a worker pool.
///
/// Each handle resolves independently of the others. Once an outcome has
/// been received it is kept, so a handle can be asked again.
#[derive(Debug)]
pub struct CheckHandle {
    check_id: String,
    receiver: Receiver<CheckOutcome>,
    outcome: OnceCell<CheckOutcome>,
}

impl CheckHandle {
    pub(crate) fn new(check_id: impl Into<String>, receiver: Receiver<CheckOutcome>) -> Self {
        Self {
            check_id: check_id.into(),
            receiver,
            outcome: OnceCell::new(),
        }
    }

    /// Identifier of the check this handle belongs to
    pub fn check_id(&self) -> &str {
        &self.check_id
    }

    /// Block until the check finishes
    pub fn get(self) -> CheckOutcome {
        if let Some(outcome) = self.outcome.into_inner() {
            return outcome;
        }
        self.receiver
            .recv()
            .unwrap_or_else(|_| Err(abandoned(&self.check_id)))
    }

    /// Block until the check finishes or `timeout` elapses.
    ///
    /// A timeout leaves the handle usable; the check keeps running.
    pub fn get_timeout(&self, timeout: Duration) -> CheckOutcome {
        if let Some(outcome) = self.outcome.get() {
            return outcome.clone();
        }

        let outcome = match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                return Err(CheckError::Timeout {
                    check: self.check_id.clone(),
                    timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(abandoned(&self.check_id)),
        };

        self.outcome.get_or_init(|| outcome).clone()
    }

    /// Whether the outcome is available without blocking
    pub fn is_finished(&self) -> bool {
        if self.outcome.get().is_some() {
            return true;
        }

        let outcome = match self.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(abandoned(&self.check_id)),
        };
        let _ = self.outcome.set(outcome);
        true
    }
}

fn abandoned(check_id: &str) -> CheckError {
    CheckError::Abandoned {
        check: check_id.to_string(),
    }
}
