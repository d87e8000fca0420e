use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use fab::dag::ScheduledAction;
use fab::errors::{FailureReason, Result};
use fab::exec::ActionRunner;

/// A fake runner that:
/// - records every action it is asked to run
/// - reports success, except for the command set with `failing_on`,
///   which fails with exit status 1.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    executed: Arc<Mutex<Vec<ScheduledAction>>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail when asked to run exactly `command`.
    pub fn failing_on(mut self, command: &str) -> Self {
        self.fail_on = Some(command.to_string());
        self
    }

    pub fn actions(&self) -> Vec<ScheduledAction> {
        self.executed.lock().unwrap().clone()
    }

    /// Commands run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.actions().into_iter().map(|a| a.command).collect()
    }
}

impl ActionRunner for RecordingRunner {
    fn run_action<'a>(
        &'a mut self,
        action: &'a ScheduledAction,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        let executed = Arc::clone(&self.executed);
        let fail = self.fail_on.as_deref() == Some(action.command.as_str());

        Box::pin(async move {
            executed.lock().unwrap().push(action.clone());
            if fail {
                return Err(action.failure(FailureReason::Exit(1)));
            }
            Ok(())
        })
    }
}
