use std::fmt;

/// Lifecycle of the background orchestration task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Starting,
    WaitingHealthy,
    Provisioning,
    WritingOutput,
    Done,
    Aborting,
}

impl RunnerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunnerState::Done | RunnerState::Aborting)
    }
}

impl fmt::Display for RunnerState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            RunnerState::Starting => "starting",
            RunnerState::WaitingHealthy => "waiting-healthy",
            RunnerState::Provisioning => "provisioning",
            RunnerState::WritingOutput => "writing-output",
            RunnerState::Done => "done",
            RunnerState::Aborting => "aborting",
        };
        f.write_str(s)
    }
}
