mod run;

use crate::probe::ProbeOutcome;
use std::{net::IpAddr, process::ExitCode};

/// Exit status of `check` for an unhealthy database
pub const UNHEALTHY_EXIT: u8 = 2;

/// Action enum representing each possible command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Check,
    Serve {
        listen: IpAddr,
        port: u16,
        debug: bool,
    },
}

impl Action {
    /// Whether debug logging was requested
    #[must_use]
    pub const fn debug(&self) -> bool {
        matches!(self, Self::Serve { debug: true, .. })
    }

    /// Execute the action
    ///
    /// # Errors
    ///
    /// Returns an error if the action fails to execute
    pub async fn execute(self) -> anyhow::Result<ExitCode> {
        run::execute(self).await
    }
}

/// Exit status reported by `check`
#[must_use]
pub const fn exit_status(outcome: &ProbeOutcome) -> u8 {
    if outcome.ok { 0 } else { UNHEALTHY_EXIT }
}
