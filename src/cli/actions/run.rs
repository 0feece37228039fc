use super::{Action, exit_status};
use crate::{config::Env, health, probe::Drivers};
use std::process::ExitCode;

/// Execute the action's business logic by delegating to the appropriate module
pub async fn execute(action: Action) -> anyhow::Result<ExitCode> {
    match action {
        Action::Check => {
            let outcome = health::check(&Env, Drivers::compiled()).await;
            println!("{}", outcome.to_json_pretty()?);
            Ok(ExitCode::from(exit_status(&outcome)))
        }
        Action::Serve { listen, port, .. } => {
            health::start(listen, port).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
