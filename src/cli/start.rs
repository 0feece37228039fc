use super::{commands, dispatch, telemetry};
use anyhow::Result;
use std::process::ExitCode;

/// Main orchestrator - Pure orchestration with no business logic
///
/// Four-step data flow:
/// 1. Parse: Extract CLI arguments
/// 2. Dispatch: Convert `ArgMatches` into typed Action enum
/// 3. Initialize Telemetry: Set up structured logging at the requested verbosity
/// 4. Execute: Run the action's business logic
///
/// # Errors
///
/// Returns an error if any step in the flow fails
pub async fn start() -> Result<ExitCode> {
    let matches = commands::new().get_matches();

    let action = dispatch::dispatch(&matches)?;

    telemetry::init(action.debug())?;

    action.execute().await
}
