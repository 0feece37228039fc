use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match dbprobe::cli::start().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
