use std::process::ExitCode;

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match Cli::parse_args().handle().await {
        Ok(outcome) => ExitCode::from(outcome.code() as u8),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(3)
        }
    }
}
