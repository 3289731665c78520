use clap::Parser;
use error_common::ClassifiedError;
use ops_cli::{render, Cli};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match ops_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<billing_console::ConsoleError>() {
                Some(console) => render::error(&format!("[{}] {console}", console.category())),
                None => render::error(&format!("{err:#}")),
            }
            ExitCode::FAILURE
        }
    }
}
