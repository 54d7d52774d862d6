//! calagg CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calagg_cli::cli::Cli;
use calagg_cli::commands;
use calagg_core::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("warning: {}", e);
    }

    let compact = cli.compact;
    let rendered = commands::run(cli)
        .await
        .and_then(|output| output.render(compact));

    match rendered {
        Ok(Some(text)) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
