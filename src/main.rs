use anyhow::Context;
use clap::Parser;
use reqprof::cli::{Cli, Command};
use reqprof::error::exit_code;
use reqprof::request::{ExecutorConfig, TlsExecutor};
use reqprof::target::Target;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            eprintln!("Fatal error: {e:#}");
            if let Some(reqprof_err) = e.downcast_ref::<reqprof::Error>() {
                ExitCode::from(reqprof_err.exit_code() as u8)
            } else {
                ExitCode::from(exit_code::GENERAL_ERROR as u8)
            }
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Validate CLI arguments
    cli.validate()
        .map_err(reqprof::Error::InvalidArgument)
        .context("Invalid arguments")?;

    if let Some(Command::Completions { shell }) = &cli.command {
        use clap::CommandFactory;
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "reqprof", &mut std::io::stdout());
        return Ok(());
    }

    let url = cli.url.as_deref().unwrap_or_default();
    let target = Target::parse(url)?;

    let executor = TlsExecutor::new(ExecutorConfig {
        connect_timeout: cli.connect_timeout,
    })?;

    match cli.profile_count() {
        None => reqprof::commands::fetch::run(&executor, &target)?,
        Some(requests) => reqprof::commands::profile::run(
            executor,
            &target,
            requests,
            cli.on_error.into(),
            cli.format,
            cli.quiet,
        )?,
    }

    Ok(())
}
