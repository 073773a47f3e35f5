use clap::Parser;
use colored::Colorize;
use linkshield_core::cli::{self, Cli};
use linkshield_core::exit::ShieldExit;

fn main() -> ShieldExit {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    let result = if let Some(cmd) = cli.command {
        cli::dispatch::execute(cmd, cli.config.as_deref())
    } else {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        Ok(ShieldExit::Success)
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            ShieldExit::for_error(&e)
        }
    }
}
