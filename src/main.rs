use clap::Parser;
use std::process::ExitCode;
use ticket_desk::cli::commands;
use ticket_desk::cli::{Cli, Commands};
use ticket_desk::config::CliOverrides;
use ticket_desk::format::OutputContext;
use ticket_desk::logging::init_logging;
use ticket_desk::{StructuredError, TicketError};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {err}");
    }

    let overrides = CliOverrides { db: cli.db.clone() };
    let ctx = OutputContext::from_flags(cli.json, cli.quiet, cli.no_color);

    let result = match &cli.command {
        Commands::Init => commands::init::execute(&overrides, &ctx),
        Commands::Create(args) => commands::create::execute(args, &overrides, &ctx),
        Commands::List(args) => commands::list::execute(args, &overrides, &ctx),
        Commands::Show(args) => commands::show::execute(args, &overrides, &ctx),
        Commands::Update(args) => commands::update::execute(args, &overrides, &ctx),
        Commands::Delete(args) => commands::delete::execute(args, &overrides, &ctx),
        Commands::Comments(args) => commands::comments::execute(args, &overrides, &ctx),
        Commands::Attach(args) => commands::attach::execute(args, &overrides, &ctx),
        Commands::Report => commands::report::execute(&overrides, &ctx),
        Commands::Schema(args) => commands::schema::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, cli.json);
            let code = u8::try_from(err.code().exit_code()).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn report_error(err: &TicketError, json: bool) {
    tracing::debug!(error = ?err, "Command failed");

    if json {
        let envelope = StructuredError::from(err);
        match serde_json::to_string_pretty(&envelope) {
            Ok(text) => eprintln!("{text}"),
            Err(_) => eprintln!("Error: {err}"),
        }
    } else {
        eprintln!("Error: {err}");
    }
}
