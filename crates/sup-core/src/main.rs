//! sup - query and control processes managed by a supervision daemon.
//!
//! The binary is a thin shell over `sup_core`: parse arguments, fetch the
//! listing through the dual-channel façade, resolve targets, and run one
//! control action per resolved name, sequentially, tallying outcomes.

use clap::{Args, Parser, Subcommand};
use std::io::IsTerminal;
use sup_common::OutputFormat;
use sup_core::config::{ConnectionConfig, DEFAULT_ENDPOINT, ENV_ENDPOINT, ENV_PASSWORD, ENV_USERNAME};
use sup_core::control::{Action, Controller};
use sup_core::exit_codes::ExitCode;
use sup_core::logging::{init_logging, LogFormat};
use sup_core::output;
use sup_core::resolve::resolve_targets;
use sup_core::rpc::RpcClient;
use sup_core::status::{StatusChannel, StatusReader};

/// Query and control processes managed by a supervision daemon
#[derive(Parser)]
#[command(name = "sup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// RPC endpoint URL
    #[arg(long, global = true, env = ENV_ENDPOINT, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Basic-auth username (auth is sent only with a password)
    #[arg(long, global = true, env = ENV_USERNAME, default_value = "")]
    username: String,

    /// Basic-auth password
    #[arg(long, global = true, env = ENV_PASSWORD, default_value = "")]
    password: String,

    /// Listing output format
    #[arg(long, short = 'f', global = true, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log format
    #[arg(long, global = true, default_value_t = LogFormat::Human)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status of every managed process
    Status,

    /// Alias for `status`
    List,

    /// Start processes by index, name, or range
    Start(TargetArgs),

    /// Stop processes by index, name, or range
    Stop(TargetArgs),

    /// Restart processes (stop, pause, start)
    Restart(TargetArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Process selectors: an index (`1`), a range (`1-5`), a name
    /// (`myapp`), or a qualified name (`group:myapp`)
    #[arg(required = true)]
    targets: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    let verbosity = if cli.global.quiet {
        -1
    } else {
        cli.global.verbose as i8
    };
    init_logging(cli.global.log_format, verbosity);
    std::process::exit(run(cli).as_i32());
}

fn run(cli: Cli) -> ExitCode {
    if let Commands::Version = cli.command {
        println!("sup {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::Clean;
    }

    let config = ConnectionConfig {
        endpoint: cli.global.endpoint.clone(),
        username: cli.global.username.clone(),
        password: cli.global.password.clone(),
    };
    let rpc = match RpcClient::new(&config) {
        Ok(rpc) => rpc,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::InternalError;
        }
    };
    let reader = StatusReader::new(rpc);

    match cli.command {
        Commands::Status | Commands::List => show_status(&reader, &cli.global),
        Commands::Start(args) => control_targets(&reader, Action::Start, &args.targets),
        Commands::Stop(args) => control_targets(&reader, Action::Stop, &args.targets),
        Commands::Restart(args) => control_targets(&reader, Action::Restart, &args.targets),
        Commands::Version => unreachable!("handled above"),
    }
}

fn show_status(reader: &StatusReader, opts: &GlobalOpts) -> ExitCode {
    let report = match reader.all_processes() {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: failed to fetch process status: {err}");
            return ExitCode::StatusError;
        }
    };

    match opts.format {
        OutputFormat::Json => match output::render_json(&report.processes) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::InternalError;
            }
        },
        OutputFormat::Table => {
            let color = !opts.no_color && std::io::stdout().is_terminal();
            print!("{}", output::render_table(&report.processes, color));
            if report.channel == StatusChannel::CtlFallback {
                eprintln!("note: rpc channel unavailable, listing read from supervisorctl");
            }
        }
    }
    ExitCode::Clean
}

fn control_targets(reader: &StatusReader, action: Action, targets: &[String]) -> ExitCode {
    let report = match reader.all_processes() {
        Ok(report) => report,
        Err(err) => {
            eprintln!("error: failed to fetch process status: {err}");
            return ExitCode::StatusError;
        }
    };

    let resolved = match resolve_targets(targets, &report.processes) {
        Ok(resolved) => resolved,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::ArgsError;
        }
    };

    let controller = Controller::new();
    let mut succeeded = 0usize;
    let mut failed = 0usize;
    for target in &resolved {
        match controller.control(action, target.name()) {
            Ok(()) => {
                println!("{action} {}: ok", target.name());
                succeeded += 1;
            }
            Err(err) => {
                eprintln!("{action} {}: {err}", target.name());
                failed += 1;
            }
        }
    }
    println!("{action} complete: {succeeded} succeeded, {failed} failed");

    if failed > 0 {
        ExitCode::PartialFail
    } else {
        ExitCode::Clean
    }
}
