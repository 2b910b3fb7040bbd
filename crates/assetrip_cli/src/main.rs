#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cmd;

#[derive(Parser)]
#[command(name = "assetrip", about = "Rebuild editor project files from compiled game data")]
struct Cli {
	/// Log filter used when `RUST_LOG` is unset, e.g. `info` or `assetrip=debug`.
	#[arg(long, global = true, env = "ASSETRIP_LOG", default_value = "warn")]
	log_level: String,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Export a game data directory into a project tree.
	Export(cmd::export::Args),
	/// Inspect or rewrite class database files.
	Cldb {
		#[command(subcommand)]
		command: cmd::cldb::Command,
	},
}

fn main() {
	let cli = Cli::parse();
	init_logging(&cli.log_level);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn init_logging(level: &str) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}

fn run(command: Commands) -> assetrip::asset::Result<()> {
	match command {
		Commands::Export(args) => cmd::export::run(args),
		Commands::Cldb { command } => cmd::cldb::run(command),
	}
}
