use std::fs;
use std::path::PathBuf;

use assetrip::asset::{ClassDatabase, DumpLoader, ExportOptions, GameExporter, Result};
use tracing::info;

use crate::cmd::util::{emit_json, read_guid_table};

#[derive(clap::Args)]
pub struct Args {
	/// Game data directory holding `globalgamemanagers`, levels and shared assets.
	#[arg(long, env = "ASSETRIP_DATA")]
	pub data: PathBuf,
	/// Project directory to write into.
	#[arg(long, env = "ASSETRIP_OUT")]
	pub out: PathBuf,
	/// Class database used to decode the asset dumps.
	#[arg(long, env = "ASSETRIP_CLDB")]
	pub cldb: PathBuf,
	/// JSON object mapping extension assembly file names to their identifiers.
	#[arg(long, env = "ASSETRIP_EXTENSION_GUIDS")]
	pub extension_guids: Option<PathBuf>,
	/// Remove the output directory before exporting.
	#[arg(long)]
	pub clean: bool,
	#[arg(long)]
	pub json: bool,
}

/// Export a game data directory into a project tree.
pub fn run(args: Args) -> Result<()> {
	let Args {
		data,
		out,
		cldb,
		extension_guids,
		clean,
		json,
	} = args;

	if clean && out.exists() {
		info!(path = %out.display(), "removing previous output");
		fs::remove_dir_all(&out)?;
	}

	let mut options = ExportOptions::new(&data, &out);
	if let Some(path) = extension_guids {
		options.extension_guids = read_guid_table(&path)?;
	}

	let db = ClassDatabase::open(&cldb)?;
	let loader = DumpLoader::new(db, options.decode.clone());
	let summary = GameExporter::new(options, &loader)?.run()?;

	if json {
		return emit_json(&SummaryJson {
			output: out.display().to_string(),
			settings: summary.settings,
			collections: summary.collections,
			scenes: summary.scenes,
			folders: summary.folders,
			deferred_refs: summary.deferred_refs,
		});
	}

	println!("output: {}", out.display());
	println!("settings: {}", summary.settings);
	println!("collections: {}", summary.collections);
	println!("scenes: {}", summary.scenes);
	println!("folders: {}", summary.folders);
	println!("deferred_refs: {}", summary.deferred_refs);
	Ok(())
}

#[derive(serde::Serialize)]
struct SummaryJson {
	output: String,
	settings: usize,
	collections: usize,
	scenes: usize,
	folders: usize,
	deferred_refs: usize,
}
