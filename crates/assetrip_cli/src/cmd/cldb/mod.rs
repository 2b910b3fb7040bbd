use std::fs;
use std::path::PathBuf;

use assetrip::asset::{ClassDatabase, ClassType, Compression, ExportError, Result};
use tracing::info;

use crate::cmd::util::emit_json;

#[derive(clap::Subcommand)]
pub enum Command {
	/// Print container header details.
	Info {
		file: PathBuf,
		#[arg(long)]
		json: bool,
	},
	/// List classes, or print one class's field layout.
	Types {
		file: PathBuf,
		/// Class name to print the field layout of.
		#[arg(long)]
		class: Option<String>,
	},
	/// Rewrite a database with another compression mode.
	Repack {
		input: PathBuf,
		output: PathBuf,
		#[arg(long, default_value = "lzma", value_parser = parse_compression)]
		compression: Compression,
	},
}

/// Run a class database subcommand.
pub fn run(command: Command) -> Result<()> {
	match command {
		Command::Info { file, json } => info_cmd(ClassDatabase::open(&file)?, json),
		Command::Types { file, class } => types_cmd(&ClassDatabase::open(&file)?, class.as_deref()),
		Command::Repack { input, output, compression } => repack_cmd(input, output, compression),
	}
}

fn parse_compression(label: &str) -> std::result::Result<Compression, String> {
	match Compression::parse(label) {
		Some(kind) if kind.is_writable() => Ok(kind),
		Some(kind) => Err(format!("{} is read-only", kind.as_str())),
		None => Err(format!("unknown compression {label:?} (expected none or lzma)")),
	}
}

fn info_cmd(db: ClassDatabase, json: bool) -> Result<()> {
	let header = db.header;
	if json {
		return emit_json(&InfoJson {
			version: header.version,
			flags: header.flags,
			compression: header.compression.as_str(),
			engine_versions: header.engine_versions.iter().map(|v| v.to_string()).collect(),
			classes: db.classes.len(),
			string_table_len: db.strings.len(),
		});
	}

	println!("version: {}", header.version);
	println!("flags: 0x{:02x}", header.flags);
	println!("compression: {}", header.compression.as_str());
	println!("engine_versions: {}", header.engine_versions.join(", "));
	println!("classes: {}", db.classes.len());
	println!("string_table_len: {}", db.strings.len());
	Ok(())
}

fn types_cmd(db: &ClassDatabase, class: Option<&str>) -> Result<()> {
	let Some(name) = class else {
		for item in &db.classes {
			println!("{}\t{}", item.class_id, db.string(item.name)?);
		}
		return Ok(());
	};

	let item = db.class_by_name(name).ok_or_else(|| ExportError::UnknownClassName { name: name.to_owned() })?;
	print_fields(db, item)
}

fn print_fields(db: &ClassDatabase, item: &ClassType) -> Result<()> {
	for field in &item.fields {
		let indent = "  ".repeat(field.depth as usize);
		let mut line = format!("{indent}{} {}", db.string(field.type_name)?, db.string(field.field_name)?);
		if field.size >= 0 {
			line.push_str(&format!(" size={}", field.size));
		}
		if field.is_array {
			line.push_str(" array");
		}
		if field.aligned() {
			line.push_str(" align");
		}
		println!("{line}");
	}
	Ok(())
}

fn repack_cmd(input: PathBuf, output: PathBuf, compression: Compression) -> Result<()> {
	let mut db = ClassDatabase::open(&input)?;
	info!(from = db.header.compression.as_str(), to = compression.as_str(), "repacking class database");
	db.header.compression = compression;
	let bytes = db.write()?;
	fs::write(&output, &bytes)?;
	println!("wrote {} ({} bytes, {})", output.display(), bytes.len(), compression.as_str());
	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	version: u8,
	flags: u8,
	compression: &'static str,
	engine_versions: Vec<String>,
	classes: usize,
	string_table_len: usize,
}
