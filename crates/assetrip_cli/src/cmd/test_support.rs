use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use assetrip_testkit::target_dir as workspace_target_dir;

static ASSETRIP_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn run_assetrip(args: &[&str]) -> Output {
	Command::new(assetrip_bin())
		.args(args)
		.env_remove("ASSETRIP_LOG")
		.env_remove("RUST_LOG")
		.output()
		.expect("assetrip command executes")
}

pub(crate) fn run_assetrip_json(args: &[&str]) -> serde_json::Value {
	let output = run_assetrip(args);
	assert!(
		output.status.success(),
		"assetrip command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn assetrip_bin() -> &'static PathBuf {
	ASSETRIP_BIN.get_or_init(resolve_assetrip_bin)
}

fn resolve_assetrip_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_assetrip") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "assetrip.exe" } else { "assetrip" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "assetrip"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build assetrip binary at {}", bin.display());

	bin
}
