use std::collections::HashMap;
use std::fs;
use std::path::Path;

use assetrip::asset::{Guid, Result};

/// Print `payload` as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(payload)?);
	Ok(())
}

/// Read an `{ "<assembly file name>": "<32 hex digits>" }` table.
pub(crate) fn read_guid_table(path: &Path) -> Result<HashMap<String, Guid>> {
	let text = fs::read_to_string(path)?;
	Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
	use super::read_guid_table;

	#[test]
	fn guid_tables_parse_and_validate() {
		let dir = tempfile::tempdir().expect("tempdir");
		let good = dir.path().join("good.json");
		std::fs::write(&good, r#"{"Extra.dll": "00112233445566778899aabbccddeeff"}"#).expect("table");
		let table = read_guid_table(&good).expect("parses");
		assert_eq!(table["Extra.dll"].to_string(), "00112233445566778899aabbccddeeff");

		let bad = dir.path().join("bad.json");
		std::fs::write(&bad, r#"{"Extra.dll": "not-a-guid"}"#).expect("table");
		assert!(read_guid_table(&bad).is_err());
	}
}
