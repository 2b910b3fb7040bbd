use crate::asset::{ExportError, Result};

/// One parsed operation in a field path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
	/// Select a named child field.
	Field(String),
	/// Select an array element by zero-based index.
	Index(usize),
}

/// Parsed field path expression such as `m_Component[0].component`.
#[derive(Debug, Clone)]
pub struct FieldPath {
	/// Ordered sequence of path steps.
	pub steps: Vec<PathStep>,
}

impl FieldPath {
	/// Parse dotted field syntax with optional `[index]` selectors.
	///
	/// Field names may contain anything except `.`, `[` and `]`, since engine names such as
	/// `image data` carry spaces.
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = || ExportError::InvalidFieldPath { path: input.to_owned() };
		if input.is_empty() {
			return Err(invalid());
		}

		let bytes = input.as_bytes();
		let mut idx = 0_usize;
		let mut steps = Vec::new();

		while idx < bytes.len() {
			let start = idx;
			while idx < bytes.len() && !matches!(bytes[idx], b'.' | b'[' | b']') {
				idx += 1;
			}
			if idx == start {
				return Err(invalid());
			}
			steps.push(PathStep::Field(input[start..idx].to_owned()));

			while idx < bytes.len() && bytes[idx] == b'[' {
				idx += 1;
				let n_start = idx;
				while idx < bytes.len() && bytes[idx].is_ascii_digit() {
					idx += 1;
				}
				if idx == n_start || idx >= bytes.len() || bytes[idx] != b']' {
					return Err(invalid());
				}

				let number = input[n_start..idx].parse::<usize>().map_err(|_| invalid())?;
				steps.push(PathStep::Index(number));
				idx += 1;
			}

			if idx < bytes.len() {
				if bytes[idx] != b'.' {
					return Err(invalid());
				}
				idx += 1;
				if idx >= bytes.len() {
					return Err(invalid());
				}
			}
		}

		Ok(Self { steps })
	}
}

#[cfg(test)]
mod tests {
	use super::{FieldPath, PathStep};

	#[test]
	fn parses_fields_and_indices() {
		let path = FieldPath::parse("m_Component[2].component").expect("path parses");
		assert_eq!(
			path.steps,
			vec![
				PathStep::Field("m_Component".to_owned()),
				PathStep::Index(2),
				PathStep::Field("component".to_owned()),
			]
		);
	}

	#[test]
	fn names_may_contain_spaces() {
		let path = FieldPath::parse("image data.size").expect("path parses");
		assert_eq!(path.steps, vec![PathStep::Field("image data".to_owned()), PathStep::Field("size".to_owned())]);
	}

	#[test]
	fn rejects_malformed_paths() {
		for input in ["", ".m_Name", "m_Name.", "m_List[", "m_List[x]", "a]b", "m_List[0]x"] {
			assert!(FieldPath::parse(input).is_err(), "{input}");
		}
	}
}
