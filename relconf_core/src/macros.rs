use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use derive_more::Deref;
use serde::Deserialize;
use serde::Serialize;

use crate::RelconfError;
use crate::RelconfResult;

/// Module identifiers suppressed when building support without area detector.
pub const AREA_DETECTOR_MODULES: [&str; 3] = ["ADCORE", "AREA_DETECTOR", "ADSUPPORT"];

/// A single `key=value` replacement.
///
/// Replacement lists are ordered. When several pairs match the same line the
/// last one wins (see [`crate::rewrite_line`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroPair {
	pub key: String,
	pub value: String,
}

impl MacroPair {
	pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			value: value.into(),
		}
	}

	/// The prefix an active assignment of this macro starts with.
	pub(crate) fn active_prefix(&self) -> String {
		format!("{}=", self.key)
	}

	/// The prefix a commented-out assignment of this macro starts with.
	pub(crate) fn commented_prefix(&self) -> String {
		format!("#{}=", self.key)
	}
}

impl fmt::Display for MacroPair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}={}", self.key, self.value)
	}
}

impl FromStr for MacroPair {
	type Err = RelconfError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let Some((key, value)) = s.split_once('=') else {
			return Err(RelconfError::InvalidMacroLine {
				line: 1,
				content: s.to_string(),
			});
		};

		let key = key.trim();
		if key.is_empty() {
			return Err(RelconfError::InvalidMacroLine {
				line: 1,
				content: s.to_string(),
			});
		}

		Ok(Self::new(key, value.trim()))
	}
}

/// Parse a macro list: one `KEY=VALUE` per line. Blank lines and `#`
/// comments are skipped and the first `=` separates key from value.
pub fn parse_macro_pairs(text: &str) -> RelconfResult<Vec<MacroPair>> {
	let mut pairs = Vec::new();

	for (index, raw) in text.lines().enumerate() {
		let line = raw.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}

		let pair = line.parse::<MacroPair>().map_err(|_| {
			RelconfError::InvalidMacroLine {
				line: index + 1,
				content: line.to_string(),
			}
		})?;
		pairs.push(pair);
	}

	Ok(pairs)
}

/// Read and parse a macro list file.
pub fn load_macro_pairs(path: &Path) -> RelconfResult<Vec<MacroPair>> {
	let text = std::fs::read_to_string(path)?;
	parse_macro_pairs(&text)
}

/// Macro keys that are left alone on active lines when a rewrite runs
/// without area detector support.
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct ExclusionSet(BTreeSet<String>);

impl ExclusionSet {
	pub fn new<I, S>(keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(keys.into_iter().map(Into::into).collect())
	}

	/// An exclusion set that suppresses nothing.
	pub fn empty() -> Self {
		Self(BTreeSet::new())
	}

	pub fn is_excluded(&self, key: &str) -> bool {
		self.0.contains(key)
	}
}

impl Default for ExclusionSet {
	fn default() -> Self {
		Self::new(AREA_DETECTOR_MODULES)
	}
}
