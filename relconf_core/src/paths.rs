use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use crate::RelconfError;
use crate::RelconfResult;

/// Maximum nesting of `$(NAME)` references before giving up.
pub const MAX_PATH_MACRO_DEPTH: usize = 16;

/// Turns a configured path into an absolute filesystem path.
pub trait ResolvePath {
	fn resolve(&self, path: &Path) -> RelconfResult<PathBuf>;
}

/// Expands `$(NAME)` references from a table of path macros and anchors
/// relative results at a root directory.
///
/// ```
/// use std::collections::BTreeMap;
/// use std::path::Path;
///
/// use relconf_core::MacroPathResolver;
/// use relconf_core::ResolvePath;
///
/// let mut macros = BTreeMap::new();
/// macros.insert("INSTALL".to_string(), "/epics/src".to_string());
/// macros.insert("SUPPORT".to_string(), "$(INSTALL)/support".to_string());
///
/// let resolver = MacroPathResolver::new("/work", macros);
/// let resolved = resolver.resolve(Path::new("$(SUPPORT)/configure/RELEASE")).unwrap();
/// assert_eq!(resolved, Path::new("/epics/src/support/configure/RELEASE"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MacroPathResolver {
	root: PathBuf,
	macros: BTreeMap<String, String>,
}

impl MacroPathResolver {
	pub fn new(root: impl Into<PathBuf>, macros: BTreeMap<String, String>) -> Self {
		Self {
			root: root.into(),
			macros,
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Expand every `$(NAME)` reference in `text`, following references
	/// inside macro values.
	pub fn expand(&self, text: &str) -> RelconfResult<String> {
		let mut current = text.to_string();
		for _ in 0..=MAX_PATH_MACRO_DEPTH {
			let (next, replaced) = self.expand_once(&current, text)?;
			if !replaced {
				return Ok(next);
			}
			current = next;
		}

		Err(RelconfError::PathMacroCycle {
			path: text.to_string(),
		})
	}

	fn expand_once(&self, text: &str, origin: &str) -> RelconfResult<(String, bool)> {
		let mut expanded = String::with_capacity(text.len());
		let mut rest = text;
		let mut replaced = false;

		while let Some(start) = rest.find("$(") {
			let after = &rest[start + 2..];
			let Some(end) = after.find(')') else {
				break;
			};

			let name = &after[..end];
			let Some(value) = self.macros.get(name) else {
				return Err(RelconfError::UnknownPathMacro {
					name: name.to_string(),
					path: origin.to_string(),
				});
			};

			expanded.push_str(&rest[..start]);
			expanded.push_str(value);
			rest = &after[end + 1..];
			replaced = true;
		}

		expanded.push_str(rest);
		Ok((expanded, replaced))
	}

	fn anchor(&self, path: &Path) -> PathBuf {
		if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.root.join(path)
		}
	}
}

impl ResolvePath for MacroPathResolver {
	fn resolve(&self, path: &Path) -> RelconfResult<PathBuf> {
		let Some(text) = path.to_str() else {
			return Ok(self.anchor(path));
		};

		let expanded = self.expand(text)?;
		Ok(self.anchor(Path::new(&expanded)))
	}
}
