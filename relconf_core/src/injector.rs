use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::RelconfError;
use crate::RelconfResult;
use crate::paths::ResolvePath;
use crate::template::detemplated_path;
use crate::template::is_template;

/// Written before every injected block. Other tooling scans for this exact
/// text, so it must not change.
pub const INJECTION_START: &str =
	"\n# ------------The following was auto-generated by installSynApps-------\n\n";

/// Written after every injected block.
pub const INJECTION_END: &str =
	"\n# --------------------------Auto-generated end----------------------\n";

/// The line in an injector file that names its target.
pub const TARGET_LOCATION_KEY: &str = "__TARGET_LOC__=";

/// One block of text to append to one target file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectorSpec {
	/// The file to append to. Empty means "nothing to do".
	pub target: PathBuf,
	/// The text to place between the delimiters.
	pub contents: Option<String>,
}

impl InjectorSpec {
	pub fn new(target: impl Into<PathBuf>, contents: Option<String>) -> Self {
		Self {
			target: target.into(),
			contents,
		}
	}

	/// Parse the text of an injector file.
	///
	/// The `__TARGET_LOC__=` line names the target. Every other line that is
	/// not a `#` comment becomes part of the contents.
	pub fn parse(text: &str) -> RelconfResult<Self> {
		Self::parse_with_origin(text, "<input>")
	}

	/// Read and parse an injector file.
	pub fn from_file(path: &Path) -> RelconfResult<Self> {
		let text = std::fs::read_to_string(path)?;
		Self::parse_with_origin(&text, &path.display().to_string())
	}

	fn parse_with_origin(text: &str, origin: &str) -> RelconfResult<Self> {
		let mut target = None;
		let mut contents = String::new();

		for line in text.lines() {
			if let Some(location) = line.trim().strip_prefix(TARGET_LOCATION_KEY) {
				if target.is_some() {
					return Err(RelconfError::InvalidInjectorFile {
						path: origin.to_string(),
						reason: format!("more than one `{TARGET_LOCATION_KEY}` line"),
					});
				}
				target = Some(PathBuf::from(location.trim()));
			} else if !line.trim_start().starts_with('#') {
				contents.push_str(line);
				contents.push('\n');
			}
		}

		let Some(target) = target else {
			return Err(RelconfError::InvalidInjectorFile {
				path: origin.to_string(),
				reason: format!("no `{TARGET_LOCATION_KEY}` line"),
			});
		};

		Ok(Self {
			target,
			contents: (!contents.is_empty()).then_some(contents),
		})
	}

	/// Return a copy whose target went through `resolver`. An empty target
	/// stays empty.
	pub fn resolved(&self, resolver: &impl ResolvePath) -> RelconfResult<Self> {
		if self.target.as_os_str().is_empty() {
			return Ok(self.clone());
		}

		Ok(Self {
			target: resolver.resolve(&self.target)?,
			contents: self.contents.clone(),
		})
	}
}

/// Find the file an injection should append to.
///
/// Returns `None` when the target is empty or neither it nor its
/// de-templated form exists. A template that still exists is renamed to its
/// real name here, once, and the real name is returned.
pub fn materialize_target(target: &Path) -> RelconfResult<Option<PathBuf>> {
	if target.as_os_str().is_empty() {
		return Ok(None);
	}

	let real = detemplated_path(target);
	if !target.exists() && !real.exists() {
		debug!(path = %target.display(), "injection target does not exist");
		return Ok(None);
	}

	if !is_template(target) {
		return Ok(Some(target.to_path_buf()));
	}

	if target.exists() {
		std::fs::rename(target, &real)?;
		info!(from = %target.display(), to = %real.display(), "materialized template");
	}

	Ok(Some(real))
}

/// Append one delimited block to an existing file.
pub fn append_block(path: &Path, contents: Option<&str>) -> RelconfResult<()> {
	let mut block = String::from(INJECTION_START);
	if let Some(contents) = contents {
		block.push_str(contents);
	}
	block.push_str(INJECTION_END);

	let mut file = std::fs::OpenOptions::new().append(true).open(path)?;
	file.write_all(block.as_bytes())?;
	file.flush()?;

	Ok(())
}

/// Append `spec.contents` to its target, materializing a template target
/// first. Returns the file written, or `None` if there was nothing to inject
/// into. The target must already be an absolute path.
///
/// Running this twice appends two blocks.
pub fn inject_into_file(spec: &InjectorSpec) -> RelconfResult<Option<PathBuf>> {
	let Some(path) = materialize_target(&spec.target)? else {
		return Ok(None);
	};

	append_block(&path, spec.contents.as_deref())?;
	info!(path = %path.display(), "injected block");

	Ok(Some(path))
}
