use std::path::Path;
use std::path::PathBuf;

/// Files whose name starts with this prefix are templates. The first time one
/// is used the prefix is dropped for good.
pub const TEMPLATE_PREFIX: &str = "EXAMPLE_";

/// Strip the template prefix from a file name, if present.
///
/// ```
/// use relconf_core::detemplated_name;
///
/// assert_eq!(detemplated_name("EXAMPLE_RELEASE.local"), "RELEASE.local");
/// assert_eq!(detemplated_name("RELEASE.local"), "RELEASE.local");
/// ```
pub fn detemplated_name(name: &str) -> &str {
	match name.strip_prefix(TEMPLATE_PREFIX) {
		Some(rest) if !rest.is_empty() => rest,
		_ => name,
	}
}

/// Whether the file name component of `path` carries the template prefix.
pub fn is_template(path: &Path) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| name.starts_with(TEMPLATE_PREFIX))
}

/// The path a template materializes to. Paths without the prefix are returned
/// unchanged.
pub fn detemplated_path(path: &Path) -> PathBuf {
	let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
		return path.to_path_buf();
	};

	path.with_file_name(detemplated_name(name))
}
