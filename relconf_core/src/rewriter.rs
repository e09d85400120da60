use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::ExclusionSet;
use crate::MacroPair;
use crate::RelconfError;
use crate::RelconfResult;
use crate::backup::move_to_backup;
use crate::template::detemplated_name;

/// File names the directory batch driver never rewrites.
pub const BATCH_SKIPPED_NAMES: [&str; 1] = ["Makefile"];

/// File extensions the directory batch driver never rewrites.
pub const BATCH_SKIPPED_EXTENSIONS: [&str; 2] = [".pl", ".ioc"];

/// Switches for a single-file rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteOptions {
	/// Comment out active lines that no replacement pair matched.
	pub comment_unsupported: bool,
	/// When `false`, active lines whose key is in the exclusion set are not
	/// rewritten.
	pub with_ad: bool,
}

impl Default for RewriteOptions {
	fn default() -> Self {
		Self {
			comment_unsupported: false,
			with_ad: true,
		}
	}
}

/// How a normalized line is treated by the rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
	/// A `#` comment without `=`. Always passed through untouched.
	Note,
	/// An active `key=value` line.
	Assignment,
	/// A commented-out `#key=value` line.
	CommentedAssignment,
	/// Anything else: blank lines and text without `=`.
	Other,
}

impl LineKind {
	pub fn of(line: &str) -> Self {
		match (line.starts_with('#'), line.contains('=')) {
			(true, false) => Self::Note,
			(true, true) => Self::CommentedAssignment,
			(false, true) => Self::Assignment,
			(false, false) => Self::Other,
		}
	}
}

/// Trim a raw line. Active assignments additionally lose every space so that
/// `KEY = value` becomes `KEY=value`.
pub fn normalize_line(raw: &str) -> String {
	let line = raw.trim();
	if LineKind::of(line) == LineKind::Assignment {
		line.replace(' ', "")
	} else {
		line.to_string()
	}
}

/// Rewrite one line of a configuration file.
///
/// Every pair is tested against the line and each match replaces the
/// previous one, so the last matching pair wins. Exclusion only guards active
/// lines; commented-out assignments are always rewritten in place.
pub fn rewrite_line(
	raw: &str,
	pairs: &[MacroPair],
	exclusion: &ExclusionSet,
	options: RewriteOptions,
) -> String {
	let line = normalize_line(raw);
	if LineKind::of(&line) == LineKind::Note {
		return line;
	}

	let mut replacement = None;
	for pair in pairs {
		if line.starts_with(&pair.active_prefix())
			&& (options.with_ad || !exclusion.is_excluded(&pair.key))
		{
			replacement = Some(format!("{}={}", pair.key, pair.value));
		} else if line.starts_with(&pair.commented_prefix()) {
			replacement = Some(format!("#{}={}", pair.key, pair.value));
		}
	}

	if let Some(replacement) = replacement {
		debug!(from = %line, to = %replacement, "rewrote macro");
		return replacement;
	}

	if options.comment_unsupported && !line.is_empty() && !line.starts_with('#') {
		debug!(line = %line, "commented out unsupported line");
		return format!("#{line}");
	}

	line
}

/// Rewrite every line of `content`. The result always ends each line with
/// `\n`.
pub fn rewrite_content(
	content: &str,
	pairs: &[MacroPair],
	exclusion: &ExclusionSet,
	options: RewriteOptions,
) -> String {
	let mut result = String::with_capacity(content.len());
	for raw in content.lines() {
		result.push_str(&rewrite_line(raw, pairs, exclusion, options));
		result.push('\n');
	}
	result
}

/// Whether the directory batch driver rewrites a file with this name.
pub fn is_batch_candidate(file_name: &str) -> bool {
	!BATCH_SKIPPED_NAMES.contains(&file_name)
		&& !BATCH_SKIPPED_EXTENSIONS
			.iter()
			.any(|extension| file_name.ends_with(extension))
}

/// The outcome of a rewrite computed without touching the filesystem.
#[derive(Debug, Clone)]
pub struct RewritePreview {
	/// The file that would be read and backed up.
	pub source: PathBuf,
	/// The file that would be written. Differs from `source` for templates.
	pub output: PathBuf,
	/// Current content of `source`.
	pub original: String,
	/// Content that would be written to `output`.
	pub rewritten: String,
}

impl RewritePreview {
	/// Returns true if writing the preview would change anything on disk.
	pub fn is_changed(&self) -> bool {
		self.source != self.output || self.original != self.rewritten
	}
}

/// Applies macro replacement lists to configuration files.
#[derive(Debug, Clone, Default)]
pub struct MacroRewriter {
	exclusion: ExclusionSet,
}

impl MacroRewriter {
	pub fn new(exclusion: ExclusionSet) -> Self {
		Self { exclusion }
	}

	pub fn exclusion(&self) -> &ExclusionSet {
		&self.exclusion
	}

	/// Rewrite `content` with this rewriter's exclusion set.
	pub fn rewrite(&self, content: &str, pairs: &[MacroPair], options: RewriteOptions) -> String {
		rewrite_content(content, pairs, &self.exclusion, options)
	}

	/// Rewrite the macros of `dir/file_name` and return the path written.
	///
	/// The original moves to `dir/OLD_FILES/file_name` first. A template
	/// (`EXAMPLE_` prefix) is written back under its real name. If writing
	/// fails after the move, the backup is left in place and the original
	/// path stays vacant.
	pub fn update_macros_in_file(
		&self,
		pairs: &[MacroPair],
		dir: &Path,
		file_name: &str,
		options: RewriteOptions,
	) -> RelconfResult<PathBuf> {
		let source = dir.join(file_name);
		if !source.is_file() {
			return Err(RelconfError::MissingTarget {
				path: source.display().to_string(),
			});
		}

		let backup = move_to_backup(dir, file_name)?;
		let original = std::fs::read_to_string(&backup)?;
		let output = dir.join(detemplated_name(file_name));
		std::fs::write(&output, self.rewrite(&original, pairs, options))?;

		info!(
			output = %output.display(),
			comment_unsupported = options.comment_unsupported,
			with_ad = options.with_ad,
			"rewrote macros"
		);

		Ok(output)
	}

	/// Rewrite every regular file directly inside `dir` with default
	/// options, skipping `Makefile`, `*.pl` and `*.ioc`. A missing directory
	/// is not an error and yields no files.
	pub fn update_macros_in_directory(
		&self,
		pairs: &[MacroPair],
		dir: &Path,
	) -> RelconfResult<Vec<PathBuf>> {
		let mut written = Vec::new();
		for file_name in batch_file_names(dir)? {
			written.push(self.update_macros_in_file(
				pairs,
				dir,
				&file_name,
				RewriteOptions::default(),
			)?);
		}
		Ok(written)
	}

	/// Compute what [`Self::update_macros_in_file`] would write without
	/// moving or writing anything.
	pub fn preview_file(
		&self,
		pairs: &[MacroPair],
		dir: &Path,
		file_name: &str,
		options: RewriteOptions,
	) -> RelconfResult<RewritePreview> {
		let source = dir.join(file_name);
		if !source.is_file() {
			return Err(RelconfError::MissingTarget {
				path: source.display().to_string(),
			});
		}

		let original = std::fs::read_to_string(&source)?;
		let rewritten = self.rewrite(&original, pairs, options);

		Ok(RewritePreview {
			output: dir.join(detemplated_name(file_name)),
			source,
			original,
			rewritten,
		})
	}

	/// Preview every file the directory batch driver would rewrite.
	pub fn preview_directory(
		&self,
		pairs: &[MacroPair],
		dir: &Path,
	) -> RelconfResult<Vec<RewritePreview>> {
		batch_file_names(dir)?
			.iter()
			.map(|file_name| self.preview_file(pairs, dir, file_name, RewriteOptions::default()))
			.collect()
	}
}

/// Sorted names of the files the batch driver rewrites in `dir`.
fn batch_file_names(dir: &Path) -> RelconfResult<Vec<String>> {
	if !dir.is_dir() {
		debug!(dir = %dir.display(), "skipping missing macro directory");
		return Ok(Vec::new());
	}

	let mut names = Vec::new();
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		if !path.is_file() {
			continue;
		}

		let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
			debug!(path = %path.display(), "skipping file with a non UTF-8 name");
			continue;
		};

		if is_batch_candidate(name) {
			names.push(name.to_string());
		} else {
			debug!(file = name, "excluded from directory rewrite");
		}
	}

	names.sort();
	Ok(names)
}
