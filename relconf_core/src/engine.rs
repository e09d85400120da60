use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::MacroRewriter;
use crate::RelconfConfig;
use crate::RelconfResult;
use crate::ResolvePath;
use crate::inject_into_file;

/// An injection that could not be loaded or written.
#[derive(Debug, Clone, Serialize)]
pub struct FailedInjection {
	/// The resolved target that could not be written. When the entry itself
	/// failed to load this is the injector file or unresolved target instead.
	pub target: PathBuf,
	/// The error message.
	pub message: String,
}

/// Result of running a configuration.
#[derive(Debug, Default, Serialize)]
pub struct ApplyReport {
	/// Files that received an injected block, in order.
	pub injected: Vec<PathBuf>,
	/// Injection targets that did not exist.
	pub skipped_injections: Vec<PathBuf>,
	/// Injections that failed. These do not stop the run.
	pub failed_injections: Vec<FailedInjection>,
	/// Files written by macro rewrite jobs, in order.
	pub rewritten: Vec<PathBuf>,
}

impl ApplyReport {
	/// Returns true if every injection that had a target succeeded.
	pub fn is_ok(&self) -> bool {
		self.failed_injections.is_empty()
	}
}

/// Run every `[[inject]]` entry and then every `[[macros]]` job of `config`.
///
/// Injections are best effort: an entry that fails to load or write is logged
/// and recorded in the report, and the run moves on. Errors from macro
/// rewrites abort the run, since a failed rewrite can leave a file in
/// `OLD_FILES` with nothing at its original path.
pub fn apply_config(root: &Path, config: &RelconfConfig) -> RelconfResult<ApplyReport> {
	let resolver = config.resolver(root);
	let rewriter = MacroRewriter::new(config.exclusion_set());
	let mut report = ApplyReport::default();

	for entry in &config.inject {
		let spec = match entry.load(&resolver) {
			Ok(spec) => spec,
			Err(e) => {
				warn!(path = %entry.origin().display(), error = %e, "injection failed");
				report.failed_injections.push(FailedInjection {
					target: entry.origin().to_path_buf(),
					message: e.to_string(),
				});
				continue;
			}
		};

		match inject_into_file(&spec) {
			Ok(Some(path)) => report.injected.push(path),
			Ok(None) => report.skipped_injections.push(spec.target),
			Err(e) => {
				warn!(path = %spec.target.display(), error = %e, "injection failed");
				report.failed_injections.push(FailedInjection {
					target: spec.target,
					message: e.to_string(),
				});
			}
		}
	}

	for job in &config.macros {
		let dir = resolver.resolve(&job.dir)?;
		let pairs = job.load_pairs(&resolver)?;

		match &job.file {
			Some(file_name) => {
				report.rewritten.push(rewriter.update_macros_in_file(
					&pairs,
					&dir,
					file_name,
					job.options(),
				)?);
			}
			None => {
				report
					.rewritten
					.extend(rewriter.update_macros_in_directory(&pairs, &dir)?);
			}
		}
	}

	info!(
		injected = report.injected.len(),
		rewritten = report.rewritten.len(),
		"applied configuration"
	);

	Ok(report)
}
