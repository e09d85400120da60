use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

use crate::ExclusionSet;
use crate::InjectorSpec;
use crate::MacroPair;
use crate::MacroPathResolver;
use crate::RelconfError;
use crate::RelconfResult;
use crate::ResolvePath;
use crate::RewriteOptions;
use crate::load_macro_pairs;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["relconf.toml", ".relconf.toml", ".config/relconf.toml"];

/// Configuration loaded from a `relconf.toml` file.
///
/// ```toml
/// exclusion = ["ADCORE", "AREA_DETECTOR", "ADSUPPORT"]
///
/// [paths]
/// INSTALL = "/epics/src"
/// SUPPORT = "$(INSTALL)/support"
///
/// [[inject]]
/// file = "injectionFiles/AD_RELEASE_CONFIG"
///
/// [[inject]]
/// target = "$(SUPPORT)/configure/EXAMPLE_CONFIG_SITE.local"
/// contents = "CROSS_COMPILER_TARGET_ARCHS ="
///
/// [[macros]]
/// dir = "$(SUPPORT)/configure"
/// file = "RELEASE"
/// comment_unsupported = true
/// with_ad = false
/// values = ["SUPPORT=$(SUPPORT)"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct RelconfConfig {
	/// Path macros available as `$(NAME)` in every configured path and macro
	/// value.
	#[serde(default)]
	pub paths: BTreeMap<String, String>,
	/// Replaces the default area detector exclusion set when present.
	#[serde(default)]
	pub exclusion: Option<Vec<String>>,
	/// Blocks to append, in order.
	#[serde(default)]
	pub inject: Vec<InjectEntry>,
	/// Macro rewrite jobs, run after all injections, in order.
	#[serde(default)]
	pub macros: Vec<MacroJob>,
}

/// An `[[inject]]` entry: either an injector file on disk or an inline
/// target and contents.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
#[non_exhaustive]
pub enum InjectEntry {
	File {
		file: PathBuf,
	},
	Inline {
		target: PathBuf,
		#[serde(default)]
		contents: Option<String>,
	},
}

impl InjectEntry {
	/// The injector file or inline target this entry was written with, before
	/// any path macros are expanded.
	pub fn origin(&self) -> &Path {
		match self {
			Self::File { file } => file,
			Self::Inline { target, .. } => target,
		}
	}

	/// Build the injector spec for this entry with its target resolved.
	pub fn load(&self, resolver: &MacroPathResolver) -> RelconfResult<InjectorSpec> {
		let spec = match self {
			Self::File { file } => InjectorSpec::from_file(&resolver.resolve(file)?)?,
			Self::Inline { target, contents } => InjectorSpec::new(target.clone(), contents.clone()),
		};

		spec.resolved(resolver)
	}
}

/// A `[[macros]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MacroJob {
	/// Directory holding the files to rewrite.
	pub dir: PathBuf,
	/// A single file inside `dir`. When absent the whole directory is
	/// rewritten.
	#[serde(default)]
	pub file: Option<String>,
	#[serde(default)]
	pub comment_unsupported: bool,
	#[serde(default = "default_with_ad")]
	pub with_ad: bool,
	/// Inline `KEY=VALUE` replacements.
	#[serde(default)]
	pub values: Vec<String>,
	/// A macro list file whose pairs follow `values`.
	#[serde(default)]
	pub values_file: Option<PathBuf>,
}

fn default_with_ad() -> bool {
	true
}

impl MacroJob {
	pub fn options(&self) -> RewriteOptions {
		RewriteOptions {
			comment_unsupported: self.comment_unsupported,
			with_ad: self.with_ad,
		}
	}

	/// Collect the replacement pairs for this job. Path macros inside values
	/// are expanded.
	pub fn load_pairs(&self, resolver: &MacroPathResolver) -> RelconfResult<Vec<MacroPair>> {
		let mut pairs = Vec::with_capacity(self.values.len());
		for (index, value) in self.values.iter().enumerate() {
			let pair = value.parse::<MacroPair>().map_err(|_| {
				RelconfError::InvalidMacroLine {
					line: index + 1,
					content: value.clone(),
				}
			})?;
			pairs.push(MacroPair::new(pair.key, resolver.expand(&pair.value)?));
		}

		if let Some(values_file) = &self.values_file {
			for pair in load_macro_pairs(&resolver.resolve(values_file)?)? {
				pairs.push(MacroPair::new(pair.key, resolver.expand(&pair.value)?));
			}
		}

		if self.file.is_none() && self.options() != RewriteOptions::default() {
			warn!(
				dir = %self.dir.display(),
				"comment_unsupported and with_ad only apply to single-file jobs"
			);
		}

		Ok(pairs)
	}
}

impl RelconfConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> RelconfResult<Option<RelconfConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		Self::parse(&content).map(Some)
	}

	pub fn parse(content: &str) -> RelconfResult<RelconfConfig> {
		toml::from_str(content).map_err(|e| RelconfError::ConfigParse(e.to_string()))
	}

	/// The exclusion set configured for this project, or the area detector
	/// default.
	pub fn exclusion_set(&self) -> ExclusionSet {
		self.exclusion
			.as_ref()
			.map_or_else(ExclusionSet::default, |keys| ExclusionSet::new(keys.iter().cloned()))
	}

	/// A resolver for this config's path macros anchored at `root`.
	pub fn resolver(&self, root: &Path) -> MacroPathResolver {
		MacroPathResolver::new(root, self.paths.clone())
	}
}
