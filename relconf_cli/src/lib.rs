use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Inject generated blocks and rewrite macros in build configuration files.",
	long_about = "relconf customizes the key=value configuration files (RELEASE, CONFIG_SITE, \
	              ...) of a multi-module build.\n\nIt appends generated blocks to target files \
	              and rewrites macro assignments from replacement lists, keeping comments and \
	              unknown lines. Every rewritten file is backed up to OLD_FILES/ first.\n\nQuick \
	              start:\n  relconf apply    Run the jobs in relconf.toml\n  relconf macros   \
	              Rewrite macros in one file or directory\n  relconf inject   Append injector \
	              files to their targets"
)]
pub struct RelconfCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory. Relative paths and `relconf.toml`
	/// are resolved against it.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output and debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Append injector files to their targets.
	///
	/// Each injector file names its target with a `__TARGET_LOC__=<path>`
	/// line; the remaining non-comment lines are appended between the
	/// auto-generated delimiters. A target named `EXAMPLE_<name>` is renamed
	/// to `<name>` first. Missing targets are skipped.
	Inject {
		/// Injector files to apply, in order.
		#[arg(required = true)]
		files: Vec<PathBuf>,
	},
	/// Rewrite macro assignments in one file or a whole directory.
	///
	/// Without `--file`, every file directly inside `--dir` is rewritten
	/// except `Makefile`, `*.pl` and `*.ioc`. Originals are moved to
	/// `OLD_FILES/` before the new file is written.
	Macros {
		/// Directory containing the configuration files. May use `$(NAME)`
		/// path macros from relconf.toml.
		#[arg(long)]
		dir: PathBuf,

		/// Rewrite only this file inside `--dir`.
		#[arg(long)]
		file: Option<String>,

		/// A `KEY=VALUE` replacement. Repeat for more; later values win.
		#[arg(long = "set", value_name = "KEY=VALUE")]
		values: Vec<String>,

		/// A file of `KEY=VALUE` lines applied after `--set` values.
		#[arg(long)]
		values_file: Option<PathBuf>,

		/// Comment out active macros that no replacement matches.
		#[arg(long, default_value_t = false, requires = "file")]
		comment_unsupported: bool,

		/// Leave area detector macros (the exclusion set) untouched on active
		/// lines.
		#[arg(long, default_value_t = false, requires = "file")]
		without_ad: bool,

		/// Print which files would change without writing anything.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// With `--dry-run`, show a diff of every change.
		#[arg(long, default_value_t = false, requires = "dry_run")]
		diff: bool,
	},
	/// Run every injection and macro job from relconf.toml.
	Apply {
		/// Output format for the run summary.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
