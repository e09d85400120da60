use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use relconf_cli::Commands;
use relconf_cli::OutputFormat;
use relconf_cli::RelconfCli;
use relconf_core::ApplyReport;
use relconf_core::InjectEntry;
use relconf_core::MacroJob;
use relconf_core::MacroRewriter;
use relconf_core::RelconfConfig;
use relconf_core::ResolvePath;
use relconf_core::RewritePreview;
use relconf_core::apply_config;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

/// Options of the `macros` subcommand.
struct MacrosArgs {
	job: MacroJob,
	dry_run: bool,
	diff: bool,
}

fn main() {
	let args = RelconfCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Inject { files }) => run_inject(&args, files),
		Some(Commands::Macros {
			dir,
			file,
			values,
			values_file,
			comment_unsupported,
			without_ad,
			dry_run,
			diff,
		}) => {
			let macros = MacrosArgs {
				job: MacroJob {
					dir: dir.clone(),
					file: file.clone(),
					comment_unsupported: *comment_unsupported,
					with_ad: !*without_ad,
					values: values.clone(),
					values_file: values_file.clone(),
				},
				dry_run: *dry_run,
				diff: *diff,
			};
			run_macros(&args, macros)
		}
		Some(Commands::Apply { format }) => run_apply(&args, *format),
		None => {
			eprintln!("No subcommand specified. Run `relconf --help` for usage.");
			process::exit(1);
		}
	};

	match result {
		Ok(true) => {}
		Ok(false) => process::exit(1),
		Err(e) => {
			// Try to render through miette for rich diagnostics with help text
			// and error codes.
			match e.downcast::<relconf_core::RelconfError>() {
				Ok(relconf_err) => {
					let report: miette::Report = (*relconf_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr. `RELCONF_LOG` takes an `EnvFilter` directive and wins over
/// `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_env("RELCONF_LOG")
		.unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.init();
}

fn resolve_root(args: &RelconfCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// The project config, or an empty one when no config file exists.
fn load_config(root: &Path) -> Result<RelconfConfig, Box<dyn std::error::Error>> {
	Ok(RelconfConfig::load(root)?.unwrap_or_default())
}

fn run_inject(args: &RelconfCli, files: &[PathBuf]) -> Result<bool, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = RelconfConfig {
		inject: files
			.iter()
			.map(|file| InjectEntry::File { file: file.clone() })
			.collect(),
		macros: Vec::new(),
		..load_config(&root)?
	};

	let report = apply_config(&root, &config)?;
	print_report(&report, &root, args.verbose);

	Ok(report.is_ok())
}

fn run_macros(args: &RelconfCli, macros: MacrosArgs) -> Result<bool, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = load_config(&root)?;

	if macros.dry_run {
		let resolver = config.resolver(&root);
		let rewriter = MacroRewriter::new(config.exclusion_set());
		let dir = resolver.resolve(&macros.job.dir)?;
		let pairs = macros.job.load_pairs(&resolver)?;

		let previews = match &macros.job.file {
			Some(file_name) => {
				vec![rewriter.preview_file(&pairs, &dir, file_name, macros.job.options())?]
			}
			None => rewriter.preview_directory(&pairs, &dir)?,
		};
		print_previews(&previews, &root, macros.diff);

		return Ok(true);
	}

	let config = RelconfConfig {
		inject: Vec::new(),
		macros: vec![macros.job],
		..config
	};
	let report = apply_config(&root, &config)?;

	if report.rewritten.is_empty() {
		println!("No files to rewrite.");
	} else {
		println!("Rewrote {} file(s).", report.rewritten.len());
		if args.verbose {
			for path in &report.rewritten {
				println!("  {}", make_relative(path, &root));
			}
		}
	}

	Ok(true)
}

fn run_apply(args: &RelconfCli, format: OutputFormat) -> Result<bool, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let Some(config) = RelconfConfig::load(&root)? else {
		return Err(format!(
			"no relconf.toml found in {}. Create one or pass --path.",
			root.display()
		)
		.into());
	};

	let report = apply_config(&root, &config)?;

	match format {
		OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
		OutputFormat::Text => print_report(&report, &root, args.verbose),
	}

	Ok(report.is_ok())
}

fn print_report(report: &ApplyReport, root: &Path, verbose: bool) {
	if !report.injected.is_empty() {
		println!(
			"{} into {} file(s).",
			colored!("Injected", green),
			report.injected.len()
		);
		if verbose {
			for path in &report.injected {
				println!("  {}", make_relative(path, root));
			}
		}
	}

	for target in &report.skipped_injections {
		println!(
			"{} {}: target does not exist",
			colored!("Skipped", yellow),
			make_relative(target, root)
		);
	}

	for failed in &report.failed_injections {
		eprintln!(
			"{} could not inject into {}: {}",
			colored!("error:", red),
			make_relative(&failed.target, root),
			failed.message
		);
	}

	if !report.rewritten.is_empty() {
		println!("Rewrote {} file(s).", report.rewritten.len());
		if verbose {
			for path in &report.rewritten {
				println!("  {}", make_relative(path, root));
			}
		}
	}

	if report.injected.is_empty()
		&& report.skipped_injections.is_empty()
		&& report.failed_injections.is_empty()
		&& report.rewritten.is_empty()
	{
		println!("Nothing to do.");
	}
}

fn print_previews(previews: &[RewritePreview], root: &Path, diff: bool) {
	let changed: Vec<_> = previews.iter().filter(|preview| preview.is_changed()).collect();
	if changed.is_empty() {
		println!("All files are already up to date.");
		return;
	}

	println!("Dry run: would rewrite {} file(s):", changed.len());
	for preview in changed {
		if preview.source == preview.output {
			println!("  {}", make_relative(&preview.output, root));
		} else {
			println!(
				"  {} -> {}",
				make_relative(&preview.source, root),
				make_relative(&preview.output, root)
			);
		}

		if diff {
			print_diff(&preview.original, &preview.rewritten);
		}
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
