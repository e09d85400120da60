use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum RelconfError {
	#[error(transparent)]
	#[diagnostic(code(relconf::io_error))]
	Io(#[from] std::io::Error),

	#[error("cannot rewrite macros: `{path}` does not exist")]
	#[diagnostic(
		code(relconf::missing_target),
		help("check the target directory and file name, or rewrite the whole directory instead")
	)]
	MissingTarget { path: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(relconf::config_parse),
		help("check that relconf.toml is valid TOML with [paths], [[inject]] and/or [[macros]] tables")
	)]
	ConfigParse(String),

	#[error("invalid macro on line {line}: `{content}`")]
	#[diagnostic(
		code(relconf::invalid_macro_line),
		help("macro lists contain `KEY=VALUE` lines; comments start with `#`")
	)]
	InvalidMacroLine { line: usize, content: String },

	#[error("invalid injector file `{path}`: {reason}")]
	#[diagnostic(
		code(relconf::invalid_injector_file),
		help("injector files name their target with a `__TARGET_LOC__=<path>` line")
	)]
	InvalidInjectorFile { path: String, reason: String },

	#[error("unknown path macro `$({name})` in `{path}`")]
	#[diagnostic(
		code(relconf::unknown_path_macro),
		help("define `{name}` in the [paths] table of relconf.toml")
	)]
	UnknownPathMacro { name: String, path: String },

	#[error("path macros in `{path}` reference each other in a cycle")]
	#[diagnostic(code(relconf::path_macro_cycle))]
	PathMacroCycle { path: String },
}

pub type RelconfResult<T> = Result<T, RelconfError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
