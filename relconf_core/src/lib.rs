//! `relconf_core` customizes the `key=value` configuration files of a
//! multi-module build. It appends generated blocks to target files and
//! rewrites macro assignments from replacement lists, keeping comments and
//! unknown lines intact.
//!
//! ## Operations
//!
//! ```text
//! Injector spec (target + contents)
//!   → materialize_target (EXAMPLE_<name> → <name>, once)
//!   → append_block (start delimiter, contents, end delimiter)
//!
//! Macro pairs + target directory
//!   → move_to_backup (file → OLD_FILES/file)
//!   → rewrite_content (line by line)
//!   → write at the de-templated name
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Loading `relconf.toml` with its path macros, exclusion set,
//!   injection entries and macro rewrite jobs.
//! - [`paths`]: Resolving `$(NAME)` path macros to absolute paths.
//!
//! ## Key Types
//!
//! - [`InjectorSpec`]: One block of text bound for one target file.
//! - [`MacroPair`]: A `key=value` replacement.
//! - [`ExclusionSet`]: Module keys skipped on active lines when building
//!   without area detector support.
//! - [`MacroRewriter`]: Applies replacement lists to single files or whole
//!   directories.
//! - [`ApplyReport`]: Result of running a whole configuration.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use relconf_core::MacroPair;
//! use relconf_core::MacroRewriter;
//! use relconf_core::RewriteOptions;
//! use std::path::Path;
//!
//! let pairs = vec![MacroPair::new("SUPPORT", "/epics/support")];
//! let rewriter = MacroRewriter::default();
//!
//! let options = RewriteOptions {
//! 	comment_unsupported: true,
//! 	with_ad: false,
//! };
//! rewriter
//! 	.update_macros_in_file(&pairs, Path::new("support/configure"), "RELEASE", options)
//! 	.unwrap();
//! ```

pub use backup::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use injector::*;
pub use macros::*;
pub use paths::*;
pub use rewriter::*;
pub use template::*;

mod backup;
pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
mod injector;
mod macros;
pub mod paths;
mod rewriter;
mod template;
