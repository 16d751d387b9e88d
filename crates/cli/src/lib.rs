#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/cli/src/lib.rs
//!
//! # Overview
//!
//! `cli` implements `sharelogctl`, the administration tool for the shared
//! sharelog registry. It lists contexts, changes levels and flags, writes
//! test lines and hex dumps, triggers a configuration reload, toggles
//! developer mode and prints the error taxonomy.
//!
//! # Design
//!
//! [`run`] accepts an iterator of arguments together with handles for
//! standard output and error and returns the process exit code, so the
//! binary entry point stays a one-liner and tests drive the tool in memory.
//! [`run_with`] additionally takes the [`logging::Options`] and the sink
//! used for emitted lines. A [`clap`] builder command does the parsing.
//!
//! # Invariants
//!
//! - `run` never panics; failures surface as exit codes.
//! - The registry is attached only for commands that need it; `errors` and
//!   usage errors never touch the shared region.
//!
//! # Errors
//!
//! Usage errors exit with [`EXIT_USAGE`]; failed registry or logging
//! operations exit with [`EXIT_FAILURE`] after one `sharelogctl: ...` line on
//! standard error.
//!
//! # Examples
//!
//! ```
//! use cli::{EXIT_SUCCESS, run};
//!
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let exit_code = run(["sharelogctl", "errors"], &mut stdout, &mut stderr);
//!
//! assert_eq!(exit_code, EXIT_SUCCESS);
//! assert!(String::from_utf8(stdout).unwrap().contains("ContextNotFound"));
//! assert!(stderr.is_empty());
//! ```

mod frontend;

pub use frontend::{EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE, PROGRAM_NAME, TRACE_ENV, run, run_with};
