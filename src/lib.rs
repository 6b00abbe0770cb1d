//! twoslash-verify library
//!
//! This library verifies annotated TypeScript code samples embedded in
//! documentation markdown. Each fenced code block marked with the `twoslash`
//! keyword is routed to the compiler configuration context governing it
//! (explicitly declared, or inferred from a bracketed filename against the
//! project's include/exclude patterns), given a synthetic prologue that
//! makes ambient declarations visible, and type-checked; failures are
//! collected with `file:line` attribution and reported at the end of the
//! run. The primary interface is the `twoslash-verify` binary, but the
//! library can be used programmatically.
//!
//! ## Public API
//!
//! The main entry point is [`verifier::verify`], driven by
//! [`verifier::VerifyOptions`].
//!
//! Additional building blocks:
//! - [`config::load_config_set`] - Discover and parse project configurations
//! - [`context::detect_context`] - Decide which context governs a sample
//! - [`options::compiler_options_for_context`] - Flatten per-context options
//! - [`prologue::build_prologue`] - Synthetic header for virtual source files
//! - [`extractor::extract_samples`] - Pull annotated blocks out of markdown
//! - [`checker::TscChecker`] - The shipped type-checking capability

pub mod checker;
pub mod cli;
pub mod config;
pub mod context;
pub mod declarations;
pub mod extractor;
pub mod language;
pub mod options;
pub mod prologue;
mod reporting;
pub mod verifier;

pub use checker::{OptionsMerger, SampleChecker, TscChecker};
pub use config::{load_config_set, ConfigEntry, ConfigSet};
pub use context::{detect_context, Context};
pub use extractor::{extract_samples, CodeSample};
pub use options::{compiler_options_for_context, merge_ordered};
pub use prologue::build_prologue;
pub use verifier::{verify, VerificationError, VerificationSession, VerifyOptions};
