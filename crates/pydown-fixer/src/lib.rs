//! pydown-fixer: Layout fixers for unparsed Python source
//!
//! The unparser writes one statement per line with no blank lines. The
//! fixers here restore a conventional layout, and [`ExternalFormatter`] can
//! hand the result to a tool such as `yapf` or `black`.
//!
//! # Example
//!
//! ```ignore
//! use pydown_fixer::{FixerConfig, FixerRegistry};
//!
//! let registry = FixerRegistry::new();
//! let (formatted, edits) = registry.check_all(&source, &FixerConfig::default())?;
//! ```

pub mod config;
pub mod external;
pub mod fixers;

pub use config::{IndentStyle, LineEnding, WhitespaceConfig};
pub use external::{ExternalFormatter, FormatError};
pub use fixers::{Fixer, FixerConfig, FixerRegistry};
