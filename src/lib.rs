//! # classpath-resolver
//!
//! Resolves JVM-style classpaths into one merged, queryable package tree.
//!
//! ## Architecture
//!
//! - **vfs**: Plain directories and zip/jar archives behind one file handle
//! - **expand**: Path splitting and `*` wildcard expansion
//! - **context**: Name filtering and binary-name policy shared by every node
//! - **rep**: Class representations pairing a binary with its source
//! - **node**: The `ClassPath` trait and dotted-name lookup
//! - **directory**: Nodes over directories and archives of compiled classes
//! - **source**: Nodes over source trees
//! - **merged**: Unified view over several nodes
//! - **remote**: Codebase URL resolution and downloads
//! - **assembler**: Builds the full classpath from its path categories
//! - **config**: Settings resolution from flags and environment

pub mod assembler;
pub mod cli;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod expand;
pub mod merged;
pub mod node;
pub mod remote;
pub mod rep;
pub mod source;
pub mod vfs;

pub use assembler::ClassPathAssembler;
pub use config::ClassPathSettings;
pub use context::ClassPathContext;
pub use error::{ClassPathError, Result};
pub use node::{ClassPath, ClassPathKind, ClassPathRef};
pub use rep::ClassRep;
pub use vfs::AbstractFile;
