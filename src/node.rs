//! The classpath node abstraction.
//!
//! A node is one package of the classpath (the root being the unnamed
//! package). Three kinds exist: a source tree, a directory or archive of
//! compiled classes, and a merged view over several nodes. Lookups walk the
//! tree one dotted segment at a time.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error::Result;
use crate::rep::ClassRep;
use crate::vfs::AbstractFile;

pub type ClassPathRef = Arc<dyn ClassPath>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassPathKind {
    Source,
    Directory,
    Merged,
}

pub trait ClassPath: fmt::Debug + Send + Sync {
    /// Simple (undotted) package name.
    fn name(&self) -> &str;

    fn kind(&self) -> ClassPathKind;

    /// Classes directly in this package, computed once.
    fn classes(&self) -> Result<&[ClassRep]>;

    /// Sub-packages directly in this package, computed once.
    fn packages(&self) -> Result<&[ClassPathRef]>;

    /// Source tree roots contributing to this node.
    fn source_paths(&self) -> Vec<AbstractFile>;

    /// Resolves a dotted name such as `java.lang.String`. Unknown names
    /// yield `Ok(None)`.
    fn find_class(&self, name: &str) -> Result<Option<&ClassRep>> {
        match name.split_once('.') {
            None => Ok(self.classes()?.iter().find(|c| c.name() == name)),
            Some((package, rest)) => match self.child_package(package)? {
                Some(child) => child.find_class(rest),
                None => Ok(None),
            },
        }
    }

    fn find_source_file(&self, name: &str) -> Result<Option<&AbstractFile>> {
        Ok(self.find_class(name)?.and_then(|c| c.source()))
    }

    /// Resolves a dotted package name such as `java.lang`.
    fn find_package(&self, name: &str) -> Result<Option<&ClassPathRef>> {
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        match (self.child_package(head)?, rest) {
            (Some(child), Some(rest)) => child.find_package(rest),
            (found, _) => Ok(found),
        }
    }

    fn child_package(&self, name: &str) -> Result<Option<&ClassPathRef>> {
        Ok(self.packages()?.iter().find(|p| p.name() == name))
    }
}

/// Returns the cached value, computing and storing it on first use. A
/// failed computation stores nothing.
pub(crate) fn memoize<T>(cell: &OnceLock<T>, compute: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = compute()?;
    Ok(cell.get_or_init(|| value))
}
