//! Naming and filtering policy shared by every node of one classpath tree.

use std::fmt;

use crate::error::{ClassPathError, Result};
use crate::vfs::AbstractFile;

pub const CLASS_SUFFIX: &str = ".class";
pub const META_INF: &str = "META-INF";

const TRAIT_IMPL_SUFFIX: &str = "$class.class";
const DEFAULT_SOURCE_EXTENSIONS: [&str; 2] = ["java", "scala"];

type NameFilter = dyn Fn(&str) -> bool + Send + Sync;
type BinaryNamer = dyn Fn(&AbstractFile) -> Result<String> + Send + Sync;

pub struct ClassPathContext {
    name_filter: Box<NameFilter>,
    binary_namer: Box<BinaryNamer>,
    source_extensions: Vec<String>,
}

impl ClassPathContext {
    pub fn new() -> Self {
        Self {
            name_filter: Box::new(|name: &str| !name.ends_with(TRAIT_IMPL_SUFFIX)),
            binary_namer: Box::new(default_binary_name),
            source_extensions: DEFAULT_SOURCE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    /// Replaces the predicate that decides which class files are visible.
    pub fn with_name_filter(
        mut self,
        filter: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.name_filter = Box::new(filter);
        self
    }

    pub fn with_binary_namer(
        mut self,
        namer: impl Fn(&AbstractFile) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        self.binary_namer = Box::new(namer);
        self
    }

    /// Extensions are given without the leading dot, e.g. `["java", "kt"]`.
    pub fn with_source_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn source_extensions(&self) -> &[String] {
        &self.source_extensions
    }

    pub fn is_valid_name(&self, name: &str) -> bool {
        (self.name_filter)(name)
    }

    pub fn is_valid_class_file(&self, name: &str) -> bool {
        name.ends_with(CLASS_SUFFIX) && self.is_valid_name(name)
    }

    pub fn is_valid_package(&self, name: &str) -> bool {
        !name.is_empty() && name != META_INF && !name.starts_with('.')
    }

    pub fn is_valid_source_file(&self, name: &str) -> bool {
        self.strip_source_extension(name).is_some()
    }

    pub fn binary_name(&self, file: &AbstractFile) -> Result<String> {
        (self.binary_namer)(file)
    }

    /// Canonical name of a source file: its file name minus the extension.
    pub fn source_name(&self, file: &AbstractFile) -> Result<String> {
        let name = file.name();
        self.strip_source_extension(&name)
            .map(str::to_string)
            .ok_or_else(|| ClassPathError::SourceExtension { file: file.path() })
    }

    fn strip_source_extension<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.source_extensions.iter().find_map(|ext| {
            name.strip_suffix(ext.as_str())
                .and_then(|rest| rest.strip_suffix('.'))
        })
    }
}

impl Default for ClassPathContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassPathContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassPathContext")
            .field("source_extensions", &self.source_extensions)
            .finish_non_exhaustive()
    }
}

fn default_binary_name(file: &AbstractFile) -> Result<String> {
    let name = file.name();
    name.strip_suffix(CLASS_SUFFIX)
        .map(str::to_string)
        .ok_or_else(|| ClassPathError::BinaryName {
            file: file.path(),
            suffix: CLASS_SUFFIX,
        })
}
