use crate::context::ClassPathContext;
use crate::error::{ClassPathError, Result};
use crate::vfs::AbstractFile;

/// A class known to the classpath: its compiled file, its source file, or
/// both, under one canonical simple name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRep {
    name: String,
    binary: Option<AbstractFile>,
    source: Option<AbstractFile>,
}

impl ClassRep {
    /// The binary file names the class when present; otherwise the source
    /// file does.
    pub fn new(
        binary: Option<AbstractFile>,
        source: Option<AbstractFile>,
        context: &ClassPathContext,
    ) -> Result<Self> {
        let name = match (&binary, &source) {
            (Some(b), _) => context.binary_name(b)?,
            (None, Some(s)) => context.source_name(s)?,
            (None, None) => return Err(ClassPathError::EmptyClassRep),
        };
        Ok(Self {
            name,
            binary,
            source,
        })
    }

    pub fn from_binary(binary: AbstractFile, context: &ClassPathContext) -> Result<Self> {
        Self::new(Some(binary), None, context)
    }

    pub fn from_source(source: AbstractFile, context: &ClassPathContext) -> Result<Self> {
        Self::new(None, Some(source), context)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binary(&self) -> Option<&AbstractFile> {
        self.binary.as_ref()
    }

    pub fn source(&self) -> Option<&AbstractFile> {
        self.source.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.binary.is_some() && self.source.is_some()
    }

    /// Fills whichever references are missing here from `other`. Existing
    /// references and the name are never replaced.
    pub(crate) fn complete_from(&mut self, other: &ClassRep) {
        if self.binary.is_none() && other.binary.is_some() {
            self.binary = other.binary.clone();
        }
        if self.source.is_none() && other.source.is_some() {
            self.source = other.source.clone();
        }
    }
}
