//! One logical node over several classpath nodes.
//!
//! Entries are consulted in order. For classes the first entry to mention a
//! name fixes its position and any reference it carries; later entries can
//! only fill in a missing binary or source file. Packages of the same name
//! are unified into nested merged nodes, so the rule applies at every depth.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::context::ClassPathContext;
use crate::error::Result;
use crate::node::{ClassPath, ClassPathKind, ClassPathRef, memoize};
use crate::rep::ClassRep;
use crate::vfs::AbstractFile;

pub struct MergedClassPath {
    name: String,
    entries: Vec<ClassPathRef>,
    context: Arc<ClassPathContext>,
    classes: OnceLock<Vec<ClassRep>>,
    packages: OnceLock<Vec<ClassPathRef>>,
}

impl MergedClassPath {
    /// Merges same-named packages; the view takes the first entry's name.
    pub fn new(entries: Vec<ClassPathRef>, context: Arc<ClassPathContext>) -> Self {
        let name = entries
            .first()
            .map(|e| e.name().to_string())
            .unwrap_or_default();
        Self::named(name, entries, context)
    }

    /// The unnamed top-level package over a whole classpath.
    pub fn root(entries: Vec<ClassPathRef>, context: Arc<ClassPathContext>) -> Self {
        Self::named(String::new(), entries, context)
    }

    fn named(name: String, entries: Vec<ClassPathRef>, context: Arc<ClassPathContext>) -> Self {
        Self {
            name,
            entries,
            context,
            classes: OnceLock::new(),
            packages: OnceLock::new(),
        }
    }

    pub fn entries(&self) -> &[ClassPathRef] {
        &self.entries
    }

    pub fn context(&self) -> &Arc<ClassPathContext> {
        &self.context
    }

    fn merge_classes(&self) -> Result<Vec<ClassRep>> {
        let mut merged: Vec<ClassRep> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in &self.entries {
            for class in entry.classes()? {
                match index.get(class.name()) {
                    Some(&i) => merged[i].complete_from(class),
                    None => {
                        index.insert(class.name().to_string(), merged.len());
                        merged.push(class.clone());
                    }
                }
            }
        }

        Ok(merged)
    }

    fn merge_packages(&self) -> Result<Vec<ClassPathRef>> {
        let mut groups: Vec<Vec<ClassPathRef>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in &self.entries {
            for package in entry.packages()? {
                match index.get(package.name()) {
                    Some(&i) => groups[i].push(Arc::clone(package)),
                    None => {
                        index.insert(package.name().to_string(), groups.len());
                        groups.push(vec![Arc::clone(package)]);
                    }
                }
            }
        }

        Ok(groups
            .into_iter()
            .map(|mut group| {
                if group.len() == 1 {
                    group.remove(0)
                } else {
                    Arc::new(MergedClassPath::new(group, Arc::clone(&self.context))) as ClassPathRef
                }
            })
            .collect())
    }
}

impl ClassPath for MergedClassPath {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClassPathKind {
        ClassPathKind::Merged
    }

    fn classes(&self) -> Result<&[ClassRep]> {
        memoize(&self.classes, || self.merge_classes()).map(|v| v.as_slice())
    }

    fn packages(&self) -> Result<&[ClassPathRef]> {
        memoize(&self.packages, || self.merge_packages()).map(|v| v.as_slice())
    }

    fn source_paths(&self) -> Vec<AbstractFile> {
        self.entries.iter().flat_map(|e| e.source_paths()).collect()
    }
}

impl fmt::Debug for MergedClassPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergedClassPath")
            .field("name", &self.name)
            .field("entries", &self.entries)
            .finish()
    }
}
