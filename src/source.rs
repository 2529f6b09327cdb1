use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::context::ClassPathContext;
use crate::error::Result;
use crate::node::{ClassPath, ClassPathKind, ClassPathRef, memoize};
use crate::rep::ClassRep;
use crate::vfs::AbstractFile;

/// A source tree. Every class it yields has a source file and no binary.
pub struct SourcePath {
    name: String,
    dir: AbstractFile,
    context: Arc<ClassPathContext>,
    classes: OnceLock<Vec<ClassRep>>,
    packages: OnceLock<Vec<ClassPathRef>>,
}

impl SourcePath {
    pub fn new(dir: AbstractFile, context: Arc<ClassPathContext>) -> Self {
        Self {
            name: dir.name(),
            dir,
            context,
            classes: OnceLock::new(),
            packages: OnceLock::new(),
        }
    }

    pub fn dir(&self) -> &AbstractFile {
        &self.dir
    }
}

impl ClassPath for SourcePath {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClassPathKind {
        ClassPathKind::Source
    }

    fn classes(&self) -> Result<&[ClassRep]> {
        memoize(&self.classes, || {
            self.dir
                .children()
                .into_iter()
                .filter(|f| !f.is_directory() && self.context.is_valid_source_file(&f.name()))
                .map(|f| ClassRep::from_source(f, &self.context))
                .collect()
        })
        .map(|v| v.as_slice())
    }

    fn packages(&self) -> Result<&[ClassPathRef]> {
        memoize(&self.packages, || {
            Ok(self
                .dir
                .children()
                .into_iter()
                .filter(|f| f.is_directory() && self.context.is_valid_package(&f.name()))
                .map(|f| Arc::new(SourcePath::new(f, Arc::clone(&self.context))) as ClassPathRef)
                .collect())
        })
        .map(|v| v.as_slice())
    }

    fn source_paths(&self) -> Vec<AbstractFile> {
        vec![self.dir.clone()]
    }
}

impl fmt::Debug for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourcePath({})", self.dir.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "classpath_source_test_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn source_tree_yields_source_only_reps() {
        let base = temp_dir("source_only");
        write_file(&base.join("a/Foo.java"), "class Foo {}");
        write_file(&base.join("a/Bar.scala"), "class Bar");
        write_file(&base.join("a/Baz.class"), "");
        write_file(&base.join("a/notes.txt"), "");

        let dir = AbstractFile::get_directory(&base).unwrap();
        let cp = SourcePath::new(dir.clone(), Arc::new(ClassPathContext::new()));

        assert_eq!(cp.kind(), ClassPathKind::Source);
        assert_eq!(cp.source_paths(), vec![dir]);

        let package = cp.find_package("a").unwrap().unwrap();
        let names: Vec<&str> = package.classes().unwrap().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Bar", "Foo"]);
        assert_eq!(package.kind(), ClassPathKind::Source);

        let foo = cp.find_class("a.Foo").unwrap().unwrap();
        assert!(foo.binary().is_none());
        let source = cp.find_source_file("a.Foo").unwrap().unwrap();
        assert_eq!(source.name(), "Foo.java");
        assert!(cp.find_class("a.Baz").unwrap().is_none());

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn source_extensions_follow_the_context() {
        let base = temp_dir("extensions");
        write_file(&base.join("Foo.java"), "");
        write_file(&base.join("Bar.kt"), "");

        let dir = AbstractFile::get_directory(&base).unwrap();
        let ctx = ClassPathContext::new().with_source_extensions(["kt"]);
        let cp = SourcePath::new(dir, Arc::new(ctx));

        let names: Vec<&str> = cp.classes().unwrap().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Bar"]);

        let _ = fs::remove_dir_all(base);
    }
}
