use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::context::ClassPathContext;
use crate::error::Result;
use crate::node::{ClassPath, ClassPathKind, ClassPathRef, memoize};
use crate::rep::ClassRep;
use crate::vfs::AbstractFile;

/// Compiled classes in a plain directory or an archive root.
pub struct DirectoryClassPath {
    name: String,
    dir: AbstractFile,
    context: Arc<ClassPathContext>,
    classes: OnceLock<Vec<ClassRep>>,
    packages: OnceLock<Vec<ClassPathRef>>,
}

impl DirectoryClassPath {
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

impl ClassPath for DirectoryClassPath {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClassPathKind {
        ClassPathKind::Directory
    }

    fn classes(&self) -> Result<&[ClassRep]> {
        memoize(&self.classes, || {
            self.dir
                .children()
                .into_iter()
                .filter(|f| !f.is_directory() && self.context.is_valid_class_file(&f.name()))
                .map(|f| ClassRep::from_binary(f, &self.context))
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
                .map(|f| {
                    Arc::new(DirectoryClassPath::new(f, Arc::clone(&self.context))) as ClassPathRef
                })
                .collect())
        })
        .map(|v| v.as_slice())
    }

    fn source_paths(&self) -> Vec<AbstractFile> {
        Vec::new()
    }
}

impl fmt::Debug for DirectoryClassPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectoryClassPath({})", self.dir.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};
    use zip::write::{FileOptions, ZipWriter};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "classpath_dir_test_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"dummy").unwrap();
    }

    fn directory(path: &Path) -> DirectoryClassPath {
        let dir = AbstractFile::get_directory(path).unwrap();
        DirectoryClassPath::new(dir, Arc::new(ClassPathContext::new()))
    }

    fn class_names(cp: &dyn ClassPath) -> Vec<String> {
        cp.classes()
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    #[test]
    fn scans_only_direct_valid_children() {
        let base = temp_dir("direct_children");
        touch(&base.join("A.class"));
        touch(&base.join("A$class.class"));
        touch(&base.join("README.md"));
        touch(&base.join("pkg/B.class"));
        touch(&base.join("META-INF/MANIFEST.MF"));
        touch(&base.join(".hidden/C.class"));

        let cp = directory(&base);
        assert_eq!(class_names(&cp), vec!["A"]);

        let packages: Vec<&str> = cp.packages().unwrap().iter().map(|p| p.name()).collect();
        assert_eq!(packages, vec!["pkg"]);
        assert_eq!(cp.packages().unwrap()[0].kind(), ClassPathKind::Directory);
        assert!(cp.source_paths().is_empty());

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn results_are_cached_after_first_scan() {
        let base = temp_dir("cached");
        touch(&base.join("A.class"));

        let cp = directory(&base);
        assert_eq!(class_names(&cp), vec!["A"]);

        touch(&base.join("B.class"));
        assert_eq!(class_names(&cp), vec!["A"]);

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn finds_nested_classes_inside_archives() {
        let base = temp_dir("archive");
        fs::create_dir_all(&base).unwrap();
        let jar = base.join("lib.jar");
        let file = fs::File::create(&jar).unwrap();
        let mut zip = ZipWriter::new(file);
        zip.start_file("org/example/Widget.class", FileOptions::default())
            .unwrap();
        zip.write_all(b"dummy").unwrap();
        zip.finish().unwrap();

        let cp = directory(&jar);
        let rep = cp.find_class("org.example.Widget").unwrap().unwrap();
        assert_eq!(rep.name(), "Widget");
        assert!(rep.source().is_none());
        assert_eq!(
            rep.binary().unwrap().path(),
            format!("{}!/org/example/Widget.class", jar.display())
        );
        assert!(cp.find_class("org.example.Missing").unwrap().is_none());
        assert!(cp.find_class("com.example.Widget").unwrap().is_none());
        assert_eq!(cp.find_package("org.example").unwrap().unwrap().name(), "example");

        let _ = fs::remove_dir_all(base);
    }
}
