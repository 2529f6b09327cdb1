//! Builds the merged classpath from its five path categories.
//!
//! Precedence is fixed: boot, extension dirs, user path, codebase URLs,
//! then the source path. Segments that name nothing usable are skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ClassPathSettings;
use crate::context::ClassPathContext;
use crate::directory::DirectoryClassPath;
use crate::expand::expand_path;
use crate::merged::MergedClassPath;
use crate::node::ClassPathRef;
use crate::remote::{CurlFetcher, RemoteFetcher, resolve_url};
use crate::source::SourcePath;
use crate::vfs::{AbstractFile, is_archive_name};

pub struct ClassPathAssembler {
    context: Arc<ClassPathContext>,
    fetcher: Box<dyn RemoteFetcher>,
}

impl ClassPathAssembler {
    pub fn new(context: Arc<ClassPathContext>) -> Self {
        Self {
            context,
            fetcher: Box::new(CurlFetcher::new()),
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl RemoteFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn context(&self) -> &Arc<ClassPathContext> {
        &self.context
    }

    pub fn assemble(&self, settings: &ClassPathSettings) -> MergedClassPath {
        let base_dir = settings.base_dir.as_path();
        let mut entries = Vec::new();
        entries.extend(self.boot_entries(&settings.boot, base_dir));
        entries.extend(self.ext_entries(&settings.ext_dirs, base_dir));
        entries.extend(self.user_entries(&settings.user, base_dir));
        entries.extend(self.codebase_entries(&settings.codebase));
        if !settings.source.is_empty() {
            entries.extend(self.source_entries(&settings.source, base_dir));
        }

        tracing::debug!(entries = entries.len(), "assembled classpath");
        MergedClassPath::root(entries, Arc::clone(&self.context))
    }

    pub fn boot_entries(&self, path: &str, base_dir: &Path) -> Vec<ClassPathRef> {
        expand_path(path, false, base_dir)
            .iter()
            .filter_map(|segment| locate(base_dir, segment, "boot"))
            .map(|dir| self.directory(dir))
            .collect()
    }

    /// Every archive or sub-directory inside each listed directory becomes
    /// its own entry.
    pub fn ext_entries(&self, path: &str, base_dir: &Path) -> Vec<ClassPathRef> {
        expand_path(path, false, base_dir)
            .iter()
            .filter_map(|segment| match locate(base_dir, segment, "extdirs") {
                Some(dir @ AbstractFile::Plain(_)) => Some(dir),
                Some(_) => {
                    tracing::debug!(%segment, "skipping archive given as an extension directory");
                    None
                }
                None => None,
            })
            .flat_map(|dir| dir.children())
            .filter_map(|child| match child {
                AbstractFile::Plain(path) => AbstractFile::get_directory(&path),
                AbstractFile::Archived(_) => None,
            })
            .map(|dir| self.directory(dir))
            .collect()
    }

    pub fn user_entries(&self, path: &str, base_dir: &Path) -> Vec<ClassPathRef> {
        expand_path(path, true, base_dir)
            .iter()
            .filter_map(|segment| locate(base_dir, segment, "classpath"))
            .map(|dir| self.directory(dir))
            .collect()
    }

    pub fn codebase_entries(&self, specs: &str) -> Vec<ClassPathRef> {
        specs
            .split_whitespace()
            .filter_map(|spec| resolve_url(spec, self.fetcher.as_ref()))
            .map(|dir| self.directory(dir))
            .collect()
    }

    pub fn source_entries(&self, path: &str, base_dir: &Path) -> Vec<ClassPathRef> {
        expand_path(path, false, base_dir)
            .iter()
            .filter_map(|segment| locate(base_dir, segment, "sourcepath"))
            .map(|dir| Arc::new(SourcePath::new(dir, Arc::clone(&self.context))) as ClassPathRef)
            .collect()
    }

    fn directory(&self, dir: AbstractFile) -> ClassPathRef {
        Arc::new(DirectoryClassPath::new(dir, Arc::clone(&self.context)))
    }
}

fn locate(base_dir: &Path, segment: &str, category: &str) -> Option<AbstractFile> {
    let path = resolve_against(base_dir, segment);
    let dir = AbstractFile::get_directory(&path);
    if dir.is_none() {
        let kind = if is_archive_name(segment) {
            "unreadable archive"
        } else {
            "missing directory"
        };
        tracing::debug!(category, segment, kind, "skipping classpath segment");
    }
    dir
}

fn resolve_against(base_dir: &Path, segment: &str) -> PathBuf {
    let path = Path::new(segment);
    if path.is_absolute() || base_dir.as_os_str().is_empty() || base_dir == Path::new(".") {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
