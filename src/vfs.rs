//! Uniform navigation over plain directories and zip/jar archives.
//!
//! Archives are indexed once when opened: the central directory is read
//! through a memory map and every entry path is folded into a directory
//! tree, including parent directories that the archive never lists
//! explicitly. After that, navigating an archive never touches the disk.

use memmap2::Mmap;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zip::ZipArchive;

use crate::error::{ClassPathError, Result};

const ARCHIVE_EXTENSIONS: [&str; 2] = ["jar", "zip"];

/// Returns true for `.jar` and `.zip` names, ignoring case.
pub fn is_archive_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ARCHIVE_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}

/// A file or directory, either on disk or inside an archive.
#[derive(Debug, Clone)]
pub enum AbstractFile {
    Plain(PathBuf),
    Archived(ArchiveEntry),
}

#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    index: Arc<ArchiveIndex>,
    path: String,
    is_dir: bool,
}

#[derive(Debug)]
struct ArchiveIndex {
    archive: PathBuf,
    dirs: HashMap<String, Vec<IndexedChild>>,
}

#[derive(Debug, Clone)]
struct IndexedChild {
    name: String,
    is_dir: bool,
}

impl AbstractFile {
    /// Opens `path` as something that can be navigated like a directory.
    ///
    /// Directories become plain handles and readable `.jar`/`.zip` files
    /// become archive roots. Anything else, including missing paths and
    /// corrupt archives, yields `None`.
    pub fn get_directory(path: &Path) -> Option<AbstractFile> {
        if path.is_dir() {
            return Some(AbstractFile::Plain(path.to_path_buf()));
        }

        let is_archive = path
            .file_name()
            .is_some_and(|n| is_archive_name(&n.to_string_lossy()));
        if !is_archive || !path.is_file() {
            return None;
        }

        match ArchiveIndex::open(path) {
            Ok(index) => Some(AbstractFile::Archived(ArchiveEntry {
                index: Arc::new(index),
                path: String::new(),
                is_dir: true,
            })),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable archive");
                None
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            AbstractFile::Plain(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string()),
            AbstractFile::Archived(entry) => match entry.path.rsplit('/').next() {
                Some(last) if !last.is_empty() => last.to_string(),
                _ => entry
                    .index
                    .archive
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            },
        }
    }

    /// Display path; archive members render as `archive.jar!/a/b/C.class`.
    pub fn path(&self) -> String {
        match self {
            AbstractFile::Plain(path) => path.to_string_lossy().to_string(),
            AbstractFile::Archived(entry) if entry.path.is_empty() => {
                entry.index.archive.to_string_lossy().to_string()
            }
            AbstractFile::Archived(entry) => {
                format!("{}!/{}", entry.index.archive.display(), entry.path)
            }
        }
    }

    pub fn is_directory(&self) -> bool {
        match self {
            AbstractFile::Plain(path) => path.is_dir(),
            AbstractFile::Archived(entry) => entry.is_dir,
        }
    }

    /// Direct children. A directory that cannot be listed has none.
    pub fn children(&self) -> Vec<AbstractFile> {
        match self {
            AbstractFile::Plain(path) => list_plain_dir(path),
            AbstractFile::Archived(entry) => {
                let Some(children) = entry.index.dirs.get(&entry.path) else {
                    return Vec::new();
                };
                children
                    .iter()
                    .map(|child| {
                        AbstractFile::Archived(ArchiveEntry {
                            index: Arc::clone(&entry.index),
                            path: join_entry_path(&entry.path, &child.name),
                            is_dir: child.is_dir,
                        })
                    })
                    .collect()
            }
        }
    }
}

impl PartialEq for AbstractFile {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AbstractFile::Plain(a), AbstractFile::Plain(b)) => a == b,
            (AbstractFile::Archived(a), AbstractFile::Archived(b)) => {
                a.index.archive == b.index.archive && a.path == b.path
            }
            _ => false,
        }
    }
}

impl Eq for AbstractFile {}

fn list_plain_dir(dir: &Path) -> Vec<AbstractFile> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), error = %err, "directory not listable");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    paths.into_iter().map(AbstractFile::Plain).collect()
}

fn join_entry_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

impl ArchiveIndex {
    fn open(archive_path: &Path) -> Result<Self> {
        let io_err = |source| ClassPathError::Io {
            path: archive_path.to_path_buf(),
            source,
        };
        let zip_err = |source| ClassPathError::Archive {
            path: archive_path.to_path_buf(),
            source,
        };

        let file = File::open(archive_path).map_err(io_err)?;
        // SAFETY: The file is opened read-only and the map is dropped before
        // this function returns; only the derived index outlives it.
        let mmap = unsafe { Mmap::map(&file) }.map_err(io_err)?;
        let mut archive = ZipArchive::new(Cursor::new(&mmap[..])).map_err(zip_err)?;

        let mut builder = IndexBuilder::default();
        builder.dirs.entry(String::new()).or_default();
        for i in 0..archive.len() {
            let entry = archive.by_index(i).map_err(zip_err)?;
            builder.insert(entry.name(), entry.is_dir());
        }

        Ok(Self {
            archive: archive_path.to_path_buf(),
            dirs: builder.dirs,
        })
    }
}

#[derive(Default)]
struct IndexBuilder {
    dirs: HashMap<String, Vec<IndexedChild>>,
    seen: HashSet<String>,
}

impl IndexBuilder {
    fn insert(&mut self, raw: &str, is_dir: bool) {
        let parts: Vec<&str> = raw
            .split(['/', '\\'])
            .filter(|p| !p.is_empty() && *p != ".")
            .collect();
        let Some((last, parents)) = parts.split_last() else {
            return;
        };

        let mut parent = String::new();
        for part in parents {
            let path = join_entry_path(&parent, part);
            self.add_child(&parent, part, true, &path);
            parent = path;
        }
        let path = join_entry_path(&parent, last);
        self.add_child(&parent, last, is_dir, &path);
    }

    fn add_child(&mut self, parent: &str, name: &str, is_dir: bool, path: &str) {
        if is_dir {
            self.dirs.entry(path.to_string()).or_default();
        }
        if !self.seen.insert(path.to_string()) {
            return;
        }
        self.dirs
            .entry(parent.to_string())
            .or_default()
            .push(IndexedChild {
                name: name.to_string(),
                is_dir,
            });
    }
}
