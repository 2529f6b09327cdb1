//! Resolution of codebase URLs to archive roots.
//!
//! `file:` URLs are opened in place. Other URLs go through a
//! [`RemoteFetcher`]; the default one shells out to `curl` (or the program
//! named by `CLASSPATH_RESOLVER_CURL`) and downloads into a scratch
//! directory. On drop the fetcher removes the files it downloaded, and the
//! directory too if it created it. Archives are fully indexed on open, so
//! the downloads are not needed afterwards.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

use crate::error::{ClassPathError, Result};
use crate::vfs::{AbstractFile, is_archive_name};

pub trait RemoteFetcher: Send + Sync {
    /// Makes the archive behind `url` available locally and returns its path.
    fn fetch(&self, url: &Url) -> Result<PathBuf>;
}

#[derive(Debug)]
pub struct CurlFetcher {
    program: PathBuf,
    download_dir: PathBuf,
    created_dir: AtomicBool,
    downloaded: Mutex<Vec<PathBuf>>,
}

impl CurlFetcher {
    pub fn new() -> Self {
        let program = std::env::var("CLASSPATH_RESOLVER_CURL").unwrap_or_else(|_| "curl".into());
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let download_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("classpath-resolver")
            .join(format!("remote-{}-{nanos}", std::process::id()));
        Self {
            program: PathBuf::from(program),
            download_dir,
            created_dir: AtomicBool::new(false),
            downloaded: Mutex::new(Vec::new()),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    fn target_for(&self, url: &Url) -> PathBuf {
        let digest = hex::encode(Sha256::digest(url.as_str().as_bytes()));
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("archive.jar");
        self.download_dir
            .join(format!("{}-{file_name}", &digest[..16]))
    }
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteFetcher for CurlFetcher {
    fn fetch(&self, url: &Url) -> Result<PathBuf> {
        let fail = |reason: String| ClassPathError::Fetch {
            url: url.to_string(),
            reason,
        };

        if !matches!(url.scheme(), "http" | "https") {
            return Err(fail(format!("unsupported scheme {}", url.scheme())));
        }

        if !self.download_dir.exists() {
            std::fs::create_dir_all(&self.download_dir).map_err(|source| ClassPathError::Io {
                path: self.download_dir.clone(),
                source,
            })?;
            self.created_dir.store(true, Ordering::SeqCst);
        }

        let target = self.target_for(url);
        tracing::info!(%url, target = %target.display(), "downloading codebase archive");
        let output = Command::new(&self.program)
            .arg("-L")
            .arg("--fail")
            .arg("--silent")
            .arg("--show-error")
            .arg("-o")
            .arg(&target)
            .arg(url.as_str())
            .output()
            .map_err(|e| fail(format!("failed to execute {}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!("curl exited with {}: {}", output.status, stderr.trim())));
        }

        if let Ok(mut downloaded) = self.downloaded.lock() {
            downloaded.push(target.clone());
        }
        Ok(target)
    }
}

impl Drop for CurlFetcher {
    fn drop(&mut self) {
        if *self.created_dir.get_mut() {
            let _ = std::fs::remove_dir_all(&self.download_dir);
            return;
        }
        if let Ok(downloaded) = self.downloaded.get_mut() {
            for file in downloaded.drain(..) {
                let _ = std::fs::remove_file(file);
            }
        }
    }
}

/// Resolves one codebase URL spec to an archive root.
///
/// Specs that do not parse, do not name a `.jar`/`.zip`, or cannot be
/// fetched or opened yield `None`.
pub fn resolve_url(spec: &str, fetcher: &dyn RemoteFetcher) -> Option<AbstractFile> {
    let url = match Url::parse(spec) {
        Ok(url) => url,
        Err(err) => {
            tracing::debug!(spec, error = %err, "skipping malformed codebase URL");
            return None;
        }
    };

    if !is_archive_name(url.path()) {
        tracing::debug!(%url, "skipping codebase URL that does not name an archive");
        return None;
    }

    let local = if url.scheme() == "file" {
        match url.to_file_path() {
            Ok(path) => path,
            Err(()) => {
                tracing::debug!(%url, "skipping file URL without a local path");
                return None;
            }
        }
    } else {
        match fetcher.fetch(&url) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(%url, error = %err, "skipping unreachable codebase URL");
                return None;
            }
        }
    };

    let root = AbstractFile::get_directory(&local);
    if root.is_none() {
        tracing::debug!(%url, path = %local.display(), "codebase URL is not a readable archive");
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "classpath_remote_test_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn write_jar(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let file = fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        zip.start_file("a/A.class", FileOptions::default()).unwrap();
        zip.write_all(b"dummy").unwrap();
        zip.finish().unwrap();
    }

    struct FixedFetcher(PathBuf);

    impl RemoteFetcher for FixedFetcher {
        fn fetch(&self, _url: &Url) -> Result<PathBuf> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    impl RemoteFetcher for FailingFetcher {
        fn fetch(&self, url: &Url) -> Result<PathBuf> {
            Err(ClassPathError::Fetch {
                url: url.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    #[test]
    fn file_urls_open_in_place() {
        let base = temp_dir("file_url");
        let jar = base.join("lib.jar");
        write_jar(&jar);
        let spec = Url::from_file_path(&jar).unwrap().to_string();

        let root = resolve_url(&spec, &FailingFetcher).unwrap();
        assert_eq!(root.name(), "lib.jar");
        assert!(root.is_directory());

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn remote_urls_go_through_the_fetcher() {
        let base = temp_dir("fetched");
        let jar = base.join("downloaded.jar");
        write_jar(&jar);

        let root = resolve_url("https://example.com/lib/tool.jar", &FixedFetcher(jar)).unwrap();
        assert_eq!(root.children()[0].name(), "a");
        assert!(resolve_url("https://example.com/lib/tool.jar", &FailingFetcher).is_none());

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn malformed_and_non_archive_urls_are_skipped() {
        assert!(resolve_url("not a url", &FailingFetcher).is_none());
        assert!(resolve_url("https://example.com/classes/", &FailingFetcher).is_none());
        assert!(resolve_url("file:///definitely/missing/lib.jar", &FailingFetcher).is_none());
    }

    #[test]
    fn curl_fetcher_rejects_unsupported_schemes() {
        let fetcher = CurlFetcher::new().with_download_dir(temp_dir("ftp"));
        let url = Url::parse("ftp://example.com/lib.jar").unwrap();
        let err = fetcher.fetch(&url).unwrap_err().to_string();
        assert!(err.contains("unsupported scheme ftp"));
    }

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn curl_fetcher_downloads_into_its_own_directory() {
        let base = temp_dir("curl");
        let fixture = base.join("fixture.jar");
        write_jar(&fixture);
        let fake_curl = base.join("bin").join("curl");
        fs::create_dir_all(fake_curl.parent().unwrap()).unwrap();
        fs::write(
            &fake_curl,
            format!(
                "#!/bin/sh\nset -e\ncp '{}' \"$6\"\n",
                fixture.display()
            ),
        )
        .unwrap();
        make_executable(&fake_curl);

        let download_dir = base.join("downloads");
        let fetcher = CurlFetcher::new()
            .with_program(&fake_curl)
            .with_download_dir(&download_dir);

        let root = resolve_url("https://example.com/repo/tool.jar", &fetcher).unwrap();
        assert_eq!(root.children()[0].name(), "a");
        let downloaded: Vec<_> = fs::read_dir(&download_dir).unwrap().collect();
        assert_eq!(downloaded.len(), 1);

        drop(fetcher);
        assert!(!download_dir.exists());
        let _ = fs::remove_dir_all(base);
    }

    #[cfg(unix)]
    #[test]
    fn existing_download_dir_keeps_unrelated_files() {
        let base = temp_dir("curl_shared");
        let fixture = base.join("fixture.jar");
        write_jar(&fixture);
        let fake_curl = base.join("curl");
        fs::write(
            &fake_curl,
            format!("#!/bin/sh\nset -e\ncp '{}' \"$6\"\n", fixture.display()),
        )
        .unwrap();
        make_executable(&fake_curl);

        let shared = base.join("shared");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("keep.txt"), "keep").unwrap();

        let fetcher = CurlFetcher::new()
            .with_program(&fake_curl)
            .with_download_dir(&shared);
        let url = Url::parse("https://example.com/repo/tool.jar").unwrap();
        let downloaded = fetcher.fetch(&url).unwrap();
        assert!(downloaded.exists());

        drop(fetcher);
        assert!(shared.join("keep.txt").exists());
        assert!(!downloaded.exists());

        let untouched = CurlFetcher::new().with_download_dir(&shared);
        drop(untouched);
        assert!(shared.join("keep.txt").exists());

        let _ = fs::remove_dir_all(base);
    }

    #[cfg(unix)]
    #[test]
    fn curl_fetcher_reports_curl_failures() {
        let base = temp_dir("curl_fail");
        let fake_curl = base.join("curl");
        fs::create_dir_all(&base).unwrap();
        fs::write(&fake_curl, "#!/bin/sh\necho 'could not resolve host' >&2\nexit 6\n").unwrap();
        make_executable(&fake_curl);

        let fetcher = CurlFetcher::new()
            .with_program(&fake_curl)
            .with_download_dir(base.join("downloads"));
        let url = Url::parse("https://nowhere.invalid/tool.jar").unwrap();
        let err = fetcher.fetch(&url).unwrap_err().to_string();
        assert!(err.contains("could not resolve host"));

        drop(fetcher);
        let _ = fs::remove_dir_all(base);
    }
}
