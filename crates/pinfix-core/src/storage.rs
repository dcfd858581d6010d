//! Filesystem save primitive.
//!
//! Fetches the image with libcurl on a blocking task, writes it to a `.part` temp
//! file next to the destination, and renames it onto a uniquified final path
//! (`name.jpg`, `name (1).jpg`, ...) under the download root.

use async_trait::async_trait;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::error::SaveError;
use crate::saver::{CollisionPolicy, SavePrimitive, SaveRequest};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Upper bound on `name (n).ext` attempts before giving up.
const MAX_UNIQUIFY: u32 = 10_000;

/// Path for the temp file: appends `.part` to the final path (e.g. `a.jpg` → `a.jpg.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// `dir/stem (n).ext` for n > 0, the path itself for n == 0.
pub fn uniquified(path: &Path, n: u32) -> PathBuf {
    if n == 0 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    };
    path.with_file_name(name)
}

/// Transfer limits for the image fetch.
#[derive(Debug, Clone, Copy)]
struct FetchOptions {
    connect_timeout: Duration,
    timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Saves into `root`, which is created on demand.
#[derive(Debug, Clone)]
pub struct FsSavePrimitive {
    root: PathBuf,
    fetch: FetchOptions,
}

impl FsSavePrimitive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fetch: FetchOptions::default(),
        }
    }

    /// Joins a relative, `/`-separated destination onto the root. Absolute paths and
    /// `..` are rejected so nothing lands outside the root.
    fn resolve_destination(&self, destination: &str) -> Result<PathBuf, SaveError> {
        let relative = Path::new(destination);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if destination.is_empty() || !plain || relative.file_name().is_none() {
            return Err(SaveError::InvalidDestination(destination.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl SavePrimitive for FsSavePrimitive {
    async fn save(&self, request: &SaveRequest) -> Result<PathBuf, SaveError> {
        let final_path = self.resolve_destination(&request.destination)?;
        let url = request.source_url.clone();
        let policy = request.collision_policy;
        let fetch = self.fetch;

        tokio::task::spawn_blocking(move || {
            let body = fetch_bytes(&url, fetch)?;
            tracing::debug!(url = %url, bytes = body.len(), "image fetched");
            write_claimed(&final_path, policy, &body)
        })
        .await
        .map_err(|e| SaveError::Task(e.to_string()))?
    }
}

/// Single GET into memory. Non-HTTP schemes (e.g. `file://`) report code 0 and are accepted.
fn fetch_bytes(url: &str, opts: FetchOptions) -> Result<Vec<u8>, SaveError> {
    let mut body = Vec::new();
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if code != 0 && !(200..300).contains(&code) {
        return Err(SaveError::Http {
            url: url.to_string(),
            code,
        });
    }
    Ok(body)
}

/// Claims the first free `name (n).ext`, writes `body` to its temp file, and renames
/// the temp file over the claimed placeholder.
fn write_claimed(final_path: &Path, policy: CollisionPolicy, body: &[u8]) -> Result<PathBuf, SaveError> {
    if let Some(parent) = final_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let claimed = match policy {
        CollisionPolicy::Uniquify => claim_unique(final_path)?,
    };
    let tmp = temp_path(&claimed);

    if let Err(e) = write_then_rename(&tmp, &claimed, body) {
        let _ = fs::remove_file(&tmp);
        let _ = fs::remove_file(&claimed);
        return Err(e.into());
    }
    Ok(claimed)
}

fn write_then_rename(tmp: &Path, final_path: &Path, body: &[u8]) -> io::Result<()> {
    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(tmp)?;
    file.write_all(body)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, final_path)
}

fn claim_unique(path: &Path) -> Result<PathBuf, SaveError> {
    for n in 0..MAX_UNIQUIFY {
        let candidate = uniquified(path, n);
        match File::options().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(SaveError::InvalidDestination(format!(
        "{}: no free name after {} attempts",
        path.display(),
        MAX_UNIQUIFY
    )))
}
