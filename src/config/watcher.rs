//! Change detection for configuration files
//!
//! A [`ConfigurationWatcher`] polls a set of files for modification. A file
//! counts as changed when its newest modification time moved forward or
//! when any file was replaced (a different device/inode pair). Checks are
//! throttled by a minimum interval so callers can poll as often as they
//! like.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use log::{debug, info};

use crate::common::fs::{absolute_path, file_identity, modified_time, FileIdentity};
use crate::config::callback::ReloadCallbackChain;
use crate::config::error::Result;
use crate::config::traits::Reloader;
use crate::config::types::LoaderFn;

/// Anything that names one or more files to watch
pub trait IntoFilenames {
    /// The named files, in the order given
    fn into_filenames(self) -> Vec<PathBuf>;
}

impl IntoFilenames for &str {
    fn into_filenames(self) -> Vec<PathBuf> {
        vec![PathBuf::from(self)]
    }
}

impl IntoFilenames for String {
    fn into_filenames(self) -> Vec<PathBuf> {
        vec![PathBuf::from(self)]
    }
}

impl IntoFilenames for &Path {
    fn into_filenames(self) -> Vec<PathBuf> {
        vec![self.to_path_buf()]
    }
}

impl IntoFilenames for PathBuf {
    fn into_filenames(self) -> Vec<PathBuf> {
        vec![self]
    }
}

impl IntoFilenames for &PathBuf {
    fn into_filenames(self) -> Vec<PathBuf> {
        vec![self.clone()]
    }
}

impl<P: AsRef<Path>> IntoFilenames for Vec<P> {
    fn into_filenames(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<P: AsRef<Path>> IntoFilenames for &[P] {
    fn into_filenames(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

impl<P: AsRef<Path>, const N: usize> IntoFilenames for [P; N] {
    fn into_filenames(self) -> Vec<PathBuf> {
        self.iter().map(|p| p.as_ref().to_path_buf()).collect()
    }
}

/// Normalize filenames to a sorted, deduplicated list of absolute paths
pub fn get_filename_list(filenames: impl IntoFilenames) -> Result<Vec<PathBuf>> {
    let mut paths = filenames
        .into_filenames()
        .iter()
        .map(|path| absolute_path(path))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Polls configuration files and reloads them when they change
pub struct ConfigurationWatcher {
    config_loader: LoaderFn,
    filenames: Vec<PathBuf>,
    min_interval: Duration,
    last_check: Instant,
    last_max_mtime: Option<SystemTime>,
    inodes: Vec<FileIdentity>,
    reloader: Arc<dyn Reloader>,
}

impl ConfigurationWatcher {
    /// Create a watcher over `filenames`.
    ///
    /// The files are probed immediately, so a missing file is an error.
    /// Without a `reloader`, every namespace is reloaded after a load.
    pub fn new(
        config_loader: LoaderFn,
        filenames: impl IntoFilenames,
        min_interval: Duration,
        reloader: Option<Arc<dyn Reloader>>,
    ) -> Result<Self> {
        let filenames = get_filename_list(filenames)?;
        let reloader = reloader.unwrap_or_else(|| Arc::new(ReloadCallbackChain::all()));

        let mut watcher = Self {
            config_loader,
            filenames,
            min_interval,
            last_check: Instant::now(),
            last_max_mtime: None,
            inodes: Vec::new(),
            reloader,
        };
        watcher.last_max_mtime = watcher.most_recent_changed()?;
        watcher.inodes = watcher.get_inodes()?;
        debug!("Watching {} configuration file(s)", watcher.filenames.len());
        Ok(watcher)
    }

    /// Watched files, absolute and sorted
    pub fn filenames(&self) -> &[PathBuf] {
        &self.filenames
    }

    /// Minimum time between two checks
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// The reloader run after each load
    pub fn reloader(&self) -> Arc<dyn Reloader> {
        Arc::clone(&self.reloader)
    }

    /// Newest modification time across the watched files
    pub fn most_recent_changed(&self) -> Result<Option<SystemTime>> {
        let mut newest = None;
        for path in &self.filenames {
            let mtime = modified_time(path)?;
            newest = newest.max(Some(mtime));
        }
        Ok(newest)
    }

    /// Identity of every watched file, in filename order
    pub fn get_inodes(&self) -> Result<Vec<FileIdentity>> {
        let mut inodes = Vec::with_capacity(self.filenames.len());
        for path in &self.filenames {
            inodes.push(file_identity(path)?);
        }
        Ok(inodes)
    }

    /// Whether enough time passed since the last check
    pub fn should_check(&self) -> bool {
        self.min_interval.is_zero() || self.last_check.elapsed() >= self.min_interval
    }

    /// Probe the files and record what was seen.
    ///
    /// The check time is updated even when probing fails.
    pub fn file_modified(&mut self) -> Result<bool> {
        self.last_check = Instant::now();

        let max_mtime = self.most_recent_changed()?;
        let inodes = self.get_inodes()?;
        let modified = inodes != self.inodes || max_mtime > self.last_max_mtime;

        self.last_max_mtime = max_mtime;
        self.inodes = inodes;
        Ok(modified)
    }

    /// Run the loader
    pub fn load_config(&self) -> Result<()> {
        (self.config_loader)()
    }

    /// Run the reloader
    pub fn reload(&self) {
        self.reloader.reload();
    }

    /// Load and reload when the files changed, or unconditionally with `force`.
    ///
    /// Without `force`, nothing is probed until the minimum interval has
    /// passed. A failed load leaves the previous file state recorded, so the
    /// next check sees the change again.
    pub fn reload_if_changed(&mut self, force: bool) -> Result<()> {
        if !force && !self.should_check() {
            return Ok(());
        }

        let previous = (self.last_max_mtime, self.inodes.clone());
        let modified = self.file_modified()?;
        if !force && !modified {
            return Ok(());
        }

        if modified {
            info!("Configuration files changed, reloading");
        } else {
            info!("Forcing configuration reload");
        }
        if let Err(e) = self.load_config() {
            (self.last_max_mtime, self.inodes) = previous;
            return Err(e);
        }
        self.reload();
        Ok(())
    }
}

impl fmt::Debug for ConfigurationWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationWatcher")
            .field("filenames", &self.filenames)
            .field("min_interval", &self.min_interval)
            .field("last_max_mtime", &self.last_max_mtime)
            .finish_non_exhaustive()
    }
}
