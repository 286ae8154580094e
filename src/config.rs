use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;

use crate::fs::Directory;

/// Port used when neither the command line nor `LISTEN` names one.
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the acceptor binds to
    pub listen_addr: String,
    /// Directory served at the top level
    pub root: Option<PathBuf>,
    /// Never use platform-specific transmission
    pub portable: bool,
    /// First path segment to served directory; replaces `root` when set
    pub mounts: BTreeMap<String, PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            root: None,
            portable: false,
            mounts: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn from_yaml(source: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(source).context("invalid configuration")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Self::from_yaml(&source)
    }

    /// `LISTEN` overrides every other source of the bind address.
    pub fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("LISTEN") {
            self.listen_addr = addr;
        }
    }

    pub fn set_port(&mut self, port: u16) {
        self.listen_addr = format!("0.0.0.0:{}", port);
    }

    /// Builds the directory tree this configuration describes.
    pub fn build_root(&self) -> anyhow::Result<Arc<Directory>> {
        if self.mounts.is_empty() {
            let root = self
                .root
                .as_ref()
                .context("no served directory configured")?;
            return Ok(Arc::new(self.file_directory(root)?));
        }

        if self.root.is_some() {
            anyhow::bail!("'root' and 'mounts' cannot be combined");
        }

        let mut children = HashMap::new();
        for (segment, path) in &self.mounts {
            if segment.contains('/') {
                anyhow::bail!("mount name '{}' must be a single path segment", segment);
            }
            children.insert(segment.clone(), Arc::new(self.file_directory(path)?));
        }

        Ok(Arc::new(Directory::virtual_dir(move |segment| {
            children.get(segment).cloned()
        })))
    }

    fn file_directory(&self, path: &Path) -> anyhow::Result<Directory> {
        if self.portable {
            Directory::portable(path)
        } else {
            Directory::optimal(path)
        }
    }
}
