use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::repo_id::RepoId;
use std::fs;
use std::path::PathBuf;

pub const APP_NAME: &str = "ghrun";
pub const CACHE_DIR_ENV: &str = "GHRUN_CACHE_DIR";

/// Which release of a repository to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    Latest,
    Tag(String),
}

impl VersionSelector {
    pub fn is_latest(&self) -> bool {
        matches!(self, VersionSelector::Latest)
    }
}

/// All caller-supplied options for one invocation, grouped up front and
/// never read from ambient state afterwards.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub repo: RepoId,
    pub selector: VersionSelector,
    pub force: bool,
    pub cache_dir: Option<PathBuf>,
    pub no_cache: bool,
    pub tool_args: Vec<String>,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let repo = RepoId::parse(&cli.repo)?;

        let selector = match cli.version.as_deref() {
            None | Some("latest") => VersionSelector::Latest,
            Some(tag) => VersionSelector::Tag(tag.to_string()),
        };

        Ok(RunConfig {
            repo,
            selector,
            force: cli.force,
            cache_dir: cli.cache_dir.clone(),
            no_cache: cli.no_cache,
            tool_args: cli.args.clone(),
        })
    }

    /// The persistent cache root for this invocation. Precedence:
    /// `--cache-dir`, then `GHRUN_CACHE_DIR`, then the platform cache
    /// directory. The directory is created if missing.
    pub fn persistent_cache_root(&self) -> Result<PathBuf> {
        let path = if let Some(dir) = &self.cache_dir {
            dir.clone()
        } else if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
            PathBuf::from(dir)
        } else {
            dirs::cache_dir()
                .ok_or_else(|| {
                    Error::InvalidInput("could not determine a cache directory".to_string())
                })?
                .join(APP_NAME)
        };

        tracing::debug!("Cache root: {}", path.display());
        fs::create_dir_all(&path).map_err(|e| Error::filesystem(&path, e))?;
        Ok(path)
    }
}
