use clap::Parser;
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // If there's a git tag at HEAD, use just the tag (release build)
    if let Some(tag) = option_env!("GHRUN_GIT_TAG") {
        return tag;
    }

    // Not on a tag - include commit hash and branch (dev build)
    let commit = option_env!("GHRUN_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("GHRUN_GIT_BRANCH").unwrap_or("unknown");

    // Return a static string by leaking the formatted string
    // This is safe because it only happens once at startup
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "ghrun")]
#[command(about = "Run binaries straight from GitHub Releases")]
#[command(version = get_version(), disable_version_flag = true)]
#[command(
    after_help = "Examples:\n  ghrun nektos/act --help\n  ghrun --version v0.50.0 derailed/k9s\n  ghrun --no-cache acme/tool --port 8080"
)]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Run a specific release tag instead of the latest release
    #[arg(long, value_name = "TAG")]
    pub version: Option<String>,

    /// Redownload even when a valid cached copy exists
    #[arg(long)]
    pub force: bool,

    /// Override the default cache root directory
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Use a throwaway cache directory, deleted on exit
    #[arg(long)]
    pub no_cache: bool,

    /// GitHub repository (e.g. 'owner/repo')
    pub repo: String,

    /// Arguments passed through verbatim to the resolved executable
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_args_pass_through_hyphens() {
        let cli = Cli::parse_from(["ghrun", "nektos/act", "--list", "-v"]);
        assert_eq!(cli.repo, "nektos/act");
        assert_eq!(cli.args, vec!["--list", "-v"]);
        assert!(!cli.force);
    }

    #[test]
    fn own_flags_parse_before_repo() {
        let cli = Cli::parse_from(["ghrun", "--force", "--version", "v1.2.3", "acme/tool"]);
        assert!(cli.force);
        assert_eq!(cli.version.as_deref(), Some("v1.2.3"));
        assert_eq!(cli.repo, "acme/tool");
        assert!(cli.args.is_empty());
    }

    #[test]
    fn missing_repo_is_an_error() {
        assert!(Cli::try_parse_from(["ghrun"]).is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(Cli::try_parse_from(["ghrun", "--frobnicate", "acme/tool"]).is_err());
    }
}
