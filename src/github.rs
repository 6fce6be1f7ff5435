use crate::config::VersionSelector;
use crate::error::{Error, Result};
use crate::platform::PlatformHint;
use crate::repo_id::RepoId;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub tag_name: String,
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

fn selector_label(selector: &VersionSelector) -> String {
    match selector {
        VersionSelector::Latest => "latest".to_string(),
        VersionSelector::Tag(tag) => tag.clone(),
    }
}

/// Fetch the release metadata for a repository. `Latest` resolves the
/// most recent release; a tag selector must match exactly.
pub async fn resolve_release(
    client: &reqwest::Client,
    repo: &RepoId,
    selector: &VersionSelector,
) -> Result<Release> {
    let url = match selector {
        VersionSelector::Latest => {
            format!("https://api.github.com/repos/{}/releases/latest", repo)
        }
        VersionSelector::Tag(tag) => {
            format!("https://api.github.com/repos/{}/releases/tags/{}", repo, tag)
        }
    };

    tracing::debug!("Fetching GitHub release info from: {}", url);

    let mut request = client
        .get(&url)
        .header("Accept", "application/vnd.github.v3+json")
        .header("User-Agent", concat!("ghrun/", env!("CARGO_PKG_VERSION")));

    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        request = request.header("Authorization", format!("token {}", token));
        tracing::debug!("Using GITHUB_TOKEN");
    }

    let response = request.send().await.map_err(|e| Error::Download {
        asset: "release metadata".to_string(),
        url: url.clone(),
        reason: e.to_string(),
    })?;

    if !response.status().is_success() {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                repo: repo.to_string(),
                tag: selector_label(selector),
            });
        }
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(Error::Download {
            asset: "release metadata".to_string(),
            url,
            reason: format!("{} - {}", status, error_text),
        });
    }

    let release: Release = response.json().await.map_err(|e| Error::Download {
        asset: "release metadata".to_string(),
        url,
        reason: format!("invalid release JSON: {}", e),
    })?;

    if release.assets.is_empty() {
        return Err(Error::NoAssets {
            repo: repo.to_string(),
            tag: release.tag_name,
        });
    }

    Ok(release)
}

/// Pick the asset to run. Ordered case-insensitive substring scan,
/// first rule to produce a match wins:
///
/// 1. distro+version token (e.g. "ubuntu22.04")
/// 2. distro family alone (e.g. "ubuntu")
/// 3. kernel family (e.g. "linux")
/// 4. first asset in enumeration order
///
/// Substring containment is the only matching rule, so a name like
/// "linux-unrelated-tool" will match rule 3. Usually-right beats
/// strict platform-tag grammars here.
pub fn select_asset<'a>(release: &'a Release, hint: &PlatformHint) -> &'a ReleaseAsset {
    let rules = [
        hint.distro_version.as_deref(),
        hint.distro.as_deref(),
        Some(hint.kernel.as_str()),
    ];

    for token in rules.into_iter().flatten() {
        let token = token.to_lowercase();
        if let Some(asset) = release
            .assets
            .iter()
            .find(|a| a.name.to_lowercase().contains(&token))
        {
            tracing::info!("Selected asset '{}' (matched '{}')", asset.name, token);
            return asset;
        }
    }

    // Nothing platform-shaped in any name; take the first asset as-is.
    let asset = &release.assets[0];
    tracing::info!("Selected asset '{}' (enumeration-order fallback)", asset.name);
    asset
}

/// Look for a companion checksum asset and extract the expected SHA-256
/// digest for `asset_name`. Absence of a checksum asset is not an
/// error; integrity verification is then skipped.
pub async fn find_checksum(
    client: &reqwest::Client,
    release: &Release,
    asset_name: &str,
) -> Result<Option<String>> {
    let checksum_asset = release.assets.iter().find(|a| {
        let name = a.name.to_lowercase();
        name == "checksums.txt" || name.contains("sha256")
    });

    let Some(checksum_asset) = checksum_asset else {
        tracing::debug!("No checksum asset in release; skipping verification");
        return Ok(None);
    };

    tracing::debug!("Fetching checksum file '{}'", checksum_asset.name);

    let response = client
        .get(&checksum_asset.browser_download_url)
        .header("User-Agent", concat!("ghrun/", env!("CARGO_PKG_VERSION")))
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::Download {
            asset: checksum_asset.name.clone(),
            url: checksum_asset.browser_download_url.clone(),
            reason: e.to_string(),
        })?;

    let content = response.text().await.map_err(|e| Error::Download {
        asset: checksum_asset.name.clone(),
        url: checksum_asset.browser_download_url.clone(),
        reason: e.to_string(),
    })?;

    Ok(parse_checksum_content(&content, asset_name))
}

/// Find the digest for `asset_name` in a checksum file. Lines with a
/// whitespace-delimited field exactly equal to the asset name are
/// preferred; plain substring containment is the fallback for files
/// using decorated fields like "*name" or "./name".
fn parse_checksum_content(content: &str, asset_name: &str) -> Option<String> {
    let exact = content.lines().find(|line| {
        line.split_whitespace()
            .any(|field| field == asset_name || field.trim_start_matches('*') == asset_name)
    });

    let line = exact.or_else(|| content.lines().find(|line| line.contains(asset_name)))?;

    let digest = line.split_whitespace().next()?.to_lowercase();

    if digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(digest)
    } else {
        tracing::warn!(
            "Ignoring malformed digest '{}' for asset '{}'",
            digest,
            asset_name
        );
        None
    }
}
