use std::fs;

/// Tokens describing the invoking platform, used to rank release assets.
///
/// Matching is pure OS-family/kernel based: architecture tokens are
/// deliberately not part of the hint (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformHint {
    /// Distro plus version, e.g. "ubuntu22.04". Linux only, and only
    /// when /etc/os-release was readable.
    pub distro_version: Option<String>,
    /// Distro family alone, e.g. "ubuntu".
    pub distro: Option<String>,
    /// Broad kernel family shared by all builds: "linux", "macos", ...
    pub kernel: String,
}

impl PlatformHint {
    pub fn detect() -> Self {
        let kernel = std::env::consts::OS.to_string();

        let (distro, distro_version) = if kernel == "linux" {
            match fs::read_to_string("/etc/os-release") {
                Ok(content) => parse_os_release(&content),
                Err(e) => {
                    tracing::debug!("Could not read /etc/os-release: {}", e);
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        tracing::debug!(
            "Detected platform: kernel='{}', distro={:?}, distro_version={:?}",
            kernel,
            distro,
            distro_version
        );

        PlatformHint {
            distro_version,
            distro,
            kernel,
        }
    }

    /// A hint with no distro detection, matching on kernel family only.
    #[cfg(test)]
    pub fn bare(kernel: &str) -> Self {
        PlatformHint {
            distro_version: None,
            distro: None,
            kernel: kernel.to_string(),
        }
    }
}

/// Extract `(ID, ID + VERSION_ID)` tokens from os-release content,
/// e.g. ("ubuntu", "ubuntu22.04").
fn parse_os_release(content: &str) -> (Option<String>, Option<String>) {
    let mut id = None;
    let mut version_id = None;

    for line in content.lines() {
        if let Some(value) = line.strip_prefix("ID=") {
            id = Some(unquote(value).to_lowercase());
        } else if let Some(value) = line.strip_prefix("VERSION_ID=") {
            version_id = Some(unquote(value).to_lowercase());
        }
    }

    let distro_version = match (&id, &version_id) {
        (Some(id), Some(version)) => Some(format!("{}{}", id, version)),
        _ => None,
    };

    (id, distro_version)
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    const UBUNTU: &str = "PRETTY_NAME=\"Ubuntu 22.04.4 LTS\"\nNAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nID=ubuntu\nID_LIKE=debian\n";

    #[test]
    fn parses_ubuntu_os_release() {
        let (distro, distro_version) = parse_os_release(UBUNTU);
        assert_eq!(distro.as_deref(), Some("ubuntu"));
        assert_eq!(distro_version.as_deref(), Some("ubuntu22.04"));
    }

    #[test]
    fn missing_version_id_drops_the_combined_token() {
        let (distro, distro_version) = parse_os_release("ID=arch\n");
        assert_eq!(distro.as_deref(), Some("arch"));
        assert_eq!(distro_version, None);
    }

    #[test]
    fn empty_content_yields_no_tokens() {
        let (distro, distro_version) = parse_os_release("");
        assert_eq!(distro, None);
        assert_eq!(distro_version, None);
    }

    #[test]
    fn detect_always_has_a_kernel() {
        let hint = PlatformHint::detect();
        assert!(!hint.kernel.is_empty());
    }
}
