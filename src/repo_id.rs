use crate::error::Error;
use std::fmt;

/// A GitHub repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Parse an `owner/name` identifier. Exactly one separator, both
    /// segments non-empty.
    pub fn parse(input: &str) -> Result<Self, Error> {
        if input.is_empty() {
            return Err(Error::InvalidInput(
                "repository identifier cannot be empty".to_string(),
            ));
        }

        if input.starts_with('-') {
            return Err(Error::InvalidInput(format!(
                "invalid repository '{}'. It looks like a CLI flag.",
                input
            )));
        }

        let parts: Vec<&str> = input.split('/').collect();
        match parts.as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(RepoId {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(Error::InvalidInput(format!(
                "invalid repository '{}'. Expected 'owner/name'.",
                input
            ))),
        }
    }

    /// Filesystem-safe stem used to key cache entries for this repo.
    pub fn cache_stem(&self) -> String {
        format!("{}__{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_name() {
        let id = RepoId::parse("nektos/act").unwrap();
        assert_eq!(id.owner, "nektos");
        assert_eq!(id.name, "act");
        assert_eq!(id.to_string(), "nektos/act");
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(RepoId::parse("act").is_err());
    }

    #[test]
    fn rejects_extra_separator() {
        assert!(RepoId::parse("a/b/c").is_err());
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(RepoId::parse("/act").is_err());
        assert!(RepoId::parse("nektos/").is_err());
        assert!(RepoId::parse("").is_err());
    }

    #[test]
    fn rejects_flag_lookalike() {
        assert!(RepoId::parse("--force").is_err());
    }

    #[test]
    fn cache_stem_encodes_both_parts() {
        let id = RepoId::parse("derailed/k9s").unwrap();
        assert_eq!(id.cache_stem(), "derailed__k9s");
    }
}
