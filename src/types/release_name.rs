// ABOUTME: Release name derivation from repository URLs.
// ABOUTME: The name keys every remote artifact: container, image tag, proxy rule, deploy dir.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseNameError {
    #[error("repository URL has no usable basename")]
    Empty,

    #[error("invalid character in release name: '{0}'")]
    InvalidChar(char),
}

/// Identifier derived from the repository URL, namespacing all remote
/// artifacts of a release. Two repositories with the same basename collide;
/// this is a known limitation, not disambiguated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseName(String);

impl ReleaseName {
    /// Derive the release name: the basename of the URL path, with a single
    /// trailing `.git` stripped. URLs without the suffix keep the full
    /// basename.
    pub fn from_repo_url(url: &str) -> Result<Self, ReleaseNameError> {
        let trimmed = url.trim().trim_end_matches('/');
        let base = trimmed
            .rsplit(|c| c == '/' || c == ':')
            .next()
            .unwrap_or_default();
        let base = base.strip_suffix(".git").unwrap_or(base);

        if base.is_empty() {
            return Err(ReleaseNameError::Empty);
        }

        for c in base.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' {
                return Err(ReleaseNameError::InvalidChar(c));
            }
        }

        Ok(Self(base.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Image tag for single-container releases. Docker rejects uppercase
    /// repository names, so the tag is the lowercased release name.
    pub fn image_tag(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for ReleaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_git_suffix() {
        let name = ReleaseName::from_repo_url("https://github.com/acme/widget.git").unwrap();
        assert_eq!(name.as_str(), "widget");
    }

    #[test]
    fn keeps_basename_without_suffix() {
        let name = ReleaseName::from_repo_url("https://github.com/acme/widget").unwrap();
        assert_eq!(name.as_str(), "widget");
    }

    #[test]
    fn strips_exactly_one_suffix() {
        let name = ReleaseName::from_repo_url("https://host/x/repo.git.git").unwrap();
        assert_eq!(name.as_str(), "repo.git");
    }

    #[test]
    fn handles_scp_style_urls() {
        let name = ReleaseName::from_repo_url("git@github.com:acme/widget.git").unwrap();
        assert_eq!(name.as_str(), "widget");
    }

    #[test]
    fn ignores_trailing_slash() {
        let name = ReleaseName::from_repo_url("https://github.com/acme/widget/").unwrap();
        assert_eq!(name.as_str(), "widget");
    }

    #[test]
    fn rejects_empty_basename() {
        assert!(matches!(
            ReleaseName::from_repo_url(""),
            Err(ReleaseNameError::Empty)
        ));
    }

    #[test]
    fn rejects_shell_metacharacters() {
        assert!(matches!(
            ReleaseName::from_repo_url("https://host/a$b"),
            Err(ReleaseNameError::InvalidChar('$'))
        ));
    }

    #[test]
    fn image_tag_is_lowercase() {
        let name = ReleaseName::from_repo_url("https://host/acme/Widget.git").unwrap();
        assert_eq!(name.image_tag(), "widget");
    }
}
