// ABOUTME: Access credential for repository cloning.
// ABOUTME: Embedded in the clone URL but never printed in cleartext.

/// Repository access token. `Debug` redacts the value; there is no
/// `Display`. Log lines that mention the clone URL must use
/// [`Credential::redacted_url`].
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token, for embedding into the clone URL only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Clone URL with the credential embedded as userinfo. URLs without an
    /// http(s) scheme are returned unchanged; ssh URLs authenticate via the
    /// key, not the token.
    pub fn authenticated_url(&self, repo_url: &str) -> String {
        embed_userinfo(repo_url, &self.0)
    }

    /// Clone URL safe for logging, with the userinfo slot masked.
    pub fn redacted_url(repo_url: &str) -> String {
        embed_userinfo(repo_url, "***")
    }
}

fn embed_userinfo(repo_url: &str, userinfo: &str) -> String {
    for scheme in ["https://", "http://"] {
        if let Some(rest) = repo_url.strip_prefix(scheme) {
            // Replace any userinfo already present in the URL.
            let host_part = rest.split_once('@').map(|(_, h)| h).unwrap_or(rest);
            return format!("{scheme}{userinfo}@{host_part}");
        }
    }
    repo_url.to_string()
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_token_in_https_url() {
        let cred = Credential::new("tok123");
        assert_eq!(
            cred.authenticated_url("https://github.com/acme/widget.git"),
            "https://tok123@github.com/acme/widget.git"
        );
    }

    #[test]
    fn replaces_existing_userinfo() {
        let cred = Credential::new("tok123");
        assert_eq!(
            cred.authenticated_url("https://old@github.com/acme/widget.git"),
            "https://tok123@github.com/acme/widget.git"
        );
    }

    #[test]
    fn leaves_ssh_urls_alone() {
        let cred = Credential::new("tok123");
        assert_eq!(
            cred.authenticated_url("git@github.com:acme/widget.git"),
            "git@github.com:acme/widget.git"
        );
    }

    #[test]
    fn debug_never_shows_token() {
        let cred = Credential::new("tok123");
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("tok123"));
    }

    #[test]
    fn redacted_url_masks_userinfo() {
        let url = Credential::redacted_url("https://github.com/acme/widget.git");
        assert_eq!(url, "https://***@github.com/acme/widget.git");
    }
}
