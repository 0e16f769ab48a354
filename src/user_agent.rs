//! Shared User-Agent string for catalog and download requests.

/// Product token sent ahead of the crate version.
const PRODUCT: &str = "mcat-dl";

/// Default User-Agent for every request sent to the remote service.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{PRODUCT}/{version} (release-downloader)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_carries_crate_version() {
        let ua = default_user_agent();
        assert_eq!(
            Some(env!("CARGO_PKG_VERSION")),
            ua.strip_prefix("mcat-dl/").and_then(|s| s.split(' ').next()),
            "UA must contain crate version"
        );
    }
}
