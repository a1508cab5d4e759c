//! Service endpoint resolution.

use reqwest::Url;
use std::fmt;

use super::settings::ServerSettings;

/// External dependency an adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Crawl,
    Search,
}

/// What to do when neither an override nor `server_ip` is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPolicy {
    /// Fall back to `http://localhost:<default_port>`.
    Lenient,
    /// Leave the endpoint unresolved.
    Strict,
}

impl ServiceKind {
    /// Human-readable service name used in logs and error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Crawl => "Crawl4AI",
            Self::Search => "SearxNG",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Self::Crawl => 11235,
            Self::Search => 8080,
        }
    }

    /// Config-file key holding this service's port.
    pub fn port_key(self) -> &'static str {
        match self {
            Self::Crawl => "crawl4ai_port",
            Self::Search => "searxng_port",
        }
    }

    /// Environment variable that overrides the resolved URL.
    pub fn override_env(self) -> &'static str {
        match self {
            Self::Crawl => "CRAWL4AI_API_URL",
            Self::Search => "SEARXNG_API_URL",
        }
    }

    pub fn discovery(self) -> DiscoveryPolicy {
        match self {
            Self::Crawl => DiscoveryPolicy::Lenient,
            Self::Search => DiscoveryPolicy::Strict,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Resolved base URL of an external service.
///
/// Always holds an absolute http(s) URL with a host; construction goes
/// through [`ServiceEndpoint::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    base: String,
}

impl ServiceEndpoint {
    /// Parse a base URL, prepending `http://` when no scheme is given.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };

        let url = Url::parse(&candidate).ok()?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return None;
        }

        Some(Self {
            base: candidate.trim_end_matches('/').to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Append a route to the base URL, normalizing the joining slash.
    pub fn join(&self, route: &str) -> String {
        format!("{}/{}", self.base, route.trim_start_matches('/'))
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

/// Resolve the endpoint for `kind`.
///
/// Precedence: non-empty override, then `server_ip` plus the service port from
/// the config file, then the policy fallback.
pub fn resolve_endpoint(
    kind: ServiceKind,
    settings: &ServerSettings,
    override_url: Option<&str>,
) -> Option<ServiceEndpoint> {
    if let Some(raw) = override_url.map(str::trim).filter(|raw| !raw.is_empty()) {
        match ServiceEndpoint::parse(raw) {
            Some(endpoint) => {
                log::debug!("{kind} endpoint from override: {endpoint}");
                return Some(endpoint);
            }
            None => log::warn!(
                "Ignoring invalid {} override '{raw}', falling back to config",
                kind.override_env()
            ),
        }
    }

    if let Some(ip) = settings.server_ip.as_deref() {
        let port = configured_port(kind, settings);
        if let Some(endpoint) = ServiceEndpoint::parse(&format!("http://{ip}:{port}")) {
            log::debug!("{kind} endpoint from config: {endpoint}");
            return Some(endpoint);
        }
        log::warn!("server_ip '{ip}' in config does not form a valid URL");
    }

    match kind.discovery() {
        DiscoveryPolicy::Lenient => {
            let fallback = ServiceEndpoint::parse(&format!("http://localhost:{}", kind.default_port()));
            log::debug!("{kind} endpoint defaulting to localhost");
            fallback
        }
        DiscoveryPolicy::Strict => None,
    }
}

fn configured_port(kind: ServiceKind, settings: &ServerSettings) -> u16 {
    let raw = match kind {
        ServiceKind::Crawl => settings.crawl4ai_port.as_deref(),
        ServiceKind::Search => settings.searxng_port.as_deref(),
    };

    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            log::warn!(
                "Invalid {} '{value}' in config, using {}",
                kind.port_key(),
                kind.default_port()
            );
            kind.default_port()
        }),
        None => kind.default_port(),
    }
}

/// Resolve the Crawl4AI bearer token: override first, then config file.
pub fn resolve_token(settings: &ServerSettings, override_token: Option<&str>) -> Option<String> {
    override_token
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .or_else(|| settings.crawl4ai_api_token.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_ip(ip: &str) -> ServerSettings {
        ServerSettings {
            server_ip: Some(ip.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn override_wins_over_config() {
        let endpoint = resolve_endpoint(
            ServiceKind::Crawl,
            &settings_with_ip("10.0.0.1"),
            Some("http://crawler:9000/"),
        );
        assert_eq!(endpoint.map(|e| e.to_string()), Some("http://crawler:9000".into()));
    }

    #[test]
    fn empty_override_is_ignored() {
        let endpoint = resolve_endpoint(ServiceKind::Crawl, &settings_with_ip("10.0.0.1"), Some("  "));
        assert_eq!(endpoint.map(|e| e.to_string()), Some("http://10.0.0.1:11235".into()));
    }

    #[test]
    fn override_without_scheme_gets_http() {
        let endpoint = resolve_endpoint(ServiceKind::Search, &ServerSettings::default(), Some("search.lan:8888"));
        assert_eq!(endpoint.map(|e| e.to_string()), Some("http://search.lan:8888".into()));
    }

    #[test]
    fn invalid_override_falls_through() {
        let endpoint = resolve_endpoint(ServiceKind::Search, &settings_with_ip("10.0.0.3"), Some("ftp://nope"));
        assert_eq!(endpoint.map(|e| e.to_string()), Some("http://10.0.0.3:8080".into()));
    }

    #[test]
    fn config_port_is_used() {
        let settings = ServerSettings {
            server_ip: Some("192.168.1.5".into()),
            searxng_port: Some("8888".into()),
            ..Default::default()
        };
        let endpoint = resolve_endpoint(ServiceKind::Search, &settings, None);
        assert_eq!(endpoint.map(|e| e.to_string()), Some("http://192.168.1.5:8888".into()));
    }

    #[test]
    fn bad_port_falls_back_to_default() {
        let settings = ServerSettings {
            server_ip: Some("192.168.1.5".into()),
            crawl4ai_port: Some("eleven".into()),
            ..Default::default()
        };
        let endpoint = resolve_endpoint(ServiceKind::Crawl, &settings, None);
        assert_eq!(endpoint.map(|e| e.to_string()), Some("http://192.168.1.5:11235".into()));
    }

    #[test]
    fn crawl_defaults_to_localhost() {
        let endpoint = resolve_endpoint(ServiceKind::Crawl, &ServerSettings::default(), None);
        assert_eq!(endpoint.map(|e| e.to_string()), Some("http://localhost:11235".into()));
    }

    #[test]
    fn search_requires_discovery() {
        assert_eq!(resolve_endpoint(ServiceKind::Search, &ServerSettings::default(), None), None);
    }

    #[test]
    fn join_normalizes_slashes() {
        let endpoint = ServiceEndpoint::parse("http://host:1/base/").expect("valid endpoint");
        assert_eq!(endpoint.join("/search"), "http://host:1/base/search");
        assert_eq!(endpoint.join("task/abc"), "http://host:1/base/task/abc");
    }

    #[test]
    fn token_precedence() {
        let settings = ServerSettings {
            crawl4ai_api_token: Some("from-config".into()),
            ..Default::default()
        };
        assert_eq!(resolve_token(&settings, Some("from-env")).as_deref(), Some("from-env"));
        assert_eq!(resolve_token(&settings, Some("")).as_deref(), Some("from-config"));
        assert_eq!(resolve_token(&ServerSettings::default(), None), None);
    }
}
