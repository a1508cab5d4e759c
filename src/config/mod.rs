//! Configuration resolution for the tool servers.
//!
//! Endpoints are resolved once at startup and handed to each adapter as an
//! explicit value.

mod endpoint;
mod settings;

pub use endpoint::{
    resolve_endpoint, resolve_token, DiscoveryPolicy, ServiceEndpoint, ServiceKind,
};
pub use settings::{locate_config_file, ServerSettings, CONFIG_FILE_NAME};

/// Values that take precedence over the config file (CLI flags or env vars).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub crawl_url: Option<String>,
    pub search_url: Option<String>,
    pub crawl_token: Option<String>,
}

/// Everything the adapters need to reach their services.
#[derive(Debug, Clone, Default)]
pub struct ResolvedServices {
    pub crawl: Option<ServiceEndpoint>,
    pub search: Option<ServiceEndpoint>,
    pub crawl_token: Option<String>,
}

impl ResolvedServices {
    pub fn resolve(settings: &ServerSettings, overrides: &Overrides) -> Self {
        Self {
            crawl: resolve_endpoint(ServiceKind::Crawl, settings, overrides.crawl_url.as_deref()),
            search: resolve_endpoint(ServiceKind::Search, settings, overrides.search_url.as_deref()),
            crawl_token: resolve_token(settings, overrides.crawl_token.as_deref()),
        }
    }

    pub fn endpoint(&self, kind: ServiceKind) -> Option<&ServiceEndpoint> {
        match kind {
            ServiceKind::Crawl => self.crawl.as_ref(),
            ServiceKind::Search => self.search.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_all_services_from_config() {
        let settings = ServerSettings::parse(
            "[DEFAULT]\nserver_ip = 10.1.1.1\ncrawl4ai_port = 9999\ncrawl4ai_api_token = tok\n",
        );
        let services = ResolvedServices::resolve(&settings, &Overrides::default());

        assert_eq!(
            services.endpoint(ServiceKind::Crawl).map(ServiceEndpoint::as_str),
            Some("http://10.1.1.1:9999")
        );
        assert_eq!(
            services.endpoint(ServiceKind::Search).map(ServiceEndpoint::as_str),
            Some("http://10.1.1.1:8080")
        );
        assert_eq!(services.crawl_token.as_deref(), Some("tok"));
    }

    #[test]
    fn unresolved_search_without_config() {
        let services = ResolvedServices::resolve(&ServerSettings::default(), &Overrides::default());
        assert!(services.search.is_none());
        assert!(services.crawl.is_some());
    }
}
