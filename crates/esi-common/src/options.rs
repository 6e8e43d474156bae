//! Client-wide configuration

use bon::Builder;
use smol_str::SmolStr;
use url::Url;

/// Public ESI base, including the `latest` version segment.
pub const DEFAULT_BASE_URL: &str = "https://esi.evetech.net/latest/";

/// Largest id list ESI accepts on its bulk POST routes (`/universe/names/`,
/// `/characters/affiliation/`, ...).
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Which game server the data should come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Datasource {
    /// The live server
    #[default]
    Tranquility,
    /// The public test server
    Singularity,
}

impl Datasource {
    /// Value of the `datasource` query parameter
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tranquility => "tranquility",
            Self::Singularity => "singularity",
        }
    }
}

/// Options applied to every request an agent sends.
///
/// - `base_url`: ESI root every route path is joined onto. Must end in `/`.
/// - `datasource`: sent as the `datasource` query parameter.
/// - `user_agent`: ESI asks third-party tools to identify themselves; set a
///   contact address here.
/// - `language`: sent as `Accept-Language` for localized names.
/// - `batch_size`: default group size for bulk id routes.
#[derive(Debug, Clone, Builder)]
#[builder(start_fn = new)]
pub struct EsiOptions {
    /// ESI root URL
    #[builder(default = Url::parse(DEFAULT_BASE_URL).expect("valid url"))]
    pub base_url: Url,
    /// Server to query
    #[builder(default)]
    pub datasource: Datasource,
    /// `User-Agent` header value
    #[builder(into)]
    pub user_agent: Option<SmolStr>,
    /// `Accept-Language` header value
    #[builder(into)]
    pub language: Option<SmolStr>,
    /// Maximum ids per bulk request
    #[builder(default = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
}

impl Default for EsiOptions {
    fn default() -> Self {
        Self::new().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_tranquility() {
        let opts = EsiOptions::default();
        assert_eq!(opts.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(opts.datasource, Datasource::Tranquility);
        assert_eq!(opts.batch_size, DEFAULT_BATCH_SIZE);
        assert!(opts.user_agent.is_none());
    }

    #[test]
    fn builder_overrides() {
        let opts = EsiOptions::new()
            .datasource(Datasource::Singularity)
            .user_agent("esi-tests (ops@example.com)")
            .batch_size(250)
            .build();
        assert_eq!(opts.datasource.as_str(), "singularity");
        assert_eq!(
            opts.user_agent.as_deref(),
            Some("esi-tests (ops@example.com)")
        );
        assert_eq!(opts.batch_size, 250);
    }
}
