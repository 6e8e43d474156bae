//! The ESI agent
//!
//! [`EsiAgent`] is the one concrete [`EsiClient`]: it owns an [`HttpClient`]
//! and the [`EsiOptions`] every request is built with. Resource wrappers only
//! ever see it through the [`EsiClient`] trait, so tests can swap in any other
//! implementation.

use esi_common::error::TransportError;
use esi_common::http_client::HttpClient;
use esi_common::request::{build_http_request, process_response};
use esi_common::{EsiClient, EsiOptions, EsiResponse, EsiResult, RequestParams, Route};

/// Sends ESI requests over an HTTP client with a fixed set of options.
#[derive(Debug, Clone)]
pub struct EsiAgent<C> {
    http: C,
    options: EsiOptions,
}

impl<C: HttpClient> EsiAgent<C> {
    /// Create an agent from an HTTP client and options
    pub fn new(http: C, options: EsiOptions) -> Self {
        Self { http, options }
    }

    /// Create an agent with default options
    pub fn with_defaults(http: C) -> Self {
        Self::new(http, EsiOptions::default())
    }

    /// The options requests are built with
    pub fn options(&self) -> &EsiOptions {
        &self.options
    }

    /// Swap the options in place
    pub fn set_options(&mut self, options: EsiOptions) {
        self.options = options;
    }

    /// The underlying HTTP client
    pub fn http(&self) -> &C {
        &self.http
    }
}

impl<C: HttpClient + Sync> EsiClient for EsiAgent<C> {
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, route, params, token), fields(route = route.id)))]
    async fn request(
        &self,
        route: &Route,
        params: RequestParams,
        token: Option<&str>,
    ) -> EsiResult<EsiResponse> {
        let request = build_http_request(&self.options, route, &params, token)?;
        let response = self
            .http
            .send_http(request)
            .await
            .map_err(|e| TransportError::Other(Box::new(e)))?;
        process_response(response)
    }

    fn batch_size(&self) -> usize {
        self.options.batch_size
    }
}

/// Agent over a plain `reqwest` client.
#[cfg(feature = "reqwest-client")]
pub type BasicClient = EsiAgent<reqwest::Client>;

#[cfg(feature = "reqwest-client")]
impl Default for BasicClient {
    fn default() -> Self {
        Self::with_defaults(reqwest::Client::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esi_common::{ClientError, Datasource};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Canned {
        responses: Arc<Mutex<VecDeque<http::Response<Vec<u8>>>>>,
        seen: Arc<Mutex<Vec<http::Request<Vec<u8>>>>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Reset;

    impl HttpClient for Canned {
        type Error = Reset;

        async fn send_http(
            &self,
            request: http::Request<Vec<u8>>,
        ) -> Result<http::Response<Vec<u8>>, Self::Error> {
            self.seen.lock().unwrap().push(request);
            self.responses.lock().unwrap().pop_front().ok_or(Reset)
        }
    }

    const STATUS: Route = Route::get("get_status", "/status/");

    #[tokio::test]
    async fn applies_options_to_every_request() {
        let http = Canned::default();
        http.responses
            .lock()
            .unwrap()
            .push_back(http::Response::new(br#"{"players":1}"#.to_vec()));
        let options = EsiOptions::new()
            .datasource(Datasource::Singularity)
            .user_agent("esi-tests")
            .build();
        let agent = EsiAgent::new(http.clone(), options);

        let response = agent
            .request(&STATUS, RequestParams::new(), None)
            .await
            .unwrap();
        assert_eq!(response.body().as_ref(), br#"{"players":1}"#);

        let seen = http.seen.lock().unwrap();
        assert_eq!(
            seen[0].uri().to_string(),
            "https://esi.evetech.net/latest/status/?datasource=singularity"
        );
        assert_eq!(seen[0].headers()[http::header::USER_AGENT], "esi-tests");
    }

    #[test]
    fn batch_size_comes_from_options() {
        let agent = EsiAgent::with_defaults(Canned::default());
        assert_eq!(agent.batch_size(), esi_common::options::DEFAULT_BATCH_SIZE);

        let options = EsiOptions::new().batch_size(25).build();
        assert_eq!(EsiAgent::new(Canned::default(), options).batch_size(), 25);
    }

    #[tokio::test]
    async fn transport_failure_is_a_transport_error() {
        let agent = EsiAgent::with_defaults(Canned::default());
        let err = agent
            .request(&STATUS, RequestParams::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::Other(_))));
    }
}
