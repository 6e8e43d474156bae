//! # Route descriptors and the request capability
//!
//! Every ESI call is a [`Route`] (identifier, method, path template) plus
//! [`RequestParams`] and an optional bearer token. [`EsiClient`] is the one
//! capability the pagination and batching layer needs from a transport:
//! turn those three things into an [`EsiResponse`] or fail.
//!
//! Mapping overview:
//! - 2xx: body is kept as-is; callers decode with [`EsiResponse::json`].
//! - anything else: [`HttpError`] carrying the status and body (ESI error
//!   bodies look like `{"error": "..."}`, see [`HttpError::message`]).

use std::future::Future;

use bytes::Bytes;
use http::header::{ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, StatusCode};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use smol_str::{SmolStr, ToSmolStr};

use crate::error::{DecodeError, EncodeError, EsiResult, HttpError, TransportError};
use crate::options::{DEFAULT_BATCH_SIZE, EsiOptions};
use crate::page::Page;

/// Header ESI uses to announce the page count of a paginated route
pub const X_PAGES: &str = "x-pages";

/// Characters left alone when a path parameter is substituted
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// HTTP method of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
}

impl RouteMethod {
    /// Get the HTTP method string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    /// The equivalent `http::Method`
    pub fn as_http(&self) -> http::Method {
        match self {
            Self::Get => http::Method::GET,
            Self::Post => http::Method::POST,
        }
    }
}

/// Static description of one ESI route.
///
/// `path` is relative to the ESI base and may contain `{name}` placeholders
/// that are filled from [`RequestParams::path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    /// Route identifier, e.g. `get_alliances_alliance_id`
    pub id: &'static str,
    /// HTTP method
    pub method: RouteMethod,
    /// Path template, e.g. `/alliances/{alliance_id}/`
    pub path: &'static str,
}

impl Route {
    /// A GET route
    pub const fn get(id: &'static str, path: &'static str) -> Self {
        Self {
            id,
            method: RouteMethod::Get,
            path,
        }
    }

    /// A POST route
    pub const fn post(id: &'static str, path: &'static str) -> Self {
        Self {
            id,
            method: RouteMethod::Post,
            path,
        }
    }

    /// Fill the path template, percent-encoding each substituted value.
    pub fn render_path(&self, params: &[(SmolStr, SmolStr)]) -> Result<String, EncodeError> {
        let mut out = String::with_capacity(self.path.len());
        let mut rest = self.path;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after
                .find('}')
                .ok_or(EncodeError::Template { route: self.id })?;
            let name = &after[..end];
            let value = params
                .iter()
                .find(|(key, _)| key.as_str() == name)
                .map(|(_, value)| value)
                .ok_or_else(|| EncodeError::MissingPathParam {
                    route: self.id,
                    name: name.to_smolstr(),
                })?;
            out.extend(utf8_percent_encode(value, PATH_SEGMENT));
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Path, query and body parameters for one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    /// Values for the route's `{placeholder}` segments
    pub path: Vec<(SmolStr, SmolStr)>,
    /// Query string pairs, in order
    pub query: Vec<(SmolStr, SmolStr)>,
    /// JSON body, for POST routes
    pub body: Option<serde_json::Value>,
}

impl RequestParams {
    /// Empty parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a path placeholder
    pub fn path(mut self, name: &str, value: impl ToSmolStr) -> Self {
        self.path.push((name.to_smolstr(), value.to_smolstr()));
        self
    }

    /// Append a query pair
    pub fn query(mut self, name: &str, value: impl ToSmolStr) -> Self {
        self.query.push((name.to_smolstr(), value.to_smolstr()));
        self
    }

    /// Append a query pair if the value is present
    pub fn maybe_query(self, name: &str, value: Option<impl ToSmolStr>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Set the JSON body from any serializable value
    pub fn body(mut self, body: &impl Serialize) -> Result<Self, EncodeError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// Successful ESI response with its body still encoded.
#[derive(Debug, Clone)]
pub struct EsiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl EsiResponse {
    /// Create a new response from its parts
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw response body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> EsiResult<T> {
        Ok(serde_json::from_slice(&self.body).map_err(DecodeError::from)?)
    }

    /// Page count from the `X-Pages` header, if present
    pub fn pages(&self) -> EsiResult<Option<u32>> {
        let Some(value) = self.headers.get(X_PAGES) else {
            return Ok(None);
        };
        let parsed = value
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok());
        match parsed {
            Some(pages) => Ok(Some(pages)),
            None => Err(DecodeError::Header {
                name: X_PAGES,
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            }
            .into()),
        }
    }

    /// Decode the body as a JSON array and attach the `X-Pages` count
    pub fn page<T: DeserializeOwned>(&self) -> EsiResult<Page<T>> {
        let elements: Vec<T> = self.json()?;
        Ok(Page {
            elements,
            max_pages: self.pages()?,
        })
    }
}

/// Build an HTTP request for a route given the client options
pub fn build_http_request(
    opts: &EsiOptions,
    route: &Route,
    params: &RequestParams,
    token: Option<&str>,
) -> EsiResult<http::Request<Vec<u8>>> {
    let path = route.render_path(&params.path)?;
    // `Url::join` replaces the last segment of a base without a trailing slash
    let mut base = opts.base_url.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    let mut url = base
        .join(path.trim_start_matches('/'))
        .map_err(EncodeError::from)?;

    let mut query: Vec<(&str, &str)> = params
        .query
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    query.push(("datasource", opts.datasource.as_str()));
    let query = serde_html_form::to_string(&query).map_err(EncodeError::from)?;
    url.set_query(Some(&query));

    let mut builder = http::Request::builder()
        .method(route.method.as_http())
        .uri(url.as_str())
        .header(ACCEPT, "application/json");
    if let Some(user_agent) = &opts.user_agent {
        builder = builder.header(USER_AGENT, user_agent.as_str());
    }
    if let Some(language) = &opts.language {
        builder = builder.header(ACCEPT_LANGUAGE, language.as_str());
    }
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let body = match &params.body {
        Some(body) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            serde_json::to_vec(body).map_err(EncodeError::from)?
        }
        None => Vec::new(),
    };

    Ok(builder
        .body(body)
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?)
}

/// Process the HTTP response from the server into an [`EsiResponse`] statelessly.
#[inline]
pub fn process_response(http_response: http::Response<Vec<u8>>) -> EsiResult<EsiResponse> {
    let (parts, body) = http_response.into_parts();
    let body = Bytes::from(body);
    if !parts.status.is_success() {
        #[cfg(feature = "tracing")]
        tracing::debug!(status = %parts.status, "ESI returned an error status");
        return Err(HttpError {
            status: parts.status,
            body: Some(body),
        }
        .into());
    }
    Ok(EsiResponse::new(parts.status, parts.headers, body))
}

/// The request capability every resource wrapper is written against.
///
/// Any rejection is a hard failure of the current fetch step; nothing at this
/// layer retries.
#[trait_variant::make(Send)]
pub trait EsiClient {
    /// Send one call and return the successful response
    fn request(
        &self,
        route: &Route,
        params: RequestParams,
        token: Option<&str>,
    ) -> impl Future<Output = EsiResult<EsiResponse>>;

    /// Most ids one call to a bulk route should carry
    fn batch_size(&self) -> usize {
        DEFAULT_BATCH_SIZE
    }
}

/// Typed decoding on top of [`EsiClient`].
pub trait EsiClientExt: EsiClient {
    /// Send a call and decode the body as JSON
    fn request_json<T>(
        &self,
        route: &Route,
        params: RequestParams,
        token: Option<&str>,
    ) -> impl Future<Output = EsiResult<T>> + Send
    where
        T: DeserializeOwned + Send,
        Self: Sync,
    {
        async move { self.request(route, params, token).await?.json() }
    }

    /// Send a call for one page of a paginated route
    fn request_page<T>(
        &self,
        route: &Route,
        params: RequestParams,
        token: Option<&str>,
    ) -> impl Future<Output = EsiResult<Page<T>>> + Send
    where
        T: DeserializeOwned + Send,
        Self: Sync,
    {
        async move { self.request(route, params, token).await?.page() }
    }
}

impl<C: EsiClient> EsiClientExt for C {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    const ALLIANCE: Route = Route::get("get_alliances_alliance_id", "/alliances/{alliance_id}/");

    #[test]
    fn render_path_substitutes_placeholders() {
        let params = RequestParams::new().path("alliance_id", 99000006u64);
        assert_eq!(
            ALLIANCE.render_path(&params.path).unwrap(),
            "/alliances/99000006/"
        );
    }

    #[test]
    fn render_path_encodes_values() {
        let route = Route::get("search", "/search/{term}/");
        let params = RequestParams::new().path("term", "a b/c");
        assert_eq!(route.render_path(&params.path).unwrap(), "/search/a%20b%2Fc/");
    }

    #[test]
    fn render_path_reports_missing_param() {
        let err = ALLIANCE.render_path(&[]).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::MissingPathParam { route: "get_alliances_alliance_id", ref name } if name.as_str() == "alliance_id"
        ));
    }

    #[test]
    fn build_request_applies_options() {
        let opts = EsiOptions::new()
            .user_agent("esi-tests")
            .language("de")
            .build();
        let params = RequestParams::new()
            .path("alliance_id", 1)
            .query("page", 2);
        let req = build_http_request(&opts, &ALLIANCE, &params, Some("tok")).unwrap();

        assert_eq!(req.method(), http::Method::GET);
        assert_eq!(
            req.uri().to_string(),
            "https://esi.evetech.net/latest/alliances/1/?page=2&datasource=tranquility"
        );
        assert_eq!(req.headers()[USER_AGENT], "esi-tests");
        assert_eq!(req.headers()[ACCEPT_LANGUAGE], "de");
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer tok");
        assert!(req.body().is_empty());
    }

    #[test]
    fn build_request_keeps_last_base_segment() {
        let opts = EsiOptions::new()
            .base_url(url::Url::parse("https://esi.evetech.net/latest").unwrap())
            .build();
        let params = RequestParams::new().path("alliance_id", 1);
        let req = build_http_request(&opts, &ALLIANCE, &params, None).unwrap();
        assert_eq!(
            req.uri().to_string(),
            "https://esi.evetech.net/latest/alliances/1/?datasource=tranquility"
        );
        assert_eq!(opts.base_url.as_str(), "https://esi.evetech.net/latest");
    }

    #[test]
    fn build_request_encodes_json_body() {
        let route = Route::post("post_universe_names", "/universe/names/");
        let params = RequestParams::new().body(&vec![1u64, 2, 3]).unwrap();
        let req = build_http_request(&EsiOptions::default(), &route, &params, None).unwrap();

        assert_eq!(req.method(), http::Method::POST);
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(req.body().as_slice(), b"[1,2,3]");
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn process_response_reads_pages() {
        let resp = http::Response::builder()
            .status(200)
            .header("X-Pages", "3")
            .body(b"[1,2]".to_vec())
            .unwrap();
        let resp = process_response(resp).unwrap();
        let page: Page<u64> = resp.page().unwrap();
        assert_eq!(page.elements, vec![1, 2]);
        assert_eq!(page.max_pages, Some(3));
    }

    #[test]
    fn process_response_rejects_bad_page_header() {
        let resp = http::Response::builder()
            .status(200)
            .header("X-Pages", "many")
            .body(b"[]".to_vec())
            .unwrap();
        let err = process_response(resp).unwrap().pages().unwrap_err();
        assert!(matches!(err, ClientError::Decode(DecodeError::Header { .. })));
    }

    #[test]
    fn process_response_maps_errors() {
        let resp = http::Response::builder()
            .status(404)
            .body(br#"{"error":"Alliance not found"}"#.to_vec())
            .unwrap();
        match process_response(resp) {
            Err(ClientError::Http(err)) => {
                assert_eq!(err.status, StatusCode::NOT_FOUND);
                assert_eq!(err.message().as_deref(), Some("Alliance not found"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
