//! HTTP client for the site's REST backend.
//!
//! Every call goes through [`ApiClient::send`]: the stored access token is
//! attached as a bearer token, the `{ success, data?, error?, message? }`
//! envelope is unwrapped, and every failure is mapped to an [`ApiError`].

mod error;

use std::sync::Arc;

use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::token_store::{TokenKind, TokenStore};

pub use error::{ApiError, ApiResult, IntoApiResponse};

const CLIENT_USER_AGENT: &str = concat!("atelier-client/", env!("CARGO_PKG_VERSION"));

/// One API call: method, path relative to the base URL, query, headers and body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append query parameters.
    #[must_use]
    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add a request header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Set a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Malformed`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body).map_err(ApiError::Malformed)?);
        Ok(self)
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// REST API client.
///
/// Cheap to clone; clones share the connection pool and token store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Setup`] if the HTTP client cannot be built.
    pub fn new(base_url: Url, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ApiError::Setup)?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                tokens,
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Issue `method path` with an optional JSON body and decode the data.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures, non-success statuses,
    /// rejected envelopes and undecodable data.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = ApiRequest::new(method, path);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.send(request).await
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Send a prepared request and decode the data.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let mut builder = self
            .inner
            .client
            .request(request.method, self.url(&request.path, &request.query));
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        decode(self.execute(builder).await?)
    }

    /// `POST path` with a multipart form.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    #[instrument(skip(self, form))]
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ApiResult<T> {
        let builder = self
            .inner
            .client
            .post(self.url(path, &[]))
            .multipart(form);
        decode(self.execute(builder).await?)
    }

    /// Attach the bearer token, send, and normalize the response.
    async fn execute(&self, builder: reqwest::RequestBuilder) -> ApiResult<Value> {
        let builder = match self.inner.tokens.get(TokenKind::Access) {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        };

        let response = builder.send().await.map_err(ApiError::Network)?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok());
        let body = response.text().await.map_err(ApiError::Network)?;

        tracing::debug!(status = status.as_u16(), "API response");
        normalize(status, &body, retry_after)
    }

    /// Join `path` onto the base URL, keeping the base URL's own path.
    fn url(&self, path: &str, query: &[(String, String)]) -> Url {
        let mut url = self.inner.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(query);
        }
        url
    }
}

/// Unwrap the response envelope of a finished call.
///
/// - non-2xx: mapped by status, using the envelope message where allowed
/// - 2xx with an empty or non-JSON body: `null`
/// - `{ success: true, data }`: `data` (`null` if absent)
/// - `{ success: false, error | message }`: [`ApiError::Rejected`]
/// - anything else: the body itself is the data
pub(crate) fn normalize(status: StatusCode, body: &str, retry_after: Option<u64>) -> ApiResult<Value> {
    let parsed = serde_json::from_str::<Value>(body).ok();

    if !status.is_success() {
        let message = parsed.as_ref().and_then(envelope_message);
        return Err(ApiError::from_status(
            status.as_u16(),
            message.as_deref(),
            retry_after,
        ));
    }

    match parsed {
        None => Ok(Value::Null),
        Some(Value::Object(mut map)) => match map.get("success").and_then(Value::as_bool) {
            Some(true) => Ok(map.remove("data").unwrap_or(Value::Null)),
            Some(false) => {
                let message = envelope_message(&Value::Object(map));
                Err(ApiError::rejected(status.as_u16(), message.as_deref()))
            }
            None => Ok(Value::Object(map)),
        },
        Some(other) => Ok(other),
    }
}

/// `error` before `message`, skipping blanks and non-strings.
fn envelope_message(body: &Value) -> Option<String> {
    ["error", "message"]
        .into_iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(ToString::to_string)
}

fn decode<T: DeserializeOwned>(data: Value) -> ApiResult<T> {
    serde_json::from_value(data).map_err(ApiError::Malformed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::token_store::MemoryTokenStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).unwrap(), Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[test]
    fn test_envelope_data_unwrapped() {
        let value = normalize(StatusCode::OK, r#"{"success":true,"data":[1,2]}"#, None).unwrap();
        assert_eq!(value, json!([1, 2]));

        let value = normalize(StatusCode::CREATED, r#"{"success":true}"#, None).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_bare_bodies_accepted() {
        let value = normalize(StatusCode::OK, r#"[{"id":"1"}]"#, None).unwrap();
        assert_eq!(value, json!([{"id": "1"}]));

        let value = normalize(StatusCode::OK, r#"{"id":"1","title":"x"}"#, None).unwrap();
        assert_eq!(value["title"], "x");
    }

    #[test]
    fn test_empty_or_non_json_success_degrades_to_null() {
        for body in ["", "OK", "<html></html>"] {
            assert_eq!(normalize(StatusCode::OK, body, None).unwrap(), Value::Null, "{body}");
        }
        decode::<()>(normalize(StatusCode::NO_CONTENT, "", None).unwrap()).unwrap();
    }

    #[test]
    fn test_rejected_envelope_on_success_status() {
        let err = normalize(
            StatusCode::OK,
            r#"{"success":false,"error":"Slug already exists"}"#,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 200, .. }));
        assert_eq!(err.to_string(), "Slug already exists");
    }

    #[test]
    fn test_error_statuses_mapped() {
        let body = r#"{"success":false,"message":"jwt expired at verify (auth.js:42)"}"#;
        assert!(matches!(
            normalize(StatusCode::UNAUTHORIZED, body, None),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            normalize(StatusCode::TOO_MANY_REQUESTS, "", Some(30)),
            Err(ApiError::RateLimited {
                retry_after: Some(30)
            })
        ));
        assert!(matches!(
            normalize(StatusCode::BAD_GATEWAY, "<html>", None),
            Err(ApiError::Server { status: 502 })
        ));

        let err = normalize(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"success":false,"message":"Title is required"}"#,
            None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn test_typed_decode_failure_is_malformed() {
        let err = decode::<Vec<String>>(json!({"not": "a list"})).unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[test]
    fn test_url_keeps_base_path() {
        let api = client("https://api.example.com/api/");
        assert_eq!(
            api.url("/projects", &[]).as_str(),
            "https://api.example.com/api/projects"
        );

        let api = client("http://localhost:5000");
        let url = api.url(
            "admin/logs",
            &[("page".to_string(), "2".to_string()), ("action".to_string(), "log in".to_string())],
        );
        assert_eq!(url.as_str(), "http://localhost:5000/admin/logs?page=2&action=log+in");
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("/admin/logs")
            .query([("page", "1")])
            .json(&json!({"a": 1}))
            .unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/admin/logs");
        assert_eq!(request.query, vec![("page".to_string(), "1".to_string())]);
    }
}
