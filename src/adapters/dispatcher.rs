//! Request dispatch
//!
//! Routes a logical endpoint through the descriptor's endpoint table to a
//! concrete HTTP request, signs private calls, hands the request to the
//! transport and classifies the decoded response before returning it.
//!
//! Wire layout (Liqui family):
//! - public: `GET {urls.api.public}/{version}/{path}?{remaining params}`
//! - private: `POST {urls.api.private}` with form body
//!   `nonce=..&method=<endpoint>&<params>` and `Key` / `Sign` headers

use std::sync::Arc;

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::adapters::classifier::{classify_response, ResponseClassifier, SuccessFlagClassifier};
use crate::adapters::descriptor::{AccessClass, ExchangeDescriptor, HttpMethod};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::signing::RequestSigner;
use crate::adapters::transport::{HttpRequest, HttpTransport};
use crate::config::logging::{sanitize, sanitize_signature};

/// Request parameters, keyed by name
pub type Params = Map<String, Value>;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const SIGNING_HEADERS: [&str; 3] = ["Content-Type", "Key", "Sign"];

#[derive(Clone)]
pub struct Dispatcher {
    descriptor: Arc<ExchangeDescriptor>,
    transport: Arc<dyn HttpTransport>,
    signer: Option<Arc<dyn RequestSigner>>,
    classifier: Arc<dyn ResponseClassifier>,
}

impl Dispatcher {
    pub fn new(descriptor: Arc<ExchangeDescriptor>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            descriptor,
            transport,
            signer: None,
            classifier: Arc::new(SuccessFlagClassifier),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ResponseClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn descriptor(&self) -> &ExchangeDescriptor {
        &self.descriptor
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.is_some()
    }

    pub async fn public_get(&self, endpoint: &str, params: Params) -> ExchangeResult<Value> {
        self.request(endpoint, AccessClass::Public, HttpMethod::Get, params, None, None)
            .await
    }

    pub async fn private_post(&self, endpoint: &str, params: Params) -> ExchangeResult<Value> {
        self.request(endpoint, AccessClass::Private, HttpMethod::Post, params, None, None)
            .await
    }

    /// Dispatch one call and return the classified response body
    ///
    /// Failures from the transport or the classifier propagate unchanged;
    /// nothing is retried here.
    pub async fn request(
        &self,
        endpoint: &str,
        access: AccessClass,
        method: HttpMethod,
        params: Params,
        headers: Option<Vec<(String, String)>>,
        body: Option<String>,
    ) -> ExchangeResult<Value> {
        let request = self.build_request(endpoint, access, method, params, headers, body)?;
        let exchange_id = self.descriptor.id.as_str();

        tracing::debug!(
            exchange = %exchange_id,
            endpoint = %endpoint,
            access = %access,
            method = %method,
            url = %request.url,
            "Dispatching request"
        );

        let response = self.transport.send(request).await?;
        let status = response.status;

        if status == 429 || status == 418 {
            tracing::warn!(exchange = %exchange_id, endpoint = %endpoint, status, "Rate limited");
            return Err(ExchangeError::DDoSProtection(format!(
                "{} {} {}",
                exchange_id, status, response.body
            )));
        }
        if !response.is_success() {
            tracing::warn!(exchange = %exchange_id, endpoint = %endpoint, status, "HTTP error");
            return Err(ExchangeError::Http {
                status,
                body: body_text(&response.body),
            });
        }
        if !(response.body.is_object() || response.body.is_array()) {
            return Err(ExchangeError::InvalidResponse(format!(
                "{} {} returned {}",
                exchange_id,
                endpoint,
                body_text(&response.body)
            )));
        }

        classify_response(self.classifier.as_ref(), exchange_id, response.body)
    }

    /// Build the wire request without sending it
    pub fn build_request(
        &self,
        endpoint: &str,
        access: AccessClass,
        method: HttpMethod,
        params: Params,
        headers: Option<Vec<(String, String)>>,
        body: Option<String>,
    ) -> ExchangeResult<HttpRequest> {
        if !self.descriptor.declares(access, method, endpoint) {
            return Err(ExchangeError::UnknownEndpoint {
                endpoint: endpoint.to_string(),
                access: access.to_string(),
                method: method.to_string(),
            });
        }

        let base = self.descriptor.base_url(access).ok_or_else(|| {
            ExchangeError::InvalidDescriptor(format!(
                "'{}': no base URL for {} endpoints",
                self.descriptor.id, access
            ))
        })?;
        let base = base.trim_end_matches('/');
        let caller_headers = headers.unwrap_or_default();

        match access {
            AccessClass::Public => {
                let (path, rest) = implode_params(endpoint, params)?;
                let mut url = match self.descriptor.version.as_deref() {
                    Some(version) if !version.is_empty() => format!("{}/{}/{}", base, version, path),
                    _ => format!("{}/{}", base, path),
                };

                let mut body = body;
                let mut headers = caller_headers;
                if !rest.is_empty() {
                    let encoded = encode_form(&rest);
                    if method == HttpMethod::Get || body.is_some() {
                        url = format!("{}?{}", url, encoded);
                    } else {
                        headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
                        body = Some(encoded);
                    }
                }

                Ok(HttpRequest {
                    url,
                    method,
                    headers,
                    body,
                })
            }
            AccessClass::Private => {
                let signer = self.signer.as_ref().ok_or_else(|| {
                    ExchangeError::Authentication(format!(
                        "{} requires apiKey and secret for private endpoint '{}'",
                        self.descriptor.id, endpoint
                    ))
                })?;
                if body.is_some() {
                    return Err(ExchangeError::BadRequest(format!(
                        "private endpoint '{}' is signed over its params, explicit body not accepted",
                        endpoint
                    )));
                }

                let nonce = signer.next_nonce();
                let mut form = form_urlencoded::Serializer::new(String::new());
                form.append_pair("nonce", &nonce.to_string());
                form.append_pair("method", endpoint);
                for (key, value) in &params {
                    form.append_pair(key, &param_text(value));
                }
                let body = form.finish();
                let signature = signer.sign(&body)?;

                tracing::trace!(
                    exchange = %self.descriptor.id,
                    endpoint = %endpoint,
                    nonce,
                    key = %sanitize(signer.api_key()),
                    sign = %sanitize_signature(&signature),
                    "Signed private request"
                );

                let mut headers = vec![
                    ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
                    ("Key".to_string(), signer.api_key().to_string()),
                    ("Sign".to_string(), signature),
                ];
                headers.extend(caller_headers.into_iter().filter(|(name, _)| {
                    !SIGNING_HEADERS
                        .iter()
                        .any(|reserved| reserved.eq_ignore_ascii_case(name))
                }));

                Ok(HttpRequest {
                    url: base.to_string(),
                    method,
                    headers,
                    body: Some(body),
                })
            }
        }
    }
}

/// Substitute `{name}` placeholders from `params`
///
/// Returns the concrete path and the params no placeholder consumed.
pub fn implode_params(path: &str, mut params: Params) -> ExchangeResult<(String, Params)> {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(open) = rest.find('{') {
        let close = rest[open..]
            .find('}')
            .map(|offset| open + offset)
            .ok_or_else(|| ExchangeError::BadRequest(format!("unterminated placeholder in '{}'", path)))?;
        let name = &rest[open + 1..close];
        let value = params.remove(name).ok_or_else(|| {
            ExchangeError::BadRequest(format!("missing parameter '{}' for '{}'", name, path))
        })?;
        out.push_str(&rest[..open]);
        out.push_str(&param_text(&value));
        rest = &rest[close + 1..];
    }
    out.push_str(rest);

    Ok((out, params))
}

fn encode_form(params: &Params) -> String {
    let mut form = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        form.append_pair(key, &param_text(value));
    }
    form.finish()
}

/// Wire text for a parameter value; strings go out unquoted
fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn body_text(body: &Value) -> String {
    match body {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::signing::{sign_hmac_sha512, Credentials, HmacSigner, NonceSource};
    use crate::adapters::test_utils::{builtin_descriptor, MockTransport};
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    fn public_dispatcher(transport: &MockTransport) -> Dispatcher {
        Dispatcher::new(builtin_descriptor("wex"), Arc::new(transport.clone()))
    }

    fn private_dispatcher(transport: &MockTransport) -> Dispatcher {
        let signer = HmacSigner::with_nonce(
            Credentials::new("my-key", "my-secret"),
            Arc::new(NonceSource::starting_after(4_000_000_000)),
        );
        public_dispatcher(transport).with_signer(Arc::new(signer))
    }

    #[test]
    fn test_implode_params() {
        let (path, rest) =
            implode_params("ticker/{pair}", params(json!({"pair": "btc_usd", "limit": 5}))).unwrap();
        assert_eq!(path, "ticker/btc_usd");
        assert_eq!(rest, params(json!({"limit": 5})));
    }

    #[test]
    fn test_implode_missing_param() {
        let err = implode_params("depth/{pair}", Params::new()).unwrap_err();
        assert!(matches!(err, ExchangeError::BadRequest(_)));
        assert!(err.to_string().contains("'pair'"));
    }

    #[tokio::test]
    async fn test_public_get_url() {
        let transport = MockTransport::new().ok(json!({"btc_usd": {"last": 1.0}}));
        let dispatcher = public_dispatcher(&transport);

        let response = dispatcher
            .public_get("ticker/{pair}", params(json!({"pair": "btc_usd"})))
            .await
            .unwrap();
        assert_eq!(response["btc_usd"]["last"], 1.0);

        let request = transport.last_request();
        assert_eq!(request.url, "https://wex.nz/api/3/ticker/btc_usd");
        assert_eq!(request.method, HttpMethod::Get);
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_public_get_leftover_params_become_query() {
        let transport = MockTransport::new().ok(json!({}));
        let dispatcher = public_dispatcher(&transport);
        dispatcher
            .public_get("depth/{pair}", params(json!({"pair": "btc_usd", "limit": 10})))
            .await
            .unwrap();
        assert_eq!(
            transport.last_request().url,
            "https://wex.nz/api/3/depth/btc_usd?limit=10"
        );
    }

    #[tokio::test]
    async fn test_undeclared_endpoint_rejected_before_transport() {
        let transport = MockTransport::new();
        let dispatcher = private_dispatcher(&transport);

        let err = dispatcher.private_post("Withdraw", Params::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unknown endpoint private POST 'Withdraw'");

        let err = dispatcher
            .request("info", AccessClass::Public, HttpMethod::Post, Params::new(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::UnknownEndpoint { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_private_without_credentials_is_authentication_error() {
        let transport = MockTransport::new();
        let dispatcher = public_dispatcher(&transport);
        assert!(!dispatcher.has_credentials());

        let err = dispatcher.private_post("getInfo", Params::new()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::Authentication(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_private_request_is_signed() {
        let transport = MockTransport::new().ok(json!({"success": 1, "return": {"funds": {}}}));
        let dispatcher = private_dispatcher(&transport);

        dispatcher
            .private_post("Trade", params(json!({"pair": "btc_usd", "type": "buy", "rate": 4000.5, "amount": 0.1})))
            .await
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.url, "https://wex.nz/tapi");
        assert_eq!(request.method, HttpMethod::Post);

        let body = request.body.clone().unwrap();
        assert_eq!(
            body,
            "nonce=4000000001&method=Trade&amount=0.1&pair=btc_usd&rate=4000.5&type=buy"
        );

        let header = |name: &str| {
            request
                .headers
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(header("Content-Type"), FORM_CONTENT_TYPE);
        assert_eq!(header("Key"), "my-key");
        assert_eq!(header("Sign"), sign_hmac_sha512(&body, "my-secret").unwrap());
    }

    #[tokio::test]
    async fn test_private_nonces_increase() {
        let transport = MockTransport::new()
            .ok(json!({"success": 1}))
            .ok(json!({"success": 1}));
        let dispatcher = private_dispatcher(&transport);
        dispatcher.private_post("getInfo", Params::new()).await.unwrap();
        dispatcher.private_post("getInfo", Params::new()).await.unwrap();

        let bodies: Vec<String> = transport
            .requests()
            .into_iter()
            .map(|r| r.body.unwrap())
            .collect();
        assert_eq!(bodies[0], "nonce=4000000001&method=getInfo");
        assert_eq!(bodies[1], "nonce=4000000002&method=getInfo");
    }

    #[tokio::test]
    async fn test_caller_headers_cannot_replace_signing_headers() {
        let transport = MockTransport::new().ok(json!({"success": 1}));
        let dispatcher = private_dispatcher(&transport);
        dispatcher
            .request(
                "getInfo",
                AccessClass::Private,
                HttpMethod::Post,
                Params::new(),
                Some(vec![
                    ("key".to_string(), "spoofed".to_string()),
                    ("X-Trace".to_string(), "abc".to_string()),
                ]),
                None,
            )
            .await
            .unwrap();

        let headers = transport.last_request().headers;
        assert_eq!(headers.len(), 4);
        assert_eq!(headers[1], ("Key".to_string(), "my-key".to_string()));
        assert_eq!(headers[3], ("X-Trace".to_string(), "abc".to_string()));
    }

    #[tokio::test]
    async fn test_classifier_failure_propagates() {
        let transport = MockTransport::new()
            .ok(json!({"success": 0, "error": "It is Not enougth BTC in the account for sale."}));
        let dispatcher = private_dispatcher(&transport);
        let err = dispatcher.private_post("getInfo", Params::new()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InsufficientFunds(_)));
        assert!(err.to_string().contains("wex "));
    }

    #[tokio::test]
    async fn test_no_orders_passes_through() {
        let transport = MockTransport::new().ok(json!({"success": 0, "error": "no orders"}));
        let dispatcher = private_dispatcher(&transport);
        let response = dispatcher.private_post("ActiveOrders", Params::new()).await.unwrap();
        assert_eq!(response["error"], "no orders");
    }

    #[tokio::test]
    async fn test_http_status_mapping() {
        let transport = MockTransport::new()
            .respond(429, json!("slow down"))
            .respond(503, json!("<html>maintenance</html>"))
            .ok(json!("plain text"));
        let dispatcher = public_dispatcher(&transport);

        let err = dispatcher.public_get("info", Params::new()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::DDoSProtection(_)));

        let err = dispatcher.public_get("info", Params::new()).await.unwrap_err();
        match err {
            ExchangeError::Http { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "<html>maintenance</html>");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = dispatcher.public_get("info", Params::new()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let transport = MockTransport::new().fail(ExchangeError::NetworkTimeout(10_000));
        let dispatcher = public_dispatcher(&transport);
        let err = dispatcher.public_get("info", Params::new()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::NetworkTimeout(10_000)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_private_explicit_body_rejected() {
        let dispatcher = private_dispatcher(&MockTransport::new());
        let err = dispatcher
            .build_request(
                "getInfo",
                AccessClass::Private,
                HttpMethod::Post,
                Params::new(),
                None,
                Some("raw".into()),
            )
            .unwrap_err();
        assert!(matches!(err, ExchangeError::BadRequest(_)));
    }
}
