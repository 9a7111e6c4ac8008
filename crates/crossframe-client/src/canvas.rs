//! Canvas signed-request parsing.
//!
//! In a canvas context the page receives no useful query parameters;
//! the trusted origin and nonce arrive inside a signed-request payload
//! instead, either as a JSON string or as an already-parsed object
//! (the OAuth flow hands over the latter). Parsing is lazy and cached:
//! the payload is immutable for the lifetime of the page.

use std::cell::OnceCell;

use serde::Deserialize;

/// The raw signed-request payload handed over by the embedder.
#[derive(Debug, Clone)]
pub enum CanvasRequest {
    /// A JSON string, to be parsed on first use.
    Raw(String),
    /// An already-parsed payload (OAuth flow).
    Parsed(serde_json::Value),
}

/// Authentication parameters extracted from a signed request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanvasAuthParams {
    /// Trusted host-frame origin.
    pub iframe_origin: Option<String>,
    /// Shared secret nonce.
    pub nonce: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SignedRequest {
    context: Option<Section>,
    payload: Option<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    environment: Option<Environment>,
}

#[derive(Debug, Deserialize)]
struct Environment {
    parameters: Option<Parameters>,
}

#[derive(Debug, Deserialize, Default)]
struct Parameters {
    #[serde(rename = "sfdcIframeOrigin")]
    sfdc_iframe_origin: Option<String>,
    nonce: Option<String>,
    #[serde(rename = "isInConsole", default)]
    is_in_console: serde_json::Value,
}

/// Client for the canvas execution context.
pub struct CanvasClient {
    source: Option<CanvasRequest>,
    parsed: OnceCell<Option<SignedRequest>>,
}

impl CanvasClient {
    /// Creates a client over the embedder-supplied payload, if any.
    pub fn new(source: Option<CanvasRequest>) -> Self {
        Self {
            source,
            parsed: OnceCell::new(),
        }
    }

    /// Returns true when the page runs in a canvas context at all,
    /// regardless of whether the payload parses.
    pub fn is_canvas_context(&self) -> bool {
        self.source.is_some()
    }

    fn parsed(&self) -> Option<&SignedRequest> {
        self.parsed
            .get_or_init(|| match &self.source {
                Some(CanvasRequest::Raw(json)) => match serde_json::from_str(json) {
                    Ok(request) => Some(request),
                    Err(err) => {
                        tracing::warn!(%err, "failed to parse canvas signed request");
                        None
                    }
                },
                Some(CanvasRequest::Parsed(value)) => {
                    match serde_json::from_value(value.clone()) {
                        Ok(request) => Some(request),
                        Err(err) => {
                            tracing::warn!(%err, "unexpected canvas signed request shape");
                            None
                        }
                    }
                }
                None => None,
            })
            .as_ref()
    }

    fn parameters(&self) -> Option<&Parameters> {
        let request = self.parsed()?;
        let section = request.context.as_ref().or(request.payload.as_ref())?;
        section.environment.as_ref()?.parameters.as_ref()
    }

    /// Extracts the trusted origin and nonce from the signed request.
    ///
    /// Looks under `context.environment.parameters` first, then under
    /// `payload.environment.parameters`.
    pub fn auth_params(&self) -> CanvasAuthParams {
        match self.parameters() {
            Some(parameters) => CanvasAuthParams {
                iframe_origin: parameters.sfdc_iframe_origin.clone(),
                nonce: parameters.nonce.clone(),
            },
            None => CanvasAuthParams::default(),
        }
    }

    /// Returns true when the signed request flags the page as running
    /// inside the console. Only the `context` section is consulted.
    pub fn is_in_console(&self) -> bool {
        let Some(request) = self.parsed() else {
            return false;
        };
        let Some(parameters) = request
            .context
            .as_ref()
            .and_then(|section| section.environment.as_ref())
            .and_then(|environment| environment.parameters.as_ref())
        else {
            return false;
        };
        is_truthy(&parameters.is_in_console)
    }
}

/// Loose truthiness for signed-request parameters, which arrive as
/// booleans or strings depending on the host version.
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_from_json(json: &str) -> CanvasClient {
        CanvasClient::new(Some(CanvasRequest::Raw(json.to_string())))
    }

    #[test]
    fn no_source_means_no_canvas() {
        let client = CanvasClient::new(None);
        assert!(!client.is_canvas_context());
        assert_eq!(client.auth_params(), CanvasAuthParams::default());
        assert!(!client.is_in_console());
    }

    #[test]
    fn auth_params_from_context_section() {
        let client = client_from_json(
            r#"{"context":{"environment":{"parameters":{
                "sfdcIframeOrigin":"https://na1.example.com","nonce":"abc"}}}}"#,
        );
        let params = client.auth_params();
        assert_eq!(
            params.iframe_origin.as_deref(),
            Some("https://na1.example.com")
        );
        assert_eq!(params.nonce.as_deref(), Some("abc"));
    }

    #[test]
    fn auth_params_from_payload_section() {
        let client = client_from_json(
            r#"{"payload":{"environment":{"parameters":{
                "sfdcIframeOrigin":"https://na2.example.com","nonce":"xyz"}}}}"#,
        );
        let params = client.auth_params();
        assert_eq!(
            params.iframe_origin.as_deref(),
            Some("https://na2.example.com")
        );
        assert_eq!(params.nonce.as_deref(), Some("xyz"));
    }

    #[test]
    fn parsed_object_source() {
        let value = serde_json::json!({
            "context": {"environment": {"parameters": {"nonce": "n1"}}}
        });
        let client = CanvasClient::new(Some(CanvasRequest::Parsed(value)));
        assert!(client.is_canvas_context());
        assert_eq!(client.auth_params().nonce.as_deref(), Some("n1"));
        assert_eq!(client.auth_params().iframe_origin, None);
    }

    #[test]
    fn malformed_json_degrades_to_empty_params() {
        let client = client_from_json("{not json");
        assert!(client.is_canvas_context());
        assert_eq!(client.auth_params(), CanvasAuthParams::default());
    }

    #[test]
    fn is_in_console_accepts_bool_and_string() {
        let yes =
            client_from_json(r#"{"context":{"environment":{"parameters":{"isInConsole":true}}}}"#);
        assert!(yes.is_in_console());

        let stringy = client_from_json(
            r#"{"context":{"environment":{"parameters":{"isInConsole":"true"}}}}"#,
        );
        assert!(stringy.is_in_console());

        let no = client_from_json(
            r#"{"context":{"environment":{"parameters":{"isInConsole":false}}}}"#,
        );
        assert!(!no.is_in_console());
    }

    #[test]
    fn is_in_console_ignores_payload_section() {
        let client = client_from_json(
            r#"{"payload":{"environment":{"parameters":{"isInConsole":true}}}}"#,
        );
        assert!(!client.is_in_console());
    }
}
