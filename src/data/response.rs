//! Response classification.
//!
//! INE reports rejected requests (unknown indicator, bad dimension code) inside
//! an HTTP 200 body, so a response is only usable after both the status check
//! and the body check pass.

use serde_json::Value;

use crate::error::{ApiErrorRecord, IneError};

/// Outcome of inspecting a completed response.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Success,
    HttpFailure(u16),
    SemanticFailure(Vec<ApiErrorRecord>),
}

pub fn is_http_error(status: u16) -> bool {
    (400..600).contains(&status)
}

/// Classify a response from its status and parsed body.
pub fn classify(status: u16, body: &Value) -> Classification {
    if is_http_error(status) {
        return Classification::HttpFailure(status);
    }
    let errors = semantic_errors(body);
    if errors.is_empty() {
        Classification::Success
    } else {
        Classification::SemanticFailure(errors)
    }
}

/// Records under `[0].Sucesso.Falso`, empty when there are none.
pub fn semantic_errors(body: &Value) -> Vec<ApiErrorRecord> {
    body.as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get("Sucesso"))
        .and_then(|success| success.get("Falso"))
        .and_then(Value::as_array)
        .map(|errors| errors.iter().map(ApiErrorRecord::from_json).collect())
        .unwrap_or_default()
}

/// A completed INE response: status, final URL and body text.
#[derive(Debug, Clone)]
pub struct IneResponse {
    status: u16,
    url: String,
    body: String,
}

impl IneResponse {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json(&self) -> Result<Value, IneError> {
        serde_json::from_str(&self.body)
            .map_err(|e| IneError::Decode(format!("response from {} is not JSON: {e}", self.url)))
    }

    /// Whether INE flagged the request as failed in the body.
    ///
    /// Does not look at the HTTP status.
    pub fn is_ine_error(&self) -> bool {
        self.json()
            .map(|body| !semantic_errors(&body).is_empty())
            .unwrap_or(false)
    }

    pub fn ine_errors(&self) -> Vec<ApiErrorRecord> {
        self.json().map(|body| semantic_errors(&body)).unwrap_or_default()
    }

    /// Check the HTTP status, then the body, and return the parsed body.
    pub fn error_for_status(&self) -> Result<Value, IneError> {
        if is_http_error(self.status) {
            return Err(IneError::HttpStatus {
                status: self.status,
                url: self.url.clone(),
            });
        }
        let body = self.json()?;
        match classify(self.status, &body) {
            Classification::Success => {
                tracing::debug!(url = %self.url, status = self.status, "INE response accepted");
                Ok(body)
            }
            Classification::HttpFailure(status) => Err(IneError::HttpStatus {
                status,
                url: self.url.clone(),
            }),
            Classification::SemanticFailure(errors) => {
                let err = IneError::semantic(errors);
                tracing::warn!(url = %self.url, "{err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rejected() -> Value {
        json!([{"Sucesso": {"Falso": [{"Msg": "Indicator code does not exist"}]}}])
    }

    #[test]
    fn http_error_wins_over_body() {
        assert_eq!(classify(404, &rejected()), Classification::HttpFailure(404));
        assert_eq!(classify(500, &json!([])), Classification::HttpFailure(500));
    }

    #[test]
    fn semantic_failure_on_200() {
        match classify(200, &rejected()) {
            Classification::SemanticFailure(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].message.as_deref(), Some("Indicator code does not exist"));
            }
            other => panic!("unexpected classification {other:?}"),
        }
    }

    #[test]
    fn success_variants() {
        assert_eq!(classify(200, &json!([{"Dados": {}}])), Classification::Success);
        assert_eq!(classify(200, &json!([{"Sucesso": {"Falso": []}}])), Classification::Success);
        assert_eq!(classify(200, &json!([{"Sucesso": {"Verdadeiro": []}}])), Classification::Success);
        assert_eq!(classify(200, &json!([])), Classification::Success);
        assert_eq!(classify(200, &json!({"Sucesso": {"Falso": [{}]}})), Classification::Success);
    }

    #[test]
    fn error_for_status_raises_semantic_error_with_message() {
        let resp = IneResponse::new(200, "https://example.test", rejected().to_string());
        assert!(resp.is_ine_error());
        let err = resp.error_for_status().unwrap_err();
        assert_eq!(err.to_string(), "INE returned an error. Error: Indicator code does not exist");
        assert_eq!(err.ine_errors().len(), 1);
    }

    #[test]
    fn error_for_status_ignores_body_on_http_error() {
        let resp = IneResponse::new(503, "https://example.test", "<html>maintenance</html>");
        assert!(matches!(
            resp.error_for_status(),
            Err(IneError::HttpStatus { status: 503, .. })
        ));
    }

    #[test]
    fn non_json_success_is_a_decode_error() {
        let resp = IneResponse::new(200, "https://example.test", "not json");
        assert!(!resp.is_ine_error());
        assert!(matches!(resp.error_for_status(), Err(IneError::Decode(_))));
    }
}
