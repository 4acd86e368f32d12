use async_trait::async_trait;
use careline_application::{
    SignatureClient, SignatureData, SignatureRequestParams, SignatureRequestResult,
};
use careline_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::json;

/// Eversign HTTP e-signature adapter.
pub struct EversignSignatureClient {
    http: reqwest::Client,
    base_url: String,
    access_key: String,
}

impl EversignSignatureClient {
    /// Creates a client for the given API base URL and access key.
    #[must_use]
    pub fn new(base_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            access_key: access_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EversignResponse {
    document_hash: Option<String>,
    error: Option<EversignError>,
}

#[derive(Debug, Deserialize)]
struct EversignError {
    #[serde(rename = "type")]
    error_type: String,
}

#[async_trait]
impl SignatureClient for EversignSignatureClient {
    async fn generate_signature_request(
        &self,
        params: &SignatureRequestParams,
    ) -> AppResult<SignatureRequestResult> {
        let url = format!(
            "{}/document?access_key={}",
            self.base_url.trim_end_matches('/'),
            self.access_key
        );
        let signers: Vec<serde_json::Value> = params
            .signers
            .iter()
            .enumerate()
            .map(|(index, signer)| {
                json!({
                    "id": index + 1,
                    "name": signer.name,
                    "email": signer.email,
                })
            })
            .collect();
        let body = json!({
            "use_template": 1,
            "template_id": params.template_id,
            "title": params.title,
            "signers": signers,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                AppError::Dependency(format!("signature provider unreachable: {error}"))
            })?;
        let payload: EversignResponse = response.json().await.map_err(|error| {
            AppError::Dependency(format!("malformed signature provider response: {error}"))
        })?;

        if let Some(error) = payload.error {
            return Ok(SignatureRequestResult {
                data: SignatureData::Error {
                    error_type: error.error_type,
                },
            });
        }
        match payload.document_hash {
            Some(document_hash) => Ok(SignatureRequestResult {
                data: SignatureData::Document { document_hash },
            }),
            None => Err(AppError::Dependency(
                "signature provider returned neither a document nor an error".to_owned(),
            )),
        }
    }
}
