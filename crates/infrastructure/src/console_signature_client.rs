use async_trait::async_trait;
use careline_application::{
    SignatureClient, SignatureData, SignatureRequestParams, SignatureRequestResult,
};
use careline_core::AppResult;
use sha2::{Digest, Sha256};
use tracing::info;

/// Console e-signature adapter.
///
/// Fabricates a deterministic document hash from the request parameters so
/// the whole signature flow is exercisable without provider credentials.
#[derive(Debug, Default)]
pub struct ConsoleSignatureClient;

impl ConsoleSignatureClient {
    /// Creates the console adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignatureClient for ConsoleSignatureClient {
    async fn generate_signature_request(
        &self,
        params: &SignatureRequestParams,
    ) -> AppResult<SignatureRequestResult> {
        let mut hasher = Sha256::new();
        hasher.update(params.title.as_bytes());
        hasher.update(params.template_id.as_bytes());
        for signer in &params.signers {
            hasher.update(signer.name.as_bytes());
            hasher.update(signer.email.as_bytes());
        }
        let document_hash = hex_digest(&hasher.finalize());

        info!(
            title = %params.title,
            signers = params.signers.len(),
            %document_hash,
            "console signature request"
        );

        Ok(SignatureRequestResult {
            data: SignatureData::Document { document_hash },
        })
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use careline_application::SignatureSigner;

    use super::*;

    #[tokio::test]
    async fn same_request_yields_the_same_hash() {
        let client = ConsoleSignatureClient::new();
        let params = SignatureRequestParams {
            title: "Employment contract".to_owned(),
            template_id: "template-1".to_owned(),
            signers: vec![SignatureSigner {
                name: "Amelie Durand".to_owned(),
                email: "amelie@example.com".to_owned(),
            }],
        };

        let first = client.generate_signature_request(&params).await.ok();
        let second = client.generate_signature_request(&params).await.ok();
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
