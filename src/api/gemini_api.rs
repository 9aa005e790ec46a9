use crate::error::{AdvisorError, GeminiError};
use crate::types::aistudio::{GenerateContentRequest, GeminiResponse};
use tracing::{debug, error};
use url::Url;

pub struct GeminiApi;

impl GeminiApi {
    /// Single `generateContent` call. No retry: the caller owns the fallback.
    pub async fn generate_content(
        client: &reqwest::Client,
        base_url: &Url,
        model: &str,
        api_key: &str,
        body: &GenerateContentRequest,
    ) -> Result<GeminiResponse, AdvisorError> {
        let url = generate_url(base_url, model)?;
        debug!(%url, "calling Gemini generateContent");

        let resp = client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let bytes = resp.bytes().await?;
            error!("Gemini generateContent failed with status {}", status);
            return Err(match serde_json::from_slice::<GeminiError>(&bytes) {
                Ok(gemini_err) => AdvisorError::GeminiServerError(gemini_err),
                Err(_) => AdvisorError::UpstreamStatus(status),
            });
        }

        Ok(resp.json::<GeminiResponse>().await?)
    }
}

fn generate_url(base_url: &Url, model: &str) -> Result<Url, url::ParseError> {
    base_url.join(&format!("v1beta/models/{model}:generateContent"))
}
