use log::{debug, info};
use reqwest::Client;
use serde_json::Value;

use crate::{config::ProviderConfig, error::PipelineError, exchange_rate::CurrencyCode};

/// Field of the provider body that holds the conversion table.
pub const RATES_FIELD: &str = "conversion_rates";

const MAX_ERROR_BODY: usize = 512;

/// Anything that can hand back one decoded "latest rates" body for a base currency.
pub trait RateSource {
    fn fetch_latest(
        &self,
        base: &CurrencyCode,
    ) -> impl Future<Output = Result<Value, PipelineError>>;
}

pub struct HttpRateSource {
    client: Client,
    provider: ProviderConfig,
}

impl HttpRateSource {
    pub fn new(provider: ProviderConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(provider.timeout)
            .build()
            .map_err(|e| PipelineError::Transport(e.without_url()))?;
        Ok(Self::with_client(client, provider))
    }

    pub fn with_client(client: Client, provider: ProviderConfig) -> Self {
        Self { client, provider }
    }
}

impl RateSource for HttpRateSource {
    async fn fetch_latest(&self, base: &CurrencyCode) -> Result<Value, PipelineError> {
        info!("Fetching latest {} rates from {}", base, self.provider.host());

        let resp = self
            .client
            .get(self.provider.latest_url(base))
            .send()
            .await
            .map_err(|e| PipelineError::Transport(e.without_url()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| PipelineError::Transport(e.without_url()))?;

        if !status.is_success() {
            return Err(PipelineError::Fetch {
                status,
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        debug!("Provider answered {} with {} bytes", status, text.len());
        decode_payload(&text, base)
    }
}

/// Decodes a successful provider body and checks it carries a conversion table
/// for the requested base.
pub fn decode_payload(text: &str, base: &CurrencyCode) -> Result<Value, PipelineError> {
    let payload: Value = serde_json::from_str(text)
        .map_err(|e| PipelineError::malformed("fetch", format!("body is not JSON: {e}")))?;

    if !payload.is_object() {
        return Err(PipelineError::malformed("fetch", "body is not a JSON object"));
    }

    if payload.get(RATES_FIELD).is_none() {
        let reason = match (
            text_field(&payload, "result")?,
            text_field(&payload, "error-type")?,
        ) {
            (Some("error"), Some(kind)) => format!("provider reported error {kind:?}"),
            _ => format!("missing {RATES_FIELD:?} field"),
        };
        return Err(PipelineError::malformed("fetch", reason));
    }

    if let Some(code) = text_field(&payload, "base_code")? {
        if !code.eq_ignore_ascii_case(base.as_str()) {
            return Err(PipelineError::malformed(
                "fetch",
                format!("asked for {base} rates, got {code}"),
            ));
        }
    }

    if let Some(updated) = text_field(&payload, "time_last_update_utc")? {
        info!("Provider rates last updated {}", updated);
    }

    Ok(payload)
}

/// Optional string field of the provider envelope. Present with any other
/// JSON type is malformed.
fn text_field<'a>(payload: &'a Value, name: &str) -> Result<Option<&'a str>, PipelineError> {
    match payload.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(PipelineError::malformed(
            "fetch",
            format!("{name:?} should be a string, got {other}"),
        )),
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
