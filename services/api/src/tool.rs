use credit_risk::scoring::{DecisionResult, LoanSubmission};
use serde::Serialize;
use tracing::{debug, warn};

/// What an agent gets back from the credit risk tool.
///
/// Serializes as the plain assessment or as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum ToolOutcome {
    Assessment(DecisionResult),
    Failure { error: String },
}

impl ToolOutcome {
    fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        warn!(%error, "credit risk tool call failed");
        Self::Failure { error }
    }
}

/// HTTP client for the `/predict` endpoint of a running API.
#[derive(Debug, Clone)]
pub(crate) struct RiskToolClient {
    http: reqwest::Client,
    base_url: String,
}

impl RiskToolClient {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Score one application remotely. Every fault becomes
    /// [`ToolOutcome::Failure`].
    pub(crate) async fn calculate_credit_risk(&self, submission: LoanSubmission) -> ToolOutcome {
        let url = format!("{}/predict", self.base_url);
        let payload = submission.normalized();
        debug!(%url, ?payload, "calling credit risk API");

        let response = match self.http.post(&url).json(&payload).send().await {
            Ok(response) => response,
            Err(err) if err.is_connect() => {
                return ToolOutcome::failure(format!(
                    "Cannot connect to API. Make sure the credit risk server is running on {}",
                    self.base_url
                ))
            }
            Err(err) => return ToolOutcome::failure(err.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return ToolOutcome::failure(format!(
                "API returned status {}: {}",
                status.as_u16(),
                body
            ));
        }

        match response.json::<DecisionResult>().await {
            Ok(result) => ToolOutcome::Assessment(result),
            Err(err) => ToolOutcome::failure(err.to_string()),
        }
    }
}
