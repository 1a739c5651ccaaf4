// src/ai.rs
use crate::config::AiConfig;
use crate::places::Review;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, warn};

const HUMAN_PROMPT: &str = "\n\nHuman:";
const AI_PROMPT: &str = "\n\nAssistant:";

const MISSING_KEY_DISH: &str = "[Missing Anthropic Key]";
const MISSING_KEY_INTRO: &str = "[Missing Anthropic Key for Intro]";
const AI_ERROR: &str = "[AI Error]";

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    completion: String,
}

/// Text-completion helper for the two generated fields (popular dish and
/// email intro). Both methods degrade to placeholder strings rather than
/// failing the enrichment run.
pub struct AiHelper {
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    max_retries: u32,
    client: Client,
}

impl AiHelper {
    pub fn new(config: &AiConfig, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("ANTHROPIC_API_KEY not set - generated fields will be placeholders");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            client,
        }
    }

    /// Name the single most-mentioned dish or drink across the reviews.
    pub async fn find_popular_dish(&self, venue_name: &str, reviews: &[Review]) -> String {
        let api_key = match self.api_key.as_deref() {
            Some(key) => key,
            None => return MISSING_KEY_DISH.to_string(),
        };

        let context = review_context(reviews);
        let prompt = format!(
            "{}\nIdentify a single dish or drink that seems most popular or most-mentioned \
             across the following reviews. Return ONLY the name of that dish/drink (one line) \
             with no extra words or commentary.\n\nRestaurant name: {}\n\nReviews:\n{}\n\n{}",
            HUMAN_PROMPT, venue_name, context, AI_PROMPT
        );

        match self.complete(&prompt, api_key).await {
            Ok(completion) => completion.trim().to_string(),
            Err(e) => {
                error!("Error calling completion API: {}", e);
                AI_ERROR.to_string()
            }
        }
    }

    /// Compose a short personal-sounding email intro that mentions the
    /// popular dish. Wrapping quotation marks from the model are removed.
    pub async fn generate_intro(
        &self,
        venue_name: &str,
        reviews: &[Review],
        popular_dish: &str,
    ) -> String {
        let api_key = match self.api_key.as_deref() {
            Some(key) => key,
            None => return MISSING_KEY_INTRO.to_string(),
        };

        let context = review_context(reviews);
        let prompt = format!(
            "{}\nYou are given the following details:\n- Bar/Restaurant name: {}\n\
             - A popular dish/drink: {}\n - Up to 5 recent reviews describing the vibe, \
             ambiance, and service:\n{}\n\nTask:\nCompose a short, personal-sounding email \
             intro (one or two sentences) that describes an experience you had with your \
             friends. Mention that you ordered the above dish/drink and highlight details \
             such as a cozy, welcoming ambiance or excellent service. DO NOT mention any \
             significant others (like a spouse) or romantic events. Ensure the final text \
             is not wrapped in quotation marks.\n\nReturn only the email intro text with no \
             additional commentary.\n{}",
            HUMAN_PROMPT, venue_name, popular_dish, context, AI_PROMPT
        );

        match self.complete(&prompt, api_key).await {
            Ok(completion) => strip_wrapping_quotes(&completion).to_string(),
            Err(e) => {
                error!("Error calling completion API for intro: {}", e);
                AI_ERROR.to_string()
            }
        }
    }

    /// One completion call with retries. Server-side errors and transport
    /// failures back off (exponential plus jitter) and try again; anything
    /// else fails fast.
    async fn complete(
        &self,
        prompt: &str,
        api_key: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/v1/complete", self.base_url);
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "max_tokens_to_sample": self.max_tokens,
        });

        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let result = self
                .client
                .post(&url)
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01")
                .json(&payload)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let data: CompletionResponse = response.json().await?;
                        return Ok(data.completion);
                    }
                    if !status.is_server_error() {
                        let error_text = response.text().await?;
                        return Err(format!("completion API error {}: {}", status, error_text).into());
                    }
                    warn!(
                        "Completion API returned {} (attempt {}/{})",
                        status, attempt, self.max_retries
                    );
                }
                Err(e) => {
                    warn!(
                        "Completion request failed: {} (attempt {}/{})",
                        e, attempt, self.max_retries
                    );
                }
            }

            if attempt >= self.max_retries {
                return Err("completion API unavailable after retries".into());
            }

            let backoff =
                Duration::from_millis(1000 * 2u64.pow(attempt - 1) + fastrand::u64(0..=500));
            debug!("Backing off {:?} before retry", backoff);
            tokio::time::sleep(backoff).await;
        }
    }
}

/// Up to five review texts, blank-line separated, for prompt context.
fn review_context(reviews: &[Review]) -> String {
    reviews
        .iter()
        .take(5)
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

fn strip_wrapping_quotes(s: &str) -> &str {
    let trimmed = s.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn review(text: &str) -> Review {
        Review {
            author_name: "r".to_string(),
            text: text.to_string(),
            rating: Some(5.0),
        }
    }

    fn test_config(base_url: String, max_retries: u32) -> AiConfig {
        AiConfig {
            base_url,
            max_retries,
            ..AiConfig::default()
        }
    }

    #[tokio::test]
    async fn missing_key_yields_dish_placeholder() {
        let helper = AiHelper::new(&AiConfig::default(), None);
        let dish = helper.find_popular_dish("Cafe X", &[review("great pie")]).await;
        assert_eq!(dish, "[Missing Anthropic Key]");
    }

    #[tokio::test]
    async fn missing_key_yields_intro_placeholder() {
        let helper = AiHelper::new(&AiConfig::default(), None);
        let intro = helper.generate_intro("Cafe X", &[], "pie").await;
        assert_eq!(intro, "[Missing Anthropic Key for Intro]");
    }

    #[test]
    fn review_context_takes_at_most_five() {
        let reviews: Vec<Review> = (0..7).map(|i| review(&format!("review {}", i))).collect();
        let context = review_context(&reviews);
        assert!(context.contains("review 4"));
        assert!(!context.contains("review 5"));
        assert_eq!(context.matches("\n\n").count(), 4);
    }

    #[test]
    fn wrapping_quotes_are_stripped() {
        assert_eq!(strip_wrapping_quotes("\" We loved it. \""), "We loved it.");
        assert_eq!(strip_wrapping_quotes("We loved it."), "We loved it.");
        assert_eq!(strip_wrapping_quotes("\"unbalanced"), "\"unbalanced");
    }

    #[tokio::test]
    async fn retries_after_a_server_error_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/complete"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/complete"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"completion": " Key lime pie "})),
            )
            .mount(&server)
            .await;

        let helper = AiHelper::new(&test_config(server.uri(), 3), Some("key".to_string()));
        let dish = helper
            .find_popular_dish("Cafe X", &[review("the key lime pie!")])
            .await;
        assert_eq!(dish, "Key lime pie");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        let body = String::from_utf8_lossy(&requests[1].body);
        assert!(body.contains("Cafe X"));
        assert!(body.contains("claude-2"));
    }

    #[tokio::test]
    async fn client_errors_fail_fast_to_the_error_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let helper = AiHelper::new(&test_config(server.uri(), 3), Some("key".to_string()));
        let dish = helper.find_popular_dish("Cafe X", &[]).await;
        assert_eq!(dish, "[AI Error]");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_exhausting_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let helper = AiHelper::new(&test_config(server.uri(), 2), Some("key".to_string()));
        let intro = helper.generate_intro("Cafe X", &[], "pie").await;
        assert_eq!(intro, "[AI Error]");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }
}
