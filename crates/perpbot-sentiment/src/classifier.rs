//! Headline retrieval and LLM-based sentiment classification.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use perpbot_core::types::SentimentSignal;

/// Endpoints and credentials for the news pipeline.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub news_endpoint: String,
    pub news_api_key: String,
    pub keywords: Vec<String>,
    pub page_size: u32,
    pub classifier_endpoint: String,
    pub classifier_api_key: String,
    pub model: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            news_endpoint: "https://newsapi.org/v2/top-headlines".to_string(),
            news_api_key: String::new(),
            keywords: vec![
                "fomc".to_string(),
                "crypto".to_string(),
                "bitcoin".to_string(),
                "ethereum".to_string(),
            ],
            page_size: 10,
            classifier_endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            classifier_api_key: String::new(),
            model: "deepseek-chat".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("news api returned status {0}")]
    NewsApi(String),
    #[error("classifier returned no choices")]
    EmptyReply,
}

/// Fetches headlines and classifies them one at a time until one produces
/// a directional verdict.
#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    client: reqwest::Client,
    config: ClassifierConfig,
}

impl SentimentClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Pulls the latest headlines matching the configured keywords.
    pub async fn fetch_headlines(&self) -> Result<Vec<String>, ClassifierError> {
        let query = self.config.keywords.join(" OR ");
        let page_size = self.config.page_size.to_string();
        let response: NewsResponse = self
            .client
            .get(&self.config.news_endpoint)
            .query(&[
                ("q", query.as_str()),
                ("apiKey", self.config.news_api_key.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if response.status != "ok" {
            return Err(ClassifierError::NewsApi(response.status));
        }

        Ok(response
            .articles
            .into_iter()
            .map(|a| match a.description {
                Some(desc) => format!("{} {}", a.title, desc),
                None => a.title,
            })
            .collect())
    }

    /// Asks the LLM whether a single headline moves the market.
    pub async fn classify(&self, headline: &str) -> Result<SentimentSignal, ClassifierError> {
        let payload = json!({
            "model": self.config.model,
            "messages": [{
                "role": "user",
                "content": format!(
                    "Please check if this news affects crypto market in a strong way: \"{headline}\".\n\
                     If this news affects the crypto market in a very strong way then reply with 'bullish' or 'bearish'.\n\
                     Otherwise, reply with 'no signal'."
                ),
            }],
        });

        let response: ChatResponse = self
            .client
            .post(&self.config.classifier_endpoint)
            .bearer_auth(&self.config.classifier_api_key)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        let reply = response
            .choices
            .first()
            .ok_or(ClassifierError::EmptyReply)?
            .message
            .content
            .trim()
            .to_lowercase();

        Ok(match reply.as_str() {
            "bullish" => SentimentSignal::Bullish,
            "bearish" => SentimentSignal::Bearish,
            _ => SentimentSignal::None,
        })
    }

    /// Runs one full pass: fetch headlines, classify each until a
    /// directional verdict is found. Individual failures are logged and
    /// skipped so one bad headline cannot mask the rest.
    pub async fn current_verdict(&self) -> (SentimentSignal, Option<String>) {
        let headlines = match self.fetch_headlines().await {
            Ok(headlines) => headlines,
            Err(err) => {
                warn!(error = %err, "headline fetch failed");
                return (SentimentSignal::None, None);
            }
        };

        for headline in headlines {
            match self.classify(&headline).await {
                Ok(SentimentSignal::None) => {
                    debug!(%headline, "headline carries no signal");
                }
                Ok(signal) => return (signal, Some(headline)),
                Err(err) => {
                    warn!(error = %err, %headline, "classification failed");
                }
            }
        }

        (SentimentSignal::None, None)
    }
}
