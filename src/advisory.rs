use serde::Serialize;
use serde_json::{json, Value};

/// Sentinel pair returned whenever the image cannot be analyzed. The
/// advisory path is best-effort: every failure mode degrades to this
/// result instead of an error, so manual entry is never blocked.
pub const FAILED_TITLE: &str = "Analysis Failed";
pub const FAILED_DESCRIPTION: &str = "no words or letters detected";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Advisory {
    pub title: String,
    pub description: String,
}

impl Advisory {
    fn failed() -> Self {
        Self {
            title: FAILED_TITLE.into(),
            description: FAILED_DESCRIPTION.into(),
        }
    }

    fn manual_entry() -> Self {
        Self {
            title: "Manual Entry Required".into(),
            description: "API key missing. Please add title and description manually.".into(),
        }
    }
}

/// Client for an OpenRouter-style chat-completions endpoint that suggests
/// a title/description for an uploaded return-proof image.
#[derive(Clone)]
pub struct AdvisoryClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
}

const MODEL: &str = "deepseek/deepseek-r1:free";

const PROMPT: &str = "You are an AI assistant for a Return Service Management System. \
Analyze the attached image of a return proof. Identify the product (Title) and describe \
its condition/details (Description).\n\nOutput MUST be a raw JSON object with exactly two \
keys: 'title' and 'description'.\n\nIMPORTANT: If the image is blank, blurry, completely \
unclear, or contains no text/identifiable objects, you must output:\n\
{\"title\": \"Analysis Failed\", \"description\": \"no words or letters detected\"}\n\n\
Do not include markdown formatting like ```json in the final output.";

impl AdvisoryClient {
    pub fn new(api_key: Option<String>, api_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            api_url,
        }
    }

    pub async fn analyze(&self, image_base64: &str, mime_type: &str) -> Advisory {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("advisory: no API key configured, returning manual-entry result");
            return Advisory::manual_entry();
        };

        match self.request(api_key, image_base64, mime_type).await {
            Ok(advisory) => advisory,
            Err(e) => {
                tracing::warn!(error = %e, "advisory: analysis failed, returning sentinel");
                Advisory::failed()
            }
        }
    }

    async fn request(
        &self,
        api_key: &str,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<Advisory, reqwest::Error> {
        let body = json!({
            "model": MODEL,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": PROMPT },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:{mime_type};base64,{image_base64}") }
                    }
                ]
            }]
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let reply: Value = response.json().await?;
        let content = reply["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default();

        Ok(parse_advisory_reply(content))
    }
}

/// Extract the advisory JSON object from a raw model reply. Reasoning
/// models wrap their output in <think> blocks and markdown fences; both
/// are stripped before looking for the first {...} object.
pub fn parse_advisory_reply(content: &str) -> Advisory {
    let cleaned = strip_think_blocks(content)
        .replace("```json", "")
        .replace("```", "");
    let cleaned = cleaned.trim();

    let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) else {
        return Advisory::failed();
    };
    if start >= end {
        return Advisory::failed();
    }

    match serde_json::from_str::<Value>(&cleaned[start..=end]) {
        Ok(parsed) => {
            let title = parsed["title"].as_str();
            let description = parsed["description"].as_str();
            match (title, description) {
                (Some(title), Some(description)) => Advisory {
                    title: title.to_string(),
                    description: description.to_string(),
                },
                _ => Advisory::failed(),
            }
        }
        Err(_) => Advisory::failed(),
    }
}

fn strip_think_blocks(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(open) = rest.find("<think>") {
        out.push_str(&rest[..open]);
        match rest[open..].find("</think>") {
            Some(close) => rest = &rest[open + close + "</think>".len()..],
            None => return out, // unterminated block: drop the tail
        }
    }
    out.push_str(rest);
    out
}
