//! Thin client for the optional OpenAI-compatible chat upstream shared
//! by recognition and coaching. Any failure — missing credentials,
//! transport error, non-2xx, unexpected shape — comes back as `None` and
//! the caller falls back to its local rules.

use reqwest::Client;
use tracing::debug;

use crate::config::AiConfig;

pub async fn call_chat(
    http: &Client,
    ai: &AiConfig,
    prompt: &str,
    temperature: f64,
) -> Option<String> {
    let (url, key) = match (&ai.api_url, &ai.api_key) {
        (Some(url), Some(key)) => (url, key),
        _ => return None,
    };

    let body = serde_json::json!({
        "model": ai.model,
        "messages": [{"role": "user", "content": prompt}],
        "temperature": temperature,
        "max_tokens": 500,
    });

    let response = match http
        .post(url)
        .bearer_auth(key)
        .header("apikey", key)
        .json(&body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            debug!(%err, "AI upstream unreachable, falling back to rules");
            return None;
        }
    };

    if !response.status().is_success() {
        debug!(status = %response.status(), "AI upstream refused, falling back to rules");
        return None;
    }

    let value: serde_json::Value = response.json().await.ok()?;
    value["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
}
