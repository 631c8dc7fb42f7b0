//! Rule-based recognition of free-form workout text into entry drafts,
//! with an optional LLM upstream tried first. The rules are the
//! authoritative fallback: recognition always produces a result.

use std::sync::OnceLock;

use model::categories;
use model::entities::entry::EntryKind;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::AiConfig;
use crate::llm;

/// How the input text was produced. Voice and image inputs arrive here
/// already transcribed/described; recognition itself is text-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Voice,
    Image,
}

impl InputKind {
    fn label(self) -> &'static str {
        match self {
            Self::Text => "文本",
            Self::Voice => "语音转文字",
            Self::Image => "图片描述",
        }
    }
}

/// A recognized entry draft plus a confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Recognition {
    pub kind: EntryKind,
    /// Minutes of activity; 0 when none was found.
    pub amount: f64,
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// 0.0–1.0.
    pub confidence: f64,
}

/// Keyword table for workout categories; first hit wins.
const WORKOUT_KEYWORDS: &[(&str, &[&str])] = &[
    ("跑步", &["跑", "run"]),
    ("力量训练", &["力量", "撸铁", "举重", "哑铃", "杠铃", "深蹲", "卧推", "健身房"]),
    ("游泳", &["游泳", "泳", "swim"]),
    ("瑜伽", &["瑜伽", "yoga"]),
    ("骑行", &["骑", "单车", "自行车", "bike", "cycling"]),
    ("篮球", &["篮球", "basketball"]),
    ("足球", &["足球", "soccer"]),
    ("羽毛球", &["羽毛球", "badminton"]),
    ("登山", &["登山", "爬山", "徒步", "hike"]),
];

/// Keyword table for body-area tags.
const BODY_AREA_KEYWORDS: &[(&str, &[&str])] = &[
    ("全身", &["全身"]),
    ("上肢", &["上肢", "手臂", "肩", "胸", "背"]),
    ("下肢", &["下肢", "腿", "臀"]),
    ("核心", &["核心", "腹", "平板支撑"]),
    ("有氧", &["有氧", "心肺"]),
    ("拉伸", &["拉伸", "放松"]),
];

const MAX_DESCRIPTION_CHARS: usize = 20;

fn amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+(?:\.\d+)?)\s*(?:分钟|分|小时|min(?:ute)?s?)?")
            .expect("amount pattern is valid")
    })
}

fn json_blob_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("json pattern is valid"))
}

fn match_category(
    text: &str,
    table: &[(&'static str, &[&'static str])],
) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(name, _)| *name)
}

/// Local rule engine: extract minutes, pick a vocabulary and category by
/// keyword, derive a description. Never fails.
pub fn recognize_rules(input: &str) -> Recognition {
    let text = input.trim().to_lowercase();

    let amount = amount_regex()
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(0.0);

    // A workout match wins; body-area tags only apply when no workout
    // category is mentioned.
    let (kind, category) = if let Some(category) = match_category(&text, WORKOUT_KEYWORDS) {
        (EntryKind::Expense, category)
    } else if let Some(category) = match_category(&text, BODY_AREA_KEYWORDS) {
        (EntryKind::Income, category)
    } else {
        (EntryKind::Expense, categories::FALLBACK_CATEGORY)
    };

    let mut description = amount_regex().replace_all(&text, "").trim().to_string();
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        description = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
    }
    if description.is_empty() {
        description = category.to_string();
    }

    Recognition {
        kind,
        amount,
        category: category.to_string(),
        description,
        date: None,
        confidence: if amount > 0.0 { 0.7 } else { 0.3 },
    }
}

/// Recognize with the configured upstream first, falling back to the
/// local rules on any failure.
pub async fn recognize(
    http: &Client,
    ai: &AiConfig,
    input: &str,
    input_kind: InputKind,
) -> Recognition {
    if let Some(answer) = llm::call_chat(http, ai, &prompt(input, input_kind), 0.3).await {
        if let Some(parsed) = parse_upstream(&answer) {
            return parsed;
        }
    }
    recognize_rules(input)
}

fn prompt(input: &str, input_kind: InputKind) -> String {
    let workouts: Vec<&str> = categories::WORKOUT_CATEGORIES.iter().map(|c| c.name).collect();
    let body_areas: Vec<&str> =
        categories::BODY_AREA_CATEGORIES.iter().map(|c| c.name).collect();
    format!(
        "你是健身记录助手。根据用户的{}输入识别运动记录，只返回JSON：\
         {{\"type\":\"expense 或 income\",\"amount\":分钟数,\"category\":\"类别\",\
         \"description\":\"描述\",\"confidence\":0到1}}。\
         运动类别：{}。身体部位（income）：{}。用户输入：{}",
        input_kind.label(),
        workouts.join("、"),
        body_areas.join("、"),
        input
    )
}

/// Extract and normalize the upstream's JSON answer. Anything malformed
/// returns `None` and the rules take over.
fn parse_upstream(answer: &str) -> Option<Recognition> {
    let blob = json_blob_regex().find(answer)?.as_str();
    let value: serde_json::Value = serde_json::from_str(blob).ok()?;

    let kind = match value["type"].as_str() {
        Some("income") => EntryKind::Income,
        _ => EntryKind::Expense,
    };
    let amount = match &value["amount"] {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    let amount = if amount.is_finite() { amount.abs() } else { 0.0 };
    let category = value["category"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(categories::FALLBACK_CATEGORY)
        .to_string();
    let description = value["description"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(&category)
        .to_string();
    let confidence = value["confidence"].as_f64().unwrap_or(0.5).clamp(0.0, 1.0);

    Some(Recognition {
        kind,
        amount,
        category,
        description,
        date: value["date"].as_str().map(str::to_string),
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_running_with_minutes() {
        let result = recognize_rules("今天跑步30分钟");
        assert_eq!(result.kind, EntryKind::Expense);
        assert_eq!(result.category, "跑步");
        assert_eq!(result.amount, 30.0);
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn recognizes_fractional_minutes() {
        let result = recognize_rules("游泳 42.5 分钟");
        assert_eq!(result.category, "游泳");
        assert_eq!(result.amount, 42.5);
    }

    #[test]
    fn body_area_tags_map_to_income() {
        let result = recognize_rules("核心训练20分钟");
        // "核心" matches no workout keyword, so the body-area table wins.
        assert_eq!(result.kind, EntryKind::Income);
        assert_eq!(result.category, "核心");
        assert_eq!(result.amount, 20.0);
    }

    #[test]
    fn workout_keyword_beats_body_area() {
        let result = recognize_rules("背部力量训练45分钟");
        assert_eq!(result.kind, EntryKind::Expense);
        assert_eq!(result.category, "力量训练");
    }

    #[test]
    fn unknown_text_falls_back_with_low_confidence() {
        let result = recognize_rules("下棋");
        assert_eq!(result.kind, EntryKind::Expense);
        assert_eq!(result.category, "其他");
        assert_eq!(result.amount, 0.0);
        assert_eq!(result.confidence, 0.3);
    }

    #[test]
    fn description_defaults_to_category_when_stripped_empty() {
        let result = recognize_rules("30分钟");
        assert_eq!(result.description, result.category);
    }

    #[test]
    fn parses_and_normalizes_upstream_answer() {
        let answer = r#"好的：{"type":"expense","amount":"45","category":"骑行","description":"晚间骑行","confidence":1.4}"#;
        let parsed = parse_upstream(answer).unwrap();
        assert_eq!(parsed.kind, EntryKind::Expense);
        assert_eq!(parsed.amount, 45.0);
        assert_eq!(parsed.category, "骑行");
        // Confidence clamps into [0, 1].
        assert_eq!(parsed.confidence, 1.0);
    }

    #[test]
    fn malformed_upstream_answer_is_rejected() {
        assert!(parse_upstream("no json here").is_none());
        assert!(parse_upstream("{not valid json").is_none());
    }

    #[test]
    fn negative_upstream_amount_is_folded_positive() {
        let answer = r#"{"type":"expense","amount":-30,"category":"跑步","description":"","confidence":0.9}"#;
        let parsed = parse_upstream(answer).unwrap();
        assert_eq!(parsed.amount, 30.0);
        assert_eq!(parsed.description, "跑步");
    }
}
