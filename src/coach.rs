//! Coaching advice: rule-based texts keyed by advice type and time of
//! day, optionally replaced by an LLM upstream. Answers are cached per
//! (type, time bucket) so repeated taps don't re-hit the upstream.

use chrono::{DateTime, Timelike, Utc};
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::AiConfig;
use crate::llm;

/// What the user asked advice about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdviceType {
    Workout,
    Rest,
    Diet,
    All,
}

impl AdviceType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Workout => "workout",
            Self::Rest => "rest",
            Self::Diet => "diet",
            Self::All => "all",
        }
    }
}

/// Coarse time-of-day bucket driving the rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Afternoon,
    Evening,
}

impl DayPart {
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            Self::Morning
        } else if hour < 18 {
            Self::Afternoon
        } else {
            Self::Evening
        }
    }

    pub fn from_time(time: Option<DateTime<Utc>>) -> Self {
        Self::from_hour(time.unwrap_or_else(Utc::now).hour())
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Morning => "上午",
            Self::Afternoon => "下午",
            Self::Evening => "晚上",
        }
    }
}

/// A recent workout line given to the upstream as context.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentWorkout {
    pub category: String,
    /// Minutes.
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

const WORKOUT_ADVICE: [&str; 3] = [
    "早晨是锻炼的黄金时间，建议30-45分钟有氧运动（慢跑、骑行），运动前先做5分钟动态拉伸热身。",
    "下午肌肉温度最高，适合力量训练：40-60分钟抗阻训练，重点大肌群，组间休息60-90秒。",
    "晚间适合中低强度运动，如瑜伽或轻松散步20-30分钟，避免剧烈运动影响睡眠。",
];

const REST_ADVICE: [&str; 3] = [
    "确保昨晚睡眠7-8小时，起床后做5分钟轻柔拉伸，喝一杯温水唤醒身体。",
    "午后可小憩15-20分钟恢复精力，每小时起身活动5分钟防止久坐疲劳。",
    "睡前1小时远离电子设备，可进行10分钟泡沫轴放松或热水泡脚帮助肌肉恢复。",
];

const DIET_ADVICE: [&str; 3] = [
    "早餐在起床后1小时内进食：燕麦、鸡蛋、牛奶加水果，提供优质蛋白和复合碳水。",
    "午餐是一天能量的主要来源：糙米饭配鸡胸肉或鱼加蔬菜，蛋白质三成、碳水五成。",
    "晚餐宜清淡，睡前3小时吃完：少量主食、豆制品和大量蔬菜，避免高脂肪食物。",
];

fn bucket_index(part: DayPart) -> usize {
    match part {
        DayPart::Morning => 0,
        DayPart::Afternoon => 1,
        DayPart::Evening => 2,
    }
}

/// Local rule advice. `All` composes the three sections.
pub fn advice_rules(advice: AdviceType, part: DayPart) -> String {
    let i = bucket_index(part);
    match advice {
        AdviceType::Workout => WORKOUT_ADVICE[i].to_string(),
        AdviceType::Rest => REST_ADVICE[i].to_string(),
        AdviceType::Diet => DIET_ADVICE[i].to_string(),
        AdviceType::All => format!(
            "今日综合建议：\n\n训练：{}\n\n休息：{}\n\n饮食：{}",
            WORKOUT_ADVICE[i], REST_ADVICE[i], DIET_ADVICE[i]
        ),
    }
}

fn prompt(advice: AdviceType, part: DayPart, recent: &[RecentWorkout]) -> String {
    let history = if recent.is_empty() {
        "暂无最近训练记录".to_string()
    } else {
        recent
            .iter()
            .take(5)
            .map(|w| {
                let label = w.description.as_deref().unwrap_or(&w.category);
                format!("- {}: {}分钟", label, w.amount)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "你是专业健身教练。当前时间：{}。最近训练：\n{}\n请提供简洁实用的{}建议，不超过200字。",
        part.label(),
        history,
        match advice {
            AdviceType::Workout => "训练",
            AdviceType::Rest => "休息恢复",
            AdviceType::Diet => "饮食",
            AdviceType::All => "综合健身",
        }
    )
}

/// Advice with upstream-then-rules fallback and per-bucket caching.
pub async fn advise(
    http: &Client,
    ai: &AiConfig,
    cache: &Cache<String, String>,
    advice: AdviceType,
    part: DayPart,
    recent: &[RecentWorkout],
) -> String {
    let key = format!("{}:{}", advice.as_str(), part.as_str());
    if let Some(cached) = cache.get(&key).await {
        return cached;
    }

    let text = match llm::call_chat(http, ai, &prompt(advice, part, recent), 0.7).await {
        Some(answer) if !answer.trim().is_empty() => answer,
        _ => advice_rules(advice, part),
    };
    cache.insert(key, text.clone()).await;
    text
}
