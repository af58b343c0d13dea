use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One decoded keystroke: time spent reaching the key, time holding it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeystrokeSample {
    pub seek_time: i64,
    pub press_time: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalStats {
    pub avg: i64,
    pub min: i64,
    pub max: i64,
    pub range: i64,
    pub std_dev: i64,
}

/// Decoded timing pattern for a single input field. Stats cover only
/// the positive-valued samples; the raw keystroke list keeps everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPattern {
    pub keystroke_count: usize,
    pub seek: IntervalStats,
    pub press: IntervalStats,
    pub long_pauses: usize,
    pub seek_samples: Vec<i64>,
    pub press_samples: Vec<i64>,
    pub keystrokes: Vec<KeystrokeSample>,
}

/// Higher-order shape of a numeric sample. `skewness`/`kurtosis` are
/// absent for uniform samples (std of exactly 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub valid: bool,
    pub is_uniform: bool,
    pub mean: f64,
    pub std_dev: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skewness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kurtosis: Option<f64>,
    pub round_number_ratio: f64,
    pub longest_similar_run: usize,
    pub range: f64,
    pub cv: f64,
}

impl DistributionSummary {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            is_uniform: false,
            mean: 0.0,
            std_dev: 0.0,
            skewness: None,
            kurtosis: None,
            round_number_ratio: 0.0,
            longest_similar_run: 0,
            range: 0.0,
            cv: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectorySummary {
    pub valid: bool,
    pub points: usize,
    pub distance: i64,
    pub smooth_ratio: f64,
    pub correction_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intervals: Option<DistributionSummary>,
}

impl TrajectorySummary {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            points: 0,
            distance: 0,
            smooth_ratio: 0.0,
            correction_ratio: 0.0,
            intervals: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagTag {
    Bot,
    Human,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flag {
    pub tag: FlagTag,
    pub weight: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Scores {
    pub bot: f64,
    pub human: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<FieldPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<FieldPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username_intervals: Option<DistributionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_intervals: Option<DistributionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<TrajectorySummary>,
    pub flags: Vec<Flag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub is_bot: bool,
    pub confidence: u8,
    pub reasons: Vec<String>,
    pub scores: Scores,
    pub details: AnalysisDetails,
}

impl AnalysisResult {
    /// Degraded result for an empty or unusable request. Scoring must
    /// never block a login path outright, so this is not an error.
    pub fn empty() -> Self {
        Self {
            is_bot: false,
            confidence: 0,
            reasons: Vec::new(),
            scores: Scores::default(),
            details: AnalysisDetails::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub analyzed_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypingPattern {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrajectoryCapture {
    #[serde(default)]
    pub sample: Vec<TrajectoryPoint>,
    #[serde(default)]
    pub captured: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationFlags {
    #[serde(default)]
    pub has_chromium_automation: bool,
    #[serde(default)]
    pub has_selenium: bool,
    #[serde(default)]
    pub has_phantom: bool,
    #[serde(default)]
    pub headless_chrome: bool,
    #[serde(default)]
    pub no_plugins: bool,
    #[serde(default)]
    pub zero_window_size: bool,
}

/// Raw client-captured login telemetry. Every field is optional on the
/// wire; absent fields read as zero/absent, never as an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginTelemetry {
    #[serde(default)]
    pub typing_pattern: TypingPattern,
    #[serde(default)]
    pub trajectory: Option<TrajectoryCapture>,
    #[serde(default)]
    pub username_to_password_ms: Option<i64>,
    #[serde(default)]
    pub password_to_login_ms: Option<i64>,
    #[serde(default)]
    pub paste_user: u32,
    #[serde(default)]
    pub paste_pass: u32,
    #[serde(default)]
    pub ime_user: Option<u32>,
    #[serde(default, rename = "usernameIMECompositionCount")]
    pub username_ime_composition_count: Option<u32>,
    #[serde(default)]
    pub ime_pass: Option<u32>,
    #[serde(default, rename = "passwordIMECompositionCount")]
    pub password_ime_composition_count: Option<u32>,
    #[serde(default)]
    pub shift_count: Option<u32>,
    #[serde(default)]
    pub password_shift_count: Option<u32>,
    #[serde(default)]
    pub caps_lock_count: Option<u32>,
    #[serde(default)]
    pub password_caps_lock_count: Option<u32>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub webdriver_detected: bool,
    #[serde(default)]
    pub automation_flags: AutomationFlags,
    #[serde(default)]
    pub untrusted_events: u32,
    #[serde(default)]
    pub synthetic_key_events: u32,
    #[serde(default)]
    pub total_key_events: u32,
}

impl LoginTelemetry {
    // The capture script has shipped two generations of field names for
    // the same counters. First-available wins.
    pub fn shift_usage(&self) -> u32 {
        self.shift_count.or(self.password_shift_count).unwrap_or(0)
    }

    pub fn caps_lock_usage(&self) -> u32 {
        self.caps_lock_count
            .or(self.password_caps_lock_count)
            .unwrap_or(0)
    }

    /// Composition events summed across both fields.
    pub fn ime_compositions(&self) -> u32 {
        let user = self
            .ime_user
            .or(self.username_ime_composition_count)
            .unwrap_or(0);
        let pass = self
            .ime_pass
            .or(self.password_ime_composition_count)
            .unwrap_or(0);
        user + pass
    }
}
