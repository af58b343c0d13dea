use serde::{Deserialize, Serialize};

/// Static per-process detector constants. Loaded once from config at
/// startup and never mutated; every detector reads it by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdTable {
    #[serde(default)]
    pub seek_time: SeekThresholds,
    #[serde(default)]
    pub press_time: PressThresholds,
    #[serde(default)]
    pub trajectory: TrajectoryThresholds,
    #[serde(default)]
    pub timing: TimingThresholds,
    #[serde(default)]
    pub anti_bot: AntiBotThresholds,
    #[serde(default)]
    pub decision: DecisionPolicy,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            seek_time: SeekThresholds::default(),
            press_time: PressThresholds::default(),
            trajectory: TrajectoryThresholds::default(),
            timing: TimingThresholds::default(),
            anti_bot: AntiBotThresholds::default(),
            decision: DecisionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeekThresholds {
    #[serde(default = "default_seek_too_fast")]
    pub too_fast: i64,
    #[serde(default = "default_seek_bot_max")]
    pub bot_max: i64,
    #[serde(default = "default_seek_human_min")]
    pub human_min: i64,
    #[serde(default = "default_seek_uniform_std_max")]
    pub uniform_std_max: i64,
    #[serde(default = "default_seek_range_min")]
    pub range_min: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressThresholds {
    #[serde(default = "default_press_bot_max")]
    pub bot_max: i64,
    #[serde(default = "default_press_human_min")]
    pub human_min: i64,
    #[serde(default = "default_press_uniform_std_max")]
    pub uniform_std_max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryThresholds {
    #[serde(default = "default_trajectory_min_points")]
    pub min_points: usize,
    #[serde(default = "default_trajectory_min_distance")]
    pub min_distance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingThresholds {
    #[serde(default = "default_user_to_pass_min")]
    pub user_to_pass_min: i64,
    #[serde(default = "default_pass_to_login_min")]
    pub pass_to_login_min: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntiBotThresholds {
    #[serde(default = "default_skewness_threshold")]
    pub skewness_threshold: f64,
    #[serde(default = "default_kurtosis_min")]
    pub kurtosis_min: f64,
    #[serde(default = "default_kurtosis_max")]
    pub kurtosis_max: f64,
    #[serde(default = "default_round_number_ratio")]
    pub round_number_ratio: f64,
    #[serde(default = "default_consecutive_similar_max")]
    pub consecutive_similar_max: usize,
    #[serde(default = "default_trajectory_smooth_max")]
    pub trajectory_smooth_max: f64,
    #[serde(default = "default_trajectory_correction_min")]
    pub trajectory_correction_min: f64,
    #[serde(default = "default_trajectory_interval_cv_max")]
    pub trajectory_interval_cv_max: f64,
    #[serde(default = "default_cv_min")]
    pub cv_min: f64,
    #[serde(default = "default_cv_max")]
    pub cv_max: f64,
}

/// Two decision rules exist in the field; neither has been retired, so
/// both ship as named policies selectable in config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum DecisionPolicy {
    /// Verdict is bot when confidence exceeds the threshold.
    ConfidenceThreshold {
        #[serde(default = "default_confidence_threshold")]
        bot_probability_threshold: u8,
    },
    /// Relaxed rule: a raw bot score at or above the floor is enough,
    /// or a lower confidence threshold.
    ScoreOrConfidence {
        #[serde(default = "default_bot_score_floor")]
        bot_score_floor: f64,
        #[serde(default = "default_relaxed_confidence_threshold")]
        bot_probability_threshold: u8,
    },
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self::ConfidenceThreshold {
            bot_probability_threshold: default_confidence_threshold(),
        }
    }
}

impl DecisionPolicy {
    pub fn decide(&self, bot_score: f64, confidence: u8) -> bool {
        match *self {
            Self::ConfidenceThreshold {
                bot_probability_threshold,
            } => confidence > bot_probability_threshold,
            Self::ScoreOrConfidence {
                bot_score_floor,
                bot_probability_threshold,
            } => bot_score >= bot_score_floor || confidence > bot_probability_threshold,
        }
    }
}

impl Default for SeekThresholds {
    fn default() -> Self {
        Self {
            too_fast: default_seek_too_fast(),
            bot_max: default_seek_bot_max(),
            human_min: default_seek_human_min(),
            uniform_std_max: default_seek_uniform_std_max(),
            range_min: default_seek_range_min(),
        }
    }
}

impl Default for PressThresholds {
    fn default() -> Self {
        Self {
            bot_max: default_press_bot_max(),
            human_min: default_press_human_min(),
            uniform_std_max: default_press_uniform_std_max(),
        }
    }
}

impl Default for TrajectoryThresholds {
    fn default() -> Self {
        Self {
            min_points: default_trajectory_min_points(),
            min_distance: default_trajectory_min_distance(),
        }
    }
}

impl Default for TimingThresholds {
    fn default() -> Self {
        Self {
            user_to_pass_min: default_user_to_pass_min(),
            pass_to_login_min: default_pass_to_login_min(),
        }
    }
}

impl Default for AntiBotThresholds {
    fn default() -> Self {
        Self {
            skewness_threshold: default_skewness_threshold(),
            kurtosis_min: default_kurtosis_min(),
            kurtosis_max: default_kurtosis_max(),
            round_number_ratio: default_round_number_ratio(),
            consecutive_similar_max: default_consecutive_similar_max(),
            trajectory_smooth_max: default_trajectory_smooth_max(),
            trajectory_correction_min: default_trajectory_correction_min(),
            trajectory_interval_cv_max: default_trajectory_interval_cv_max(),
            cv_min: default_cv_min(),
            cv_max: default_cv_max(),
        }
    }
}

fn default_seek_too_fast() -> i64 {
    30
}
fn default_seek_bot_max() -> i64 {
    50
}
fn default_seek_human_min() -> i64 {
    80
}
fn default_seek_uniform_std_max() -> i64 {
    20
}
fn default_seek_range_min() -> i64 {
    50
}
fn default_press_bot_max() -> i64 {
    20
}
fn default_press_human_min() -> i64 {
    40
}
fn default_press_uniform_std_max() -> i64 {
    10
}
fn default_trajectory_min_points() -> usize {
    3
}
fn default_trajectory_min_distance() -> i64 {
    50
}
fn default_user_to_pass_min() -> i64 {
    300
}
fn default_pass_to_login_min() -> i64 {
    100
}
fn default_skewness_threshold() -> f64 {
    0.3
}
fn default_kurtosis_min() -> f64 {
    -1.0
}
fn default_kurtosis_max() -> f64 {
    3.0
}
fn default_round_number_ratio() -> f64 {
    0.3
}
fn default_consecutive_similar_max() -> usize {
    3
}
fn default_trajectory_smooth_max() -> f64 {
    0.8
}
fn default_trajectory_correction_min() -> f64 {
    0.1
}
fn default_trajectory_interval_cv_max() -> f64 {
    0.3
}
fn default_cv_min() -> f64 {
    0.15
}
fn default_cv_max() -> f64 {
    0.35
}
fn default_confidence_threshold() -> u8 {
    70
}
fn default_bot_score_floor() -> f64 {
    3.0
}
fn default_relaxed_confidence_threshold() -> u8 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_strict_confidence() {
        let policy = DecisionPolicy::default();
        assert!(!policy.decide(5.0, 70));
        assert!(policy.decide(5.0, 71));
    }

    #[test]
    fn relaxed_policy_trips_on_raw_score() {
        let policy = DecisionPolicy::ScoreOrConfidence {
            bot_score_floor: 3.0,
            bot_probability_threshold: 60,
        };
        assert!(policy.decide(3.0, 0));
        assert!(policy.decide(0.0, 61));
        assert!(!policy.decide(2.0, 60));
    }

    #[test]
    fn table_deserializes_with_partial_overrides() {
        let table: ThresholdTable = toml::from_str(
            r#"
            [seek_time]
            too_fast = 25

            [decision]
            policy = "score-or-confidence"
            "#,
        )
        .unwrap();
        assert_eq!(table.seek_time.too_fast, 25);
        assert_eq!(table.seek_time.bot_max, 50);
        assert!(table.decision.decide(3.5, 0));
    }
}
