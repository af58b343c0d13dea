use bramble_analyze::{distribution, pattern, trajectory};
use bramble_core::{
    AnalysisDetails, AnalysisResult, DistributionSummary, FieldPattern, Flag, FlagTag,
    LoginTelemetry, Scores, ThresholdTable,
};

use crate::signals::{self, FieldLabel};

/// Seam for the raw timing decode so callers can swap the encoding
/// without touching the engine. The engine never reaches for an
/// ambient default behind the caller's back.
pub trait PatternDecoder {
    fn decode(&self, raw: &str) -> Option<FieldPattern>;
}

/// Default decoder for the `header|seekMs,pressMs|...` encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimingDecoder;

impl PatternDecoder for TimingDecoder {
    fn decode(&self, raw: &str) -> Option<FieldPattern> {
        pattern::decode(raw)
    }
}

/// Runs the full catalog over one telemetry capture and fuses the
/// weighted flags into a verdict. Pure: same input, same thresholds,
/// same result.
pub struct ScoringEngine<D = TimingDecoder> {
    thresholds: ThresholdTable,
    decoder: D,
}

impl ScoringEngine<TimingDecoder> {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self {
            thresholds,
            decoder: TimingDecoder,
        }
    }
}

impl Default for ScoringEngine<TimingDecoder> {
    fn default() -> Self {
        Self::new(ThresholdTable::default())
    }
}

impl<D: PatternDecoder> ScoringEngine<D> {
    pub fn with_decoder(thresholds: ThresholdTable, decoder: D) -> Self {
        Self {
            thresholds,
            decoder,
        }
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn analyze(&self, telemetry: &LoginTelemetry) -> AnalysisResult {
        let th = &self.thresholds;
        let mut flags: Vec<Flag> = Vec::new();
        let mut details = AnalysisDetails::default();

        // Field groups first, then trajectory, automation, events, so
        // the reason list reads in a stable prefix order.
        let username = telemetry
            .typing_pattern
            .username
            .as_deref()
            .and_then(|raw| self.decoder.decode(raw));
        if let Some(ref p) = username {
            flags.extend(signals::typing_signals(FieldLabel::Username, p, th));
            let dist = seek_distribution(p);
            flags.extend(signals::distribution_signals(
                FieldLabel::Username,
                &dist,
                &th.anti_bot,
            ));
            details.username_intervals = Some(dist);
        }
        flags.extend(signals::paste_signals(
            FieldLabel::Username,
            telemetry.paste_user,
        ));

        let password = telemetry
            .typing_pattern
            .password
            .as_deref()
            .and_then(|raw| self.decoder.decode(raw));
        if let Some(ref p) = password {
            flags.extend(signals::typing_signals(FieldLabel::Password, p, th));
            let dist = seek_distribution(p);
            flags.extend(signals::distribution_signals(
                FieldLabel::Password,
                &dist,
                &th.anti_bot,
            ));
            details.password_intervals = Some(dist);
        }
        flags.extend(signals::paste_signals(
            FieldLabel::Password,
            telemetry.paste_pass,
        ));
        if let Some(ref pw) = telemetry.password {
            flags.extend(signals::password_signals(
                pw,
                telemetry.shift_usage(),
                telemetry.caps_lock_usage(),
                telemetry.paste_pass > 0,
            ));
        }

        if let Some(ref capture) = telemetry.trajectory {
            let summary = trajectory::analyze(&capture.sample);
            flags.extend(signals::trajectory_signals(&summary, capture.captured, th));
            details.trajectory = Some(summary);
        }

        flags.extend(signals::automation_signals(
            telemetry.webdriver_detected,
            &telemetry.automation_flags,
        ));

        flags.extend(signals::event_signals(
            telemetry.untrusted_events,
            telemetry.synthetic_key_events,
            telemetry.total_key_events,
        ));
        flags.extend(signals::timing_signals(
            telemetry.username_to_password_ms,
            telemetry.password_to_login_ms,
            &th.timing,
        ));
        flags.extend(signals::input_method_signals(
            telemetry.ime_compositions(),
            telemetry.shift_usage(),
            telemetry.caps_lock_usage(),
        ));

        details.username = username;
        details.password = password;

        let scores = fuse(&flags);
        let confidence = confidence(scores);
        let is_bot = th.decision.decide(scores.bot, confidence);

        tracing::debug!(
            bot = scores.bot,
            human = scores.human,
            confidence,
            is_bot,
            flags = flags.len(),
            "scored login telemetry"
        );

        let reasons = flags.iter().map(|f| f.reason.clone()).collect();
        details.flags = flags;

        AnalysisResult {
            is_bot,
            confidence,
            reasons,
            scores,
            details,
        }
    }
}

fn seek_distribution(pattern: &FieldPattern) -> DistributionSummary {
    let samples: Vec<f64> = pattern.seek_samples.iter().map(|&v| v as f64).collect();
    distribution::analyze(&samples)
}

fn fuse(flags: &[Flag]) -> Scores {
    flags.iter().fold(Scores::default(), |mut scores, flag| {
        match flag.tag {
            FlagTag::Bot => scores.bot += flag.weight,
            FlagTag::Human => scores.human += flag.weight,
        }
        scores
    })
}

fn confidence(scores: Scores) -> u8 {
    let total = scores.bot + scores.human;
    if total <= 0.0 {
        return 0;
    }
    (100.0 * scores.bot / total).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use bramble_core::{AutomationFlags, TrajectoryCapture, TrajectoryPoint, TypingPattern};

    fn engine() -> ScoringEngine {
        ScoringEngine::default()
    }

    #[test]
    fn empty_telemetry_degrades_to_clean_result() {
        let result = engine().analyze(&LoginTelemetry::default());
        assert!(!result.is_bot);
        assert_eq!(result.confidence, 0);
        assert!(result.reasons.is_empty());
        assert_eq!(result.scores.bot, 0.0);
        assert_eq!(result.scores.human, 0.0);
    }

    #[test]
    fn selenium_alone_is_a_certain_bot() {
        let telemetry = LoginTelemetry {
            automation_flags: AutomationFlags {
                has_selenium: true,
                ..AutomationFlags::default()
            },
            ..LoginTelemetry::default()
        };
        let result = engine().analyze(&telemetry);
        assert_eq!(result.scores.bot, 5.0);
        assert_eq!(result.scores.human, 0.0);
        assert_eq!(result.confidence, 100);
        assert!(result.is_bot);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.reasons[0].starts_with("[Automation]"));
    }

    #[test]
    fn shift_usage_suppresses_password_mismatch() {
        let telemetry = LoginTelemetry {
            password: Some("Secret!1".to_string()),
            shift_count: Some(2),
            caps_lock_count: Some(1),
            password_shift_count: Some(2),
            ..LoginTelemetry::default()
        };
        let result = engine().analyze(&telemetry);
        assert!(!result
            .reasons
            .iter()
            .any(|r| r.contains("without Shift or CapsLock")));
        // shift (+2) and capslock (+1) land on the human side
        assert_eq!(result.scores.human, 3.0);
        assert_eq!(result.scores.bot, 0.0);
    }

    #[test]
    fn two_point_trajectory_fires_only_insufficiency() {
        let telemetry = LoginTelemetry {
            trajectory: Some(TrajectoryCapture {
                sample: vec![
                    TrajectoryPoint { x: 0.0, y: 0.0, t: None },
                    TrajectoryPoint { x: 3.0, y: 4.0, t: None },
                ],
                captured: false,
            }),
            ..LoginTelemetry::default()
        };
        let result = engine().analyze(&telemetry);
        assert_eq!(result.reasons.len(), 1);
        assert_eq!(result.scores.bot, 1.0);
        assert!(result.details.trajectory.is_some());
        assert!(!result.details.trajectory.unwrap().valid);
    }

    #[test]
    fn confidence_is_zero_when_nothing_fires_and_hundred_when_only_bot() {
        assert_eq!(confidence(Scores { bot: 0.0, human: 0.0 }), 0);
        assert_eq!(confidence(Scores { bot: 4.0, human: 0.0 }), 100);
        assert_eq!(confidence(Scores { bot: 0.0, human: 6.0 }), 0);
        assert_eq!(confidence(Scores { bot: 1.0, human: 1.0 }), 50);
    }

    #[test]
    fn confidence_is_monotone_in_bot_score() {
        let mut last = 0u8;
        for bot in 0..40 {
            let c = confidence(Scores {
                bot: f64::from(bot),
                human: 5.0,
            });
            assert!(c >= last);
            last = c;
        }
    }

    #[test]
    fn analysis_is_idempotent() {
        let telemetry = LoginTelemetry {
            typing_pattern: TypingPattern {
                username: Some("v1|120,60|300,80|90,50|400,70".to_string()),
                password: Some("v1|45,15|44,16|46,14|45,15".to_string()),
            },
            webdriver_detected: true,
            ..LoginTelemetry::default()
        };
        let e = engine();
        let a = e.analyze(&telemetry);
        let b = e.analyze(&telemetry);
        assert_eq!(a.scores.bot, b.scores.bot);
        assert_eq!(a.scores.human, b.scores.human);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.reasons, b.reasons);
    }

    #[test]
    fn reasons_keep_prefix_group_order() {
        let telemetry = LoginTelemetry {
            typing_pattern: TypingPattern {
                username: Some("v1|40,12|41,11|42,12|40,13".to_string()),
                password: None,
            },
            trajectory: Some(TrajectoryCapture {
                sample: vec![TrajectoryPoint { x: 0.0, y: 0.0, t: None }],
                captured: true,
            }),
            webdriver_detected: true,
            untrusted_events: 2,
            ..LoginTelemetry::default()
        };
        let result = engine().analyze(&telemetry);
        let first_of = |prefix: &str| {
            result
                .reasons
                .iter()
                .position(|r| r.starts_with(prefix))
                .unwrap()
        };
        assert!(first_of("[Username]") < first_of("[Trajectory]"));
        assert!(first_of("[Trajectory]") < first_of("[Automation]"));
        assert!(first_of("[Automation]") < first_of("[Events]"));
    }

    #[test]
    fn scripted_login_crosses_the_default_policy() {
        // uniform fast typing in both fields, instant field hops,
        // synthetic key events
        let telemetry = LoginTelemetry {
            typing_pattern: TypingPattern {
                username: Some("v1|40,12|41,11|42,12|40,13|41,12|42,11".to_string()),
                password: Some("v1|39,13|40,12|41,11|40,12|39,13|41,12".to_string()),
            },
            username_to_password_ms: Some(20),
            password_to_login_ms: Some(10),
            synthetic_key_events: 8,
            total_key_events: 12,
            ..LoginTelemetry::default()
        };
        let result = engine().analyze(&telemetry);
        assert!(result.scores.bot > 10.0);
        assert_eq!(result.scores.human, 0.0);
        assert_eq!(result.confidence, 100);
        assert!(result.is_bot);
    }

    struct NullDecoder;

    impl PatternDecoder for NullDecoder {
        fn decode(&self, _raw: &str) -> Option<FieldPattern> {
            None
        }
    }

    #[test]
    fn injected_decoder_replaces_the_default() {
        let telemetry = LoginTelemetry {
            typing_pattern: TypingPattern {
                username: Some("v1|40,12|41,11|42,12|40,13".to_string()),
                password: None,
            },
            ..LoginTelemetry::default()
        };
        let e = ScoringEngine::with_decoder(ThresholdTable::default(), NullDecoder);
        let result = e.analyze(&telemetry);
        assert!(result.details.username.is_none());
        assert!(result.reasons.is_empty());
    }
}
