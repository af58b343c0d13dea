use std::fmt;

use bramble_core::thresholds::{AntiBotThresholds, ThresholdTable, TimingThresholds};
use bramble_core::{AutomationFlags, DistributionSummary, FieldPattern, Flag, FlagTag, TrajectorySummary};

/// Characters that require Shift (or an IME) on a US layout.
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};:'\",.<>/?\\|~`";

/// Synthetic-to-total keyboard event ratio above this is flagged.
const SYNTHETIC_KEY_RATIO_MAX: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    Username,
    Password,
}

impl fmt::Display for FieldLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldLabel::Username => write!(f, "Username"),
            FieldLabel::Password => write!(f, "Password"),
        }
    }
}

/// One candidate row of the catalog: did it trigger, how it is tagged,
/// how much it weighs, and the reason reported when it fires.
type Rule = (bool, FlagTag, f64, String);

/// Generic fold over a detector's rule table. Detectors stay data:
/// a list of (predicate, tag, weight, reason) rows, nothing else.
fn collect(rules: Vec<Rule>) -> Vec<Flag> {
    rules
        .into_iter()
        .filter(|(hit, _, _, _)| *hit)
        .map(|(_, tag, weight, reason)| Flag { tag, weight, reason })
        .collect()
}

/// Per-field keystroke timing heuristics.
pub fn typing_signals(label: FieldLabel, p: &FieldPattern, th: &ThresholdTable) -> Vec<Flag> {
    let seek = &th.seek_time;
    let press = &th.press_time;

    collect(vec![
        (
            p.seek.avg > 0 && p.seek.avg < seek.too_fast,
            FlagTag::Bot,
            3.0,
            format!(
                "[{}] inter-key seek avg {}ms is implausibly fast",
                label, p.seek.avg
            ),
        ),
        (
            p.seek.avg >= seek.too_fast && p.seek.avg < seek.bot_max,
            FlagTag::Bot,
            2.0,
            format!(
                "[{}] inter-key seek avg {}ms is below the bot ceiling",
                label, p.seek.avg
            ),
        ),
        (
            p.keystroke_count > 3 && p.seek.std_dev < seek.uniform_std_max,
            FlagTag::Bot,
            2.0,
            format!(
                "[{}] seek intervals nearly uniform (std {}ms)",
                label, p.seek.std_dev
            ),
        ),
        (
            p.press.avg > 0 && p.press.avg < press.bot_max,
            FlagTag::Bot,
            2.0,
            format!(
                "[{}] key press duration avg {}ms too short",
                label, p.press.avg
            ),
        ),
        (
            p.keystroke_count > 3 && p.press.std_dev < press.uniform_std_max,
            FlagTag::Bot,
            2.0,
            format!(
                "[{}] press durations nearly uniform (std {}ms)",
                label, p.press.std_dev
            ),
        ),
        (
            p.keystroke_count > 5 && p.seek.range < seek.range_min,
            FlagTag::Bot,
            2.0,
            format!(
                "[{}] seek interval range {}ms too narrow for {} keystrokes",
                label, p.seek.range, p.keystroke_count
            ),
        ),
        (
            p.seek.avg > seek.human_min,
            FlagTag::Human,
            1.0,
            format!("[{}] seek avg {}ms in the human range", label, p.seek.avg),
        ),
        (
            p.press.avg > press.human_min,
            FlagTag::Human,
            1.0,
            format!("[{}] press avg {}ms in the human range", label, p.press.avg),
        ),
        (
            p.long_pauses > 0,
            FlagTag::Human,
            2.0,
            format!(
                "[{}] {} long pause(s) while typing",
                label, p.long_pauses
            ),
        ),
    ])
}

/// Statistical shape of a field's seek intervals. Machine-generated
/// timing tends to look textbook-Gaussian, lands on round numbers,
/// repeats itself, and keeps its dispersion in a narrow band.
pub fn distribution_signals(
    label: FieldLabel,
    dist: &DistributionSummary,
    th: &AntiBotThresholds,
) -> Vec<Flag> {
    if !dist.valid {
        return Vec::new();
    }

    let gaussian_like = match (dist.skewness, dist.kurtosis) {
        (Some(skew), Some(kurt)) => {
            skew.abs() < th.skewness_threshold && kurt > th.kurtosis_min && kurt < th.kurtosis_max
        }
        _ => false,
    };

    collect(vec![
        (
            gaussian_like,
            FlagTag::Bot,
            2.0,
            format!(
                "[{}] interval distribution suspiciously Gaussian (skew {:.2}, kurtosis {:.2})",
                label,
                dist.skewness.unwrap_or(0.0),
                dist.kurtosis.unwrap_or(0.0)
            ),
        ),
        (
            dist.round_number_ratio > th.round_number_ratio,
            FlagTag::Bot,
            2.0,
            format!(
                "[{}] {:.0}% of intervals are round numbers",
                label,
                dist.round_number_ratio * 100.0
            ),
        ),
        (
            dist.longest_similar_run > th.consecutive_similar_max,
            FlagTag::Bot,
            2.0,
            format!(
                "[{}] {} consecutive near-identical intervals",
                label, dist.longest_similar_run
            ),
        ),
        (
            dist.cv > th.cv_min && dist.cv < th.cv_max,
            FlagTag::Bot,
            2.0,
            format!(
                "[{}] interval CV {:.2} sits in the synthetic band",
                label, dist.cv
            ),
        ),
    ])
}

/// Mouse trajectory geometry plus capture sufficiency.
pub fn trajectory_signals(
    summary: &TrajectorySummary,
    captured: bool,
    th: &ThresholdTable,
) -> Vec<Flag> {
    let anti = &th.anti_bot;
    let traj = &th.trajectory;

    let interval_cv_low = summary
        .intervals
        .as_ref()
        .map(|d| d.valid && d.cv < anti.trajectory_interval_cv_max)
        .unwrap_or(false);

    collect(vec![
        (
            summary.valid && summary.smooth_ratio > anti.trajectory_smooth_max,
            FlagTag::Bot,
            3.0,
            format!(
                "[Trajectory] {:.0}% of turns near-collinear, path too smooth",
                summary.smooth_ratio * 100.0
            ),
        ),
        (
            summary.valid
                && summary.points > 10
                && summary.correction_ratio < anti.trajectory_correction_min,
            FlagTag::Bot,
            2.0,
            format!(
                "[Trajectory] correction ratio {:.2} lacks human micro-adjustments",
                summary.correction_ratio
            ),
        ),
        (
            interval_cv_low,
            FlagTag::Bot,
            2.0,
            "[Trajectory] sample intervals metronome-regular".to_string(),
        ),
        (
            summary.points < traj.min_points,
            FlagTag::Bot,
            1.0,
            format!(
                "[Trajectory] only {} point(s) captured",
                summary.points
            ),
        ),
        (
            summary.valid && captured && summary.distance < traj.min_distance,
            FlagTag::Bot,
            1.0,
            format!(
                "[Trajectory] cursor moved only {}px despite capture",
                summary.distance
            ),
        ),
        (
            summary.points > 5 && summary.distance > 100,
            FlagTag::Human,
            2.0,
            format!(
                "[Trajectory] organic movement: {} points over {}px",
                summary.points, summary.distance
            ),
        ),
    ])
}

/// Password content versus observed modifier usage. Uppercase or
/// special characters with no Shift, no CapsLock, and no paste means
/// the characters arrived by synthetic events.
pub fn password_signals(password: &str, shift: u32, caps_lock: u32, pasted: bool) -> Vec<Flag> {
    let needs_modifier = password.chars().any(|c| c.is_ascii_uppercase())
        || password.chars().any(|c| SPECIAL_CHARS.contains(c));

    collect(vec![(
        needs_modifier && shift == 0 && caps_lock == 0 && !pasted,
        FlagTag::Bot,
        3.0,
        "[Password] complex characters typed without Shift or CapsLock".to_string(),
    )])
}

/// Automation-environment flags reported by the capture script.
pub fn automation_signals(webdriver: bool, flags: &AutomationFlags) -> Vec<Flag> {
    collect(vec![
        (
            webdriver,
            FlagTag::Bot,
            5.0,
            "[Automation] navigator.webdriver is set".to_string(),
        ),
        (
            flags.has_selenium,
            FlagTag::Bot,
            5.0,
            "[Automation] Selenium artifacts present".to_string(),
        ),
        (
            flags.has_phantom,
            FlagTag::Bot,
            5.0,
            "[Automation] PhantomJS artifacts present".to_string(),
        ),
        (
            flags.has_chromium_automation,
            FlagTag::Bot,
            4.0,
            "[Automation] Chromium automation extension detected".to_string(),
        ),
        (
            flags.headless_chrome,
            FlagTag::Bot,
            4.0,
            "[Automation] HeadlessChrome user agent".to_string(),
        ),
        (
            flags.zero_window_size,
            FlagTag::Bot,
            3.0,
            "[Automation] zero-sized browser window".to_string(),
        ),
        // Recorded for the audit trail but deliberately not scored:
        // plugin-free browsers are too common to weigh.
        (
            flags.no_plugins,
            FlagTag::Bot,
            0.0,
            "[Automation] no browser plugins (diagnostic only)".to_string(),
        ),
    ])
}

/// Untrusted / synthetic DOM event counters.
pub fn event_signals(untrusted: u32, synthetic_keys: u32, total_keys: u32) -> Vec<Flag> {
    let synthetic_ratio = if total_keys > 0 {
        f64::from(synthetic_keys) / f64::from(total_keys)
    } else {
        0.0
    };

    collect(vec![
        (
            untrusted > 0,
            FlagTag::Bot,
            3.0,
            format!("[Events] {} untrusted DOM event(s)", untrusted),
        ),
        (
            synthetic_ratio > SYNTHETIC_KEY_RATIO_MAX,
            FlagTag::Bot,
            4.0,
            format!(
                "[Events] {:.0}% of keyboard events are synthetic",
                synthetic_ratio * 100.0
            ),
        ),
    ])
}

/// Gaps between finishing one field and touching the next.
pub fn timing_signals(
    user_to_pass_ms: Option<i64>,
    pass_to_login_ms: Option<i64>,
    th: &TimingThresholds,
) -> Vec<Flag> {
    collect(vec![
        (
            user_to_pass_ms.is_some_and(|ms| ms < th.user_to_pass_min),
            FlagTag::Bot,
            2.0,
            format!(
                "[Events] username-to-password gap {}ms too short",
                user_to_pass_ms.unwrap_or(0)
            ),
        ),
        (
            pass_to_login_ms.is_some_and(|ms| ms < th.pass_to_login_min),
            FlagTag::Bot,
            2.0,
            format!(
                "[Events] password-to-login gap {}ms too short",
                pass_to_login_ms.unwrap_or(0)
            ),
        ),
    ])
}

/// Clipboard paste counters, one low-weight flag per field.
pub fn paste_signals(label: FieldLabel, paste_count: u32) -> Vec<Flag> {
    collect(vec![(
        paste_count > 0,
        FlagTag::Bot,
        1.0,
        format!("[{}] field content pasted", label),
    )])
}

/// Human-leaning input signals: IME composition and modifier usage.
pub fn input_method_signals(ime_compositions: u32, shift: u32, caps_lock: u32) -> Vec<Flag> {
    collect(vec![
        (
            ime_compositions > 0,
            FlagTag::Human,
            3.0,
            format!("[Events] {} IME composition event(s)", ime_compositions),
        ),
        (
            shift > 0,
            FlagTag::Human,
            2.0,
            format!("[Events] Shift used {} time(s)", shift),
        ),
        (
            caps_lock > 0,
            FlagTag::Human,
            1.0,
            format!("[Events] CapsLock used {} time(s)", caps_lock),
        ),
    ])
}
