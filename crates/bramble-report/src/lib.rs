use std::fmt::Write;

use bramble_core::{AnalysisResult, FlagTag};

/// Renders an analysis result as the fixed text layout used for human
/// review. Consumes only the public result contract.
pub fn render(result: &AnalysisResult) -> String {
    let mut out = String::new();

    let verdict = if result.is_bot { "BOT" } else { "HUMAN" };
    let _ = writeln!(out, "--- login telemetry analysis ---");
    let _ = writeln!(out, "verdict: {}", verdict);
    let _ = writeln!(out, "confidence: {}%", result.confidence);
    let _ = writeln!(
        out,
        "scores: bot {:.0} / human {:.0}",
        result.scores.bot, result.scores.human
    );

    if let Some(ref p) = result.details.username {
        let _ = writeln!(
            out,
            "username: {} keystrokes, seek avg {}ms (std {}), press avg {}ms, {} long pause(s)",
            p.keystroke_count, p.seek.avg, p.seek.std_dev, p.press.avg, p.long_pauses
        );
    }
    if let Some(ref p) = result.details.password {
        let _ = writeln!(
            out,
            "password: {} keystrokes, seek avg {}ms (std {}), press avg {}ms, {} long pause(s)",
            p.keystroke_count, p.seek.avg, p.seek.std_dev, p.press.avg, p.long_pauses
        );
    }
    if let Some(ref t) = result.details.trajectory {
        if t.valid {
            let _ = writeln!(
                out,
                "trajectory: {} points over {}px, smooth {:.2}, corrections {:.2}",
                t.points, t.distance, t.smooth_ratio, t.correction_ratio
            );
        } else {
            let _ = writeln!(out, "trajectory: insufficient capture");
        }
    }

    if result.details.flags.is_empty() {
        let _ = writeln!(out, "\nno signals triggered");
    } else {
        let _ = writeln!(out, "\nsignals ({}):", result.details.flags.len());
        for flag in &result.details.flags {
            let marker = match flag.tag {
                FlagTag::Bot => "bot",
                FlagTag::Human => "human",
            };
            let _ = writeln!(out, "  [{:>5} +{:.0}] {}", marker, flag.weight, flag.reason);
        }
    }

    out
}
