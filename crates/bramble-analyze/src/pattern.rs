use bramble_core::{FieldPattern, IntervalStats, KeystrokeSample};

/// Seek intervals above this count as a deliberate pause.
pub const LONG_PAUSE_MS: i64 = 500;

/// Decodes the raw keystroke timing encoding: a format-header segment
/// followed by `|`-separated `seekMs,pressMs` segments. Returns `None`
/// when there is nothing decodable.
pub fn decode(raw: &str) -> Option<FieldPattern> {
    if raw.is_empty() {
        return None;
    }

    let segments: Vec<&str> = raw.split('|').collect();
    if segments.len() < 2 {
        return None;
    }

    // First segment is the format header.
    let keystrokes: Vec<KeystrokeSample> = segments[1..]
        .iter()
        .map(|segment| {
            let mut fields = segment.split(',');
            KeystrokeSample {
                seek_time: parse_ms(fields.next()),
                press_time: parse_ms(fields.next()),
            }
        })
        .collect();

    let seek_samples: Vec<i64> = keystrokes
        .iter()
        .map(|k| k.seek_time)
        .filter(|&v| v > 0)
        .collect();
    let press_samples: Vec<i64> = keystrokes
        .iter()
        .map(|k| k.press_time)
        .filter(|&v| v > 0)
        .collect();

    let long_pauses = seek_samples.iter().filter(|&&v| v > LONG_PAUSE_MS).count();

    tracing::debug!(
        keystrokes = keystrokes.len(),
        seek_samples = seek_samples.len(),
        long_pauses,
        "decoded typing pattern"
    );

    Some(FieldPattern {
        keystroke_count: keystrokes.len(),
        seek: interval_stats(&seek_samples),
        press: interval_stats(&press_samples),
        long_pauses,
        seek_samples,
        press_samples,
        keystrokes,
    })
}

fn parse_ms(field: Option<&str>) -> i64 {
    field
        .map(str::trim)
        .and_then(|f| f.parse::<i64>().ok())
        .unwrap_or(0)
}

fn interval_stats(samples: &[i64]) -> IntervalStats {
    if samples.is_empty() {
        return IntervalStats::default();
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<i64>() as f64 / n;
    let variance = samples
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;

    let min = *samples.iter().min().unwrap_or(&0);
    let max = *samples.iter().max().unwrap_or(&0);

    IntervalStats {
        avg: mean.round() as i64,
        min,
        max,
        range: max - min,
        std_dev: variance.sqrt().round() as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_header_only_yield_nothing() {
        assert!(decode("").is_none());
        assert!(decode("v1").is_none());
    }

    #[test]
    fn decodes_header_then_segments() {
        let pattern = decode("v1|120,60|300,80|90,50|400,70").unwrap();
        assert_eq!(pattern.keystroke_count, 4);
        assert_eq!(pattern.seek_samples, vec![120, 300, 90, 400]);
        assert_eq!(pattern.press_samples, vec![60, 80, 50, 70]);

        // seek mean 227.5 rounds to 228; population std of the four
        // seeks is ~127.94 and rounds to 128.
        assert_eq!(pattern.seek.avg, 228);
        assert_eq!(pattern.seek.std_dev, 128);
        assert_eq!(pattern.seek.min, 90);
        assert_eq!(pattern.seek.max, 400);
        assert_eq!(pattern.seek.range, 310);

        assert_eq!(pattern.press.avg, 65);
        assert_eq!(pattern.press.std_dev, 11);
        assert_eq!(pattern.press.min, 50);
        assert_eq!(pattern.press.max, 80);
        assert_eq!(pattern.long_pauses, 0);
    }

    #[test]
    fn unparseable_fields_default_to_zero_and_are_filtered() {
        let pattern = decode("v1|abc,60|150,|,|200,40").unwrap();
        assert_eq!(pattern.keystroke_count, 4);
        // only positive samples feed the stats
        assert_eq!(pattern.seek_samples, vec![150, 200]);
        assert_eq!(pattern.press_samples, vec![60, 40]);
        // the raw list keeps everything, zeroes included
        assert_eq!(pattern.keystrokes[0].seek_time, 0);
        assert_eq!(pattern.keystrokes[0].press_time, 60);
    }

    #[test]
    fn all_filtered_out_gives_zero_stats() {
        let pattern = decode("v1|0,0|-5,0|x,y").unwrap();
        assert_eq!(pattern.keystroke_count, 3);
        assert!(pattern.seek_samples.is_empty());
        assert_eq!(pattern.seek.avg, 0);
        assert_eq!(pattern.seek.std_dev, 0);
        assert_eq!(pattern.seek.range, 0);
        assert_eq!(pattern.long_pauses, 0);
    }

    #[test]
    fn counts_long_pauses() {
        let pattern = decode("v1|501,50|500,50|1200,60").unwrap();
        assert_eq!(pattern.long_pauses, 2);
    }
}
