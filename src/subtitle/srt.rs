// SRT subtitle format
use super::{SubtitleEntry, SubtitleFormatter};
use std::fmt::Write;

pub struct SrtFormatter;

impl SubtitleFormatter for SrtFormatter {
    fn format(&self, entries: &[SubtitleEntry]) -> String {
        let mut out = String::new();
        for entry in entries {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}", entry.index);
            let _ = writeln!(
                out,
                "{} --> {}",
                format_timestamp(entry.start),
                format_timestamp(entry.end)
            );
            let _ = writeln!(out, "{}", entry.text);
        }
        out
    }

    fn extension(&self) -> &'static str {
        "srt"
    }
}

/// `HH:MM:SS,mmm` with unbounded, zero-padded hours.
fn format_timestamp(d: std::time::Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(Duration::ZERO), "00:00:00,000");
        assert_eq!(
            format_timestamp(Duration::from_millis(1500)),
            "00:00:01,500"
        );
        assert_eq!(
            format_timestamp(Duration::from_millis(3_661_000)),
            "01:01:01,000"
        );
    }

    #[test]
    fn test_format_timestamp_hours_unbounded() {
        assert_eq!(
            format_timestamp(Duration::from_secs(101 * 3600)),
            "101:00:00,000"
        );
    }

    #[test]
    fn test_srt_format() {
        let entries = vec![
            SubtitleEntry {
                index: 1,
                start: Duration::from_millis(1500),
                end: Duration::from_millis(4000),
                text: "こんにちは、世界！".to_string(),
            },
            SubtitleEntry {
                index: 2,
                start: Duration::from_millis(4500),
                end: Duration::from_millis(7000),
                text: "テストです。".to_string(),
            },
        ];

        let output = SrtFormatter.format(&entries);

        assert!(output.contains("1\n00:00:01,500 --> 00:00:04,000\nこんにちは、世界！"));
        assert!(output.contains("2\n00:00:04,500 --> 00:00:07,000\nテストです。"));
        // One blank line between blocks
        assert!(output.contains("こんにちは、世界！\n\n2\n"));
    }

    #[test]
    fn test_srt_format_empty() {
        assert_eq!(SrtFormatter.format(&[]), "");
    }
}
