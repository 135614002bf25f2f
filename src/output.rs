use crate::Segment;

/// Render segments one per line, prefixed with their start time
pub fn render_timestamped(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| format!("[{}] {}", format_timestamp(s.start), s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render segments as pretty-printed JSON
pub fn render_json(segments: &[Segment]) -> String {
    serde_json::to_string_pretty(segments).unwrap_or_else(|_| "[]".to_string())
}

/// Format seconds as MM:SS, or HH:MM:SS past the hour
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_segments() -> Vec<Segment> {
        vec![
            Segment {
                text: "Hello world".to_string(),
                start: 0.0,
                duration: 1.5,
            },
            Segment {
                text: "This is a test".to_string(),
                start: 83.2,
                duration: 2.0,
            },
        ]
    }

    #[test]
    fn test_render_timestamped() {
        assert_eq!(
            render_timestamped(&sample_segments()),
            "[00:00] Hello world\n[01:23] This is a test"
        );
    }

    #[test]
    fn test_render_timestamped_empty() {
        assert_eq!(render_timestamped(&[]), "");
    }

    #[test]
    fn test_render_json() {
        let parsed: Vec<Segment> = serde_json::from_str(&render_json(&sample_segments())).unwrap();
        assert_eq!(parsed, sample_segments());
    }

    #[test]
    fn test_format_timestamp_hours() {
        assert_eq!(format_timestamp(3725.0), "01:02:05");
    }
}
