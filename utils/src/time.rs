//! Duration formatting helpers.

/// Format a duration in seconds as a short human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3_600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86_400 {
        format!("{}h {}m", secs / 3_600, (secs % 3_600) / 60)
    } else {
        format!("{}d {}h", secs / 86_400, (secs % 86_400) / 3_600)
    }
}

/// [`format_duration`] for a millisecond count, rounded up to whole seconds.
pub fn format_duration_ms(millis: u64) -> String {
    format_duration(millis.div_ceil(1_000))
}
