/// Formats the current local time for log lines.
/// Format: YYYY.MM.DD HH:MM:SS
pub fn format_now() -> Option<String> {
    let now = time_format::now().ok()?;
    time_format::strftime_local("%Y.%m.%d %H:%M:%S", now).ok()
}
