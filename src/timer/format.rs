//! Countdown display formatting

/// Format remaining seconds as `MM:SS`.
///
/// Minutes are zero-padded to two digits but not truncated, so anything at
/// or above 100 minutes renders with three or more minute digits.
pub fn format_remaining(remaining_seconds: u64) -> String {
    let minutes = remaining_seconds / 60;
    let seconds = remaining_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}
