//! Time labels for the decay chart.

/// Axis tick label: `"0"` at onset, `"2h"` on whole hours, `"45m"` otherwise.
pub fn format_axis_tick(minutes: u32) -> String {
    if minutes == 0 {
        "0".to_string()
    } else if minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}m", minutes)
    }
}

/// Tooltip label for time since onset: `"1h 30m"`, or `"45m"` under an hour.
pub fn format_elapsed(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
