// Format strings for the supported renderings
pub const ISO_WALL_CLOCK_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const LOCALE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Available resource URIs for the Time MCP Server
pub const AVAILABLE_RESOURCES: &[&str] = &["time://status", "time://help"];

/// Fold an hour delta into the [-12, 12] range.
///
/// The raw difference between a zone's hour-of-day and the UTC hour lands a
/// whole day off when the two clocks straddle midnight.
pub fn normalize_hour_offset(offset: i32) -> i32 {
    if offset > 12 {
        offset - 24
    } else if offset < -12 {
        offset + 24
    } else {
        offset
    }
}

/// Format a whole-hour offset with an explicit sign
///
/// # Arguments
///
/// * `offset` - The offset in whole hours from UTC
///
/// # Returns
///
/// A signed string such as `+9`, `-5`, or `+0`
pub fn format_hour_offset(offset: i32) -> String {
    format!("{offset:+}")
}
