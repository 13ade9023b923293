use rmcp::schemars;
use serde::{Deserialize, Deserializer, Serialize};

/// Helper function to deserialize and trim optional strings.
///
/// A value that is absent, or blank after trimming, becomes `None`.
fn deserialize_optional_trimmed_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Output renderings supported by `get_current_time`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    /// ISO 8601 string (default)
    #[default]
    Iso,
    /// Seconds since the Unix epoch, as a string
    Unix,
    /// Locale-style date and time
    Locale,
}

/// Request to get the current date and time
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct GetCurrentTimeRequest {
    /// Timezone (e.g., "UTC", "America/New_York"). Defaults to system timezone.
    #[serde(default, deserialize_with = "deserialize_optional_trimmed_string")]
    pub timezone: Option<String>,
    /// Time format (e.g., "iso", "unix", "locale"). Defaults to "iso".
    #[serde(default)]
    pub format: TimeFormat,
}

/// Request to get the offset of a specific timezone
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct GetTimezoneOffsetRequest {
    /// Timezone to get offset for (e.g., "America/New_York")
    #[serde(default, deserialize_with = "deserialize_optional_trimmed_string")]
    #[schemars(required)]
    pub timezone: Option<String>,
}
