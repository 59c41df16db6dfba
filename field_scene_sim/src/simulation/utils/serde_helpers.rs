// field_scene_sim/src/simulation/utils/serde_helpers.rs

/// Reads a [`Perspective`](field_scene_core::camera::Perspective) from its text
/// form (`sky`, `home:0:top`, ...).
pub mod perspective_from_str {
    use field_scene_core::camera::Perspective;
    use serde::{self, de::Error, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Perspective, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

/// Reads a duration written as fractional seconds.
pub mod duration_from_secs_f32 {
    use serde::{self, de::Error, Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = f32::deserialize(deserializer)?;
        Duration::try_from_secs_f32(seconds).map_err(D::Error::custom)
    }
}
