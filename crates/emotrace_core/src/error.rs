use thiserror::Error;

/// A neuro profile that would make the decay simulation undefined.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("profile has no hormones")]
    NoHormones,

    #[error("duplicate hormone name '{0}'")]
    DuplicateHormone(String),

    #[error("peak time must be a finite, non-negative number of minutes (got {0})")]
    InvalidPeakTime(f64),

    #[error("decay rate must be finite and greater than zero (got {0})")]
    InvalidDecayRate(f64),

    #[error("hormone '{name}': {source}")]
    Hormone {
        name: String,
        #[source]
        source: Box<ProfileError>,
    },
}

/// Failures loading the embedded reference tables.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to parse reference asset '{asset}': {source}")]
    ReferenceData {
        asset: &'static str,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid neuro profile for emotion '{emotion}': {source}")]
    InvalidProfile {
        emotion: String,
        #[source]
        source: ProfileError,
    },

    #[error("insight for '{emotion}' level {level} is duplicated or off the 1-7 scale")]
    InvalidInsight { emotion: String, level: u8 },

    #[error("unknown emotion '{0}'")]
    UnknownEmotion(String),
}
