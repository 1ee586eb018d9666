use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Policy knobs for the playground runtime. Every section is optional in TOML;
/// absent sections fall back to the built-in policy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaygroundConfig {
    pub version: u32,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub errors: ErrorLogSettings,
    #[serde(default)]
    pub memory: MemoryPolicy,
    #[serde(default)]
    pub recommend: RecommendPolicy,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            version: 1,
            cache: CacheSettings::default(),
            errors: ErrorLogSettings::default(),
            memory: MemoryPolicy::default(),
            recommend: RecommendPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Entries older than this are treated as invalidated. `None` keeps them
    /// until an explicit invalidation.
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_duration_opt"
    )]
    pub ttl: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorLogSettings {
    #[serde(default = "default_error_capacity")]
    pub capacity: usize,
}

impl Default for ErrorLogSettings {
    fn default() -> Self {
        Self {
            capacity: default_error_capacity(),
        }
    }
}

/// Relative memory cost heuristics. The numbers are not measured; only the
/// ordering between families matters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MemoryPolicy {
    #[serde(default = "default_design_base")]
    pub design_base: u32,
    #[serde(default = "default_webgl_base")]
    pub webgl_base: u32,
    #[serde(default = "default_advanced_scale")]
    pub advanced_scale: f32,
    #[serde(default = "default_gpu_heavy_scale")]
    pub gpu_heavy_scale: f32,
}

impl Default for MemoryPolicy {
    fn default() -> Self {
        Self {
            design_base: default_design_base(),
            webgl_base: default_webgl_base(),
            advanced_scale: default_advanced_scale(),
            gpu_heavy_scale: default_gpu_heavy_scale(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecommendPolicy {
    /// Devices reporting this many logical cores or fewer get the clamped frame rate.
    #[serde(default = "default_low_core_threshold")]
    pub low_core_threshold: u32,
    /// Touch devices at or above this pixel ratio are treated as mobile.
    #[serde(default = "default_high_dpr_threshold")]
    pub high_dpr_threshold: f32,
    #[serde(default = "default_clamped_fps")]
    pub clamped_fps: u32,
}

impl Default for RecommendPolicy {
    fn default() -> Self {
        Self {
            low_core_threshold: default_low_core_threshold(),
            high_dpr_threshold: default_high_dpr_threshold(),
            clamped_fps: default_clamped_fps(),
        }
    }
}

fn default_error_capacity() -> usize {
    50
}

fn default_design_base() -> u32 {
    64
}

fn default_webgl_base() -> u32 {
    128
}

fn default_advanced_scale() -> f32 {
    2.0
}

fn default_gpu_heavy_scale() -> f32 {
    1.5
}

fn default_low_core_threshold() -> u32 {
    2
}

fn default_high_dpr_threshold() -> f32 {
    2.0
}

fn default_clamped_fps() -> u32 {
    30
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("duration out of range: {err}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration_opt<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(duration) => {
            serializer.serialize_str(&humantime::format_duration(*duration).to_string())
        }
        None => serializer.serialize_none(),
    }
}

impl PlaygroundConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: PlaygroundConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if let Some(ttl) = self.cache.ttl {
            if ttl.is_zero() {
                return Err(ConfigError::Invalid(
                    "cache.ttl must be greater than zero".into(),
                ));
            }
        }

        if self.cache.capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "cache.capacity must be greater than zero".into(),
            ));
        }

        if self.errors.capacity == 0 {
            return Err(ConfigError::Invalid(
                "errors.capacity must be greater than zero".into(),
            ));
        }

        let memory = &self.memory;
        if memory.design_base == 0 {
            return Err(ConfigError::Invalid(
                "memory.design_base must be greater than zero".into(),
            ));
        }
        if memory.webgl_base <= memory.design_base {
            return Err(ConfigError::Invalid(format!(
                "memory.webgl_base ({}) must exceed memory.design_base ({})",
                memory.webgl_base, memory.design_base
            )));
        }
        for (name, scale) in [
            ("advanced_scale", memory.advanced_scale),
            ("gpu_heavy_scale", memory.gpu_heavy_scale),
        ] {
            if !scale.is_finite() || scale < 1.0 {
                return Err(ConfigError::Invalid(format!(
                    "memory.{name} must be a finite value >= 1.0"
                )));
            }
        }
        let largest = f64::from(memory.webgl_base)
            * f64::from(memory.advanced_scale)
            * f64::from(memory.gpu_heavy_scale);
        if largest > f64::from(u32::MAX) {
            return Err(ConfigError::Invalid(format!(
                "memory estimates up to {largest} exceed {}; lower the bases or scales",
                u32::MAX
            )));
        }

        let recommend = &self.recommend;
        if !recommend.high_dpr_threshold.is_finite() || recommend.high_dpr_threshold <= 0.0 {
            return Err(ConfigError::Invalid(
                "recommend.high_dpr_threshold must be a positive number".into(),
            ));
        }
        if recommend.clamped_fps == 0 || recommend.clamped_fps > 30 {
            return Err(ConfigError::Invalid(format!(
                "recommend.clamped_fps must be between 1 and 30, got {}",
                recommend.clamped_fps
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[cache]
ttl = "5m"
capacity = 128

[errors]
capacity = 20

[memory]
design_base = 32
webgl_base = 96
advanced_scale = 1.75

[recommend]
low_core_threshold = 4
"#;

    #[test]
    fn parses_sample_config() {
        let config = PlaygroundConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.cache.ttl, Some(Duration::from_secs(300)));
        assert_eq!(config.cache.capacity, Some(128));
        assert_eq!(config.errors.capacity, 20);
        assert_eq!(config.memory.design_base, 32);
        assert_eq!(config.memory.webgl_base, 96);
        assert_eq!(config.memory.advanced_scale, 1.75);
        assert_eq!(config.memory.gpu_heavy_scale, 1.5);
        assert_eq!(config.recommend.low_core_threshold, 4);
        assert_eq!(config.recommend.high_dpr_threshold, 2.0);
        assert_eq!(config.recommend.clamped_fps, 30);
    }

    #[test]
    fn minimal_config_matches_defaults() {
        let config = PlaygroundConfig::from_toml_str("version = 1").unwrap();
        assert_eq!(config, PlaygroundConfig::default());
        assert_eq!(config.errors.capacity, 50);
        assert!(config.cache.ttl.is_none());
    }

    #[test]
    fn accepts_numeric_ttl() {
        let config = PlaygroundConfig::from_toml_str(
            r#"
version = 1

[cache]
ttl = 90
"#,
        )
        .unwrap();
        assert_eq!(config.cache.ttl, Some(Duration::from_secs(90)));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = PlaygroundConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_inverted_memory_bases() {
        let err = PlaygroundConfig::from_toml_str(
            r#"
version = 1

[memory]
design_base = 200
webgl_base = 100
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("webgl_base")));
    }

    #[test]
    fn rejects_shrinking_scale() {
        let err = PlaygroundConfig::from_toml_str(
            r#"
version = 1

[memory]
gpu_heavy_scale = 0.5
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_error_capacity() {
        let err = PlaygroundConfig::from_toml_str(
            r#"
version = 1

[errors]
capacity = 0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_duration() {
        let err = PlaygroundConfig::from_toml_str(
            r#"
version = 1

[cache]
ttl = "soon"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unbounded_ttl() {
        for ttl in ["inf", "1e30"] {
            let input = format!("version = 1\n\n[cache]\nttl = {ttl}\n");
            let err = PlaygroundConfig::from_toml_str(&input).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "ttl = {ttl}: {err:?}");
        }
    }

    #[test]
    fn rejects_memory_estimates_beyond_u32() {
        let err = PlaygroundConfig::from_toml_str(
            r#"
version = 1

[memory]
design_base = 1000000000
webgl_base = 2000000000
advanced_scale = 2.0
gpu_heavy_scale = 1.5
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("memory estimates")));
    }

    #[test]
    fn serializes_back_to_toml() {
        let config = PlaygroundConfig::from_toml_str(SAMPLE).unwrap();
        let rendered = toml::to_string(&config).unwrap();
        let reparsed = PlaygroundConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed, config);
    }
}
