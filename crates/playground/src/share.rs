//! Share links: a compact query string carrying the experiment id and the
//! chosen settings so a session can be reproduced from a URL.
//!
//! The wire format is fixed for compatibility with links already in the wild:
//! `experiment`, `quality`, `fps` and `optimizations` query parameters, for
//! example `?experiment=webgl-1&quality=high&fps=60&optimizations=true`.
//! Parameter order is irrelevant when parsing.
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::{form_urlencoded, Url};

use crate::capabilities::{DeviceCapabilities, DeviceSummary};
use crate::settings::{PerformanceSettings, QualityLevel};

const KEY_EXPERIMENT: &str = "experiment";
const KEY_QUALITY: &str = "quality";
const KEY_FPS: &str = "fps";
const KEY_OPTIMIZATIONS: &str = "optimizations";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareState {
    pub experiment_id: String,
    pub settings: PerformanceSettings,
    /// ISO-8601 creation time.
    pub timestamp: String,
    pub device_info: DeviceSummary,
}

impl ShareState {
    pub fn new(
        experiment_id: impl Into<String>,
        settings: PerformanceSettings,
        capabilities: &DeviceCapabilities,
    ) -> Self {
        Self::at(experiment_id, settings, capabilities, Utc::now())
    }

    pub fn at(
        experiment_id: impl Into<String>,
        settings: PerformanceSettings,
        capabilities: &DeviceCapabilities,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            settings,
            timestamp: created.to_rfc3339_opts(SecondsFormat::Millis, true),
            device_info: capabilities.summary(),
        }
    }
}

/// Whatever a share link carried. Only the experiment id is guaranteed; every
/// other field is absent when missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSession {
    pub experiment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimizations: Option<bool>,
}

/// Encodes `state` as a query string starting with `?`.
pub fn generate_share_url(state: &ShareState) -> String {
    format!("?{}", encode_query(state))
}

/// Appends the encoded query to `base`, e.g. `https://example.com/playground`.
pub fn generate_share_url_with_base(base: &str, state: &ShareState) -> String {
    let base = base.trim_end_matches(['?', '&']);
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{}", encode_query(state))
}

fn encode_query(state: &ShareState) -> String {
    let settings = &state.settings;
    form_urlencoded::Serializer::new(String::new())
        .append_pair(KEY_EXPERIMENT, &state.experiment_id)
        .append_pair(KEY_QUALITY, settings.quality_level.as_str())
        .append_pair(KEY_FPS, &settings.target_fps.to_string())
        .append_pair(
            KEY_OPTIMIZATIONS,
            if settings.enable_optimizations {
                "true"
            } else {
                "false"
            },
        )
        .finish()
}

/// Accepts a full URL, a bare `?query` or a bare `query`. Returns `None` when
/// the input cannot be read or names no experiment.
pub fn parse_share_url(input: &str) -> Option<SharedSession> {
    let input = input.trim();
    let pairs: Vec<(String, String)> = if input.contains("://") {
        let url = match Url::parse(input) {
            Ok(url) => url,
            Err(err) => {
                debug!(input, error = %err, "share url is not a valid url");
                return None;
            }
        };
        url.query_pairs().into_owned().collect()
    } else {
        let query = input.split('#').next().unwrap_or_default();
        let query = match query.split_once('?') {
            Some((_, query)) => query,
            None if query.contains('=') => query,
            None => return None,
        };
        form_urlencoded::parse(query.as_bytes()).into_owned().collect()
    };

    let mut experiment = None;
    let mut session = SharedSession::default();
    // The first occurrence of a repeated key wins.
    let mut seen_quality = false;
    let mut seen_fps = false;
    let mut seen_optimizations = false;
    for (key, value) in pairs {
        match key.as_str() {
            KEY_EXPERIMENT if experiment.is_none() => experiment = Some(value),
            KEY_QUALITY if !seen_quality => {
                seen_quality = true;
                session.quality = value.parse().ok();
            }
            KEY_FPS if !seen_fps => {
                seen_fps = true;
                session.fps = parse_fps(&value);
            }
            KEY_OPTIMIZATIONS if !seen_optimizations => {
                seen_optimizations = true;
                session.optimizations = parse_flag(&value);
            }
            _ => {}
        }
    }

    let experiment = experiment?;
    if experiment.trim().is_empty() {
        return None;
    }
    session.experiment_id = experiment;
    Some(session)
}

fn parse_fps(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(fps) = raw.parse::<u32>() {
        return Some(fps);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) {
        Some(value.trunc() as u32)
    } else {
        None
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::PerformanceLevel;
    use chrono::TimeZone;

    fn state(id: &str, fps: u32, quality: QualityLevel, optimizations: bool) -> ShareState {
        ShareState::new(
            id,
            PerformanceSettings {
                target_fps: fps,
                quality_level: quality,
                enable_optimizations: optimizations,
            },
            &DeviceCapabilities::default(),
        )
    }

    #[test]
    fn encodes_exact_parameters() {
        let url = generate_share_url(&state("webgl-1", 30, QualityLevel::Low, false));
        assert_eq!(
            url,
            "?experiment=webgl-1&quality=low&fps=30&optimizations=false"
        );
    }

    #[test]
    fn appends_to_base_url() {
        let s = state("webgl-1", 60, QualityLevel::High, true);
        assert_eq!(
            generate_share_url_with_base("https://example.com/playground", &s),
            "https://example.com/playground?experiment=webgl-1&quality=high&fps=60&optimizations=true"
        );
        assert_eq!(
            generate_share_url_with_base("https://example.com/playground?lang=en", &s),
            "https://example.com/playground?lang=en&experiment=webgl-1&quality=high&fps=60&optimizations=true"
        );
    }

    #[test]
    fn round_trips_settings() {
        for (fps, quality, optimizations) in [
            (30, QualityLevel::Low, false),
            (45, QualityLevel::Medium, true),
            (60, QualityLevel::High, true),
        ] {
            let original = state("design 2&co", fps, quality, optimizations);
            let parsed = parse_share_url(&generate_share_url_with_base(
                "https://example.com/playground",
                &original,
            ))
            .expect("parse generated url");
            assert_eq!(parsed.experiment_id, original.experiment_id);
            assert_eq!(parsed.fps, Some(original.settings.target_fps));
            assert_eq!(parsed.quality, Some(original.settings.quality_level));
            assert_eq!(
                parsed.optimizations,
                Some(original.settings.enable_optimizations)
            );
        }
    }

    #[test]
    fn keeps_whitespace_around_ids() {
        let original = state(" spaced ", 30, QualityLevel::Low, false);
        let url = generate_share_url(&original);
        let parsed = parse_share_url(&url).expect("parse generated url");
        assert_eq!(parsed.experiment_id, " spaced ");
        assert!(parse_share_url("?experiment=+%20+&fps=30").is_none());
    }

    #[test]
    fn parameter_order_does_not_matter() {
        let parsed =
            parse_share_url("optimizations=true&fps=45&experiment=webgl-4&quality=medium")
                .unwrap();
        assert_eq!(
            parsed,
            SharedSession {
                experiment_id: "webgl-4".into(),
                quality: Some(QualityLevel::Medium),
                fps: Some(45),
                optimizations: Some(true),
            }
        );
    }

    #[test]
    fn missing_experiment_is_rejected() {
        assert!(parse_share_url("?quality=high&fps=60").is_none());
        assert!(parse_share_url("https://example.com/playground?fps=60").is_none());
        assert!(parse_share_url("?experiment=&fps=60").is_none());
        assert!(parse_share_url("https://example.com/playground").is_none());
        assert!(parse_share_url("not a url").is_none());
        assert!(parse_share_url("http://[broken").is_none());
    }

    #[test]
    fn malformed_optional_fields_are_dropped() {
        let parsed =
            parse_share_url("?experiment=webgl-2&quality=ultra&fps=fast&optimizations=maybe")
                .unwrap();
        assert_eq!(
            parsed,
            SharedSession {
                experiment_id: "webgl-2".into(),
                ..SharedSession::default()
            }
        );
    }

    #[test]
    fn fractional_fps_is_truncated() {
        let parsed = parse_share_url("?experiment=a&fps=59.9&optimizations=0").unwrap();
        assert_eq!(parsed.fps, Some(59));
        assert_eq!(parsed.optimizations, Some(false));
        assert_eq!(parse_share_url("?experiment=a&fps=-5").unwrap().fps, None);
    }

    #[test]
    fn ignores_fragment_and_repeats() {
        let parsed = parse_share_url("?experiment=first&experiment=second&fps=30#top").unwrap();
        assert_eq!(parsed.experiment_id, "first");
        assert_eq!(parsed.fps, Some(30));
    }

    #[test]
    fn stamps_iso_timestamp_and_device_summary() {
        let caps = DeviceCapabilities {
            performance_level: PerformanceLevel::High,
            touch_support: true,
            ..DeviceCapabilities::default()
        };
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let state = ShareState::at(
            "design-1",
            PerformanceSettings {
                target_fps: 30,
                quality_level: QualityLevel::Low,
                enable_optimizations: false,
            },
            &caps,
            created,
        );
        assert_eq!(state.timestamp, "2024-03-01T12:30:00.000Z");
        assert_eq!(state.device_info.performance_level, PerformanceLevel::High);
        assert!(state.device_info.touch_support);
    }
}
