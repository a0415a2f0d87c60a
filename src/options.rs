//! User-chosen conversion options and their validation.
//!
//! Clients send options as loose strings (multipart form fields, CLI flags).
//! [`OptionsForm`] holds them exactly as received; [`ConversionOptions::from_form`]
//! is the single place that turns them into typed, validated options. The
//! orchestrator calls it in the `validating` state so a bad option fails the
//! job before any extraction stage runs.

use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who the deck is for. Only changes slide phrasing, never content order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudienceLevel {
    Novice,
    #[default]
    General,
    Expert,
}

impl AudienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudienceLevel::Novice => "novice",
            AudienceLevel::General => "general",
            AudienceLevel::Expert => "expert",
        }
    }
}

impl FromStr for AudienceLevel {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "novice" => Ok(AudienceLevel::Novice),
            "general" => Ok(AudienceLevel::General),
            "expert" => Ok(AudienceLevel::Expert),
            other => Err(ConversionError::validation(format!(
                "Unrecognised audience level '{other}'. Expected novice, general or expert"
            ))),
        }
    }
}

impl fmt::Display for AudienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long the deck should be. Selects a row of the segmentation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl TargetLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetLength::Short => "short",
            TargetLength::Medium => "medium",
            TargetLength::Long => "long",
        }
    }
}

impl FromStr for TargetLength {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(TargetLength::Short),
            "medium" => Ok(TargetLength::Medium),
            "long" => Ok(TargetLength::Long),
            other => Err(ConversionError::validation(format!(
                "Unrecognised length '{other}'. Expected short, medium or long"
            ))),
        }
    }
}

impl fmt::Display for TargetLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated options for one job. Immutable once the job starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    pub audience_level: AudienceLevel,
    pub target_length: TargetLength,
    pub include_summary: bool,
    pub include_appendix: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            audience_level: AudienceLevel::default(),
            target_length: TargetLength::default(),
            include_summary: true,
            include_appendix: false,
        }
    }
}

/// Options exactly as a client sent them; nothing is validated yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsForm {
    pub audience: Option<String>,
    pub length: Option<String>,
    pub summary: Option<String>,
    pub appendix: Option<String>,
}

impl From<ConversionOptions> for OptionsForm {
    fn from(o: ConversionOptions) -> Self {
        Self {
            audience: Some(o.audience_level.to_string()),
            length: Some(o.target_length.to_string()),
            summary: Some(o.include_summary.to_string()),
            appendix: Some(o.include_appendix.to_string()),
        }
    }
}

impl ConversionOptions {
    /// Validate a raw form.
    ///
    /// `audience` and `length` are required. The flags default to
    /// summary-on / appendix-off when absent.
    pub fn from_form(form: &OptionsForm) -> Result<Self, ConversionError> {
        let audience_level = match non_blank(&form.audience) {
            Some(v) => v.parse()?,
            None => return Err(ConversionError::validation("Missing audience level")),
        };
        let target_length = match non_blank(&form.length) {
            Some(v) => v.parse()?,
            None => return Err(ConversionError::validation("Missing presentation length")),
        };
        let include_summary = parse_flag("summary", non_blank(&form.summary), true)?;
        let include_appendix = parse_flag("appendix", non_blank(&form.appendix), false)?;

        Ok(Self {
            audience_level,
            target_length,
            include_summary,
            include_appendix,
        })
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_flag(name: &str, value: Option<&str>, default: bool) -> Result<bool, ConversionError> {
    let Some(v) = value else {
        return Ok(default);
    };
    match v.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(ConversionError::validation(format!(
            "Invalid value '{other}' for {name}; expected true or false"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(audience: Option<&str>, length: Option<&str>) -> OptionsForm {
        OptionsForm {
            audience: audience.map(String::from),
            length: length.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn valid_form_uses_flag_defaults() {
        let opts = ConversionOptions::from_form(&form(Some("Expert"), Some(" long "))).unwrap();
        assert_eq!(opts.audience_level, AudienceLevel::Expert);
        assert_eq!(opts.target_length, TargetLength::Long);
        assert!(opts.include_summary);
        assert!(!opts.include_appendix);
    }

    #[test]
    fn missing_audience_is_validation_error() {
        let err = ConversionOptions::from_form(&form(None, Some("short"))).unwrap_err();
        assert!(matches!(err, ConversionError::Validation { .. }));
        assert!(err.to_string().contains("audience"));
    }

    #[test]
    fn blank_length_counts_as_missing() {
        let err = ConversionOptions::from_form(&form(Some("novice"), Some("  "))).unwrap_err();
        assert!(err.to_string().contains("length"));
    }

    #[test]
    fn unknown_length_is_rejected() {
        let err = ConversionOptions::from_form(&form(Some("novice"), Some("epic"))).unwrap_err();
        assert!(err.to_string().contains("epic"));
    }

    #[test]
    fn flags_accept_html_checkbox_values() {
        let mut f = form(Some("general"), Some("medium"));
        f.summary = Some("off".into());
        f.appendix = Some("on".into());
        let opts = ConversionOptions::from_form(&f).unwrap();
        assert!(!opts.include_summary);
        assert!(opts.include_appendix);

        f.appendix = Some("maybe".into());
        assert!(ConversionOptions::from_form(&f).is_err());
    }

    #[test]
    fn default_options_survive_form_round_trip() {
        let form = OptionsForm::from(ConversionOptions::default());
        assert_eq!(
            ConversionOptions::from_form(&form).unwrap(),
            ConversionOptions::default()
        );
    }
}
