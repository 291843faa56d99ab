// src/models/survey.rs

use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{drag::RankedToken, error::AppError};

pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_WEEKDAY_START: &str = "09:00";
pub const DEFAULT_WEEKDAY_END: &str = "22:00";
pub const DEFAULT_WEEKEND_START: &str = "10:00";
pub const DEFAULT_WEEKEND_END: &str = "20:00";

/// Static "about you" answers sent with every submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Survey {
    pub year: String,
    pub major: String,
    pub second_concentration: String,
    pub minor: String,

    /// Also the lookup key for saved preferences.
    #[validate(email(message = "Email address is not valid."))]
    pub email: String,
}

/// Scheduling preferences: timezone, work windows and the time-of-day ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    #[validate(length(min = 1, max = 64))]
    pub timezone: String,
    #[validate(custom(function = validate_clock_time))]
    pub weekday_start: String,
    #[validate(custom(function = validate_clock_time))]
    pub weekday_end: String,
    #[validate(custom(function = validate_clock_time))]
    pub weekend_start: String,
    #[validate(custom(function = validate_clock_time))]
    pub weekend_end: String,

    /// Filled from the ranking controller at submit time.
    pub time_ranking: Vec<RankedToken>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            weekday_start: DEFAULT_WEEKDAY_START.to_string(),
            weekday_end: DEFAULT_WEEKDAY_END.to_string(),
            weekend_start: DEFAULT_WEEKEND_START.to_string(),
            weekend_end: DEFAULT_WEEKEND_END.to_string(),
            time_ranking: Vec::new(),
        }
    }
}

impl Preferences {
    /// Copy with malformed entries replaced by their defaults.
    pub fn normalized(&self) -> Self {
        let pick = |value: &str, default: &str| {
            if parse_clock_time(value).is_some() {
                value.trim().to_string()
            } else {
                tracing::debug!("Replacing malformed time '{}' with {}", value, default);
                default.to_string()
            }
        };
        let timezone = if self.timezone.trim().is_empty() {
            DEFAULT_TIMEZONE.to_string()
        } else {
            self.timezone.trim().to_string()
        };
        Self {
            timezone,
            weekday_start: pick(&self.weekday_start, DEFAULT_WEEKDAY_START),
            weekday_end: pick(&self.weekday_end, DEFAULT_WEEKDAY_END),
            weekend_start: pick(&self.weekend_start, DEFAULT_WEEKEND_START),
            weekend_end: pick(&self.weekend_end, DEFAULT_WEEKEND_END),
            time_ranking: self.time_ranking.clone(),
        }
    }
}

pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

fn validate_clock_time(value: &str) -> Result<(), validator::ValidationError> {
    if parse_clock_time(value).is_none() {
        return Err(validator::ValidationError::new("time_must_be_hh_mm"));
    }
    Ok(())
}

/// Static (non-repeating) inputs of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyField {
    Year,
    Major,
    SecondConcentration,
    Minor,
    Email,
    Timezone,
    WeekdayStart,
    WeekdayEnd,
    WeekendStart,
    WeekendEnd,
}

impl FromStr for SurveyField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "year" => SurveyField::Year,
            "major" => SurveyField::Major,
            "second_concentration" | "secondConcentration" => SurveyField::SecondConcentration,
            "minor" => SurveyField::Minor,
            "email" => SurveyField::Email,
            "timezone" => SurveyField::Timezone,
            "weekday_start" | "weekdayStart" => SurveyField::WeekdayStart,
            "weekday_end" | "weekdayEnd" => SurveyField::WeekdayEnd,
            "weekend_start" | "weekendStart" => SurveyField::WeekendStart,
            "weekend_end" | "weekendEnd" => SurveyField::WeekendEnd,
            other => {
                return Err(AppError::BadRequest(format!("unknown survey field: {}", other)));
            }
        };
        Ok(field)
    }
}

/// Writes one static field into the survey or the preferences.
pub fn apply_field(survey: &mut Survey, preferences: &mut Preferences, field: SurveyField, value: String) {
    let slot = match field {
        SurveyField::Year => &mut survey.year,
        SurveyField::Major => &mut survey.major,
        SurveyField::SecondConcentration => &mut survey.second_concentration,
        SurveyField::Minor => &mut survey.minor,
        SurveyField::Email => &mut survey.email,
        SurveyField::Timezone => &mut preferences.timezone,
        SurveyField::WeekdayStart => &mut preferences.weekday_start,
        SurveyField::WeekdayEnd => &mut preferences.weekday_end,
        SurveyField::WeekendStart => &mut preferences.weekend_start,
        SurveyField::WeekendEnd => &mut preferences.weekend_end,
    };
    *slot = value;
}

/// Previously saved answers returned by the preferences lookup.
///
/// Accepts flat objects as well as objects nested under `survey` / `preferences`,
/// in camelCase or snake_case.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SavedPreferences {
    pub year: Option<String>,
    pub major: Option<String>,
    #[serde(alias = "secondConcentration")]
    pub second_concentration: Option<String>,
    pub minor: Option<String>,
    pub timezone: Option<String>,
    #[serde(alias = "weekdayStart")]
    pub weekday_start: Option<String>,
    #[serde(alias = "weekdayEnd")]
    pub weekday_end: Option<String>,
    #[serde(alias = "weekendStart")]
    pub weekend_start: Option<String>,
    #[serde(alias = "weekendEnd")]
    pub weekend_end: Option<String>,

    pub survey: Option<Box<SavedPreferences>>,
    pub preferences: Option<Box<SavedPreferences>>,
}

impl SavedPreferences {
    /// Saved (field, value) pairs with blank values skipped; nested objects win.
    pub fn entries(&self) -> Vec<(SurveyField, String)> {
        let mut out = Vec::new();
        let flat = [
            (SurveyField::Year, &self.year),
            (SurveyField::Major, &self.major),
            (SurveyField::SecondConcentration, &self.second_concentration),
            (SurveyField::Minor, &self.minor),
            (SurveyField::Timezone, &self.timezone),
            (SurveyField::WeekdayStart, &self.weekday_start),
            (SurveyField::WeekdayEnd, &self.weekday_end),
            (SurveyField::WeekendStart, &self.weekend_start),
            (SurveyField::WeekendEnd, &self.weekend_end),
        ];
        for (field, value) in flat {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                out.push((field, v.to_string()));
            }
        }
        for nested in [&self.survey, &self.preferences].into_iter().flatten() {
            out.extend(nested.entries());
        }
        out
    }
}
