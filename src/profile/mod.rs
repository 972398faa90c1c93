//! Profile form validation and persistence.

use crate::error::{CareError, FieldError, ValidationError};
use crate::pipeline::validate::{collect_user_id, optional_str, required_str};
use crate::pipeline::{RawFields, UserId};
use crate::store::{ProfileStore, UserProfile};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

pub const FULL_NAME_FIELD: &str = "fullName";
pub const DOB_FIELD: &str = "dob";
pub const PHONE_FIELD: &str = "phone";

const MIN_FULL_NAME_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileForm {
    pub user_id: UserId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: Option<String>,
}

/// Accepts `YYYY-MM-DD`, or a full RFC 3339 timestamp whose date part is used.
fn parse_dob(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn check_full_name(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_FULL_NAME_CHARS {
        return Err(FieldError::new(
            FULL_NAME_FIELD,
            format!("must be at least {MIN_FULL_NAME_CHARS} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

fn check_dob(raw: &str, today: NaiveDate) -> Result<NaiveDate, FieldError> {
    let date = parse_dob(raw)
        .ok_or_else(|| FieldError::new(DOB_FIELD, "must be a date in YYYY-MM-DD format"))?;
    if date > today {
        return Err(FieldError::new(DOB_FIELD, "must not be in the future"));
    }
    Ok(date)
}

/// Validate a profile form against `today`. Every offending field is reported.
pub fn validate_profile(fields: &RawFields, today: NaiveDate) -> Result<ProfileForm, ValidationError> {
    let mut errors = Vec::new();

    let user_id = collect_user_id(fields, &mut errors);
    let full_name = required_str(fields, FULL_NAME_FIELD, &mut errors)
        .and_then(|raw| check_full_name(raw).map_err(|e| errors.push(e)).ok());
    let date_of_birth = required_str(fields, DOB_FIELD, &mut errors)
        .and_then(|raw| check_dob(raw, today).map_err(|e| errors.push(e)).ok());
    let phone = optional_str(fields, PHONE_FIELD, &mut errors)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from);

    match (user_id, full_name, date_of_birth) {
        (Some(user_id), Some(full_name), Some(date_of_birth)) if errors.is_empty() => {
            Ok(ProfileForm {
                user_id,
                full_name,
                date_of_birth,
                phone,
            })
        }
        _ => Err(ValidationError { fields: errors }),
    }
}

pub struct ProfileService {
    profiles: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    /// Validate and upsert; the stored profile is returned.
    pub async fn save(&self, fields: &RawFields) -> Result<UserProfile, CareError> {
        let form = validate_profile(fields, Utc::now().date_naive())?;
        let profile = UserProfile {
            user_id: form.user_id.as_str().to_string(),
            full_name: form.full_name,
            date_of_birth: form.date_of_birth,
            phone: form.phone,
            updated_at: Utc::now(),
        };
        self.profiles.upsert_profile(&profile).await?;
        tracing::info!(user_id = %form.user_id, "profile saved");
        Ok(profile)
    }

    pub async fn load(&self, user_id: &UserId) -> Result<Option<UserProfile>, CareError> {
        Ok(self.profiles.load_profile(user_id.as_str()).await?)
    }
}
