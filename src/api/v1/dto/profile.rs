/*
 * Responsibility
 * - Profile の request DTO
 * - validation (形式チェック) は field error の「リスト」を返す
 */
use serde::Deserialize;

use crate::error::FieldError;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone_no: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
}

impl UpdateProfileRequest {
    /// Collect every failed field; callers relay the whole list.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if let Some(name) = &self.full_name
            && name.trim().is_empty()
        {
            errors.push(FieldError::new("full_name", "full_name cannot be empty"));
        }

        if let Some(phone) = &self.phone_no
            && !phone.is_empty()
            && !phone.starts_with('+')
        {
            errors.push(FieldError::new(
                "phone_no",
                "phone_no must be in international format",
            ));
        }

        if let Some(gender) = &self.gender
            && !matches!(gender.as_str(), "male" | "female" | "other")
        {
            errors.push(FieldError::new(
                "gender",
                "gender must be one of male, female, other",
            ));
        }

        if let Some(dob) = &self.dob
            && chrono::NaiveDate::parse_from_str(dob, "%Y-%m-%d").is_err()
        {
            errors.push(FieldError::new("dob", "dob must be YYYY-MM-DD"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_request_has_no_errors() {
        let req = UpdateProfileRequest {
            full_name: Some("Asha Rao".into()),
            phone_no: Some("+910000000000".into()),
            gender: Some("female".into()),
            dob: Some("1990-04-02".into()),
        };
        assert!(req.validate().is_empty());
    }

    #[test]
    fn all_failures_are_reported_together() {
        let req = UpdateProfileRequest {
            full_name: Some("  ".into()),
            phone_no: Some("0123".into()),
            gender: Some("unknown".into()),
            dob: Some("02-04-1990".into()),
        };

        let errors = req.validate();
        assert_eq!(errors.len(), 4);
        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["full_name", "phone_no", "gender", "dob"]);
    }
}
