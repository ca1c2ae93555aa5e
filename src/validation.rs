use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ApiError;
use crate::models::ClassPayload;

const INVALID_FIELDS: &str = "Invalid value provided for one of the fields";

pub fn validate_class_payload(payload: &ClassPayload) -> Result<(), ApiError> {
    let strings = [
        &payload.name,
        &payload.description,
        &payload.date,
        &payload.start_time,
        &payload.end_time,
        &payload.location,
        &payload.trainer,
    ];
    if strings.iter().any(|s| s.trim().is_empty()) || payload.capacity < 1 {
        return Err(ApiError::BadRequest(INVALID_FIELDS.into()));
    }
    if NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d").is_err()
        || NaiveTime::parse_from_str(&payload.start_time, "%H:%M").is_err()
        || NaiveTime::parse_from_str(&payload.end_time, "%H:%M").is_err()
    {
        return Err(ApiError::BadRequest(INVALID_FIELDS.into()));
    }
    Ok(())
}

pub fn validate_credentials(name: &str, email: &str, password: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() || password.is_empty() || email.trim().is_empty() {
        return Err(ApiError::BadRequest(INVALID_FIELDS.into()));
    }
    if !email.contains('@') {
        return Err(ApiError::BadRequest(INVALID_FIELDS.into()));
    }
    Ok(())
}

/// Booking stays open until `grace_minutes` past the class start.
pub fn booking_closed(
    date: &str,
    start_time: &str,
    grace_minutes: i64,
    now: NaiveDateTime,
) -> Result<bool, ApiError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| ApiError::Internal("Class has an invalid schedule".into()))?;
    let start = NaiveTime::parse_from_str(start_time, "%H:%M")
        .map_err(|_| ApiError::Internal("Class has an invalid schedule".into()))?;
    Ok(now > date.and_time(start) + Duration::minutes(grace_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ClassPayload {
        ClassPayload {
            name: "Yoga".to_string(),
            description: "A relaxing yoga class".to_string(),
            date: "2025-10-10".to_string(),
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            location: "Gym".to_string(),
            trainer: "Jane Doe".to_string(),
            capacity: 10,
        }
    }

    #[test]
    fn test_validate_class_payload() {
        assert!(validate_class_payload(&payload()).is_ok());

        let mut p = payload();
        p.name = "  ".to_string();
        assert!(validate_class_payload(&p).is_err());

        let mut p = payload();
        p.capacity = 0;
        assert!(validate_class_payload(&p).is_err());

        let mut p = payload();
        p.date = "10/10/2025".to_string();
        assert!(validate_class_payload(&p).is_err());

        let mut p = payload();
        p.start_time = "ten".to_string();
        assert!(validate_class_payload(&p).is_err());
    }

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("Jane", "jane@example.com", "pw").is_ok());
        assert!(validate_credentials("", "jane@example.com", "pw").is_err());
        assert!(validate_credentials("Jane", "not-an-email", "pw").is_err());
        assert!(validate_credentials("Jane", "jane@example.com", "").is_err());
    }

    #[test]
    fn test_booking_closed() {
        let now = NaiveDate::from_ymd_opt(2025, 10, 10)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap();
        // Within the 30-minute grace window
        assert!(!booking_closed("2025-10-10", "10:00", 30, now).unwrap());
        // Before class start
        assert!(!booking_closed("2025-10-10", "12:00", 30, now).unwrap());
        // Past the window
        assert!(booking_closed("2025-10-10", "09:00", 30, now).unwrap());
        // Previous day
        assert!(booking_closed("2025-10-09", "10:00", 30, now).unwrap());

        assert!(booking_closed("garbage", "10:00", 30, now).is_err());
        assert!(booking_closed("2025-10-10", "garbage", 30, now).is_err());
    }
}
