use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};

use shared_config::{AppConfig, SavePolicy};

pub struct TestConfig {
    pub backend_url: String,
    pub min_loading_delay_ms: u64,
    pub save_policy: SavePolicy,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5007".to_string(),
            min_loading_delay_ms: 0,
            save_policy: SavePolicy::AwaitConfirmation,
        }
    }
}

impl TestConfig {
    pub fn with_backend(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            backend_url: self.backend_url.clone(),
            min_loading_delay_ms: self.min_loading_delay_ms,
            request_timeout_secs: Some(5),
            save_policy: self.save_policy,
            port: 0,
        }
    }
}

pub struct MockDocereResponses;

impl MockDocereResponses {
    /// Raw bytes behind [`MockDocereResponses::doctor_profile_response`]'s picture.
    pub const PICTURE_BYTES: &'static [u8] = b"\xff\xd8\xff\xe0fake-jpeg";

    pub fn doctor_profile_response(doctor_id: &str) -> Value {
        json!({
            "_id": doctor_id,
            "name": "Dr. Nimal Perera",
            "spec": "Cardiology",
            "email": "nimal@docere.example",
            "pic": general_purpose::STANDARD.encode(Self::PICTURE_BYTES)
        })
    }

    pub fn doctor_without_picture(doctor_id: &str) -> Value {
        json!({
            "_id": doctor_id,
            "name": "Dr. Kamala Fernando",
            "spec": "Dermatology"
        })
    }

    pub fn appointment_response(appointment_id: &str, patient_name: &str, status: &str) -> Value {
        json!({
            "_id": appointment_id,
            "patientName": patient_name,
            "patientContactNo": "0712345678",
            "patientEmail": format!("{}@example.com", patient_name.to_lowercase()),
            "appno": 3,
            "date": "2024-06-12",
            "day": "Morning",
            "time": "09:30",
            "msg": "Follow-up visit",
            "purpose": "Chest pain review",
            "status": status,
            "age": 52,
            "doctorId": "d1"
        })
    }

    /// A row the way older records look: numeric contact number, no status,
    /// explicit nulls.
    pub fn legacy_appointment_response(appointment_id: &str, patient_name: &str) -> Value {
        json!({
            "_id": appointment_id,
            "patientName": patient_name,
            "patientContactNo": 771234567,
            "date": "2024-06-12",
            "time": null,
            "msg": null,
            "doctorId": "d1"
        })
    }

    pub fn appointments_response(rows: &[(&str, &str, &str)]) -> Value {
        Value::Array(
            rows.iter()
                .map(|(id, name, status)| Self::appointment_response(id, name, status))
                .collect(),
        )
    }

    pub fn error_response(message: &str) -> Value {
        json!({ "message": message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::with_backend("http://127.0.0.1:9999").to_app_config();

        assert_eq!(config.backend_url, "http://127.0.0.1:9999");
        assert_eq!(config.min_loading_delay_ms, 0);
        assert_eq!(config.save_policy, SavePolicy::AwaitConfirmation);
    }

    #[test]
    fn test_fixture_picture_is_base64() {
        let profile = MockDocereResponses::doctor_profile_response("d1");
        let decoded = general_purpose::STANDARD
            .decode(profile["pic"].as_str().unwrap())
            .unwrap();

        assert_eq!(decoded, MockDocereResponses::PICTURE_BYTES);
    }

    #[test]
    fn test_appointments_keep_order() {
        let rows = MockDocereResponses::appointments_response(&[("a1", "Jo", "pending"), ("a2", "Ann", "successful")]);
        let ids: Vec<_> = rows.as_array().unwrap().iter().map(|r| r["_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }
}
