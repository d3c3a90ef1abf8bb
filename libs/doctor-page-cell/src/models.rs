// libs/doctor-page-cell/src/models.rs
use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ==============================================================================
// BACKEND RESOURCES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<Scalar>,
    /// Specialty as the backend names it.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub spec: Option<Scalar>,
    /// Base64 encoded JPEG.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub pic: Option<Scalar>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DoctorProfile {
    fn pic_str(&self) -> Option<&str> {
        self.pic.as_ref().and_then(Scalar::as_str).filter(|p| !p.is_empty())
    }

    pub fn has_picture(&self) -> bool {
        self.pic_str().is_some()
    }

    pub fn picture_bytes(&self) -> Result<Option<Vec<u8>>, base64::DecodeError> {
        match self.pic_str() {
            Some(pic) => BASE64.decode(pic.trim()).map(Some),
            None => Ok(None),
        }
    }

    pub fn picture_data_uri(&self) -> Option<String> {
        self.pic_str().map(|p| format!("data:image/jpeg;base64,{}", p))
    }
}

/// Deserializes a field that is present in the payload, so an explicit `null`
/// becomes `Some(Scalar::Null)` while a missing key stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A backend value shown as-is. Anything that is not a string or a number is
/// kept verbatim and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Number(serde_json::Number),
    Text(String),
    Other(Value),
}

impl Scalar {
    pub fn text(value: impl Into<String>) -> Self {
        Scalar::Text(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{}", s),
            Scalar::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Appointment status. The set is open; only the two canonical values get names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentStatus(pub String);

impl AppointmentStatus {
    pub const PENDING: &'static str = "pending";
    pub const SUCCESSFUL: &'static str = "successful";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn pending() -> Self {
        Self::new(Self::PENDING)
    }

    pub fn successful() -> Self {
        Self::new(Self::SUCCESSFUL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An appointment exactly as the backend sent it. Every field but `_id` is
/// optional and keeps its JSON shape, explicit nulls included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<Scalar>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub patient_contact_no: Option<Scalar>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub patient_email: Option<Scalar>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub appno: Option<Scalar>,
    /// Requested date.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub date: Option<Scalar>,
    /// Preferred time of day.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub day: Option<Scalar>,
    /// Confirmed time.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub time: Option<Scalar>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub msg: Option<Scalar>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub purpose: Option<Scalar>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub status: Option<Scalar>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub age: Option<Scalar>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Appointment {
    /// The status as displayed. Missing or null renders as an empty status.
    pub fn status(&self) -> AppointmentStatus {
        self.status
            .as_ref()
            .map(|s| AppointmentStatus::new(s.to_string()))
            .unwrap_or_default()
    }

    pub fn set_status(&mut self, status: &AppointmentStatus) {
        self.status = Some(Scalar::text(status.as_str()));
    }

    /// Collapsed row header: patient name and status.
    pub fn summary(&self) -> AppointmentSummary {
        AppointmentSummary {
            patient_name: self.patient_name.as_ref().map(Scalar::to_string).unwrap_or_default(),
            status: self.status(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentSummary {
    pub patient_name: String,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

// ==============================================================================
// INLINE EDITOR INPUT
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentField {
    /// `appno`, a numeric input.
    AppointmentNumber,
    /// `date`, `YYYY-MM-DD`.
    Date,
    /// `time`, `HH:MM` with optional seconds.
    Time,
    /// `msg`, free text.
    Message,
}

impl fmt::Display for AppointmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentField::AppointmentNumber => write!(f, "appno"),
            AppointmentField::Date => write!(f, "date"),
            AppointmentField::Time => write!(f, "time"),
            AppointmentField::Message => write!(f, "msg"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEdit {
    pub field: AppointmentField,
    pub value: String,
}

impl FieldEdit {
    pub fn new(field: AppointmentField, value: impl Into<String>) -> Self {
        Self { field, value: value.into() }
    }

    /// Checks the raw input against the field's input type. An empty value clears
    /// the field, like an emptied form input.
    pub fn validate(&self) -> Result<(), String> {
        let value = self.value.trim();
        if value.is_empty() {
            return Ok(());
        }

        match self.field {
            AppointmentField::AppointmentNumber => value
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(|_| ())
                .ok_or_else(|| format!("'{}' is not a number", value)),
            AppointmentField::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|e| format!("'{}' is not a YYYY-MM-DD date: {}", value, e)),
            AppointmentField::Time => NaiveTime::parse_from_str(value, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
                .map(|_| ())
                .map_err(|e| format!("'{}' is not a HH:MM time: {}", value, e)),
            AppointmentField::Message => Ok(()),
        }
    }

    /// Writes the value into `appointment`. Call [`FieldEdit::validate`] first.
    /// An emptied input stores an empty string, as the form would submit it.
    pub fn apply_to(&self, appointment: &mut Appointment) {
        let value = self.value.trim();

        match self.field {
            AppointmentField::AppointmentNumber => {
                appointment.appno = Some(match value.parse::<serde_json::Number>() {
                    Ok(n) if !value.is_empty() => Scalar::Number(n),
                    _ => Scalar::text(value),
                });
            }
            AppointmentField::Date => appointment.date = Some(Scalar::text(value)),
            AppointmentField::Time => appointment.time = Some(Scalar::text(value)),
            // free text keeps its whitespace
            AppointmentField::Message => appointment.msg = Some(Scalar::text(self.value.as_str())),
        }
    }
}

// ==============================================================================
// VIEW STATE
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PageStatus {
    Idle,
    Loading,
    Ready,
    Failed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOperation {
    Load,
    ChangeStatus,
    SaveEdit,
    Delete,
}

impl fmt::Display for PageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageOperation::Load => write!(f, "load"),
            PageOperation::ChangeStatus => write!(f, "change status"),
            PageOperation::SaveEdit => write!(f, "save edit"),
            PageOperation::Delete => write!(f, "delete"),
        }
    }
}

/// The error banner shown after a failed action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionFailure {
    pub operation: PageOperation,
    pub appointment_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    Login,
    EditProfile,
}

impl Navigation {
    pub fn path(&self, doctor_id: &str) -> String {
        match self {
            Navigation::Login => "/login".to_string(),
            Navigation::EditProfile => format!("/edit/{}", doctor_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationLinks {
    pub logout: String,
    pub edit_profile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentRow {
    pub summary: AppointmentSummary,
    pub appointment: Appointment,
    /// The edit buffer, present only on the row being edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editing: Option<Appointment>,
    pub in_flight: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorPageView {
    pub doctor_id: String,
    pub status: PageStatus,
    pub profile: Option<DoctorProfile>,
    pub rows: Vec<AppointmentRow>,
    pub editing: Option<String>,
    pub last_failure: Option<ActionFailure>,
    pub links: NavigationLinks,
}
