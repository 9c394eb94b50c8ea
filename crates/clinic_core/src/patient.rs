use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ClinicError, ClinicResult};

pub type PatientId = u64;

/// Wire format of `registered_at` in rows, journals and CLI output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored patient. `id` and `registered_at` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub age: u32,
    pub disease: String,
    pub doctor: String,
    #[serde(with = "timestamp")]
    pub registered_at: NaiveDateTime,
}

impl Patient {
    pub fn registered_at_display(&self) -> String {
        format_timestamp(&self.registered_at)
    }

    /// Copy every mutable field from `snapshot`, keeping id and registration time.
    pub(crate) fn overwrite_from(&mut self, snapshot: &Patient) {
        self.name = snapshot.name.clone();
        self.age = snapshot.age;
        self.disease = snapshot.disease.clone();
        self.doctor = snapshot.doctor.clone();
    }

    pub(crate) fn apply(&mut self, changes: &ValidatedChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(age) = changes.age {
            self.age = age;
        }
        if let Some(disease) = &changes.disease {
            self.disease = disease.clone();
        }
        if let Some(doctor) = &changes.doctor {
            self.doctor = doctor.clone();
        }
    }
}

/// Caller input for `Clinic::register`. Age is signed so non-positive input
/// can be reported instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub name: String,
    pub age: i64,
    pub disease: String,
    pub doctor: String,
}

impl NewPatient {
    pub fn new(
        name: impl Into<String>,
        age: i64,
        disease: impl Into<String>,
        doctor: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age,
            disease: disease.into(),
            doctor: doctor.into(),
        }
    }

    pub(crate) fn into_patient(
        self,
        id: PatientId,
        registered_at: NaiveDateTime,
    ) -> ClinicResult<Patient> {
        Ok(Patient {
            id,
            name: required("name", &self.name)?,
            age: validate_age(self.age)?,
            disease: required("disease", &self.disease)?,
            doctor: required("doctor", &self.doctor)?,
            registered_at,
        })
    }
}

/// Partial update. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub disease: Option<String>,
    pub doctor: Option<String>,
}

impl PatientChanges {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn disease(mut self, disease: impl Into<String>) -> Self {
        self.disease = Some(disease.into());
        self
    }

    pub fn doctor(mut self, doctor: impl Into<String>) -> Self {
        self.doctor = Some(doctor.into());
        self
    }

    pub(crate) fn validate(&self) -> ClinicResult<ValidatedChanges> {
        Ok(ValidatedChanges {
            name: self.name.as_deref().map(|v| required("name", v)).transpose()?,
            age: self.age.map(validate_age).transpose()?,
            disease: self
                .disease
                .as_deref()
                .map(|v| required("disease", v))
                .transpose()?,
            doctor: self
                .doctor
                .as_deref()
                .map(|v| required("doctor", v))
                .transpose()?,
        })
    }
}

/// `PatientChanges` after trimming and range checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ValidatedChanges {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub disease: Option<String>,
    pub doctor: Option<String>,
}

pub(crate) fn required(field: &'static str, value: &str) -> ClinicResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClinicError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_age(age: i64) -> ClinicResult<u32> {
    if age <= 0 {
        return Err(ClinicError::NonPositiveAge(age));
    }
    u32::try_from(age).map_err(|_| ClinicError::MalformedNumber {
        field: "age",
        value: age.to_string(),
    })
}

/// Parse free-form age input (forms, prompts, CSV cells).
pub fn parse_age(raw: &str) -> ClinicResult<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClinicError::EmptyField("age"));
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| ClinicError::MalformedNumber {
            field: "age",
            value: trimmed.to_string(),
        })
}

pub fn parse_patient_id(raw: &str) -> ClinicResult<PatientId> {
    let trimmed = raw.trim();
    trimmed
        .parse::<PatientId>()
        .map_err(|_| ClinicError::MalformedNumber {
            field: "patient_id",
            value: trimmed.to_string(),
        })
}

pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> ClinicResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map_err(|_| ClinicError::MalformedTimestamp(raw.to_string()))
}

mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
