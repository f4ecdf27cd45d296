//! Baby profiles and vaccination schedules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::{BabyId, VaccineId};
use super::status::{Gender, VaccineStatus};
use super::upload::FileUpload;

/// One dose in a baby's vaccination schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccineRecord {
    pub id: VaccineId,
    pub name: String,
    /// Dose label, e.g. "1st dose".
    #[serde(default)]
    pub dose: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub given_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: VaccineStatus,
}

/// A baby profile owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baby {
    pub id: BabyId,
    pub name: String,
    pub dob: NaiveDate,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub birth_certificate: Option<String>,
    #[serde(default, alias = "vaccines")]
    pub vaccine_records: Vec<VaccineRecord>,
}

impl Baby {
    /// Doses that are due or missed, ordered by scheduled date.
    #[must_use]
    pub fn pending_vaccines(&self) -> Vec<&VaccineRecord> {
        let mut pending: Vec<_> = self
            .vaccine_records
            .iter()
            .filter(|v| matches!(v.status, VaccineStatus::Due | VaccineStatus::Missed))
            .collect();
        pending.sort_by_key(|v| v.scheduled_date);
        pending
    }
}

/// Fields for creating or updating a baby profile.
///
/// Sent as multipart because the image and birth certificate are files.
#[derive(Debug, Clone)]
pub struct BabyInput {
    pub name: String,
    pub dob: NaiveDate,
    pub gender: Option<Gender>,
    pub image: Option<FileUpload>,
    pub birth_certificate: Option<FileUpload>,
}

/// Body of the vaccine-date update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VaccineDateUpdate {
    /// Date the dose was given.
    pub given_date: NaiveDate,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_vaccines_sorted() {
        let baby: Baby = serde_json::from_str(
            r#"{"id":1,"name":"Ayan","dob":"2025-01-10","vaccines":[
                {"id":1,"name":"BCG","status":"given","scheduled_date":"2025-01-10"},
                {"id":2,"name":"OPV","status":"missed","scheduled_date":"2025-03-01"},
                {"id":3,"name":"PCV","status":"due","scheduled_date":"2025-02-01"}
            ]}"#,
        )
        .unwrap();

        let names: Vec<_> = baby
            .pending_vaccines()
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(names, vec!["PCV", "OPV"]);
    }
}
