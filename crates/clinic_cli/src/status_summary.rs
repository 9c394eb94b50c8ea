use std::path::PathBuf;

use clinic_core::{Clinic, PatientId};
use serde::{Deserialize, Serialize};

use super::config::DataPaths;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextAppointmentSummary {
    pub patient_id: PatientId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicStatus {
    pub data_dir: PathBuf,
    pub patients_total: usize,
    pub doctors_total: usize,
    pub appointments_total: usize,
    pub undo_depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_undo_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_appointment: Option<NextAppointmentSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consistency_issues: Vec<String>,
}

pub fn summarize_clinic(clinic: &Clinic, paths: &DataPaths) -> ClinicStatus {
    let next_appointment = clinic.next_appointment().ok().map(|next| {
        NextAppointmentSummary {
            patient_id: next.patient_id,
            name: next.patient.as_ref().map(|p| p.name.clone()),
            doctor: next.patient.as_ref().map(|p| p.doctor.clone()),
        }
    });

    ClinicStatus {
        data_dir: paths.dir.clone(),
        patients_total: clinic.patients().len(),
        doctors_total: clinic.doctors().len(),
        appointments_total: clinic.queue().len(),
        undo_depth: clinic.undo_depth(),
        latest_undo_action: clinic
            .undo_actions()
            .last()
            .map(|action| format!("{}:{}", action.tag(), action.patient_id())),
        next_appointment,
        consistency_issues: clinic.consistency_issues(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::{parse_timestamp, FixedClock, NewPatient};

    #[test]
    fn summary_reports_counts_and_queue_head() {
        let mut clinic = Clinic::with_clock(FixedClock(
            parse_timestamp("2026-06-01 10:00:00").expect("timestamp"),
        ));
        clinic
            .register(NewPatient::new("Ada", 30, "flu", "Lee"))
            .expect("register");
        clinic
            .register(NewPatient::new("Bob", 44, "gout", "Kim"))
            .expect("register");
        clinic.schedule(2).expect("schedule");

        let status = summarize_clinic(&clinic, &DataPaths::in_dir("data"));

        assert_eq!(status.patients_total, 2);
        assert_eq!(status.doctors_total, 2);
        assert_eq!(status.appointments_total, 1);
        assert_eq!(status.undo_depth, 3);
        assert_eq!(status.latest_undo_action.as_deref(), Some("appointment_add:2"));
        let next = status.next_appointment.expect("next appointment");
        assert_eq!(next.name.as_deref(), Some("Bob"));
        assert!(status.consistency_issues.is_empty());
    }

    #[test]
    fn empty_clinic_has_no_queue_head() {
        let status = summarize_clinic(&Clinic::new(), &DataPaths::in_dir("data"));
        assert_eq!(status.patients_total, 0);
        assert!(status.next_appointment.is_none());
        assert!(status.latest_undo_action.is_none());
    }
}
