use clinic_core::{Patient, ServedAppointment};

pub fn patient_line(patient: &Patient) -> String {
    format!(
        "ID: {} | Name: {} | Age: {} | Disease: {} | Doctor: {} | Registered: {}",
        patient.id,
        patient.name,
        patient.age,
        patient.disease,
        patient.doctor,
        patient.registered_at_display()
    )
}

/// Search results omit the doctor, which the caller already knows.
pub fn doctor_patient_line(patient: &Patient) -> String {
    format!(
        "ID: {} | Name: {} | Age: {} | Disease: {} | Registered: {}",
        patient.id,
        patient.name,
        patient.age,
        patient.disease,
        patient.registered_at_display()
    )
}

pub fn appointment_line(appointment: &ServedAppointment) -> String {
    match &appointment.patient {
        Some(patient) => format!(
            "{} (ID {}), Doctor: {}",
            patient.name, appointment.patient_id, patient.doctor
        ),
        None => format!(
            "Patient ID {} not found in records",
            appointment.patient_id
        ),
    }
}

pub fn patient_json(patient: &Patient) -> serde_json::Value {
    serde_json::json!({
        "patient_id": patient.id,
        "name": patient.name,
        "age": patient.age,
        "disease": patient.disease,
        "doctor": patient.doctor,
        "registered_at": patient.registered_at_display(),
    })
}

/// Bill totals always show cents.
pub fn money(total: f64) -> String {
    format!("{:.2}", total)
}
