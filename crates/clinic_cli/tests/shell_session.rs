use std::io::Cursor;

use clinic_cli::{ClinicStore, DataPaths, Shell};
use clinic_core::{parse_timestamp, Clinic, FixedClock};

fn run_script(store: &ClinicStore, clinic: &mut Clinic, script: &str) -> String {
    let mut output = Vec::new();
    Shell::new(clinic, store, Cursor::new(script.as_bytes().to_vec()), &mut output)
        .run()
        .expect("shell run");
    String::from_utf8(output).expect("utf8 output")
}

fn fixed_clinic() -> Clinic {
    Clinic::with_clock(FixedClock(
        parse_timestamp("2026-05-04 14:30:00").expect("timestamp"),
    ))
}

#[test]
fn scripted_session_registers_serves_bills_and_saves() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ClinicStore::new(DataPaths::in_dir(dir.path()));
    let mut clinic = fixed_clinic();

    let script = "1\nAda\n30\nflu\nLee\n\
                  1\nBob\n40\ncold\nLee\n\
                  3\n2\n\
                  4\n100\n20\n5\n\
                  5\nLee\n\
                  0\n";
    let out = run_script(&store, &mut clinic, script);

    assert!(out.contains("Patient registered with ID 1"));
    assert!(out.contains("Patient registered with ID 2"));
    assert!(out.contains("Appointment scheduled for Bob (ID 2)"));
    assert!(out.contains("Next appointment: Bob (ID 2), Doctor: Lee"));
    assert!(out.contains("Total bill: 125.00"));
    assert!(out.contains("Patients under Dr. Lee:"));
    assert!(out.contains("Data saved to disk."));
    assert!(out.trim_end().ends_with("Goodbye."));

    let mut reloaded = Clinic::new();
    store.load(&mut reloaded).expect("reload");
    assert_eq!(reloaded.patients().len(), 2);
    assert!(reloaded.queue().is_empty());
}

#[test]
fn invalid_age_cancels_registration() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ClinicStore::new(DataPaths::in_dir(dir.path()));
    let mut clinic = fixed_clinic();

    let out = run_script(&store, &mut clinic, "1\nAda\nthirty\nflu\nLee\n0\n");

    assert!(out.contains("Registration cancelled."));
    assert!(clinic.patients().is_empty());
}

#[test]
fn update_keeps_blank_fields_and_undo_reverts_within_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ClinicStore::new(DataPaths::in_dir(dir.path()));
    let mut clinic = fixed_clinic();

    let script = "1\nAda\n30\nflu\nLee\n\
                  6\n1\n\n31\n\nKim\n\
                  2\n\
                  8\n\
                  8\n\
                  8\n\
                  0\n";
    let out = run_script(&store, &mut clinic, script);

    assert!(out.contains("Patient updated."));
    assert!(out.contains("ID: 1 | Name: Ada | Age: 31 | Disease: flu | Doctor: Kim"));
    assert!(out.contains("Undo: reverted update for patient ID 1"));
    assert!(out.contains("Undo: removed patient ID 1"));
    assert!(out.contains("Nothing to undo."));
    assert!(clinic.patients().is_empty());
}

#[test]
fn serve_on_empty_queue_and_end_of_input_exit_cleanly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ClinicStore::new(DataPaths::in_dir(dir.path()));
    let mut clinic = fixed_clinic();

    let out = run_script(&store, &mut clinic, "4\n42\n");

    assert!(out.contains("No appointments."));
    assert!(out.contains("Invalid choice."));
    assert!(out.trim_end().ends_with("Goodbye."));
    assert!(store.paths().patients.exists());
}
