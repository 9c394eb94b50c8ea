use std::fs;

use clinic_cli::{ClinicStore, DataPaths, JournalStatus};
use clinic_core::{parse_timestamp, Clinic, FixedClock, NewPatient, PatientChanges};

fn clinic_at(ts: &str) -> Clinic {
    Clinic::with_clock(FixedClock(parse_timestamp(ts).expect("timestamp")))
}

fn seeded(paths: &DataPaths) -> (Clinic, ClinicStore) {
    let store = ClinicStore::new(paths.clone());
    let mut clinic = clinic_at("2026-03-02 08:15:00");
    clinic
        .register(NewPatient::new("Ada", 30, "flu", "Lee"))
        .expect("register ada");
    clinic
        .register(NewPatient::new("Bob, Jr.", 41, "sprain", "Kim"))
        .expect("register bob");
    clinic
        .register(NewPatient::new("Cy", 52, "gout", "Lee"))
        .expect("register cy");
    clinic.schedule(3).expect("schedule cy");
    clinic.schedule(1).expect("schedule ada");
    (clinic, store)
}

#[test]
fn save_then_load_preserves_order_fields_and_queue() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DataPaths::in_dir(dir.path().join("data"));
    let (clinic, store) = seeded(&paths);
    store.save(&clinic).expect("save");

    let mut loaded = Clinic::new();
    let report = store.load(&mut loaded).expect("load");

    assert_eq!(report.patients, 3);
    assert_eq!(report.appointments, 2);
    assert_eq!(loaded.patients(), clinic.patients());
    assert_eq!(loaded.queue().to_ordered_list(), vec![3, 1]);
    assert_eq!(
        loaded.find(2).expect("bob").registered_at_display(),
        "2026-03-02 08:15:00"
    );
    let lee: Vec<_> = loaded.search_by_doctor("Lee").iter().map(|p| p.id).collect();
    assert_eq!(lee, vec![1, 3]);
    assert!(loaded.consistency_issues().is_empty());
}

#[test]
fn patients_table_uses_the_documented_header() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DataPaths::in_dir(dir.path());
    let (clinic, store) = seeded(&paths);
    store.save(&clinic).expect("save");

    let patients = fs::read_to_string(&paths.patients).expect("read patients");
    let mut lines = patients.lines();
    assert_eq!(
        lines.next(),
        Some("patient_id,name,age,disease,doctor,registered_at")
    );
    assert_eq!(
        lines.next(),
        Some("1,Ada,30,flu,Lee,2026-03-02 08:15:00")
    );
    assert!(patients.contains("\"Bob, Jr.\""));

    let appointments = fs::read_to_string(&paths.appointments).expect("read appointments");
    assert_eq!(appointments.lines().collect::<Vec<_>>(), vec!["patient_id", "3", "1"]);
}

#[test]
fn missing_files_load_as_empty_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ClinicStore::new(DataPaths::in_dir(dir.path().join("absent")));

    let mut clinic = Clinic::new();
    let report = store.load(&mut clinic).expect("load");

    assert_eq!(report.patients, 0);
    assert_eq!(report.appointments, 0);
    assert_eq!(report.journal, JournalStatus::Missing);
    assert!(clinic.patients().is_empty());
    assert!(clinic.queue().is_empty());
}

#[test]
fn invalid_row_fails_load_without_touching_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DataPaths::in_dir(dir.path());
    fs::write(
        &paths.patients,
        "patient_id,name,age,disease,doctor,registered_at\n1,Ada,0,flu,Lee,2026-03-02 08:15:00\n",
    )
    .expect("write patients");
    let store = ClinicStore::new(paths);

    let mut clinic = clinic_at("2026-03-02 09:00:00");
    clinic
        .register(NewPatient::new("Keep", 20, "cold", "Ng"))
        .expect("register");

    assert!(store.load(&mut clinic).is_err());
    assert_eq!(clinic.patients().len(), 1);
    assert_eq!(clinic.patients()[0].name, "Keep");
}

#[test]
fn journal_carries_undo_across_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DataPaths::in_dir(dir.path());
    let (mut clinic, store) = seeded(&paths);
    clinic.delete(1).expect("delete ada");
    store.save(&clinic).expect("save");

    let mut next_session = Clinic::new();
    let report = store.load(&mut next_session).expect("load");
    assert_eq!(report.journal, JournalStatus::Restored);
    assert_eq!(report.undo_depth, clinic.undo_depth());

    next_session.undo().expect("undo delete");
    let ids: Vec<_> = next_session.patients().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    let lee: Vec<_> = next_session
        .search_by_doctor("Lee")
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(lee, vec![1, 3]);
}

#[test]
fn stale_journal_is_discarded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DataPaths::in_dir(dir.path());
    let (mut clinic, store) = seeded(&paths);
    clinic
        .update(2, &PatientChanges::default().doctor("Lee"))
        .expect("update");
    store.save(&clinic).expect("save");

    let edited = fs::read_to_string(&paths.patients)
        .expect("read patients")
        .replace("Ada", "Adah");
    fs::write(&paths.patients, edited).expect("edit patients");

    let mut next_session = Clinic::new();
    let report = store.load(&mut next_session).expect("load");

    assert_eq!(report.journal, JournalStatus::DiscardedStale);
    assert_eq!(next_session.undo_depth(), 0);
    assert_eq!(next_session.find(1).expect("ada").name, "Adah");
}

#[test]
fn ensure_data_files_writes_header_only_tables_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DataPaths::in_dir(dir.path().join("data"));
    let store = ClinicStore::new(paths.clone());

    let created = store.ensure_data_files().expect("first");
    assert_eq!(created.len(), 2);
    assert_eq!(
        fs::read_to_string(&paths.appointments).expect("read").trim(),
        "patient_id"
    );
    assert!(store.ensure_data_files().expect("second").is_empty());
}

#[test]
fn deleted_highest_id_stays_spent_across_sessions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DataPaths::in_dir(dir.path());
    let (mut clinic, store) = seeded(&paths);
    clinic.delete(3).expect("delete cy");
    store.save(&clinic).expect("save");

    let mut next_session = clinic_at("2026-03-03 10:00:00");
    store.load(&mut next_session).expect("load");
    let dee = next_session
        .register(NewPatient::new("Dee", 28, "cough", "Kim"))
        .expect("register dee");
    assert_eq!(dee.id, 4);

    let head = next_session.serve().expect("serve queued cy");
    assert_eq!(head.patient_id, 3);
    assert!(head.patient.is_none());
}

#[test]
fn high_water_survives_undone_register_and_stale_journal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DataPaths::in_dir(dir.path());
    let (mut clinic, store) = seeded(&paths);
    clinic
        .register(NewPatient::new("Dee", 28, "cough", "Kim"))
        .expect("register dee");
    clinic.undo().expect("undo register");
    store.save(&clinic).expect("save");

    let edited = fs::read_to_string(&paths.patients)
        .expect("read patients")
        .replace("flu", "influenza");
    fs::write(&paths.patients, edited).expect("edit patients");

    let mut next_session = Clinic::new();
    let report = store.load(&mut next_session).expect("load");
    assert_eq!(report.journal, JournalStatus::DiscardedStale);
    assert_eq!(next_session.id_high_water(), 4);
}

#[test]
fn journal_entry_that_no_longer_applies_is_dropped_on_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DataPaths::in_dir(dir.path());
    let (clinic, store) = seeded(&paths);
    store.save(&clinic).expect("save");

    let mut lines: Vec<String> = fs::read_to_string(&paths.undo_journal)
        .expect("read journal")
        .lines()
        .map(str::to_string)
        .collect();
    let ghost = lines[1].replace("\"id\":1", "\"id\":42");
    lines.insert(2, ghost);
    fs::write(&paths.undo_journal, lines.join("\n") + "\n").expect("edit journal");

    let mut next_session = Clinic::new();
    let report = store.load(&mut next_session).expect("load");

    assert_eq!(report.journal, JournalStatus::Restored);
    assert_eq!(report.undo_dropped, 2);
    assert_eq!(report.undo_depth, clinic.undo_depth() - 1);
    for _ in 0..report.undo_depth {
        next_session.undo().expect("remaining history applies");
    }
    assert_eq!(next_session.patients().iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
}
