use std::io::{BufRead, Write};

use clinic_core::{
    parse_age, parse_amount, parse_patient_id, BillInput, Clinic, ClinicError, NewPatient,
    PatientChanges,
};

use super::display::{appointment_line, doctor_patient_line, money, patient_line};
use super::error::StoreError;
use super::store::ClinicStore;

const MENU: &str = "\n--- Patient Management System ---
1. Register Patient
2. View All Patients
3. Schedule Appointment
4. Next Appointment (serve)
5. Search Patients by Doctor
6. Update Patient
7. Delete Patient
8. Undo Last Action
9. Save Data
0. Exit";

/// Numbered console menu over one in-memory session. Undo history lives for
/// the whole session; `9` saves and `0` (or end of input) saves and exits.
pub struct Shell<'a, R, W> {
    clinic: &'a mut Clinic,
    store: &'a ClinicStore,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(clinic: &'a mut Clinic, store: &'a ClinicStore, input: R, output: W) -> Self {
        Self {
            clinic,
            store,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> Result<(), StoreError> {
        loop {
            self.say(MENU)?;
            let Some(choice) = self.prompt("Choice: ")? else {
                return self.exit();
            };
            match choice.as_str() {
                "1" => self.register()?,
                "2" => self.view_patients()?,
                "3" => self.schedule()?,
                "4" => self.serve()?,
                "5" => self.search()?,
                "6" => self.update()?,
                "7" => self.delete()?,
                "8" => self.undo()?,
                "9" => self.save()?,
                "0" => return self.exit(),
                _ => self.say("Invalid choice.")?,
            }
        }
    }

    fn register(&mut self) -> Result<(), StoreError> {
        let Some(name) = self.prompt("Enter patient name: ")? else {
            return Ok(());
        };
        let Some(age) = self.prompt("Enter age: ")? else {
            return Ok(());
        };
        let Some(disease) = self.prompt("Enter disease: ")? else {
            return Ok(());
        };
        let Some(doctor) = self.prompt("Enter assigned doctor: ")? else {
            return Ok(());
        };

        let result = parse_age(&age)
            .and_then(|age| self.clinic.register(NewPatient::new(name, age, disease, doctor)));
        match result {
            Ok(patient) => self.say(&format!("Patient registered with ID {}", patient.id)),
            Err(err) => self.say(&format!("Invalid input ({}). Registration cancelled.", err)),
        }
    }

    fn view_patients(&mut self) -> Result<(), StoreError> {
        if self.clinic.patients().is_empty() {
            return self.say("No patients registered.");
        }
        let lines: Vec<String> = self.clinic.patients().iter().map(patient_line).collect();
        self.say("\nAll Patients:")?;
        self.say(&"-".repeat(60))?;
        for line in lines {
            self.say(&line)?;
        }
        self.say(&"-".repeat(60))
    }

    fn schedule(&mut self) -> Result<(), StoreError> {
        let Some(raw) = self.prompt("Enter patient ID to schedule appointment: ")? else {
            return Ok(());
        };
        let result = parse_patient_id(&raw).and_then(|id| self.clinic.schedule(id));
        match result {
            Ok(patient) => self.say(&format!(
                "Appointment scheduled for {} (ID {})",
                patient.name, patient.id
            )),
            Err(err) => self.report(err),
        }
    }

    fn serve(&mut self) -> Result<(), StoreError> {
        let served = match self.clinic.serve() {
            Ok(served) => served,
            Err(ClinicError::QueueEmpty) => return self.say("No appointments."),
            Err(err) => return self.report(err),
        };
        if served.patient.is_none() {
            return self.say(&appointment_line(&served));
        }
        self.say(&format!("Next appointment: {}", appointment_line(&served)))?;

        let mut amounts = Vec::with_capacity(3);
        for (field, label) in [
            ("base", "Enter base fee for billing (or 0): "),
            ("tests", "Tests cost (or 0): "),
            ("meds", "Medicine cost (or 0): "),
        ] {
            let raw = self.prompt(label)?.unwrap_or_default();
            match parse_amount(field, &raw) {
                Ok(amount) => amounts.push(amount),
                Err(err) => return self.report(err),
            }
        }
        match BillInput::new(amounts[0], amounts[1], amounts[2]).total() {
            Ok(total) => self.say(&format!("Total bill: {}", money(total))),
            Err(err) => self.report(err),
        }
    }

    fn search(&mut self) -> Result<(), StoreError> {
        let Some(doctor) = self.prompt("Enter doctor's name to search patients: ")? else {
            return Ok(());
        };
        let results = self.clinic.search_by_doctor(&doctor);
        if results.is_empty() {
            return self.say("No patients found for this doctor.");
        }
        self.say(&format!("Patients under Dr. {}:", doctor.trim()))?;
        for patient in &results {
            self.say(&doctor_patient_line(patient))?;
        }
        Ok(())
    }

    fn update(&mut self) -> Result<(), StoreError> {
        let Some(raw) = self.prompt("Enter patient ID to update: ")? else {
            return Ok(());
        };
        let id = match parse_patient_id(&raw) {
            Ok(id) => id,
            Err(err) => return self.report(err),
        };
        let Some(current) = self.clinic.find(id).cloned() else {
            return self.report(ClinicError::PatientNotFound(id));
        };

        self.say("Press enter to keep current value.")?;
        let name = self.prompt(&format!("Name [{}]: ", current.name))?;
        let age = self.prompt(&format!("Age [{}]: ", current.age))?;
        let disease = self.prompt(&format!("Disease [{}]: ", current.disease))?;
        let doctor = self.prompt(&format!("Doctor [{}]: ", current.doctor))?;

        let age = match age.filter(|raw| !raw.is_empty()) {
            Some(raw) => match parse_age(&raw) {
                Ok(age) => Some(age),
                Err(err) => return self.report(err),
            },
            None => None,
        };
        let changes = PatientChanges {
            name: name.filter(|v| !v.is_empty()),
            age,
            disease: disease.filter(|v| !v.is_empty()),
            doctor: doctor.filter(|v| !v.is_empty()),
        };
        match self.clinic.update(id, &changes) {
            Ok(_) => self.say("Patient updated."),
            Err(err) => self.report(err),
        }
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        let Some(raw) = self.prompt("Enter patient ID to delete: ")? else {
            return Ok(());
        };
        let result = parse_patient_id(&raw).and_then(|id| self.clinic.delete(id));
        match result {
            Ok(patient) => self.say(&format!("Patient ID {} deleted.", patient.id)),
            Err(err) => self.report(err),
        }
    }

    fn undo(&mut self) -> Result<(), StoreError> {
        match self.clinic.undo() {
            Ok(outcome) => self.say(&format!("Undo: {}", outcome.describe())),
            Err(ClinicError::NothingToUndo) => self.say("Nothing to undo."),
            Err(err) => self.report(err),
        }
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.store.save(&*self.clinic)?;
        self.say("Data saved to disk.")
    }

    fn exit(&mut self) -> Result<(), StoreError> {
        self.save()?;
        self.say("Goodbye.")
    }

    fn report(&mut self, err: ClinicError) -> Result<(), StoreError> {
        self.say(&format!("Error: {}", err))
    }

    fn say(&mut self, line: &str) -> Result<(), StoreError> {
        writeln!(self.output, "{}", line).map_err(|err| StoreError::Io(err.to_string()))
    }

    /// Trimmed line, or `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>, StoreError> {
        write!(self.output, "{}", label).map_err(|err| StoreError::Io(err.to_string()))?;
        self.output
            .flush()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|err| StoreError::Io(err.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
