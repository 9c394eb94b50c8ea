use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use clinic_core::{
    parse_age, parse_amount, parse_patient_id, BillInput, Clinic, NewPatient, PatientChanges,
    ServedAppointment,
};

use clinic_cli::display::{
    appointment_line, doctor_patient_line, money, patient_json, patient_line,
};
use clinic_cli::{
    init_logging, init_project, resolve_config, summarize_clinic, ClinicConfig, ClinicStore,
    InitProjectInput, JournalStatus, Shell,
};

#[derive(Parser)]
#[command(name = "clinic", version, about = "Patient records, appointments and billing")]
struct Cli {
    /// Config file (default: clinic.toml in the current directory)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Data directory; overrides CLINIC_DATA_DIR and the config file
    #[arg(long, value_name = "PATH", global = true)]
    data_dir: Option<PathBuf>,

    /// Output JSON instead of key=value lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Init(InitArgs),
    Register(RegisterArgs),
    List,
    Show(IdArgs),
    Schedule(IdArgs),
    Next(BillArgs),
    Serve(BillArgs),
    Search(SearchArgs),
    Doctors,
    Update(UpdateArgs),
    Delete(IdArgs),
    Undo,
    Bill(BillArgs),
    Status,
    Shell,
}

#[derive(Parser)]
struct InitArgs {
    /// Root directory to initialize (default: current directory)
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,
}

#[derive(Parser)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long, allow_hyphen_values = true)]
    age: String,
    #[arg(long)]
    disease: String,
    #[arg(long)]
    doctor: String,
}

#[derive(Parser)]
struct IdArgs {
    #[arg(value_name = "ID")]
    id: String,
}

#[derive(Parser)]
struct SearchArgs {
    #[arg(value_name = "DOCTOR")]
    doctor: String,
}

/// Blank values keep the current field.
#[derive(Parser)]
struct UpdateArgs {
    #[arg(value_name = "ID")]
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    age: Option<String>,
    #[arg(long)]
    disease: Option<String>,
    #[arg(long)]
    doctor: Option<String>,
}

/// Amounts default to 0. `next` and `serve` only bill when `--base` is given.
#[derive(Parser)]
struct BillArgs {
    #[arg(long, allow_hyphen_values = true)]
    base: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    tests: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    meds: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    other: Option<String>,
}

impl BillArgs {
    fn input(&self) -> Result<Option<BillInput>, String> {
        let Some(base) = self.base.as_deref() else {
            return Ok(None);
        };
        let amount = |field: &'static str, raw: Option<&str>| {
            parse_amount(field, raw.unwrap_or("")).map_err(|err| err.to_string())
        };
        let input = BillInput::new(
            amount("base", Some(base))?,
            amount("tests", self.tests.as_deref())?,
            amount("meds", self.meds.as_deref())?,
        )
        .with_other(amount("other", self.other.as_deref())?);
        Ok(Some(input))
    }
}

/// Loaded session plus the store it came from.
struct Session {
    clinic: Clinic,
    store: ClinicStore,
}

impl Session {
    fn open(config: &ClinicConfig) -> Result<Self, String> {
        let store = ClinicStore::new(config.paths.clone());
        let mut clinic = Clinic::new();
        let report = store.load(&mut clinic).map_err(|err| err.to_string())?;
        if report.journal == JournalStatus::DiscardedStale {
            eprintln!("Warning: data files changed outside clinic; undo history discarded");
        }
        if report.undo_dropped > 0 {
            eprintln!(
                "Warning: {} undo entries no longer matched the data files and were dropped",
                report.undo_dropped
            );
        }
        Ok(Self { clinic, store })
    }

    fn save(&self) -> Result<(), String> {
        self.store
            .save(&self.clinic)
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}

fn main() {
    let cli = Cli::parse();
    let config = match resolve_config(cli.config.as_deref(), cli.data_dir.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    init_logging(&config.log_filter);

    let json = cli.json;
    let result = match cli.command {
        Commands::Init(args) => run_init(args, json),
        Commands::Register(args) => run_register(args, &config, json),
        Commands::List => run_list(&config, json),
        Commands::Show(args) => run_show(args, &config, json),
        Commands::Schedule(args) => run_schedule(args, &config, json),
        Commands::Next(args) => run_next(args, &config, json),
        Commands::Serve(args) => run_serve(args, &config, json),
        Commands::Search(args) => run_search(args, &config, json),
        Commands::Doctors => run_doctors(&config, json),
        Commands::Update(args) => run_update(args, &config, json),
        Commands::Delete(args) => run_delete(args, &config, json),
        Commands::Undo => run_undo(&config, json),
        Commands::Bill(args) => run_bill(args, json),
        Commands::Status => run_status(&config, json),
        Commands::Shell => run_shell(&config),
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|err| format!("json encode: {}", err))?;
    println!("{}", json);
    Ok(())
}

fn run_init(args: InitArgs, json: bool) -> Result<(), String> {
    let out = init_project(InitProjectInput {
        root: args.path.clone(),
    })
    .map_err(|err| err.to_string())?;

    if json {
        return print_json(&serde_json::json!({
            "root": out.root,
            "created": out.created,
            "existing": out.existing,
            "next": ["clinic register", "clinic status", "clinic shell"]
        }));
    }

    println!("init_root={}", out.root.display());
    println!("created={}", out.created.len());
    for item in &out.created {
        println!("created_item={}", item);
    }
    println!("existing={}", out.existing.len());
    for item in &out.existing {
        println!("existing_item={}", item);
    }
    Ok(())
}

fn run_register(args: RegisterArgs, config: &ClinicConfig, json: bool) -> Result<(), String> {
    let mut session = Session::open(config)?;
    let age = parse_age(&args.age).map_err(|err| err.to_string())?;
    let patient = session
        .clinic
        .register(NewPatient::new(args.name, age, args.disease, args.doctor))
        .map_err(|err| err.to_string())?;
    session.save()?;

    if json {
        return print_json(&patient_json(&patient));
    }
    println!("patient_id={}", patient.id);
    println!("registered_at={}", patient.registered_at_display());
    Ok(())
}

fn run_list(config: &ClinicConfig, json: bool) -> Result<(), String> {
    let session = Session::open(config)?;
    let patients = session.clinic.patients();

    if json {
        let rows: Vec<serde_json::Value> = patients.iter().map(patient_json).collect();
        return print_json(&serde_json::json!({ "patients": rows }));
    }
    println!("patients_total={}", patients.len());
    for patient in patients {
        println!("{}", patient_line(patient));
    }
    Ok(())
}

fn run_show(args: IdArgs, config: &ClinicConfig, json: bool) -> Result<(), String> {
    let session = Session::open(config)?;
    let id = parse_patient_id(&args.id).map_err(|err| err.to_string())?;
    let patient = session
        .clinic
        .find(id)
        .ok_or_else(|| clinic_core::ClinicError::PatientNotFound(id).to_string())?;

    if json {
        return print_json(&patient_json(patient));
    }
    println!("patient_id={}", patient.id);
    println!("name={}", patient.name);
    println!("age={}", patient.age);
    println!("disease={}", patient.disease);
    println!("doctor={}", patient.doctor);
    println!("registered_at={}", patient.registered_at_display());
    Ok(())
}

fn run_schedule(args: IdArgs, config: &ClinicConfig, json: bool) -> Result<(), String> {
    let mut session = Session::open(config)?;
    let id = parse_patient_id(&args.id).map_err(|err| err.to_string())?;
    let patient = session.clinic.schedule(id).map_err(|err| err.to_string())?;
    session.save()?;

    let queue_len = session.clinic.queue().len();
    if json {
        return print_json(&serde_json::json!({
            "scheduled": patient_json(&patient),
            "appointments_total": queue_len,
        }));
    }
    println!("scheduled_patient_id={}", patient.id);
    println!("appointments_total={}", queue_len);
    Ok(())
}

fn print_appointment(
    served: &ServedAppointment,
    bill: Option<BillInput>,
    json: bool,
) -> Result<(), String> {
    let total = match bill {
        Some(input) => Some(input.total().map_err(|err| err.to_string())?),
        None => None,
    };

    if json {
        return print_json(&serde_json::json!({
            "patient_id": served.patient_id,
            "patient": served.patient.as_ref().map(patient_json),
            "bill_total": total.map(money),
        }));
    }
    println!("patient_id={}", served.patient_id);
    println!("appointment={}", appointment_line(served));
    if let Some(total) = total {
        println!("bill_total={}", money(total));
    }
    Ok(())
}

fn run_next(args: BillArgs, config: &ClinicConfig, json: bool) -> Result<(), String> {
    let bill = args.input()?;
    let session = Session::open(config)?;
    let next = session
        .clinic
        .next_appointment()
        .map_err(|err| err.to_string())?;
    print_appointment(&next, bill, json)
}

fn run_serve(args: BillArgs, config: &ClinicConfig, json: bool) -> Result<(), String> {
    let bill = args.input()?;
    let mut session = Session::open(config)?;
    let served = session.clinic.serve().map_err(|err| err.to_string())?;
    session.save()?;
    print_appointment(&served, bill, json)
}

fn run_search(args: SearchArgs, config: &ClinicConfig, json: bool) -> Result<(), String> {
    let session = Session::open(config)?;
    let results = session.clinic.search_by_doctor(&args.doctor);

    if json {
        let rows: Vec<serde_json::Value> = results.iter().map(patient_json).collect();
        return print_json(&serde_json::json!({
            "doctor": args.doctor.trim(),
            "patients": rows,
        }));
    }
    println!("doctor={}", args.doctor.trim());
    println!("patients_total={}", results.len());
    for patient in &results {
        println!("{}", doctor_patient_line(patient));
    }
    Ok(())
}

fn run_doctors(config: &ClinicConfig, json: bool) -> Result<(), String> {
    let session = Session::open(config)?;
    let doctors = session.clinic.doctors();

    if json {
        let rows: Vec<serde_json::Value> = doctors
            .iter()
            .map(|(doctor, count)| serde_json::json!({ "doctor": doctor, "patients": count }))
            .collect();
        return print_json(&serde_json::json!({ "doctors": rows }));
    }
    println!("doctors_total={}", doctors.len());
    for (doctor, count) in &doctors {
        println!("doctor={} patients={}", doctor, count);
    }
    Ok(())
}

fn run_update(args: UpdateArgs, config: &ClinicConfig, json: bool) -> Result<(), String> {
    let mut session = Session::open(config)?;
    let id = parse_patient_id(&args.id).map_err(|err| err.to_string())?;
    let keep_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    let age = match keep_blank(args.age) {
        Some(raw) => Some(parse_age(&raw).map_err(|err| err.to_string())?),
        None => None,
    };
    let changes = PatientChanges {
        name: keep_blank(args.name),
        age,
        disease: keep_blank(args.disease),
        doctor: keep_blank(args.doctor),
    };
    let patient = session
        .clinic
        .update(id, &changes)
        .map_err(|err| err.to_string())?;
    session.save()?;

    if json {
        return print_json(&patient_json(&patient));
    }
    println!("updated_patient_id={}", patient.id);
    println!("{}", patient_line(&patient));
    Ok(())
}

fn run_delete(args: IdArgs, config: &ClinicConfig, json: bool) -> Result<(), String> {
    let mut session = Session::open(config)?;
    let id = parse_patient_id(&args.id).map_err(|err| err.to_string())?;
    let patient = session.clinic.delete(id).map_err(|err| err.to_string())?;
    session.save()?;

    if json {
        return print_json(&serde_json::json!({ "deleted": patient_json(&patient) }));
    }
    println!("deleted_patient_id={}", patient.id);
    Ok(())
}

fn run_undo(config: &ClinicConfig, json: bool) -> Result<(), String> {
    let mut session = Session::open(config)?;
    let outcome = session.clinic.undo().map_err(|err| err.to_string())?;
    session.save()?;

    let remaining = session.clinic.undo_depth();
    if json {
        return print_json(&serde_json::json!({
            "undone": outcome.describe(),
            "undo_depth": remaining,
        }));
    }
    println!("undone={}", outcome.describe());
    println!("undo_depth={}", remaining);
    Ok(())
}

fn run_bill(args: BillArgs, json: bool) -> Result<(), String> {
    let input = args
        .input()?
        .ok_or_else(|| "bill requires --base".to_string())?;
    let total = input.total().map_err(|err| err.to_string())?;

    if json {
        return print_json(&serde_json::json!({
            "base": input.base,
            "tests": input.tests,
            "meds": input.meds,
            "other": input.other,
            "total": money(total),
        }));
    }
    println!("bill_total={}", money(total));
    Ok(())
}

fn run_status(config: &ClinicConfig, json: bool) -> Result<(), String> {
    let session = Session::open(config)?;
    let status = summarize_clinic(&session.clinic, &config.paths);

    if json {
        let value = serde_json::json!({
            "status": status,
            "config": config.source.as_ref().map(|p| p.display().to_string()),
            "files": {
                "patients": config.paths.patients.display().to_string(),
                "appointments": config.paths.appointments.display().to_string(),
                "undo_journal": config.paths.undo_journal.display().to_string(),
            }
        });
        return print_json(&value);
    }

    println!("data_dir={}", status.data_dir.display());
    println!("patients_total={}", status.patients_total);
    println!("doctors_total={}", status.doctors_total);
    println!("appointments_total={}", status.appointments_total);
    println!("undo_depth={}", status.undo_depth);
    if let Some(action) = status.latest_undo_action.as_ref() {
        println!("latest_undo_action={}", action);
    }
    if let Some(next) = status.next_appointment.as_ref() {
        println!("next_patient_id={}", next.patient_id);
        if let Some(name) = next.name.as_ref() {
            println!("next_patient_name={}", name);
        }
    }
    for issue in &status.consistency_issues {
        println!("consistency_issue={}", issue);
    }
    Ok(())
}

fn run_shell(config: &ClinicConfig) -> Result<(), String> {
    let mut session = Session::open(config)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(
        &mut session.clinic,
        &session.store,
        stdin.lock(),
        stdout.lock(),
    );
    shell.run().map_err(|err| err.to_string())
}
