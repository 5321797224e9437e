use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use mobimama_core::{
    config::{data_dir_from_env_value, flag_update_attempts_from_env_value},
    CoreConfig, PatientFlagUpdate, PatientService, RecordId, RecordStore, StoreBackend,
    StoredReading, UrineProtein, VitalSigns, VitalsHistory, VitalsIngestion, VitalsReadingInput,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mobimama")]
#[command(about = "Mobi Mama antenatal vitals CLI")]
struct Cli {
    /// Record store directory (defaults to MOBIMAMA_DATA_DIR, then ./mobimama_data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
struct VitalsArgs {
    #[arg(long)]
    systolic: Option<i32>,
    #[arg(long)]
    diastolic: Option<i32>,
    #[arg(long, value_parser = finite_f64)]
    weight_kg: Option<f64>,
    /// Fetal heart rate in bpm
    #[arg(long)]
    fhr: Option<i32>,
    /// Temperature in degrees Celsius
    #[arg(long, value_parser = finite_f64)]
    temp: Option<f64>,
    /// negative, trace, positive or strong
    #[arg(long)]
    protein: Option<UrineProtein>,
    /// Hemoglobin in g/dL
    #[arg(long, value_parser = finite_f64)]
    hb: Option<f64>,
}

fn finite_f64(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(format!("{} is not a finite number", s)),
        Err(e) => Err(e.to_string()),
    }
}

impl From<VitalsArgs> for VitalSigns {
    fn from(args: VitalsArgs) -> Self {
        VitalSigns {
            systolic_bp: args.systolic,
            diastolic_bp: args.diastolic,
            weight_kg: args.weight_kg,
            fetal_heart_rate_bpm: args.fhr,
            temperature_c: args.temp,
            urine_protein: args.protein,
            hemoglobin_gdl: args.hb,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Assess vitals without storing them
    Assess {
        #[command(flatten)]
        vitals: VitalsArgs,
    },
    /// Register a patient
    RegisterPatient {
        first_name: String,
        last_name: String,
    },
    /// Store a vitals reading and flag the patient if it is high risk
    Ingest {
        /// Patient id (32 lowercase hex)
        patient_id: RecordId,
        #[command(flatten)]
        vitals: VitalsArgs,
        #[arg(long)]
        appointment_id: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        recorded_by: Option<String>,
        /// RFC 3339 timestamp (defaults to now)
        #[arg(long)]
        recorded_at: Option<DateTime<Utc>>,
    },
    /// List stored readings, newest first
    List {
        /// Only readings for this patient
        #[arg(long)]
        patient: Option<RecordId>,
    },
    /// List high and critical readings, newest first
    HighRisk,
    /// Count readings by risk group
    Summary,
}

type Opened = (CoreConfig, Arc<dyn RecordStore>);

/// The CLI always works against the JSON file store so state survives between runs.
fn open_store(data_dir: Option<PathBuf>) -> Result<Opened, Box<dyn std::error::Error>> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => data_dir_from_env_value(std::env::var("MOBIMAMA_DATA_DIR").ok()),
    };
    let attempts =
        flag_update_attempts_from_env_value(std::env::var("MOBIMAMA_FLAG_UPDATE_ATTEMPTS").ok())?;
    let cfg = CoreConfig::new(StoreBackend::JsonFiles, data_dir, attempts)?;
    let store = cfg.open_store()?;
    Ok((cfg, store))
}

fn format_reading(reading: &StoredReading) -> String {
    format!(
        "ID: {}, Patient: {}, Tier: {}, Recorded: {}",
        reading.id,
        reading.patient_id,
        reading.risk_tier,
        reading.recorded_at.to_rfc3339()
    )
}

fn print_readings(readings: &[StoredReading]) {
    if readings.is_empty() {
        println!("No readings found.");
    } else {
        for reading in readings {
            println!("{}", format_reading(reading));
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'mobimama --help' for commands");
        return Ok(());
    };

    match command {
        Commands::Assess { vitals } => {
            let score = mobimama_core::score(&vitals.into());
            let findings: Vec<&str> = score.findings().iter().map(|f| f.as_str()).collect();
            println!("Tier: {} ({} points)", score.tier(), score.points());
            if !findings.is_empty() {
                println!("Findings: {}", findings.join(", "));
            }
        }
        Commands::RegisterPatient {
            first_name,
            last_name,
        } => {
            let patients = PatientService::new(open_store(cli.data_dir)?.1);
            match patients.register(&first_name, &last_name) {
                Ok(patient) => println!("Registered patient with ID: {}", patient.id),
                Err(e) => eprintln!("Error registering patient: {}", e),
            }
        }
        Commands::Ingest {
            patient_id,
            vitals,
            appointment_id,
            notes,
            recorded_by,
            recorded_at,
        } => {
            let mut input = VitalsReadingInput::new(patient_id).with_vitals(vitals.into());
            input.appointment_id = appointment_id;
            input.notes = notes;
            input.recorded_by = recorded_by;
            input.recorded_at = recorded_at;

            let (cfg, store) = open_store(cli.data_dir)?;
            match VitalsIngestion::from_config(store, &cfg).ingest(input) {
                Ok(ingested) => {
                    println!("Stored reading: {}", format_reading(&ingested.reading));
                    match &ingested.patient_flag {
                        PatientFlagUpdate::NotRequired => {}
                        PatientFlagUpdate::Applied => println!(
                            "Patient {} flagged as {}",
                            ingested.reading.patient_id, ingested.reading.risk_tier
                        ),
                        PatientFlagUpdate::Failed { attempts, error } => eprintln!(
                            "Warning: patient risk level not updated after {} attempt(s): {}",
                            attempts, error
                        ),
                    }
                }
                Err(e) => eprintln!("Error storing reading: {}", e),
            }
        }
        Commands::List { patient } => {
            let history = VitalsHistory::new(open_store(cli.data_dir)?.1);
            let readings = match patient {
                Some(id) => history.for_patient(&id)?,
                None => history.all()?,
            };
            print_readings(&readings);
        }
        Commands::HighRisk => {
            let history = VitalsHistory::new(open_store(cli.data_dir)?.1);
            print_readings(&history.high_risk()?);
        }
        Commands::Summary => {
            let summary = VitalsHistory::new(open_store(cli.data_dir)?.1).summary()?;
            println!(
                "High: {}, Medium: {}, Normal: {}, Total: {}",
                summary.high,
                summary.medium,
                summary.normal,
                summary.total()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobimama_core::RiskTier;

    #[test]
    fn test_parse_assess_vitals() {
        let cli = Cli::try_parse_from([
            "mobimama",
            "assess",
            "--systolic",
            "170",
            "--diastolic",
            "120",
            "--protein",
            "strong",
        ])
        .expect("arguments should parse");

        let Some(Commands::Assess { vitals }) = cli.command else {
            panic!("expected assess command");
        };
        let vitals: VitalSigns = vitals.into();
        assert_eq!(vitals.systolic_bp, Some(170));
        assert_eq!(vitals.urine_protein, Some(UrineProtein::Strong));
        assert_eq!(mobimama_core::assess(&vitals), RiskTier::Critical);
    }

    #[test]
    fn test_parse_ingest_rejects_bad_patient_id() {
        assert!(Cli::try_parse_from(["mobimama", "ingest", "p1"]).is_err());
        assert!(Cli::try_parse_from([
            "mobimama",
            "ingest",
            "550e8400e29b41d4a716446655440000",
            "--fhr",
            "105",
            "--recorded-at",
            "2026-10-01T09:00:00Z",
        ])
        .is_ok());
    }

    #[test]
    fn test_parse_rejects_unknown_protein() {
        assert!(Cli::try_parse_from(["mobimama", "assess", "--protein", "lots"]).is_err());
    }

    #[test]
    fn test_parse_rejects_non_finite_measurements() {
        for (flag, value) in [
            ("--hb", "-inf"),
            ("--temp", "NaN"),
            ("--weight-kg", "inf"),
        ] {
            assert!(
                Cli::try_parse_from(["mobimama", "assess", flag, value]).is_err(),
                "{flag} {value} should be rejected"
            );
        }
        assert!(Cli::try_parse_from(["mobimama", "assess", "--hb", "10.5"]).is_ok());
    }

    #[test]
    fn test_global_data_dir() {
        let cli = Cli::try_parse_from(["mobimama", "summary", "--data-dir", "/tmp/mm"])
            .expect("arguments should parse");
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/mm")));
    }
}
