use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use serde::Serialize;

use amendes_dashboard_lib::commands::bilan::{run_bilan_logic, BilanRequest};
use amendes_dashboard_lib::commands::config::get_config;
use amendes_dashboard_lib::commands::import::import_csv;
use amendes_dashboard_lib::commands::stock::{
    get_amende, get_encours, get_liste_amendes, AmendeFilters,
};
use amendes_dashboard_lib::parser::deserializers::parse_datetime;
use amendes_dashboard_lib::AppError;

#[derive(Parser)]
#[command(name = "amendes", version, about = "Bilans et suivi des amendes")]
struct Cli {
    /// Export CSV du service des infractions (séparateur ';').
    #[arg(short, long, env = "AMENDES_FICHIER")]
    fichier: String,

    /// Fichier de configuration JSON.
    #[arg(short, long, env = "AMENDES_CONFIG")]
    config: Option<PathBuf>,

    /// Surcharge de configuration `cle=valeur`, répétable.
    #[arg(long = "set", value_name = "CLE=VALEUR")]
    overrides: Vec<String>,

    /// Instant de référence (par défaut : maintenant).
    #[arg(long)]
    maintenant: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bilan d'une période avec évolution.
    Rapport {
        /// today | week | month | year | all | custom
        #[arg(short, long, default_value = "month")]
        periode: String,
        #[arg(long)]
        debut: Option<String>,
        #[arg(long)]
        fin: Option<String>,
    },
    /// Vue d'ensemble des amendes impayées.
    Encours,
    /// Liste des amendes, triées par échéance.
    Liste {
        #[arg(long)]
        statut: Option<String>,
        #[arg(long)]
        agent: Option<String>,
        #[arg(long)]
        min_montant: Option<i64>,
    },
    /// Détail d'une amende.
    Amende { id: String },
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = get_config(cli.config.as_deref(), &cli.overrides)?;
    let now: NaiveDateTime = match cli.maintenant.as_deref() {
        Some(s) => parse_datetime(s).ok_or_else(|| AppError::InvalidDate(s.to_string()))?,
        None => Local::now().naive_local(),
    };

    let import = import_csv(&cli.fichier, &config)?;
    for warning in &import.warnings {
        log::warn!("Ligne {}: {}", warning.line, warning.message);
    }
    for rejet in &import.rejets {
        log::warn!("Amende {} rejetée: {}", rejet.id, rejet.motif);
    }

    match cli.command {
        Command::Rapport {
            periode,
            debut,
            fin,
        } => {
            let request = BilanRequest {
                periode,
                date_debut: debut,
                date_fin: fin,
            };
            print_json(&run_bilan_logic(&import.records, &request, now, &config)?)
        }
        Command::Encours => print_json(&get_encours(&import.records, now, &config)?),
        Command::Liste {
            statut,
            agent,
            min_montant,
        } => {
            let filters = AmendeFilters {
                statut,
                agent,
                min_montant,
            };
            print_json(&get_liste_amendes(&import.records, &filters, now, &config)?)
        }
        Command::Amende { id } => print_json(&get_amende(&import.records, &id, now, &config)?),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
