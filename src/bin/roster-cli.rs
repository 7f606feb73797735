#![forbid(unsafe_code)]
use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use lunch_roster::{
    io,
    model::{Absence, Assignment, Holiday, Participant, ParticipantId},
    report::Fairness,
    AbsenceRegistry, AssignmentFilter, AssignmentLedger, HolidayCalendar, JsonStorage,
    MemoryStore, ParticipantDirectory, PreviewEntry, Resolution, RotationEngine, RotationOptions,
    Storage,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

type Engine = RotationEngine<MemoryStore>;

/// CLI de rotation quotidienne (fichier JSON local)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du roster
    #[arg(long, global = true, env = "LUNCH_ROSTER_FILE", default_value = "roster.json")]
    roster: String,

    /// Nombre maximal de jours examinés pour trouver un jour ouvré
    #[arg(long, global = true, env = "LUNCH_ROSTER_LOOKAHEAD", default_value_t = 30)]
    max_lookahead_days: u32,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ajouter un participant (position : à la suite par défaut)
    AddParticipant {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        position: Option<i32>,
    },

    /// Importer des participants depuis un CSV
    ImportParticipants {
        #[arg(long)]
        csv: String,
    },

    /// Réactiver un participant
    Activate {
        #[arg(long)]
        email: String,
    },

    /// Retirer un participant de la rotation (sans le supprimer)
    Deactivate {
        #[arg(long)]
        email: String,
    },

    /// Redéfinir l'ordre de passage
    Reorder {
        /// liste "email1,email2,..."
        #[arg(long)]
        order: String,
    },

    /// Déclarer un jour férié (YYYY-MM-DD)
    AddHoliday {
        #[arg(long)]
        date: String,
        #[arg(long)]
        label: Option<String>,
    },

    RemoveHoliday {
        #[arg(long)]
        date: String,
    },

    /// Importer des jours fériés depuis un CSV
    ImportHolidays {
        #[arg(long)]
        csv: String,
    },

    /// Lister les jours fériés
    ListHolidays {
        #[arg(long)]
        json: bool,
    },

    /// Déclarer une absence
    AddAbsence {
        #[arg(long)]
        email: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        reason: Option<String>,
    },

    RemoveAbsence {
        #[arg(long)]
        email: String,
        #[arg(long)]
        date: String,
    },

    /// Assignation du jour (créée au premier accès)
    Today,

    /// Assignation d'une date (créée au premier accès)
    Resolve {
        #[arg(long)]
        date: String,
    },

    /// Enregistrer les assignations des prochains jours ouvrés
    Plan {
        #[arg(long)]
        from: Option<String>,
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(0..=366))]
        days: u16,
    },

    /// Aperçu des prochaines journées, sans rien enregistrer
    Upcoming {
        /// Premier jour de l'aperçu (défaut : demain)
        #[arg(long)]
        from: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u16).range(0..=366))]
        days: Option<u16>,
        #[arg(long)]
        json: bool,
    },

    /// Affectation manuelle d'une date
    Assign {
        #[arg(long)]
        date: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        note: Option<String>,
    },

    /// Échanger l'assignation d'une date
    Swap {
        #[arg(long)]
        date: String,
        #[arg(long)]
        with: String,
    },

    /// Marquer une date comme effectuée
    Complete {
        #[arg(long)]
        date: String,
    },

    /// Marquer une date comme sautée
    Skip {
        #[arg(long)]
        date: String,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Répartition des assignations
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Supprimer les assignations à venir et remettre les compteurs à zéro
    Reset {
        /// Premier jour supprimé (défaut : aujourd'hui)
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }
    #[cfg(not(feature = "logging"))]
    if cli.log {
        eprintln!("Warning: built without the `logging` feature, --log ignored");
    }

    let storage = JsonStorage::open(&cli.roster)?;
    // tenu jusqu'à la sortie du processus : chargement, mutation et sauvegarde
    // ne s'entrelacent jamais entre deux invocations
    let mut lock = storage.lock_file()?;
    let _guard = lock
        .write()
        .with_context(|| format!("locking {}", cli.roster))?;
    let store = MemoryStore::from_roster(storage.load_or_default()?)
        .with_context(|| format!("loading {}", cli.roster))?;
    let opts = RotationOptions {
        max_lookahead_days: cli.max_lookahead_days,
        ..RotationOptions::default()
    };
    let engine = RotationEngine::with_options(store, opts);
    let save = |engine: &Engine| -> Result<()> { storage.save(&engine.store().snapshot()?) };
    let today = Utc::now().date_naive();

    let code = match cli.cmd {
        Commands::AddParticipant {
            name,
            email,
            phone,
            position,
        } => {
            let position = match position {
                Some(p) => p,
                None => next_position(&engine)?,
            };
            let mut participant = Participant::new(name, email.to_ascii_lowercase(), position);
            participant.phone = phone;
            engine.store().add_participant(participant)?;
            save(&engine)?;
            0
        }
        Commands::ImportParticipants { csv } => {
            let people = io::import_participants_csv(csv)?;
            let count = people.len();
            for p in people {
                engine.store().add_participant(p)?;
            }
            save(&engine)?;
            println!("Imported {count} participant(s)");
            0
        }
        Commands::Activate { email } => {
            let id = participant_id(&engine, &email)?;
            engine.store().set_active(&id, true)?;
            save(&engine)?;
            0
        }
        Commands::Deactivate { email } => {
            let id = participant_id(&engine, &email)?;
            engine.store().set_active(&id, false)?;
            save(&engine)?;
            0
        }
        Commands::Reorder { order } => {
            let ids = order
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|email| participant_id(&engine, email))
                .collect::<Result<Vec<_>>>()?;
            engine.store().reorder(&ids)?;
            save(&engine)?;
            0
        }
        Commands::AddHoliday { date, label } => {
            let mut holiday = Holiday::new(io::parse_day(&date)?);
            holiday.label = label;
            engine.store().add_holiday(holiday)?;
            save(&engine)?;
            0
        }
        Commands::RemoveHoliday { date } => {
            let date = io::parse_day(&date)?;
            if !engine.store().remove_holiday(date)? {
                bail!("no holiday on {date}");
            }
            save(&engine)?;
            0
        }
        Commands::ImportHolidays { csv } => {
            let holidays = io::import_holidays_csv(csv)?;
            let count = holidays.len();
            for h in holidays {
                engine.store().add_holiday(h)?;
            }
            save(&engine)?;
            println!("Imported {count} holiday(s)");
            0
        }
        Commands::ListHolidays { json } => {
            let holidays = engine.store().holidays()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&holidays)?);
            } else {
                for h in &holidays {
                    println!("{} | {}", h.date, h.label.as_deref().unwrap_or("-"));
                }
            }
            0
        }
        Commands::AddAbsence {
            email,
            date,
            reason,
        } => {
            let mut absence = Absence::new(participant_id(&engine, &email)?, io::parse_day(&date)?);
            absence.reason = reason;
            engine.store().insert_absence(absence)?;
            save(&engine)?;
            0
        }
        Commands::RemoveAbsence { email, date } => {
            let id = participant_id(&engine, &email)?;
            let date = io::parse_day(&date)?;
            if !engine.store().remove_absence(&id, date)? {
                bail!("no absence for {email} on {date}");
            }
            save(&engine)?;
            0
        }
        Commands::Today => {
            let resolution = engine.resolve(today)?;
            print_resolution(&resolution);
            if resolution.created {
                save(&engine)?;
            }
            0
        }
        Commands::Resolve { date } => {
            let resolution = engine.resolve(io::parse_day(&date)?)?;
            print_resolution(&resolution);
            if resolution.created {
                save(&engine)?;
            }
            0
        }
        Commands::Plan { from, days } => {
            let mut day = optional_day(from.as_deref(), today)?;
            for _ in 0..days {
                let resolution = engine.resolve(day)?;
                print_resolution(&resolution);
                day = resolution
                    .assignment
                    .date
                    .succ_opt()
                    .context("date overflow")?;
            }
            save(&engine)?;
            0
        }
        Commands::Upcoming { from, days, json } => {
            let tomorrow = today.succ_opt().context("date overflow")?;
            let from = optional_day(from.as_deref(), tomorrow)?;
            let entries = match days {
                Some(n) => engine.preview_sequence(from, usize::from(n))?,
                None => engine.upcoming(from)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    print_preview(entry);
                }
            }
            0
        }
        Commands::Assign { date, email, note } => {
            let id = participant_id(&engine, &email)?;
            let assignment = engine.assign_manual(io::parse_day(&date)?, &id, note)?;
            print_assignment(&engine, &assignment)?;
            save(&engine)?;
            0
        }
        Commands::Swap { date, with } => {
            let assignment = assignment_on(&engine, &date)?;
            let id = participant_id(&engine, &with)?;
            let swapped = engine.swap(&assignment.id, &id)?;
            print_assignment(&engine, &swapped)?;
            save(&engine)?;
            0
        }
        Commands::Complete { date } => {
            let assignment = assignment_on(&engine, &date)?;
            let completed = engine.complete(&assignment.id)?;
            print_assignment(&engine, &completed)?;
            save(&engine)?;
            0
        }
        Commands::Skip { date } => {
            let assignment = assignment_on(&engine, &date)?;
            let skipped = engine.skip(&assignment.id)?;
            print_assignment(&engine, &skipped)?;
            save(&engine)?;
            0
        }
        Commands::List {
            from,
            to,
            email,
            out_json,
            out_csv,
        } => {
            if let Some(path) = out_json {
                io::export_roster_json(path, &engine.store().snapshot()?)?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &engine.store().snapshot()?)?;
            }
            let filter = AssignmentFilter {
                from: from.as_deref().map(io::parse_day).transpose()?,
                to: to.as_deref().map(io::parse_day).transpose()?,
                participant: email
                    .as_deref()
                    .map(|e| participant_id(&engine, e))
                    .transpose()?,
            };
            for a in engine.store().list_assignments(&filter)? {
                print_assignment(&engine, &a)?;
            }
            0
        }
        Commands::Stats { json } => {
            let report = engine.distribution()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for row in &report.rows {
                    println!(
                        "{} <{}> | assigned {} ({:.1}%) | completed {}",
                        row.name,
                        row.email,
                        row.assigned,
                        row.share * 100.0,
                        row.completed
                    );
                }
                println!(
                    "Total: {} assignment(s), {} active participant(s)",
                    report.total, report.active_participants
                );
            }
            match report.fairness {
                Fairness::Empty => {
                    println!("No assignments yet");
                    0
                }
                Fairness::Fair => {
                    println!("OK: assignments are distributed fairly");
                    0
                }
                Fairness::Skewed { share, .. } => {
                    eprintln!("Warning: one participant holds {:.1}% of assignments", share * 100.0);
                    // Code 2 = WARNING
                    2
                }
                Fairness::Monopolized { .. } => {
                    eprintln!("Warning: every assignment is held by one participant");
                    2
                }
            }
        }
        Commands::Reset { from, yes } => {
            if !yes {
                bail!("reset deletes assignments; confirm with --yes");
            }
            let from = optional_day(from.as_deref(), today)?;
            let summary = engine.reset_rotation(from)?;
            save(&engine)?;
            println!("Deleted {} assignment(s) from {from}", summary.deleted_count);
            0
        }
    };

    std::process::exit(code);
}

fn optional_day(raw: Option<&str>, default: NaiveDate) -> Result<NaiveDate> {
    raw.map(io::parse_day).transpose().map(|d| d.unwrap_or(default))
}

fn next_position(engine: &Engine) -> Result<i32> {
    Ok(engine
        .store()
        .participants()?
        .iter()
        .map(|p| p.rotation_position + 1)
        .max()
        .unwrap_or(0))
}

fn participant_id(engine: &Engine, email: &str) -> Result<ParticipantId> {
    engine
        .store()
        .find_by_email(email)?
        .map(|p| p.id)
        .ok_or_else(|| anyhow!("unknown participant: {email}"))
}

fn assignment_on(engine: &Engine, raw: &str) -> Result<Assignment> {
    let date = io::parse_day(raw)?;
    engine
        .store()
        .find(date)?
        .ok_or_else(|| anyhow!("no assignment on {date}"))
}

fn print_resolution(r: &Resolution) {
    let advanced = if r.advanced() {
        format!(" (moved from {})", r.requested)
    } else {
        String::new()
    };
    println!(
        "{} | {} <{}> | {}{}",
        r.assignment.date,
        r.participant.name,
        r.participant.email,
        r.assignment.status.as_str(),
        advanced
    );
}

fn print_preview(entry: &PreviewEntry) {
    let who = match (&entry.participant, entry.is_holiday) {
        (Some(p), _) => format!("{} <{}>", p.name, p.email),
        (None, true) => "holiday".to_string(),
        (None, false) => "-".to_string(),
    };
    let tag = if entry.committed { "" } else { " (projected)" };
    println!("{} | {}{}", entry.date, who, tag);
}

fn print_assignment(engine: &Engine, a: &Assignment) -> Result<()> {
    let name = |id: &ParticipantId| -> Result<String> {
        Ok(engine
            .store()
            .participant(id)?
            .map(|p| p.name)
            .unwrap_or_else(|| "-".to_string()))
    };
    let swapped = match (&a.original_participant, a.is_swapped) {
        (Some(original), true) => format!(" (swapped from {})", name(original)?),
        _ => String::new(),
    };
    println!(
        "{} | {} | {}{}",
        a.date,
        a.status.as_str(),
        name(&a.assigned_participant)?,
        swapped
    );
    Ok(())
}
