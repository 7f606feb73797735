use crate::model::{Holiday, Participant, ParticipantId, Roster};
use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Jour calendaire depuis `YYYY-MM-DD` ou un horodatage RFC3339 (ramené au jour UTC).
pub fn parse_day(raw: &str) -> anyhow::Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    let dt: DateTime<Utc> = raw
        .parse()
        .with_context(|| format!("invalid date/datetime: {raw}"))?;
    Ok(dt.date_naive())
}

/// Import de participants depuis CSV: header `name,email[,phone][,position][,active]`
///
/// Sans position explicite, les participants sont numérotés dans l'ordre du fichier.
pub fn import_participants_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Participant>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let email = rec.get(1).context("missing email")?.trim();
        if name.is_empty() || email.is_empty() {
            bail!("invalid participant row (empty)");
        }
        let mut participant = Participant::new(name, email.to_ascii_lowercase(), row as i32);
        if let Some(phone) = rec.get(2).map(str::trim).filter(|s| !s.is_empty()) {
            participant.phone = Some(phone.to_string());
        }
        if let Some(position) = rec.get(3).map(str::trim).filter(|s| !s.is_empty()) {
            participant.rotation_position = position
                .parse()
                .with_context(|| format!("invalid position for {email}"))?;
        }
        if let Some(flag) = rec.get(4).map(str::trim).filter(|s| !s.is_empty()) {
            participant.active =
                parse_bool(flag).with_context(|| format!("invalid active value for {email}"))?;
        }
        out.push(participant);
    }
    Ok(out)
}

/// Import de jours fériés: header `date[,label]`
pub fn import_holidays_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Holiday>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let date = parse_day(rec.get(0).context("missing date")?)?;
        let mut holiday = Holiday::new(date);
        holiday.label = rec
            .get(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        out.push(holiday);
    }
    Ok(out)
}

pub fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

/// Export JSON du roster (jolie mise en forme)
pub fn export_roster_json<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(roster)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des assignations: header `date,assigned_email,status,swapped,original_email,note`
pub fn write_assignments_csv<W: Write>(out: W, roster: &Roster) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(out);
    w.write_record([
        "date",
        "assigned_email",
        "status",
        "swapped",
        "original_email",
        "note",
    ])?;
    let mut assignments: Vec<_> = roster.assignments.iter().collect();
    assignments.sort_by_key(|a| a.date);
    for a in assignments {
        let date = a.date.to_string();
        w.write_record([
            date.as_str(),
            email_of(roster, &a.assigned_participant),
            a.status.as_str(),
            if a.is_swapped { "true" } else { "false" },
            a.original_participant
                .as_ref()
                .map(|id| email_of(roster, id))
                .unwrap_or(""),
            a.note.as_deref().unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn email_of<'a>(roster: &'a Roster, id: &ParticipantId) -> &'a str {
    roster
        .find_participant_by_id(id)
        .map(|p| p.email.as_str())
        .unwrap_or("")
}

pub fn export_assignments_csv<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let file = fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_assignments_csv(file, roster)
}
