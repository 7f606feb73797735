use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifiant fort pour Participant
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Participant à la rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Ordre de passage ; unique parmi les participants actifs.
    #[serde(default)]
    pub rotation_position: i32,
    #[serde(default)]
    pub last_assigned_date: Option<NaiveDate>,
    /// Incrémenté uniquement à la complétion, jamais à l'assignation.
    #[serde(default)]
    pub completed_count: u32,
}

fn default_active() -> bool {
    true
}

impl Participant {
    pub fn new<N: Into<String>, E: Into<String>>(name: N, email: E, rotation_position: i32) -> Self {
        Self {
            id: ParticipantId::random(),
            name: name.into(),
            email: email.into(),
            phone: None,
            active: true,
            rotation_position,
            last_assigned_date: None,
            completed_count: 0,
        }
    }

    /// Clé d'ordre de rotation : position, puis nom, puis id (déterministe).
    pub fn rotation_key(&self) -> (i32, &str, &str) {
        (self.rotation_position, self.name.as_str(), self.id.as_str())
    }
}

/// Jour férié (jour calendaire, indépendant du fuseau)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Holiday {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, label: None }
    }
}

/// Indisponibilité d'un participant pour une journée
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    pub participant: ParticipantId,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Absence {
    pub fn new(participant: ParticipantId, date: NaiveDate) -> Self {
        Self {
            participant,
            date,
            reason: None,
        }
    }
}

/// Identifiant fort pour Assignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentId(String);

impl AssignmentId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Completed,
    Skipped,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Skipped => "skipped",
        }
    }
}

/// Assignation d'une journée (au plus une par date)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub date: NaiveDate,
    pub assigned_participant: ParticipantId,
    #[serde(default)]
    pub status: AssignmentStatus,
    #[serde(default)]
    pub is_swapped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_participant: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swapped_with: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Assignment {
    pub fn new(date: NaiveDate, participant: ParticipantId) -> Self {
        Self {
            id: AssignmentId::random(),
            date,
            assigned_participant: participant,
            status: AssignmentStatus::Pending,
            is_swapped: false,
            original_participant: None,
            swapped_with: None,
            note: None,
        }
    }

    /// Participant prévu par la rotation, avant tout échange.
    /// Sert de point d'ancrage pour le tour suivant.
    pub fn scheduled_participant(&self) -> &ParticipantId {
        match (&self.original_participant, self.is_swapped) {
            (Some(original), true) => original,
            _ => &self.assigned_participant,
        }
    }

    /// Participant qui a réellement assuré la corvée (crédité à la complétion).
    pub fn performer(&self) -> &ParticipantId {
        match (&self.swapped_with, self.is_swapped) {
            (Some(with), true) => with,
            _ => &self.assigned_participant,
        }
    }

    /// Réassigne la journée à `with`. Un second échange conserve le participant
    /// prévu d'origine ; un échange vers ce dernier annule l'échange.
    pub fn record_swap(&mut self, with: ParticipantId) -> Result<(), &'static str> {
        if self.status == AssignmentStatus::Completed {
            return Err("assignment already completed");
        }
        if with == self.assigned_participant {
            return Err("participant already holds this assignment");
        }
        let original = self.scheduled_participant().clone();
        if original == with {
            self.assigned_participant = with;
            self.is_swapped = false;
            self.original_participant = None;
            self.swapped_with = None;
        } else {
            self.original_participant = Some(original);
            self.assigned_participant = with.clone();
            self.swapped_with = Some(with);
            self.is_swapped = true;
        }
        Ok(())
    }

    /// Passe au statut `completed` ; retourne `false` si c'était déjà le cas.
    pub fn mark_completed(&mut self) -> bool {
        if self.status == AssignmentStatus::Completed {
            return false;
        }
        self.status = AssignmentStatus::Completed;
        true
    }

    /// Vérifie l'invariant d'échange.
    pub fn validate(&self) -> Result<(), String> {
        if !self.is_swapped {
            return Ok(());
        }
        match &self.original_participant {
            None => Err(format!("assignment {} swapped without original participant", self.date)),
            Some(original) if original == &self.assigned_participant => Err(format!(
                "assignment {} swapped onto its original participant",
                self.date
            )),
            Some(_) => Ok(()),
        }
    }
}

/// Instantané complet (format du fichier JSON)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub absences: Vec<Absence>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl Roster {
    pub fn find_participant_by_id<'a>(&'a self, id: &ParticipantId) -> Option<&'a Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }
}
