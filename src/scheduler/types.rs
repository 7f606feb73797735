use crate::model::{Assignment, Participant, ParticipantId};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Options de rotation
#[derive(Debug, Clone, Copy)]
pub struct RotationOptions {
    /// Nombre maximal de jours examinés pour trouver un jour ouvré.
    pub max_lookahead_days: u32,
    /// Taille par défaut de l'aperçu « à venir ».
    pub upcoming_days: usize,
}

impl Default for RotationOptions {
    fn default() -> Self {
        Self {
            max_lookahead_days: 30,
            upcoming_days: 5,
        }
    }
}

#[derive(Error, Debug)]
pub enum RotationError {
    #[error("no eligible participant on {0}")]
    NoEligibleParticipant(NaiveDate),
    #[error("no working day found within {lookahead} days after {after}")]
    NoWorkingDayFound { after: NaiveDate, lookahead: u32 },
    #[error("date already assigned: {0}")]
    DateAlreadyAssigned(NaiveDate),
    #[error("absence already recorded for {participant} on {date}")]
    DuplicateAbsence {
        participant: ParticipantId,
        date: NaiveDate,
    },
    #[error("holiday already recorded on {0}")]
    DuplicateHoliday(NaiveDate),
    #[error("participant already exists: {0}")]
    DuplicateParticipant(String),
    #[error("rotation position {0} already held by an active participant")]
    DuplicatePosition(i32),
    #[error("operation not allowed on holiday {0}")]
    HolidayConflict(NaiveDate),
    #[error("unknown assignment: {0}")]
    NotFound(String),
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),
    #[error("swap invalid: {0}")]
    SwapInvalid(&'static str),
    #[error("assignment already completed: {0}")]
    AlreadyCompleted(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Résultat de `resolve` : l'assignation et le participant assigné.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Date demandée (peut différer de `assignment.date` après un jour férié).
    pub requested: NaiveDate,
    pub assignment: Assignment,
    pub participant: Participant,
    /// `false` quand l'assignation existait déjà.
    pub created: bool,
}

impl Resolution {
    /// Vrai si la demande a été reportée sur un jour ouvré suivant.
    pub fn advanced(&self) -> bool {
        self.assignment.date != self.requested
    }
}

/// Entrée d'aperçu (non persistée)
#[derive(Debug, Clone, Serialize)]
pub struct PreviewEntry {
    pub date: NaiveDate,
    pub participant: Option<Participant>,
    pub is_holiday: bool,
    /// Vrai si l'entrée provient d'une assignation déjà enregistrée.
    pub committed: bool,
}

impl PreviewEntry {
    pub(super) fn holiday(date: NaiveDate) -> Self {
        Self {
            date,
            participant: None,
            is_holiday: true,
            committed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    pub deleted_count: usize,
}
