use crate::model::{Absence, ParticipantId};
use crate::scheduler::RotationError;
use chrono::NaiveDate;
use std::collections::HashSet;

pub trait AbsenceRegistry {
    fn absences_on(&self, date: NaiveDate) -> Result<Vec<Absence>, RotationError>;
    /// Échoue avec `DuplicateAbsence` si le couple (participant, date) existe déjà.
    fn insert_absence(&self, absence: Absence) -> Result<(), RotationError>;
    fn remove_absence(&self, participant: &ParticipantId, date: NaiveDate)
        -> Result<bool, RotationError>;

    fn is_absent(&self, participant: &ParticipantId, date: NaiveDate) -> Result<bool, RotationError> {
        Ok(self
            .absences_on(date)?
            .iter()
            .any(|a| &a.participant == participant))
    }

    fn absentees_on(&self, date: NaiveDate) -> Result<HashSet<ParticipantId>, RotationError> {
        Ok(self
            .absences_on(date)?
            .into_iter()
            .map(|a| a.participant)
            .collect())
    }
}
