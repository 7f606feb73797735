//! Implémentation mémoire des quatre interfaces de stockage.
//!
//! Les contraintes d'unicité (une assignation par date, une absence par
//! couple participant/date, un jour férié par date) sont vérifiées et écrites
//! sous le même verrou d'écriture : c'est la garantie sur laquelle repose la
//! résolution concurrente.

use crate::absence::AbsenceRegistry;
use crate::calendar::HolidayCalendar;
use crate::directory::ParticipantDirectory;
use crate::ledger::AssignmentLedger;
use crate::model::{Absence, Assignment, AssignmentId, Holiday, Participant, ParticipantId, Roster};
use crate::scheduler::RotationError;
use anyhow::anyhow;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Tout ce dont le moteur de rotation a besoin.
pub trait RosterStore: HolidayCalendar + ParticipantDirectory + AbsenceRegistry + AssignmentLedger {}

impl<T> RosterStore for T where
    T: HolidayCalendar + ParticipantDirectory + AbsenceRegistry + AssignmentLedger
{
}

#[derive(Debug, Default)]
struct State {
    participants: Vec<Participant>,
    holidays: BTreeMap<NaiveDate, Holiday>,
    absences: BTreeMap<(NaiveDate, ParticipantId), Absence>,
    assignments: BTreeMap<NaiveDate, Assignment>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit le store depuis un instantané en validant les unicités.
    pub fn from_roster(roster: Roster) -> Result<Self, RotationError> {
        let mut state = State {
            participants: roster.participants,
            ..State::default()
        };
        for holiday in roster.holidays {
            let date = holiday.date;
            if state.holidays.insert(date, holiday).is_some() {
                return Err(RotationError::DuplicateHoliday(date));
            }
        }
        for absence in roster.absences {
            let key = (absence.date, absence.participant.clone());
            if state.absences.contains_key(&key) {
                return Err(RotationError::DuplicateAbsence {
                    participant: key.1,
                    date: key.0,
                });
            }
            state.absences.insert(key, absence);
        }
        for assignment in roster.assignments {
            assignment.validate().map_err(|e| anyhow!(e))?;
            let date = assignment.date;
            if state.assignments.insert(date, assignment).is_some() {
                return Err(RotationError::DateAlreadyAssigned(date));
            }
        }
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Instantané sérialisable de l'état courant.
    pub fn snapshot(&self) -> Result<Roster, RotationError> {
        let state = self.read()?;
        Ok(Roster {
            participants: state.participants.clone(),
            holidays: state.holidays.values().cloned().collect(),
            absences: state.absences.values().cloned().collect(),
            assignments: state.assignments.values().cloned().collect(),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, RotationError> {
        self.state
            .read()
            .map_err(|_| RotationError::Other(anyhow!("roster store lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, RotationError> {
        self.state
            .write()
            .map_err(|_| RotationError::Other(anyhow!("roster store lock poisoned")))
    }

    fn with_participant<F>(&self, id: &ParticipantId, f: F) -> Result<(), RotationError>
    where
        F: FnOnce(&mut Participant),
    {
        let mut state = self.write()?;
        let participant = state
            .participants
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| RotationError::UnknownParticipant(id.to_string()))?;
        f(participant);
        Ok(())
    }
}

impl HolidayCalendar for MemoryStore {
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, RotationError> {
        Ok(self.read()?.holidays.contains_key(&date))
    }

    fn holidays(&self) -> Result<Vec<Holiday>, RotationError> {
        Ok(self.read()?.holidays.values().cloned().collect())
    }

    fn add_holiday(&self, holiday: Holiday) -> Result<(), RotationError> {
        let mut state = self.write()?;
        if state.holidays.contains_key(&holiday.date) {
            return Err(RotationError::DuplicateHoliday(holiday.date));
        }
        state.holidays.insert(holiday.date, holiday);
        Ok(())
    }

    fn remove_holiday(&self, date: NaiveDate) -> Result<bool, RotationError> {
        Ok(self.write()?.holidays.remove(&date).is_some())
    }
}

impl ParticipantDirectory for MemoryStore {
    fn participants(&self) -> Result<Vec<Participant>, RotationError> {
        Ok(self.read()?.participants.clone())
    }

    fn participant(&self, id: &ParticipantId) -> Result<Option<Participant>, RotationError> {
        Ok(self
            .read()?
            .participants
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    fn insert_participant(&self, participant: Participant) -> Result<(), RotationError> {
        let mut state = self.write()?;
        if state.participants.iter().any(|p| p.id == participant.id) {
            return Err(RotationError::DuplicateParticipant(participant.id.to_string()));
        }
        state.participants.push(participant);
        Ok(())
    }

    fn update_participant(&self, participant: &Participant) -> Result<(), RotationError> {
        let updated = participant.clone();
        self.with_participant(&participant.id, move |p| *p = updated)
    }

    fn mark_assigned(&self, id: &ParticipantId, date: NaiveDate) -> Result<(), RotationError> {
        self.with_participant(id, |p| p.last_assigned_date = Some(date))
    }

    fn credit_completion(&self, id: &ParticipantId) -> Result<(), RotationError> {
        self.with_participant(id, |p| p.completed_count += 1)
    }

    fn reset_counters(&self) -> Result<(), RotationError> {
        let mut state = self.write()?;
        for p in state.participants.iter_mut() {
            p.last_assigned_date = None;
            p.completed_count = 0;
        }
        Ok(())
    }
}

impl AbsenceRegistry for MemoryStore {
    fn absences_on(&self, date: NaiveDate) -> Result<Vec<Absence>, RotationError> {
        Ok(self
            .read()?
            .absences
            .iter()
            .filter(|((d, _), _)| *d == date)
            .map(|(_, a)| a.clone())
            .collect())
    }

    fn insert_absence(&self, absence: Absence) -> Result<(), RotationError> {
        let mut state = self.write()?;
        let key = (absence.date, absence.participant.clone());
        if state.absences.contains_key(&key) {
            return Err(RotationError::DuplicateAbsence {
                participant: key.1,
                date: key.0,
            });
        }
        state.absences.insert(key, absence);
        Ok(())
    }

    fn remove_absence(
        &self,
        participant: &ParticipantId,
        date: NaiveDate,
    ) -> Result<bool, RotationError> {
        Ok(self
            .write()?
            .absences
            .remove(&(date, participant.clone()))
            .is_some())
    }
}

impl AssignmentLedger for MemoryStore {
    fn find(&self, date: NaiveDate) -> Result<Option<Assignment>, RotationError> {
        Ok(self.read()?.assignments.get(&date).cloned())
    }

    fn find_by_id(&self, id: &AssignmentId) -> Result<Option<Assignment>, RotationError> {
        Ok(self
            .read()?
            .assignments
            .values()
            .find(|a| &a.id == id)
            .cloned())
    }

    fn last_before(&self, date: NaiveDate) -> Result<Option<Assignment>, RotationError> {
        Ok(self
            .read()?
            .assignments
            .range(..date)
            .next_back()
            .map(|(_, a)| a.clone()))
    }

    fn all_assignments(&self) -> Result<Vec<Assignment>, RotationError> {
        Ok(self.read()?.assignments.values().cloned().collect())
    }

    fn insert_assignment(&self, assignment: Assignment) -> Result<(), RotationError> {
        assignment.validate().map_err(|e| anyhow!(e))?;
        let mut state = self.write()?;
        if state.assignments.contains_key(&assignment.date) {
            return Err(RotationError::DateAlreadyAssigned(assignment.date));
        }
        state.assignments.insert(assignment.date, assignment);
        Ok(())
    }

    fn update_assignment(&self, assignment: &Assignment) -> Result<(), RotationError> {
        assignment.validate().map_err(|e| anyhow!(e))?;
        let mut state = self.write()?;
        let current_date = state
            .assignments
            .values()
            .find(|a| a.id == assignment.id)
            .map(|a| a.date)
            .ok_or_else(|| RotationError::NotFound(assignment.id.to_string()))?;
        if current_date != assignment.date {
            if state.assignments.contains_key(&assignment.date) {
                return Err(RotationError::DateAlreadyAssigned(assignment.date));
            }
            state.assignments.remove(&current_date);
        }
        state.assignments.insert(assignment.date, assignment.clone());
        Ok(())
    }

    fn delete_assignments_from(&self, date: NaiveDate) -> Result<usize, RotationError> {
        let mut state = self.write()?;
        let removed = state.assignments.split_off(&date);
        Ok(removed.len())
    }
}
