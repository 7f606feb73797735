use super::{ResetSummary, RotationEngine, RotationError};
use crate::model::{Assignment, AssignmentId, AssignmentStatus, ParticipantId};
use crate::store::RosterStore;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

pub(super) fn swap<S: RosterStore>(
    engine: &RotationEngine<S>,
    id: &AssignmentId,
    with: &ParticipantId,
) -> Result<Assignment, RotationError> {
    let store = &engine.store;
    let assignment = store.require(id)?;
    if store.is_holiday(assignment.date)? {
        return Err(RotationError::HolidayConflict(assignment.date));
    }

    let target = store
        .participant(with)?
        .ok_or_else(|| RotationError::UnknownParticipant(with.to_string()))?;
    if !target.active {
        return Err(RotationError::SwapInvalid("participant is inactive"));
    }

    let swapped = store.record_swap(id, with)?;
    info!(
        date = %swapped.date,
        scheduled = %swapped.scheduled_participant(),
        assigned = %target.name,
        "assignment swapped"
    );
    Ok(swapped)
}

/// Complète la journée et crédite celui qui l'a réellement assurée.
pub(super) fn complete<S: RosterStore>(
    engine: &RotationEngine<S>,
    id: &AssignmentId,
) -> Result<Assignment, RotationError> {
    let store = &engine.store;
    let assignment = store.require(id)?;
    if store.is_holiday(assignment.date)? {
        return Err(RotationError::HolidayConflict(assignment.date));
    }

    let completion = store.complete(id)?;
    if completion.newly_completed {
        store.credit_completion(&completion.performer)?;
        info!(
            date = %completion.assignment.date,
            performer = %completion.performer,
            swapped = completion.assignment.is_swapped,
            "assignment completed"
        );
    } else {
        debug!(date = %completion.assignment.date, "assignment already completed");
    }
    Ok(completion.assignment)
}

pub(super) fn skip<S: RosterStore>(
    engine: &RotationEngine<S>,
    id: &AssignmentId,
) -> Result<Assignment, RotationError> {
    let store = &engine.store;
    let mut assignment = store.require(id)?;
    match assignment.status {
        AssignmentStatus::Completed => Err(RotationError::AlreadyCompleted(id.to_string())),
        AssignmentStatus::Skipped => Ok(assignment),
        AssignmentStatus::Pending => {
            assignment.status = AssignmentStatus::Skipped;
            store.update_assignment(&assignment)?;
            info!(date = %assignment.date, "assignment skipped");
            Ok(assignment)
        }
    }
}

/// Affectation manuelle : pas de jour férié, pas de date déjà prise.
pub(super) fn assign_manual<S: RosterStore>(
    engine: &RotationEngine<S>,
    date: NaiveDate,
    participant: &ParticipantId,
    note: Option<String>,
) -> Result<Assignment, RotationError> {
    let store = &engine.store;
    if store.is_holiday(date)? {
        return Err(RotationError::HolidayConflict(date));
    }
    if store.find(date)?.is_some() {
        return Err(RotationError::DateAlreadyAssigned(date));
    }
    if store.participant(participant)?.is_none() {
        return Err(RotationError::UnknownParticipant(participant.to_string()));
    }

    let mut assignment = Assignment::new(date, participant.clone());
    assignment.note = note;
    store.insert_assignment(assignment.clone())?;
    store.mark_assigned(participant, date)?;
    info!(%date, %participant, "manual assignment created");
    Ok(assignment)
}

pub(super) fn reset_rotation<S: RosterStore>(
    engine: &RotationEngine<S>,
    from: NaiveDate,
) -> Result<ResetSummary, RotationError> {
    let store = &engine.store;
    let deleted_count = store.delete_assignments_from(from)?;
    store.reset_counters()?;
    warn!(%from, deleted_count, "rotation reset");
    Ok(ResetSummary { deleted_count })
}
