use super::{util, Resolution, RotationEngine, RotationError};
use crate::model::{AssignmentStatus, Participant};
use crate::store::RosterStore;
use anyhow::anyhow;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Un report de jour non ouvré, une course perdue, puis la relecture.
const MAX_ATTEMPTS: usize = 4;

pub(super) fn resolve<S: RosterStore>(
    engine: &RotationEngine<S>,
    date: NaiveDate,
) -> Result<Resolution, RotationError> {
    let store = &engine.store;
    let mut target = date;

    for _ in 0..MAX_ATTEMPTS {
        // relu à chaque tour : jamais de « pas encore assigné » périmé
        if let Some(existing) = store.find(target)? {
            return engine.resolution(date, existing, false);
        }

        if !store.is_working_day(target)? {
            let next = store.next_working_day_after(target, engine.opts.max_lookahead_days)?;
            debug!(skipped = %target, next = %next, "non-working day, advancing");
            target = next;
            continue;
        }

        let anchor = anchor_before(store, target)?;
        let mut selected = select_for(store, target, anchor.as_ref())?;

        match store.create(target, &selected.id, AssignmentStatus::Pending) {
            Ok(assignment) => {
                store.mark_assigned(&selected.id, target)?;
                selected.last_assigned_date = Some(target);
                info!(
                    date = %target,
                    requested = %date,
                    participant = %selected.name,
                    position = selected.rotation_position,
                    "assignment created"
                );
                return Ok(Resolution {
                    requested: date,
                    assignment,
                    participant: selected,
                    created: true,
                });
            }
            Err(RotationError::DateAlreadyAssigned(_)) => {
                warn!(date = %target, "date assigned concurrently, re-reading");
            }
            Err(e) => return Err(e),
        }
    }

    Err(RotationError::Other(anyhow!(
        "resolution of {date} did not settle after {MAX_ATTEMPTS} attempts"
    )))
}

/// Participant prévu par la dernière assignation strictement avant `date`.
pub(super) fn anchor_before<S: RosterStore>(
    store: &S,
    date: NaiveDate,
) -> Result<Option<Participant>, RotationError> {
    match store.last_before(date)? {
        Some(last) => store.participant(last.scheduled_participant()),
        None => Ok(None),
    }
}

pub(super) fn select_for<S: RosterStore>(
    store: &S,
    date: NaiveDate,
    anchor: Option<&Participant>,
) -> Result<Participant, RotationError> {
    let ordered = store.list_active_ordered()?;
    let absentees = store.absentees_on(date)?;
    util::select_candidate(&ordered, anchor, &absentees)
        .cloned()
        .ok_or(RotationError::NoEligibleParticipant(date))
}
