use super::{rotation, util, PreviewEntry, RotationEngine, RotationError};
use crate::calendar::is_weekend;
use crate::model::Assignment;
use crate::store::RosterStore;
use chrono::NaiveDate;
use tracing::debug;

/// Borne de préallocation, `count` venant de l'appelant.
const MAX_PREALLOCATED: usize = 366;

pub(super) fn preview<S: RosterStore>(
    engine: &RotationEngine<S>,
    date: NaiveDate,
) -> Result<PreviewEntry, RotationError> {
    let store = &engine.store;
    let mut target = date;

    if !store.is_working_day(target)? && store.find(target)?.is_none() {
        target = store.next_working_day_after(target, engine.opts.max_lookahead_days)?;
    }
    if let Some(existing) = store.find(target)? {
        return committed_entry(store, existing);
    }

    let anchor = rotation::anchor_before(store, target)?;
    let selected = rotation::select_for(store, target, anchor.as_ref())?;
    debug!(date = %target, participant = %selected.name, "preview");
    Ok(PreviewEntry {
        date: target,
        participant: Some(selected),
        is_holiday: false,
        committed: false,
    })
}

/// Enchaîne les aperçus jour après jour ; l'ancre de rotation est portée en
/// mémoire, rien n'est écrit. Les week-ends sont omis, les jours fériés
/// apparaissent sans participant et comptent dans `count`.
///
/// Contrairement à `preview`, un jour sans personne disponible (roster vide
/// ou tout le monde absent) n'est pas une erreur : l'entrée est produite avec
/// `participant: None`, et les jours fériés de la période restent visibles.
pub(super) fn preview_sequence<S: RosterStore>(
    engine: &RotationEngine<S>,
    from: NaiveDate,
    count: usize,
) -> Result<Vec<PreviewEntry>, RotationError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let store = &engine.store;
    let ordered = store.list_active_ordered()?;
    let mut out = Vec::with_capacity(count.min(MAX_PREALLOCATED));

    let mut anchor = rotation::anchor_before(store, from)?;
    let mut day = from;

    while out.len() < count {
        if let Some(existing) = store.find(day)? {
            anchor = store.participant(existing.scheduled_participant())?;
            out.push(committed_entry(store, existing)?);
        } else if is_weekend(day) {
            // omis, sans compter
        } else if store.is_holiday(day)? {
            out.push(PreviewEntry::holiday(day));
        } else {
            let absentees = store.absentees_on(day)?;
            let selected = util::select_candidate(&ordered, anchor.as_ref(), &absentees).cloned();
            if let Some(p) = &selected {
                anchor = Some(p.clone());
            }
            out.push(PreviewEntry {
                date: day,
                participant: selected,
                is_holiday: false,
                committed: false,
            });
        }

        day = day.succ_opt().ok_or(RotationError::NoWorkingDayFound {
            after: day,
            lookahead: engine.opts.max_lookahead_days,
        })?;
    }

    Ok(out)
}

fn committed_entry<S: RosterStore>(
    store: &S,
    assignment: Assignment,
) -> Result<PreviewEntry, RotationError> {
    Ok(PreviewEntry {
        date: assignment.date,
        participant: store.participant(&assignment.assigned_participant)?,
        is_holiday: store.is_holiday(assignment.date)?,
        committed: true,
    })
}
