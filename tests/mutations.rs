#![forbid(unsafe_code)]
use chrono::NaiveDate;
use lunch_roster::{
    Absence, AbsenceRegistry, Assignment, AssignmentFilter, AssignmentId, AssignmentLedger,
    AssignmentStatus, Fairness, Holiday, HolidayCalendar, MemoryStore, Participant,
    ParticipantDirectory, ParticipantId, RotationEngine, RotationError,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
}

fn engine_with(names: &[&str]) -> (RotationEngine<MemoryStore>, Vec<ParticipantId>) {
    let store = MemoryStore::new();
    let mut ids = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let p = Participant::new(*name, format!("{}@example.com", name.to_lowercase()), i as i32);
        ids.push(p.id.clone());
        store.add_participant(p).unwrap();
    }
    (RotationEngine::new(store), ids)
}

fn completed(engine: &RotationEngine<MemoryStore>, id: &ParticipantId) -> u32 {
    engine.store().participant(id).unwrap().unwrap().completed_count
}

#[test]
fn swap_then_complete_credits_the_substitute() {
    let (engine, ids) = engine_with(&["A", "B", "C"]);
    let monday = engine.resolve(day(6)).unwrap().assignment;

    let swapped = engine.swap(&monday.id, &ids[2]).unwrap();
    assert!(swapped.is_swapped);
    assert_eq!(swapped.assigned_participant, ids[2]);
    assert_eq!(swapped.original_participant.as_ref(), Some(&ids[0]));
    assert_eq!(swapped.swapped_with.as_ref(), Some(&ids[2]));

    let done = engine.complete(&monday.id).unwrap();
    assert_eq!(done.status, AssignmentStatus::Completed);
    assert_eq!(completed(&engine, &ids[2]), 1);
    assert_eq!(completed(&engine, &ids[0]), 0);
}

#[test]
fn second_swap_keeps_original_and_swap_back_clears() {
    let (engine, ids) = engine_with(&["A", "B", "C"]);
    let monday = engine.resolve(day(6)).unwrap().assignment;

    engine.swap(&monday.id, &ids[1]).unwrap();
    let again = engine.swap(&monday.id, &ids[2]).unwrap();
    assert_eq!(again.original_participant.as_ref(), Some(&ids[0]));
    assert_eq!(again.assigned_participant, ids[2]);

    let back = engine.swap(&monday.id, &ids[0]).unwrap();
    assert!(!back.is_swapped);
    assert_eq!(back.assigned_participant, ids[0]);
    assert!(back.original_participant.is_none());
    assert!(back.swapped_with.is_none());
}

#[test]
fn invalid_swaps_are_rejected() {
    let (engine, ids) = engine_with(&["A", "B"]);
    let monday = engine.resolve(day(6)).unwrap().assignment;

    let err = engine.swap(&monday.id, &ids[0]).unwrap_err();
    assert!(matches!(err, RotationError::SwapInvalid(_)));

    let err = engine
        .swap(&monday.id, &ParticipantId::new("ghost"))
        .unwrap_err();
    assert!(matches!(err, RotationError::UnknownParticipant(_)));

    engine.store().set_active(&ids[1], false).unwrap();
    let err = engine.swap(&monday.id, &ids[1]).unwrap_err();
    assert!(matches!(err, RotationError::SwapInvalid(_)));

    let err = engine
        .swap(&AssignmentId::new("missing"), &ids[1])
        .unwrap_err();
    assert!(matches!(err, RotationError::NotFound(_)));
}

#[test]
fn completed_assignment_cannot_be_swapped() {
    let (engine, ids) = engine_with(&["A", "B"]);
    let monday = engine.resolve(day(6)).unwrap().assignment;
    engine.complete(&monday.id).unwrap();

    let err = engine.swap(&monday.id, &ids[1]).unwrap_err();
    assert!(matches!(err, RotationError::SwapInvalid(_)));
}

#[test]
fn holiday_dated_assignment_rejects_swap_and_complete() {
    let (engine, ids) = engine_with(&["A", "B"]);
    let legacy = engine
        .store()
        .create(day(8), &ids[0], AssignmentStatus::Pending)
        .unwrap();
    engine.store().add_holiday(Holiday::new(day(8))).unwrap();

    let err = engine.swap(&legacy.id, &ids[1]).unwrap_err();
    assert!(matches!(err, RotationError::HolidayConflict(d) if d == day(8)));
    let err = engine.complete(&legacy.id).unwrap_err();
    assert!(matches!(err, RotationError::HolidayConflict(_)));
    assert_eq!(completed(&engine, &ids[0]), 0);
}

#[test]
fn completing_twice_credits_once() {
    let (engine, ids) = engine_with(&["A", "B"]);
    let monday = engine.resolve(day(6)).unwrap().assignment;

    engine.complete(&monday.id).unwrap();
    let again = engine.complete(&monday.id).unwrap();
    assert_eq!(again.status, AssignmentStatus::Completed);
    assert_eq!(completed(&engine, &ids[0]), 1);
}

#[test]
fn skip_marks_pending_and_refuses_completed() {
    let (engine, _) = engine_with(&["A", "B"]);
    let monday = engine.resolve(day(6)).unwrap().assignment;
    let tuesday = engine.resolve(day(7)).unwrap().assignment;

    let skipped = engine.skip(&monday.id).unwrap();
    assert_eq!(skipped.status, AssignmentStatus::Skipped);
    assert_eq!(
        engine.store().find(day(6)).unwrap().unwrap().status,
        AssignmentStatus::Skipped
    );

    engine.complete(&tuesday.id).unwrap();
    let err = engine.skip(&tuesday.id).unwrap_err();
    assert!(matches!(err, RotationError::AlreadyCompleted(_)));
}

#[test]
fn manual_assignment_rules() {
    let (engine, ids) = engine_with(&["A", "B", "C"]);
    engine.store().add_holiday(Holiday::new(day(8))).unwrap();

    let err = engine.assign_manual(day(8), &ids[1], None).unwrap_err();
    assert!(matches!(err, RotationError::HolidayConflict(_)));

    let err = engine
        .assign_manual(day(7), &ParticipantId::new("ghost"), None)
        .unwrap_err();
    assert!(matches!(err, RotationError::UnknownParticipant(_)));

    let manual = engine
        .assign_manual(day(7), &ids[1], Some("remplace".into()))
        .unwrap();
    assert_eq!(manual.note.as_deref(), Some("remplace"));
    assert_eq!(
        engine.store().participant(&ids[1]).unwrap().unwrap().last_assigned_date,
        Some(day(7))
    );

    let err = engine.assign_manual(day(7), &ids[2], None).unwrap_err();
    assert!(matches!(err, RotationError::DateAlreadyAssigned(_)));

    // la rotation reprend après B
    assert_eq!(engine.resolve(day(9)).unwrap().participant.id, ids[2]);
}

#[test]
fn reset_deletes_from_date_and_zeroes_counters() {
    let (engine, ids) = engine_with(&["A", "B"]);
    for d in 6..=10 {
        let a = engine.resolve(day(d)).unwrap().assignment;
        engine.complete(&a.id).unwrap();
    }

    let summary = engine.reset_rotation(day(8)).unwrap();
    assert_eq!(summary.deleted_count, 3);

    let left = engine.store().all_assignments().unwrap();
    assert_eq!(
        left.iter().map(|a| a.date).collect::<Vec<_>>(),
        [day(6), day(7)]
    );
    for id in &ids {
        let p = engine.store().participant(id).unwrap().unwrap();
        assert_eq!(p.completed_count, 0);
        assert!(p.last_assigned_date.is_none());
    }

    // le tour repart de la dernière assignation conservée (B le 7)
    assert_eq!(engine.resolve(day(8)).unwrap().participant.id, ids[0]);
}

#[test]
fn duplicates_are_rejected_by_the_store() {
    let (engine, ids) = engine_with(&["A", "B"]);
    let store = engine.store();

    store.insert_absence(Absence::new(ids[0].clone(), day(6))).unwrap();
    let err = store
        .insert_absence(Absence::new(ids[0].clone(), day(6)))
        .unwrap_err();
    assert!(matches!(err, RotationError::DuplicateAbsence { .. }));
    assert!(store.remove_absence(&ids[0], day(6)).unwrap());
    assert!(!store.remove_absence(&ids[0], day(6)).unwrap());

    store.add_holiday(Holiday::new(day(6))).unwrap();
    let err = store.add_holiday(Holiday::new(day(6))).unwrap_err();
    assert!(matches!(err, RotationError::DuplicateHoliday(_)));

    let err = store
        .add_participant(Participant::new("A bis", "A@EXAMPLE.com", 5))
        .unwrap_err();
    assert!(matches!(err, RotationError::DuplicateParticipant(_)));

    let err = store
        .add_participant(Participant::new("D", "d@example.com", 1))
        .unwrap_err();
    assert!(matches!(err, RotationError::DuplicatePosition(1)));
}

#[test]
fn reactivation_checks_position_clash() {
    let (engine, ids) = engine_with(&["A", "B"]);
    let store = engine.store();
    store.set_active(&ids[1], false).unwrap();
    store
        .add_participant(Participant::new("C", "c@example.com", 1))
        .unwrap();

    let err = store.set_active(&ids[1], true).unwrap_err();
    assert!(matches!(err, RotationError::DuplicatePosition(1)));
}

#[test]
fn reorder_assigns_consecutive_positions() {
    let (engine, ids) = engine_with(&["A", "B", "C"]);
    let store = engine.store();

    store.reorder(&[ids[2].clone(), ids[0].clone()]).unwrap();
    let order: Vec<String> = store
        .list_active_ordered()
        .unwrap()
        .into_iter()
        .map(|p| format!("{}{}", p.name, p.rotation_position))
        .collect();
    assert_eq!(order, ["C0", "A1", "B2"]);

    let err = store.reorder(&[ids[0].clone(), ids[0].clone()]).unwrap_err();
    assert!(matches!(err, RotationError::DuplicateParticipant(_)));
}

#[test]
fn list_filters_by_range_and_participant() {
    let (engine, ids) = engine_with(&["A", "B"]);
    for d in 6..=10 {
        engine.resolve(day(d)).unwrap();
    }

    let filter = AssignmentFilter {
        from: Some(day(7)),
        to: Some(day(9)),
        participant: Some(ids[1].clone()),
    };
    let dates: Vec<NaiveDate> = engine
        .store()
        .list_assignments(&filter)
        .unwrap()
        .into_iter()
        .map(|a| a.date)
        .collect();
    assert_eq!(dates, [day(7), day(9)]);
}

#[test]
fn distribution_reports_balance() {
    let (engine, _) = engine_with(&["A", "B"]);
    assert!(matches!(engine.distribution().unwrap().fairness, Fairness::Empty));

    for d in 6..=9 {
        engine.resolve(day(d)).unwrap();
    }
    let report = engine.distribution().unwrap();
    assert_eq!(report.total, 4);
    assert_eq!(report.active_participants, 2);
    assert_eq!(report.rows.len(), 2);
    assert!(report.rows.iter().all(|r| r.assigned == 2));
    assert_eq!(report.fairness, Fairness::Fair);
}

#[test]
fn distribution_flags_monopoly_then_skew() {
    let (engine, ids) = engine_with(&["A", "B"]);
    for d in 6..=10 {
        engine.assign_manual(day(d), &ids[0], None).unwrap();
    }
    assert_eq!(
        engine.distribution().unwrap().fairness,
        Fairness::Monopolized {
            participant: ids[0].clone()
        }
    );

    engine.assign_manual(day(13), &ids[1], None).unwrap();
    let report = engine.distribution().unwrap();
    assert_eq!(report.rows[0].participant, ids[0]);
    assert_eq!(report.rows[0].assigned, 5);
    assert!(matches!(
        report.fairness,
        Fairness::Skewed { ref participant, share } if participant == &ids[0] && share > 0.8
    ));
}

#[test]
fn swap_invariant_is_validated() {
    let mut assignment = Assignment::new(day(6), ParticipantId::new("a"));
    assert!(assignment.validate().is_ok());

    assignment.is_swapped = true;
    assert!(assignment.validate().is_err());

    assignment.original_participant = Some(ParticipantId::new("a"));
    assert!(assignment.validate().is_err());

    assignment.original_participant = Some(ParticipantId::new("b"));
    assert!(assignment.validate().is_ok());
}
