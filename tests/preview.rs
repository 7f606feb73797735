#![forbid(unsafe_code)]
use chrono::{Duration, NaiveDate};
use lunch_roster::{
    Absence, AbsenceRegistry, AssignmentLedger, Holiday, HolidayCalendar, MemoryStore,
    Participant, ParticipantDirectory, ParticipantId, PreviewEntry, RotationEngine, RotationError,
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

fn names(entries: &[PreviewEntry]) -> Vec<(NaiveDate, String)> {
    entries
        .iter()
        .map(|e| {
            let who = match (&e.participant, e.is_holiday) {
                (Some(p), _) => p.name.clone(),
                (None, true) => "holiday".to_string(),
                (None, false) => "-".to_string(),
            };
            (e.date, who)
        })
        .collect()
}

#[test]
fn preview_sequence_writes_nothing() {
    let (engine, _) = engine_with(&["A", "B", "C"]);

    let entries = engine.preview_sequence(day(6), 5).unwrap();
    let got: Vec<String> = entries
        .iter()
        .map(|e| e.participant.as_ref().unwrap().name.clone())
        .collect();
    assert_eq!(got, ["A", "B", "C", "A", "B"]);
    assert!(entries.iter().all(|e| !e.committed));
    assert!(engine.store().all_assignments().unwrap().is_empty());
}

#[test]
fn preview_flags_holidays_and_omits_weekends() {
    let (engine, ids) = engine_with(&["A", "B", "C"]);
    engine.store().add_holiday(Holiday::new(day(8))).unwrap();
    engine
        .store()
        .insert_absence(Absence::new(ids[0].clone(), day(10)))
        .unwrap();

    let entries = engine.preview_sequence(day(6), 6).unwrap();
    assert_eq!(
        names(&entries),
        [
            (day(6), "A".to_string()),
            (day(7), "B".to_string()),
            (day(8), "holiday".to_string()),
            (day(9), "C".to_string()),
            (day(10), "B".to_string()),
            (day(13), "C".to_string()),
        ]
    );
    assert!(entries[2].is_holiday);
}

#[test]
fn committing_the_preview_gives_the_same_participants() {
    let (engine, ids) = engine_with(&["A", "B", "C"]);
    engine.store().add_holiday(Holiday::new(day(8))).unwrap();
    engine
        .store()
        .insert_absence(Absence::new(ids[0].clone(), day(10)))
        .unwrap();

    let preview = engine.preview_sequence(day(6), 8).unwrap();
    for entry in preview.iter().filter(|e| !e.is_holiday) {
        let resolution = engine.resolve(entry.date).unwrap();
        assert_eq!(resolution.assignment.date, entry.date);
        assert_eq!(
            Some(&resolution.participant.id),
            entry.participant.as_ref().map(|p| &p.id)
        );
    }
}

#[test]
fn preview_reconciles_recorded_assignments() {
    let (engine, ids) = engine_with(&["A", "B", "C"]);
    engine.assign_manual(day(7), &ids[2], None).unwrap();

    let entries = engine.preview_sequence(day(6), 3).unwrap();
    assert_eq!(
        names(&entries),
        [
            (day(6), "A".to_string()),
            (day(7), "C".to_string()),
            (day(8), "A".to_string()),
        ]
    );
    assert!(!entries[0].committed);
    assert!(entries[1].committed);
}

#[test]
fn day_without_anyone_available_has_no_participant() {
    let (engine, ids) = engine_with(&["A", "B"]);
    for id in &ids {
        engine
            .store()
            .insert_absence(Absence::new(id.clone(), day(7)))
            .unwrap();
    }

    let entries = engine.preview_sequence(day(6), 3).unwrap();
    assert_eq!(
        names(&entries),
        [
            (day(6), "A".to_string()),
            (day(7), "-".to_string()),
            (day(8), "B".to_string()),
        ]
    );
    assert!(!entries[1].is_holiday);
}

#[test]
fn zero_count_previews_nothing() {
    let (engine, _) = engine_with(&["A"]);
    assert!(engine.preview_sequence(day(6), 0).unwrap().is_empty());
    assert_eq!(engine.upcoming(day(6)).unwrap().len(), 5);
}

#[test]
fn empty_roster_still_shows_the_calendar() {
    let (engine, _) = engine_with(&[]);
    engine.store().add_holiday(Holiday::new(day(8))).unwrap();

    let entries = engine.preview_sequence(day(6), 5).unwrap();
    assert_eq!(
        names(&entries),
        [
            (day(6), "-".to_string()),
            (day(7), "-".to_string()),
            (day(8), "holiday".to_string()),
            (day(9), "-".to_string()),
            (day(10), "-".to_string()),
        ]
    );

    // l'aperçu d'un seul jour suit `resolve`
    assert!(matches!(
        engine.preview(day(6)),
        Err(RotationError::NoEligibleParticipant(_))
    ));
}

#[test]
fn oversized_count_is_bounded_by_the_calendar() {
    let (engine, _) = engine_with(&["A", "B"]);
    let near_end = NaiveDate::MAX - Duration::days(10);

    let err = engine.preview_sequence(near_end, usize::MAX).unwrap_err();
    assert!(matches!(err, RotationError::NoWorkingDayFound { .. }));

    let (engine, _) = engine_with(&[]);
    assert!(engine.preview_sequence(near_end, usize::MAX / 2).is_err());
}

#[test]
fn single_preview_follows_holiday_advance_without_writing() {
    let (engine, ids) = engine_with(&["A", "B"]);
    engine.resolve(day(6)).unwrap();
    engine.store().add_holiday(Holiday::new(day(7))).unwrap();

    let entry = engine.preview(day(7)).unwrap();
    assert_eq!(entry.date, day(8));
    assert_eq!(entry.participant.unwrap().id, ids[1]);
    assert!(!entry.committed);
    assert!(engine.store().find(day(8)).unwrap().is_none());

    let recorded = engine.preview(day(6)).unwrap();
    assert!(recorded.committed);
    assert_eq!(recorded.participant.unwrap().id, ids[0]);
}
