use crate::directory::ParticipantDirectory;
use crate::ledger::AssignmentLedger;
use crate::model::ParticipantId;
use crate::scheduler::RotationError;
use serde::Serialize;
use std::collections::HashMap;

/// Part au-delà de laquelle la répartition est jugée déséquilibrée.
pub const SKEW_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Serialize)]
pub struct DistributionRow {
    pub participant: ParticipantId,
    pub name: String,
    pub email: String,
    pub active: bool,
    /// Assignations où le participant figure comme assigné.
    pub assigned: usize,
    pub completed: u32,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Fairness {
    Empty,
    Fair,
    Skewed { participant: ParticipantId, share: f64 },
    Monopolized { participant: ParticipantId },
}

#[derive(Debug, Clone, Serialize)]
pub struct Distribution {
    pub total: usize,
    pub active_participants: usize,
    /// Trié par nombre d'assignations décroissant, puis par nom.
    pub rows: Vec<DistributionRow>,
    pub fairness: Fairness,
}

/// Répartition des assignations enregistrées par participant.
pub fn distribution<S>(store: &S) -> Result<Distribution, RotationError>
where
    S: ParticipantDirectory + AssignmentLedger,
{
    let assignments = store.all_assignments()?;
    let participants = store.participants()?;
    let total = assignments.len();

    let mut counts: HashMap<&ParticipantId, usize> = HashMap::new();
    for a in &assignments {
        *counts.entry(&a.assigned_participant).or_default() += 1;
    }

    let share = |n: usize| if total == 0 { 0.0 } else { n as f64 / total as f64 };

    let mut rows: Vec<DistributionRow> = participants
        .iter()
        .filter(|p| p.active || counts.contains_key(&p.id))
        .map(|p| {
            let assigned = counts.get(&p.id).copied().unwrap_or(0);
            DistributionRow {
                participant: p.id.clone(),
                name: p.name.clone(),
                email: p.email.clone(),
                active: p.active,
                assigned,
                completed: p.completed_count,
                share: share(assigned),
            }
        })
        .collect();

    // assignations dont le participant a disparu de l'annuaire
    for (id, assigned) in &counts {
        if participants.iter().all(|p| &p.id != *id) {
            rows.push(DistributionRow {
                participant: (*id).clone(),
                name: "unknown".to_string(),
                email: String::new(),
                active: false,
                assigned: *assigned,
                completed: 0,
                share: share(*assigned),
            });
        }
    }

    rows.sort_by(|a, b| b.assigned.cmp(&a.assigned).then_with(|| a.name.cmp(&b.name)));

    let active_participants = participants.iter().filter(|p| p.active).count();
    let fairness = match rows.first() {
        _ if total == 0 => Fairness::Empty,
        Some(top) if top.assigned == total && active_participants > 1 => Fairness::Monopolized {
            participant: top.participant.clone(),
        },
        Some(top) if top.share > SKEW_THRESHOLD && active_participants > 1 => Fairness::Skewed {
            participant: top.participant.clone(),
            share: top.share,
        },
        _ => Fairness::Fair,
    };

    Ok(Distribution {
        total,
        active_participants,
        rows,
        fairness,
    })
}
