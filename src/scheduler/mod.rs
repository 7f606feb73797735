mod mutate;
mod preview;
mod rotation;
mod types;
mod util;

pub use types::{PreviewEntry, ResetSummary, Resolution, RotationError, RotationOptions};
pub use util::{rotation_start, select_candidate};

use crate::model::{Assignment, AssignmentId, ParticipantId};
use crate::report::{self, Distribution};
use crate::store::RosterStore;
use chrono::{NaiveDate, Utc};

/// Moteur de rotation. Aucun état entre deux appels : le tour courant est
/// toujours redérivé de la dernière assignation enregistrée.
#[derive(Debug, Default)]
pub struct RotationEngine<S> {
    store: S,
    opts: RotationOptions,
}

impl<S: RosterStore> RotationEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, RotationOptions::default())
    }

    pub fn with_options(store: S, opts: RotationOptions) -> Self {
        Self { store, opts }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
    pub fn into_store(self) -> S {
        self.store
    }

    /// Retourne l'assignation de `date`, en la créant au premier accès.
    /// Un jour non ouvré est reporté sur le jour ouvré suivant.
    pub fn resolve(&self, date: NaiveDate) -> Result<Resolution, RotationError> {
        rotation::resolve(self, date)
    }

    /// `resolve` pour le jour courant (UTC).
    pub fn resolve_today(&self) -> Result<Resolution, RotationError> {
        self.resolve(Utc::now().date_naive())
    }

    /// Comme `resolve`, sans rien enregistrer.
    pub fn preview(&self, date: NaiveDate) -> Result<PreviewEntry, RotationError> {
        preview::preview(self, date)
    }

    /// Projection des `count` prochaines journées à partir de `from` (incluse).
    pub fn preview_sequence(
        &self,
        from: NaiveDate,
        count: usize,
    ) -> Result<Vec<PreviewEntry>, RotationError> {
        preview::preview_sequence(self, from, count)
    }

    pub fn upcoming(&self, from: NaiveDate) -> Result<Vec<PreviewEntry>, RotationError> {
        self.preview_sequence(from, self.opts.upcoming_days)
    }

    pub fn swap(
        &self,
        id: &AssignmentId,
        with: &ParticipantId,
    ) -> Result<Assignment, RotationError> {
        mutate::swap(self, id, with)
    }

    pub fn complete(&self, id: &AssignmentId) -> Result<Assignment, RotationError> {
        mutate::complete(self, id)
    }

    pub fn skip(&self, id: &AssignmentId) -> Result<Assignment, RotationError> {
        mutate::skip(self, id)
    }

    pub fn assign_manual(
        &self,
        date: NaiveDate,
        participant: &ParticipantId,
        note: Option<String>,
    ) -> Result<Assignment, RotationError> {
        mutate::assign_manual(self, date, participant, note)
    }

    /// Supprime les assignations à partir de `from` et remet les compteurs à zéro.
    pub fn reset_rotation(&self, from: NaiveDate) -> Result<ResetSummary, RotationError> {
        mutate::reset_rotation(self, from)
    }

    pub fn distribution(&self) -> Result<Distribution, RotationError> {
        report::distribution(&self.store)
    }

    fn resolution(
        &self,
        requested: NaiveDate,
        assignment: Assignment,
        created: bool,
    ) -> Result<Resolution, RotationError> {
        let participant = self
            .store
            .participant(&assignment.assigned_participant)?
            .ok_or_else(|| {
                RotationError::UnknownParticipant(assignment.assigned_participant.to_string())
            })?;
        Ok(Resolution {
            requested,
            assignment,
            participant,
            created,
        })
    }
}
