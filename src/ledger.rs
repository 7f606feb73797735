use crate::model::{Assignment, AssignmentId, AssignmentStatus, ParticipantId};
use crate::scheduler::RotationError;
use chrono::NaiveDate;

/// Filtre de listing des assignations (bornes incluses).
#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub participant: Option<ParticipantId>,
}

impl AssignmentFilter {
    pub fn matches(&self, assignment: &Assignment) -> bool {
        self.from.map_or(true, |from| assignment.date >= from)
            && self.to.map_or(true, |to| assignment.date <= to)
            && self
                .participant
                .as_ref()
                .map_or(true, |p| &assignment.assigned_participant == p)
    }
}

/// Résultat d'une complétion.
#[derive(Debug, Clone)]
pub struct Completion {
    pub assignment: Assignment,
    /// Participant ayant réellement assuré la journée.
    pub performer: ParticipantId,
    /// `false` si l'assignation était déjà complétée.
    pub newly_completed: bool,
}

/// Registre des assignations : une seule par date, garantie par le stockage.
pub trait AssignmentLedger {
    fn find(&self, date: NaiveDate) -> Result<Option<Assignment>, RotationError>;
    fn find_by_id(&self, id: &AssignmentId) -> Result<Option<Assignment>, RotationError>;
    /// Assignation la plus récente strictement avant `date`.
    fn last_before(&self, date: NaiveDate) -> Result<Option<Assignment>, RotationError>;
    /// Toutes les assignations, triées par date.
    fn all_assignments(&self) -> Result<Vec<Assignment>, RotationError>;
    /// Échoue avec `DateAlreadyAssigned` si la date est déjà prise.
    fn insert_assignment(&self, assignment: Assignment) -> Result<(), RotationError>;
    /// Échoue avec `NotFound` si l'id est inconnu.
    fn update_assignment(&self, assignment: &Assignment) -> Result<(), RotationError>;
    /// Supprime les assignations à partir de `date` (incluse) ; retourne le nombre supprimé.
    fn delete_assignments_from(&self, date: NaiveDate) -> Result<usize, RotationError>;

    fn create(
        &self,
        date: NaiveDate,
        participant: &ParticipantId,
        status: AssignmentStatus,
    ) -> Result<Assignment, RotationError> {
        let mut assignment = Assignment::new(date, participant.clone());
        assignment.status = status;
        self.insert_assignment(assignment.clone())?;
        Ok(assignment)
    }

    fn record_swap(
        &self,
        id: &AssignmentId,
        with: &ParticipantId,
    ) -> Result<Assignment, RotationError> {
        let mut assignment = self.require(id)?;
        assignment
            .record_swap(with.clone())
            .map_err(RotationError::SwapInvalid)?;
        self.update_assignment(&assignment)?;
        Ok(assignment)
    }

    fn complete(&self, id: &AssignmentId) -> Result<Completion, RotationError> {
        let mut assignment = self.require(id)?;
        let newly_completed = assignment.mark_completed();
        if newly_completed {
            self.update_assignment(&assignment)?;
        }
        Ok(Completion {
            performer: assignment.performer().clone(),
            assignment,
            newly_completed,
        })
    }

    fn require(&self, id: &AssignmentId) -> Result<Assignment, RotationError> {
        self.find_by_id(id)?
            .ok_or_else(|| RotationError::NotFound(id.to_string()))
    }

    fn list_assignments(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, RotationError> {
        let mut out = self.all_assignments()?;
        out.retain(|a| filter.matches(a));
        Ok(out)
    }
}
