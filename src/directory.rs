use crate::model::{Participant, ParticipantId};
use crate::scheduler::RotationError;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Annuaire des participants. Les méthodes requises sont les primitives de
/// stockage ; l'ordre de rotation et les règles d'administration sont fournis.
pub trait ParticipantDirectory {
    fn participants(&self) -> Result<Vec<Participant>, RotationError>;
    fn participant(&self, id: &ParticipantId) -> Result<Option<Participant>, RotationError>;
    fn insert_participant(&self, participant: Participant) -> Result<(), RotationError>;
    /// Échoue avec `UnknownParticipant` si l'id n'existe pas.
    fn update_participant(&self, participant: &Participant) -> Result<(), RotationError>;
    fn mark_assigned(&self, id: &ParticipantId, date: NaiveDate) -> Result<(), RotationError>;
    fn credit_completion(&self, id: &ParticipantId) -> Result<(), RotationError>;
    /// Remet `last_assigned_date` et `completed_count` à zéro pour tous.
    fn reset_counters(&self) -> Result<(), RotationError>;

    /// Participants actifs par position croissante (puis nom). Peut être vide.
    fn list_active_ordered(&self) -> Result<Vec<Participant>, RotationError> {
        let mut active: Vec<Participant> = self
            .participants()?
            .into_iter()
            .filter(|p| p.active)
            .collect();
        active.sort_by(|a, b| a.rotation_key().cmp(&b.rotation_key()));
        Ok(active)
    }

    fn position_of(&self, id: &ParticipantId) -> Result<i32, RotationError> {
        self.participant(id)?
            .map(|p| p.rotation_position)
            .ok_or_else(|| RotationError::UnknownParticipant(id.to_string()))
    }

    fn excluding(&self, ids: &HashSet<ParticipantId>) -> Result<Vec<Participant>, RotationError> {
        let mut active = self.list_active_ordered()?;
        active.retain(|p| !ids.contains(&p.id));
        Ok(active)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Participant>, RotationError> {
        Ok(self
            .participants()?
            .into_iter()
            .find(|p| p.email.eq_ignore_ascii_case(email)))
    }

    fn add_participant(&self, participant: Participant) -> Result<(), RotationError> {
        let existing = self.participants()?;
        if existing
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(&participant.email))
        {
            return Err(RotationError::DuplicateParticipant(participant.email));
        }
        if participant.active
            && existing
                .iter()
                .any(|p| p.active && p.rotation_position == participant.rotation_position)
        {
            return Err(RotationError::DuplicatePosition(participant.rotation_position));
        }
        self.insert_participant(participant)
    }

    /// Active ou désactive ; la réactivation vérifie l'unicité de la position.
    fn set_active(&self, id: &ParticipantId, active: bool) -> Result<Participant, RotationError> {
        let mut participant = self
            .participant(id)?
            .ok_or_else(|| RotationError::UnknownParticipant(id.to_string()))?;
        if active && !participant.active {
            let clash = self.participants()?.into_iter().any(|p| {
                p.active && p.id != participant.id && p.rotation_position == participant.rotation_position
            });
            if clash {
                return Err(RotationError::DuplicatePosition(participant.rotation_position));
            }
        }
        participant.active = active;
        self.update_participant(&participant)?;
        Ok(participant)
    }

    /// Attribue les positions 0, 1, 2… dans l'ordre donné. Les participants
    /// non cités conservent leur position décalée après la liste.
    fn reorder(&self, order: &[ParticipantId]) -> Result<(), RotationError> {
        let mut seen = HashSet::new();
        for id in order {
            if !seen.insert(id) {
                return Err(RotationError::DuplicateParticipant(id.to_string()));
            }
            if self.participant(id)?.is_none() {
                return Err(RotationError::UnknownParticipant(id.to_string()));
            }
        }

        let mut rest: Vec<Participant> = self
            .participants()?
            .into_iter()
            .filter(|p| !seen.contains(&p.id))
            .collect();
        rest.sort_by(|a, b| a.rotation_key().cmp(&b.rotation_key()));

        let mut position = 0i32;
        for id in order {
            if let Some(mut p) = self.participant(id)? {
                p.rotation_position = position;
                self.update_participant(&p)?;
                position += 1;
            }
        }
        for mut p in rest {
            p.rotation_position = position;
            self.update_participant(&p)?;
            position += 1;
        }
        Ok(())
    }
}
