use crate::model::{Participant, ParticipantId};
use std::collections::HashSet;

/// Indice de départ dans `ordered` : le premier participant placé après
/// `anchor` dans l'ordre de rotation, avec retour au début. Sans ancre, 0.
///
/// L'ancre n'a pas besoin d'être présente dans `ordered` (absente, désactivée).
pub fn rotation_start(ordered: &[Participant], anchor: Option<&Participant>) -> usize {
    let Some(anchor) = anchor else {
        return 0;
    };
    let key = anchor.rotation_key();
    ordered
        .iter()
        .position(|p| p.rotation_key() > key)
        .unwrap_or(0)
}

/// Choisit le participant du jour : parcours circulaire de `ordered` depuis
/// `rotation_start`, en sautant les absents. `None` si personne n'est disponible.
pub fn select_candidate<'a>(
    ordered: &'a [Participant],
    anchor: Option<&Participant>,
    absentees: &HashSet<ParticipantId>,
) -> Option<&'a Participant> {
    if ordered.is_empty() {
        return None;
    }
    let start = rotation_start(ordered, anchor);
    let total = ordered.len();
    (0..total)
        .map(|i| &ordered[(start + i) % total])
        .find(|p| !absentees.contains(&p.id))
}
