#![forbid(unsafe_code)]
//! Lunch roster : rotation quotidienne d'une corvée entre participants.
//!
//! - Un participant par jour ouvré, round-robin par position de rotation.
//! - Week-ends et jours fériés sautés, absences respectées.
//! - Échanges et complétions a posteriori, deux comptabilités distinctes.
//! - Stockage derrière des traits ; implémentation mémoire + fichier JSON.

pub mod absence;
pub mod calendar;
pub mod directory;
pub mod io;
pub mod ledger;
pub mod model;
pub mod report;
pub mod scheduler;
pub mod storage;
pub mod store;

pub use absence::AbsenceRegistry;
pub use calendar::{is_weekend, HolidayCalendar};
pub use directory::ParticipantDirectory;
pub use ledger::{AssignmentFilter, AssignmentLedger, Completion};
pub use model::{
    Absence, Assignment, AssignmentId, AssignmentStatus, Holiday, Participant, ParticipantId,
    Roster,
};
pub use report::{distribution, Distribution, DistributionRow, Fairness};
pub use scheduler::{
    PreviewEntry, ResetSummary, Resolution, RotationEngine, RotationError, RotationOptions,
};
pub use storage::{JsonStorage, Storage};
pub use store::{MemoryStore, RosterStore};
