//! Politique calendaire : week-ends fixes (samedi, dimanche) et jours fériés.

use crate::model::Holiday;
use crate::scheduler::RotationError;
use chrono::{Datelike, NaiveDate, Weekday};

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub trait HolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> Result<bool, RotationError>;
    /// Jours fériés triés par date.
    fn holidays(&self) -> Result<Vec<Holiday>, RotationError>;
    /// Échoue avec `DuplicateHoliday` si la date est déjà enregistrée.
    fn add_holiday(&self, holiday: Holiday) -> Result<(), RotationError>;
    fn remove_holiday(&self, date: NaiveDate) -> Result<bool, RotationError>;

    fn is_working_day(&self, date: NaiveDate) -> Result<bool, RotationError> {
        if is_weekend(date) {
            return Ok(false);
        }
        Ok(!self.is_holiday(date)?)
    }

    /// Premier jour ouvré strictement après `date`, au plus `max_lookahead` jours plus loin.
    fn next_working_day_after(
        &self,
        date: NaiveDate,
        max_lookahead: u32,
    ) -> Result<NaiveDate, RotationError> {
        let not_found = || RotationError::NoWorkingDayFound {
            after: date,
            lookahead: max_lookahead,
        };
        let mut current = date;
        for _ in 0..max_lookahead {
            current = current.succ_opt().ok_or_else(not_found)?;
            if self.is_working_day(current)? {
                return Ok(current);
            }
        }
        Err(not_found())
    }
}
