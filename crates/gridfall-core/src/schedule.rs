//! Tick schedule driver.
//!
//! A game advances on a recurring wall-clock schedule: a cron expression
//! evaluated in an IANA timezone. [`ScheduleCursor`] turns that into a lazy,
//! infinite, forward-only sequence of UTC instants.
//!
//! # Semantics
//!
//! - The first instant yielded is the first trigger strictly after the
//!   starting instant.
//! - Every later instant is strictly after the one before it.
//! - The cursor never rewinds. Two cursors opened with the same arguments
//!   yield the same sequence term by term.
//!
//! Both the classic five-field form (`min hour dom month dow`) and the
//! six/seven-field form with seconds (and years) are accepted. A five-field
//! expression fires at second 0.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;

/// Field count of a classic cron expression without a seconds field.
const CLASSIC_FIELD_COUNT: usize = 5;

/// Errors that can occur when opening a schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The cron expression could not be parsed.
    #[error("invalid schedule expression {expression:?}: {reason}")]
    InvalidExpression {
        /// The expression as configured.
        expression: String,
        /// Parser message.
        reason: String,
    },

    /// The timezone is not a known IANA name.
    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),
}

/// Parse a cron expression, accepting the classic five-field form.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidExpression`] if the expression does not
/// parse.
pub fn parse_expression(expression: &str) -> Result<Schedule, ScheduleError> {
    let trimmed = expression.trim();
    let normalized = if trimmed.split_whitespace().count() == CLASSIC_FIELD_COUNT {
        format!("0 {trimmed}")
    } else {
        trimmed.to_owned()
    };
    Schedule::from_str(&normalized).map_err(|e| ScheduleError::InvalidExpression {
        expression: expression.to_owned(),
        reason: e.to_string(),
    })
}

/// Parse an IANA timezone name such as `Europe/Berlin`.
///
/// # Errors
///
/// Returns [`ScheduleError::UnknownTimezone`] if the name is not known.
pub fn parse_timezone(name: &str) -> Result<Tz, ScheduleError> {
    Tz::from_str(name.trim()).map_err(|_err| ScheduleError::UnknownTimezone(name.to_owned()))
}

/// Pull-based cursor over a schedule's trigger instants.
///
/// Each call to [`Iterator::next`] computes one more trigger; nothing beyond
/// the next instant is ever materialized. [`peek`](Self::peek) looks at the
/// upcoming instant without consuming it.
///
/// The iterator ends only if the expression has no further occurrences
/// (for example a year-bounded expression whose last year has passed).
#[derive(Debug, Clone)]
pub struct ScheduleCursor {
    /// The parsed expression.
    schedule: Schedule,
    /// Last computed trigger, in the schedule's own timezone.
    cursor: DateTime<Tz>,
    /// A trigger computed by `peek` and not yet consumed.
    peeked: Option<DateTime<Utc>>,
}

impl ScheduleCursor {
    /// Open a cursor yielding triggers strictly after `start`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] if the expression or timezone is invalid.
    pub fn open(
        expression: &str,
        timezone: &str,
        start: DateTime<Utc>,
    ) -> Result<Self, ScheduleError> {
        let schedule = parse_expression(expression)?;
        let tz = parse_timezone(timezone)?;
        Ok(Self {
            schedule,
            cursor: start.with_timezone(&tz),
            peeked: None,
        })
    }

    /// Return the next trigger without consuming it.
    pub fn peek(&mut self) -> Option<DateTime<Utc>> {
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        self.peeked
    }

    /// Compute the trigger after the cursor and move the cursor onto it.
    fn advance(&mut self) -> Option<DateTime<Utc>> {
        let next = self.schedule.after(&self.cursor).next()?;
        self.cursor = next;
        Some(next.with_timezone(&Utc))
    }
}

impl Iterator for ScheduleCursor {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        self.peeked.take().or_else(|| self.advance())
    }
}
