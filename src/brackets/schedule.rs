use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};

use crate::{
    brackets::{BracketError, Match, MatchStatus},
    rings::Ring,
    schema::matches,
};

/// Match numbers are `ring number * 100 + sequence`, so the sequence is kept
/// to two digits.
pub const MAX_SEQUENCE: i64 = 99;

impl Match {
    /// Places this match on `ring` at position `sequence` of the ring's
    /// queue.
    pub fn schedule(
        &mut self,
        ring: &Ring,
        sequence: i64,
    ) -> Result<(), BracketError> {
        if self.status.is_decided() {
            return Err(BracketError::InvalidState(format!(
                "This match has already been decided ({}).",
                self.status
            )));
        }
        if !(1..=MAX_SEQUENCE).contains(&sequence) {
            return Err(BracketError::ConstraintViolation(format!(
                "The sequence number must be between 1 and {MAX_SEQUENCE}."
            )));
        }

        self.ring_id = Some(ring.id.clone());
        self.sequence = Some(sequence);
        Ok(())
    }

    /// Writes back the ring placement.
    #[tracing::instrument(skip_all, fields(match_id = %self.id))]
    pub fn save_schedule(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(), diesel::result::Error> {
        diesel::update(matches::table.find(&self.id))
            .set((
                matches::ring_id.eq(&self.ring_id),
                matches::sequence.eq(self.sequence),
            ))
            .execute(conn)?;
        Ok(())
    }
}

/// Open matches on a ring, in the order they will be fought.
#[tracing::instrument(skip(conn))]
pub fn ring_queue(
    ring_id: &str,
    ready_only: bool,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Vec<Match>, diesel::result::Error> {
    let queue = matches::table
        .filter(matches::ring_id.eq(ring_id))
        .filter(matches::status.eq_any([
            MatchStatus::Pending.as_str(),
            MatchStatus::InProgress.as_str(),
        ]))
        .order_by((matches::sequence.asc(), matches::id.asc()))
        .load::<Match>(conn)?;

    Ok(queue
        .into_iter()
        .filter(|m| !ready_only || m.is_ready())
        .collect())
}
