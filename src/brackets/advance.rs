//! Recording results and moving winners up the bracket.

use serde::{Deserialize, Serialize};

use crate::brackets::{Bracket, BracketError, MatchStatus};

/// What a scorekeeper reports for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The match has started.
    Start,
    /// `winner` won, either on the scoreboard or because the opponent was
    /// disqualified.
    Win {
        winner: String,
        disqualification: bool,
    },
}

impl Bracket {
    /// Records `outcome` for `match_id` and advances the winner.
    ///
    /// Recording the result a decided match already has is a no-op;
    /// recording a different one is rejected (the winner has already moved
    /// on).
    #[tracing::instrument(skip(self), fields(division_id = %self.division_id))]
    pub fn record_result(
        &mut self,
        match_id: &str,
        outcome: Outcome,
    ) -> Result<(), BracketError> {
        let m = self.get(match_id).ok_or(BracketError::NotFound)?;

        match outcome {
            Outcome::Start => {
                if m.status.is_decided() {
                    return Err(BracketError::InvalidState(format!(
                        "This match has already been decided ({}).",
                        m.status
                    )));
                }
                if !m.is_ready() {
                    return Err(BracketError::InvalidState(
                        "Both competitors must be known before the match can start."
                            .to_string(),
                    ));
                }
                if m.status == MatchStatus::Pending {
                    if let Some(m) = self.get_mut(match_id) {
                        m.status = MatchStatus::InProgress;
                    }
                }
                Ok(())
            }
            Outcome::Win {
                winner,
                disqualification,
            } => {
                let status = if disqualification {
                    MatchStatus::Disqualification
                } else {
                    MatchStatus::Completed
                };

                if m.status.is_decided() {
                    if m.status == status
                        && m.winner_id.as_deref() == Some(winner.as_str())
                    {
                        tracing::debug!("result already recorded");
                        return Ok(());
                    }
                    return Err(BracketError::InvalidState(format!(
                        "A different result has already been recorded for this match ({}).",
                        m.status
                    )));
                }
                if !m.is_ready() {
                    return Err(BracketError::InvalidState(
                        "Both competitors must be known before a result can be recorded."
                            .to_string(),
                    ));
                }
                if !m.has_competitor(&winner) {
                    return Err(BracketError::ConstraintViolation(
                        "The winner must be one of the two competitors in this match."
                            .to_string(),
                    ));
                }

                if let Some(m) = self.get_mut(match_id) {
                    m.winner_id = Some(winner);
                    m.status = status;
                }
                tracing::info!("recorded {status} for match {match_id}");

                self.propagate(vec![match_id.to_string()]);
                Ok(())
            }
        }
    }

    /// Moves winners of decided matches into their parents, and resolves
    /// byes which this exposes, until nothing changes.
    ///
    /// This uses an explicit stack rather than recursion.
    pub(crate) fn propagate(&mut self, mut stack: Vec<String>) {
        while let Some(id) = stack.pop() {
            let Some(m) = self.get(&id) else {
                continue;
            };

            if m.status.is_decided() {
                let Some(next_id) = m.next_match_id.clone() else {
                    if let Some(champion) = &m.winner_id {
                        tracing::info!(
                            "division {} is complete (winner = {champion})",
                            self.division_id
                        );
                    }
                    continue;
                };

                let slot = m.feeds_slot();
                if let Some(winner) = m.winner_id.clone() {
                    let needs_update = self
                        .get(&next_id)
                        .is_some_and(|p| p.slot(slot) != Some(&winner));
                    if needs_update {
                        if let Some(parent) = self.get_mut(&next_id) {
                            *parent.slot_mut(slot) = Some(winner);
                        }
                    }
                }
                stack.push(next_id);
            } else if let Some(winner) = self.bye_resolution(&id) {
                if let Some(m) = self.get_mut(&id) {
                    tracing::debug!(
                        "match {} resolved as a bye (winner = {:?})",
                        m.id,
                        winner
                    );
                    m.winner_id = winner;
                    m.status = MatchStatus::CompletedBye;
                }
                stack.push(id);
            }
        }
    }

    /// If the match can never get a second competitor, returns its winner
    /// (`Some(None)` if it will never have any competitor at all).
    ///
    /// A slot is dead if it is empty and nothing can fill it: either this is
    /// a first-round match, or the feeding match was decided without a
    /// winner.
    fn bye_resolution(&self, match_id: &str) -> Option<Option<String>> {
        let m = self.get(match_id)?;
        let feeders = self.feeders(match_id);
        let is_leaf = feeders.iter().all(Option::is_none);

        let dead = |slot: usize| {
            m.slot(slot).is_none()
                && (is_leaf
                    || feeders[slot].is_some_and(|f| {
                        f.status.is_decided() && f.winner_id.is_none()
                    }))
        };

        match (m.competitor1_id.as_ref(), m.competitor2_id.as_ref()) {
            (Some(c), None) if dead(1) => Some(Some(c.clone())),
            (None, Some(c)) if dead(0) => Some(Some(c.clone())),
            (None, None) if dead(0) && dead(1) => Some(None),
            _ => None,
        }
    }
}
