use rand::{SeedableRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brackets::{Bracket, BracketError, Match, MatchStatus, RoundName};

/// How competitors are ordered before they are dealt into the first round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seeding {
    /// Registration order.
    Ordered,
    /// Registration order shuffled with the given seed.
    Shuffled(u64),
}

/// Builds the full bracket for `competitor_ids` (in registration order).
///
/// The bracket size is the smallest power of two that fits everybody.
/// Competitors are dealt into the first round like a deck of cards:
/// competitor `i` lands in match `i % m` (where `m` is the number of
/// first-round matches), taking slot 1 on the first pass and slot 2 on the
/// second. Since there are more than `m` competitors, every first-round match
/// gets somebody, and the byes end up in slot 2 of the last matches.
///
/// Byes are resolved (and their winners moved into the next round) before
/// this returns.
pub fn plan_bracket(
    division_id: &str,
    competitor_ids: &[String],
    seeding: Seeding,
) -> Result<Bracket, BracketError> {
    let n = competitor_ids.len();
    if n < 2 {
        return Err(BracketError::InvalidState(format!(
            "Need at least 2 competitors to generate a bracket (this division has {n})."
        )));
    }

    let mut seeded = competitor_ids.to_vec();
    if let Seeding::Shuffled(seed) = seeding {
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(seed);
        seeded.shuffle(&mut rng);
    }

    let size = n.next_power_of_two();
    let total_rounds = size.trailing_zeros() as i64;
    let first_round = size / 2;

    let mut slots: Vec<[Option<String>; 2]> = vec![[None, None]; first_round];
    for (i, competitor) in seeded.into_iter().enumerate() {
        slots[i % first_round][i / first_round] = Some(competitor);
    }

    tracing::debug!(
        "bracket of size {size} for {n} competitors ({} byes)",
        size - n
    );

    // ids are generated up front so that children can link to parents
    let ids: Vec<Vec<String>> = (1..=total_rounds)
        .map(|round| {
            (0..(size >> round))
                .map(|_| Uuid::now_v7().to_string())
                .collect()
        })
        .collect();

    let mut matches = Vec::with_capacity(size - 1);
    for (r, round_ids) in ids.iter().enumerate() {
        let round = r as i64 + 1;
        for (position, id) in round_ids.iter().enumerate() {
            let [competitor1_id, competitor2_id] = if round == 1 {
                slots[position].clone()
            } else {
                [None, None]
            };

            matches.push(Match {
                id: id.clone(),
                division_id: division_id.to_string(),
                round,
                position: position as i64,
                round_name: RoundName::for_round(round, total_rounds),
                competitor1_id,
                competitor2_id,
                winner_id: None,
                status: MatchStatus::Pending,
                ring_id: None,
                sequence: None,
                next_match_id: ids.get(r + 1).map(|next| next[position / 2].clone()),
            });
        }
    }

    let leaves = ids[0].clone();
    let mut bracket = Bracket::from_matches(division_id, matches);
    bracket.propagate(leaves);

    debug_assert!(bracket.check_tree().is_ok());

    Ok(bracket)
}
