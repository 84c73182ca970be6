//! Single-elimination brackets.
//!
//! A bracket is the tree of [`Match`]es of a division, rooted at the Final.
//! Each match links to its parent through `next_match_id`; the parent's two
//! slots are fed by the children at positions `2k` and `2k + 1` of the round
//! below.
//!
//! - [`build`] turns an ordered list of competitors into a fresh bracket
//! - [`advance`] records results and moves winners up the tree
//! - [`schedule`] places matches on rings

use std::collections::{HashMap, HashSet};

use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::schema::matches;

pub mod advance;
pub mod build;
pub mod manage;
pub mod results;
pub mod schedule;
pub mod view;

/// The error messages will be shown to the user, and therefore should be
/// readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketError {
    NotFound,
    InvalidState(String),
    ConstraintViolation(String),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::NotFound => f.write_str("not found"),
            BracketError::InvalidState(msg) => write!(f, "{msg}"),
            BracketError::ConstraintViolation(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for BracketError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MatchStatus {
    Pending,
    InProgress,
    Completed,
    Disqualification,
    CompletedBye,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "Pending",
            MatchStatus::InProgress => "In Progress",
            MatchStatus::Completed => "Completed",
            MatchStatus::Disqualification => "Disqualification",
            MatchStatus::CompletedBye => "Completed (Bye)",
        }
    }

    /// Whether the match has a final outcome (which may be "nobody", for a
    /// bye with no competitors at all).
    pub fn is_decided(&self) -> bool {
        matches!(
            self,
            MatchStatus::Completed
                | MatchStatus::Disqualification
                | MatchStatus::CompletedBye
        )
    }

    pub fn is_open(&self) -> bool {
        !self.is_decided()
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for MatchStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(match value.as_str() {
            "Pending" => MatchStatus::Pending,
            "In Progress" => MatchStatus::InProgress,
            "Completed" => MatchStatus::Completed,
            "Disqualification" => MatchStatus::Disqualification,
            "Completed (Bye)" => MatchStatus::CompletedBye,
            _ => return Err(format!("unknown match status `{value}`")),
        })
    }
}

impl From<MatchStatus> for String {
    fn from(value: MatchStatus) -> Self {
        value.as_str().to_string()
    }
}

/// Round names, in bracket order (`Round 1 < Round 2 < Quarter-Final <
/// Semi-Final < Final`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub enum RoundName {
    Round(i64),
    QuarterFinal,
    SemiFinal,
    Final,
}

impl RoundName {
    /// Names round `round` (1-based, counted from the leaves) of a bracket
    /// with `total_rounds` rounds. The first round is always "Round 1"; later
    /// rounds are named by how many rounds remain.
    pub fn for_round(round: i64, total_rounds: i64) -> Self {
        if round == 1 {
            return RoundName::Round(1);
        }
        match total_rounds - round + 1 {
            1 => RoundName::Final,
            2 => RoundName::SemiFinal,
            3 => RoundName::QuarterFinal,
            _ => RoundName::Round(round),
        }
    }
}

impl std::fmt::Display for RoundName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundName::Round(n) => write!(f, "Round {n}"),
            RoundName::QuarterFinal => f.write_str("Quarter-Final"),
            RoundName::SemiFinal => f.write_str("Semi-Final"),
            RoundName::Final => f.write_str("Final"),
        }
    }
}

impl TryFrom<String> for RoundName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(match value.as_str() {
            "Quarter-Final" => RoundName::QuarterFinal,
            "Semi-Final" => RoundName::SemiFinal,
            "Final" => RoundName::Final,
            other => match other
                .strip_prefix("Round ")
                .and_then(|n| n.parse::<i64>().ok())
            {
                Some(n) => RoundName::Round(n),
                None => return Err(format!("unknown round name `{value}`")),
            },
        })
    }
}

impl From<RoundName> for String {
    fn from(value: RoundName) -> Self {
        value.to_string()
    }
}

#[derive(Queryable, Insertable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: String,
    pub division_id: String,
    /// 1-based, counted from the first round.
    pub round: i64,
    /// 0-based index within the round.
    pub position: i64,
    #[diesel(deserialize_as = String)]
    #[diesel(serialize_as = String)]
    pub round_name: RoundName,
    pub competitor1_id: Option<String>,
    pub competitor2_id: Option<String>,
    pub winner_id: Option<String>,
    #[diesel(deserialize_as = String)]
    #[diesel(serialize_as = String)]
    pub status: MatchStatus,
    pub ring_id: Option<String>,
    pub sequence: Option<i64>,
    pub next_match_id: Option<String>,
}

impl Match {
    pub fn slot(&self, slot: usize) -> Option<&String> {
        match slot {
            0 => self.competitor1_id.as_ref(),
            _ => self.competitor2_id.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: usize) -> &mut Option<String> {
        match slot {
            0 => &mut self.competitor1_id,
            _ => &mut self.competitor2_id,
        }
    }

    /// Which slot of the parent match this match's winner goes into.
    pub fn feeds_slot(&self) -> usize {
        (self.position % 2) as usize
    }

    /// Both competitors are known.
    pub fn is_ready(&self) -> bool {
        self.competitor1_id.is_some() && self.competitor2_id.is_some()
    }

    pub fn has_competitor(&self, competitor_id: &str) -> bool {
        self.competitor1_id.as_deref() == Some(competitor_id)
            || self.competitor2_id.as_deref() == Some(competitor_id)
    }

    /// The number announced at the ring (e.g. ring 5, sequence 25 is match
    /// 525).
    pub fn match_number(&self, ring_number: i64) -> Option<i64> {
        self.sequence.map(|seq| ring_number * 100 + seq)
    }

    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        match_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Match, diesel::result::Error> {
        matches::table.find(match_id).first::<Match>(conn)
    }
}

/// All matches of one division, kept in bracket order (round, then
/// position).
#[derive(Debug, Clone)]
pub struct Bracket {
    pub division_id: String,
    matches: IndexMap<String, Match>,
    changed: HashSet<String>,
}

impl Bracket {
    pub fn from_matches(division_id: &str, mut matches: Vec<Match>) -> Self {
        matches.sort_by_key(|m| (m.round, m.position));
        Self {
            division_id: division_id.to_string(),
            matches: matches.into_iter().map(|m| (m.id.clone(), m)).collect(),
            changed: HashSet::new(),
        }
    }

    #[tracing::instrument(skip(conn))]
    pub fn load(
        division_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self, diesel::result::Error> {
        let ret = matches::table
            .filter(matches::division_id.eq(division_id))
            .load::<Match>(conn)?;
        tracing::trace!("loaded {} matches", ret.len());
        Ok(Self::from_matches(division_id, ret))
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn get(&self, match_id: &str) -> Option<&Match> {
        self.matches.get(match_id)
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.values()
    }

    /// Matches grouped by round, earliest round first.
    pub fn rounds(&self) -> Vec<(RoundName, Vec<&Match>)> {
        self.matches
            .values()
            .chunk_by(|m| m.round)
            .into_iter()
            .map(|(_, group)| {
                let group = group.collect::<Vec<_>>();
                (group[0].round_name, group)
            })
            .collect()
    }

    /// The Final.
    pub fn root(&self) -> Option<&Match> {
        self.matches.values().find(|m| m.next_match_id.is_none())
    }

    /// The winner of the Final, once it has been decided.
    pub fn champion(&self) -> Option<&String> {
        self.root()
            .filter(|m| m.status.is_decided())
            .and_then(|m| m.winner_id.as_ref())
    }

    /// The two matches feeding `match_id`, indexed by the slot they feed.
    pub fn feeders(&self, match_id: &str) -> [Option<&Match>; 2] {
        let mut ret = [None, None];
        for m in self.matches.values() {
            if m.next_match_id.as_deref() == Some(match_id) {
                ret[m.feeds_slot()] = Some(m);
            }
        }
        ret
    }

    pub(crate) fn get_mut(&mut self, match_id: &str) -> Option<&mut Match> {
        let m = self.matches.get_mut(match_id)?;
        self.changed.insert(m.id.clone());
        Some(m)
    }

    /// Checks that the matches form a single tree rooted at the Final: one
    /// root, no dangling links, every link eventually reaches the root, and
    /// every parent has one feeder per slot from the round below.
    pub fn check_tree(&self) -> Result<(), BracketError> {
        let roots = self
            .matches
            .values()
            .filter(|m| m.next_match_id.is_none())
            .count();
        if roots != 1 {
            return Err(BracketError::InvalidState(format!(
                "bracket has {roots} root matches (expected exactly one)"
            )));
        }

        for start in self.matches.values() {
            let mut current = start;
            let mut steps = 0;
            while let Some(next) = &current.next_match_id {
                current = self.matches.get(next).ok_or_else(|| {
                    BracketError::InvalidState(format!(
                        "match {} links to a missing match",
                        current.id
                    ))
                })?;
                steps += 1;
                if steps > self.matches.len() {
                    return Err(BracketError::InvalidState(format!(
                        "cycle through match {}",
                        start.id
                    )));
                }
            }
        }

        let mut children: HashMap<&str, Vec<&Match>> = HashMap::new();
        for m in self.matches.values() {
            if let Some(next) = &m.next_match_id {
                children.entry(next.as_str()).or_default().push(m);
            }
        }
        for (parent_id, kids) in children {
            let parent = &self.matches[parent_id];
            let well_formed = kids.len() == 2
                && kids.iter().all(|k| {
                    k.round + 1 == parent.round
                        && k.position / 2 == parent.position
                })
                && kids[0].feeds_slot() != kids[1].feeds_slot();
            if !well_formed {
                return Err(BracketError::InvalidState(format!(
                    "match {parent_id} is not fed by exactly two matches"
                )));
            }
        }

        Ok(())
    }

    /// Returns the matches modified since the last call (in bracket order).
    pub fn take_changes(&mut self) -> Vec<Match> {
        let changed = std::mem::take(&mut self.changed);
        self.matches
            .values()
            .filter(|m| changed.contains(&m.id))
            .cloned()
            .collect()
    }

    /// Inserts every match of a freshly built bracket. Parents go in before
    /// their children so that `next_match_id` always refers to an existing
    /// row.
    #[tracing::instrument(skip_all, fields(division_id = %self.division_id))]
    pub fn insert(
        &mut self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(), diesel::result::Error> {
        self.changed.clear();
        for m in self.matches.values().rev() {
            diesel::insert_into(matches::table)
                .values(m.clone())
                .execute(conn)?;
        }
        Ok(())
    }

    /// Writes back the matches changed since the bracket was loaded.
    #[tracing::instrument(skip_all, fields(division_id = %self.division_id))]
    pub fn save(
        &mut self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<usize, diesel::result::Error> {
        let changes = self.take_changes();
        for m in &changes {
            let n = diesel::update(matches::table.find(&m.id))
                .set((
                    matches::competitor1_id.eq(&m.competitor1_id),
                    matches::competitor2_id.eq(&m.competitor2_id),
                    matches::winner_id.eq(&m.winner_id),
                    matches::status.eq(m.status.as_str()),
                    matches::ring_id.eq(&m.ring_id),
                    matches::sequence.eq(m.sequence),
                ))
                .execute(conn)?;
            debug_assert_eq!(n, 1);
        }
        tracing::debug!("saved {} matches", changes.len());
        Ok(changes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_names_depend_on_rounds_remaining() {
        assert_eq!(RoundName::for_round(1, 1), RoundName::Round(1));
        assert_eq!(RoundName::for_round(1, 2), RoundName::Round(1));
        assert_eq!(RoundName::for_round(2, 2), RoundName::Final);
        assert_eq!(RoundName::for_round(1, 3), RoundName::Round(1));
        assert_eq!(RoundName::for_round(2, 3), RoundName::SemiFinal);
        assert_eq!(RoundName::for_round(2, 4), RoundName::QuarterFinal);
        assert_eq!(RoundName::for_round(1, 5), RoundName::Round(1));
        assert_eq!(RoundName::for_round(2, 5), RoundName::Round(2));
        assert_eq!(RoundName::for_round(3, 5), RoundName::QuarterFinal);
        assert_eq!(RoundName::for_round(5, 5), RoundName::Final);
    }

    #[test]
    fn round_names_are_ordered() {
        let mut names = vec![
            RoundName::Final,
            RoundName::Round(2),
            RoundName::SemiFinal,
            RoundName::QuarterFinal,
            RoundName::Round(1),
        ];
        names.sort();
        assert_eq!(
            names,
            vec![
                RoundName::Round(1),
                RoundName::Round(2),
                RoundName::QuarterFinal,
                RoundName::SemiFinal,
                RoundName::Final,
            ]
        );
    }

    #[test]
    fn status_and_round_names_parse_their_display_form() {
        for status in [
            MatchStatus::Pending,
            MatchStatus::InProgress,
            MatchStatus::Completed,
            MatchStatus::Disqualification,
            MatchStatus::CompletedBye,
        ] {
            assert_eq!(MatchStatus::try_from(status.to_string()), Ok(status));
        }
        assert_eq!(
            RoundName::try_from("Round 4".to_string()),
            Ok(RoundName::Round(4))
        );
        assert!(RoundName::try_from("Round four".to_string()).is_err());
        assert!(MatchStatus::try_from("Done".to_string()).is_err());
    }

    #[test]
    fn unknown_ids_are_not_tracked_as_changes() {
        let ids = ["a", "b"].map(str::to_string);
        let mut bracket =
            build::plan_bracket("d", &ids, build::Seeding::Ordered).unwrap();
        bracket.take_changes();

        assert!(bracket.get_mut("missing").is_none());
        assert!(bracket.changed.is_empty());

        let id = bracket.root().unwrap().id.clone();
        assert!(bracket.get_mut(&id).is_some());
        assert_eq!(bracket.changed.len(), 1);
    }

    #[test]
    fn match_number_combines_ring_and_sequence() {
        let m = Match {
            id: "m".to_string(),
            division_id: "d".to_string(),
            round: 1,
            position: 0,
            round_name: RoundName::Final,
            competitor1_id: None,
            competitor2_id: None,
            winner_id: None,
            status: MatchStatus::Pending,
            ring_id: Some("r".to_string()),
            sequence: Some(25),
            next_match_id: None,
        };
        assert_eq!(m.match_number(5), Some(525));
    }
}
