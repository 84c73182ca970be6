//! Reporting match results, from the scorekeeper screen and the JSON API.

use axum::{Form, Json, extract::Path};
use diesel::{connection::LoadConnection, sqlite::Sqlite};
use hypertext::prelude::*;
use serde::Deserialize;
use serde_json::json;

use crate::{
    brackets::{Bracket, BracketError, Match, MatchStatus, advance::Outcome},
    divisions::{Division, competitors::Competitor},
    rings::{Ring, scorekeeper::ScoreCard},
    state::Conn,
    util_resp::{FailureResponse, StandardResponse, json_ok, success},
    widgets::alert::SuccessAlert,
};

/// A result as submitted: a status string plus the winner, which is required
/// for everything except starting the match.
#[derive(Deserialize, Debug)]
pub struct ResultReport {
    pub status: String,
    #[serde(default)]
    pub winner_id: Option<String>,
}

impl ResultReport {
    pub fn outcome(self) -> Result<Outcome, BracketError> {
        let status = MatchStatus::try_from(self.status)
            .map_err(BracketError::ConstraintViolation)?;
        let winner = self.winner_id.filter(|id| !id.is_empty());

        match (status, winner) {
            (MatchStatus::InProgress, _) => Ok(Outcome::Start),
            (MatchStatus::Completed, Some(winner)) => Ok(Outcome::Win {
                winner,
                disqualification: false,
            }),
            (MatchStatus::Disqualification, Some(winner)) => Ok(Outcome::Win {
                winner,
                disqualification: true,
            }),
            (MatchStatus::Completed | MatchStatus::Disqualification, None) => {
                Err(BracketError::ConstraintViolation(
                    "A winner must be selected.".to_string(),
                ))
            }
            (status, _) => Err(BracketError::ConstraintViolation(format!(
                "`{status}` cannot be reported for a match."
            ))),
        }
    }
}

/// Applies `outcome` to `match_id` and writes back every match it changed.
#[tracing::instrument(skip(conn))]
pub fn report_result(
    match_id: &str,
    outcome: Outcome,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Result<Bracket, BracketError>, diesel::result::Error> {
    let m = match Match::fetch(match_id, conn) {
        Ok(m) => m,
        Err(diesel::result::Error::NotFound) => {
            return Ok(Err(BracketError::NotFound));
        }
        Err(e) => return Err(e),
    };

    let mut bracket = Bracket::load(&m.division_id, conn)?;
    if let Err(e) = bracket.record_result(match_id, outcome.clone()) {
        return Ok(Err(e));
    }
    let n = bracket.save(conn)?;

    tracing::info!("recorded {outcome:?} for match {match_id} ({n} matches updated)");
    Ok(Ok(bracket))
}

pub async fn record_result(
    Path(match_id): Path<String>,
    mut conn: Conn<true>,
    Json(report): Json<ResultReport>,
) -> StandardResponse {
    let outcome = report.outcome().map_err(FailureResponse::api)?;
    report_result(&match_id, outcome, &mut *conn)?
        .map_err(FailureResponse::api)?;

    json_ok(json!({ "message": "Result recorded and bracket updated." }))
}

/// The scorekeeper form. Replaces the match card with a confirmation.
pub async fn ui_record_result(
    Path(match_id): Path<String>,
    mut conn: Conn<true>,
    Form(report): Form<ResultReport>,
) -> StandardResponse {
    let outcome = report.outcome()?;
    let bracket = report_result(&match_id, outcome, &mut *conn)??;

    let Some(m) = bracket.get(&match_id) else {
        return Err(FailureResponse::from(BracketError::NotFound));
    };
    let ring = match &m.ring_id {
        Some(ring_id) => Some(Ring::fetch(ring_id, &mut *conn)?),
        None => None,
    };
    let title = match ring.as_ref().and_then(|r| m.match_number(r.number)) {
        Some(number) => format!("Match {number}"),
        None => "Match".to_string(),
    };

    let mut names = Competitor::names_of_division(&m.division_id, &mut *conn)?;

    // a started match keeps its card, so that the result can be entered
    if m.status == MatchStatus::InProgress {
        if let Some(ring) = &ring {
            let division = Division::fetch(&m.division_id, &mut *conn)?;
            return success(
                maud! {
                    ScoreCard
                        m=(m)
                        ring=(ring)
                        division=(Some(&division))
                        names=(&names);
                }
                .render(),
            );
        }
        return success(
            maud! {
                SuccessAlert
                    title=(&title)
                    msg=("is in progress.")
                    link=(None);
            }
            .render(),
        );
    }

    let winner = m
        .winner_id
        .as_ref()
        .and_then(|id| names.remove(id))
        .unwrap_or_default();
    let title = format!("{title} Complete");
    let msg = if m.next_match_id.is_none() {
        format!("{winner} wins the division!")
    } else {
        format!("{winner} advances to the next round!")
    };

    success(
        maud! {
            SuccessAlert
                title=(&title)
                msg=(&msg)
                link=(None);
        }
        .render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: &str, winner: Option<&str>) -> ResultReport {
        ResultReport {
            status: status.to_string(),
            winner_id: winner.map(str::to_string),
        }
    }

    #[test]
    fn reports_map_to_outcomes() {
        assert_eq!(report("In Progress", None).outcome(), Ok(Outcome::Start));
        assert_eq!(
            report("Completed", Some("a")).outcome(),
            Ok(Outcome::Win {
                winner: "a".to_string(),
                disqualification: false
            })
        );
        assert_eq!(
            report("Disqualification", Some("b")).outcome(),
            Ok(Outcome::Win {
                winner: "b".to_string(),
                disqualification: true
            })
        );
    }

    #[test]
    fn a_win_needs_a_winner() {
        assert!(matches!(
            report("Completed", None).outcome(),
            Err(BracketError::ConstraintViolation(_))
        ));
        assert!(matches!(
            report("Disqualification", Some("")).outcome(),
            Err(BracketError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn byes_and_unknown_statuses_cannot_be_reported() {
        assert!(report("Completed (Bye)", Some("a")).outcome().is_err());
        assert!(report("Pending", None).outcome().is_err());
        assert!(report("Won", Some("a")).outcome().is_err());
    }
}
