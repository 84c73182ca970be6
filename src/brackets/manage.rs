use std::collections::HashMap;

use axum::{
    Form,
    extract::{Path, Query, State},
};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    brackets::{
        Bracket, BracketError, Match,
        build::{Seeding, plan_bracket},
        schedule::MAX_SEQUENCE,
    },
    config::BracketSettings,
    divisions::{Division, competitors::Competitor},
    rings::Ring,
    schema::matches,
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, bad_request, success},
    widgets::{
        alert::{ErrorAlert, SuccessAlert},
        corners::TBD,
    },
};

/// Builds and stores a new bracket for the division.
///
/// An existing bracket is only replaced when `force` is set, since doing so
/// throws away every result recorded in it.
#[tracing::instrument(skip(conn))]
pub fn generate(
    division_id: &str,
    force: bool,
    seeding: Seeding,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Result<Bracket, BracketError>, diesel::result::Error> {
    let division = match Division::fetch(division_id, conn) {
        Ok(d) => d,
        Err(diesel::result::Error::NotFound) => {
            return Ok(Err(BracketError::NotFound));
        }
        Err(e) => return Err(e),
    };

    let existing = matches::table
        .filter(matches::division_id.eq(&division.id))
        .count()
        .get_result::<i64>(conn)?;
    if existing > 0 {
        if !force {
            return Ok(Err(BracketError::InvalidState(
                "A bracket already exists for this division.".to_string(),
            )));
        }
        diesel::delete(matches::table.filter(matches::division_id.eq(&division.id)))
            .execute(conn)?;
        tracing::info!("deleted {existing} matches of the previous bracket");
    }

    let competitor_ids = Competitor::of_division(&division.id, conn)?
        .into_iter()
        .map(|c| c.id)
        .collect::<Vec<_>>();

    let mut bracket = match plan_bracket(&division.id, &competitor_ids, seeding) {
        Ok(b) => b,
        Err(e) => return Ok(Err(e)),
    };
    bracket.insert(conn)?;

    tracing::info!(
        "generated a bracket of {} matches for {} competitors",
        bracket.len(),
        competitor_ids.len()
    );
    Ok(Ok(bracket))
}

#[derive(Deserialize)]
pub struct GenerateQuery {
    force: Option<bool>,
}

pub async fn generate_bracket(
    Path(division_id): Path<String>,
    Query(query): Query<GenerateQuery>,
    State(settings): State<BracketSettings>,
    mut conn: Conn<true>,
) -> StandardResponse {
    let division = Division::fetch(&division_id, &mut *conn)?;
    let n = Competitor::of_division(&division.id, &mut *conn)?.len();
    if n < 2 {
        return bad_request(
            maud! {
                ErrorAlert msg=("Need at least 2 competitors to generate a bracket.");
            }
            .render(),
        );
    }

    generate(
        &division.id,
        query.force.unwrap_or(false),
        settings.seeding(),
        &mut *conn,
    )??;

    let href = format!("/admin/divisions/{}/bracket_manage", division.id);
    let msg = format!("Bracket generated for {n} competitors.");
    success(
        maud! {
            SuccessAlert
                title=("Success!")
                msg=(&msg)
                link=(Some((href.as_str(), "Manage & Schedule Bracket")));
        }
        .render(),
    )
}

/// A bracket match on the manage page, with the form that puts it on a ring.
pub struct ScheduleCard<'r> {
    pub m: &'r Match,
    pub rings: &'r [Ring],
    pub names: &'r HashMap<String, String>,
}

impl<'r> ScheduleCard<'r> {
    fn name(&self, id: Option<&String>) -> &str {
        id.and_then(|id| self.names.get(id))
            .map(String::as_str)
            .unwrap_or(TBD)
    }

    fn scheduled_as(&self) -> Option<i64> {
        let ring_id = self.m.ring_id.as_ref()?;
        let ring = self.rings.iter().find(|r| &r.id == ring_id)?;
        self.m.match_number(ring.number)
    }
}

impl<'r> Renderable for ScheduleCard<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let m = self.m;
        let id = format!("match-{}", m.id);

        maud! {
            div class="card mb-2" id=(&id) {
                div class="card-body" {
                    div class="d-flex justify-content-between mb-2" {
                        span class="small text-muted" { (m.status.as_str()) }
                        span class="fw-bold text-primary" {
                            @if let Some(number) = self.scheduled_as() {
                                "Match " (number)
                            } @else {
                                "Unassigned"
                            }
                        }
                    }
                    div { span class="chung" { "Chung" } ": " (self.name(m.competitor1_id.as_ref())) }
                    div class="mb-2" { span class="hong" { "Hong" } ": " (self.name(m.competitor2_id.as_ref())) }

                    @if m.status.is_decided() {
                        @if let Some(winner) = &m.winner_id {
                            div class="small" { "Winner: " strong { (self.name(Some(winner))) } }
                        }
                    } @else {
                        form hx-put=(format!("/matches/{}/schedule", m.id))
                            hx-target=(format!("#{id}"))
                            hx-swap="outerHTML"
                            class="d-flex gap-2" {
                            select name="ring_id" class="form-select form-select-sm" required {
                                option value="" { "Select Ring..." }
                                @for ring in self.rings {
                                    option value=(ring.id) selected[m.ring_id.as_ref() == Some(&ring.id)] {
                                        (ring.name)
                                    }
                                }
                            }
                            input type="number"
                                name="ring_sequence"
                                class="form-control form-control-sm"
                                style="width: 6rem"
                                min="1"
                                max=(MAX_SEQUENCE.to_string())
                                value=(m.sequence.map(|s| s.to_string()).unwrap_or_default())
                                required;
                            button type="submit" class="btn btn-sm btn-primary" { "Save" }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

pub async fn bracket_manage_page(
    Path(division_id): Path<String>,
    mut conn: Conn<false>,
) -> StandardResponse {
    let division = Division::fetch(&division_id, &mut *conn)?;
    let bracket = Bracket::load(&division.id, &mut *conn)?;
    let rings = Ring::all(&mut *conn)?;
    let names = Competitor::names_of_division(&division.id, &mut *conn)?;
    let rounds = bracket.rounds();

    success(
        Page::new()
            .title(format!("{} bracket", division.name))
            .active_nav("admin")
            .body(maud! {
                div class="d-flex justify-content-between align-items-center mb-4" {
                    h1 class="h3 mb-0" { "Schedule: " (division.name) }
                    a class="btn btn-outline-secondary" href=(format!("/ui/divisions/{}/bracket", division.id)) {
                        "View bracket"
                    }
                }
                @if rounds.is_empty() {
                    p class="text-muted" { "No bracket generated yet." }
                }
                div class="d-flex gap-4 overflow-auto" {
                    @for (round_name, round) in &rounds {
                        div class="bracket-round" {
                            h2 class="h5" { (round_name.to_string()) }
                            @for m in round {
                                ScheduleCard m=(*m) rings=(&rings) names=(&names);
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct ScheduleForm {
    ring_id: String,
    ring_sequence: String,
}

pub async fn schedule_match(
    Path(match_id): Path<String>,
    mut conn: Conn<true>,
    Form(form): Form<ScheduleForm>,
) -> StandardResponse {
    let mut m = Match::fetch(&match_id, &mut *conn)?;
    let ring = Ring::fetch(&form.ring_id, &mut *conn)?;
    let sequence = form.ring_sequence.trim().parse::<i64>().map_err(|_| {
        FailureResponse::from(BracketError::ConstraintViolation(
            "The sequence number must be a whole number.".to_string(),
        ))
    })?;

    m.schedule(&ring, sequence)?;
    m.save_schedule(&mut *conn)?;
    tracing::info!("scheduled match {} on ring {} at {sequence}", m.id, ring.number);

    let rings = Ring::all(&mut *conn)?;
    let names = Competitor::names_of_division(&m.division_id, &mut *conn)?;
    success(
        maud! {
            ScheduleCard m=(&m) rings=(&rings) names=(&names);
        }
        .render(),
    )
}
