use std::collections::HashMap;

use axum::extract::Path;
use hypertext::prelude::*;

use crate::{
    brackets::{Match, MatchStatus, schedule::ring_queue},
    divisions::{Division, competitors::Competitor},
    rings::Ring,
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, success},
    widgets::corners::TBD,
};

/// The controls a scorekeeper uses for one match.
pub struct ScoreCard<'r> {
    pub m: &'r Match,
    pub ring: &'r Ring,
    pub division: Option<&'r Division>,
    pub names: &'r HashMap<String, String>,
}

impl<'r> ScoreCard<'r> {
    fn name(&self, id: Option<&String>) -> &str {
        id.and_then(|id| self.names.get(id))
            .map(String::as_str)
            .unwrap_or(TBD)
    }
}

impl<'r> Renderable for ScoreCard<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let m = self.m;
        let action = format!("/ui/matches/{}/result", m.id);
        let target = format!("#match-{}", m.id);

        maud! {
            div class="card mb-3" id=(format!("match-{}", m.id)) {
                div class="card-header d-flex justify-content-between" {
                    span {
                        strong {
                            "Match "
                            @if let Some(number) = m.match_number(self.ring.number) {
                                (number)
                            }
                        }
                        @if let Some(division) = self.division {
                            " - " (division.name)
                        }
                        " (" (m.round_name.to_string()) ")"
                    }
                    span class="badge text-bg-secondary" { (m.status.as_str()) }
                }
                div class="card-body" {
                    div { span class="chung" { "Chung" } ": " (self.name(m.competitor1_id.as_ref())) }
                    div class="mb-3" { span class="hong" { "Hong" } ": " (self.name(m.competitor2_id.as_ref())) }

                    @if m.status == MatchStatus::Pending {
                        form hx-post=(&action) hx-target=(&target) hx-swap="outerHTML" class="mb-2" {
                            input type="hidden" name="status" value=(MatchStatus::InProgress.as_str());
                            button type="submit" class="btn btn-warning" { "Start match" }
                        }
                    }

                    form hx-post=(&action) hx-target=(&target) hx-swap="outerHTML" class="d-flex gap-2" {
                        select name="winner_id" class="form-select" required {
                            option value="" { "Select winner..." }
                            @if let Some(id) = &m.competitor1_id {
                                option value=(id) { "Chung: " (self.name(Some(id))) }
                            }
                            @if let Some(id) = &m.competitor2_id {
                                option value=(id) { "Hong: " (self.name(Some(id))) }
                            }
                        }
                        select name="status" class="form-select" {
                            option value=(MatchStatus::Completed.as_str()) { "Won" }
                            option value=(MatchStatus::Disqualification.as_str()) { "Won by disqualification" }
                        }
                        button type="submit" class="btn btn-success" { "Record" }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

pub async fn ring_scorekeeper_page(
    Path(ring_id): Path<String>,
    mut conn: Conn<false>,
) -> StandardResponse {
    let ring = Ring::fetch(&ring_id, &mut *conn)?;
    let queue = ring_queue(&ring.id, true, &mut *conn)?;

    let mut divisions = HashMap::new();
    let mut names = HashMap::new();
    for m in &queue {
        if !divisions.contains_key(&m.division_id) {
            divisions.insert(
                m.division_id.clone(),
                Division::fetch(&m.division_id, &mut *conn)?,
            );
            names.extend(Competitor::names_of_division(
                &m.division_id,
                &mut *conn,
            )?);
        }
    }

    success(
        Page::new()
            .title(format!("{} scorekeeper", ring.name))
            .body(maud! {
                div class="d-flex justify-content-between align-items-center mb-4" {
                    h1 class="h3 mb-0" { (ring.name) " - Score Keeper" }
                    button class="btn btn-outline-secondary" onclick="location.reload()" { "Refresh" }
                }
                @if queue.is_empty() {
                    p class="text-muted" { "No matches are ready on this ring." }
                }
                @for m in &queue {
                    ScoreCard
                        m=(m)
                        ring=(&ring)
                        division=(divisions.get(&m.division_id))
                        names=(&names);
                }
            })
            .render(),
    )
}
