use std::collections::HashMap;

use axum::{extract::Path, http::StatusCode};
use hypertext::prelude::*;
use serde_json::{Value, json};

use crate::{
    brackets::{Bracket, Match, MatchStatus},
    divisions::{Division, competitors::Competitor},
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, json_err, json_ok, success},
    widgets::corners::TBD,
};

fn competitor_json(
    id: Option<&String>,
    names: &HashMap<String, String>,
) -> Value {
    match id.and_then(|id| names.get(id).map(|name| (id, name))) {
        Some((id, name)) => json!({ "id": id, "name": name }),
        None => Value::Null,
    }
}

pub fn bracket_json(bracket: &Bracket, names: &HashMap<String, String>) -> Value {
    json!(
        bracket
            .matches()
            .map(|m| json!({
                "match_id": m.id,
                "round_name": m.round_name,
                "status": m.status,
                "ring_id": m.ring_id,
                "next_match_id": m.next_match_id,
                "competitor1": competitor_json(m.competitor1_id.as_ref(), names),
                "competitor2": competitor_json(m.competitor2_id.as_ref(), names),
                "winner_id": m.winner_id,
            }))
            .collect::<Vec<_>>()
    )
}

pub async fn get_bracket(
    Path(division_id): Path<String>,
    mut conn: Conn<false>,
) -> StandardResponse {
    let bracket = Bracket::load(&division_id, &mut *conn)?;
    if bracket.is_empty() {
        return json_err(
            StatusCode::NOT_FOUND,
            "No bracket found for this division.",
        );
    }

    let names = Competitor::names_of_division(&division_id, &mut *conn)?;
    json_ok(bracket_json(&bracket, &names))
}

/// The bracket drawn as one column per round.
pub struct BracketTree<'r> {
    pub bracket: &'r Bracket,
    pub names: &'r HashMap<String, String>,
}

impl<'r> BracketTree<'r> {
    fn name(&self, id: Option<&String>) -> &str {
        id.and_then(|id| self.names.get(id))
            .map(String::as_str)
            .unwrap_or(TBD)
    }

    fn corner_class(m: &Match, id: Option<&String>) -> &'static str {
        match (&m.winner_id, id) {
            (Some(winner), Some(id)) if winner == id => "fw-bold",
            (Some(_), Some(_)) => "text-muted text-decoration-line-through",
            _ => "",
        }
    }
}

impl<'r> Renderable for BracketTree<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let champion = self.bracket.champion();

        maud! {
            @if let Some(champion) = champion {
                div class="alert alert-success" {
                    "Champion: " strong { (self.name(Some(champion))) }
                }
            }
            div class="d-flex gap-4 overflow-auto" {
                @for (round_name, round) in self.bracket.rounds() {
                    div class="bracket-round d-flex flex-column justify-content-around" {
                        h2 class="h6 text-uppercase text-muted" { (round_name.to_string()) }
                        @for m in round {
                            div class="card mb-2" {
                                ul class="list-group list-group-flush" {
                                    li class=(format!("list-group-item {}", Self::corner_class(m, m.competitor1_id.as_ref()))) {
                                        span class="chung" { "● " }
                                        (self.name(m.competitor1_id.as_ref()))
                                    }
                                    li class=(format!("list-group-item {}", Self::corner_class(m, m.competitor2_id.as_ref()))) {
                                        span class="hong" { "● " }
                                        (self.name(m.competitor2_id.as_ref()))
                                    }
                                }
                                @if m.status != MatchStatus::Pending {
                                    div class="card-footer small text-muted" { (m.status.as_str()) }
                                }
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

pub async fn bracket_fragment(
    Path(division_id): Path<String>,
    mut conn: Conn<false>,
) -> StandardResponse {
    let bracket = Bracket::load(&division_id, &mut *conn)?;
    if bracket.is_empty() {
        return Err(FailureResponse::NotFound(()));
    }

    let names = Competitor::names_of_division(&division_id, &mut *conn)?;
    success(
        maud! {
            BracketTree bracket=(&bracket) names=(&names);
        }
        .render(),
    )
}

pub async fn bracket_page(
    Path(division_id): Path<String>,
    mut conn: Conn<false>,
) -> StandardResponse {
    let division = Division::fetch(&division_id, &mut *conn)?;
    let bracket = Bracket::load(&division.id, &mut *conn)?;
    let names = Competitor::names_of_division(&division.id, &mut *conn)?;

    success(
        Page::new()
            .title(&division.name)
            .active_nav("rings")
            .body(maud! {
                h1 class="h3 mb-4" { (division.name) }
                @if bracket.is_empty() {
                    p class="text-muted" { "No bracket generated yet." }
                } @else {
                    div hx-get=(format!("/divisions/{}/bracket_ui", division.id))
                        hx-trigger="every 10s"
                        hx-swap="innerHTML" {
                        BracketTree bracket=(&bracket) names=(&names);
                    }
                }
            })
            .render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brackets::build::{Seeding, plan_bracket};

    #[test]
    fn json_lists_every_match_with_competitor_objects() {
        let ids = ["a", "b", "c"].map(str::to_string);
        let bracket = plan_bracket("d", &ids, Seeding::Ordered).unwrap();
        let names = ids
            .iter()
            .map(|id| (id.clone(), id.to_uppercase()))
            .collect::<HashMap<_, _>>();

        let value = bracket_json(&bracket, &names);
        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 3);

        // (a, c) and (b, bye) in the first round
        assert_eq!(list[0]["round_name"], "Round 1");
        assert_eq!(list[0]["competitor1"], json!({ "id": "a", "name": "A" }));
        assert_eq!(list[0]["competitor2"], json!({ "id": "c", "name": "C" }));
        assert_eq!(list[1]["status"], "Completed (Bye)");
        assert_eq!(list[1]["competitor2"], Value::Null);
        assert_eq!(list[1]["winner_id"], "b");

        assert_eq!(list[2]["round_name"], "Final");
        assert_eq!(list[2]["next_match_id"], Value::Null);
        assert_eq!(list[2]["competitor2"], json!({ "id": "b", "name": "B" }));
    }
}
