//! The public board: what is happening on every ring.

use std::collections::HashMap;

use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;

use crate::{
    brackets::{Match, MatchStatus, schedule::ring_queue},
    divisions::{Division, competitors::Competitor},
    rings::Ring,
    schema::{competitors, divisions},
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, success},
    widgets::corners::Corners,
};

pub struct RingBoards {
    pub boards: Vec<(Ring, Vec<Match>)>,
    pub divisions: HashMap<String, Division>,
    pub names: HashMap<String, String>,
}

impl RingBoards {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self, diesel::result::Error> {
        let mut boards = Vec::new();
        for ring in Ring::all(conn)? {
            let queue = ring_queue(&ring.id, false, conn)?;
            boards.push((ring, queue));
        }

        let division_ids = boards
            .iter()
            .flat_map(|(_, queue)| queue.iter().map(|m| m.division_id.clone()))
            .collect::<Vec<_>>();
        let competitor_ids = boards
            .iter()
            .flat_map(|(_, queue)| {
                queue.iter().flat_map(|m| {
                    [m.competitor1_id.clone(), m.competitor2_id.clone()]
                })
            })
            .flatten()
            .collect::<Vec<_>>();

        let divisions = divisions::table
            .filter(divisions::id.eq_any(&division_ids))
            .load::<Division>(conn)?
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();
        let names = competitors::table
            .filter(competitors::id.eq_any(&competitor_ids))
            .load::<Competitor>(conn)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        Ok(Self {
            boards,
            divisions,
            names,
        })
    }

    fn name(&self, id: Option<&String>) -> Option<&str> {
        id.and_then(|id| self.names.get(id)).map(String::as_str)
    }
}

impl Renderable for RingBoards {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="row g-4" {
                @if self.boards.is_empty() {
                    p class="text-muted" { "No rings have been set up yet." }
                }
                @for (ring, queue) in &self.boards {
                    div class="col-md-6 col-lg-4" {
                        div class="card h-100" {
                            div class="card-header" {
                                h2 class="h5 mb-0" { (ring.name) }
                            }
                            ul class="list-group list-group-flush" {
                                @if queue.is_empty() {
                                    li class="list-group-item text-muted" {
                                        "No upcoming matches."
                                    }
                                }
                                @for m in queue {
                                    li class="list-group-item" {
                                        div class="d-flex justify-content-between" {
                                            span {
                                                strong {
                                                    @if let Some(number) = m.match_number(ring.number) {
                                                        (number)
                                                    }
                                                }
                                                " - "
                                                @if let Some(division) = self.divisions.get(&m.division_id) {
                                                    a href=(format!("/ui/divisions/{}/bracket", division.id)) {
                                                        (division.name)
                                                    }
                                                }
                                                " (" (m.round_name.to_string()) ")"
                                            }
                                            @if m.status == MatchStatus::InProgress {
                                                span class="badge text-bg-warning" { (m.status.as_str()) }
                                            } @else {
                                                span class="badge text-bg-secondary" { (m.status.as_str()) }
                                            }
                                        }
                                        Corners
                                            chung=(self.name(m.competitor1_id.as_ref()))
                                            hong=(self.name(m.competitor2_id.as_ref()))
                                            short=(true);
                                    }
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

pub async fn public_rings_page(mut conn: Conn<false>) -> StandardResponse {
    let boards = RingBoards::fetch(&mut *conn)?;

    success(
        Page::new()
            .title("Live Rings")
            .active_nav("rings")
            .body(maud! {
                h1 class="h3 mb-4" { "Live Rings" }
                div hx-get="/ui/public_rings" hx-trigger="every 10s" hx-swap="innerHTML" {
                    (boards)
                }
            })
            .render(),
    )
}

pub async fn public_rings_fragment(mut conn: Conn<false>) -> StandardResponse {
    let boards = RingBoards::fetch(&mut *conn)?;
    success(maud! { (boards) }.render())
}
