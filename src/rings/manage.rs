use axum::{Form, Json, extract::Path, http::StatusCode};
use hypertext::prelude::*;
use serde::Deserialize;
use serde_json::json;

use crate::{
    rings::Ring,
    state::Conn,
    util_resp::{
        StandardResponse, bad_request, json_created, json_err, json_ok,
        success,
    },
    widgets::alert::ErrorAlert,
};

#[derive(Deserialize)]
pub struct RingBody {
    name: Option<String>,
}

pub async fn list_rings(mut conn: Conn<false>) -> StandardResponse {
    let rings = Ring::all(&mut *conn)?;
    json_ok(json!(
        rings
            .iter()
            .map(|r| json!({ "id": r.id, "name": r.name, "number": r.number }))
            .collect::<Vec<_>>()
    ))
}

pub async fn create_ring(
    mut conn: Conn<true>,
    Json(body): Json<RingBody>,
) -> StandardResponse {
    let name = match body.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return json_err(StatusCode::BAD_REQUEST, "a name is required"),
    };

    let ring = Ring::create(&name, &mut *conn)?;
    json_created(json!({ "message": "Ring created", "id": ring.id }))
}

struct RingItem<'r> {
    ring: &'r Ring,
}

impl<'r> Renderable for RingItem<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let ring = self.ring;
        maud! {
            li class="list-group-item d-flex justify-content-between align-items-center" {
                span {
                    (ring.name)
                    span class="text-muted ms-2 small" { "#" (ring.number) }
                }
                div class="d-flex gap-2" {
                    a class="btn btn-sm btn-outline-primary"
                        href=(format!("/ring/{}/scorekeeper", ring.id)) {
                        "Score Keeper"
                    }
                    button class="btn btn-sm btn-outline-danger"
                        hx-delete=(format!("/ui/rings/{}", ring.id))
                        hx-target="closest li"
                        hx-swap="outerHTML"
                        hx-confirm=(format!("Are you sure you want to delete {}?", ring.name)) {
                        "Delete"
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

#[derive(Deserialize)]
pub struct AddRingForm {
    name: String,
}

pub async fn ui_add_ring(
    mut conn: Conn<true>,
    Form(form): Form<AddRingForm>,
) -> StandardResponse {
    let name = form.name.trim();
    if name.is_empty() {
        return bad_request(
            maud! { ErrorAlert msg=("The ring needs a name."); }.render(),
        );
    }

    let ring = Ring::create(name, &mut *conn)?;
    success(maud! { RingItem ring=(&ring); }.render())
}

pub async fn ui_rings_list(mut conn: Conn<false>) -> StandardResponse {
    let rings = Ring::all(&mut *conn)?;
    success(
        maud! {
            @for ring in &rings {
                RingItem ring=(ring);
            }
        }
        .render(),
    )
}

/// Returns an empty body, which htmx swaps in for the deleted list item.
pub async fn ui_delete_ring(
    Path(ring_id): Path<String>,
    mut conn: Conn<true>,
) -> StandardResponse {
    Ring::delete(&ring_id, &mut *conn)?;
    success(maud! { "" }.render())
}
