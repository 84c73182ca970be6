use axum::{
    Form, Json,
    extract::Path,
    http::StatusCode,
};
use hypertext::prelude::*;
use serde::Deserialize;
use serde_json::json;

use crate::{
    brackets::Bracket,
    divisions::{
        Division,
        competitors::{Competitor, CompetitorList},
    },
    state::Conn,
    template::Page,
    util_resp::{
        FailureResponse, StandardResponse, bad_request, json_created,
        json_err, json_ok, success,
    },
    widgets::alert::ErrorAlert,
};

#[derive(Deserialize)]
pub struct DivisionBody {
    name: Option<String>,
}

pub async fn list_divisions(mut conn: Conn<false>) -> StandardResponse {
    let divisions = Division::all(&mut *conn)?;
    json_ok(json!(
        divisions
            .iter()
            .map(|d| json!({ "id": d.id, "name": d.name }))
            .collect::<Vec<_>>()
    ))
}

pub async fn create_division(
    mut conn: Conn<true>,
    Json(body): Json<DivisionBody>,
) -> StandardResponse {
    let name = match body.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return json_err(StatusCode::BAD_REQUEST, "a name is required"),
    };

    let division = Division::create(&name, &mut *conn)?;
    json_created(json!({ "message": "Division created", "id": division.id }))
}

pub async fn update_division(
    Path(division_id): Path<String>,
    mut conn: Conn<true>,
    Json(body): Json<DivisionBody>,
) -> StandardResponse {
    let mut division = match Division::fetch(&division_id, &mut *conn) {
        Ok(d) => d,
        Err(diesel::result::Error::NotFound) => {
            return json_err(StatusCode::NOT_FOUND, "division not found");
        }
        Err(e) => return Err(FailureResponse::from(e)),
    };

    if let Some(name) = body.name.as_deref().map(str::trim) {
        if !name.is_empty() {
            division.rename(name, &mut *conn)?;
        }
    }

    json_ok(json!({ "message": "Division updated" }))
}

pub async fn delete_division(
    Path(division_id): Path<String>,
    mut conn: Conn<true>,
) -> StandardResponse {
    match Division::delete(&division_id, &mut *conn) {
        Ok(()) => json_ok(json!({ "message": "Division deleted" })),
        Err(diesel::result::Error::NotFound) => {
            json_err(StatusCode::NOT_FOUND, "division not found")
        }
        Err(e) => Err(FailureResponse::from(e)),
    }
}

struct DivisionItem<'r> {
    division: &'r Division,
}

impl<'r> Renderable for DivisionItem<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let division = self.division;
        maud! {
            li class="list-group-item d-flex justify-content-between align-items-center" {
                span { (division.name) }
                div class="d-flex gap-2" {
                    a class="btn btn-sm btn-outline-primary"
                        href=(format!("/admin/divisions/{}/setup", division.id)) {
                        "Manage"
                    }
                    button class="btn btn-sm btn-outline-danger"
                        hx-delete=(format!("/ui/divisions/{}", division.id))
                        hx-target="closest li"
                        hx-swap="outerHTML"
                        hx-confirm=(format!("Delete division {} and all its matches?", division.name)) {
                        "Delete"
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

#[derive(Deserialize)]
pub struct AddDivisionForm {
    name: String,
}

pub async fn ui_add_division(
    mut conn: Conn<true>,
    Form(form): Form<AddDivisionForm>,
) -> StandardResponse {
    let name = form.name.trim();
    if name.is_empty() {
        return bad_request(
            maud! { ErrorAlert msg=("The division needs a name."); }.render(),
        );
    }

    let division = Division::create(name, &mut *conn)?;
    success(maud! { DivisionItem division=(&division); }.render())
}

pub async fn ui_divisions_list(mut conn: Conn<false>) -> StandardResponse {
    let divisions = Division::all(&mut *conn)?;
    success(
        maud! {
            @for division in &divisions {
                DivisionItem division=(division);
            }
        }
        .render(),
    )
}

/// Returns an empty body, which htmx swaps in for the deleted list item.
pub async fn ui_delete_division(
    Path(division_id): Path<String>,
    mut conn: Conn<true>,
) -> StandardResponse {
    Division::delete(&division_id, &mut *conn)?;
    success(maud! { "" }.render())
}

pub async fn division_setup_page(
    Path(division_id): Path<String>,
    mut conn: Conn<false>,
) -> StandardResponse {
    let division = Division::fetch(&division_id, &mut *conn)?;
    let competitors = Competitor::of_division(&division.id, &mut *conn)?;
    let bracket_exists = !Bracket::load(&division.id, &mut *conn)?.is_empty();

    success(
        Page::new()
            .title(&division.name)
            .active_nav("admin")
            .body(maud! {
                h1 class="h3 mb-4" { (division.name) }
                div class="row g-4" {
                    div class="col-md-6" {
                        div class="card" {
                            div class="card-body" {
                                h2 class="h5" { "Competitors" }
                                form hx-post=(format!("/ui/divisions/{}/competitors", division.id))
                                    hx-target="#competitors"
                                    hx-swap="innerHTML" {
                                    label for="names" class="form-label" {
                                        "Names (one per line)"
                                    }
                                    textarea class="form-control mb-2" id="names" name="names" rows="6" {}
                                    button type="submit" class="btn btn-primary" { "Add competitors" }
                                }
                                ul id="competitors" class="list-group mt-3" {
                                    CompetitorList competitors=(&competitors);
                                }
                            }
                        }
                    }
                    div class="col-md-6" {
                        div class="card" {
                            div class="card-body" {
                                h2 class="h5" { "Bracket" }
                                @if bracket_exists {
                                    p {
                                        "A bracket already exists for this division. "
                                        a href=(format!("/admin/divisions/{}/bracket_manage", division.id)) {
                                            "Manage & schedule it"
                                        }
                                        " or "
                                        a href=(format!("/ui/divisions/{}/bracket", division.id)) {
                                            "view it"
                                        }
                                        "."
                                    }
                                    button class="btn btn-danger"
                                        hx-post=(format!("/divisions/{}/generate_bracket?force=true", division.id))
                                        hx-target="#bracket-result"
                                        hx-confirm="This deletes the existing bracket and every recorded result. Continue?" {
                                        "Delete existing bracket and generate a new one"
                                    }
                                } @else {
                                    button class="btn btn-primary"
                                        hx-post=(format!("/divisions/{}/generate_bracket", division.id))
                                        hx-target="#bracket-result" {
                                        "Generate bracket"
                                    }
                                }
                                div id="bracket-result" class="mt-3" {}
                            }
                        }
                    }
                }
            })
            .render(),
    )
}
