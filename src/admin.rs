use hypertext::prelude::*;

use crate::{
    template::Page,
    util_resp::{StandardResponse, success},
};

struct AddForm<'r> {
    action: &'r str,
    target: &'r str,
    placeholder: &'r str,
    button: &'r str,
}

impl<'r> Renderable for AddForm<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            form hx-post=(self.action)
                hx-target=(self.target)
                hx-swap="beforeend"
                class="d-flex gap-2 mb-3" {
                input type="text"
                    name="name"
                    class="form-control"
                    placeholder=(self.placeholder)
                    required;
                button type="submit" class="btn btn-primary" { (self.button) }
            }
        }
        .render_to(buffer);
    }
}

/// The lists are loaded by htmx once the page is shown.
pub async fn admin_page() -> StandardResponse {
    success(
        Page::new()
            .title("Admin")
            .active_nav("admin")
            .body(maud! {
                h1 class="h3 mb-4" { "Tournament admin" }
                div class="row g-4" {
                    div class="col-md-6" {
                        div class="card" {
                            div class="card-body" {
                                h2 class="h5" { "Rings" }
                                AddForm
                                    action=("/ui/rings")
                                    target=("#rings-list")
                                    placeholder=("e.g. Ring 1")
                                    button=("Add ring");
                                ul id="rings-list"
                                    class="list-group"
                                    hx-get="/ui/rings_list"
                                    hx-trigger="load" {}
                            }
                        }
                    }
                    div class="col-md-6" {
                        div class="card" {
                            div class="card-body" {
                                h2 class="h5" { "Divisions" }
                                AddForm
                                    action=("/ui/divisions")
                                    target=("#divisions-list")
                                    placeholder=("e.g. Male - Black Belt - Under 70kg")
                                    button=("Add division");
                                ul id="divisions-list"
                                    class="list-group"
                                    hx-get="/ui/divisions_list"
                                    hx-trigger="load" {}
                            }
                        }
                    }
                }
            })
            .render(),
    )
}
