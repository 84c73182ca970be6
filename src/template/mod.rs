//! Templating code.
//!
//! This defines the [`Page`] item, which every full page in this crate is
//! rendered through. Fragments returned to htmx requests are rendered on
//! their own.

use hypertext::prelude::*;

pub struct Page<R: Renderable> {
    title: Option<String>,
    body: Option<R>,
    active_nav: Option<&'static str>,
}

impl<R: Renderable> Page<R> {
    pub fn new() -> Self {
        Self {
            title: None,
            body: None,
            active_nav: None,
        }
    }

    pub fn title(mut self, title: impl ToString) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn body(mut self, body: R) -> Self {
        self.body = Some(body);
        self
    }

    pub fn active_nav(mut self, nav: &'static str) -> Self {
        self.active_nav = Some(nav);
        self
    }
}

impl<R: Renderable> Renderable for Page<R> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let nav_class = |name: &str| {
            if self.active_nav == Some(name) {
                "nav-link text-white fw-bold"
            } else {
                "nav-link text-white"
            }
        };

        maud! {
            html {
                head {
                    title {
                        @if let Some(title) = &self.title {
                            (title) " | "
                        }
                        "Ringside"
                    }
                    script src="https://cdn.jsdelivr.net/npm/htmx.org@2.0.7/dist/htmx.min.js" integrity="sha384-ZBXiYtYQ6hJ2Y0ZNoYuI+Nq5MqWBr+chMrS/RkXpNzQCApHEhOt2aY8EJgqwHLkJ" crossorigin="anonymous" {
                    }
                    link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet";
                    style {
                        ".chung { color: #252ceb; font-weight: bold; }
                        .hong { color: #eb2525; font-weight: bold; }
                        .bracket-round { min-width: 16rem; }"
                    }
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                }
                body class="d-flex flex-column vh-100" {
                    nav class="navbar navbar-expand"
                        style="background-color: #452859;"
                        data-bs-theme="dark" {
                        div class="container-fluid" {
                            a class="navbar-brand text-white" href="/" {
                                "Ringside"
                            }
                            ul class="navbar-nav" style="display: flex; gap: 1rem;" {
                                li class="nav-item" {
                                    a class=(nav_class("rings")) href="/" {
                                        "Live Rings"
                                    }
                                }
                                li class="nav-item" {
                                    a class=(nav_class("admin")) href="/admin" {
                                        "Admin"
                                    }
                                }
                            }
                        }
                    }
                    div class="flex-grow-1 container py-4" {
                        @if let Some(body) = &self.body {
                            (body)
                        }
                    }
                }
            }
        }.render_to(buffer)
    }
}
