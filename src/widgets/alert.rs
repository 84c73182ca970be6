use hypertext::prelude::*;

pub struct ErrorAlert<S> {
    pub msg: S,
}

impl<S: ToString> Renderable for ErrorAlert<S> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud!({
            div class="alert alert-danger" role="alert" {
                (self.msg.to_string())
            }
        })
        .render_to(buffer);
    }
}

/// A confirmation, optionally followed by a link to the next step.
pub struct SuccessAlert<'r, S> {
    pub title: &'r str,
    pub msg: S,
    pub link: Option<(&'r str, &'r str)>,
}

impl<'r, S: ToString> Renderable for SuccessAlert<'r, S> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud!({
            div class="alert alert-success" role="alert" {
                strong { (self.title) } " " (self.msg.to_string())
                @if let Some((href, text)) = self.link {
                    div class="mt-2" {
                        a class="btn btn-success btn-sm" href=(href) {
                            (text)
                        }
                    }
                }
            }
        })
        .render_to(buffer);
    }
}
