//! The two corners of a match: Chung (blue, slot 1) and Hong (red, slot 2).

use hypertext::prelude::*;

pub const TBD: &str = "TBD";

/// Abbreviates a name for the public boards, e.g. "Kim Min-jun Park" becomes
/// "K. Park". Single names are left alone.
pub fn short_name(name: &str) -> String {
    let mut parts = name.split_whitespace();
    match (parts.next(), parts.next_back()) {
        (Some(first), Some(last)) => match first.chars().next() {
            Some(initial) => format!("{initial}. {last}"),
            None => name.to_string(),
        },
        (Some(only), None) => only.to_string(),
        _ => TBD.to_string(),
    }
}

pub struct Corners<'r> {
    pub chung: Option<&'r str>,
    pub hong: Option<&'r str>,
    /// Abbreviate the names with [`short_name`].
    pub short: bool,
}

impl<'r> Corners<'r> {
    fn display(&self, name: Option<&str>) -> String {
        match name {
            Some(name) if self.short => short_name(name),
            Some(name) => name.to_string(),
            None => TBD.to_string(),
        }
    }
}

impl<'r> Renderable for Corners<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            span {
                span class="chung" { (self.display(self.chung)) }
                " vs "
                span class="hong" { (self.display(self.hong)) }
            }
        }
        .render_to(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviates_first_and_last_name() {
        assert_eq!(short_name("Kim Min-jun Park"), "K. Park");
        assert_eq!(short_name("  Lee   Ji-woo "), "L. Ji-woo");
        assert_eq!(short_name("Madonna"), "Madonna");
        assert_eq!(short_name("   "), TBD);
    }
}
