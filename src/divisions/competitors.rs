use std::collections::HashMap;

use axum::{Form, extract::Path};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    divisions::Division,
    schema::competitors,
    state::Conn,
    util_resp::{StandardResponse, success},
};

#[derive(
    Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = competitors)]
#[diesel(check_for_backend(Sqlite))]
pub struct Competitor {
    pub id: String,
    pub division_id: String,
    pub name: String,
    /// Registration order within the division.
    pub seq: i64,
}

impl Competitor {
    /// Competitors of a division, in registration order.
    #[tracing::instrument(skip(conn))]
    pub fn of_division(
        division_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<Competitor>, diesel::result::Error> {
        competitors::table
            .filter(competitors::division_id.eq(division_id))
            .order_by(competitors::seq.asc())
            .load::<Competitor>(conn)
    }

    /// Maps competitor ids to names (for the views).
    pub fn names_of_division(
        division_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<HashMap<String, String>, diesel::result::Error> {
        Ok(Self::of_division(division_id, conn)?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }

    /// Adds one competitor per non-blank line of `names`.
    #[tracing::instrument(skip(conn, names))]
    pub fn add_lines(
        division_id: &str,
        names: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<Competitor>, diesel::result::Error> {
        let next_seq = competitors::table
            .filter(competitors::division_id.eq(division_id))
            .select(diesel::dsl::max(competitors::seq))
            .get_result::<Option<i64>>(conn)?
            .map(|x| x + 1)
            .unwrap_or(0);

        let new = parse_names(names)
            .into_iter()
            .enumerate()
            .map(|(i, name)| Competitor {
                id: Uuid::now_v7().to_string(),
                division_id: division_id.to_string(),
                name: name.to_string(),
                seq: next_seq + i as i64,
            })
            .collect::<Vec<_>>();

        for competitor in &new {
            diesel::insert_into(competitors::table)
                .values(competitor)
                .execute(conn)?;
        }

        tracing::debug!("added {} competitors", new.len());
        Ok(new)
    }
}

/// Splits a textarea into names, one per line, ignoring blank lines.
pub fn parse_names(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

pub struct CompetitorList<'r> {
    pub competitors: &'r [Competitor],
}

impl<'r> Renderable for CompetitorList<'r> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            @if self.competitors.is_empty() {
                li class="list-group-item text-muted" {
                    "No competitors added yet."
                }
            }
            @for competitor in self.competitors {
                li class="list-group-item" { (competitor.name) }
            }
        }
        .render_to(buffer);
    }
}

#[derive(Deserialize)]
pub struct AddCompetitorsForm {
    #[serde(default)]
    names: String,
}

pub async fn add_competitors(
    Path(division_id): Path<String>,
    mut conn: Conn<true>,
    Form(form): Form<AddCompetitorsForm>,
) -> StandardResponse {
    let division = Division::fetch(&division_id, &mut *conn)?;
    Competitor::add_lines(&division.id, &form.names, &mut *conn)?;

    let competitors = Competitor::of_division(&division.id, &mut *conn)?;
    success(maud! { CompetitorList competitors=(&competitors); }.render())
}

pub async fn competitors_list(
    Path(division_id): Path<String>,
    mut conn: Conn<false>,
) -> StandardResponse {
    let division = Division::fetch(&division_id, &mut *conn)?;
    let competitors = Competitor::of_division(&division.id, &mut *conn)?;
    success(maud! { CompetitorList competitors=(&competitors); }.render())
}

#[cfg(test)]
mod tests {
    use super::parse_names;

    #[test]
    fn one_name_per_non_blank_line() {
        assert_eq!(
            parse_names("Alice\n\n  Bob Kim  \r\n\t\nCarol"),
            vec!["Alice", "Bob Kim", "Carol"]
        );
        assert!(parse_names("\n \n").is_empty());
    }
}
