use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{divisions, matches};

pub mod competitors;
pub mod manage;

#[derive(
    Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = divisions)]
#[diesel(check_for_backend(Sqlite))]
pub struct Division {
    pub id: String,
    /// e.g. "Male - Black Belt - Under 70kg"
    pub name: String,
}

impl Division {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        division_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Division, diesel::result::Error> {
        divisions::table.find(division_id).first::<Division>(conn)
    }

    pub fn all(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<Division>, diesel::result::Error> {
        divisions::table
            .order_by(divisions::id.asc())
            .load::<Division>(conn)
    }

    #[tracing::instrument(skip(conn))]
    pub fn create(
        name: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Division, diesel::result::Error> {
        let division = Division {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
        };
        diesel::insert_into(divisions::table)
            .values(&division)
            .execute(conn)?;
        tracing::info!("created division {}", division.name);
        Ok(division)
    }

    pub fn rename(
        &mut self,
        name: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(), diesel::result::Error> {
        diesel::update(divisions::table.find(&self.id))
            .set(divisions::name.eq(name))
            .execute(conn)?;
        self.name = name.to_string();
        Ok(())
    }

    /// Deletes the division along with its matches and competitors.
    #[tracing::instrument(skip(conn))]
    pub fn delete(
        division_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(), diesel::result::Error> {
        use crate::schema::competitors;

        let n_matches = diesel::delete(
            matches::table.filter(matches::division_id.eq(division_id)),
        )
        .execute(conn)?;
        let n_competitors = diesel::delete(
            competitors::table.filter(competitors::division_id.eq(division_id)),
        )
        .execute(conn)?;
        let n = diesel::delete(divisions::table.find(division_id))
            .execute(conn)?;
        if n == 0 {
            return Err(diesel::result::Error::NotFound);
        }

        tracing::info!(
            "deleted division {division_id} ({n_matches} matches, {n_competitors} competitors)"
        );
        Ok(())
    }
}
