use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{matches, rings};

pub mod manage;
pub mod public;
pub mod scorekeeper;

#[derive(
    Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = rings)]
#[diesel(check_for_backend(Sqlite))]
pub struct Ring {
    pub id: String,
    pub name: String,
    /// 1-based, in order of creation.
    pub number: i64,
}

impl Ring {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        ring_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Ring, diesel::result::Error> {
        rings::table.find(ring_id).first::<Ring>(conn)
    }

    pub fn all(
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<Ring>, diesel::result::Error> {
        rings::table
            .order_by(rings::number.asc())
            .load::<Ring>(conn)
    }

    #[tracing::instrument(skip(conn))]
    pub fn create(
        name: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Ring, diesel::result::Error> {
        let ring = Ring {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            number: rings::table
                .select(diesel::dsl::max(rings::number))
                .get_result::<Option<i64>>(conn)?
                .map(|x| x + 1)
                .unwrap_or(1),
        };

        diesel::insert_into(rings::table)
            .values(&ring)
            .execute(conn)?;

        tracing::info!("created ring {} (number {})", ring.name, ring.number);
        Ok(ring)
    }

    /// Deletes the ring. Matches scheduled on it go back to being
    /// unscheduled.
    #[tracing::instrument(skip(conn))]
    pub fn delete(
        ring_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<(), diesel::result::Error> {
        diesel::update(matches::table.filter(matches::ring_id.eq(ring_id)))
            .set((
                matches::ring_id.eq(None::<String>),
                matches::sequence.eq(None::<i64>),
            ))
            .execute(conn)?;

        let n = diesel::delete(rings::table.find(ring_id)).execute(conn)?;
        if n == 0 {
            return Err(diesel::result::Error::NotFound);
        }
        Ok(())
    }
}
