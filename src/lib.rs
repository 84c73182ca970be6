use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod admin;
pub mod brackets;
pub mod config;
pub mod divisions;
pub mod rings;
pub mod schema;
pub mod state;
pub mod template;
#[cfg(test)]
mod test;
pub mod util_resp;
pub mod widgets;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
