pub mod migrations;
mod migrator;

pub use migrator::Migrator;
pub use sea_orm_migration::prelude::*;
