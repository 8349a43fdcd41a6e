pub mod actor;
pub mod config;
pub mod context;
pub mod create;
pub mod db;
pub mod errors;
pub mod movie;

pub use crate::actor::{Actor, Client, Credential, Identity};
pub use crate::context::{cancellation, Cancellation, Canceller, Context};
pub use crate::create::create;
pub use crate::db::{MovieTransaction, PgTransaction};
pub use crate::errors::{Kind, MovieError, StoreError, ValidationError};
pub use crate::movie::{Audit, AuditTimes, Movie, EARLIEST_FILM_YEAR};
