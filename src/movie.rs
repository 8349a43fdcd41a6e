use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::actor::{Client, Identity};
use crate::errors::{Op, ValidationError};

/// The year of the first film; nothing can have been released earlier.
pub const EARLIEST_FILM_YEAR: i32 = 1878;

const VALIDATE_OP: Op = "movie::validate";

/// A single movie.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Movie {
    pub title: String,

    pub year: i32,

    /// The content rating, e.g. "R".
    pub rated: String,

    /// The release date. `None` means it was never set.
    pub released: Option<OffsetDateTime>,

    /// The running time in minutes.
    pub run_time: i32,

    pub director: String,

    pub writer: String,

    /// Who created and last updated the record, and when.
    #[serde(flatten)]
    pub audit: Audit,
}

impl Movie {
    /// Checks the business fields in a fixed order, returning the first
    /// failure.
    ///
    /// Each failure names its field as `param`. A missing release date is
    /// reported as `Released`, not `ReleaseDate`, so the name matches the
    /// field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::missing_field(VALIDATE_OP, "Title"));
        }

        if self.year < EARLIEST_FILM_YEAR {
            return Err(ValidationError::new(
                VALIDATE_OP,
                "Year",
                format!(
                    "The first film was in {0}, Year must be >= {0}",
                    EARLIEST_FILM_YEAR
                ),
            ));
        }

        if self.rated.is_empty() {
            return Err(ValidationError::missing_field(VALIDATE_OP, "Rated"));
        }

        if self.released.is_none() {
            return Err(ValidationError::new(
                VALIDATE_OP,
                "Released",
                "Released must have a value",
            ));
        }

        if self.run_time <= 0 {
            return Err(ValidationError::new(
                VALIDATE_OP,
                "RunTime",
                "Run time must be greater than zero",
            ));
        }

        if self.director.is_empty() {
            return Err(ValidationError::missing_field(VALIDATE_OP, "Director"));
        }

        if self.writer.is_empty() {
            return Err(ValidationError::missing_field(VALIDATE_OP, "Writer"));
        }

        Ok(())
    }

    /// Attributes a first write to `identity`. The record's first write is
    /// also its first update.
    pub(crate) fn attribute_creation(&mut self, identity: &Identity) {
        self.audit.create_client = Some(identity.client);
        self.audit.create_username = identity.username.clone();
        self.audit.update_client = Some(identity.client);
        self.audit.update_username = identity.username.clone();
    }

    pub(crate) fn set_times(&mut self, times: AuditTimes) {
        self.audit.create_timestamp = Some(times.created_at);
        self.audit.update_timestamp = Some(times.updated_at.unwrap_or(times.created_at));
    }
}

/// The audit block of a record.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Audit {
    pub create_client: Option<Client>,

    pub create_username: String,

    /// Assigned by the database; any value supplied beforehand is
    /// overwritten.
    pub create_timestamp: Option<OffsetDateTime>,

    pub update_client: Option<Client>,

    pub update_username: String,

    pub update_timestamp: Option<OffsetDateTime>,
}

/// The timestamps the database assigned to a new record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AuditTimes {
    pub created_at: OffsetDateTime,

    /// Older versions of the stored routine only return the creation time.
    pub updated_at: Option<OffsetDateTime>,
}
