use std::collections::HashMap;

use futures::future::{self, BoxFuture, FutureExt};
use time::OffsetDateTime;

use crate::actor::{Client, Identity};
use crate::db::MovieTransaction;
use crate::errors::StoreError;
use crate::movie::{AuditTimes, Movie};

pub(crate) const CREATED_AT: i64 = 1_600_000_000;
pub(crate) const UPDATED_AT: i64 = 1_600_000_001;

/// An in-memory transaction that records what was done through it.
#[derive(Debug, Default)]
pub(crate) struct MockTransaction {
    pub(crate) clients: HashMap<String, Client>,
    pub(crate) inserted: Vec<(Movie, Identity)>,
    pub(crate) lookups: Vec<String>,
    pub(crate) rollbacks: usize,

    /// Returned instead of performing the next lookup.
    pub(crate) lookup_failure: Option<StoreError>,

    /// Returned instead of performing the next insert.
    pub(crate) insert_failure: Option<StoreError>,

    /// Returned instead of performing the next rollback.
    pub(crate) rollback_failure: Option<StoreError>,

    /// Makes inserts wait forever.
    pub(crate) stall_inserts: bool,

    /// Makes rollbacks wait forever.
    pub(crate) stall_rollbacks: bool,

    /// Behave like a stored routine that only returns the creation time.
    pub(crate) creation_time_only: bool,
}

impl MockTransaction {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    pub(crate) fn with_client(mut self, token: impl Into<String>, client: Client) -> Self {
        self.clients.insert(token.into(), client);
        self
    }
}

impl MovieTransaction for MockTransaction {
    fn client_by_server_token<'a>(
        &'a mut self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<Option<Client>, StoreError>> {
        async move {
            self.lookups.push(token.to_owned());

            match self.lookup_failure.take() {
                Some(e) => Err(e),
                None => Ok(self.clients.get(token).copied()),
            }
        }
        .boxed()
    }

    fn insert_movie<'a>(
        &'a mut self,
        movie: &'a Movie,
        identity: &'a Identity,
    ) -> BoxFuture<'a, Result<AuditTimes, StoreError>> {
        async move {
            if self.stall_inserts {
                future::pending::<()>().await;
            }

            if let Some(e) = self.insert_failure.take() {
                return Err(e);
            }

            self.inserted.push((movie.clone(), identity.clone()));

            let updated_at = if self.creation_time_only {
                None
            } else {
                Some(OffsetDateTime::from_unix_timestamp(UPDATED_AT))
            };

            Ok(AuditTimes {
                created_at: OffsetDateTime::from_unix_timestamp(CREATED_AT),
                updated_at,
            })
        }
        .boxed()
    }

    fn rollback(&mut self) -> BoxFuture<'_, Result<(), StoreError>> {
        async move {
            self.rollbacks += 1;

            if self.stall_rollbacks {
                future::pending::<()>().await;
            }

            match self.rollback_failure.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
        .boxed()
    }
}
