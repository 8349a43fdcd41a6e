use futures::future::BoxFuture;

use crate::actor::{Client, Identity};
use crate::errors::StoreError;
use crate::movie::{AuditTimes, Movie};

#[cfg(test)]
pub(crate) mod mock;

/// The storage operations available inside an open transaction.
///
/// Implementations never commit; that is left to whoever opened the
/// transaction.
pub trait MovieTransaction: Send {
    /// Looks up the client a server token belongs to.
    fn client_by_server_token<'a>(
        &'a mut self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<Option<Client>, StoreError>>;

    /// Inserts `movie` on behalf of `identity` and returns the timestamps
    /// the database assigned.
    fn insert_movie<'a>(
        &'a mut self,
        movie: &'a Movie,
        identity: &'a Identity,
    ) -> BoxFuture<'a, Result<AuditTimes, StoreError>>;

    /// Rolls back the transaction. Rolling back a closed transaction does
    /// nothing.
    fn rollback(&mut self) -> BoxFuture<'_, Result<(), StoreError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::{
        self,
        postgres::{PgPool, Postgres},
        Transaction,
    };
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::actor::{Client, Identity};
    use crate::errors::StoreError;
    use crate::movie::{AuditTimes, Movie};

    const UNIQUE_VIOLATION: &str = "23505";

    /// A PostgreSQL transaction lent to movie operations.
    pub struct PgTransaction<'c> {
        tx: Option<Transaction<'c, Postgres>>,
    }

    impl<'c> PgTransaction<'c> {
        pub fn new(tx: Transaction<'c, Postgres>) -> Self {
            PgTransaction { tx: Some(tx) }
        }

        /// Whether the transaction has neither been committed nor rolled
        /// back.
        pub fn is_open(&self) -> bool {
            self.tx.is_some()
        }

        pub async fn commit(mut self) -> Result<(), StoreError> {
            let tx = self.tx.take().ok_or(StoreError::TransactionClosed)?;

            tx.commit().await.map_err(map_sqlx_error)
        }

        fn open(&mut self) -> Result<&mut Transaction<'c, Postgres>, StoreError> {
            self.tx.as_mut().ok_or(StoreError::TransactionClosed)
        }
    }

    impl PgTransaction<'static> {
        pub async fn begin(pool: &PgPool) -> Result<Self, StoreError> {
            let tx = pool.begin().await.map_err(map_sqlx_error)?;

            Ok(PgTransaction::new(tx))
        }
    }

    impl<'c> super::MovieTransaction for PgTransaction<'c> {
        fn client_by_server_token<'a>(
            &'a mut self,
            token: &'a str,
        ) -> BoxFuture<'a, Result<Option<Client>, StoreError>> {
            async move {
                let tx = self.open()?;

                let query = sqlx::query_as::<_, (Uuid, i32)>(include_str!(
                    "queries/client_by_server_token.sql"
                ));

                let client = query
                    .bind(token)
                    .fetch_optional(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?
                    .map(|(id, number)| Client::new(id, number));

                Ok(client)
            }
            .boxed()
        }

        fn insert_movie<'a>(
            &'a mut self,
            movie: &'a Movie,
            identity: &'a Identity,
        ) -> BoxFuture<'a, Result<AuditTimes, StoreError>> {
            async move {
                let tx = self.open()?;

                let query = sqlx::query_as::<_, (OffsetDateTime, Option<OffsetDateTime>)>(
                    include_str!("queries/create_movie.sql"),
                );

                let (created_at, updated_at) = query
                    .bind(&movie.title)
                    .bind(movie.year)
                    .bind(&movie.rated)
                    .bind(movie.released)
                    .bind(movie.run_time)
                    .bind(&movie.director)
                    .bind(&movie.writer)
                    .bind(identity.client.number)
                    .bind(&identity.username)
                    .fetch_optional(&mut **tx)
                    .await
                    .map_err(map_sqlx_error)?
                    .ok_or(StoreError::MissingTimestamps)?;

                Ok(AuditTimes {
                    created_at,
                    updated_at,
                })
            }
            .boxed()
        }

        fn rollback(&mut self) -> BoxFuture<'_, Result<(), StoreError>> {
            async move {
                match self.tx.take() {
                    Some(tx) => tx.rollback().await.map_err(map_sqlx_error),
                    None => Ok(()),
                }
            }
            .boxed()
        }
    }

    fn map_sqlx_error(error: sqlx::Error) -> StoreError {
        use sqlx::Error;

        let unique_violation = match &error {
            Error::Database(e) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Some(e.constraint().map(str::to_owned))
            }
            _ => None,
        };

        match unique_violation {
            Some(constraint) => StoreError::AlreadyExists {
                constraint,
                source: error,
            },
            None => StoreError::Sqlx { source: error },
        }
    }

    #[cfg(test)]
    mod tests {
        use std::borrow::Cow;
        use std::error::Error as StdError;
        use std::fmt;

        use sqlx::error::DatabaseError;

        use super::map_sqlx_error;
        use crate::errors::StoreError;

        /// A database error carrying a fixed SQLSTATE.
        #[derive(Debug)]
        struct Rejected {
            code: &'static str,
            constraint: Option<&'static str>,
        }

        impl fmt::Display for Rejected {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "rejected with {}", self.code)
            }
        }

        impl StdError for Rejected {}

        impl DatabaseError for Rejected {
            fn message(&self) -> &str {
                "rejected"
            }

            fn code(&self) -> Option<Cow<'_, str>> {
                Some(Cow::Borrowed(self.code))
            }

            fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
                self
            }

            fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
                self
            }

            fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
                self
            }

            fn constraint(&self) -> Option<&str> {
                self.constraint
            }
        }

        fn rejected(code: &'static str, constraint: Option<&'static str>) -> sqlx::Error {
            sqlx::Error::Database(Box::new(Rejected { code, constraint }))
        }

        #[test]
        fn unique_violations_already_exist() {
            let error = map_sqlx_error(rejected("23505", Some("movie_pkey")));

            match error {
                StoreError::AlreadyExists { constraint, .. } => {
                    assert_eq!(constraint.as_deref(), Some("movie_pkey"))
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }

        #[test]
        fn unnamed_unique_violations_already_exist() {
            let error = map_sqlx_error(rejected("23505", None));

            assert!(matches!(
                error,
                StoreError::AlreadyExists {
                    constraint: None,
                    ..
                }
            ));
        }

        #[test]
        fn other_database_errors_stay_generic() {
            // foreign_key_violation
            let error = map_sqlx_error(rejected("23503", Some("movie_create_client_fk")));

            assert!(matches!(error, StoreError::Sqlx { .. }));
        }

        #[test]
        fn other_errors_stay_generic() {
            let error = map_sqlx_error(sqlx::Error::RowNotFound);

            assert!(matches!(error, StoreError::Sqlx { .. }));
        }
    }
}
