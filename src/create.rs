use std::time::Duration;

use log::{debug, error, info, o, Logger};

use crate::actor::{Actor, Credential, Identity};
use crate::context::Context;
use crate::db::MovieTransaction;
use crate::errors::{MovieError, Op, StoreError};
use crate::movie::Movie;

const CREATE_OP: Op = "movie::create";

/// How long a rollback may take before it is abandoned.
pub(crate) const ROLLBACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Validates `movie` and inserts it inside `tx` on behalf of `actor`,
/// returning it with its audit block filled in.
///
/// The transaction is never committed here. Validation and identity
/// failures leave it untouched; storage failures and interruptions roll
/// it back.
pub async fn create<T>(
    ctx: &Context,
    mut movie: Movie,
    tx: &mut T,
    actor: &Actor,
) -> Result<Movie, MovieError>
where
    T: MovieTransaction + ?Sized,
{
    let logger = ctx.logger().new(o!(
        "op" => CREATE_OP,
        "title" => movie.title.clone(),
        "year" => movie.year
    ));

    debug!(logger, "Creating movie...");

    if let Err(source) = movie.validate() {
        debug!(logger, "Movie is invalid"; "param" => source.param, "message" => &source.message);

        return Err(MovieError::Validation {
            op: CREATE_OP,
            source,
        });
    }

    let resolved = ctx.guard(resolve_identity(tx, actor)).await;

    let identity = match resolved {
        Ok(identity) => identity?,
        Err(reason) => {
            let error = MovieError::Cancelled {
                op: CREATE_OP,
                reason,
            };

            return Err(abort(&logger, tx, error).await);
        }
    };

    movie.attribute_creation(&identity);

    let inserted = ctx.guard(tx.insert_movie(&movie, &identity)).await;

    let times = match inserted {
        Ok(Ok(times)) => times,
        Ok(Err(source)) => {
            error!(logger, "Failed to insert movie"; "error" => %source);

            let error = MovieError::from_store(CREATE_OP, source);

            return Err(abort(&logger, tx, error).await);
        }
        Err(reason) => {
            let error = MovieError::Cancelled {
                op: CREATE_OP,
                reason,
            };

            return Err(abort(&logger, tx, error).await);
        }
    };

    movie.set_times(times);

    info!(
        logger,
        "Created movie";
        "username" => &identity.username,
        "client" => identity.client.number,
        "create_timestamp" => %times.created_at
    );

    Ok(movie)
}

async fn resolve_identity<T>(tx: &mut T, actor: &Actor) -> Result<Identity, MovieError>
where
    T: MovieTransaction + ?Sized,
{
    if actor.username.is_empty() {
        return Err(internal("actor has no username"));
    }

    let client = match &actor.credential {
        Credential::Client(client) => *client,
        Credential::ServerToken(token) => tx
            .client_by_server_token(token)
            .await
            .map_err(|source| MovieError::Internal {
                op: CREATE_OP,
                message: "unable to look up server token".to_owned(),
                source: Some(source),
            })?
            .ok_or_else(|| internal("server token does not belong to any client"))?,
    };

    Ok(Identity::new(client, actor.username.clone()))
}

async fn abort<T>(logger: &Logger, tx: &mut T, error: MovieError) -> MovieError
where
    T: MovieTransaction + ?Sized,
{
    debug!(logger, "Rolling back..."; "kind" => %error.kind());

    let rolled_back = tokio::time::timeout(ROLLBACK_TIMEOUT, tx.rollback())
        .await
        .unwrap_or(Err(StoreError::RollbackTimedOut));

    match rolled_back {
        Ok(()) => error,
        Err(source) => {
            error!(logger, "Rollback failed"; "error" => %source, "original" => %error);

            MovieError::RollbackFailed {
                op: CREATE_OP,
                source,
                original: Box::new(error),
            }
        }
    }
}

fn internal(message: &str) -> MovieError {
    MovieError::Internal {
        op: CREATE_OP,
        message: message.to_owned(),
        source: None,
    }
}
