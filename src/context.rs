use std::future::Future;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use log::Logger;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::errors::Interruption;

/// Resolves once the owning `Canceller` fires.
pub type Cancellation = Shared<BoxFuture<'static, ()>>;

/// Fires a `Cancellation`.
#[derive(Debug)]
pub struct Canceller(oneshot::Sender<()>);

impl Canceller {
    pub fn cancel(self) {
        // the receiver may already be gone, in which case nobody is waiting
        let _ = self.0.send(());
    }
}

/// Creates a linked canceller and cancellation signal. Dropping the
/// canceller without firing it never resolves the signal.
pub fn cancellation() -> (Canceller, Cancellation) {
    let (sender, receiver) = oneshot::channel::<()>();

    let signal = async move {
        if receiver.await.is_err() {
            future::pending::<()>().await;
        }
    }
    .boxed()
    .shared();

    (Canceller(sender), signal)
}

/// Per-call state: where to log, and when to give up.
#[derive(Clone)]
pub struct Context {
    logger: Logger,
    deadline: Option<Instant>,
    cancellation: Option<Cancellation>,
}

impl Context {
    pub fn new(logger: Logger) -> Self {
        Context {
            logger,
            deadline: None,
            cancellation: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Runs `call` unless the context is cancelled or its deadline passes
    /// first, in which case `call` is dropped. A context that is already
    /// done never polls `call`.
    pub async fn guard<F: Future>(&self, call: F) -> Result<F::Output, Interruption> {
        let cancelled = async {
            match &self.cancellation {
                Some(cancellation) => cancellation.clone().await,
                None => future::pending().await,
            }
        };

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => future::pending().await,
            }
        };

        tokio::select! {
            biased;

            _ = cancelled => Err(Interruption::Cancelled),
            _ = expired => Err(Interruption::DeadlineExceeded),
            output = call => Ok(output),
        }
    }
}
