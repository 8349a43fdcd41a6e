use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered API client on whose behalf records are written.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Client {
    /// The ID of the client.
    pub id: Uuid,

    /// The number the stored routines use to refer to the client.
    pub number: i32,
}

impl Client {
    pub fn new(id: Uuid, number: i32) -> Self {
        Client { id, number }
    }
}

/// How the acting client is identified by the caller.
#[derive(Clone, Debug)]
pub enum Credential {
    /// The client was already resolved upstream.
    Client(Client),

    /// A server token that still has to be looked up.
    ServerToken(String),
}

/// The actor a write is attributed to, as supplied by the caller.
#[derive(Clone, Debug)]
pub struct Actor {
    pub(crate) username: String,
    pub(crate) credential: Credential,
}

impl Actor {
    pub fn new(username: impl Into<String>, credential: Credential) -> Self {
        Actor {
            username: username.into(),
            credential,
        }
    }

    pub fn with_client(username: impl Into<String>, client: Client) -> Self {
        Self::new(username, Credential::Client(client))
    }

    pub fn with_server_token(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(username, Credential::ServerToken(token.into()))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

/// A fully resolved actor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Identity {
    pub client: Client,
    pub username: String,
}

impl Identity {
    pub fn new(client: Client, username: impl Into<String>) -> Self {
        Identity {
            client,
            username: username.into(),
        }
    }
}
