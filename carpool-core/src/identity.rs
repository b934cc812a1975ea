use async_trait::async_trait;
use carpool_shared::Masked;
use std::fmt;

use crate::{GatewayError, GatewayResult};

/// The identity a request is made on behalf of.
///
/// Sessions come from the external identity provider; the client only reads the signed-in
/// email. An actor built from a blank email is anonymous and every gateway call made with it
/// fails with `IdentityMissing` before touching the network.
#[derive(Clone, PartialEq, Eq)]
pub struct Actor {
    email: Option<Masked<String>>,
}

impl Actor {
    pub fn new(email: impl Into<String>) -> Self {
        let email = email.into().trim().to_string();
        Self {
            email: (!email.is_empty()).then(|| Masked(email)),
        }
    }

    pub fn anonymous() -> Self {
        Self { email: None }
    }

    /// The actor's email, required by every backend call
    pub fn email(&self) -> GatewayResult<&str> {
        self.email
            .as_ref()
            .map(|email| email.expose().as_str())
            .ok_or(GatewayError::IdentityMissing)
    }

    pub fn is_signed_in(&self) -> bool {
        self.email.is_some()
    }

    /// True when this actor is signed in as `email`
    pub fn is(&self, email: &str) -> bool {
        self.email().map(|own| own == email).unwrap_or(false)
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.email {
            Some(email) => write!(f, "Actor({email})"),
            None => write!(f, "Actor(anonymous)"),
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The signed-in actor, or an anonymous one when nobody is signed in
    async fn current_actor(&self) -> Actor;
}

/// Fixed identity, for tests and for shells that sign in out of band
pub struct StaticIdentity(pub Actor);

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_actor(&self) -> Actor {
        self.0.clone()
    }
}

/// Reads the signed-in email from an environment variable
pub struct EnvIdentity {
    var: String,
}

impl EnvIdentity {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl IdentityProvider for EnvIdentity {
    async fn current_actor(&self) -> Actor {
        match std::env::var(&self.var) {
            Ok(email) => Actor::new(email),
            Err(_) => {
                tracing::warn!("{} is not set; continuing signed out", self.var);
                Actor::anonymous()
            }
        }
    }
}
