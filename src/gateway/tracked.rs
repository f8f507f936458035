/// Models handed out by a gateway
///
/// Every object a gateway read returns carries an `IdentityToken`. The
/// gateway keeps the row's before-image under that token, which is what
/// `update` diffs against.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityToken(u64);

impl IdentityToken {
    /// Allocates a process-wide unique token.
    pub(crate) fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A model plus the token of its snapshot, if any.
///
/// Derefs to the model so fields can be read and edited in place. Clones
/// share the token and therefore the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<M> {
    token: Option<IdentityToken>,
    model: M,
}

impl<M> Tracked<M> {
    pub(crate) const fn attached(token: IdentityToken, model: M) -> Self {
        Self {
            token: Some(token),
            model,
        }
    }

    /// Wraps a model that no gateway has seen. Updating it is a no-op.
    pub const fn detached(model: M) -> Self {
        Self { token: None, model }
    }

    pub const fn token(&self) -> Option<IdentityToken> {
        self.token
    }

    pub fn into_inner(self) -> M {
        self.model
    }
}

impl<M> Deref for Tracked<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.model
    }
}

impl<M> DerefMut for Tracked<M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut self.model
    }
}
