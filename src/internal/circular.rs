//! Circular dependency detection.
//!
//! Every top-level resolution owns a [`ResolutionChain`]: the stack of
//! constructions currently in progress. Entering a [`Frame`] already on the
//! stack is a cycle. The chain is threaded through nested resolutions by
//! reference, so concurrent resolutions on other threads never observe each
//! other.

use std::any::TypeId;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

static NEXT_FACTORY: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Identity {
    /// A concrete type built through its constructors
    Type(TypeId),
    /// One closure factory record
    Factory(usize),
}

/// One construction on the chain: what is being built and how it is reported.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frame {
    identity: Identity,
    name: &'static str,
}

impl Frame {
    pub(crate) fn of_type(concrete: TypeKey) -> Self {
        Self {
            identity: Identity::Type(concrete.id()),
            name: concrete.name(),
        }
    }

    /// A fresh identity shared with no other frame, reported as `name`.
    pub(crate) fn factory(name: &'static str) -> Self {
        Self {
            identity: Identity::Factory(NEXT_FACTORY.fetch_add(1, Ordering::Relaxed)),
            name,
        }
    }

    pub(crate) fn identity(&self) -> Identity {
        self.identity
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }
}

/// Stack of constructions in progress for one resolution call.
#[derive(Debug)]
pub(crate) struct ResolutionChain {
    stack: Vec<Frame>,
    max_depth: usize,
}

impl ResolutionChain {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            stack: Vec::new(),
            max_depth,
        }
    }

    /// Pushes `frame`, failing if it is already under construction.
    pub(crate) fn enter(&mut self, frame: Frame) -> DiResult<()> {
        if let Some(start) = self.stack.iter().position(|entry| entry.identity == frame.identity) {
            let mut path: Vec<&'static str> = self.stack[start..].iter().map(Frame::name).collect();
            path.push(frame.name);
            tracing::debug!(path = ?path, "circular dependency rejected");
            return Err(DiError::Circular(path));
        }

        if self.stack.len() >= self.max_depth {
            return Err(DiError::DepthExceeded(self.max_depth));
        }

        self.stack.push(frame);
        Ok(())
    }

    pub(crate) fn exit(&mut self, frame: Frame) {
        let last = self.stack.pop();
        debug_assert_eq!(last.map(|entry| entry.identity), Some(frame.identity));
    }

    /// Runs `f` with `frame` on the chain, popping it on every exit path.
    pub(crate) fn guarded<T, F>(&mut self, frame: Frame, f: F) -> DiResult<T>
    where
        F: FnOnce(&mut Self) -> DiResult<T>,
    {
        self.enter(frame)?;
        let result = f(self);
        self.exit(frame);
        result
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }
}
