//! Middleware trait, ordered middleware steps, and onion composition.
//!
//! A [`Middleware`] receives the input together with the rest of the chain as `next`. Code
//! before `next.handle(..)` runs on the way in, code after it runs on the way out, and a
//! middleware may skip `next` entirely to short-circuit. A [`MiddlewareStep`] keeps its
//! middlewares in an explicit order that callers edit by id, and [`MiddlewareStep::compose`]
//! nests them around a terminal handler.

use std::sync::Arc;

use crate::context::HttpContext;
use crate::error::ClientError;
use crate::handler::{Handler, HandlerFuture};

/// A unit of work that wraps the rest of the chain.
pub trait Middleware<I, O>: Send + Sync {
    /// Stable identifier, unique within a step. Used for relative insertion and diagnostics.
    fn id(&self) -> &str;

    /// Process `input`, calling `next` at most once.
    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        input: I,
        next: &'a dyn Handler<I, O>,
    ) -> HandlerFuture<'a, O>;
}

/// Where to insert a middleware in a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// Outermost: runs before everything else in the step.
    First,
    /// Innermost: runs right before the next step.
    Last,
    /// Immediately outside the middleware with this id.
    Before(String),
    /// Immediately inside the middleware with this id.
    After(String),
}

impl Position {
    /// Shorthand for [`Position::Before`].
    pub fn before(id: impl Into<String>) -> Self {
        Self::Before(id.into())
    }

    /// Shorthand for [`Position::After`].
    pub fn after(id: impl Into<String>) -> Self {
        Self::After(id.into())
    }
}

/// An ordered, id-addressed list of middlewares forming one step of an operation.
pub struct MiddlewareStep<I, O> {
    name: &'static str,
    middlewares: Vec<Arc<dyn Middleware<I, O>>>,
}

impl<I, O> std::fmt::Debug for MiddlewareStep<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareStep")
            .field("name", &self.name)
            .field("middlewares", &self.ids())
            .finish()
    }
}

impl<I, O> MiddlewareStep<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Create an empty step.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            middlewares: Vec::new(),
        }
    }

    /// The step name, e.g. `serialize`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Insert a middleware at `position`.
    ///
    /// # Errors
    ///
    /// `DuplicateStep` if a middleware with the same id is already registered, `UnknownStep`
    /// if a relative position names an id that is not registered.
    pub fn intercept<M>(&mut self, position: Position, middleware: M) -> Result<(), ClientError>
    where
        M: Middleware<I, O> + 'static,
    {
        let id = middleware.id().to_owned();
        if self.contains(&id) {
            return Err(ClientError::DuplicateStep(id));
        }

        let index = match &position {
            Position::First => 0,
            Position::Last => self.middlewares.len(),
            Position::Before(anchor) => self.index_of(anchor)?,
            Position::After(anchor) => self.index_of(anchor)? + 1,
        };
        tracing::trace!(step = self.name, id = %id, ?position, index, "inserting middleware");
        self.middlewares.insert(index, Arc::new(middleware));
        Ok(())
    }

    /// Remove the middleware with `id`, returning whether one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.middlewares.len();
        self.middlewares.retain(|m| m.id() != id);
        self.middlewares.len() != before
    }

    /// Whether a middleware with `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.middlewares.iter().any(|m| m.id() == id)
    }

    /// Compose the middlewares around `terminal`, outermost first.
    pub fn compose<'c>(&'c self, terminal: &'c dyn Handler<I, O>) -> Chain<'c, I, O> {
        Chain {
            middlewares: &self.middlewares,
            terminal,
        }
    }

    fn index_of(&self, id: &str) -> Result<usize, ClientError> {
        self.middlewares
            .iter()
            .position(|m| m.id() == id)
            .ok_or_else(|| ClientError::UnknownStep(id.to_owned()))
    }
}

impl<I, O> MiddlewareStep<I, O> {
    /// Middleware ids in execution order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.middlewares.iter().map(|m| m.id()).collect()
    }

    /// Number of registered middlewares.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Whether no middleware is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

/// A slice of middlewares nested around a terminal handler.
pub struct Chain<'c, I, O> {
    middlewares: &'c [Arc<dyn Middleware<I, O>>],
    terminal: &'c dyn Handler<I, O>,
}

impl<I, O> std::fmt::Debug for Chain<'_, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("remaining", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

impl<I, O> Handler<I, O> for Chain<'_, I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn handle<'a>(&'a self, ctx: &'a HttpContext, input: I) -> HandlerFuture<'a, O> {
        match self.middlewares.split_first() {
            None => self.terminal.handle(ctx, input),
            Some((first, rest)) => Box::pin(async move {
                let next = Chain {
                    middlewares: rest,
                    terminal: self.terminal,
                };
                first.handle(ctx, input, &next).await
            }),
        }
    }
}

/// A middleware backed by a closure.
pub struct ClosureMiddleware<F> {
    id: String,
    f: F,
}

impl<F> std::fmt::Debug for ClosureMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureMiddleware")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<F> ClosureMiddleware<F> {
    /// Wrap `f` as a middleware with the given id.
    pub fn new<I, O>(id: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a HttpContext, I, &'a dyn Handler<I, O>) -> HandlerFuture<'a, O>
            + Send
            + Sync,
    {
        Self { id: id.into(), f }
    }
}

impl<I, O, F> Middleware<I, O> for ClosureMiddleware<F>
where
    F: for<'a> Fn(&'a HttpContext, I, &'a dyn Handler<I, O>) -> HandlerFuture<'a, O>
        + Send
        + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a HttpContext,
        input: I,
        next: &'a dyn Handler<I, O>,
    ) -> HandlerFuture<'a, O> {
        (self.f)(ctx, input, next)
    }
}
