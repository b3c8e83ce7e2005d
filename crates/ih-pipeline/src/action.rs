//! The action traits.
//!
//! [`Action`] is what built-in and extension actions implement: a pure
//! `validate` that turns raw tokens into typed options, and an async `apply`
//! that mutates the [`ImageContext`]. The blanket impl below erases the
//! options type so actions can sit in the registry as [`ImageAction`] trait
//! objects.

use async_trait::async_trait;

use crate::context::ImageContext;

/// A single transform step with strongly typed options.
#[async_trait]
pub trait Action: Send + Sync + 'static {
    /// Options produced by [`validate`](Action::validate).
    type Options: Send;

    /// The directive name this action answers to (e.g. "resize").
    fn name(&self) -> &'static str;

    /// Parse the directive tokens.
    ///
    /// `params` is the whole directive, name included. Implementations must
    /// not perform I/O and must return the same result for the same input.
    fn validate(&self, params: &[&str]) -> ih_core::Result<Self::Options>;

    /// Apply the transform to the image in `ctx`.
    async fn apply(&self, ctx: &mut ImageContext, options: Self::Options) -> ih_core::Result<()>;
}

/// Object-safe view of an [`Action`], as stored in the registry.
#[async_trait]
pub trait ImageAction: Send + Sync {
    fn name(&self) -> &'static str;

    /// Admission check: validate and discard the options.
    fn check(&self, params: &[&str]) -> ih_core::Result<()>;

    /// Validate, then apply.
    async fn process(&self, ctx: &mut ImageContext, params: &[&str]) -> ih_core::Result<()>;
}

#[async_trait]
impl<A: Action> ImageAction for A {
    fn name(&self) -> &'static str {
        Action::name(self)
    }

    fn check(&self, params: &[&str]) -> ih_core::Result<()> {
        self.validate(params).map(|_| ())
    }

    async fn process(&self, ctx: &mut ImageContext, params: &[&str]) -> ih_core::Result<()> {
        let options = self.validate(params)?;
        self.apply(ctx, options).await
    }
}
