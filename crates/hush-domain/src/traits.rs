//! Trait definitions for external interactions
//!
//! The text model that rewrites field content is an external collaborator.
//! Implementations live in `hush-llm`.

/// Trait for text rewrite operations
///
/// Implemented by the infrastructure layer (hush-llm)
pub trait Rewriter {
    /// Error type for rewrite operations
    type Error;

    /// Send a prompt and return the model's text reply
    fn rewrite(&self, prompt: &str) -> Result<String, Self::Error>;
}

impl<R: Rewriter + ?Sized> Rewriter for &R {
    type Error = R::Error;

    fn rewrite(&self, prompt: &str) -> Result<String, Self::Error> {
        (**self).rewrite(prompt)
    }
}
