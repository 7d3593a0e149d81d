//! Error taxonomy for the OVF core.
//!
//! Only malformed-document errors are fatal and escape the core. Everything
//! else (unknown field types, persistence failures) degrades locally with a
//! logged warning so the user is never blocked from filling the form.

/// Fatal load-time failures of a design document.
#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    /// The raw input failed to parse as JSON at all.
    #[error("design document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `pages` is missing or empty — there is nothing to render.
    #[error("design document has no pages")]
    NoPages,

    /// The same field id appears more than once across the document's
    /// pages. Later writes would silently shadow earlier ones, so this is
    /// rejected instead of tolerated.
    #[error("duplicate field id `{id}` in design document")]
    DuplicateFieldId { id: String },
}
