//! Remote document stores holding the redeem code collection.

use std::future::Future;

use snafu::Snafu;

use crate::{CodeFields, CodeId, CodePatch, Document};

pub mod http;
pub mod memory;

/// Name of the field documents are ordered by when fetching the collection.
pub const CREATED_AT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "asc",
            OrderDirection::Descending => "desc",
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("Could not send request: {source}"))]
    Send { source: reqwest::Error },

    #[snafu(display("Could not decode payload: {source}"))]
    Decode { source: reqwest::Error },

    #[snafu(display("Received an error response ({status}): {message}"))]
    ErrResponse {
        status: ::http::StatusCode,
        message: String,
    },

    #[snafu(display("Document '{id}' does not exist"))]
    NotFound { id: CodeId },

    #[snafu(display("Url '{url}' cannot be used as a base for document urls"))]
    InvalidUrl { url: String },

    #[snafu(display("{message}"))]
    Unavailable { message: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// A document-oriented persistence service.
///
/// All operations address a named collection. Implementations decide about their own timeouts
/// and retries; callers never cancel a started operation.
pub trait RemoteStore {
    /// Reads every document of `collection`, ordered by the field `order_by`.
    fn fetch_all(
        &self,
        collection: &str,
        order_by: &str,
        direction: OrderDirection,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>>;

    /// Creates a new document and returns the id the store assigned to it.
    fn create_document(
        &self,
        collection: &str,
        fields: &CodeFields,
    ) -> impl Future<Output = Result<CodeId, StoreError>>;

    /// Writes only the fields present in `patch`.
    fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: &CodePatch,
    ) -> impl Future<Output = Result<(), StoreError>>;

    fn delete_document(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>>;

    /// Deletes all `ids` as one atomic unit: either every document is deleted or none is.
    fn batch_delete(
        &self,
        collection: &str,
        ids: &[CodeId],
    ) -> impl Future<Output = Result<(), StoreError>>;
}
