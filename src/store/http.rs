use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};
use url::Url;

use crate::store::{
    DecodeSnafu, ErrResponseSnafu, InvalidUrlSnafu, NotFoundSnafu, OrderDirection, RemoteStore,
    SendSnafu, StoreError,
};
use crate::{AccessToken, AuthSession, CodeFields, CodeId, CodePatch, Document, HttpStoreOptions};

type AccessTokenSource = Arc<dyn Fn() -> Option<AccessToken> + Send + Sync>;

/// A [`RemoteStore`] talking to a JSON document API.
///
/// | Operation | Request |
/// |---|---|
/// | fetch all | `GET {base}/collections/{collection}/documents?orderBy={field}&direction=asc\|desc` |
/// | create | `POST {base}/collections/{collection}/documents` |
/// | update | `PATCH {base}/collections/{collection}/documents/{id}` |
/// | delete | `DELETE {base}/collections/{collection}/documents/{id}` |
/// | batch delete | `POST {base}/collections/{collection}/documents:batchDelete` |
///
/// When created through [`HttpDocumentStore::with_session`], the sessions access token is sent
/// as a Bearer token in the `Authorization` header of every request.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: Url,
    access_token: Option<AccessTokenSource>,
}

impl Debug for HttpDocumentStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDocumentStore")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}

#[derive(Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Deserialize)]
struct CreatedDocument {
    id: CodeId,
}

#[derive(Serialize)]
struct BatchDeleteRequest<'a> {
    ids: &'a [CodeId],
}

impl HttpDocumentStore {
    pub fn new(options: HttpStoreOptions) -> Result<Self, StoreError> {
        Self::from_client(reqwest::Client::new(), options)
    }

    pub fn from_client(
        client: reqwest::Client,
        options: HttpStoreOptions,
    ) -> Result<Self, StoreError> {
        let base_url = options.base_url;
        if base_url.cannot_be_a_base() {
            return InvalidUrlSnafu {
                url: base_url.to_string(),
            }
            .fail();
        }
        Ok(Self {
            client,
            base_url,
            access_token: None,
        })
    }

    /// Authorize every request with the current access token of `session`.
    pub fn with_session(mut self, session: impl AuthSession + Send + Sync + 'static) -> Self {
        self.access_token = Some(Arc::new(move || session.access_token()));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn documents_url(&self, collection: &str, tail: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()
            .context(InvalidUrlSnafu {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(["collections", collection])
            .extend(tail);
        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        document_id: Option<&str>,
    ) -> Result<reqwest::Response, StoreError> {
        let request = match self.access_token.as_ref().and_then(|source| source()) {
            Some(access_token) => request.bearer_auth(access_token),
            None => request,
        };
        let response = request.send().await.context(SendSnafu {})?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == ::http::StatusCode::NOT_FOUND {
            if let Some(id) = document_id {
                return NotFoundSnafu { id }.fail();
            }
        }
        let message = response.text().await.unwrap_or_default();
        ErrResponseSnafu { status, message }.fail()
    }
}

impl RemoteStore for HttpDocumentStore {
    async fn fetch_all(
        &self,
        collection: &str,
        order_by: &str,
        direction: OrderDirection,
    ) -> Result<Vec<Document>, StoreError> {
        let url = self.documents_url(collection, &["documents"])?;
        let request = self
            .client
            .get(url)
            .query(&[("orderBy", order_by), ("direction", direction.as_str())]);
        let list = self
            .send(request, None)
            .await?
            .json::<DocumentList>()
            .await
            .context(DecodeSnafu {})?;
        Ok(list.documents)
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: &CodeFields,
    ) -> Result<CodeId, StoreError> {
        let url = self.documents_url(collection, &["documents"])?;
        let created = self
            .send(self.client.post(url).json(fields), None)
            .await?
            .json::<CreatedDocument>()
            .await
            .context(DecodeSnafu {})?;
        Ok(created.id)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: &CodePatch,
    ) -> Result<(), StoreError> {
        let url = self.documents_url(collection, &["documents", id])?;
        self.send(self.client.patch(url).json(patch), Some(id))
            .await?;
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.documents_url(collection, &["documents", id])?;
        self.send(self.client.delete(url), Some(id)).await?;
        Ok(())
    }

    async fn batch_delete(&self, collection: &str, ids: &[CodeId]) -> Result<(), StoreError> {
        let url = self.documents_url(collection, &["documents:batchDelete"])?;
        self.send(self.client.post(url).json(&BatchDeleteRequest { ids }), None)
            .await?;
        Ok(())
    }
}
