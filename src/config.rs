use url::Url;

use crate::SortState;

/// Name of the collection redeem codes are stored in, unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "redeemCodes";

/// Options for [`init_redeem_codes`](crate::init_redeem_codes) and the
/// [`CodeListController`](crate::CodeListController).
#[derive(Debug, Clone)]
pub struct UseRedeemCodesOptions {
    /// Collection of the remote store holding the codes.
    /// Defaults to `"redeemCodes"`.
    pub collection: String,

    /// Ordering of the derived view before the user picks a column.
    /// Defaults to roster order.
    pub initial_sort: SortState,

    /// Whether to fetch the codes as soon as the session reports a signed-in user.
    /// Defaults to `true`.
    pub refresh_on_sign_in: bool,
}

impl Default for UseRedeemCodesOptions {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_owned(),
            initial_sort: SortState::default(),
            refresh_on_sign_in: true,
        }
    }
}

/// Options for the [`HttpDocumentStore`](crate::HttpDocumentStore).
#[derive(Debug, Clone)]
pub struct HttpStoreOptions {
    /// Root of the document API, E.g. "https://localhost:8080/api/".
    /// Collections are addressed below `{base_url}/collections/{collection}`.
    pub base_url: Url,
}

impl HttpStoreOptions {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}
