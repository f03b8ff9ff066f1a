use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use leptos::prelude::*;
use snafu::IntoError;
use time::OffsetDateTime;

use crate::error::{
    BusySnafu, InvalidCountSnafu, NotFoundSnafu, PartialGenerateSnafu, SessionEndedSnafu,
    StoreSnafu, WrongConfirmationSnafu,
};
use crate::internal::operation_guard::{OperationGuard, OperationState};
use crate::store::{CREATED_AT_FIELD, OrderDirection, RemoteStore, StoreError};
use crate::{
    CodeFields, CodeId, CodePatch, CodeRow, Operation, RedeemCode,
    RedeemCodesError, Roster, SortColumn, SortState, UseRedeemCodesOptions, sorted_view,
};

/// Phrase the user has to type, exactly like this, to delete all codes.
pub const CONFIRMATION_PHRASE: &str = "CONFIRM";

/// Parses a user-entered amount of codes to generate.
///
/// Surrounding whitespace is ignored. Everything but a whole number of at least 1 is rejected.
pub fn parse_count(input: &str) -> Result<NonZeroU32, RedeemCodesError> {
    input
        .trim()
        .parse::<NonZeroU32>()
        .map_err(|_| InvalidCountSnafu { input }.build())
}

/// Owns the roster of redeem codes and keeps it in sync with a [`RemoteStore`].
///
/// Every command mutates the remote store first and only then reconciles the local roster,
/// so a failed command never leaves local changes behind. Roster, sort state and busy flags
/// live in signals and can be observed reactively.
///
/// Commands still in flight when [`CodeListController::deactivate`] is called do not touch the
/// roster afterwards. They fail with [`RedeemCodesError::SessionEnded`].
///
/// Cloning is cheap and clones share their state.
pub struct CodeListController<S> {
    store: Arc<S>,
    collection: String,
    roster: ArcRwSignal<Roster>,
    loaded: ArcRwSignal<bool>,
    sort: ArcRwSignal<SortState>,
    refreshing: OperationGuard,
    generating: OperationGuard,
    deleting_all: OperationGuard,
    /// Bumped by every `deactivate`.
    epoch: Arc<AtomicU64>,
}

impl<S> Clone for CodeListController<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            collection: self.collection.clone(),
            roster: self.roster.clone(),
            loaded: self.loaded.clone(),
            sort: self.sort.clone(),
            refreshing: self.refreshing.clone(),
            generating: self.generating.clone(),
            deleting_all: self.deleting_all.clone(),
            epoch: self.epoch.clone(),
        }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for CodeListController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeListController")
            .field("store", &self.store)
            .field("collection", &self.collection)
            .field("codes", &self.roster.with_untracked(Roster::len))
            .field("loaded", &self.loaded.get_untracked())
            .finish()
    }
}

impl<S: RemoteStore> CodeListController<S> {
    pub fn new(store: S, options: &UseRedeemCodesOptions) -> Self {
        Self {
            store: Arc::new(store),
            collection: options.collection.clone(),
            roster: ArcRwSignal::new(Roster::new()),
            loaded: ArcRwSignal::new(false),
            sort: ArcRwSignal::new(options.initial_sort),
            refreshing: OperationGuard::new(),
            generating: OperationGuard::new(),
            deleting_all: OperationGuard::new(),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Replaces the roster with the current contents of the remote collection, newest first.
    ///
    /// On failure, previously loaded codes are kept.
    pub async fn refresh(&self) -> Result<usize, RedeemCodesError> {
        let Some(_in_flight) = self.refreshing.try_enter() else {
            tracing::debug!("Refresh already in flight. Ignoring request.");
            return BusySnafu {
                operation: Operation::Refresh,
            }
            .fail();
        };

        tracing::trace!(collection = %self.collection, "Fetching redeem codes");
        let epoch = self.epoch();
        let result = self
            .store
            .fetch_all(
                &self.collection,
                CREATED_AT_FIELD,
                OrderDirection::Descending,
            )
            .await;
        self.ensure_epoch(epoch, Operation::Refresh)?;
        let documents = result.map_err(|err| {
            tracing::error!(?err, "Could not fetch redeem codes.");
            StoreSnafu.into_error(err)
        })?;

        let roster = Roster::from(documents);
        let count = roster.len();
        self.roster.set(roster);
        self.loaded.set(true);
        tracing::debug!(count, "Fetched redeem codes");
        Ok(count)
    }

    /// Creates `count` codes, one remote call after the other.
    ///
    /// Every code is added to the roster as soon as the store confirmed it. Should a creation
    /// fail, the codes created before stay, in the store and in the roster.
    pub async fn generate_codes(&self, count: NonZeroU32) -> Result<Vec<CodeId>, RedeemCodesError> {
        let Some(_in_flight) = self.generating.try_enter() else {
            tracing::debug!("Generation already in flight. Ignoring request.");
            return BusySnafu {
                operation: Operation::Generate,
            }
            .fail();
        };

        let requested = count.get();
        tracing::trace!(requested, "Generating redeem codes");
        let epoch = self.epoch();
        let mut created = Vec::with_capacity(requested as usize);
        for _ in 0..requested {
            let fields = CodeFields::unused(OffsetDateTime::now_utc());
            let result = self.store.create_document(&self.collection, &fields).await;
            self.ensure_epoch(epoch, Operation::Generate)?;
            match result {
                Ok(id) => {
                    self.roster
                        .update(|roster| roster.insert(RedeemCode::from_parts(id.clone(), fields)));
                    created.push(id);
                }
                Err(err) => {
                    tracing::error!(
                        ?err,
                        created = created.len(),
                        requested,
                        "Could not generate redeem code."
                    );
                    return Err(match created.len() {
                        0 => StoreSnafu.into_error(err),
                        n => PartialGenerateSnafu {
                            created: n as u32,
                            requested,
                        }
                        .into_error(err),
                    });
                }
            }
        }
        tracing::debug!(requested, "Generated redeem codes");
        Ok(created)
    }

    /// Parses `input` with [`parse_count`] and generates that many codes.
    pub async fn generate_from_input(&self, input: &str) -> Result<Vec<CodeId>, RedeemCodesError> {
        let count = parse_count(input)?;
        self.generate_codes(count).await
    }

    /// Flips the used flag of a known code. Returns the new value.
    ///
    /// The roster is only updated after the store accepted the write.
    pub async fn toggle_used(&self, id: &str) -> Result<bool, RedeemCodesError> {
        let Some(current) = self
            .roster
            .with_untracked(|roster| roster.get(id).map(|code| code.is_used))
        else {
            return NotFoundSnafu { id }.fail();
        };

        let is_used = !current;
        tracing::trace!(id, is_used, "Updating redeem code");
        let epoch = self.epoch();
        let result = self
            .store
            .update_document(&self.collection, id, &CodePatch::used(is_used))
            .await;
        self.ensure_epoch(epoch, Operation::ToggleUsed)?;
        match result {
            Ok(()) => {
                self.roster.update(|roster| {
                    roster.set_used(id, is_used);
                });
                Ok(is_used)
            }
            Err(StoreError::NotFound { id }) => {
                tracing::warn!(id, "Redeem code no longer exists. Dropping it.");
                self.roster.update(|roster| {
                    roster.remove(&id);
                });
                NotFoundSnafu { id }.fail()
            }
            Err(err) => {
                tracing::error!(?err, id, "Could not update redeem code.");
                Err(StoreSnafu.into_error(err))
            }
        }
    }

    /// Deletes a single code. A code that is already gone counts as deleted.
    pub async fn delete_code(&self, id: &str) -> Result<(), RedeemCodesError> {
        tracing::trace!(id, "Deleting redeem code");
        let epoch = self.epoch();
        let result = self.store.delete_document(&self.collection, id).await;
        self.ensure_epoch(epoch, Operation::DeleteCode)?;
        match result {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                tracing::debug!(id, "Redeem code was already deleted.");
            }
            Err(err) => {
                tracing::error!(?err, id, "Could not delete redeem code.");
                return Err(StoreSnafu.into_error(err));
            }
        }
        self.roster.update(|roster| {
            roster.remove(id);
        });
        Ok(())
    }

    /// Deletes every code of the roster in one atomic batch. Returns the number of deleted codes.
    ///
    /// `confirmation` must be exactly [`CONFIRMATION_PHRASE`].
    ///
    /// The batch covers the codes known when this is called. Codes generated while the batch
    /// is in flight are not part of it and survive, in the store and in the roster. The roster
    /// is therefore not necessarily empty after a successful call.
    pub async fn delete_all(&self, confirmation: &str) -> Result<usize, RedeemCodesError> {
        if confirmation != CONFIRMATION_PHRASE {
            return WrongConfirmationSnafu {
                expected: CONFIRMATION_PHRASE,
            }
            .fail();
        }
        let Some(_in_flight) = self.deleting_all.try_enter() else {
            tracing::debug!("Deletion of all codes already in flight. Ignoring request.");
            return BusySnafu {
                operation: Operation::DeleteAll,
            }
            .fail();
        };

        let ids = self.roster.with_untracked(Roster::ids);
        if ids.is_empty() {
            return Ok(0);
        }

        tracing::trace!(count = ids.len(), "Deleting all redeem codes");
        let epoch = self.epoch();
        let result = self.store.batch_delete(&self.collection, &ids).await;
        self.ensure_epoch(epoch, Operation::DeleteAll)?;
        result.map_err(|err| {
            tracing::error!(?err, "Could not delete all redeem codes.");
            StoreSnafu.into_error(err)
        })?;

        self.roster.update(|roster| {
            roster.remove_all(&ids);
        });
        tracing::debug!(count = ids.len(), "Deleted all redeem codes");
        Ok(ids.len())
    }

    /// Applies a column pick of the user to the sort state.
    pub fn select_sort(&self, column: SortColumn) {
        self.sort.update(|sort| *sort = sort.select(column));
    }

    /// Forgets all codes. Used when the session ends.
    ///
    /// Commands in flight keep running against the store, but their results are dropped.
    pub fn deactivate(&self) {
        tracing::trace!("Discarding redeem codes");
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.roster.set(Roster::new());
        self.loaded.set(false);
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Fails if the codes were discarded since `started`.
    fn ensure_epoch(&self, started: u64, operation: Operation) -> Result<(), RedeemCodesError> {
        if self.epoch() == started {
            return Ok(());
        }
        tracing::debug!(%operation, "Codes were discarded in the meantime. Dropping result.");
        SessionEndedSnafu { operation }.fail()
    }

    /// Tracked. The roster ordered by the current sort state.
    pub fn sorted_view(&self) -> Vec<CodeRow> {
        let sort = self.sort.get();
        self.roster.with(|roster| sorted_view(roster, sort))
    }

    /// Tracked.
    pub fn sort(&self) -> SortState {
        self.sort.get()
    }

    /// Tracked. Whether the first fetch completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    /// Untracked copy of the roster.
    pub fn roster(&self) -> Roster {
        self.roster.get_untracked()
    }

    /// Tracked.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.state() == OperationState::InFlight
    }

    /// Tracked.
    pub fn is_generating(&self) -> bool {
        self.generating.state() == OperationState::InFlight
    }

    /// Tracked.
    pub fn is_deleting_all(&self) -> bool {
        self.deleting_all.state() == OperationState::InFlight
    }
}
