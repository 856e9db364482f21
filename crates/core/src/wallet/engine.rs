//! Top-up workflow engine.
//!
//! The engine is the only writer of transaction status and balances. Each
//! mutating operation opens exactly one unit of work, performs the pending
//! check and every write through it, and commits once. Nothing is held in
//! memory between calls; concurrent callers are serialised by the store.

use pointly_shared::types::{PageRequest, PageResponse, TransactionId};
use tracing::{debug, error, info, instrument, warn};

use crate::wallet::access::{AdminCapability, CustomerCapability, Principal};
use crate::wallet::error::{StoreError, WalletError};
use crate::wallet::ledger::{Balance, verify_after_credit};
use crate::wallet::notification::NotificationDraft;
use crate::wallet::service::{TopUpRequest, TopUpResolution, TopUpService, ValidatedTopUp};
use crate::wallet::store::{UnitOfWork, UnitOfWorkSource, WalletStore};
use crate::wallet::types::{Notification, Role, Transaction, TransactionType};

/// Drives top-up requests and resolutions against a [`WalletStore`].
#[derive(Debug, Clone)]
pub struct TopUpEngine<S> {
    store: S,
}

impl<S: WalletStore> TopUpEngine<S> {
    /// Creates an engine over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Records a pending top-up and notifies every administrator.
    ///
    /// No balance changes until the request is approved.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the actor is not a customer
    /// - `InvalidInput` for a non-positive amount or a blank payment method or receipt
    /// - `StorageFailure` if the unit of work could not commit
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id, amount = request.amount))]
    pub async fn request_top_up(
        &self,
        actor: &Principal,
        request: TopUpRequest,
    ) -> Result<TransactionId, WalletError> {
        let customer = actor.require_customer()?;
        let validated = TopUpService::validate_request(request)?;

        let unit = self.store.begin().await?;
        let outcome = self.record_request(&unit, customer, validated).await;
        let transaction_id = Self::finish(unit, outcome).await?;

        info!(transaction_id = %transaction_id, "Top-up request recorded");
        Ok(transaction_id)
    }

    /// Approves or rejects a pending top-up.
    ///
    /// On approval the beneficiary's points grow by the transaction amount.
    /// Either way the beneficiary receives one notification. The status
    /// change, the credit and the notification commit together or not at all.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the actor is not an admin
    /// - `NotFoundOrAlreadyProcessed` if the transaction is missing, not a
    ///   top-up, or was already resolved (including by a concurrent call)
    /// - `InvalidInput` if the credit would overflow the beneficiary's balance;
    ///   the transaction stays pending and can still be rejected
    /// - `StorageFailure` if the unit of work could not commit or the balance
    ///   read back after crediting breaks the ledger invariants
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn resolve_top_up(
        &self,
        actor: &Principal,
        transaction_id: TransactionId,
        approved: bool,
    ) -> Result<(), WalletError> {
        let admin = actor.require_admin()?;

        let unit = self.store.begin().await?;
        let outcome = self.apply_resolution(&unit, admin, transaction_id, approved).await;
        let resolution = Self::finish(unit, outcome).await?;

        info!(
            transaction_id = %resolution.transaction_id,
            user_id = %resolution.user_id,
            status = %resolution.new_status,
            credited = resolution.credit.map_or(0, |p| p.value()),
            "Top-up resolved"
        );
        Ok(())
    }

    /// Returns the actor's own balance.
    ///
    /// # Errors
    ///
    /// Returns `StorageFailure` if the read fails or the user has no balance row.
    pub async fn balance(&self, actor: &Principal) -> Result<Balance, WalletError> {
        let balance = self.store.balance(actor.user_id).await?.ok_or_else(|| {
            StoreError::MissingRow(format!("balance for user {}", actor.user_id))
        })?;
        Ok(balance)
    }

    /// Returns the actor's own transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageFailure` if the read fails.
    pub async fn transaction_history(
        &self,
        actor: &Principal,
        page: PageRequest,
    ) -> Result<PageResponse<Transaction>, WalletError> {
        Ok(self.store.transactions_for_user(actor.user_id, page).await?)
    }

    /// Returns the actor's own notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageFailure` if the read fails.
    pub async fn notifications(
        &self,
        actor: &Principal,
        page: PageRequest,
    ) -> Result<PageResponse<Notification>, WalletError> {
        Ok(self.store.notifications_for_user(actor.user_id, page).await?)
    }

    // ========================================================================
    // Unit-of-work bodies
    // ========================================================================

    async fn record_request(
        &self,
        unit: &<S as UnitOfWorkSource>::Unit,
        customer: CustomerCapability,
        request: ValidatedTopUp,
    ) -> Result<TransactionId, WalletError> {
        let new = TopUpService::new_transaction(customer.user_id(), request);
        let transaction_id = self.store.insert(unit, new).await?;

        let notified = self
            .store
            .notify_by_role(unit, Role::Admin, &NotificationDraft::top_up_requested(transaction_id))
            .await?;
        debug!(transaction_id = %transaction_id, admins = notified, "Administrators notified");

        Ok(transaction_id)
    }

    async fn apply_resolution(
        &self,
        unit: &<S as UnitOfWorkSource>::Unit,
        admin: AdminCapability,
        transaction_id: TransactionId,
        approved: bool,
    ) -> Result<TopUpResolution, WalletError> {
        let Some(transaction) = self
            .store
            .get_pending_by_id(unit, transaction_id, TransactionType::TopUp)
            .await?
        else {
            info!(transaction_id = %transaction_id, "Top-up not found or already processed");
            return Err(WalletError::NotFoundOrAlreadyProcessed(transaction_id));
        };

        let resolution = TopUpService::resolve(&transaction, approved)?;

        if !self
            .store
            .transition_status(unit, transaction_id, resolution.new_status)
            .await?
        {
            warn!(
                transaction_id = %transaction_id,
                admin = %admin.user_id(),
                "Lost resolution race, transaction no longer pending"
            );
            return Err(WalletError::NotFoundOrAlreadyProcessed(transaction_id));
        }

        if let Some(amount) = resolution.credit {
            self.store
                .credit_points(unit, resolution.user_id, amount)
                .await?;

            let balance = verify_after_credit(
                resolution.user_id,
                self.store.get_balance(unit, resolution.user_id).await?,
                amount,
            )?;
            debug!(
                user_id = %resolution.user_id,
                points = balance.points.value(),
                reserved_points = balance.reserved_points.value(),
                "Balance after credit"
            );
        }

        self.store
            .notify_user(unit, resolution.user_id, &resolution.notification)
            .await?;

        Ok(resolution)
    }

    /// Commits on success, rolls back on failure.
    async fn finish<T>(
        unit: <S as UnitOfWorkSource>::Unit,
        outcome: Result<T, WalletError>,
    ) -> Result<T, WalletError> {
        match outcome {
            Ok(value) => {
                if let Err(err) = unit.commit().await {
                    error!(error = %err, "Failed to commit unit of work");
                    return Err(err.into());
                }
                Ok(value)
            }
            Err(err) => {
                if err.is_retryable() {
                    error!(error = %err, "Unit of work failed, rolling back");
                }
                if let Err(rollback_err) = unit.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed, unit discarded");
                }
                Err(err)
            }
        }
    }
}
