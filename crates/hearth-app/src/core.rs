//! The embeddable application core
//!
//! `AppCore` is the headless center a UI binds to: session state, the fault
//! slot, and at most one attached [`HouseholdWorkspace`]. The workspace owns
//! one mutation coordinator per collection plus the change relay that keeps
//! them fresh; reads are observables, mutations are optimistic.

use crate::household::{roster_ids, Household, Member};
use crate::records::{Chore, Expense, HouseholdEvent, PantryItem, ShoppingItem};
use hearth_core::{
    Amount, ChangeStream, ChangeTopic, CollectionStore, HouseholdId, Observable, ProcedureStore,
    RecordId, RemoteOp, StoreError, SyncError, UserId,
};
use hearth_settle::{settle, Settlement};
use hearth_sync::{ChangeRelay, FaultSink, MutationCoordinator, SyncConfig};
use parking_lot::RwLock;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Procedure serving the household roster
const ROSTER_PROCEDURE: &str = "member_roster";
/// Procedure renaming a household
const RENAME_PROCEDURE: &str = "rename_household";
/// Change-notice table for membership rows
const MEMBERS_TABLE: &str = "members";

/// Authenticated-session state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user, if any
    pub user: Option<UserId>,
}

/// Everything the core needs from a backend, as one bound
///
/// Blanket-implemented for any store serving the five synced tables plus
/// procedures and change notices, so backends implement only the individual
/// traits.
pub trait StoreBundle:
    CollectionStore<Chore>
    + CollectionStore<ShoppingItem>
    + CollectionStore<PantryItem>
    + CollectionStore<HouseholdEvent>
    + CollectionStore<Expense>
    + ProcedureStore
    + ChangeStream
    + 'static
{
}

impl<S> StoreBundle for S where
    S: CollectionStore<Chore>
        + CollectionStore<ShoppingItem>
        + CollectionStore<PantryItem>
        + CollectionStore<HouseholdEvent>
        + CollectionStore<Expense>
        + ProcedureStore
        + ChangeStream
        + 'static
{
}

/// Live state for one attached household
///
/// Handed out as an `Arc` so views can hold it directly; it is torn down by
/// [`AppCore::detach_household`], after which its coordinators no longer
/// have pending timers.
pub struct HouseholdWorkspace {
    household: Observable<Household>,
    members: Observable<Vec<Member>>,
    chores: MutationCoordinator<Chore>,
    shopping: MutationCoordinator<ShoppingItem>,
    pantry: MutationCoordinator<PantryItem>,
    events: MutationCoordinator<HouseholdEvent>,
    expenses: MutationCoordinator<Expense>,
    relay: ChangeRelay,
}

impl HouseholdWorkspace {
    /// The attached household
    pub fn household(&self) -> &Observable<Household> {
        &self.household
    }

    /// The household roster, in server order
    pub fn members(&self) -> &Observable<Vec<Member>> {
        &self.members
    }

    /// Chore board coordinator
    pub fn chores(&self) -> &MutationCoordinator<Chore> {
        &self.chores
    }

    /// Shopping list coordinator
    pub fn shopping(&self) -> &MutationCoordinator<ShoppingItem> {
        &self.shopping
    }

    /// Pantry coordinator
    pub fn pantry(&self) -> &MutationCoordinator<PantryItem> {
        &self.pantry
    }

    /// Calendar coordinator
    pub fn events(&self) -> &MutationCoordinator<HouseholdEvent> {
        &self.events
    }

    /// Expense ledger coordinator
    pub fn expenses(&self) -> &MutationCoordinator<Expense> {
        &self.expenses
    }

    /// Settle the ledger as it stands.
    ///
    /// Pure and recomputed per call; callers observing the expense or member
    /// collections recompute when either changes.
    pub fn settlement(&self) -> Settlement {
        let expenses = self.expenses.snapshot();
        let members = self.members.get();
        settle(
            expenses.iter().map(|e| (e.payer, e.amount)),
            &roster_ids(&members),
        )
    }

    fn shutdown(&self) {
        self.relay.unbind_all();
        self.chores.shutdown();
        self.shopping.shutdown();
        self.pantry.shutdown();
        self.events.shutdown();
        self.expenses.shutdown();
    }
}

impl std::fmt::Debug for HouseholdWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HouseholdWorkspace")
            .field("household", &self.household.get().id)
            .field("members", &self.members.get().len())
            .finish_non_exhaustive()
    }
}

/// The application core a UI embeds
pub struct AppCore<S: StoreBundle> {
    stores: Arc<S>,
    config: SyncConfig,
    session: Observable<Session>,
    faults: FaultSink,
    workspace: RwLock<Option<Arc<HouseholdWorkspace>>>,
}

impl<S: StoreBundle> AppCore<S> {
    /// Create a core over a backend bundle
    pub fn new(stores: Arc<S>, config: SyncConfig) -> Self {
        Self {
            stores,
            config,
            session: Observable::new(Session::default()),
            faults: FaultSink::new(),
            workspace: RwLock::new(None),
        }
    }

    /// Session state observable
    pub fn session(&self) -> &Observable<Session> {
        &self.session
    }

    /// The shared last-fault slot
    pub fn faults(&self) -> &FaultSink {
        &self.faults
    }

    /// The attached workspace, if any
    pub fn workspace(&self) -> Option<Arc<HouseholdWorkspace>> {
        self.workspace.read().clone()
    }

    /// Record the authenticated user
    pub fn sign_in(&self, user: UserId) {
        info!(%user, "signed in");
        self.session.set(Session { user: Some(user) });
    }

    /// Clear the session; the attached household goes with it
    pub fn sign_out(&self) {
        self.detach_household();
        self.session.set(Session::default());
        info!("signed out");
    }

    /// Attach a household and bring its workspace live.
    ///
    /// Builds the five coordinators, binds their change feeds plus the
    /// members feed, then runs the initial loads. Load failures are not
    /// fatal; they land in the fault slot like any other remote failure.
    pub async fn attach_household(&self, household: Household) -> Result<(), SyncError> {
        if self.session.get().user.is_none() {
            let error = SyncError::NotAuthenticated;
            self.faults.record(error.clone());
            return Err(error);
        }
        self.detach_household();

        let id = household.id;
        info!(household = %id, "attaching household");

        let chores = MutationCoordinator::new(
            self.stores.clone() as Arc<dyn CollectionStore<Chore>>,
            id,
            self.faults.clone(),
            self.config.clone(),
        );
        let shopping = MutationCoordinator::new(
            self.stores.clone() as Arc<dyn CollectionStore<ShoppingItem>>,
            id,
            self.faults.clone(),
            self.config.clone(),
        );
        let pantry = MutationCoordinator::new(
            self.stores.clone() as Arc<dyn CollectionStore<PantryItem>>,
            id,
            self.faults.clone(),
            self.config.clone(),
        );
        let events = MutationCoordinator::new(
            self.stores.clone() as Arc<dyn CollectionStore<HouseholdEvent>>,
            id,
            self.faults.clone(),
            self.config.clone(),
        );
        let expenses = MutationCoordinator::new(
            self.stores.clone() as Arc<dyn CollectionStore<Expense>>,
            id,
            self.faults.clone(),
            self.config.clone(),
        );

        let members: Observable<Vec<Member>> = Observable::new(Vec::new());
        let relay = ChangeRelay::new(self.stores.clone() as Arc<dyn ChangeStream>);

        let subscribe_err = |error: StoreError| {
            let error = SyncError::remote_rejected(RemoteOp::Subscribe, &error);
            self.faults.record(error.clone());
            error
        };
        relay.bind_collection(&chores).await.map_err(subscribe_err)?;
        relay.bind_collection(&shopping).await.map_err(subscribe_err)?;
        relay.bind_collection(&pantry).await.map_err(subscribe_err)?;
        relay.bind_collection(&events).await.map_err(subscribe_err)?;
        relay.bind_collection(&expenses).await.map_err(subscribe_err)?;

        {
            let procedures = self.procedures();
            let members = members.clone();
            let faults = self.faults.clone();
            relay
                .bind(ChangeTopic::table(MEMBERS_TABLE, id), move || {
                    let procedures = procedures.clone();
                    let members = members.clone();
                    let faults = faults.clone();
                    async move {
                        match fetch_roster(procedures.as_ref(), id).await {
                            Ok(roster) => {
                                faults.clear();
                                members.set(roster);
                            }
                            Err(error) => {
                                warn!(%error, "roster refresh failed");
                                faults.record(error);
                            }
                        }
                    }
                })
                .await
                .map_err(subscribe_err)?;
        }

        let workspace = Arc::new(HouseholdWorkspace {
            household: Observable::new(household),
            members,
            chores,
            shopping,
            pantry,
            events,
            expenses,
            relay,
        });

        workspace.chores.reload().await;
        workspace.shopping.reload().await;
        workspace.pantry.reload().await;
        workspace.events.reload().await;
        workspace.expenses.reload().await;
        match fetch_roster(self.procedures().as_ref(), id).await {
            Ok(roster) => workspace.members.set(roster),
            Err(error) => {
                warn!(%error, "initial roster fetch failed");
                self.faults.record(error);
            }
        }

        *self.workspace.write() = Some(workspace);
        Ok(())
    }

    /// Tear down the attached workspace, cancelling pending writes.
    pub fn detach_household(&self) {
        if let Some(workspace) = self.workspace.write().take() {
            info!(household = %workspace.household.get().id, "detaching household");
            workspace.shutdown();
        }
    }

    /// Enter an expense paid by the acting member.
    ///
    /// Payer, creator, and timestamp are stamped here, not by the caller.
    /// Without a session or household this is a no-op that records the
    /// precondition fault.
    pub async fn add_expense(&self, title: impl Into<String>, amount: Amount) {
        let Ok(workspace) = self.require_workspace() else {
            return;
        };
        let Some(member) = self.acting_member(&workspace) else {
            return;
        };
        let expense = Expense::new(
            workspace.household.get().id,
            member.id,
            title,
            amount,
            member.id,
        );
        workspace.expenses.create(expense).await;
    }

    /// Remove an expense from the ledger.
    pub async fn remove_expense(&self, id: &RecordId) {
        let Ok(workspace) = self.require_workspace() else {
            return;
        };
        workspace.expenses.remove(id).await;
    }

    /// Rename the household, remote first.
    ///
    /// Renames are rare and contested by nobody, so this is the one write
    /// that is not optimistic: the local name changes only after the remote
    /// accepts it.
    pub async fn rename_household(&self, name: impl Into<String>) -> Result<(), SyncError> {
        let workspace = self.require_workspace()?;
        let name = name.into();
        let household = workspace.household.get().id;

        let args = json!({ "household": household, "name": name });
        self.procedures()
            .call(RENAME_PROCEDURE, args)
            .await
            .map_err(|error| {
                let error = SyncError::remote_rejected(RemoteOp::Call, &error);
                self.faults.record(error.clone());
                error
            })?;

        self.faults.clear();
        workspace.household.modify(|h| h.name = name);
        Ok(())
    }

    /// Re-fetch the roster and replace the members observable.
    pub async fn refresh_members(&self) -> Result<(), SyncError> {
        let workspace = self.require_workspace()?;
        let household = workspace.household.get().id;
        match fetch_roster(self.procedures().as_ref(), household).await {
            Ok(roster) => {
                self.faults.clear();
                workspace.members.set(roster);
                Ok(())
            }
            Err(error) => {
                self.faults.record(error.clone());
                Err(error)
            }
        }
    }

    /// Guard shared by every mutation: signed in, household attached.
    fn require_workspace(&self) -> Result<Arc<HouseholdWorkspace>, SyncError> {
        if self.session.get().user.is_none() {
            let error = SyncError::NotAuthenticated;
            self.faults.record(error.clone());
            return Err(error);
        }
        match self.workspace.read().clone() {
            Some(workspace) => Ok(workspace),
            None => {
                let error = SyncError::NoHousehold;
                self.faults.record(error.clone());
                Err(error)
            }
        }
    }

    /// The signed-in user's membership in the attached household
    fn acting_member(&self, workspace: &HouseholdWorkspace) -> Option<Member> {
        let user = self.session.get().user?;
        let member = workspace.members.get().into_iter().find(|m| m.user == user);
        if member.is_none() {
            warn!(%user, "signed-in user has no membership in attached household");
            self.faults.record(SyncError::NoHousehold);
        }
        member
    }

    fn procedures(&self) -> Arc<dyn ProcedureStore> {
        self.stores.clone() as Arc<dyn ProcedureStore>
    }
}

impl<S: StoreBundle> Drop for AppCore<S> {
    fn drop(&mut self) {
        self.detach_household();
    }
}

/// Fetch the roster through the procedure seam.
async fn fetch_roster(
    procedures: &dyn ProcedureStore,
    household: HouseholdId,
) -> Result<Vec<Member>, SyncError> {
    let args = json!({ "household": household });
    let value = procedures
        .call(ROSTER_PROCEDURE, args)
        .await
        .map_err(|error| SyncError::remote_rejected(RemoteOp::Call, &error))?;
    serde_json::from_value(value)
        .map_err(|error| SyncError::remote_rejected(RemoteOp::Call, &StoreError::from(error)))
}
