//! Full app flows over the in-memory backend

use assert_matches::assert_matches;
use hearth_app::{
    AppCore, Chore, Member, PantryItem, PantryItemPatch, ShoppingItem, ShoppingItemPatch,
};
use hearth_core::{Amount, RemoteOp, SyncError, UserId};
use hearth_sync::SyncConfig;
use hearth_testkit::{HouseholdFixture, MemoryStores};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::yield_now;

async fn attached_core() -> (Arc<MemoryStores>, AppCore<MemoryStores>, HouseholdFixture) {
    hearth_testkit::init_tracing();
    let stores = Arc::new(MemoryStores::new());
    let fixture = HouseholdFixture::with_members(&["ada", "brendan"]);
    fixture.install(&stores);

    let core = AppCore::new(stores.clone(), SyncConfig::default());
    core.sign_in(fixture.user(0));
    core.attach_household(fixture.household.clone())
        .await
        .unwrap();
    (stores, core, fixture)
}

#[tokio::test]
async fn mutations_require_a_session_and_household() {
    hearth_testkit::init_tracing();
    let stores = Arc::new(MemoryStores::new());
    let fixture = HouseholdFixture::with_members(&["ada"]);
    fixture.install(&stores);
    let core = AppCore::new(stores.clone(), SyncConfig::default());

    core.add_expense("rent", Amount::new(1000)).await;
    assert_matches!(core.faults().current(), Some(SyncError::NotAuthenticated));
    assert_matches!(
        core.attach_household(fixture.household.clone()).await,
        Err(SyncError::NotAuthenticated)
    );

    core.sign_in(fixture.user(0));
    core.add_expense("rent", Amount::new(1000)).await;
    assert_matches!(core.faults().current(), Some(SyncError::NoHousehold));
    assert!(stores.expenses().is_empty());
}

#[tokio::test]
async fn attach_loads_collections_and_roster() {
    hearth_testkit::init_tracing();
    let stores = Arc::new(MemoryStores::new());
    let fixture = HouseholdFixture::with_members(&["ada", "brendan"]);
    fixture.install(&stores);
    stores
        .chores()
        .seed(Chore::new(fixture.household.id, "water the plants"));

    let core = AppCore::new(stores.clone(), SyncConfig::default());
    core.sign_in(fixture.user(0));
    core.attach_household(fixture.household.clone())
        .await
        .unwrap();

    let workspace = core.workspace().unwrap();
    assert_eq!(workspace.household().get().name, "Maple Street");
    assert_eq!(workspace.members().get().len(), 2);
    let chores = workspace.chores().snapshot();
    assert_eq!(chores.len(), 1);
    assert_eq!(chores[0].text, "water the plants");
}

#[tokio::test]
async fn add_expense_stamps_payer_and_creator() {
    let (stores, core, fixture) = attached_core().await;

    core.add_expense("groceries", Amount::new(1000)).await;

    let workspace = core.workspace().unwrap();
    let rows = workspace.expenses().snapshot();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].id.is_remote());
    assert_eq!(rows[0].payer, fixture.member(0).id);
    assert_eq!(rows[0].created_by, fixture.member(0).id);
    assert_eq!(rows[0].amount, Amount::new(1000));
    assert_eq!(stores.expenses().len(), 1);
}

#[tokio::test]
async fn settlement_reflects_the_ledger() {
    let (_stores, core, fixture) = attached_core().await;
    core.add_expense("groceries", Amount::new(1000)).await;

    let plan = core.workspace().unwrap().settlement();

    assert_eq!(plan.total, Amount::new(1000));
    assert_eq!(plan.balance_for(fixture.member(0).id), Some(Amount::new(500)));
    assert_eq!(
        plan.balance_for(fixture.member(1).id),
        Some(Amount::new(-500))
    );
    assert_eq!(plan.transfers.len(), 1);
    assert_eq!(plan.transfers[0].from, fixture.member(1).id);
    assert_eq!(plan.transfers[0].to, fixture.member(0).id);
    assert_eq!(plan.transfers[0].amount, Amount::new(500));
}

#[tokio::test]
async fn removed_expenses_leave_the_ledger() {
    let (stores, core, _fixture) = attached_core().await;
    core.add_expense("groceries", Amount::new(900)).await;
    let id = core.workspace().unwrap().expenses().snapshot()[0].id.clone();

    core.remove_expense(&id).await;

    let workspace = core.workspace().unwrap();
    assert!(workspace.expenses().snapshot().is_empty());
    assert!(stores.expenses().is_empty());
    assert!(workspace.settlement().is_settled());
}

#[tokio::test(start_paused = true)]
async fn pantry_edits_coalesce_into_one_write() {
    let (stores, core, fixture) = attached_core().await;
    let workspace = core.workspace().unwrap();
    let stored = stores
        .pantry()
        .seed(PantryItem::new(fixture.household.id, "rice"));
    workspace.pantry().reload().await;

    workspace
        .pantry()
        .update(&stored.id, PantryItemPatch::quantity(2))
        .await;
    workspace
        .pantry()
        .update(&stored.id, PantryItemPatch::quantity(3))
        .await;
    workspace
        .pantry()
        .update(&stored.id, PantryItemPatch::note("basmati"))
        .await;
    assert_eq!(stores.pantry().updates(), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(stores.pantry().updates(), 1);
    let rows = stores.pantry().rows();
    assert_eq!(rows[0].quantity, 3);
    assert_eq!(rows[0].note, "basmati");
}

#[tokio::test]
async fn rename_household_updates_local_and_remote_state() {
    let (stores, core, fixture) = attached_core().await;

    core.rename_household("The Annex").await.unwrap();

    let workspace = core.workspace().unwrap();
    assert_eq!(workspace.household().get().name, "The Annex");
    let stored = stores.directory().household(fixture.household.id).unwrap();
    assert_eq!(stored.name, "The Annex");
}

#[tokio::test]
async fn failed_rename_keeps_the_old_name() {
    let (stores, core, _fixture) = attached_core().await;
    stores.directory().fail_calls(true);

    let result = core.rename_household("The Annex").await;

    assert_matches!(
        result,
        Err(SyncError::RemoteRejected {
            operation: RemoteOp::Call,
            ..
        })
    );
    let workspace = core.workspace().unwrap();
    assert_eq!(workspace.household().get().name, "Maple Street");
    assert_matches!(
        core.faults().current(),
        Some(SyncError::RemoteRejected {
            operation: RemoteOp::Call,
            ..
        })
    );
}

#[tokio::test]
async fn roster_refreshes_on_member_notice() {
    let (stores, core, fixture) = attached_core().await;
    let workspace = core.workspace().unwrap();
    assert_eq!(workspace.members().get().len(), 2);

    let newcomer = Member::new(fixture.household.id, UserId::new(), "casey");
    stores.directory().add_member(newcomer.clone());

    while workspace.members().get().len() < 3 {
        yield_now().await;
    }
    assert!(workspace
        .members()
        .get()
        .iter()
        .any(|m| m.id == newcomer.id));
}

#[tokio::test]
async fn refresh_members_failure_records_a_fault() {
    let (stores, core, _fixture) = attached_core().await;
    stores.directory().fail_calls(true);

    let result = core.refresh_members().await;

    assert_matches!(
        result,
        Err(SyncError::RemoteRejected {
            operation: RemoteOp::Call,
            ..
        })
    );
    assert_matches!(
        core.faults().current(),
        Some(SyncError::RemoteRejected {
            operation: RemoteOp::Call,
            ..
        })
    );
}

#[tokio::test(start_paused = true)]
async fn detach_cancels_pending_debounced_writes() {
    let (stores, core, fixture) = attached_core().await;
    let workspace = core.workspace().unwrap();
    let stored = stores
        .shopping()
        .seed(ShoppingItem::new(fixture.household.id, "milk"));
    workspace.shopping().reload().await;

    workspace
        .shopping()
        .update(&stored.id, ShoppingItemPatch::text("oat milk"))
        .await;
    core.detach_household();

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(core.workspace().is_none());
    assert_eq!(stores.shopping().updates(), 0);
    assert_eq!(stores.shopping().rows()[0].text, "milk");
}

#[tokio::test]
async fn sign_out_clears_workspace_and_session() {
    let (_stores, core, _fixture) = attached_core().await;

    core.sign_out();

    assert!(core.workspace().is_none());
    assert!(core.session().get().user.is_none());
}
