//! The full in-memory backend bundle

use crate::directory::MemoryDirectory;
use crate::hub::MemoryHub;
use crate::table::MemoryTable;
use async_trait::async_trait;
use hearth_app::{Chore, Expense, HouseholdEvent, PantryItem, ShoppingItem};
use hearth_core::{
    ChangeFeed, ChangeStream, ChangeTopic, CollectionStore, HouseholdId, HouseholdRecord,
    ProcedureStore, RemoteId, StoreError,
};
use serde_json::Value;
use std::sync::Arc;

/// Every store seam the app core needs, backed by memory
///
/// One table per synced collection, one directory for procedures, one hub
/// for change notices, all wired together: committed writes notify the hub,
/// so an attached workspace sees its own writes echoed the way a remote
/// backend would echo them.
pub struct MemoryStores {
    hub: Arc<MemoryHub>,
    chores: MemoryTable<Chore>,
    shopping: MemoryTable<ShoppingItem>,
    pantry: MemoryTable<PantryItem>,
    events: MemoryTable<HouseholdEvent>,
    expenses: MemoryTable<Expense>,
    directory: MemoryDirectory,
}

impl MemoryStores {
    /// A fresh, empty backend
    pub fn new() -> Self {
        let hub = Arc::new(MemoryHub::new());
        Self {
            chores: MemoryTable::with_hub(Arc::clone(&hub)),
            shopping: MemoryTable::with_hub(Arc::clone(&hub)),
            pantry: MemoryTable::with_hub(Arc::clone(&hub)),
            events: MemoryTable::with_hub(Arc::clone(&hub)),
            expenses: MemoryTable::with_hub(Arc::clone(&hub)),
            directory: MemoryDirectory::with_hub(Arc::clone(&hub)),
            hub,
        }
    }

    /// The change-notice hub
    pub fn hub(&self) -> &MemoryHub {
        &self.hub
    }

    /// The chores table
    pub fn chores(&self) -> &MemoryTable<Chore> {
        &self.chores
    }

    /// The shopping list table
    pub fn shopping(&self) -> &MemoryTable<ShoppingItem> {
        &self.shopping
    }

    /// The pantry table
    pub fn pantry(&self) -> &MemoryTable<PantryItem> {
        &self.pantry
    }

    /// The calendar table
    pub fn events(&self) -> &MemoryTable<HouseholdEvent> {
        &self.events
    }

    /// The expense ledger table
    pub fn expenses(&self) -> &MemoryTable<Expense> {
        &self.expenses
    }

    /// The procedure directory
    pub fn directory(&self) -> &MemoryDirectory {
        &self.directory
    }
}

impl Default for MemoryStores {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! delegate_collection {
    ($record:ty, $field:ident) => {
        #[async_trait]
        impl CollectionStore<$record> for MemoryStores {
            async fn select(&self, household: HouseholdId) -> Result<Vec<$record>, StoreError> {
                self.$field.select(household).await
            }

            async fn insert(&self, record: $record) -> Result<$record, StoreError> {
                self.$field.insert(record).await
            }

            async fn update(
                &self,
                id: &RemoteId,
                patch: <$record as HouseholdRecord>::Patch,
            ) -> Result<(), StoreError> {
                self.$field.update(id, patch).await
            }

            async fn delete(&self, ids: &[RemoteId]) -> Result<(), StoreError> {
                self.$field.delete(ids).await
            }
        }
    };
}

delegate_collection!(Chore, chores);
delegate_collection!(ShoppingItem, shopping);
delegate_collection!(PantryItem, pantry);
delegate_collection!(HouseholdEvent, events);
delegate_collection!(Expense, expenses);

#[async_trait]
impl ProcedureStore for MemoryStores {
    async fn call(&self, procedure: &str, args: Value) -> Result<Value, StoreError> {
        self.directory.call(procedure, args).await
    }
}

#[async_trait]
impl ChangeStream for MemoryStores {
    async fn subscribe(&self, topic: ChangeTopic) -> Result<ChangeFeed, StoreError> {
        self.hub.subscribe(topic).await
    }
}

impl std::fmt::Debug for MemoryStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStores")
            .field("chores", &self.chores.len())
            .field("shopping", &self.shopping.len())
            .field("pantry", &self.pantry.len())
            .field("events", &self.events.len())
            .field("expenses", &self.expenses.len())
            .finish_non_exhaustive()
    }
}
