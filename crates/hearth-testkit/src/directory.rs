//! In-memory procedure store for roster and household maintenance

use crate::hub::MemoryHub;
use async_trait::async_trait;
use hearth_app::{Household, Member};
use hearth_core::{ChangeTopic, HouseholdId, MemberId, ProcedureStore, StoreError};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Change-notice table for membership rows
const MEMBERS_TABLE: &str = "members";

#[derive(Deserialize)]
struct HouseholdArgs {
    household: HouseholdId,
}

#[derive(Deserialize)]
struct RenameArgs {
    household: HouseholdId,
    name: String,
}

/// An in-memory [`ProcedureStore`] serving the cross-entity calls
///
/// Knows `member_roster` and `rename_household`. Membership edits notify the
/// members topic when a hub is wired, the way the real backend announces
/// roster changes.
#[derive(Default)]
pub struct MemoryDirectory {
    households: Mutex<HashMap<HouseholdId, Household>>,
    members: Mutex<Vec<Member>>,
    hub: Option<Arc<MemoryHub>>,
    fail_call: AtomicBool,
    call_count: AtomicUsize,
}

impl MemoryDirectory {
    /// An empty directory with no hub wired
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty directory that notifies `hub` on membership changes
    pub fn with_hub(hub: Arc<MemoryHub>) -> Self {
        Self {
            hub: Some(hub),
            ..Self::default()
        }
    }

    /// Register a household
    pub fn put_household(&self, household: Household) {
        self.households.lock().insert(household.id, household);
    }

    /// Look up a registered household
    pub fn household(&self, id: HouseholdId) -> Option<Household> {
        self.households.lock().get(&id).cloned()
    }

    /// Add a membership and announce it
    pub fn add_member(&self, member: Member) {
        let household = member.household;
        self.members.lock().push(member);
        self.notify_members(household);
    }

    /// Remove a membership and announce it
    pub fn remove_member(&self, id: MemberId) {
        let mut removed_from = None;
        self.members.lock().retain(|m| {
            if m.id == id {
                removed_from = Some(m.household);
                false
            } else {
                true
            }
        });
        if let Some(household) = removed_from {
            self.notify_members(household);
        }
    }

    /// Every stored membership
    pub fn members(&self) -> Vec<Member> {
        self.members.lock().clone()
    }

    /// Make procedure calls fail with a rejection
    pub fn fail_calls(&self, fail: bool) {
        self.fail_call.store(fail, Ordering::SeqCst);
    }

    /// Procedure calls received so far
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn notify_members(&self, household: HouseholdId) {
        if let Some(hub) = &self.hub {
            hub.notify(ChangeTopic::table(MEMBERS_TABLE, household));
        }
    }
}

#[async_trait]
impl ProcedureStore for MemoryDirectory {
    async fn call(&self, procedure: &str, args: Value) -> Result<Value, StoreError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_call.load(Ordering::SeqCst) {
            return Err(StoreError::rejected("procedure calls are failing"));
        }
        match procedure {
            "member_roster" => {
                let args: HouseholdArgs = serde_json::from_value(args)?;
                let roster: Vec<Member> = self
                    .members
                    .lock()
                    .iter()
                    .filter(|m| m.household == args.household)
                    .cloned()
                    .collect();
                Ok(serde_json::to_value(roster)?)
            }
            "rename_household" => {
                let args: RenameArgs = serde_json::from_value(args)?;
                let renamed = {
                    let mut households = self.households.lock();
                    let Some(household) = households.get_mut(&args.household) else {
                        return Err(StoreError::not_found(format!(
                            "no household {}",
                            args.household
                        )));
                    };
                    household.name = args.name;
                    household.clone()
                };
                Ok(serde_json::to_value(renamed)?)
            }
            other => Err(StoreError::not_found(format!("no procedure {other}"))),
        }
    }
}

impl std::fmt::Debug for MemoryDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDirectory")
            .field("households", &self.households.lock().len())
            .field("members", &self.members.lock().len())
            .field("calls", &self.calls())
            .finish()
    }
}
