//! Ready-made households for tests

use crate::stores::MemoryStores;
use hearth_app::{Household, Member, MemberRole};
use hearth_core::{MemberId, UserId};

/// A household with a named set of members
///
/// The first member is the steward. Member and user ids are minted fresh,
/// so fixtures never collide across tests.
#[derive(Debug, Clone)]
pub struct HouseholdFixture {
    /// The fixture household
    pub household: Household,
    /// Memberships in roster order
    pub members: Vec<Member>,
}

impl HouseholdFixture {
    /// Build a household with one member per name
    pub fn with_members(names: &[&str]) -> Self {
        let household = Household::new("Maple Street");
        let members = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let mut member = Member::new(household.id, UserId::new(), *name);
                if index == 0 {
                    member.role = MemberRole::Steward;
                }
                member
            })
            .collect();
        Self { household, members }
    }

    /// Member ids in roster order
    pub fn roster(&self) -> Vec<MemberId> {
        self.members.iter().map(|m| m.id).collect()
    }

    /// The member at `index` in roster order
    pub fn member(&self, index: usize) -> &Member {
        &self.members[index]
    }

    /// The user behind the member at `index`
    pub fn user(&self, index: usize) -> UserId {
        self.members[index].user
    }

    /// Register the household and its members with a backend
    pub fn install(&self, stores: &MemoryStores) {
        stores.directory().put_household(self.household.clone());
        for member in &self.members {
            stores.directory().add_member(member.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_member_is_the_steward() {
        let fixture = HouseholdFixture::with_members(&["ada", "brendan"]);
        assert_eq!(fixture.member(0).role, MemberRole::Steward);
        assert_eq!(fixture.member(1).role, MemberRole::Resident);
        assert_eq!(fixture.roster().len(), 2);
    }

    #[test]
    fn install_registers_household_and_members() {
        let stores = MemoryStores::new();
        let fixture = HouseholdFixture::with_members(&["ada", "brendan", "grace"]);
        fixture.install(&stores);

        assert!(stores.directory().household(fixture.household.id).is_some());
        assert_eq!(stores.directory().members().len(), 3);
    }
}
