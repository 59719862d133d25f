use {solana_program::pubkey::Pubkey, std::collections::BTreeMap};

/// Reverse indices from an account to the tasks it created or claimed,
/// each kept in insertion order. A cancelled task leaves its creator's list,
/// claims are never undone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserIndex {
    created: BTreeMap<Pubkey, Vec<u64>>,
    claimed: BTreeMap<Pubkey, Vec<u64>>,
}

impl UserIndex {
    pub fn record_created(&mut self, creator: &Pubkey, task_id: u64) {
        self.created.entry(*creator).or_default().push(task_id);
    }

    pub fn record_claimed(&mut self, claimant: &Pubkey, task_id: u64) {
        self.claimed.entry(*claimant).or_default().push(task_id);
    }

    /// Drop a cancelled task from its creator's list
    pub fn forget_created(&mut self, creator: &Pubkey, task_id: u64) {
        if let Some(ids) = self.created.get_mut(creator) {
            ids.retain(|id| *id != task_id);
            if ids.is_empty() {
                self.created.remove(creator);
            }
        }
    }

    pub fn created_by(&self, creator: &Pubkey) -> &[u64] {
        self.created.get(creator).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn claimed_by(&self, claimant: &Pubkey) -> &[u64] {
        self.claimed.get(claimant).map(Vec::as_slice).unwrap_or(&[])
    }
}
