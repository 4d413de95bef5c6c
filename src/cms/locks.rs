use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Per-block mutation lock. A save or publish holds the block's slot until
/// the guard drops; a second request for the same block is turned away
/// instead of racing the first one.
#[derive(Clone, Default)]
pub struct BlockLocks {
    held: Arc<Mutex<HashSet<String>>>,
}

pub struct BlockLockGuard {
    held: Arc<Mutex<HashSet<String>>>,
    block_id: String,
}

impl BlockLocks {
    pub fn try_acquire(&self, block_id: &str) -> Option<BlockLockGuard> {
        let mut held = self.held.lock().unwrap_or_else(|poisoned| {
            log::error!("Block lock table was poisoned! Recovering lock.");
            poisoned.into_inner()
        });
        if !held.insert(block_id.to_string()) {
            log::warn!("Rejected concurrent mutation of block {}", block_id);
            return None;
        }
        Some(BlockLockGuard { held: Arc::clone(&self.held), block_id: block_id.to_string() })
    }
}

impl Drop for BlockLockGuard {
    fn drop(&mut self) {
        let mut held = self.held.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        held.remove(&self.block_id);
    }
}
