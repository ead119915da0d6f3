//! Post-write hooks for store documents.
//!
//! A hook is a level-triggered rule evaluated after every committed
//! store write. Hooks are pure: they inspect the written document and
//! return the mutation to apply, if any. The storage layer applies
//! returned mutations without re-invoking hooks, so a hook must be
//! idempotent: re-evaluating it against its own output yields `None`.

use crate::models::store::{Store, search_key};

/// A follow-up mutation produced by a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMutation {
    /// Overwrite the case-folded search key.
    SetSearchKey(String),
}

pub trait StoreWriteHook: Send + Sync {
    /// Hook name, for log lines.
    fn name(&self) -> &'static str;

    fn after_write(&self, store: &Store) -> Option<StoreMutation>;
}

/// Keeps `name_lower` in sync with `name` on every store write.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseFoldSync;

impl StoreWriteHook for CaseFoldSync {
    fn name(&self) -> &'static str {
        "case_fold_sync"
    }

    fn after_write(&self, store: &Store) -> Option<StoreMutation> {
        let key = search_key(&store.name);
        if store.name_lower == key {
            None
        } else {
            Some(StoreMutation::SetSearchKey(key))
        }
    }
}
