// SPDX-License-Identifier: MIT

//! Oplet registry (C4): in-memory `alias -> Oplet` map.
//!
//! Not mutex-protected. Read and written only by the dispatcher task in
//! [`crate::engine`], including fan-out setup/teardown for a pass's worker
//! pool — workers receive oplet references by channel and never touch the
//! map itself.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use va_core::{Alias, Oplet};

pub struct OpletRegistry<O: Oplet> {
    entries: HashMap<Alias, Arc<O>>,
}

impl<O: Oplet> OpletRegistry<O> {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn get(&self, alias: &Alias) -> Option<&Arc<O>> {
        self.entries.get(alias)
    }

    pub fn contains(&self, alias: &Alias) -> bool {
        self.entries.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn aliases(&self) -> Vec<Alias> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Alias, &Arc<O>)> {
        self.entries.iter()
    }

    pub fn oplets(&self) -> Vec<Arc<O>> {
        self.entries.values().cloned().collect()
    }

    /// Register a freshly constructed oplet under its own alias. Fails if
    /// the alias is already present or the oplet's `alias()` disagrees with
    /// the key it is being registered under — both are programmer errors.
    pub fn register(&mut self, oplet: Arc<O>) -> Result<(), RegistryError> {
        let alias = oplet.alias().clone();
        if self.entries.contains_key(&alias) {
            return Err(RegistryError::AlreadyRegistered(alias));
        }
        self.entries.insert(alias, oplet);
        Ok(())
    }

    pub fn unregister(&mut self, alias: &Alias) -> Option<Arc<O>> {
        self.entries.remove(alias)
    }

    /// Assert invariant (i) of the registry: every key agrees with its
    /// oplet's own reported alias. Panics on violation — this is the
    /// programmer-error case §7 calls non-recoverable.
    pub fn assert_invariants(&self) {
        for (key, oplet) in &self.entries {
            assert_eq!(
                oplet.alias(),
                key,
                "registry invariant violated: key {key} maps to oplet reporting alias {}",
                oplet.alias()
            );
        }
    }
}

impl<O: Oplet> Default for OpletRegistry<O> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("alias {0} is already registered")]
    AlreadyRegistered(Alias),
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
