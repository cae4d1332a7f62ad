//! Companion kind oracle implementation.

use std::collections::HashMap;

use cast_core::{CompanionKindId, CompanionOracle, CompanionTemplate};

/// Runtime implementation of CompanionOracle backed by an immutable table.
#[derive(Debug, Clone, Default)]
pub struct CompanionOracleImpl {
    kinds: HashMap<CompanionKindId, CompanionTemplate>,
}

impl CompanionOracleImpl {
    pub fn new(templates: impl IntoIterator<Item = CompanionTemplate>) -> Self {
        Self {
            kinds: templates
                .into_iter()
                .map(|template| (template.kind, template))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl CompanionOracle for CompanionOracleImpl {
    fn companion(&self, kind: CompanionKindId) -> Option<&CompanionTemplate> {
        self.kinds.get(&kind)
    }
}
