//! Everything derived from one grammar, computed once.

use crate::Grammar;

use super::{
    ll1_parsing_table::{LL1Conflict, LL1Table},
    lr_dfa::LR0Automaton,
    nullable_first_follow::{FirstSets, FollowSets},
    slr1_parsing_table::{LRParsingTable, SLR1Conflict},
};

#[derive(Debug, Clone)]
pub struct Analysis {
    pub first: FirstSets,
    pub follow: FollowSets,
    pub automaton: LR0Automaton,
    pub ll1_conflicts: Vec<LL1Conflict>,
    pub slr1_conflicts: Vec<SLR1Conflict>,
    /// Present exactly when the grammar is LL(1).
    pub ll1_table: Option<LL1Table>,
    /// Present exactly when the grammar is SLR(1).
    pub slr1_table: Option<LRParsingTable>,
}

impl Analysis {
    pub fn is_ll1(&self) -> bool {
        self.ll1_conflicts.is_empty()
    }

    pub fn is_slr1(&self) -> bool {
        self.slr1_conflicts.is_empty()
    }
}

impl Grammar {
    pub fn analyze(&self) -> Analysis {
        let first = FirstSets::compute(self);
        let follow = FollowSets::compute(self, &first);

        let ll1_conflicts = self.ll1_conflicts(&first, &follow);
        let ll1_table = if ll1_conflicts.is_empty() {
            self.build_ll1_table(&first, &follow)
                .map_err(|e| log::error!("{}", e))
                .ok()
        } else {
            None
        };

        let automaton = self.to_lr0_fsm();
        let slr1_conflicts = automaton.conflicts(&follow);
        let slr1_table = if slr1_conflicts.is_empty() {
            automaton
                .to_parsing_table(&follow)
                .map_err(|e| log::error!("{}", e))
                .ok()
        } else {
            None
        };

        log::debug!(
            "LL(1): {}, SLR(1): {}",
            ll1_table.is_some(),
            slr1_table.is_some()
        );

        Analysis {
            first,
            follow,
            automaton,
            ll1_conflicts,
            slr1_conflicts,
            ll1_table,
            slr1_table,
        }
    }
}
