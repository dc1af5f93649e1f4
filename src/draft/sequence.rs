// Draft order generation and the turn cursor.
//
// The sequence is built once from configuration when a draft is created and
// is immutable afterwards. Alternate formats (no bans, blind pick) are
// expressed by generating a different sequence, not by changing engine code.

use serde::{Deserialize, Serialize};

use super::turn::{Action, Role, Side, Turn};

/// The complete ordered list of turns for one draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSequence {
    turns: Vec<Turn>,
}

impl DraftSequence {
    /// Generate the canonical turn order for a two-team draft.
    ///
    /// Ban phase: `ban_count_per_side` bans per team in strict alternation,
    /// blue first. Pick phase: snake order over the role list — the side
    /// that picks a role first flips at every role boundary, starting with
    /// blue, so blue leads the odd-numbered roles and red the even-numbered
    /// ones. The flip happens per role, not per pick.
    pub fn generate(ban_count_per_side: usize, roles: &[Role]) -> Self {
        let mut turns = Vec::with_capacity(2 * ban_count_per_side + 2 * roles.len());

        for _ in 0..ban_count_per_side {
            turns.push(Turn {
                side: Side::Blue,
                action: Action::Ban,
            });
            turns.push(Turn {
                side: Side::Red,
                action: Action::Ban,
            });
        }

        for (i, &role) in roles.iter().enumerate() {
            let first = if i % 2 == 0 { Side::Blue } else { Side::Red };
            turns.push(Turn {
                side: first,
                action: Action::Pick(role),
            });
            turns.push(Turn {
                side: first.opponent(),
                action: Action::Pick(role),
            });
        }

        DraftSequence { turns }
    }

    /// The turn at `index`, or `None` once the draft is complete.
    pub fn turn_at(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    /// Total number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of ban turns assigned to `side`.
    pub fn ban_count(&self, side: Side) -> usize {
        self.turns
            .iter()
            .filter(|t| t.side == side && t.action == Action::Ban)
            .count()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }
}
