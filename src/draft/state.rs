// Mutable draft state: compositions, ban lists, and the turn index.
//
// The state store is the only place the draft mutates. Every accepted action
// advances the turn index by exactly one; every rejected action leaves the
// state untouched. Retraction is an out-of-band correction that frees a
// champion without rewinding the index (the emptied slot's original turn is
// not reopened).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::catalog::ChampionId;

use super::sequence::DraftSequence;
use super::turn::{Action, EloBracket, Role, Side, Turn};

/// Hard cap on bans per side. Sequences may assign fewer ban turns, never
/// more.
pub const BAN_LIST_CAPACITY: usize = 5;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("draft has not been started")]
    NotStarted,

    #[error("draft is already complete")]
    Complete,

    #[error("champion {0} is already picked or banned")]
    ChampionUnavailable(ChampionId),

    #[error("{side} ban list is full")]
    BanListFull { side: Side },

    #[error("{side} {role} slot is already filled")]
    SlotOccupied { side: Side, role: Role },

    #[error("no champion in {side} {role} slot")]
    EmptySlot { side: Side, role: Role },

    #[error("{side} ban index {index} is out of range")]
    BanIndexOutOfRange { side: Side, index: usize },
}

// ---------------------------------------------------------------------------
// Team-level containers
// ---------------------------------------------------------------------------

/// One team's picks, indexed by role. A champion reference here is a catalog
/// key, not an owning pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamComposition {
    slots: [Option<ChampionId>; Role::COUNT],
}

impl TeamComposition {
    pub fn get(&self, role: Role) -> Option<ChampionId> {
        self.slots[role.index()]
    }

    /// Fill a role slot. Returns the previous occupant, if any.
    pub fn set(&mut self, role: Role, champion: ChampionId) -> Option<ChampionId> {
        self.slots[role.index()].replace(champion)
    }

    /// Empty a role slot, returning the removed champion.
    pub fn clear(&mut self, role: Role) -> Option<ChampionId> {
        self.slots[role.index()].take()
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    pub fn contains(&self, champion: ChampionId) -> bool {
        self.slots.iter().any(|s| *s == Some(champion))
    }

    /// Iterate (role, occupant) pairs in display order.
    pub fn entries(&self) -> impl Iterator<Item = (Role, Option<ChampionId>)> + '_ {
        Role::ALL.iter().map(move |&role| (role, self.get(role)))
    }
}

/// One team's bans, in the order they were committed. Append-only except for
/// explicit removal-by-index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanList {
    entries: Vec<ChampionId>,
}

impl BanList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= BAN_LIST_CAPACITY
    }

    pub fn contains(&self, champion: ChampionId) -> bool {
        self.entries.contains(&champion)
    }

    /// Append a ban. Fails when the list already holds the maximum.
    fn push(&mut self, champion: ChampionId) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries.push(champion);
        true
    }

    /// Remove the ban at `index`, returning it. Later entries shift down.
    fn remove(&mut self, index: usize) -> Option<ChampionId> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn entries(&self) -> &[ChampionId] {
        &self.entries
    }
}

/// Addresses a single retractable slot: a pick by role or a ban by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Pick(Role),
    Ban(usize),
}

// ---------------------------------------------------------------------------
// DraftState
// ---------------------------------------------------------------------------

/// The root draft aggregate: both compositions, both ban lists, the turn
/// index, and the selection metadata forwarded to the provider.
///
/// Invariant (apply/reset flows): the number of filled pick slots plus ban
/// entries across both sides equals the turn index. Retraction deliberately
/// breaks this count without rewinding the index; see `retract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    pub blue: TeamComposition,
    pub red: TeamComposition,
    pub blue_bans: BanList,
    pub red_bans: BanList,
    /// Index of the next turn to act on; equals the sequence length once the
    /// draft is complete.
    pub turn_index: usize,
    /// Set by the explicit start signal; actions are rejected until then.
    started: bool,
    pub elo_bracket: EloBracket,
    pub patch: Option<String>,
}

impl DraftState {
    /// Create a fresh draft: all slots empty, index 0, not yet started.
    pub fn new(elo_bracket: EloBracket, patch: Option<String>) -> Self {
        DraftState {
            blue: TeamComposition::default(),
            red: TeamComposition::default(),
            blue_bans: BanList::default(),
            red_bans: BanList::default(),
            turn_index: 0,
            started: false,
            elo_bracket,
            patch,
        }
    }

    /// Mark the draft as accepting actions.
    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn composition(&self, side: Side) -> &TeamComposition {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
        }
    }

    pub fn bans(&self, side: Side) -> &BanList {
        match side {
            Side::Blue => &self.blue_bans,
            Side::Red => &self.red_bans,
        }
    }

    /// Whether a champion is present anywhere in the draft (either
    /// composition or either ban list).
    pub fn champion_is_taken(&self, champion: ChampionId) -> bool {
        self.blue.contains(champion)
            || self.red.contains(champion)
            || self.blue_bans.contains(champion)
            || self.red_bans.contains(champion)
    }

    /// Filled pick slots plus ban entries across both sides.
    pub fn filled_slots(&self) -> usize {
        self.blue.filled_count()
            + self.red.filled_count()
            + self.blue_bans.len()
            + self.red_bans.len()
    }

    /// Whether the turn cursor has run off the end of the sequence.
    pub fn is_complete(&self, sequence: &DraftSequence) -> bool {
        self.turn_index >= sequence.len()
    }

    /// Commit `champion` to the turn at the current index.
    ///
    /// On success the ban or pick is recorded, the turn index advances by
    /// one, and the committed turn is returned so the caller can reset the
    /// timer and re-derive the cursor. On any error the state is unchanged.
    pub fn apply(
        &mut self,
        sequence: &DraftSequence,
        champion: ChampionId,
    ) -> Result<Turn, DraftError> {
        if !self.started {
            return Err(DraftError::NotStarted);
        }
        let turn = *sequence
            .turn_at(self.turn_index)
            .ok_or(DraftError::Complete)?;

        if self.champion_is_taken(champion) {
            return Err(DraftError::ChampionUnavailable(champion));
        }

        match turn.action {
            Action::Ban => {
                let bans = match turn.side {
                    Side::Blue => &mut self.blue_bans,
                    Side::Red => &mut self.red_bans,
                };
                // Unreachable with a generated sequence, but the sequence and
                // state can be driven independently in tests.
                if !bans.push(champion) {
                    return Err(DraftError::BanListFull { side: turn.side });
                }
            }
            Action::Pick(role) => {
                let composition = match turn.side {
                    Side::Blue => &mut self.blue,
                    Side::Red => &mut self.red,
                };
                if composition.get(role).is_some() {
                    return Err(DraftError::SlotOccupied {
                        side: turn.side,
                        role,
                    });
                }
                composition.set(role, champion);
            }
        }

        self.turn_index += 1;
        debug!(
            "applied {} {} -> champion {} (turn index now {})",
            turn.side, turn.action, champion, self.turn_index
        );
        Ok(turn)
    }

    /// Remove a previously committed pick or ban, returning the freed
    /// champion.
    ///
    /// This does not rewind the turn index or reopen the emptied slot for
    /// the normal turn flow; the champion simply becomes available for a
    /// later turn.
    pub fn retract(&mut self, side: Side, slot: Slot) -> Result<ChampionId, DraftError> {
        match slot {
            Slot::Pick(role) => {
                let composition = match side {
                    Side::Blue => &mut self.blue,
                    Side::Red => &mut self.red,
                };
                composition
                    .clear(role)
                    .ok_or(DraftError::EmptySlot { side, role })
            }
            Slot::Ban(index) => {
                let bans = match side {
                    Side::Blue => &mut self.blue_bans,
                    Side::Red => &mut self.red_bans,
                };
                bans.remove(index)
                    .ok_or(DraftError::BanIndexOutOfRange { side, index })
            }
        }
    }

    /// Return every slot to empty, the index to 0, and the started flag to
    /// false. Selection metadata (bracket, patch) is kept. Idempotent.
    pub fn reset(&mut self) {
        self.blue = TeamComposition::default();
        self.red = TeamComposition::default();
        self.blue_bans = BanList::default();
        self.red_bans = BanList::default();
        self.turn_index = 0;
        self.started = false;
    }
}
