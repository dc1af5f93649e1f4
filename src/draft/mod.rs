// Draft domain: turn vocabulary, sequence generation, mutable state,
// and the countdown timer.

pub mod sequence;
pub mod state;
pub mod timer;
pub mod turn;
