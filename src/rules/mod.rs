//! Game rules: turn structure, state-based actions, the legend rule and
//! how a game ends.

pub mod engine;
pub mod legend;
pub mod state_based;
pub mod turn;

pub use engine::{GameOutcome, GameStatus};
pub use legend::{apply_legend_rule, check_legend_rule};
pub use state_based::{
    apply_state_based_actions, check_state_based_actions, destroy_permanent,
    run_state_based_actions, LoseReason, StateBasedAction,
};
pub use turn::{advance_step, begin_turn, finish_cleanup, start_game, Step};
