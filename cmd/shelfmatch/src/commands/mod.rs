//! CLI commands module.

mod check;
mod eval;
mod matching;
mod repl;
mod setup;
mod util;

pub use check::CheckCommand;
pub use eval::EvalCommand;
pub use matching::MatchCommand;
pub use repl::ReplCommand;
pub use setup::SetupCommand;

pub(crate) use util::*;
