//! CLI module - argument parsing and subcommand runners

mod args;
pub mod serve;
pub mod train;

pub use args::{Cli, Commands, ModelSource, PredictArgs, ServeArgs, TrainArgs};
pub use serve::{run_predict, run_serve};
pub use train::run_train;
