//! Running the router: shared services, the dispatcher and the serving loop.

mod dispatcher;
mod runner;
mod services;

pub use dispatcher::{DispatchError, DispatchOutcome, Dispatcher};
pub use runner::{BotRunner, RunnerMessage};
pub use services::Services;
