mod commands;
mod history;

pub use commands::TreeCommand;
pub use history::CommandHistory;
