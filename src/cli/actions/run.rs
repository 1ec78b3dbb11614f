use crate::cli::actions::{Action, login, logout, open, users};
use anyhow::Result;

/// Single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => login::execute(args).await,
        Action::Logout(args) => logout::execute(&args),
        Action::Open(args) => open::execute(&args),
        Action::Users(args) => users::execute(args).await,
    }
}
