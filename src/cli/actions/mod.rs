pub mod login;
pub mod logout;
pub mod open;
pub mod users;

// Internal "interpreter" for `Action`; the match lives in `run` so this module stays small.
mod run;

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Logout(logout::Args),
    Open(open::Args),
    Users(users::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
