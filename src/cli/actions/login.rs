use crate::{
    cli::globals::GlobalArgs,
    console::login::{Credentials, login, welcome_message},
};
use anyhow::{Result, anyhow};
use secrecy::SecretString;
use tracing::debug;

pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("globals", &self.globals)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Sign in and persist the token for the configured API origin.
///
/// # Errors
/// Returns the login form message when sign-in fails.
pub async fn execute(args: Args) -> Result<()> {
    let session = args.globals.session()?;
    let backend = args.globals.backend()?;
    let credentials = Credentials::new(&args.email, args.password);

    let user = login(backend.as_ref(), &session, &credentials)
        .await
        .map_err(|err| {
            debug!("login error: {err}");
            anyhow!(err.user_message())
        })?;

    println!("{}", welcome_message(&user));
    Ok(())
}
