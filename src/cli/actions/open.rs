use crate::{
    cli::globals::GlobalArgs,
    console::{Navigation, Route, Session, SessionGate},
};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub path: String,
}

fn describe(path: &str, session: &Session) -> String {
    match SessionGate::guard(Route::from_path(path), session) {
        Navigation::Render(route) => format!("render {route}"),
        Navigation::Redirect(route) => format!("redirect {route}"),
    }
}

/// # Errors
/// Returns an error if the session store cannot be opened.
pub fn execute(args: &Args) -> Result<()> {
    let session = args.globals.session()?;
    println!("{}", describe(&args.path, &session));
    Ok(())
}
