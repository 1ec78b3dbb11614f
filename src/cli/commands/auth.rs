use clap::{Arg, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_OPEN: &str = "open";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_PATH: &str = "path";

#[must_use]
pub fn login() -> Command {
    Command::new(CMD_LOGIN)
        .about("Sign in and store the session token")
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long(ARG_EMAIL)
                .help("Operator email")
                .env("ROSTERCTL_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .short('p')
                .long(ARG_PASSWORD)
                .help("Operator password")
                .env("ROSTERCTL_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

#[must_use]
pub fn logout() -> Command {
    Command::new(CMD_LOGOUT).about("Clear the stored session token")
}

#[must_use]
pub fn open() -> Command {
    Command::new(CMD_OPEN)
        .about("Show where a console path leads for the current session")
        .arg(
            Arg::new(ARG_PATH)
                .help("Console path, e.g. /admin")
                .default_value("/admin"),
        )
}
