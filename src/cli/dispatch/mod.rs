//! Maps validated CLI arguments to an `Action`.

use crate::{
    cli::{
        actions::{
            Action, login, logout, open,
            users::{self, Target, UsersCommand},
        },
        commands::{api, auth, users as users_cmd},
        globals::GlobalArgs,
    },
    console::BulkAction,
};
use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let options = api::Options::parse(matches)?;
    let globals = GlobalArgs::new(options.url, options.timeout_seconds, options.state_dir);

    match matches.subcommand() {
        Some((auth::CMD_LOGIN, sub)) => {
            let email = sub
                .get_one::<String>(auth::ARG_EMAIL)
                .cloned()
                .context("missing required argument: --email")?;
            let password = sub
                .get_one::<String>(auth::ARG_PASSWORD)
                .cloned()
                .context("missing required argument: --password")?;
            Ok(Action::Login(login::Args {
                globals,
                email,
                password: SecretString::from(password),
            }))
        }
        Some((auth::CMD_LOGOUT, _)) => Ok(Action::Logout(logout::Args { globals })),
        Some((auth::CMD_OPEN, sub)) => Ok(Action::Open(open::Args {
            globals,
            path: sub
                .get_one::<String>(auth::ARG_PATH)
                .cloned()
                .unwrap_or_else(|| "/admin".to_string()),
        })),
        Some((users_cmd::CMD_USERS, sub)) => Ok(Action::Users(users::Args {
            globals,
            command: users_command(sub)?,
        })),
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("missing command"),
    }
}

fn users_command(matches: &ArgMatches) -> Result<UsersCommand> {
    let Some((name, sub)) = matches.subcommand() else {
        bail!("missing users command");
    };

    if name == users_cmd::CMD_LIST {
        return Ok(UsersCommand::List {
            json: sub.get_flag(users_cmd::ARG_JSON),
        });
    }

    let action: BulkAction = name.parse().map_err(|err: String| anyhow::anyhow!(err))?;
    let target = if sub.get_flag(users_cmd::ARG_ALL) {
        Target::All
    } else {
        Target::Ids(
            sub.get_many::<String>(users_cmd::ARG_IDS)
                .context("missing account ids")?
                .cloned()
                .collect(),
        )
    };
    Ok(UsersCommand::Bulk { action, target })
}
