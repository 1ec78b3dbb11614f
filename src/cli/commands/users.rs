use crate::console::BulkAction;
use clap::{Arg, ArgAction, Command};

pub const CMD_USERS: &str = "users";
pub const CMD_LIST: &str = "list";

pub const ARG_JSON: &str = "json";
pub const ARG_IDS: &str = "ids";
pub const ARG_ALL: &str = "all";

fn bulk(action: BulkAction) -> Command {
    let about = match action {
        BulkAction::Block => "Block the given accounts",
        BulkAction::Unblock => "Unblock the given accounts",
        BulkAction::Delete => "Delete the given accounts",
    };

    Command::new(action.as_str())
        .about(about)
        .arg(
            Arg::new(ARG_IDS)
                .help("Account identifiers as shown by `users list`")
                .num_args(1..)
                .required_unless_present(ARG_ALL),
        )
        .arg(
            Arg::new(ARG_ALL)
                .long(ARG_ALL)
                .help("Select every account in the roster")
                .action(ArgAction::SetTrue)
                .conflicts_with(ARG_IDS),
        )
}

#[must_use]
pub fn command() -> Command {
    let list = Command::new(CMD_LIST).about("Show the roster").arg(
        Arg::new(ARG_JSON)
            .long(ARG_JSON)
            .help("Print the roster as JSON")
            .action(ArgAction::SetTrue),
    );

    BulkAction::ALL.into_iter().fold(
        Command::new(CMD_USERS)
            .about("Inspect and moderate managed accounts")
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommand(list),
        |command, action| command.subcommand(bulk(action)),
    )
}
