use crate::{
    cli::globals::GlobalArgs,
    console::{
        ActionError, ApplyOutcome, BulkAction, ConsoleError, FetchOutcome, LogoutReason,
        Navigation, Roster, RosterBackend, RosterView, humanize::last_login_label,
    },
};
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use tracing::warn;

const NOT_LOGGED_IN: &str = "Not logged in. Run `rosterctl login` first.";
const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    All,
    Ids(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UsersCommand {
    List { json: bool },
    Bulk { action: BulkAction, target: Target },
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: UsersCommand,
}

/// # Errors
/// Returns an error when there is no session, the roster cannot be loaded or
/// the action fails.
pub async fn execute(args: Args) -> Result<()> {
    let mut view = RosterView::new(args.globals.backend()?, args.globals.session()?);
    let output = run(&mut view, &args.command, Utc::now()).await?;
    print!("{output}");
    Ok(())
}

async fn run<B: RosterBackend + ?Sized>(
    view: &mut RosterView<B>,
    command: &UsersCommand,
    now: DateTime<Utc>,
) -> Result<String> {
    if let Navigation::Redirect(_) = view.navigation() {
        bail!(NOT_LOGGED_IN);
    }

    match view.mount().await {
        FetchOutcome::Applied => {}
        FetchOutcome::Failed(err) => return Err(failure(&err)),
        FetchOutcome::LoggedOut(reason) => bail!(logout_message(reason)),
        FetchOutcome::Discarded => bail!(SESSION_EXPIRED),
    }

    match command {
        UsersCommand::List { json: true } => Ok(format!(
            "{}\n",
            serde_json::to_string_pretty(view.roster())?
        )),
        UsersCommand::List { json: false } => Ok(render_table(view.roster(), now)),
        UsersCommand::Bulk { action, target } => {
            select(view, *action, target)?;
            let count = view.selection().len();

            let outcome = view
                .apply(*action)
                .await
                .map_err(|err| failure(&err))?;

            match outcome {
                ApplyOutcome::Reconciled { confirmed } => {
                    if !confirmed {
                        warn!("roster refresh failed, showing local projection");
                    }
                    let mut output = format!("{action} applied to {count} account(s).\n");
                    output.push_str(&render_table(view.roster(), now));
                    Ok(output)
                }
                ApplyOutcome::LoggedOut(LogoutReason::NoActiveAccounts) => {
                    Ok(format!("{}\n", logout_message(LogoutReason::NoActiveAccounts)))
                }
                ApplyOutcome::LoggedOut(reason) => bail!(logout_message(reason)),
                ApplyOutcome::Discarded => bail!(SESSION_EXPIRED),
            }
        }
    }
}

fn select<B: RosterBackend + ?Sized>(
    view: &mut RosterView<B>,
    action: BulkAction,
    target: &Target,
) -> Result<()> {
    match target {
        Target::All => {
            if view.roster().is_empty() {
                bail!("No accounts to {action}.");
            }
            view.select_all();
        }
        Target::Ids(labels) => {
            for label in labels {
                let id = view
                    .roster()
                    .find_by_label(label)
                    .cloned()
                    .ok_or_else(|| anyhow!("unknown account id: {label}"))?;
                if !view.selection().contains(&id) {
                    view.toggle(&id);
                }
            }
        }
    }
    Ok(())
}

/// A token that could not be removed is reported as such, never as a
/// generic retry message.
fn failure(err: &ActionError) -> anyhow::Error {
    match &err.source {
        ConsoleError::Session(_) => anyhow!(
            "Session could not be cleared ({}). Run `rosterctl logout` or remove the token file.",
            err.source
        ),
        _ => anyhow!(err.user_message()),
    }
}

const fn logout_message(reason: LogoutReason) -> &'static str {
    match reason {
        LogoutReason::NoActiveAccounts => {
            "No active accounts remain. Session cleared, please log in again."
        }
        LogoutReason::SessionRejected | LogoutReason::MissingSession => SESSION_EXPIRED,
        LogoutReason::Operator => "Logged out.",
    }
}

fn render_table(roster: &Roster, now: DateTime<Utc>) -> String {
    if roster.is_empty() {
        return "No users found.\n".to_string();
    }

    let header = ["ID", "NAME", "EMAIL", "LAST LOGIN", "STATUS"].map(str::to_string);
    let rows: Vec<[String; 5]> = roster
        .iter()
        .map(|account| {
            [
                account.id.to_string(),
                account.name.clone(),
                account.email.clone(),
                last_login_label(account.last_login, now),
                account.status.to_string(),
            ]
        })
        .collect();

    let mut widths = header.clone().map(|cell| cell.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    for row in std::iter::once(&header).chain(&rows) {
        let mut line = String::new();
        for (cell, width) in row.iter().zip(widths) {
            let _ = write!(line, "{cell:<width$}  ");
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}
