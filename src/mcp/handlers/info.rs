//! Workspace status, server info, version and the raw passthrough.

use crate::mcp::handlers::Invocation;
use crate::mcp::request::{RawCommandArgs, names};
use crate::p4::command::parse_raw;
use crate::p4::{CommandRunner, P4Command, P4Error};

pub const VERSION_TEXT: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Opened files plus pending changelists of the current client.
pub async fn status<R: CommandRunner>(inv: &Invocation<'_, R>) -> Result<String, P4Error> {
    let client = match inv.default_client() {
        Some(c) => c.to_string(),
        None => {
            let out = inv
                .run(P4Command::from_args(["-ztag", "-F", "%clientName%", "info"]))
                .await?;
            out.stdout.trim().to_string()
        }
    };

    let opened = inv.run(P4Command::new("opened")).await?;
    let pending = P4Command::new("changes").args(["-s", "pending"]);
    let pending = if client.is_empty() {
        pending
    } else {
        pending.arg("-c").arg(client)
    };
    let pending = inv.run(pending).await?;

    Ok(format!(
        "Opened files:\n{}\n\nPending changes:\n{}",
        opened.stdout, pending.stdout
    ))
}

pub async fn info<R: CommandRunner>(inv: &Invocation<'_, R>) -> Result<String, P4Error> {
    let info = inv.run(P4Command::new("info")).await?;
    let settings = inv.run(P4Command::new("set")).await?;
    Ok(format!(
        "P4 Info:\n{}\n\nP4 Settings:\n{}",
        info.stdout, settings.stdout
    ))
}

pub fn version() -> String {
    VERSION_TEXT.to_string()
}

/// Run a user-supplied `p4 ...` line. Anything but `p4` is refused.
pub async fn raw_command<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: RawCommandArgs,
) -> Result<String, P4Error> {
    let cmd = parse_raw(&args.command).map_err(|reason| P4Error::invalid(names::RAW_COMMAND, reason))?;
    let out = inv.run(cmd).await?;
    if out.stderr.trim().is_empty() {
        Ok(out.stdout)
    } else {
        Ok(format!("{}\n\nSTDERR:\n{}", out.stdout, out.stderr))
    }
}
