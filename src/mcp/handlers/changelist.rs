//! change -i / submit / reopen

use crate::mcp::handlers::Invocation;
use crate::mcp::request::{ChangelistCreateArgs, MoveArgs, SubmitArgs};
use crate::p4::spec::{changelist_spec, parse_created_changelist};
use crate::p4::{CommandRunner, P4Command, P4Error};

pub async fn create<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: ChangelistCreateArgs,
) -> Result<String, P4Error> {
    let spec = changelist_spec(&args.description);
    let out = inv
        .run(P4Command::new("change").arg("-i").input(spec))
        .await?;
    Ok(match parse_created_changelist(&out.stdout) {
        Some(number) => format!("Created changelist {number}"),
        None => out.stdout,
    })
}

pub async fn submit<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: SubmitArgs,
) -> Result<String, P4Error> {
    let description = args.description.as_deref().filter(|d| !d.trim().is_empty());
    let cmd = if args.is_default_changelist() {
        P4Command::new("submit").opt("-d", description)
    } else {
        P4Command::new("submit")
            .arg("-c")
            .arg(args.changelist.trim())
            .opt("-d", description)
    };
    let out = inv.run(cmd).await?;
    Ok(out.stderr_or_stdout())
}

pub async fn move_files<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: MoveArgs,
) -> Result<String, P4Error> {
    let cmd = P4Command::new("reopen")
        .arg("-c")
        .arg(args.changelist.trim())
        .args(args.files.0);
    let out = inv.run(cmd).await?;
    Ok(out.stderr_or_stdout())
}
