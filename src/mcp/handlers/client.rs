//! Client workspace operations.

use crate::mcp::handlers::{Invocation, edit_spec};
use crate::mcp::request::{
    ClientCreateArgs, ClientDeleteArgs, ClientInfoArgs, ClientListArgs, ClientSwitchArgs,
    SpecEditArgs, names,
};
use crate::p4::spec::ClientSpec;
use crate::p4::{CommandRunner, P4Command, P4Error};

pub async fn list<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: ClientListArgs,
) -> Result<String, P4Error> {
    let user = args.user.as_deref().filter(|u| !u.trim().is_empty());
    let out = inv.run(P4Command::new("clients").opt("-u", user)).await?;
    Ok(out.stdout_or("No clients found"))
}

pub async fn info<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: ClientInfoArgs,
) -> Result<String, P4Error> {
    let mut cmd = P4Command::new("client").arg("-o");
    if let Some(client) = args.client.filter(|c| !c.trim().is_empty()) {
        cmd = cmd.arg(client);
    }
    Ok(inv.run(cmd).await?.stdout)
}

pub async fn create<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: ClientCreateArgs,
) -> Result<String, P4Error> {
    let owner = inv.owner().await?;
    let spec = ClientSpec {
        name: args.client,
        root: args.root,
        owner,
        description: args.description.filter(|d| !d.trim().is_empty()),
        options: args.options,
        stream: args.stream.filter(|s| !s.trim().is_empty()),
        view: args.view,
    };
    let out = inv
        .run(P4Command::new("client").arg("-i").input(spec.render()))
        .await?;
    Ok(out.stderr_or_stdout())
}

pub async fn edit<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: SpecEditArgs,
) -> Result<String, P4Error> {
    edit_spec(inv, "client", names::CLIENT_EDIT, &args.target, args.spec).await
}

pub async fn delete<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: ClientDeleteArgs,
) -> Result<String, P4Error> {
    let cmd = P4Command::new("client")
        .arg("-d")
        .flag_if(args.force, "-f")
        .arg(args.client);
    let out = inv.run(cmd).await?;
    Ok(out.stderr_or_stdout())
}

/// Persist `P4CLIENT` with `p4 set`, then show `p4 info` as later commands see it.
///
/// A client configured at startup is passed as `-c` to every command and
/// outranks the persisted setting; the reply says so.
pub async fn switch<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: ClientSwitchArgs,
) -> Result<String, P4Error> {
    let client = args.client.trim();
    inv.run(P4Command::new("set").arg(format!("P4CLIENT={client}")))
        .await?;
    let info = inv.run(P4Command::new("info")).await?;

    let mut text = format!("Switched to client: {client}\n\n");
    if let Some(configured) = inv.default_client().filter(|c| *c != client) {
        text.push_str(&format!(
            "Note: this server was started with client {configured} (--client or P4CLIENT); \
             it is still passed as -c to every command and takes precedence over {client}.\n\n"
        ));
    }
    text.push_str(&info.stdout);
    Ok(text)
}
