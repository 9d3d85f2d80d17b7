//! add / edit / delete / revert / sync / diff

use crate::mcp::handlers::Invocation;
use crate::mcp::request::{FilesArgs, RevertArgs, SyncArgs};
use crate::p4::{CommandRunner, P4Command, P4Error};

/// Depot-wide wildcard used when reverting a whole changelist.
const ALL_FILES: &str = "//...";

/// `p4 add|edit|delete <files>`.
pub async fn open_files<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    action: &str,
    args: FilesArgs,
) -> Result<String, P4Error> {
    let out = inv.run(P4Command::new(action).args(args.files.0)).await?;
    Ok(out.stderr_or_stdout())
}

pub async fn revert<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: RevertArgs,
) -> Result<String, P4Error> {
    let files = args.files.map(|f| f.0).unwrap_or_default();
    let changelist = args.changelist.filter(|c| !c.trim().is_empty());

    let mut cmd = P4Command::new("revert").opt("-c", changelist.as_deref());
    cmd = if changelist.is_some() && files.is_empty() {
        cmd.arg(ALL_FILES)
    } else {
        cmd.args(files)
    };

    let out = inv.run(cmd).await?;
    Ok(out.stderr_or_stdout())
}

pub async fn sync<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: SyncArgs,
) -> Result<String, P4Error> {
    let cmd = P4Command::new("sync")
        .flag_if(args.force, "-f")
        .args(args.files.map(|f| f.0).unwrap_or_default());
    let out = inv.run(cmd).await?;
    Ok(out.stderr_or_stdout())
}

pub async fn diff<R: CommandRunner>(
    inv: &Invocation<'_, R>,
    args: FilesArgs,
) -> Result<String, P4Error> {
    let out = inv.run(P4Command::new("diff").args(args.files.0)).await?;
    Ok(out.stdout_or("No differences found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::handlers::testing::*;
    use crate::mcp::request::FileList;

    fn files(names: &[&str]) -> FileList {
        FileList(names.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn add_prefers_stderr() {
        let runner = ScriptedRunner::new().reply(
            "//depot/a.txt#1 - opened for add\n",
            "b.txt - file(s) not in client view.\n",
        );
        let inv = Invocation::new(&runner, None);
        let text = open_files(&inv, "add", FilesArgs { files: files(&["a.txt", "b.txt"]) })
            .await
            .unwrap();
        assert_eq!(text, "b.txt - file(s) not in client view.\n");
        assert_eq!(runner.argvs(), vec![argv(&["add", "a.txt", "b.txt"])]);
    }

    #[tokio::test]
    async fn file_names_with_spaces_stay_whole() {
        let runner = ScriptedRunner::new();
        let inv = Invocation::new(&runner, None);
        open_files(&inv, "edit", FilesArgs { files: files(&["dir/my file.txt"]) })
            .await
            .unwrap();
        assert_eq!(runner.argvs(), vec![argv(&["edit", "dir/my file.txt"])]);
    }

    #[tokio::test]
    async fn revert_changelist_covers_all_files() {
        let runner = ScriptedRunner::new();
        let inv = Invocation::new(&runner, None);
        revert(
            &inv,
            RevertArgs {
                files: None,
                changelist: Some("42".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(runner.argvs(), vec![argv(&["revert", "-c", "42", "//..."])]);
    }

    #[tokio::test]
    async fn revert_files_within_changelist() {
        let runner = ScriptedRunner::new();
        let inv = Invocation::new(&runner, None);
        revert(
            &inv,
            RevertArgs {
                files: Some(files(&["a.c"])),
                changelist: Some("42".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(runner.argvs(), vec![argv(&["revert", "-c", "42", "a.c"])]);
    }

    #[tokio::test]
    async fn revert_with_nothing_lets_p4_report_usage() {
        let runner = ScriptedRunner::new().fail("Missing/wrong number of arguments.");
        let inv = Invocation::new(&runner, None);
        let err = revert(&inv, RevertArgs::default()).await.unwrap_err();
        assert!(err.to_string().contains("Missing/wrong number of arguments."));
        assert_eq!(runner.argvs(), vec![argv(&["revert"])]);
    }

    #[tokio::test]
    async fn sync_force_flag_precedes_files() {
        let runner = ScriptedRunner::new().reply("//depot/a.txt#3 - updating /ws/a.txt\n", "");
        let inv = Invocation::new(&runner, None);
        let text = sync(
            &inv,
            SyncArgs {
                files: Some(files(&["//depot/..."])),
                force: true,
            },
        )
        .await
        .unwrap();
        assert!(text.contains("updating"));
        assert_eq!(runner.argvs(), vec![argv(&["sync", "-f", "//depot/..."])]);
    }

    #[tokio::test]
    async fn diff_reports_no_differences() {
        let runner = ScriptedRunner::new().reply("", "");
        let inv = Invocation::new(&runner, None);
        let text = diff(&inv, FilesArgs { files: files(&["a.txt"]) }).await.unwrap();
        assert_eq!(text, "No differences found");
    }
}
