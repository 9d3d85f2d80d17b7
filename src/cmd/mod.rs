/*!
CLI subcommands besides `serve`.

  src/cmd/
    mod.rs     (this file)
    tools.rs   (ToolsArgs + execute_tools)  catalog listing / single tool detail
    call.rs    (CallArgs  + execute_call)   one tool call through the dispatcher
    shared.rs  parameter parsing, param files, schema-typed coercion
    format.rs  color / table helpers for human output

Each subcommand module exposes one public `execute_*` function returning
`anyhow::Result<()>`; argument structs derive `clap::Args`.
*/

pub mod call;
pub mod format;
pub mod shared;
pub mod tools;

pub use call::{CallArgs, execute_call};
pub use tools::{ToolsArgs, execute_tools};
