use nix::unistd::Pid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),

    #[error("pipe failed: {0}")]
    Pipe(#[source] nix::Error),

    #[error("cannot rebind standard input: {0}")]
    Stdin(#[source] nix::Error),

    #[error("waitpid({pid}) failed: {source}")]
    Wait { pid: Pid, source: nix::Error },

    // 内核认为 pid 不是我们的子进程，记账已经出错
    #[error("lost track of child process {0}")]
    LostChild(Pid),

    #[error("argument contains a NUL byte: {0:?}")]
    NulInArgument(String),

    #[error("command has no arguments")]
    EmptyCommand,

    #[error("command was never launched")]
    NotLaunched,
}
