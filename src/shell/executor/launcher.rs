use std::ffi::CString;
use std::os::unix::io::AsRawFd;

use log::debug;
use nix::errno::Errno;
use nix::unistd::{dup2, execvp, fork, pipe, ForkResult, Pid};

use super::builtin::Builtin;
use super::error::ExecError;
use super::{child, redirect, terminal};
use crate::shell::command::{CommandLine, ControlOp, NodeId};
use crate::shell::signals;

fn to_argv(arguments: &[String]) -> Result<Vec<CString>, ExecError> {
    if arguments.is_empty() {
        return Err(ExecError::EmptyCommand);
    }
    arguments
        .iter()
        .map(|arg| CString::new(arg.as_str()).map_err(|_| ExecError::NulInArgument(arg.clone())))
        .collect()
}

fn exec(argv: &[CString]) -> ! {
    let err = match execvp(&argv[0], argv) {
        Err(e) => e,
        Ok(never) => match never {},
    };
    let program = argv[0].to_string_lossy();
    match err {
        Errno::ENOENT => child::fail(
            &format!("{}: command not found\n", program),
            child::EXIT_NOT_FOUND,
        ),
        e => child::fail(
            &format!("{}: {}\n", program, e.desc()),
            child::EXIT_NOT_EXECUTABLE,
        ),
    }
}

// 后接 `|` 的节点创建新管道：子进程写入，当前进程把读端放到自己的 stdin，
// 下一个阶段直接继承。重定向在管道之后应用，优先级更高
pub fn launch(line: &mut CommandLine, id: NodeId, pgid: Pid) -> Result<Pid, ExecError> {
    let node = line.node(id);
    let argv = to_argv(&node.arguments)?;
    let builtin = Builtin::lookup(node);
    let pipe = if node.op == ControlOp::Pipe {
        Some(pipe().map_err(ExecError::Pipe)?)
    } else {
        None
    };

    // SAFETY: 子进程只重接描述符，随后 exec 或 `_exit`
    match unsafe { fork() }.map_err(ExecError::Fork)? {
        ForkResult::Child => {
            terminal::join_group(Pid::from_raw(0), pgid);
            signals::restore_default_signals();

            if let Some((read, write)) = pipe {
                if let Err(e) = dup2(write.as_raw_fd(), libc::STDOUT_FILENO) {
                    child::fail(&format!("pipe: {}\n", e.desc()), 1);
                }
                drop(read);
                drop(write);
            }

            redirect::apply(&node.redirections);

            if builtin.is_some() {
                // 内建命令已在 shell 进程中执行过
                child::exit_immediately(0);
            }
            exec(&argv)
        }
        ForkResult::Parent { child } => {
            if let Some((read, write)) = pipe {
                drop(write);
                dup2(read.as_raw_fd(), libc::STDIN_FILENO).map_err(ExecError::Stdin)?;
            }
            terminal::join_group(child, pgid);

            let node = line.node_mut(id);
            node.pid = Some(child);
            debug!("启动进程 {} (pgid {}): {}", child, pgid, node);
            Ok(child)
        }
    }
}
