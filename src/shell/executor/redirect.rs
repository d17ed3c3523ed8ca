use std::os::unix::io::RawFd;

use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};

use super::child;
use crate::shell::command::{Redirection, StdStream};

fn open_flags(target: StdStream) -> OFlag {
    match target {
        StdStream::Stdin => OFlag::O_RDONLY,
        StdStream::Stdout | StdStream::Stderr => {
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC
        }
    }
}

fn rebind(redirection: &Redirection) -> nix::Result<()> {
    let fd: RawFd = open(
        redirection.filename.as_str(),
        open_flags(redirection.target),
        Mode::from_bits_truncate(0o666),
    )?;
    let target = redirection.target.fd();
    if fd != target {
        dup2(fd, target)?;
        close(fd)?;
    }
    Ok(())
}

// 只在子进程中调用，失败时直接退出子进程
pub fn apply(redirections: &[Redirection]) {
    for redirection in redirections {
        if let Err(e) = rebind(redirection) {
            child::fail(
                &format!("{}: {}\n", redirection.filename, e.desc()),
                child::EXIT_REDIRECT_FAILED,
            );
        }
    }
}
