use std::io::{self, IsTerminal};
use std::os::unix::io::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use log::{debug, warn};
use nix::fcntl::{fcntl, FcntlArg};
use nix::unistd::{dup2, getpgrp, getpid, setpgid, tcsetpgrp, Pid};

use super::error::ExecError;

#[derive(Debug, Clone, Copy)]
pub struct Groups {
    // 终端最终总是交还给这个进程组
    pub list: Pid,
    pub job_control: bool,
}

impl Groups {
    pub fn establish(job_control: bool) -> Self {
        let job_control = job_control && io::stdin().is_terminal();
        if !job_control {
            return Self {
                list: getpgrp(),
                job_control,
            };
        }

        let list = lead_own_group();
        if let Err(e) = tcsetpgrp(io::stdin(), list) {
            warn!("无法将终端交给进程组 {}: {}", list, e);
        }
        Self { list, job_control }
    }

    // 条件进程被杀死时 Foreground 不会析构，由列表进程收回终端
    pub fn reclaim(&self) {
        if !self.job_control {
            return;
        }
        if let Err(e) = tcsetpgrp(io::stdin(), self.list) {
            warn!("无法收回终端: {}", e);
        }
    }

    // 后台条件链不接管终端
    pub fn detached(self) -> Self {
        Self {
            job_control: false,
            ..self
        }
    }
}

// 会话首进程无法移动，保留当前进程组
pub fn lead_own_group() -> Pid {
    if let Err(e) = setpgid(Pid::from_raw(0), Pid::from_raw(0)) {
        debug!("setpgid(0, 0) 失败: {}", e);
        return getpgrp();
    }
    getpid()
}

// 父子进程都会调用，与子进程 exec 竞争失败无妨
pub fn join_group(pid: Pid, pgid: Pid) {
    if let Err(e) = setpgid(pid, pgid) {
        debug!("setpgid({}, {}) 失败: {}", pid, pgid, e);
    }
}

// 析构时把终端交还给列表进程组
pub struct Foreground {
    restore_to: Option<Pid>,
}

impl Foreground {
    pub fn claim(pgid: Pid, groups: &Groups) -> Self {
        if !groups.job_control {
            return Self { restore_to: None };
        }
        match tcsetpgrp(io::stdin(), pgid) {
            Ok(()) => Self {
                restore_to: Some(groups.list),
            },
            Err(e) => {
                debug!("tcsetpgrp({}) 失败: {}", pgid, e);
                Self { restore_to: None }
            }
        }
    }
}

impl Drop for Foreground {
    fn drop(&mut self) {
        if let Some(list) = self.restore_to.take() {
            if let Err(e) = tcsetpgrp(io::stdin(), list) {
                warn!("无法收回终端: {}", e);
            }
        }
    }
}

pub struct SavedStdin {
    saved: OwnedFd,
}

impl SavedStdin {
    pub fn save() -> Result<Self, ExecError> {
        let fd: RawFd = fcntl(libc::STDIN_FILENO, FcntlArg::F_DUPFD_CLOEXEC(3))
            .map_err(ExecError::Stdin)?;
        // SAFETY: fd 刚由 fcntl 返回，没有其他所有者
        let saved = unsafe { OwnedFd::from_raw_fd(fd) };
        Ok(Self { saved })
    }
}

impl Drop for SavedStdin {
    fn drop(&mut self) {
        if let Err(e) = dup2(self.saved.as_raw_fd(), libc::STDIN_FILENO) {
            warn!("无法恢复标准输入: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_without_job_control_stay_put() {
        let before = getpgrp();
        let groups = Groups::establish(false);
        assert_eq!(groups.list, before);
        assert!(!groups.job_control);
        groups.reclaim();
        assert_eq!(getpgrp(), before);
        assert!(!groups.detached().job_control);
    }
}
