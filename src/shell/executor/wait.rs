use std::fmt;

use log::{debug, warn};
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::waitpid;
use nix::sys::wait::WaitPidFlag as WF;
use nix::sys::wait::WaitStatus as WS;
use nix::unistd::Pid;

use super::error::ExecError;
use crate::shell::command::ControlOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(i32),
    // 被信号杀死
    Abnormal(Signal),
}

impl Default for Outcome {
    fn default() -> Self {
        Outcome::Failure(1)
    }
}

impl Outcome {
    pub fn success(self) -> bool {
        self == Outcome::Success
    }

    pub fn from_wait_status(status: WS) -> Option<Self> {
        match status {
            WS::Exited(_, 0) => Some(Outcome::Success),
            WS::Exited(_, code) => Some(Outcome::Failure(code)),
            WS::Signaled(_, sig, _core_dumped) => Some(Outcome::Abnormal(sig)),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "exit 0"),
            Outcome::Failure(code) => write!(f, "exit {}", code),
            Outcome::Abnormal(sig) => write!(f, "killed by {}", sig),
        }
    }
}

pub fn short_circuits(op: ControlOp, outcome: Outcome) -> bool {
    match op {
        ControlOp::And => !outcome.success(),
        ControlOp::Or => outcome.success(),
        _ => false,
    }
}

pub fn wait_for(pid: Pid) -> Result<Outcome, ExecError> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(outcome) = Outcome::from_wait_status(status) {
                    debug!("子进程 {} 结束: {}", pid, outcome);
                    return Ok(outcome);
                }
            }
            Err(Errno::EINTR) => continue,
            // 我们只等待自己 fork 出来的进程，ECHILD 意味着记账出错
            Err(Errno::ECHILD) => return Err(ExecError::LostChild(pid)),
            Err(source) => return Err(ExecError::Wait { pid, source }),
        }
    }
}

pub fn reap_zombies() -> usize {
    let mut reaped = 0;
    loop {
        match waitpid(Pid::from_raw(-1), Some(WF::WNOHANG)) {
            Ok(WS::StillAlive) => break,
            Ok(status) => {
                if let Some(pid) = status.pid() {
                    debug!("回收子进程 {}: {:?}", pid, status);
                }
                reaped += 1;
            }
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => break,
            Err(e) => {
                warn!("回收子进程失败: {}", e);
                break;
            }
        }
    }
    reaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_wait_status() {
        let pid = Pid::from_raw(42);
        assert_eq!(
            Outcome::from_wait_status(WS::Exited(pid, 0)),
            Some(Outcome::Success)
        );
        assert_eq!(
            Outcome::from_wait_status(WS::Exited(pid, 3)),
            Some(Outcome::Failure(3))
        );
        assert_eq!(
            Outcome::from_wait_status(WS::Signaled(pid, Signal::SIGKILL, false)),
            Some(Outcome::Abnormal(Signal::SIGKILL))
        );
        assert_eq!(Outcome::from_wait_status(WS::StillAlive), None);
        assert_eq!(Outcome::from_wait_status(WS::Continued(pid)), None);
    }

    #[test]
    fn test_default_outcome_is_failure() {
        assert!(!Outcome::default().success());
    }

    #[test]
    fn test_short_circuit_policy() {
        let killed = Outcome::Abnormal(Signal::SIGTERM);

        assert!(short_circuits(ControlOp::And, Outcome::Failure(1)));
        assert!(short_circuits(ControlOp::And, killed));
        assert!(!short_circuits(ControlOp::And, Outcome::Success));

        assert!(short_circuits(ControlOp::Or, Outcome::Success));
        assert!(!short_circuits(ControlOp::Or, Outcome::Failure(2)));
        assert!(!short_circuits(ControlOp::Or, killed));

        for op in [ControlOp::Sequence, ControlOp::Background, ControlOp::None] {
            assert!(!short_circuits(op, Outcome::Failure(1)));
            assert!(!short_circuits(op, Outcome::Success));
        }
    }
}
