use log::{debug, warn};
use nix::sys::signal::{signal, SigHandler, Signal};

// 交互式 shell 自己不响应这些信号，交给前台进程组处理
const JOB_CONTROL_SIGNALS: [Signal; 5] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGTSTP,
    Signal::SIGTTIN,
    Signal::SIGTTOU,
];

fn set_all(handler: SigHandler) -> nix::Result<()> {
    for sig in JOB_CONTROL_SIGNALS {
        // SAFETY: 只安装 SigIgn / SigDfl，不运行 Rust 处理函数
        unsafe { signal(sig, handler) }?;
    }
    Ok(())
}

// 交互式 shell 忽略 Ctrl-C / Ctrl-Z，并能从后台进程组收回终端而不被停止
pub fn ignore_job_control_signals() {
    match set_all(SigHandler::SigIgn) {
        Ok(()) => debug!("已忽略作业控制信号"),
        Err(e) => warn!("无法忽略作业控制信号: {}", e),
    }
}

// 子进程 exec 前调用：被忽略的信号会跨 exec 保留。
// Rust 运行时在 main 之前忽略了 SIGPIPE，这里一并恢复
pub fn restore_default_signals() {
    let _ = set_all(SigHandler::SigDfl);
    // SAFETY: SigDfl 不会运行任何 Rust 处理函数
    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };
}
