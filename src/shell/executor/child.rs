// 只在 fork 出的子进程中使用：失败时写一行 stderr 后 `_exit`，
// 不刷新从父进程继承的 stdio 缓冲

use std::io;

pub const EXIT_REDIRECT_FAILED: i32 = 1;
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
pub const EXIT_NOT_FOUND: i32 = 127;

pub fn exit_immediately(code: i32) -> ! {
    // SAFETY: `_exit` 没有前置条件且不会返回
    unsafe { libc::_exit(code) }
}

// fork 之后不能碰 std 的锁，直接写 fd 2
pub fn report(message: &str) {
    let _ = nix::unistd::write(io::stderr(), message.as_bytes());
}

pub fn fail(message: &str, code: i32) -> ! {
    report(message);
    exit_immediately(code)
}
