mod builtin;
mod child;
mod conditional;
mod error;
mod launcher;
mod list;
mod pipeline;
mod redirect;
mod terminal;
mod wait;

use log::debug;

use crate::shell::command::CommandLine;

pub use error::ExecError;
pub use wait::Outcome;

pub struct Executor {
    job_control: bool,
}

impl Executor {
    // job_control 只在 stdin 是终端时生效
    pub fn new(job_control: bool) -> Self {
        Self { job_control }
    }

    pub fn execute(&self, mut line: CommandLine) -> Result<(), ExecError> {
        debug!("执行命令行: {} 个节点", line.len());
        list::run_list(&mut line, self.job_control)
    }

    pub fn reap(&self) -> usize {
        wait::reap_zombies()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::shell::parser::Parser;

    // fork、waitpid(-1) 和 chdir 都作用于整个测试进程，必须串行
    static PROCESS_LOCK: Mutex<()> = Mutex::new(());

    #[allow(clippy::unwrap_used)]
    fn run(input: &str) {
        let line = Parser::new(input).parse().unwrap().unwrap();
        Executor::new(false).execute(line).unwrap();
    }

    #[allow(clippy::unwrap_used)]
    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[allow(clippy::unwrap_used)]
    fn tempdir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn p(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).display().to_string()
    }

    #[test]
    fn test_single_command_with_output_redirect() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!("echo hello > {}", p(&dir, "out")));
        assert_eq!(read(&dir.path().join("out")), "hello\n");
    }

    #[test]
    fn test_output_redirect_truncates() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        let out = p(&dir, "out");
        fs::write(&out, "a much longer previous content\n").unwrap_or_default();
        run(&format!("echo short > {}", out));
        assert_eq!(read(&dir.path().join("out")), "short\n");
    }

    #[test]
    fn test_pipeline_connects_stages() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!(
            "printf 'b\\na\\nc\\n' | sort | tr a-z A-Z > {}",
            p(&dir, "out")
        ));
        assert_eq!(read(&dir.path().join("out")), "A\nB\nC\n");
    }

    #[test]
    fn test_pipeline_status_is_last_stage() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!("false | true && echo ran > {}", p(&dir, "a")));
        run(&format!("true | false && echo ran > {}", p(&dir, "b")));
        assert!(dir.path().join("a").exists());
        assert!(!dir.path().join("b").exists());
    }

    #[test]
    fn test_explicit_redirect_overrides_pipe() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!(
            "echo direct > {} | cat > {}",
            p(&dir, "direct"),
            p(&dir, "piped")
        ));
        assert_eq!(read(&dir.path().join("direct")), "direct\n");
        assert_eq!(read(&dir.path().join("piped")), "");
    }

    #[test]
    fn test_input_and_stderr_redirects() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        let input = p(&dir, "in");
        fs::write(&input, "from file\n").unwrap_or_default();
        run(&format!("cat < {} > {}", input, p(&dir, "out")));
        run(&format!("sh -c 'echo oops 1>&2' 2> {}", p(&dir, "err")));
        assert_eq!(read(&dir.path().join("out")), "from file\n");
        assert_eq!(read(&dir.path().join("err")), "oops\n");
    }

    #[test]
    fn test_later_redirect_for_same_descriptor_wins() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!("echo x > {} > {}", p(&dir, "first"), p(&dir, "second")));
        assert_eq!(read(&dir.path().join("first")), "");
        assert_eq!(read(&dir.path().join("second")), "x\n");
    }

    #[test]
    fn test_missing_input_file_fails_command() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        let missing = p(&dir, "missing");
        run(&format!(
            "echo never < {} > {} || echo failed > {}",
            missing,
            p(&dir, "out"),
            p(&dir, "flag")
        ));
        // echo 没有被执行，也没有创建 out
        assert!(!dir.path().join("out").exists());
        assert_eq!(read(&dir.path().join("flag")), "failed\n");
    }

    #[test]
    fn test_unknown_program_fails() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!(
            "pipesh-no-such-program-xyz && echo no > {} || echo yes > {}",
            p(&dir, "no"),
            p(&dir, "yes")
        ));
        assert!(!dir.path().join("no").exists());
        assert!(dir.path().join("yes").exists());
    }

    #[test]
    fn test_and_short_circuits() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!(
            "false && echo a > {} && echo b > {} ; echo c > {}",
            p(&dir, "a"),
            p(&dir, "b"),
            p(&dir, "c")
        ));
        assert!(!dir.path().join("a").exists());
        assert!(!dir.path().join("b").exists());
        assert!(dir.path().join("c").exists());
    }

    #[test]
    fn test_or_short_circuits() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!(
            "true || echo a > {} || echo b > {} && echo c > {}",
            p(&dir, "a"),
            p(&dir, "b"),
            p(&dir, "c")
        ));
        assert!(!dir.path().join("a").exists());
        assert!(!dir.path().join("b").exists());
        assert!(dir.path().join("c").exists());
    }

    #[test]
    fn test_mixed_links_resume_after_skip() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!(
            "false && echo a > {} || echo b > {}",
            p(&dir, "a"),
            p(&dir, "b")
        ));
        assert!(!dir.path().join("a").exists());
        assert!(dir.path().join("b").exists());
    }

    #[test]
    fn test_skipped_pipeline_is_skipped_whole() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!(
            "false && echo a | cat > {} ; echo done > {}",
            p(&dir, "a"),
            p(&dir, "done")
        ));
        assert!(!dir.path().join("a").exists());
        assert!(dir.path().join("done").exists());
    }

    #[test]
    fn test_sequence_never_short_circuits() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!("false ; echo ok > {}", p(&dir, "ok")));
        assert_eq!(read(&dir.path().join("ok")), "ok\n");
    }

    #[test]
    fn test_killed_stage_counts_as_failure() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!(
            "sh -c 'kill -9 $$' && echo no > {} || echo yes > {}",
            p(&dir, "no"),
            p(&dir, "yes")
        ));
        assert!(!dir.path().join("no").exists());
        assert_eq!(read(&dir.path().join("yes")), "yes\n");
    }

    #[test]
    fn test_producer_dies_of_sigpipe_when_reader_exits() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        let err = p(&dir, "err");
        let code = p(&dir, "code");
        // 测试进程本身忽略 SIGPIPE，子进程必须恢复默认处理
        run(&format!(
            "sh -c 'yes 2> {}; echo $? > {}.tmp; mv {}.tmp {}' | head -n 1 > {}",
            err,
            code,
            code,
            code,
            p(&dir, "out")
        ));
        assert_eq!(read(&dir.path().join("out")), "y\n");

        // 生产者不在等待之列，轮询它写下的退出码
        let started = Instant::now();
        while !dir.path().join("code").exists() && started.elapsed() < Duration::from_secs(10) {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(read(&dir.path().join("code")).trim_end(), "141");
        assert_eq!(read(&dir.path().join("err")), "");
    }

    #[test]
    fn test_pipelines_in_one_conditional_see_original_stdin() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        run(&format!(
            "echo first | cat > {} && echo second > {}",
            p(&dir, "a"),
            p(&dir, "b")
        ));
        assert_eq!(read(&dir.path().join("a")), "first\n");
        assert_eq!(read(&dir.path().join("b")), "second\n");
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_cd_is_visible_to_later_conditionals_and_redirects() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = std::env::current_dir().unwrap();
        let dir = tempdir();
        let target = dir.path().canonicalize().unwrap();

        run(&format!("cd {} ; pwd > here", target.display()));
        let changed = std::env::current_dir().unwrap();
        std::env::set_current_dir(&original).unwrap();

        assert_eq!(changed, target);
        assert_eq!(read(&target.join("here")).trim_end(), target.display().to_string());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_cd_in_conditional_does_not_block_next_link() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = std::env::current_dir().unwrap();
        let dir = tempdir();
        let target = dir.path().canonicalize().unwrap();

        run(&format!("cd {} && pwd > here", target.display()));
        std::env::set_current_dir(&original).unwrap();
        assert!(target.join("here").exists());
    }

    #[allow(clippy::unwrap_used)]
    #[test]
    fn test_failed_cd_is_ignored() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original = std::env::current_dir().unwrap();
        let dir = tempdir();
        run(&format!(
            "cd {} ; echo still > {}",
            p(&dir, "does-not-exist"),
            p(&dir, "out")
        ));
        assert_eq!(std::env::current_dir().unwrap(), original);
        assert!(dir.path().join("out").exists());
    }

    #[test]
    fn test_background_does_not_block_and_is_reaped() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir();
        let started = Instant::now();
        run(&format!("sleep 1 & echo after > {}", p(&dir, "after")));
        assert!(started.elapsed() < Duration::from_millis(900));
        assert!(dir.path().join("after").exists());

        let executor = Executor::new(false);
        let mut reaped = 0;
        while reaped == 0 && started.elapsed() < Duration::from_secs(10) {
            reaped += executor.reap();
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(reaped >= 1);
    }

    #[test]
    fn test_reap_without_children_returns_immediately() {
        let _lock = PROCESS_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let executor = Executor::new(false);
        executor.reap();
        let started = Instant::now();
        assert_eq!(executor.reap(), 0);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
