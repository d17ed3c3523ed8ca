use log::{debug, error, warn};
use nix::unistd::getpid;
use std::error::Error;

use crate::shell::executor::{ExecError, Executor};
use crate::shell::parser::Parser;
use crate::shell::readline::{LineSource, ReadlineError};
use crate::shell::signals;
use crate::utils::config::Config;
use crate::utils::path;
use crate::utils::theme::Theme;

pub struct Shell<'a> {
    theme: Theme,
    input: LineSource<'a>,
    executor: Executor,
    quiet: bool,
}

impl<'a> Shell<'a> {
    pub fn new(config: &Config, input: LineSource<'a>, quiet: bool) -> Self {
        let interactive = input.is_interactive();
        Self {
            theme: Theme::load_theme(&config.theme),
            input,
            executor: Executor::new(config.job_control && interactive),
            quiet,
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        debug!("初始化 pipesh...");

        if self.input.is_interactive() {
            // 忽略 shell block 信号，如 Ctrl-C, Ctrl-Z 等
            signals::ignore_job_control_signals();
            if !self.quiet {
                println!(
                    "{}",
                    (self.theme.success_style)(self.theme.get_message("welcome"))
                );
            }
        }
        debug!("pipesh 准备就绪...");

        let result = self.run_loop();
        self.input.close();

        debug!("退出 pipesh...");
        result
    }

    fn prompt(&self) -> String {
        if self.quiet {
            return String::new();
        }
        let prompt = format!("pipesh[{}] {}$ ", getpid(), path::current_dir());
        if self.input.is_interactive() {
            (self.theme.prompt_style)(prompt)
        } else {
            prompt
        }
    }

    fn run_loop(&mut self) -> Result<(), Box<dyn Error>> {
        loop {
            let prompt = self.prompt();
            match self.input.next_line(&prompt) {
                Ok(Some(line)) => {
                    if line.trim() == "exit" {
                        if self.input.is_interactive() && !self.quiet {
                            println!(
                                "{}",
                                (self.theme.success_style)(self.theme.get_message("exit"))
                            );
                        }
                        break;
                    }
                    self.handle_input(&line)?;
                }
                Ok(None) => {
                    debug!("输入结束");
                    if self.input.is_interactive() && !self.quiet {
                        println!(
                            "\n{}",
                            (self.theme.warning_style)(self.theme.get_message("eof_signal"))
                        );
                    }
                    break;
                }
                Err(ReadlineError::Interrupted) => {
                    warn!("接收到中断信号...");
                    println!(
                        "{}",
                        (self.theme.warning_style)(self.theme.get_message("interrupt_signal"))
                    );
                }
                Err(err) => {
                    error!("发生错误: {}", err);
                    return Err(err.into());
                }
            }

            // 回收已结束的后台任务和管道中间进程
            let reaped = self.executor.reap();
            if reaped > 0 {
                debug!("回收了 {} 个子进程", reaped);
            }
        }
        Ok(())
    }

    fn handle_input(&mut self, line: &str) -> Result<(), Box<dyn Error>> {
        let command_line = match Parser::new(line).parse() {
            Ok(Some(command_line)) => command_line,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!("解析失败: {}: {}", line.trim(), e);
                eprintln!(
                    "{} {}: {}",
                    (self.theme.error_style)(self.theme.get_message("error_symbol")),
                    (self.theme.error_style)(self.theme.get_message("parse_error")),
                    e
                );
                return Ok(());
            }
        };

        debug!("执行命令: {}", line.trim());
        match self.executor.execute(command_line) {
            Ok(()) => Ok(()),
            Err(e @ ExecError::LostChild(_)) => {
                error!("内部错误: {}", e);
                Err(e.into())
            }
            Err(e) => {
                error!("执行失败: {}", e);
                eprintln!(
                    "{} {}: {}",
                    (self.theme.error_style)(self.theme.get_message("error_symbol")),
                    (self.theme.error_style)(self.theme.get_message("execution_error")),
                    e
                );
                Ok(())
            }
        }
    }
}
