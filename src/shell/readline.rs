use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::utils::config::Config;
use log::{debug, error, warn};
pub use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;
use rustyline::{CompletionType, Config as RLConfig};

pub struct ReadlineManager<'a> {
    config: &'a Config,
    editor: Editor<(), FileHistory>,
}

impl<'a> ReadlineManager<'a> {
    pub fn new(config: &'a Config) -> Result<Self, ReadlineError> {
        let rl_config = RLConfig::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(config.get_edit_mode())
            .build();

        let editor = Editor::with_config(rl_config)?;
        Ok(Self { config, editor })
    }

    pub fn load_history(&mut self) {
        if let Err(err) = self.editor.load_history(&self.config.history_file) {
            warn!(
                "无法加载历史记录: {} {}",
                self.config.history_file.display(),
                err
            );
        } else {
            debug!("历史记录加载成功");
        }
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        self.editor.readline(prompt)
    }

    pub fn add_history(&mut self, line: &str) -> Result<bool, ReadlineError> {
        self.editor.add_history_entry(line)
    }

    pub fn save_history(&mut self) {
        if let Err(err) = self.editor.save_history(&self.config.history_file) {
            error!("保存历史记录失败: {}", err);
        } else {
            debug!("历史记录保存成功");
        }
    }
}

// 交互模式用行编辑器，脚本和管道输入直接按行读取
pub enum LineSource<'a> {
    Interactive(ReadlineManager<'a>),
    Script(Box<dyn BufRead>),
}

impl<'a> LineSource<'a> {
    pub fn interactive(config: &'a Config) -> Result<Self, ReadlineError> {
        let mut readline = ReadlineManager::new(config)?;
        readline.load_history();
        Ok(LineSource::Interactive(readline))
    }

    pub fn script(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(LineSource::Script(Box::new(BufReader::new(file))))
    }

    pub fn stdin() -> Self {
        LineSource::Script(Box::new(BufReader::new(io::stdin())))
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, LineSource::Interactive(_))
    }

    pub fn next_line(&mut self, prompt: &str) -> Result<Option<String>, ReadlineError> {
        match self {
            LineSource::Interactive(readline) => match readline.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        readline.add_history(&line)?;
                    }
                    Ok(Some(line))
                }
                Err(ReadlineError::Eof) => Ok(None),
                Err(err) => Err(err),
            },
            LineSource::Script(reader) => {
                if !prompt.is_empty() {
                    print!("{}", prompt);
                    io::stdout().flush()?;
                }
                let mut line = String::new();
                loop {
                    match reader.read_line(&mut line) {
                        Ok(0) => return Ok(None),
                        Ok(_) => return Ok(Some(line)),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(ReadlineError::Io(e)),
                    }
                }
            }
        }
    }

    pub fn close(&mut self) {
        if let LineSource::Interactive(readline) = self {
            readline.save_history();
        }
    }
}
