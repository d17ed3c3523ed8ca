use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

pub struct Config {
    pub name: String,
    pub config_dir: PathBuf,
    pub theme: String,
    pub history_file: PathBuf,
    pub editor_mode: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub log_to_stderr: bool,
    pub job_control: bool,
}

fn env_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/pipesh")
        } else {
            PathBuf::from("tmp")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from(env!("CARGO_PKG_NAME")),
            theme: String::from("default"),
            history_file: config_dir.join(".pipesh_history"),
            editor_mode: String::from("emacs"),
            logger_level: String::from("warn"),
            logger_dir: config_dir.join("logs"),
            log_to_stderr: false,
            job_control: true,
            config_dir,
        }
    }

    pub fn new() -> io::Result<Self> {
        // 优先加载环境变量
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        // 默认配置
        let mut config = Config::default();

        // 从环境变量加载配置
        if let Ok(theme) = env::var("PIPESH_THEME") {
            config.theme = theme;
        }

        if let Ok(editor) = env::var("PIPESH_EDITOR") {
            config.editor_mode = editor;
        }

        if let Ok(history) = env::var("PIPESH_HISTORY") {
            config.history_file = PathBuf::from(history);
        }

        if let Ok(level) = env::var("PIPESH_LOG_LEVEL") {
            config.logger_level = level;
        }

        if let Ok(dir) = env::var("PIPESH_LOG_DIR") {
            config.logger_dir = PathBuf::from(dir);
        }

        if let Some(flag) = env_flag("PIPESH_LOG_STDERR") {
            config.log_to_stderr = flag;
        }

        if let Some(flag) = env_flag("PIPESH_JOB_CONTROL") {
            config.job_control = flag;
        }

        // 确保历史文件目录存在
        if let Some(parent) = config.history_file.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}
