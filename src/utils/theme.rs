use std::collections::HashMap;

use colored::Colorize;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;

type Style = Box<dyn Fn(String) -> String>;

static MESSAGES: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        (
            "welcome",
            vec![
                "pipesh ready. Pipes, && and ||, ; and & are all yours.",
                "pipesh started. Type `exit` to leave.",
            ],
        ),
        ("exit", vec!["bye.", "see you."]),
        ("eof_signal", vec!["EOF, leaving."]),
        ("interrupt_signal", vec!["interrupted."]),
        ("error_symbol", vec!["✗"]),
        ("parse_error", vec!["cannot parse that line", "syntax error"]),
        ("execution_error", vec!["execution failed"]),
    ])
});

pub struct Theme {
    pub error_style: Style,
    pub warning_style: Style,
    pub success_style: Style,
    pub prompt_style: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            error_style: Box::new(|s| s.bright_red().to_string()),
            warning_style: Box::new(|s| s.yellow().to_string()),
            success_style: Box::new(|s| s.bright_magenta().to_string()),
            prompt_style: Box::new(|s| s.bright_cyan().to_string()),
        }
    }
}

impl Theme {
    pub fn load_theme(theme_name: &str) -> Theme {
        match theme_name {
            "dark" => Theme {
                error_style: Box::new(|s| s.red().to_string()),
                warning_style: Box::new(|s| s.bright_yellow().to_string()),
                success_style: Box::new(|s| s.magenta().to_string()),
                prompt_style: Box::new(|s| s.bright_purple().to_string()),
            },
            "plain" => Theme {
                error_style: Box::new(|s| s),
                warning_style: Box::new(|s| s),
                success_style: Box::new(|s| s),
                prompt_style: Box::new(|s| s),
            },
            _ => Theme::default(),
        }
    }

    pub fn get_message(&self, key: &str) -> String {
        MESSAGES
            .get(key)
            .and_then(|variants| variants.choose(&mut rand::thread_rng()))
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}
