use std::env;
use std::path::Path;

use log::error;

pub fn contract_home(path: &str, home: Option<&str>) -> String {
    match home {
        Some(home) if !home.is_empty() && home != "/" => {
            match Path::new(path).strip_prefix(home) {
                Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
                Ok(rest) => format!("~/{}", rest.display()),
                Err(_) => path.to_string(),
            }
        }
        _ => path.to_string(),
    }
}

pub fn current_dir() -> String {
    let _current_dir = match env::current_dir() {
        Ok(x) => x,
        Err(e) => {
            error!("pipesh: PROMPT: env current_dir error: {}", e);
            return String::new();
        }
    };
    let current_dir = match _current_dir.to_str() {
        Some(x) => x,
        None => {
            error!("pipesh: PROMPT: to_str error");
            return String::new();
        }
    };

    contract_home(current_dir, env::var("HOME").ok().as_deref())
}
