use std::env;
use std::path::{Path, PathBuf};

use sysinfo::System;

const SHELL_NAME: &str = "shellax";

/// `user@host:cwd shellax$ `
pub fn render() -> String {
    let user = env::var("USER").unwrap_or_default();
    let host = System::host_name().unwrap_or_default();
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let path_str = match dirs::home_dir() {
        Some(home) => abbreviate_home(&cwd, &home),
        None => cwd.display().to_string(),
    };
    format!("{}@{}:{} {}$ ", user, host, path_str, SHELL_NAME)
}

pub fn abbreviate_home(cwd: &Path, home: &Path) -> String {
    match cwd.strip_prefix(home) {
        Ok(relative) if relative.as_os_str().is_empty() => "~".to_string(),
        Ok(relative) => format!("~/{}", relative.display()),
        Err(_) => cwd.display().to_string(),
    }
}
