//! Platform-specific shell detection.

/// Shell used to run playback commands.
///
/// `BITE_SHELL` takes precedence over the platform default so scripts can be
/// pinned to a known shell.
pub fn detect_shell() -> String {
    if let Ok(shell) = std::env::var("BITE_SHELL") {
        if !shell.trim().is_empty() {
            return shell;
        }
    }

    if cfg!(target_os = "windows") {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    } else {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}

/// Flag that makes `shell` run its next argument as a command.
pub fn shell_flag(shell: &str) -> &'static str {
    let file = shell.rsplit(['/', '\\']).next().unwrap_or(shell).to_lowercase();
    let name = file.strip_suffix(".exe").unwrap_or(&file);

    match name {
        "cmd" => "/C",
        "powershell" | "pwsh" => "-Command",
        _ => "-c",
    }
}

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}
