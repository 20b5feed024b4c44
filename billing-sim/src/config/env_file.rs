use service_core::error::AppError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Set `key=value` in a dotenv file, replacing an existing assignment of the
/// same key and leaving every other line untouched. Creates the file if needed.
pub fn upsert_env_var(path: &Path, key: &str, value: &str) -> Result<(), AppError> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let assignment = format!("{}={}", key, value);
    let mut replaced = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            if assigns(line, key) {
                replaced = true;
                assignment.clone()
            } else {
                line.to_string()
            }
        })
        .collect();

    if !replaced {
        lines.push(assignment);
    }

    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(path, content)?;

    tracing::info!(path = %path.display(), key, "Env file updated");
    Ok(())
}

fn assigns(line: &str, key: &str) -> bool {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").unwrap_or(line);
    line.split_once('=')
        .map(|(name, _)| name.trim() == key)
        .unwrap_or(false)
}
