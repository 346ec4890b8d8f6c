//! Doctor command - verify configuration and local state.

use crate::cli::Output;
use crate::config::Settings;
use crate::vocabulary::WordDatabase;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Language Learning Doctor");
    println!();
    println!("Checking configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let config_checks = check_required(settings);
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    println!("{}", style("Local State").bold());
    let state_checks = vec![check_cache(settings), check_output_dir(settings)];
    for check in &state_checks {
        check.print();
    }
    checks.extend(state_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before running a lesson.",
            errors
        ));
    } else if warnings > 0 {
        Output::warning(&format!("{} warning(s). Lessons should still work.", warnings));
    } else {
        Output::success("Everything looks good!");
    }

    Ok(())
}

/// One check per required setting.
fn check_required(settings: &Settings) -> Vec<CheckResult> {
    let missing = settings.missing_required();
    let required = [
        ("lingq.api_key", "LL_LINGQ_API_KEY"),
        ("openai.api_key", "LL_OPENAI_API_KEY"),
        ("openai.chat_model", "LL_OPENAI_CHAT_MODEL"),
        ("tts.api_key", "LL_TTS_API_KEY"),
    ];

    required
        .iter()
        .map(|(key, env)| {
            if missing.contains(key) {
                CheckResult::error(
                    key,
                    "not set",
                    &format!("Set it in the config file or export {}", env),
                )
            } else {
                CheckResult::ok(key, "set")
            }
        })
        .collect()
}

/// Report whether the vocabulary cache exists and is fresh.
fn check_cache(settings: &Settings) -> CheckResult {
    let path = settings.database_path();
    let cache = WordDatabase::new(&path);
    let max_age = match settings.cache_max_age() {
        Ok(max_age) => max_age,
        Err(e) => {
            return CheckResult::error(
                "Vocabulary cache",
                &e.to_string(),
                "Set lingq.cache_ttl_minutes to a reasonable number of minutes",
            )
        }
    };

    match cache.fetch_if_fresh(max_age) {
        Ok(Some(words)) => CheckResult::ok(
            "Vocabulary cache",
            &format!("fresh, {} words ({})", words.len(), path.display()),
        ),
        Ok(None) => CheckResult::ok(
            "Vocabulary cache",
            &format!("missing or stale, will refetch ({})", path.display()),
        ),
        Err(e) => CheckResult::warning(
            "Vocabulary cache",
            &e.to_string(),
            &format!("Delete {} to rebuild it", path.display()),
        ),
    }
}

/// Report whether the output directory exists or can be created.
fn check_output_dir(settings: &Settings) -> CheckResult {
    let dir = settings.output_dir();
    if dir.is_dir() {
        CheckResult::ok("Output directory", &dir.display().to_string())
    } else if dir.exists() {
        CheckResult::error(
            "Output directory",
            &format!("{} is not a directory", dir.display()),
            "Set general.output_dir to a directory",
        )
    } else {
        CheckResult::warning(
            "Output directory",
            &format!("{} does not exist", dir.display()),
            "It will be created on the next run",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_checks_flag_missing_keys() {
        let mut settings = Settings::default();
        settings.openai.chat_model = Some("gpt-4o".to_string());

        let checks = check_required(&settings);
        assert_eq!(checks.len(), 4);
        let by_name = |name: &str| checks.iter().find(|c| c.name == name).unwrap();
        assert_eq!(by_name("openai.chat_model").status, CheckStatus::Ok);
        assert_eq!(by_name("lingq.api_key").status, CheckStatus::Error);
    }

    #[test]
    fn test_cache_check_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.lingq.database_path = dir.path().join("none.json").to_string_lossy().to_string();

        assert_eq!(check_cache(&settings).status, CheckStatus::Ok);
    }

    #[test]
    fn test_cache_check_rejects_out_of_range_ttl() {
        let mut settings = Settings::default();
        settings.lingq.cache_ttl_minutes = i64::MAX;

        assert_eq!(check_cache(&settings).status, CheckStatus::Error);
    }

    #[test]
    fn test_output_dir_check() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.general.output_dir = dir.path().to_string_lossy().to_string();
        assert_eq!(check_output_dir(&settings).status, CheckStatus::Ok);

        settings.general.output_dir = dir.path().join("later").to_string_lossy().to_string();
        assert_eq!(check_output_dir(&settings).status, CheckStatus::Warning);
    }
}
