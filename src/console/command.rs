use crate::state::RuntimeConfig;
use thiserror::Error;
use tracing::info;

pub const HELP_TEXT: &str = "commands: RAIN:<0-100> set rain probability %, THRESH:<0-100> set rain alert threshold %, SHOW print current values, HELP this list";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Show,
    SetRain(u8),
    SetThresh(u8),
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{keyword} value out of range: {value} (expected 0-100)")]
    OutOfRange { keyword: &'static str, value: i64 },
    #[error("{keyword} value is not an integer: '{raw}'")]
    Malformed { keyword: &'static str, raw: String },
}

/// Parse one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.eq_ignore_ascii_case("HELP") {
        return Ok(Some(Command::Help));
    }
    if trimmed.eq_ignore_ascii_case("SHOW") {
        return Ok(Some(Command::Show));
    }

    if let Some((keyword, value)) = trimmed.split_once(':') {
        let keyword = keyword.trim();
        if keyword.eq_ignore_ascii_case("RAIN") {
            return parse_percent("RAIN", value).map(|v| Some(Command::SetRain(v)));
        }
        if keyword.eq_ignore_ascii_case("THRESH") {
            return parse_percent("THRESH", value).map(|v| Some(Command::SetThresh(v)));
        }
    }

    Ok(Some(Command::Unknown(trimmed.to_string())))
}

fn parse_percent(keyword: &'static str, raw: &str) -> Result<u8, CommandError> {
    let raw = raw.trim();
    let value: i64 = raw.parse().map_err(|_| CommandError::Malformed {
        keyword,
        raw: raw.to_string(),
    })?;
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or(CommandError::OutOfRange { keyword, value })
}

/// Apply a parsed command and return the single reply line for the console.
pub fn apply_command(command: &Command, runtime: &mut RuntimeConfig) -> String {
    match command {
        Command::Help => HELP_TEXT.to_string(),
        Command::Show => format!(
            "rain_probability={}% rain_threshold={}%",
            runtime.rain_probability_percent, runtime.rain_alert_threshold_percent
        ),
        Command::SetRain(value) => {
            runtime.rain_probability_percent = *value;
            info!(rain_probability = *value, "Rain probability updated");
            format!("ok: rain probability set to {value}%")
        }
        Command::SetThresh(value) => {
            runtime.rain_alert_threshold_percent = *value;
            info!(rain_threshold = *value, "Rain alert threshold updated");
            format!("ok: rain alert threshold set to {value}%")
        }
        Command::Unknown(text) => {
            format!("unknown command: '{text}' (type HELP for the list of commands)")
        }
    }
}

/// Parse and apply one line. Returns `None` for blank input.
pub fn handle_line(line: &str, runtime: &mut RuntimeConfig) -> Option<String> {
    match parse_command(line) {
        Ok(Some(command)) => Some(apply_command(&command, runtime)),
        Ok(None) => None,
        Err(err) => Some(format!("error: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive_and_trimmed() {
        assert_eq!(parse_command("  help \r"), Ok(Some(Command::Help)));
        assert_eq!(parse_command("Show"), Ok(Some(Command::Show)));
        assert_eq!(parse_command("rain: 40"), Ok(Some(Command::SetRain(40))));
        assert_eq!(parse_command("Thresh:75"), Ok(Some(Command::SetThresh(75))));
    }

    #[test]
    fn blank_lines_are_ignored() {
        let mut runtime = RuntimeConfig::default();

        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(handle_line("", &mut runtime), None);
    }

    #[test]
    fn rain_bounds_are_inclusive() -> Result<(), CommandError> {
        let mut runtime = RuntimeConfig::default();

        for (line, expected) in [("RAIN:100", 100), ("RAIN:0", 0)] {
            let command = parse_command(line)?.expect("command present");
            apply_command(&command, &mut runtime);
            assert_eq!(runtime.rain_probability_percent, expected);
        }
        Ok(())
    }

    #[test]
    fn out_of_range_rain_is_rejected_without_mutation() {
        let mut runtime = RuntimeConfig {
            rain_probability_percent: 42,
            ..RuntimeConfig::default()
        };

        for line in ["RAIN:101", "RAIN:-1"] {
            let reply = handle_line(line, &mut runtime).expect("reply");
            assert!(reply.starts_with("error:"), "{reply}");
            assert!(reply.contains("out of range"), "{reply}");
        }
        assert_eq!(runtime.rain_probability_percent, 42);
    }

    #[test]
    fn threshold_bounds_are_inclusive_and_enforced() -> Result<(), CommandError> {
        let mut runtime = RuntimeConfig::default();

        for (line, expected) in [("THRESH:100", 100), ("THRESH:0", 0)] {
            let command = parse_command(line)?.expect("command present");
            apply_command(&command, &mut runtime);
            assert_eq!(runtime.rain_alert_threshold_percent, expected);
        }

        for line in ["THRESH:101", "THRESH:-1"] {
            let reply = handle_line(line, &mut runtime).expect("reply");
            assert!(reply.starts_with("error:"), "{reply}");
            assert!(reply.contains("out of range"), "{reply}");
        }
        assert_eq!(runtime.rain_alert_threshold_percent, 0);
        Ok(())
    }

    #[test]
    fn malformed_threshold_is_rejected_without_mutation() {
        let mut runtime = RuntimeConfig::default();

        let reply = handle_line("THRESH:abc", &mut runtime).expect("reply");

        assert_eq!(
            parse_command("THRESH:abc"),
            Err(CommandError::Malformed {
                keyword: "THRESH",
                raw: "abc".to_string(),
            })
        );
        assert!(reply.starts_with("error:"));
        assert_eq!(runtime, RuntimeConfig::default());
    }

    #[test]
    fn empty_value_is_malformed() {
        assert!(matches!(
            parse_command("RAIN:"),
            Err(CommandError::Malformed { .. })
        ));
    }

    #[test]
    fn successful_update_echoes_value() {
        let mut runtime = RuntimeConfig::default();

        let reply = handle_line("THRESH:35", &mut runtime).expect("reply");

        assert_eq!(runtime.rain_alert_threshold_percent, 35);
        assert!(reply.contains("35%"));
    }

    #[test]
    fn show_reports_both_values() {
        let mut runtime = RuntimeConfig {
            rain_probability_percent: 20,
            rain_alert_threshold_percent: 70,
        };

        let reply = handle_line("SHOW", &mut runtime).expect("reply");

        assert_eq!(reply, "rain_probability=20% rain_threshold=70%");
    }

    #[test]
    fn help_lists_every_command() {
        let mut runtime = RuntimeConfig::default();

        let reply = handle_line("HELP", &mut runtime).expect("reply");

        for keyword in ["RAIN:", "THRESH:", "SHOW", "HELP"] {
            assert!(reply.contains(keyword));
        }
    }

    #[test]
    fn unrecognised_text_hints_at_help() {
        let mut runtime = RuntimeConfig::default();

        assert_eq!(
            parse_command("PUMP:ON"),
            Ok(Some(Command::Unknown("PUMP:ON".to_string())))
        );
        let reply = handle_line("water now", &mut runtime).expect("reply");
        assert!(reply.starts_with("unknown command"));
        assert!(reply.contains("HELP"));
    }
}
