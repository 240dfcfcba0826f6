//! CLI response formatting and output.
//!
//! Reports go to stdout between rulers; failures go out as a JSON envelope.

use std::io::{self, Write};

use aether_sweep::error::Hint;
use aether_sweep::{Error, Result};
use serde::Serialize;

const RULER_WIDTH: usize = 80;

/// Failure envelope. Successful runs print the report itself.
#[derive(Debug, Serialize)]
pub struct CliResponse {
    pub success: bool,
    pub error: CliError,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
}

impl CliResponse {
    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }

    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            error: CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
            },
        }
    }
}

fn write_stdout(payload: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(()); // Exit gracefully on SIGPIPE
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

/// Print a rendered report framed by `=` rulers.
pub fn print_framed(content: &str) -> Result<()> {
    let ruler = "=".repeat(RULER_WIDTH);
    write_stdout(&format!("{}\n{}\n{}", ruler, content.trim_end(), ruler))
}

/// Print the failure envelope. Best effort: a failure here has nowhere to go.
pub fn print_error(err: &Error) {
    match CliResponse::from_error(err).to_json() {
        Ok(payload) => {
            let _ = write_stdout(&payload);
        }
        Err(_) => eprintln!("{}: {}", err.code.as_str(), err.message),
    }
}

/// Every failure maps to exit code 1; success codes come from the command.
pub fn exit_code_for_error(_err: &Error) -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_shape() {
        let err = Error::report_not_found("/srv/sweep_report.json");
        let value = serde_json::to_value(CliResponse::from_error(&err)).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "report.not_found");
        assert_eq!(value["error"]["details"]["path"], "/srv/sweep_report.json");
        assert!(value["error"]["hints"].is_array());
        assert!(value.get("data").is_none());
    }
}
