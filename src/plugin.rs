use crate::collectors::ErrorSet;
use crate::perfdata::Perfdata;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        })
    }
}

#[derive(Debug)]
pub struct CheckResult {
    pub status: Status,
    pub output: String,
    pub perfdata: Vec<Perfdata>,
    pub errors: ErrorSet,
}

impl CheckResult {
    pub fn new(status: Status, output: impl Into<String>, perfdata: Vec<Perfdata>) -> Self {
        Self {
            status,
            output: output.into(),
            perfdata,
            errors: ErrorSet::new(),
        }
    }

    pub fn failed(errors: ErrorSet) -> Self {
        let output = errors
            .iter()
            .map(|(context, err)| format!("{context}: {err}"))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            status: Status::Unknown,
            output,
            perfdata: Vec::new(),
            errors,
        }
    }

    pub fn render(&self) -> String {
        let mut line = format!("{}: {}", self.status, status_text(&self.output));
        if !self.perfdata.is_empty() {
            line.push_str(" |");
            for item in &self.perfdata {
                line.push(' ');
                line.push_str(&item.to_string());
            }
        }
        line
    }
}

// The status line carries no '|' and no line breaks.
fn status_text(output: &str) -> String {
    output
        .chars()
        .map(|c| match c {
            '|' => '/',
            '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    pub status: Status,
    pub exit_code: i32,
    pub output: String,
    pub perfdata: Vec<JsonPerfdata>,
    pub errors: Vec<JsonError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonPerfdata {
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub warn: Option<String>,
    pub crit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonError {
    pub context: String,
    pub error: String,
}

impl From<&CheckResult> for JsonReport {
    fn from(result: &CheckResult) -> Self {
        Self {
            status: result.status,
            exit_code: result.status.exit_code(),
            output: result.output.clone(),
            perfdata: result
                .perfdata
                .iter()
                .map(|p| JsonPerfdata {
                    label: p.label.clone(),
                    value: p.value,
                    unit: p.unit.to_string(),
                    warn: p.warn.map(|t| t.to_string()),
                    crit: p.crit.map(|t| t.to_string()),
                    min: p.min,
                    max: p.max,
                })
                .collect(),
            errors: result
                .errors
                .iter()
                .map(|(context, err)| JsonError {
                    context: context.clone(),
                    error: err.to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::CollectError;
    use crate::perfdata::Threshold;
    use std::io;

    #[test]
    fn exit_codes_follow_plugin_convention() {
        assert_eq!(Status::Ok.exit_code(), 0);
        assert_eq!(Status::Warning.exit_code(), 1);
        assert_eq!(Status::Critical.exit_code(), 2);
        assert_eq!(Status::Unknown.exit_code(), 3);
    }

    #[test]
    fn renders_status_output_and_perfdata() {
        let result = CheckResult::new(
            Status::Critical,
            "The kernel '/boot/vmlinuz-5.10' has been installed 50s after boot",
            vec![
                Perfdata::new("mtime_boot_diff", 50_000_000.0)
                    .unit("us")
                    .crit(Threshold::inside(0.0, f64::INFINITY)),
                Perfdata::new("kernels", 2.0)
                    .warn(Threshold::at_least(1.0))
                    .min(0.0),
            ],
        );
        assert_eq!(
            result.render(),
            "CRITICAL: The kernel '/boot/vmlinuz-5.10' has been installed 50s after boot \
             | mtime_boot_diff=50000000us;;@0: kernels=2;1:;;0"
        );
    }

    #[test]
    fn failed_result_lists_contexts_without_perfdata() {
        let mut errors = ErrorSet::new();
        errors.insert(
            "read /proc/uptime".to_string(),
            CollectError::BadOutput("x".to_string()),
        );
        errors.insert(
            "list /boot".to_string(),
            CollectError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
        );

        let result = CheckResult::failed(errors);
        assert_eq!(result.status, Status::Unknown);
        assert!(result.perfdata.is_empty());
        assert_eq!(
            result.render(),
            "UNKNOWN: list /boot: denied; read /proc/uptime: bad output: x"
        );
    }

    #[test]
    fn pipes_and_newlines_in_output_do_not_split_perfdata() {
        let result = CheckResult::new(
            Status::Critical,
            "The kernel '/boot/vmlinuz-a|b\nc' has been installed 5s after boot",
            vec![Perfdata::new("kernels", 1.0)],
        );
        let rendered = result.render();
        assert_eq!(
            rendered,
            "CRITICAL: The kernel '/boot/vmlinuz-a/b c' has been installed 5s after boot \
             | kernels=1"
        );
        assert_eq!(rendered.matches('|').count(), 1);
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn json_report_carries_errors_and_thresholds() {
        let result = CheckResult::new(
            Status::Warning,
            "No kernels found (ls /boot/vmlinuz*)",
            vec![Perfdata::new("kernels", 0.0)
                .warn(Threshold::at_least(1.0))
                .min(0.0)],
        );
        let json = serde_json::to_value(JsonReport::from(&result)).expect("serialize");
        assert_eq!(json["status"], "WARNING");
        assert_eq!(json["exit_code"], 1);
        assert_eq!(json["perfdata"][0]["warn"], "1:");
        assert!(json["errors"].as_array().expect("array").is_empty());
    }
}
