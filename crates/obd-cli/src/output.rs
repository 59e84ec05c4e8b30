//! Output formatting for obd-cli (table, json, csv)

use clap::ValueEnum;
use colored::Colorize;
use obd_core::{NoticeLevel, Notification};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl OutputFormat {
    /// Parse a format name from a config file
    pub fn parse(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Render a controller notification as a one-line toast
    pub fn notify(&self, notification: &Notification) {
        let notice = &notification.notice;
        match notice.level {
            NoticeLevel::Success => {
                if !self.quiet {
                    eprintln!("{} {}", notice.title.green().bold(), notice.description);
                }
            }
            NoticeLevel::Error => {
                eprintln!("{} {}", notice.title.red().bold(), notice.description);
            }
        }
    }

    /// Print data in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    let table = Table::new(data).to_string();
                    println!("{}", table);
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
                );
            }
            OutputFormat::Csv => {
                print_csv(data);
            }
        }
    }

    /// Print a single item in the configured format
    pub fn print_one<T: Tabled + Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Table => {
                let table = Table::new([data]).to_string();
                println!("{}", table);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Csv => {
                print_csv(&[data]);
            }
        }
    }
}

/// Print data as CSV
fn print_csv<T: Serialize>(data: &[T]) {
    if let Some(lines) = csv_lines(data) {
        for line in lines {
            println!("{}", line);
        }
    }
}

/// Header plus one line per row; `None` when there is nothing to print
///
/// Columns follow field declaration order (serde_json `preserve_order`).
fn csv_lines<T: Serialize>(data: &[T]) -> Option<Vec<String>> {
    let first = serde_json::to_value(data.first()?).ok()?;
    let serde_json::Value::Object(map) = first else {
        return None;
    };

    let headers: Vec<String> = map.keys().cloned().collect();
    let mut lines = vec![headers.join(",")];

    for item in data {
        if let Ok(serde_json::Value::Object(row)) = serde_json::to_value(item) {
            let values: Vec<String> = headers
                .iter()
                .map(|h| {
                    row.get(h)
                        .map(|v| match v {
                            serde_json::Value::String(s) => escape_csv(s),
                            other => escape_csv(&other.to_string()),
                        })
                        .unwrap_or_default()
                })
                .collect();
            lines.push(values.join(","));
        }
    }

    Some(lines)
}

/// Escape a value for CSV output
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// =============================================================================
// Display types for various commands
// =============================================================================

/// Code description for lookup command
#[derive(Debug, Tabled, Serialize)]
pub struct LookupRow {
    #[tabled(rename = "Código")]
    pub code: String,
    #[tabled(rename = "Descrição")]
    pub description: String,
}

/// Diagnosis outcome for diagnose command
#[derive(Debug, Tabled, Serialize)]
pub struct DiagnosisRow {
    #[tabled(rename = "Método de Diagnóstico")]
    pub method: String,
    #[tabled(rename = "Sugestão")]
    pub suggestion: String,
}

/// Field error for diagnose command
#[derive(Debug, Tabled, Serialize)]
pub struct ValidationRow {
    #[tabled(rename = "Campo")]
    pub field: String,
    #[tabled(rename = "Erro")]
    pub message: String,
}

/// Code list entry for codes command
#[derive(Debug, Tabled, Serialize)]
pub struct CodeRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Código")]
    pub code: String,
    #[tabled(rename = "Descrição")]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_lines() {
        let rows = vec![
            CodeRow {
                id: "1".into(),
                code: "P0420".into(),
                description: "Catalyst efficiency below threshold".into(),
            },
            CodeRow {
                id: "2".into(),
                code: "P0300".into(),
                description: "Random/multiple cylinder misfire, detected".into(),
            },
        ];

        let lines = csv_lines(&rows).unwrap();
        assert_eq!(
            lines,
            vec![
                "id,code,description".to_string(),
                "1,P0420,Catalyst efficiency below threshold".to_string(),
                "2,P0300,\"Random/multiple cylinder misfire, detected\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_csv_lines_empty() {
        let rows: Vec<CodeRow> = vec![];
        assert!(csv_lines(&rows).is_none());
    }

    #[test]
    fn test_parse_format_name() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }
}
