//! Output formatting for openhab-events

use clap::ValueEnum;
use colored::Colorize;
use openhab_events::ItemEvent;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// One JSON document per line
    Compact,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Compact => "compact",
        }
    }
}

/// What to print for one received event
#[derive(Debug, PartialEq)]
pub enum Rendered {
    Json(String),
    /// Payload was not JSON
    Malformed,
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

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg);
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

    /// Decode an event payload as JSON and format it
    pub fn render(&self, event: &ItemEvent) -> Rendered {
        let Ok(json) = event.json() else {
            return Rendered::Malformed;
        };

        let text = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&json),
            OutputFormat::Compact => serde_json::to_string(&json),
        };
        text.map(Rendered::Json).unwrap_or(Rendered::Malformed)
    }
}
