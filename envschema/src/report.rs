//! Human-readable error reports
//!
//! Issues are listed one per line under a fixed header, indented by two
//! spaces. Terminal styling is applied only when the target stream can
//! display it (see [`ColorChoice`]).

use crate::issue::Issue;
use console::style;

/// First line of every report
pub const HEADER: &str = "Errors found while validating environment variables:";

/// Indentation applied to each issue line
pub const INDENT: &str = "  ";

/// Whether reports should be styled for a terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Style when stderr supports it (tty, `NO_COLOR`/`CLICOLOR` honored)
    #[default]
    Auto,
    /// Always style
    Always,
    /// Never style
    Never,
}

impl ColorChoice {
    /// Resolve the choice for output written to stderr
    pub fn enabled(self) -> bool {
        match self {
            Self::Auto => console::colors_enabled_stderr(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Format issues as a plain-text report.
pub fn format_issues(issues: &[Issue]) -> String {
    render(issues, false)
}

/// Format issues as a report, styled for a terminal when `styled` is set.
pub fn render(issues: &[Issue], styled: bool) -> String {
    let mut lines = Vec::with_capacity(issues.len() + 1);
    lines.push(if styled {
        style(HEADER).red().bold().force_styling(true).to_string()
    } else {
        HEADER.to_string()
    });

    for issue in issues {
        let line = if !styled {
            issue.to_string()
        } else if issue.key().is_empty() {
            style(issue.message()).red().force_styling(true).to_string()
        } else {
            format!(
                "{} {}",
                style(issue.key()).cyan().bold().force_styling(true),
                style(issue.message()).red().force_styling(true)
            )
        };
        lines.push(format!("{INDENT}{line}"));
    }

    lines.join("\n")
}
