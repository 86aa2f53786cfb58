//! Review prompt templates: instructions, vulnerability categories, severity labels and
//! output columns kept as data so both entry points share one rendering path.

use crate::Message;
use std::fmt::Write as _;

/// Shape the model is asked to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `<table>` with a header row and one row per finding.
    #[default]
    HtmlTable,
}

/// Structured review prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Optional system message (reviewer role).
    pub system: Option<String>,
    pub instructions: String,
    /// Vulnerability categories to look for; omitted from the prompt when empty.
    pub categories: Vec<String>,
    /// Output columns, in order.
    pub columns: Vec<String>,
    /// Allowed severity labels, most severe first.
    pub severities: Vec<String>,
    pub output_format: OutputFormat,
}

impl PromptTemplate {
    /// Prompt used by the HTTP service for background jobs.
    pub fn service() -> Self {
        Self {
            system: None,
            instructions: "Analyze this code for any security vulnerabilities.".to_string(),
            categories: Vec::new(),
            columns: strings(&["Issue", "Description", "Severity", "Recommendation"]),
            severities: strings(&["High", "Medium", "Low"]),
            output_format: OutputFormat::HtmlTable,
        }
    }

    /// Prompt used by the one-shot command-line scanner.
    pub fn cli() -> Self {
        Self {
            system: Some(
                "You are a security code analysis expert. Analyze the provided code and identify \
                 security vulnerabilities. Answer only with the requested table. Do not mention \
                 AI or any AI vendor in your response."
                    .to_string(),
            ),
            instructions: "Analyze the following code for security vulnerabilities and provide \
                           a detailed analysis."
                .to_string(),
            categories: strings(&[
                "Injection",
                "Authentication and session handling",
                "Sensitive data exposure",
                "Access control",
                "Insecure deserialization",
                "Hardcoded secrets",
            ]),
            columns: strings(&["Severity", "Issue", "Location", "Description"]),
            severities: strings(&["Critical", "High", "Medium", "Low"]),
            output_format: OutputFormat::HtmlTable,
        }
    }

    /// Build the chat messages for one review of `code`.
    pub fn render(&self, code: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(Message::system(system.clone()));
        }
        messages.push(Message::user(self.render_user(code)));
        messages
    }

    fn render_user(&self, code: &str) -> String {
        let mut out = String::new();
        out.push_str(&self.instructions);
        if !self.categories.is_empty() {
            let _ = write!(
                out,
                " Consider at least these categories: {}.",
                self.categories.join(", ")
            );
        }
        match self.output_format {
            OutputFormat::HtmlTable => {
                out.push_str(
                    " Format your response as an HTML table with proper <table>, <tr>, <th>, and \
                     <td> tags. Make sure to use <thead> and <tbody> sections.",
                );
                let _ = write!(
                    out,
                    " The table should have the following columns: {}.",
                    self.columns.join(", ")
                );
                if !self.severities.is_empty() {
                    let _ = write!(
                        out,
                        " Severity must be exactly one of: {}.",
                        self.severities.join(", ")
                    );
                }
                out.push_str("\n\n<table>\n  <thead>\n    <tr>\n");
                for col in &self.columns {
                    let _ = writeln!(out, "      <th>{}</th>", col);
                }
                out.push_str(
                    "    </tr>\n  </thead>\n  <tbody>\n    <!-- one row per finding -->\n  </tbody>\n</table>",
                );
            }
        }
        let _ = write!(out, "\n\nHere's the code to analyze:\n\n{}", code);
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::service()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
