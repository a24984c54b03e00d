//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.
//! Streaming commands print one line per item through [`Painter`].

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use inception_core::EventCategory;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Applies the palette when color is on, passes text through otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            enabled: should_color(mode),
        }
    }

    pub fn dim(self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn key(self, text: &str) -> String {
        if self.enabled {
            text.cyan().bold().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn removed(self, text: &str) -> String {
        if self.enabled {
            text.red().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn category(self, category: EventCategory) -> String {
        let label = category.to_string();
        if !self.enabled {
            return label;
        }
        match category {
            EventCategory::Security => label.red().bold().to_string(),
            EventCategory::Access => label.green().to_string(),
            EventCategory::Hardware => label.yellow().to_string(),
            EventCategory::Audit => label.magenta().to_string(),
            EventCategory::System => label.blue().to_string(),
        }
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item views don't use `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print one streamed item and flush, so pipes see it immediately.
pub fn print_line(line: &str) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()?;
    Ok(())
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

/// Compact JSON for one streamed item.
pub fn json_line<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    render_json(data, true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: "d-1".into(),
                name: "Front Door".into(),
            },
            Row {
                id: "d-2".into(),
                name: "Back Door".into(),
            },
        ]
    }

    fn to_row(r: &Row) -> Row {
        Row {
            id: r.id.clone(),
            name: r.name.clone(),
        }
    }

    #[test]
    fn plain_prints_one_id_per_line() {
        let out = render_list(OutputFormat::Plain, &rows(), to_row, |r| r.id.clone()).unwrap();
        assert_eq!(out, "d-1\nd-2");
    }

    #[test]
    fn table_has_headers() {
        let out = render_list(OutputFormat::Table, &rows(), to_row, |r| r.id.clone()).unwrap();
        assert!(out.contains("Name"));
        assert!(out.contains("Back Door"));
    }

    #[test]
    fn compact_json_is_one_line() {
        let out =
            render_list(OutputFormat::JsonCompact, &rows(), to_row, |r| r.id.clone()).unwrap();
        assert_eq!(
            out,
            r#"[{"id":"d-1","name":"Front Door"},{"id":"d-2","name":"Back Door"}]"#
        );
    }

    #[test]
    fn painter_without_color_is_identity() {
        let painter = Painter::new(ColorMode::Never);
        assert_eq!(painter.category(EventCategory::Security), "security");
        assert_eq!(painter.key("door/d-1"), "door/d-1");
    }
}
