use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

use crate::config::Config;
use crate::datetime::DisplayZone;
use crate::task::{Category, Draft, Task};
use crate::validate::ValidationErrors;

const STRIKE: &str = "9";
const YELLOW: &str = "33";
const RED: &str = "31";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    date_format: String,
    zone: DisplayZone,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true) && io::stdout().is_terminal();
        Ok(Self {
            color,
            date_format: cfg.date_format(),
            zone: cfg.display_zone()?,
        })
    }

    #[tracing::instrument(skip(self, out, tasks))]
    pub fn write_sequence<W: Write>(
        &self,
        mut out: W,
        category: Category,
        tasks: &[Task],
        editing: Option<Uuid>,
    ) -> anyhow::Result<()> {
        writeln!(out, "{} ({})", category, tasks.len())?;
        if tasks.is_empty() {
            writeln!(out, "  no tasks")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Title".to_string(),
            "Description".to_string(),
            "Done".to_string(),
        ];

        let rows = tasks
            .iter()
            .map(|task| {
                let mut id = self.paint(&task.short_id(), YELLOW);
                if editing == Some(task.id) {
                    id.push('*');
                }
                let (title, description) = if task.done {
                    (
                        self.paint(&task.title, STRIKE),
                        self.paint(&task.description, STRIKE),
                    )
                } else {
                    (task.title.clone(), task.description.clone())
                };
                let done = if task.done { "yes" } else { "" };
                vec![id, title, description, done.to_string()]
            })
            .collect();

        write_table(&mut out, headers, rows)
    }

    #[tracing::instrument(skip(self, out, task))]
    pub fn write_task_info<W: Write>(&self, mut out: W, task: &Task) -> anyhow::Result<()> {
        writeln!(out, "id          {}", task.id)?;
        writeln!(out, "category    {}", task.category)?;
        writeln!(out, "title       {}", task.title)?;
        writeln!(out, "description {}", task.description)?;
        writeln!(out, "done        {}", if task.done { "yes" } else { "no" })?;
        writeln!(
            out,
            "created     {}",
            self.zone.format(task.time.created_at, &self.date_format)
        )?;
        writeln!(
            out,
            "updated     {}",
            self.zone.format(task.time.updated_at, &self.date_format)
        )?;
        writeln!(
            out,
            "done at     {}",
            self.zone.format_opt(task.time.done_at, &self.date_format)
        )?;
        Ok(())
    }

    pub fn write_draft<W: Write>(&self, mut out: W, draft: &Draft) -> anyhow::Result<()> {
        writeln!(
            out,
            "{} | {} | {}",
            draft.category, draft.title, draft.description
        )?;
        Ok(())
    }

    pub fn write_errors<W: Write>(&self, mut out: W, errors: &ValidationErrors) -> anyhow::Result<()> {
        for (field, message) in errors.messages() {
            writeln!(out, "{:<12} {}", field, self.paint(&message, RED))?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
