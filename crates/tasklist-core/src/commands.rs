use std::io::Write;

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::render::Renderer;
use crate::session::Session;
use crate::store::TaskStore;
use crate::task::{Category, Draft};

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add", "edit", "save", "cancel", "done", "remove", "list", "info", "export", "help",
        "quit", "exit",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Draft),
    Edit(String),
    Save(Draft),
    Cancel,
    Done(String),
    Remove(String),
    List(Option<Category>),
    Info(String),
    Export,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines and `#` comments yield `None`.
    #[instrument]
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let known = known_command_names();
        let name = expand_command_abbrev(head, &known)
            .ok_or_else(|| anyhow!("unknown or ambiguous command: {head}"))?;
        debug!(token = %head, expanded = %name, "resolved command token");

        let command = match name {
            "add" => Command::Add(parse_draft(rest)),
            "save" => Command::Save(parse_draft(rest)),
            "edit" => Command::Edit(required_id(name, rest)?),
            "done" => Command::Done(required_id(name, rest)?),
            "remove" => Command::Remove(required_id(name, rest)?),
            "info" => Command::Info(required_id(name, rest)?),
            "list" if rest.is_empty() => Command::List(None),
            "list" => Command::List(Some(rest.parse::<Category>()?)),
            "cancel" => Command::Cancel,
            "export" => Command::Export,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(anyhow!("unhandled command {other}")),
        };
        Ok(Some(command))
    }
}

/// `<category> | <title> | <description>`; missing parts stay empty so
/// validation can report them.
fn parse_draft(rest: &str) -> Draft {
    let mut parts = rest.splitn(3, '|').map(str::trim);
    Draft::new(
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
    )
}

fn required_id(command: &str, rest: &str) -> anyhow::Result<String> {
    if rest.is_empty() {
        return Err(anyhow!("{command} requires a task id"));
    }
    Ok(rest.to_string())
}

/// Resolves a full UUID or any unique prefix of one.
pub fn resolve_id(store: &TaskStore, raw: &str) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(raw) {
        return Ok(id);
    }

    let prefix = raw.to_ascii_lowercase();
    let mut matches = store
        .tasks()
        .filter(|task| task.id.to_string().starts_with(&prefix))
        .map(|task| task.id);
    let first = matches
        .next()
        .ok_or_else(|| anyhow!("no task matches id {raw}"))?;
    if matches.next().is_some() {
        return Err(anyhow!("id {raw} is ambiguous"));
    }
    Ok(first)
}

#[instrument(skip(session, renderer, out, now))]
pub fn dispatch<W: Write>(
    session: &mut Session,
    renderer: &Renderer,
    mut out: W,
    command: Command,
    now: DateTime<Utc>,
) -> anyhow::Result<Flow> {
    match command {
        Command::Add(draft) => {
            if let Some(id) = session.editing() {
                return Err(anyhow!(
                    "task {} is being edited; use save or cancel",
                    crate::task::short_id(id)
                ));
            }
            cmd_submit(session, renderer, &mut out, &draft, now)?;
        }
        Command::Save(draft) => {
            if session.editing().is_none() {
                return Err(anyhow!("nothing is being edited; use add"));
            }
            cmd_submit(session, renderer, &mut out, &draft, now)?;
        }
        Command::Edit(raw) => {
            let id = resolve_id(session.store(), &raw)?;
            let draft = session.begin_edit(id)?;
            writeln!(out, "Editing task {}:", crate::task::short_id(id))?;
            renderer.write_draft(&mut out, &draft)?;
        }
        Command::Cancel => match session.cancel_edit() {
            Some(id) => writeln!(out, "Cancelled edit of task {}.", crate::task::short_id(id))?,
            None => writeln!(out, "Nothing to cancel.")?,
        },
        Command::Done(raw) => {
            let id = resolve_id(session.store(), &raw)?;
            let task = session.toggle_done(id, now)?;
            let state = if task.done { "done" } else { "not done" };
            writeln!(out, "Marked task {} {state}.", task.short_id())?;
        }
        Command::Remove(raw) => {
            let id = resolve_id(session.store(), &raw)?;
            let task = session.remove(id)?;
            writeln!(out, "Removed task {} from {}.", task.short_id(), task.category)?;
        }
        Command::List(filter) => {
            let categories = match filter {
                Some(category) => vec![category],
                None => Category::ALL.to_vec(),
            };
            for (idx, category) in categories.into_iter().enumerate() {
                if idx > 0 {
                    writeln!(out)?;
                }
                renderer.write_sequence(
                    &mut out,
                    category,
                    session.store().sequence(category),
                    session.editing(),
                )?;
            }
        }
        Command::Info(raw) => {
            let id = resolve_id(session.store(), &raw)?;
            let task = session
                .store()
                .find(id)
                .ok_or_else(|| anyhow!("task not found: {id}"))?;
            renderer.write_task_info(&mut out, task)?;
        }
        Command::Export => {
            let json = serde_json::to_string_pretty(session.store())
                .context("failed to serialize tasks")?;
            writeln!(out, "{json}")?;
        }
        Command::Help => cmd_help(&mut out)?,
        Command::Quit => {
            info!("quit requested");
            return Ok(Flow::Quit);
        }
    }

    Ok(Flow::Continue)
}

fn cmd_submit<W: Write>(
    session: &mut Session,
    renderer: &Renderer,
    mut out: W,
    draft: &Draft,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let editing = session.editing();
    let errors = session.submit(draft, now)?;
    if !errors.is_empty() {
        warn!(errors = %errors, "draft rejected");
        writeln!(out, "Not saved:")?;
        renderer.write_errors(&mut out, &errors)?;
        return Ok(());
    }

    match editing {
        Some(id) => writeln!(out, "Saved task {}.", crate::task::short_id(id))?,
        None => {
            let category = draft.category.parse::<Category>()?;
            let created = session
                .store()
                .sequence(category)
                .last()
                .ok_or_else(|| anyhow!("created task missing from {category}"))?;
            writeln!(out, "Created task {} in {category}.", created.short_id())?;
        }
    }
    Ok(())
}

fn cmd_help<W: Write>(mut out: W) -> anyhow::Result<()> {
    writeln!(out, "add <category> | <title> | <description>   create a task")?;
    writeln!(out, "edit <id>                                  start editing a task")?;
    writeln!(out, "save <category> | <title> | <description>  save the task being edited")?;
    writeln!(out, "cancel                                     abandon the current edit")?;
    writeln!(out, "done <id>                                  toggle done")?;
    writeln!(out, "remove <id>                                delete a task")?;
    writeln!(out, "list [personal|work]                       show tasks")?;
    writeln!(out, "info <id>                                  show timestamps")?;
    writeln!(out, "export                                     print all tasks as JSON")?;
    writeln!(out, "quit                                       leave")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::config::Config;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 20, 10, 0, 0)
            .single()
            .expect("valid now")
    }

    fn renderer() -> Renderer {
        let mut cfg = Config::default();
        cfg.apply_overrides(vec![("color".to_string(), "off".to_string())]);
        Renderer::new(&cfg).expect("renderer")
    }

    fn run(session: &mut Session, line: &str) -> anyhow::Result<String> {
        let mut out = Vec::new();
        if let Some(command) = Command::parse(line)? {
            dispatch(session, &renderer(), &mut out, command, now())?;
        }
        Ok(String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn parses_drafts_and_abbreviations() {
        assert_eq!(
            Command::parse("a work | Ship it | release 1.0").expect("parse"),
            Some(Command::Add(Draft::new("work", "Ship it", "release 1.0")))
        );
        assert_eq!(
            Command::parse("add | only title").expect("parse"),
            Some(Command::Add(Draft::new("", "only title", "")))
        );
        assert_eq!(
            Command::parse("li work").expect("parse"),
            Some(Command::List(Some(Category::Work)))
        );
        assert_eq!(Command::parse("   # note").expect("parse"), None);
        assert!(Command::parse("e 1234").is_err(), "edit/export/exit is ambiguous");
        assert!(Command::parse("done").is_err());
    }

    #[test]
    fn quit_and_exit_both_stop() {
        for line in ["quit", "exit", "q", "exi"] {
            assert_eq!(
                Command::parse(line).expect("parse"),
                Some(Command::Quit),
                "{line}"
            );
        }
    }

    #[test]
    fn description_may_contain_pipes() {
        assert_eq!(
            Command::parse("add personal | t | a | b").expect("parse"),
            Some(Command::Add(Draft::new("personal", "t", "a | b")))
        );
    }

    #[test]
    fn add_edit_save_flow() {
        let mut session = Session::default();
        let text = run(&mut session, "add personal | Gym | leg day").expect("add");
        assert!(text.starts_with("Created task "));

        let id = session.store().sequence(Category::Personal)[0].id;
        let short = crate::task::short_id(id);

        let text = run(&mut session, &format!("edit {short}")).expect("edit");
        assert!(text.contains("personal | Gym | leg day"));
        assert!(run(&mut session, "add work | Other | x").is_err());

        let text = run(&mut session, "save work | Gym | moved").expect("save");
        assert_eq!(text, format!("Saved task {short}.\n"));
        assert!(session.store().sequence(Category::Personal).is_empty());
        assert_eq!(session.store().sequence(Category::Work)[0].description, "moved");
        assert!(run(&mut session, "save work | Gym | again").is_err());
    }

    #[test]
    fn validation_errors_are_printed_not_raised() {
        let mut session = Session::default();
        let text = run(&mut session, "add").expect("add");
        assert!(text.contains("category"));
        assert!(text.contains("category required"));
        assert!(text.contains("title required"));
        assert!(text.contains("description required"));
        assert!(session.store().is_empty());
    }

    #[test]
    fn done_and_remove_by_prefix() {
        let mut session = Session::default();
        run(&mut session, "add work | A | B").expect("add");
        let id = session.store().sequence(Category::Work)[0].id;
        let prefix = &id.to_string()[..6];

        let text = run(&mut session, &format!("done {prefix}")).expect("done");
        assert!(text.ends_with("done.\n"));
        assert!(run(&mut session, &format!("remove {prefix}")).is_err());

        run(&mut session, &format!("done {id}")).expect("undone");
        let text = run(&mut session, &format!("rem {prefix}")).expect("remove");
        assert!(text.starts_with("Removed task"));
        assert!(session.store().is_empty());
    }

    #[test]
    fn unknown_id_is_reported() {
        let mut session = Session::default();
        let err = run(&mut session, "info ffff").expect_err("missing");
        assert!(err.to_string().contains("no task matches"));
    }

    #[test]
    fn export_prints_json_sequences() {
        let mut session = Session::default();
        run(&mut session, "add work | A | B").expect("add");
        let text = run(&mut session, "export").expect("export");
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["work"][0]["title"], "A");
        assert_eq!(value["work"][0]["time"]["created_at"], "20260420T100000Z");
        assert!(value["work"][0]["time"]["done_at"].is_null());
        assert_eq!(value["personal"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut session = Session::default();
        let command = Command::parse("exit").expect("parse").expect("command");
        let flow = dispatch(&mut session, &renderer(), Vec::new(), command, now()).expect("dispatch");
        assert_eq!(flow, Flow::Quit);
    }
}
