pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod error;
pub mod render;
pub mod session;
pub mod shared;
pub mod store;
pub mod task;
pub mod validate;

use std::ffi::OsString;
use std::fs::File;
use std::io::{
  self,
  BufRead,
  BufReader,
  IsTerminal,
  Write
};

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{
  debug,
  info,
  warn
};

pub use error::StoreError;
pub use store::TaskStore;
pub use task::{
  Category,
  Draft,
  Task,
  TaskTime
};
pub use validate::{
  Field,
  FieldError,
  ValidationErrors,
  validate
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting tasklist"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );

  let renderer =
    render::Renderer::new(&cfg)
      .context(
        "failed to set up output"
      )?;

  let (input, interactive): (
    Box<dyn BufRead>,
    bool
  ) = match cli.script.as_deref() {
    | Some(path) => {
      let file = File::open(path)
        .with_context(|| {
          format!(
            "failed to open script {}",
            path.display()
          )
        })?;
      (
        Box::new(BufReader::new(file)),
        false
      )
    }
    | None => {
      let stdin = io::stdin();
      let interactive =
        stdin.is_terminal();
      (
        Box::new(stdin.lock()),
        interactive
      )
    }
  };

  let mut session =
    session::Session::default();
  run_loop(
    &mut session,
    &renderer,
    input,
    io::stdout().lock(),
    interactive.then(|| cfg.prompt())
  )?;

  info!(
    tasks = session.store().len(),
    "done"
  );
  Ok(())
}

/// Reads commands line by line until
/// EOF or `quit`. Command failures and
/// undecodable lines are reported and
/// the loop carries on.
pub fn run_loop<R, W>(
  session: &mut session::Session,
  renderer: &render::Renderer,
  mut input: R,
  mut out: W,
  prompt: Option<String>
) -> anyhow::Result<()>
where
  R: BufRead,
  W: Write
{
  let mut buf = Vec::new();
  loop {
    if let Some(prompt) = prompt.as_deref()
    {
      write!(out, "{prompt}")?;
      out.flush()?;
    }

    buf.clear();
    let read = input
      .read_until(b'\n', &mut buf)
      .context("failed reading input")?;
    if read == 0 {
      debug!("end of input");
      break;
    }

    let line = match std::str::from_utf8(
      &buf
    ) {
      | Ok(text) => {
        text.trim_end_matches([
          '\r', '\n'
        ])
      }
      | Err(err) => {
        warn!(error = %err, "skipping undecodable input line");
        writeln!(
          out,
          "error: input line is not \
           valid UTF-8: {err}"
        )?;
        continue;
      }
    };

    let outcome = commands::Command::parse(
      line
    )
    .and_then(|command| match command {
      | Some(command) => {
        commands::dispatch(
          session,
          renderer,
          &mut out,
          command,
          Utc::now()
        )
      }
      | None => {
        Ok(commands::Flow::Continue)
      }
    });

    match outcome {
      | Ok(commands::Flow::Quit) => break,
      | Ok(commands::Flow::Continue) => {}
      | Err(err) => {
        warn!(error = %err, line = %line, "command failed");
        writeln!(out, "error: {err:#}")?;
      }
    }
  }

  out.flush()?;
  Ok(())
}
