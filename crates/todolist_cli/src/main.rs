//! Command-line front end for the todo core.
//!
//! # Responsibility
//! - Stand in for a presentation layer: dispatch one user action, then
//!   render the collection handed back by the core.
//! - Keep output stable for quick local checks.

use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use todolist_core::db::open_db;
use todolist_core::{
    default_log_level, init_logging, SlotRepository, SqliteSlotRepository, TodoId, TodoRecord,
    TodoService, TodoStore,
};

#[derive(Parser, Debug)]
#[command(name = "todolist", version, about = "Persistent todo list")]
struct Cli {
    /// SQLite database holding the todo slot.
    #[arg(long, value_name = "PATH", default_value = "todolist.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error; only valid together with --log-dir.
    #[arg(long, value_name = "LEVEL", requires = "log_dir")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Show all todos.
    List,
    /// Append a new todo.
    Add { text: String },
    /// Flip the completed flag of a todo.
    Toggle { id: String },
    /// Remove a todo.
    Delete { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("todolist: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir.to_string_lossy())?;
    }

    let conn = open_db(&cli.db)?;
    let mut service = TodoService::open(TodoStore::new(SqliteSlotRepository::new(&conn)));
    let out = Rc::new(RefCell::new(io::stdout()));

    dispatch(&mut service, cli.command.unwrap_or(Command::List), out)?;

    log::debug!("event=cli_exit module=cli status=ok");
    Ok(())
}

/// Runs one command. Mutations re-render through a subscribed listener.
fn dispatch<R, W>(
    service: &mut TodoService<R>,
    command: Command,
    out: Rc<RefCell<W>>,
) -> Result<(), Box<dyn Error>>
where
    R: SlotRepository,
    W: Write + 'static,
{
    if command == Command::List {
        render(&mut *out.borrow_mut(), service.todos())?;
        return Ok(());
    }

    let sink = Rc::clone(&out);
    service.subscribe(move |todos| {
        if let Err(err) = render(&mut *sink.borrow_mut(), todos) {
            log::warn!("event=cli_render module=cli status=error error={err}");
        }
    });

    match command {
        Command::List => {}
        Command::Add { text } => {
            service.add(text)?;
        }
        Command::Toggle { id } => service.toggle(&TodoId::from(id))?,
        Command::Delete { id } => service.delete(&TodoId::from(id))?,
    }
    Ok(())
}

fn render(out: &mut impl Write, todos: &[TodoRecord]) -> io::Result<()> {
    for todo in todos {
        let mark = if todo.completed { 'x' } else { ' ' };
        writeln!(out, "[{mark}] {} {}", todo.id, todo.text)?;
    }
    let remaining = todos.iter().filter(|todo| !todo.completed).count();
    writeln!(out, "{} item(s), {} remaining", todos.len(), remaining)
}

#[cfg(test)]
mod tests {
    use super::{dispatch, render, Cli, Command};
    use clap::Parser;
    use std::cell::RefCell;
    use std::rc::Rc;
    use todolist_core::{MemorySlotRepository, TodoRecord, TodoService, TodoStore};

    fn rendered(todos: &[TodoRecord]) -> String {
        let mut out = Vec::<u8>::new();
        render(&mut out, todos).expect("render into memory should succeed");
        String::from_utf8(out).expect("render output should be UTF-8")
    }

    fn output(buffer: &Rc<RefCell<Vec<u8>>>) -> String {
        String::from_utf8(buffer.borrow().clone()).expect("render output should be UTF-8")
    }

    #[test]
    fn render_marks_completed_and_open_records() {
        let mut done = TodoRecord::with_id("id-1", "Buy milk");
        done.completed = true;
        let open = TodoRecord::with_id("id-2", "Walk dog");

        assert_eq!(
            rendered(&[done, open]),
            "[x] id-1 Buy milk\n[ ] id-2 Walk dog\n2 item(s), 1 remaining\n"
        );
    }

    #[test]
    fn render_empty_collection_prints_summary_only() {
        assert_eq!(rendered(&[]), "0 item(s), 0 remaining\n");
    }

    #[test]
    fn mutations_rerender_through_listener() {
        let repo = MemorySlotRepository::new();
        let mut service = TodoService::open(TodoStore::new(&repo));
        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));

        dispatch(
            &mut service,
            Command::Add {
                text: "Buy milk".to_string(),
            },
            Rc::clone(&buffer),
        )
        .expect("add should succeed");

        let id = service.todos()[0].id.to_string();
        assert_eq!(
            output(&buffer),
            format!("[ ] {id} Buy milk\n1 item(s), 1 remaining\n")
        );

        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
        dispatch(
            &mut service,
            Command::Toggle { id: id.clone() },
            Rc::clone(&buffer),
        )
        .expect("toggle should succeed");
        assert!(output(&buffer).starts_with(&format!("[x] {id} Buy milk\n")));
    }

    #[test]
    fn list_renders_current_collection() {
        let repo = MemorySlotRepository::new();
        let mut service = TodoService::open(TodoStore::new(&repo));
        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));

        dispatch(&mut service, Command::List, Rc::clone(&buffer)).expect("list should succeed");

        assert_eq!(output(&buffer), "0 item(s), 0 remaining\n");
    }

    #[test]
    fn log_level_requires_log_dir() {
        assert!(Cli::try_parse_from(["todolist", "--log-level", "info", "list"]).is_err());

        let cli = Cli::try_parse_from([
            "todolist",
            "--log-dir",
            "/tmp/todolist-logs",
            "--log-level",
            "info",
            "list",
        ])
        .expect("log level with log dir should parse");
        assert_eq!(cli.log_level.as_deref(), Some("info"));
        assert_eq!(cli.command, Some(Command::List));
    }
}
