//! Line-oriented command protocol over the session store.
//!
//! Modeled on GTP: each request is one line with an optional numeric id, a
//! command, and arguments. Responses are `=id payload` on success or
//! `?id message` on failure, each followed by a blank line. Game payloads are
//! JSON snapshots.
//!
//! ## Supported Commands
//!
//! - `login <owner>` - Act as `owner` for the following commands
//! - `whoami` - Print the current owner
//! - `create [size]` - Start a game (default size from config)
//! - `list` - Summaries of the owner's games
//! - `show <id>` - Full snapshot of a game
//! - `board <id>` - Text rendering of a game's board
//! - `play <id> <row> <col>` - Place a black stone; the opponent replies
//! - `pass <id>` - Pass; the opponent replies unless the game ends
//! - `resign <id>` - Concede the game
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit
//!
//! ## Example
//!
//! ```ignore
//! use baduk_engine::protocol::ProtocolServer;
//! use baduk_engine::store::SessionStore;
//! let mut server = ProtocolServer::new(SessionStore::default(), "alice");
//! server.run(std::io::stdin().lock(), std::io::stdout())?;
//! ```

use std::io::{BufRead, Write};

use serde::Serialize;
use tracing::trace;

use crate::board::Board;
use crate::error::GameError;
use crate::store::SessionStore;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "board",
    "create",
    "known_command",
    "list",
    "list_commands",
    "login",
    "pass",
    "play",
    "quit",
    "resign",
    "show",
    "whoami",
];

pub struct ProtocolServer {
    store: SessionStore,
    /// Identity every game command acts as
    owner: String,
}

impl ProtocolServer {
    pub fn new(store: SessionStore, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Read commands from `input` until EOF or `quit`, answering on `output`.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();
            trace!(%command, ?args, "request");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match self.dispatch(command, args) {
            Ok(message) => (true, message),
            Err(message) => (false, message),
        }
    }

    fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<String, String> {
        let owner = self.owner.clone();
        let owner = owner.as_str();
        match command {
            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let cmd = arg(args, 0)?;
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                Ok(known.to_string())
            }

            "quit" => Ok(String::new()),

            "whoami" => Ok(self.owner.clone()),

            "login" => {
                self.owner = arg(args, 0)?.to_string();
                Ok(String::new())
            }

            "create" => {
                let size = args.first().map(|s| parse_num(s, "size")).transpose()?;
                to_json(self.store.create(owner, size))
            }

            "list" => to_json(Ok(self.store.list(owner))),

            "show" => to_json(self.store.get(game_id(args)?, owner)),

            "board" => {
                let snap = self.store.get(game_id(args)?, owner).map_err(|e| e.to_string())?;
                let board = Board::try_from(snap.board)?;
                Ok(format!("\n{board}"))
            }

            "play" => {
                let id = game_id(args)?;
                let row = parse_num(arg(args, 1)?, "row")?;
                let col = parse_num(arg(args, 2)?, "col")?;
                to_json(self.store.place(id, owner, row, col))
            }

            "pass" => to_json(self.store.pass(game_id(args)?, owner)),

            "resign" => to_json(self.store.resign(game_id(args)?, owner)),

            _ => Err(format!("unknown command: {command}")),
        }
    }
}

fn arg<'a>(args: &[&'a str], i: usize) -> Result<&'a str, String> {
    args.get(i).copied().ok_or_else(|| "missing argument".to_string())
}

fn parse_num<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("invalid {what}: {s}"))
}

fn game_id(args: &[&str]) -> Result<u64, String> {
    parse_num(arg(args, 0)?, "game id")
}

fn to_json<T: Serialize>(result: Result<T, GameError>) -> Result<String, String> {
    let value = result.map_err(|err| err.to_string())?;
    serde_json::to_string(&value).map_err(|err| err.to_string())
}
