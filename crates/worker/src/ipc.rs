//! The wire format exchanged between a `WorkerProxy` and its child
//! process, one newline-delimited JSON value per line.
//!
//! A `Worker` has no OS thread in common with its `Supervisor` — they are
//! separate processes — so the tagged-variant command channel described
//! in the worker contract rides stdin (`Command`, proxy → worker) and
//! stdout (`WorkerEvent`, worker → proxy) instead of an in-memory queue.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};

/// A queued command, dispatched by variant rather than by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Execute,
    Quit,
}

/// Emitted by the worker around a check so the proxy's reader thread can
/// translate it into a `Start`/`End` message on the manager queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkerEvent {
    Start { id: i64 },
    End { id: i64 },
}

/// Writes one command as a line of JSON to `writer` and flushes it.
pub fn write_command<W: Write>(writer: &mut W, command: Command) -> io::Result<()> {
    let line = serde_json::to_string(&command)?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Writes one event as a line of JSON to `writer` and flushes it.
pub fn write_event<W: Write>(writer: &mut W, event: WorkerEvent) -> io::Result<()> {
    let line = serde_json::to_string(&event)?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Reads one JSON value per line from `reader`, yielding `None` once the
/// underlying pipe is closed (the child exited) or a line fails to parse.
pub fn read_line<R: BufRead, T: for<'de> Deserialize<'de>>(reader: &mut R) -> Option<T> {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => return None,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                return serde_json::from_str(trimmed).ok();
            }
            Err(_) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn command_round_trips_through_a_line() {
        let mut buf = Vec::new();
        write_command(&mut buf, Command::Execute).unwrap();
        let mut cursor = Cursor::new(buf);
        let parsed: Command = read_line(&mut cursor).unwrap();
        assert_eq!(parsed, Command::Execute);
    }

    #[test]
    fn event_round_trips_through_a_line() {
        let mut buf = Vec::new();
        write_event(&mut buf, WorkerEvent::Start { id: 7 }).unwrap();
        let mut cursor = Cursor::new(buf);
        let parsed: WorkerEvent = read_line(&mut cursor).unwrap();
        assert_eq!(parsed, WorkerEvent::Start { id: 7 });
    }

    #[test]
    fn read_line_returns_none_on_eof() {
        let mut cursor = Cursor::new(Vec::new());
        let parsed: Option<Command> = read_line(&mut cursor);
        assert!(parsed.is_none());
    }
}
