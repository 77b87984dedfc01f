//! Reads toggle commands from stdin and forwards them to the controller.
//!
//! Accepted lines: `grid on|off`, `annotation on|off` (or `minimap`),
//! `action` and `quit`.

use std::io::{self, BufRead};
use std::str::FromStr;
use std::thread;

use strum::{EnumString, VariantNames};
use tracing::{debug, warn};

use super::controller::{Event, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
enum Command {
    Grid,
    #[strum(serialize = "annotation", serialize = "minimap")]
    Annotation,
    Action,
    #[strum(serialize = "quit", serialize = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
enum Switch {
    On,
    Off,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?} (expected one of {expected})", expected = Command::VARIANTS.join(", "))]
    Unknown(String),
    #[error("{0} needs `on` or `off`")]
    MissingSwitch(&'static str),
    #[error("expected `on` or `off`, got {0:?}")]
    BadSwitch(String),
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Event>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else { return Ok(None) };
    let command =
        Command::from_str(first).map_err(|_| CommandError::Unknown(first.to_string()))?;
    let mut switch = |name: &'static str| -> Result<bool, CommandError> {
        let word = words.next().ok_or(CommandError::MissingSwitch(name))?;
        match Switch::from_str(word) {
            Ok(Switch::On) => Ok(true),
            Ok(Switch::Off) => Ok(false),
            Err(_) => Err(CommandError::BadSwitch(word.to_string())),
        }
    };
    let event = match command {
        Command::Grid => Event::GridToggled(switch("grid")?),
        Command::Annotation => Event::AnnotationToggled(switch("annotation")?),
        Command::Action => Event::ActionPressed,
        Command::Quit => Event::Shutdown,
    };
    Ok(Some(event))
}

/// Forwards every parsed line of `input` to `tx`. Returns when the input ends.
pub fn forward_commands(input: impl BufRead, tx: &Sender) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(?err, "failed to read command");
                break;
            }
        };
        match parse_command(&line) {
            Ok(Some(event)) => tx.send(event),
            Ok(None) => {}
            Err(err) => warn!("{err}"),
        }
    }
    debug!("command input closed");
}

pub fn spawn_stdin_reader(tx: Sender) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-commands".to_string())
        .spawn(move || forward_commands(io::stdin().lock(), &tx))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::actor;

    #[test]
    fn parses_toggles() {
        assert_eq!(parse_command("grid on"), Ok(Some(Event::GridToggled(true))));
        assert_eq!(parse_command("  GRID  Off "), Ok(Some(Event::GridToggled(false))));
        assert_eq!(parse_command("annotation on"), Ok(Some(Event::AnnotationToggled(true))));
        assert_eq!(parse_command("minimap off"), Ok(Some(Event::AnnotationToggled(false))));
        assert_eq!(parse_command("action"), Ok(Some(Event::ActionPressed)));
        assert_eq!(parse_command("quit"), Ok(Some(Event::Shutdown)));
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_command("grid"), Err(CommandError::MissingSwitch("grid")));
        assert_eq!(parse_command("grid maybe"), Err(CommandError::BadSwitch("maybe".into())));
        assert_eq!(parse_command("fly"), Err(CommandError::Unknown("fly".into())));
    }

    #[test]
    fn forwards_until_input_ends() {
        let (tx, mut rx) = actor::channel();
        forward_commands("grid on\nbogus\n\naction\n".as_bytes(), &tx);
        let events: Vec<Event> = std::iter::from_fn(|| rx.try_recv().ok().map(|(_, e)| e)).collect();
        assert_eq!(events, vec![Event::GridToggled(true), Event::ActionPressed]);
    }
}
