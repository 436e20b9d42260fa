//! Console intake of passenger/driver ages and yes/no prompts

use std::io::{self, BufRead, Write};

use crate::monitor::{Actor, Responder};
use crate::sensor::{AgeGroup, Role};

/// Asks for an age until one classifies for `role`.
///
/// Non-numbers and rejected ages print the error and ask again. Returns an
/// `UnexpectedEof` error if the input ends first.
pub fn prompt_age<R: BufRead, W: Write>(input: &mut R, output: &mut W, role: Role) -> io::Result<(i32, AgeGroup)> {
    let mut line = String::new();
    loop {
        write!(output, "Enter the age of the {role}: ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed before a valid age"));
        }

        let age: i32 = match line.trim().parse() {
            Ok(a) => a,
            Err(e) => {
                writeln!(output, "invalid literal for an age: {:?} ({e})", line.trim())?;
                continue;
            }
        };
        match AgeGroup::classify(age, role) {
            Ok(group) => return Ok((age, group)),
            Err(e) => writeln!(output, "{e}")?,
        }
    }
}

/// "Are you feeling okay?" on the console. Anything but yes counts as no.
pub fn ask_is_ok<R: BufRead, W: Write>(input: &mut R, output: &mut W, actor: Actor) -> bool {
    if write!(output, "{actor}: Are you feeling okay? [y/n] ").and_then(|_| output.flush()).is_err() {
        return false;
    }
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
    }
}

/// Answers monitor prompts from stdin, or with a fixed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleResponder {
    Ask,
    AssumeOk,
    AssumeNotOk,
}

impl Responder for ConsoleResponder {
    fn is_ok(&mut self, actor: Actor) -> bool {
        match self {
            ConsoleResponder::AssumeOk => true,
            ConsoleResponder::AssumeNotOk => false,
            ConsoleResponder::Ask => ask_is_ok(&mut io::stdin().lock(), &mut io::stdout(), actor),
        }
    }
}
