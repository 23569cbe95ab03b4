// ABOUTME: Command-loop line parsing: turns one input line into an action.
// ABOUTME: Generic "<setting> <value...>" dispatch plus the literal "exit".

/// The result of parsing one command-loop line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// User wants to leave the loop.
    Exit,
    /// Set `name` to `value` (remaining tokens joined by single spaces).
    Adjust { name: String, value: String },
    /// Fewer than two tokens.
    Invalid,
}

/// Parse a raw input line. Surrounding whitespace is ignored.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.eq_ignore_ascii_case("exit") {
        return Command::Exit;
    }

    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(name), Some(first)) => {
            let value = std::iter::once(first).chain(parts).collect::<Vec<_>>().join(" ");
            Command::Adjust {
                name: name.to_string(),
                value,
            }
        }
        _ => Command::Invalid,
    }
}
