//! Tokenizer for the command stream.

/// A normalized command line: uppercased name plus raw positional arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Split a line into a command, or `None` for blank and `#` comment lines.
///
/// Never fails; argument checking belongs to the session.
pub fn parse_command(line: &str) -> Option<ParsedCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let mut tokens = trimmed.split_whitespace();
    let name = tokens.next()?.to_uppercase();
    let args = tokens.map(str::to_string).collect();
    Some(ParsedCommand { name, args })
}
