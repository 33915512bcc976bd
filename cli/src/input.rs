//! Parsing of terminal input lines into session events

use otp_core::services::verification::SessionEvent;

/// What a line of input asks the host to do
#[derive(Debug, Clone)]
pub enum HostCommand {
    /// Forward to the session machine
    Event(SessionEvent),
    /// Re-print the session state
    Status,
    /// Print usage
    Help,
}

/// Input that could not be turned into a command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Empty input")]
    Empty,

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Not a position: {0}")]
    InvalidIndex(String),
}

pub const HELP: &str = "\
Commands:
  <text>              paste text; the first run of digits long enough is used
  <position> <digit>  type one digit (positions start at 0)
  clear <position>    erase one digit
  submit              submit the current code again
  resend              request a new code
  status              show the session
  cancel              abandon verification
  help                show this message";

/// Parse one line of input
///
/// Anything that is not a recognised command is treated as pasted text, so a
/// user can simply type or paste the whole code.
pub fn parse_line(line: &str) -> Result<HostCommand, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(InputError::Empty);
    }

    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or_default();

    let command = match head.to_lowercase().as_str() {
        "submit" => HostCommand::Event(SessionEvent::SubmitRequested),
        "resend" => HostCommand::Event(SessionEvent::ResendRequested),
        "cancel" | "quit" | "exit" => HostCommand::Event(SessionEvent::Cancel),
        "status" => HostCommand::Status,
        "help" | "?" => HostCommand::Help,
        "clear" => {
            let index = parts.next().ok_or(InputError::MissingArgument {
                command: "clear",
                argument: "a position",
            })?;
            HostCommand::Event(SessionEvent::DigitCleared {
                index: parse_index(index)?,
            })
        }
        "paste" => {
            let text = line[head.len()..].trim();
            if text.is_empty() {
                return Err(InputError::MissingArgument {
                    command: "paste",
                    argument: "some text",
                });
            }
            HostCommand::Event(SessionEvent::PasteIngested {
                text: text.to_string(),
            })
        }
        _ => match (head.parse::<usize>(), parts.next(), parts.next()) {
            (Ok(index), Some(digit), None) if digit.chars().count() == 1 => {
                let digit = digit.chars().next().unwrap_or_default();
                HostCommand::Event(SessionEvent::DigitEntered { index, digit })
            }
            _ => HostCommand::Event(SessionEvent::PasteIngested {
                text: line.to_string(),
            }),
        },
    };

    Ok(command)
}

fn parse_index(raw: &str) -> Result<usize, InputError> {
    raw.parse()
        .map_err(|_| InputError::InvalidIndex(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(line: &str) -> SessionEvent {
        match parse_line(line).unwrap() {
            HostCommand::Event(event) => event,
            other => panic!("Expected session event, got {:?}", other),
        }
    }

    #[test]
    fn test_keywords() {
        assert!(matches!(event("submit"), SessionEvent::SubmitRequested));
        assert!(matches!(event(" RESEND "), SessionEvent::ResendRequested));
        assert!(matches!(event("quit"), SessionEvent::Cancel));
        assert!(matches!(parse_line("status"), Ok(HostCommand::Status)));
        assert!(matches!(parse_line("?"), Ok(HostCommand::Help)));
    }

    #[test]
    fn test_single_digit_entry() {
        assert!(matches!(
            event("2 7"),
            SessionEvent::DigitEntered { index: 2, digit: '7' }
        ));
        // Non-numeric digits are left for the session to reject
        assert!(matches!(
            event("0 x"),
            SessionEvent::DigitEntered { index: 0, digit: 'x' }
        ));
    }

    #[test]
    fn test_clear() {
        assert!(matches!(event("clear 5"), SessionEvent::DigitCleared { index: 5 }));
        assert_eq!(
            parse_line("clear").unwrap_err(),
            InputError::MissingArgument {
                command: "clear",
                argument: "a position"
            }
        );
        assert_eq!(
            parse_line("clear five").unwrap_err(),
            InputError::InvalidIndex("five".to_string())
        );
    }

    #[test]
    fn test_everything_else_is_pasted() {
        match event("482913") {
            SessionEvent::PasteIngested { text } => assert_eq!(text, "482913"),
            other => panic!("Expected paste, got {:?}", other),
        }
        match event("paste Your code is 482913") {
            SessionEvent::PasteIngested { text } => assert_eq!(text, "Your code is 482913"),
            other => panic!("Expected paste, got {:?}", other),
        }
        match event("12 34 56") {
            SessionEvent::PasteIngested { text } => assert_eq!(text, "12 34 56"),
            other => panic!("Expected paste, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_line("   ").unwrap_err(), InputError::Empty);
        assert!(matches!(
            parse_line("paste  "),
            Err(InputError::MissingArgument { command: "paste", .. })
        ));
    }
}
