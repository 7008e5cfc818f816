use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::Amount;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `add <amount> <category> [description...]`
    Add {
        /// Amount as typed; validated by the ledger
        amount: Amount,
        /// Category label; validated by the ledger
        category: String,
        /// Typed description; `None` falls back to the voice description
        description: Option<String>,
    },
    /// `voice <wav-path>`
    Voice {
        /// WAV clip to transcribe
        path: PathBuf,
    },
    /// `summary [category...]`
    Summary {
        /// Category labels; empty means all
        categories: Vec<String>,
    },
    /// `list [category...]`
    List {
        /// Category labels; empty means all
        categories: Vec<String>,
    },
    /// `clear`
    Clear,
    /// `help`
    Help,
    /// `quit` or `exit`
    Quit,
}

/// Input that isn't a well-formed command
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Blank line
    #[error("empty command")]
    Empty,

    /// First word isn't a known verb
    #[error("unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),

    /// Required argument absent
    #[error("'{command}' needs {argument}")]
    MissingArgument {
        /// Verb that was typed
        command: &'static str,
        /// Argument that was expected
        argument: &'static str,
    },

    /// Amount is not a number
    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?;

        match verb.to_lowercase().as_str() {
            "add" => {
                let amount = words.next().ok_or(CommandError::MissingArgument {
                    command: "add",
                    argument: "an amount",
                })?;
                let amount = parse_amount(amount)?;
                let category = words.next().ok_or(CommandError::MissingArgument {
                    command: "add",
                    argument: "a category",
                })?;
                let description = words.collect::<Vec<_>>().join(" ");
                Ok(Self::Add {
                    amount,
                    category: category.to_owned(),
                    description: (!description.is_empty()).then_some(description),
                })
            }
            "voice" => {
                // Paths may contain spaces; keep the rest of the line verbatim
                let path = line.trim_start()[verb.len()..].trim();
                if path.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "voice",
                        argument: "a WAV file path",
                    });
                }
                Ok(Self::Voice {
                    path: PathBuf::from(path),
                })
            }
            "summary" => Ok(Self::Summary {
                categories: words.map(str::to_owned).collect(),
            }),
            "list" => Ok(Self::List {
                categories: words.map(str::to_owned).collect(),
            }),
            "clear" => Ok(Self::Clear),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(verb.to_owned())),
        }
    }
}

/// Accepts plain decimals with optional thousands separators, e.g. `1,250.50`
fn parse_amount(input: &str) -> Result<Amount, CommandError> {
    let without_commas = input.replace(',', "");
    Decimal::from_str(&without_commas).map_err(|_| CommandError::InvalidAmount(input.to_owned()))
}
