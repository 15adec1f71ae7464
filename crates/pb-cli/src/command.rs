//! REPL command parsing

use pb_client::{Category, ContactId};
use thiserror::Error;

/// Commands with a short description, for help and autocomplete
pub const COMMANDS: &[(&str, &str)] = &[
    ("/list", "Reload the current page"),
    ("/next", "Next page"),
    ("/prev", "Previous page"),
    ("/page", "Go to page N"),
    ("/size", "Page size: 10, 25 or 50"),
    ("/search", "Search by keyword (empty clears)"),
    ("/category", "Filter by category, or 'all'"),
    ("/clear", "Clear search and category filters"),
    ("/add", "Add a contact"),
    ("/edit", "Edit contact ID"),
    ("/delete", "Delete contact ID"),
    ("/confirm", "Confirm the pending delete"),
    ("/cancel", "Cancel the pending delete"),
    ("/stats", "Show statistics"),
    ("/phone", "Look up a contact by phone number"),
    ("/delete-many", "Delete several contacts"),
    ("/help", "Show help"),
    ("/quit", "Exit"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Next,
    Prev,
    /// Zero-based page index
    Page(u32),
    Size(u32),
    Search(String),
    /// `None` shows all categories
    Category(Option<Category>),
    Clear,
    Add,
    Edit(ContactId),
    Delete(ContactId),
    Confirm,
    Cancel,
    Stats,
    Phone(String),
    DeleteMany(Vec<ContactId>),
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}. Type /help for the command list.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid value for {command}: {value}")]
    InvalidValue { command: &'static str, value: String },
}

fn contact_id(command: &'static str, value: &str) -> Result<ContactId, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidValue {
        command,
        value: value.to_string(),
    })
}

fn required<'a>(arg: &'a str, usage: &'static str) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(arg)
    }
}

impl Command {
    /// Parse one input line.
    ///
    /// Text that does not start with `/` is a keyword search.
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let input = input.trim();
        if !input.starts_with('/') {
            return Ok(Self::Search(input.to_string()));
        }

        let (name, arg) = match input.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (input, ""),
        };

        match name.to_lowercase().as_str() {
            "/list" | "/refresh" => Ok(Self::List),
            "/next" | "/n" => Ok(Self::Next),
            "/prev" | "/p" => Ok(Self::Prev),
            "/page" => {
                let arg = required(arg, "/page N")?;
                match arg.parse::<u32>() {
                    Ok(n) if n >= 1 => Ok(Self::Page(n - 1)),
                    _ => Err(CommandError::InvalidValue {
                        command: "/page",
                        value: arg.to_string(),
                    }),
                }
            }
            "/size" => {
                let arg = required(arg, "/size 10|25|50")?;
                arg.parse().map(Self::Size).map_err(|_| CommandError::InvalidValue {
                    command: "/size",
                    value: arg.to_string(),
                })
            }
            "/search" | "/s" => Ok(Self::Search(arg.to_string())),
            "/category" | "/cat" => {
                let arg = required(arg, "/category personal|business|family|friend|other|all")?;
                if arg.eq_ignore_ascii_case("all") {
                    return Ok(Self::Category(None));
                }
                arg.to_lowercase()
                    .parse()
                    .map(|c| Self::Category(Some(c)))
                    .map_err(|_| CommandError::InvalidValue {
                        command: "/category",
                        value: arg.to_string(),
                    })
            }
            "/clear" => Ok(Self::Clear),
            "/add" | "/new" => Ok(Self::Add),
            "/edit" => Ok(Self::Edit(contact_id("/edit", required(arg, "/edit ID")?)?)),
            "/delete" | "/rm" => Ok(Self::Delete(contact_id(
                "/delete",
                required(arg, "/delete ID")?,
            )?)),
            "/confirm" | "/yes" => Ok(Self::Confirm),
            "/cancel" | "/no" => Ok(Self::Cancel),
            "/stats" => Ok(Self::Stats),
            "/phone" => Ok(Self::Phone(required(arg, "/phone NUMBER")?.to_string())),
            "/delete-many" => {
                let arg = required(arg, "/delete-many ID [ID...]")?;
                arg.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|s| !s.is_empty())
                    .map(|s| contact_id("/delete-many", s))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::DeleteMany)
            }
            "/help" | "/?" => Ok(Self::Help),
            "/quit" | "/exit" | "/q" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(name.to_string())),
        }
    }
}
