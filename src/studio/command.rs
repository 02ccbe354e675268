//! Line commands understood by the interactive shell.

use crate::studio::view::{EditorMode, View};
use std::path::PathBuf;
use std::str::FromStr;

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Open a tool screen.
    Open(View),
    /// Back to the menu.
    Home,
    /// Load an image into a 1-based slot.
    Image { slot: usize, path: PathBuf },
    /// Remove the image in a slot.
    Clear { slot: usize },
    /// Set the main text field.
    Text(String),
    /// Switch the editor mode.
    Mode(EditorMode),
    /// Trigger generation.
    Generate,
    /// Save the open result, optionally into a directory.
    Save(Option<PathBuf>),
    /// Move the pointer over the open result, in image-relative pixels
    /// of a 100x100 surface.
    Look { x: f64, y: f64 },
    /// Close the result viewer.
    Close,
    /// Show the current screen.
    Status,
    /// List the tools.
    Tools,
    /// Show help.
    Help,
    /// Leave the shell.
    Quit,
}

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ShellParseError(pub String);

/// Help text listing every command.
pub const SHELL_HELP: &str = "\
commands:
  open <couple|logo|ad|edit>   open a tool
  home                         back to the menu
  image [1|2] <path>           select an image
  clear [1|2]                  remove an image
  text <words>                 set the description / subject / instruction
  mode <add|remove|change>     editor mode
  generate                     run the tool
  look <x> <y>                 move the zoom point (0-100)
  save [dir]                   save the open result
  close                        close the result
  status | tools | help | quit";

fn parse_slot(token: &str) -> Option<usize> {
    match token {
        "1" => Some(1),
        "2" => Some(2),
        _ => None,
    }
}

impl FromStr for ShellCommand {
    type Err = ShellParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let err = |msg: &str| Err(ShellParseError(msg.to_string()));

        match word.to_lowercase().as_str() {
            "open" => rest
                .parse::<View>()
                .map_err(ShellParseError)
                .map(|view| if view.is_tool() { Self::Open(view) } else { Self::Home }),
            "home" | "back" => Ok(Self::Home),
            "image" => {
                let (slot, path) = match rest.split_once(char::is_whitespace) {
                    Some((first, path)) => match parse_slot(first) {
                        Some(slot) => (slot, path.trim()),
                        None => (1, rest),
                    },
                    None => (1, rest),
                };
                if path.is_empty() {
                    return err("usage: image [1|2] <path>");
                }
                Ok(Self::Image {
                    slot,
                    path: PathBuf::from(path),
                })
            }
            "clear" => match rest {
                "" => Ok(Self::Clear { slot: 1 }),
                s => parse_slot(s)
                    .map(|slot| Self::Clear { slot })
                    .ok_or_else(|| ShellParseError("usage: clear [1|2]".into())),
            },
            "text" => Ok(Self::Text(rest.to_string())),
            "mode" => rest
                .parse::<EditorMode>()
                .map(Self::Mode)
                .map_err(ShellParseError),
            "generate" | "go" => Ok(Self::Generate),
            "save" => Ok(Self::Save((!rest.is_empty()).then(|| PathBuf::from(rest)))),
            "look" => {
                let mut nums = rest.split_whitespace().map(str::parse::<f64>);
                match (nums.next(), nums.next(), nums.next()) {
                    (Some(Ok(x)), Some(Ok(y)), None) => Ok(Self::Look { x, y }),
                    _ => err("usage: look <x> <y>"),
                }
            }
            "close" => Ok(Self::Close),
            "status" => Ok(Self::Status),
            "tools" | "menu" => Ok(Self::Tools),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "" => err("empty command"),
            other => Err(ShellParseError(format!(
                "unknown command '{other}', try 'help'"
            ))),
        }
    }
}
