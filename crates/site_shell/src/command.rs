use anyhow::{Context, Result, bail};
use contact::ContactMessage;
use core_types::Language;

pub const HELP: &str = "\
commands:
  #/<path>                     navigate to a fragment
  lang <en|fr>                 switch language
  theme                        toggle light/dark theme
  industry <name>              filter use cases by industry
  tech <name>                  filter use cases by technology
  search <text>                search use cases
  open <id> | close            open or close a use case
  share <id>                   print a link to a use case
  ask <text>                   talk to the assistant
  contact <name>|<email>|<msg> send a message
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Navigate(String),
    Language(Language),
    ToggleTheme,
    Industry(String),
    Technology(String),
    Search(String),
    Open(u32),
    Close,
    Share(u32),
    Ask(String),
    Contact(ContactMessage),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        if line.starts_with('#') {
            return Ok(Command::Navigate(line.to_string()));
        }

        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));
        let command = match verb {
            "go" => Command::Navigate(required(verb, rest)?.to_string()),
            "lang" => Command::Language(required(verb, rest)?.parse()?),
            "theme" => Command::ToggleTheme,
            "industry" => Command::Industry(required(verb, rest)?.to_string()),
            "tech" => Command::Technology(required(verb, rest)?.to_string()),
            "search" => Command::Search(rest.to_string()),
            "open" => Command::Open(parse_id(rest)?),
            "close" => Command::Close,
            "share" => Command::Share(parse_id(rest)?),
            "ask" => Command::Ask(required(verb, rest)?.to_string()),
            "contact" => Command::Contact(parse_contact(rest)),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command `{other}`, try `help`"),
        };
        Ok(command)
    }
}

fn required<'a>(verb: &str, rest: &'a str) -> Result<&'a str> {
    if rest.is_empty() {
        bail!("`{verb}` needs an argument");
    }
    Ok(rest)
}

fn parse_id(rest: &str) -> Result<u32> {
    rest.parse()
        .with_context(|| format!("`{rest}` is not a use case id"))
}

fn parse_contact(rest: &str) -> ContactMessage {
    let mut parts = rest.splitn(3, '|').map(str::trim);
    ContactMessage::new(
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
    )
}
