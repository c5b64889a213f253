//! Parsing and running the owner's typed commands.

use tamago_core::{InteractionError, LifeStage, Mood, Need, PetSnapshot};
use tamago_engine::{Clock, PetEngine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Interact(Need),
    Status,
    Pause,
    Name(String),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "status" | "s" => Ok(Command::Status),
            "pause" | "p" => Ok(Command::Pause),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "name" if !rest.is_empty() => Ok(Command::Name(rest.to_string())),
            "name" => Err("usage: name <new name>".to_string()),
            "" => Err("type a command, or 'help'".to_string()),
            other => other
                .parse::<Need>()
                .map(Command::Interact)
                .map_err(|_| format!("unknown command {other:?}, try 'help'")),
        }
    }
}

pub const HELP: &str = "\
Commands:
  feed | play | clean | sleep   look after your pet
  status                        show how your pet is doing
  pause                         pause or resume time passing for your pet
  name <new name>               rename your pet (before the first interaction)
  quit                          leave the game";

/// Whether the loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run one command and return the text to show the owner.
pub fn execute<C: Clock>(engine: &PetEngine<C>, command: Command, json: bool) -> (Flow, String) {
    match command {
        Command::Interact(need) => {
            let name = engine.name();
            let text = match engine.interact(need) {
                Ok(()) => describe(need, &name),
                Err(InteractionError::NeedAlreadyFull(_)) => {
                    format!("{name} doesn't need that right now ({need} is full).")
                }
                Err(e) => format!("Can't {}: {e}", need.action()),
            };
            (Flow::Continue, text)
        }
        Command::Status => (Flow::Continue, render(&engine.snapshot(), json)),
        Command::Pause => {
            let text = if engine.pause_clock() {
                "Time is paused.".to_string()
            } else {
                "Time is running again.".to_string()
            };
            (Flow::Continue, text)
        }
        Command::Name(name) => {
            let text = match engine.set_name(&name) {
                Ok(()) => format!("Your pet is now called {}.", engine.name()),
                Err(e) => format!("Can't rename: {e}"),
            };
            (Flow::Continue, text)
        }
        Command::Help => (Flow::Continue, HELP.to_string()),
        Command::Quit => (Flow::Quit, "Goodbye!".to_string()),
    }
}

pub fn render(snapshot: &PetSnapshot, json: bool) -> String {
    if json {
        serde_json::to_string_pretty(snapshot).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    } else {
        snapshot.to_string()
    }
}

/// A line worth telling the owner when the pet changes between two snapshots.
pub fn announce(previous: &PetSnapshot, current: &PetSnapshot) -> Option<String> {
    if previous.is_alive() && !current.is_alive() {
        return Some(format!("{} has died! Game over!", current.name));
    }
    if current.life_stage != previous.life_stage {
        let article = match current.life_stage {
            LifeStage::Adult => "an",
            _ => "a",
        };
        return Some(format!(
            "{} is now {article} {}!",
            current.name, current.life_stage
        ));
    }
    if current.health != previous.health {
        return Some(format!(
            "{} is {}!",
            current.name,
            current.health.as_str().to_lowercase()
        ));
    }
    if current.mood != previous.mood {
        return Some(match current.mood {
            Mood::Happy => format!("{} is happy again.", current.name),
            mood => format!("{} is {}!", current.name, mood.as_str().to_lowercase()),
        });
    }
    None
}

fn describe(need: Need, name: &str) -> String {
    match need {
        Need::Hunger => format!("Feeding {name}."),
        Need::Social => format!("Playing with {name}."),
        Need::Hygiene => format!("Cleaning {name}."),
        Need::Energy => format!("Putting {name} to sleep."),
    }
}
