//! Prompt line parsing.

use std::str::FromStr;

use crate::{
    error::CommandError,
    whiteboard::{DEFAULT_COLOR, DEFAULT_LINE_WIDTH, Stroke, Tool},
};

pub const HELP: &str = "\
Commands:
  <text>                               send a chat message
  /draw x0 y0 x1 y1 [color] [width]    draw a line (coordinates in 0..1)
  /erase x0 y0 x1 y1 [width]           erase along a line
  /clear                               clear the whiteboard for everyone
  /timer [start|pause|switch]          control the shared Pomodoro timer
  /share, /unshare                     start or stop screen sharing
  /peers                               list peer connections
  /history                             show the chat transcript
  /leave                               leave the room and exit
  /help                                show this help";

const DRAW_USAGE: &str = "/draw x0 y0 x1 y1 [color] [width]";
const ERASE_USAGE: &str = "/erase x0 y0 x1 y1 [width]";
const TIMER_USAGE: &str = "/timer [start|pause|switch]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Status,
    Start,
    Pause,
    Switch,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Chat(String),
    Draw(Stroke),
    Clear,
    Timer(TimerAction),
    Share,
    Unshare,
    Peers,
    History,
    Leave,
    Help,
}

fn coordinate(raw: &str) -> Result<f64, CommandError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(CommandError::OutOfRange(value));
    }
    Ok(value)
}

fn line_width(raw: Option<&str>) -> Result<f64, CommandError> {
    match raw {
        None => Ok(DEFAULT_LINE_WIDTH),
        Some(raw) => match raw.parse::<f64>() {
            Ok(width) if width > 0.0 => Ok(width),
            _ => Err(CommandError::InvalidNumber(raw.to_string())),
        },
    }
}

fn stroke(args: &[&str], tool: Tool) -> Result<Stroke, CommandError> {
    let usage = match tool {
        Tool::Pen => DRAW_USAGE,
        Tool::Eraser => ERASE_USAGE,
    };
    let max_args = match tool {
        Tool::Pen => 6,
        Tool::Eraser => 5,
    };
    if args.len() < 4 || args.len() > max_args {
        return Err(CommandError::Usage(usage));
    }

    let (color, width) = match tool {
        Tool::Pen => (
            args.get(4).copied().unwrap_or(DEFAULT_COLOR).to_string(),
            line_width(args.get(5).copied())?,
        ),
        Tool::Eraser => (DEFAULT_COLOR.to_string(), line_width(args.get(4).copied())?),
    };

    Ok(Stroke {
        x0: coordinate(args[0])?,
        y0: coordinate(args[1])?,
        x1: coordinate(args[2])?,
        y1: coordinate(args[3])?,
        color,
        line_width: width,
        tool,
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            if line.is_empty() {
                return Err(CommandError::Usage("<text>"));
            }
            return Ok(Self::Chat(line.to_string()));
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        match (name, args.as_slice()) {
            ("draw", args) => Ok(Self::Draw(stroke(args, Tool::Pen)?)),
            ("erase", args) => Ok(Self::Draw(stroke(args, Tool::Eraser)?)),
            ("clear", []) => Ok(Self::Clear),
            ("timer", []) => Ok(Self::Timer(TimerAction::Status)),
            ("timer", ["start"]) => Ok(Self::Timer(TimerAction::Start)),
            ("timer", ["pause"]) => Ok(Self::Timer(TimerAction::Pause)),
            ("timer", ["switch"]) => Ok(Self::Timer(TimerAction::Switch)),
            ("timer", _) => Err(CommandError::Usage(TIMER_USAGE)),
            ("share", []) => Ok(Self::Share),
            ("unshare", []) => Ok(Self::Unshare),
            ("peers", []) => Ok(Self::Peers),
            ("history", []) => Ok(Self::History),
            ("leave", []) => Ok(Self::Leave),
            ("help", _) => Ok(Self::Help),
            ("clear" | "share" | "unshare" | "peers" | "history" | "leave", _) => {
                Err(CommandError::Usage(HELP))
            }
            (other, _) => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}
