//! Line-based edit scripts.
//!
//! One step per line; blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! type Hello\nworld      text, with \n for a soft break
//! enter | backspace | tab | shift-tab
//! select 0 2             caret at path 0, offset 2
//! select 0 2 1/0 3       range from path 0 offset 2 to path 1/0 offset 3
//! exec heading level=2   toolbar command with key=value arguments
//! mention ada            open the mention picker, pick the first match
//! emoji party            open the emoji picker, pick the first match
//! image ./logo.png alt   upload a file as an inline image
//! blur | focus
//! ```

use anyhow::{Context, Result, anyhow, bail};
use richpad_engine::{CommandArgs, Position, Selection};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Type(String),
    Enter,
    Backspace,
    Tab,
    ShiftTab,
    Select(Selection),
    Exec { id: String, args: CommandArgs },
    Mention(String),
    Emoji(String),
    Image { path: PathBuf, alt: String },
    Blur,
    Focus,
}

pub fn parse_script(script: &str) -> Result<Vec<Step>> {
    script
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| parse_step(line).with_context(|| format!("line {}", index + 1)))
        .collect()
}

fn parse_step(line: &str) -> Result<Step> {
    let line = line.trim_start();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let step = match word {
        "type" => Step::Type(rest.replace("\\n", "\n")),
        "enter" => Step::Enter,
        "backspace" => Step::Backspace,
        "tab" => Step::Tab,
        "shift-tab" => Step::ShiftTab,
        "select" => Step::Select(parse_selection(rest)?),
        "exec" => {
            let mut parts = rest.split_whitespace();
            let id = parts.next().ok_or_else(|| anyhow!("exec needs a command id"))?;
            Step::Exec {
                id: id.to_string(),
                args: parse_args(parts)?,
            }
        }
        "mention" => Step::Mention(rest.trim().to_string()),
        "emoji" => Step::Emoji(rest.trim().to_string()),
        "image" => {
            let (path, alt) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
            if path.is_empty() {
                bail!("image needs a file path");
            }
            Step::Image {
                path: PathBuf::from(path),
                alt: alt.trim().to_string(),
            }
        }
        "blur" => Step::Blur,
        "focus" => Step::Focus,
        other => bail!("unknown step {other:?}"),
    };
    Ok(step)
}

fn parse_position(path: &str, offset: &str) -> Result<Position> {
    let indices = path
        .split('/')
        .map(|part| part.parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("bad path {path:?}"))?;
    let offset = offset
        .parse::<usize>()
        .with_context(|| format!("bad offset {offset:?}"))?;
    Ok(Position::new(indices, offset))
}

fn parse_selection(rest: &str) -> Result<Selection> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    match parts.as_slice() {
        [path, offset] => Ok(Selection::caret(parse_position(path, offset)?)),
        [from_path, from, to_path, to] => Ok(Selection::range(
            parse_position(from_path, from)?,
            parse_position(to_path, to)?,
        )),
        _ => bail!("select takes a path and offset, or two of each"),
    }
}

fn parse_args<'a>(parts: impl Iterator<Item = &'a str>) -> Result<CommandArgs> {
    let mut args = CommandArgs::default();
    for part in parts {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| anyhow!("argument {part:?} is not key=value"))?;
        let value = value.to_string();
        match key {
            "href" => args.href = Some(value),
            "level" => args.level = Some(value.parse().context("level must be a number")?),
            "rows" => args.rows = Some(value.parse().context("rows must be a number")?),
            "cols" => args.cols = Some(value.parse().context("cols must be a number")?),
            "url" => args.url = Some(value),
            "src" => args.src = Some(value),
            "alt" => args.alt = Some(value),
            "user" => args.user_id = Some(value),
            "name" => args.name = Some(value),
            "display" => args.display_name = Some(value),
            "glyph" => args.glyph = Some(value),
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(args)
}
