use anyhow::{Context, Result};
use futures::executor::block_on;
use richpad_config::Config;
use richpad_engine::{
    EditorConfig, Host, InMemoryFile, Outcome, Session, format_outline, read_as_data_uri,
};
use std::{env, path::Path, process};

mod script;

use script::Step;

/// Logs every change notification.
struct LogHost;

impl Host for LogHost {
    fn on_change(&mut self, markup: &str) {
        log::debug!("changed: {markup}");
    }

    fn on_blur(&mut self) {
        log::debug!("blurred");
    }
}

fn run_step<H: Host>(session: &mut Session<H>, step: Step) -> Result<Outcome> {
    let outcome = match step {
        Step::Type(text) => session.type_text(&text),
        Step::Enter => session.commit(),
        Step::Backspace => session.delete_backward(),
        Step::Tab => session.indent(),
        Step::ShiftTab => session.outdent(),
        Step::Select(selection) => {
            session.set_selection(selection);
            Outcome::Ignored
        }
        Step::Exec { id, args } => session.execute(&id, &args),
        Step::Mention(query) => {
            let ticket = session.open_mention_picker(None);
            if session.set_mention_query(&query).is_some() {
                log::warn!("mention lookups need a host provider; nothing to pick");
            }
            let first = session
                .mention_picker()
                .and_then(|picker| picker.candidates().first().cloned());
            match first {
                Some(candidate) => session.select_mention(ticket, &candidate),
                None => {
                    log::warn!("no mention matches {query:?}");
                    session.close_overlay();
                    Outcome::Ignored
                }
            }
        }
        Step::Emoji(query) => {
            let ticket = session.open_emoji_picker(None);
            session.set_emoji_query(&query);
            match session.emoji_results().first() {
                Some(entry) => session.select_emoji(ticket, entry.glyph),
                None => {
                    log::warn!("no emoji matches {query:?}");
                    session.close_overlay();
                    Outcome::Ignored
                }
            }
        }
        Step::Image { path, alt } => {
            let Some(ticket) = session.begin_image_upload() else {
                return Ok(Outcome::Ignored);
            };
            let file = read_attachment(&path)?;
            let result = block_on(read_as_data_uri(&file));
            session.complete_image_upload(ticket, result, &alt)
        }
        Step::Blur => {
            session.blur();
            Outcome::Ignored
        }
        Step::Focus => {
            session.focus();
            Outcome::Ignored
        }
    };
    Ok(outcome)
}

fn read_attachment(path: &Path) -> Result<InMemoryFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(InMemoryFile {
        name,
        mime_type: None,
        bytes,
    })
}

fn load_editor_config() -> Result<EditorConfig> {
    let config_path = Config::config_path();
    log::info!("Config path: {}", config_path.display());
    match Config::load()? {
        Some(config) => Ok(config.to_editor_config()?),
        None => {
            log::info!("No config file found, using the task-description preset");
            Ok(Config::default().to_editor_config()?)
        }
    }
}

fn run(script_path: &Path, input_path: Option<&Path>, outline: bool) -> Result<String> {
    let script = std::fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read script {}", script_path.display()))?;
    let steps = script::parse_script(&script)?;

    let mut config = load_editor_config()?;
    if let Some(input_path) = input_path {
        config.initial_content = std::fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read input {}", input_path.display()))?;
    }

    let mut session = Session::new(config, LogHost);
    for step in steps {
        let outcome = run_step(&mut session, step)?;
        log::debug!("outcome: {outcome:?}");
    }
    log::info!("finished at version {}", session.version());

    Ok(if outline {
        format_outline(session.document())
    } else {
        session.markup()
    })
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let outline = match args.iter().position(|arg| arg == "--outline") {
        Some(index) => {
            args.remove(index);
            true
        }
        None => false,
    };
    if args.is_empty() || args.len() > 2 {
        let program_name = env::args().next().unwrap_or_else(|| "richpad".to_string());
        eprintln!("Usage: {program_name} [--outline] <script-file> [input.html]");
        process::exit(1);
    }

    let input = args.get(1).map(Path::new);
    match run(Path::new(&args[0]), input, outline) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use richpad_engine::{NoopHost, Preset};
    use tempfile::TempDir;

    fn session(markup: &str) -> Session {
        let config = EditorConfig {
            initial_content: markup.into(),
            ..Preset::TaskDescription.config()
        };
        Session::new(config, NoopHost)
    }

    fn run_all(session: &mut Session, script: &str) {
        for step in script::parse_script(script).unwrap() {
            run_step(session, step).unwrap();
        }
    }

    #[test]
    fn builds_a_list_and_leaves_it() {
        let mut session = session("");
        run_all(&mut session, "exec bulletList\ntype a\nenter\ntype b\nenter\nenter\ntype done");
        assert_eq!(session.markup(), "<ul><li>a</li><li>b</li></ul><p>done</p>");
    }

    #[test]
    fn emoji_step_picks_first_match() {
        let mut session = session("<p>ship it </p>");
        run_all(&mut session, "select 0 8\nemoji rocket");
        assert_eq!(session.markup(), "<p>ship it <span data-emoji>🚀</span></p>");
    }

    #[test]
    fn image_step_inlines_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pixel.gif");
        std::fs::write(&path, b"GIF").unwrap();

        let mut session = session("<p>x</p>");
        run_all(&mut session, &format!("image {} a pixel", path.display()));
        assert_eq!(
            session.markup(),
            r#"<p>x</p><img src="data:image/gif;base64,R0lG" alt="a pixel"><p></p>"#
        );
    }

    #[test]
    fn missing_image_file_is_an_error() {
        let mut session = session("<p>x</p>");
        let step = script::parse_script("image /definitely/not/here.png")
            .unwrap()
            .remove(0);
        assert!(run_step(&mut session, step).is_err());
    }
}
