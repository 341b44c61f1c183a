//! Interactive browsing over stdin.
//!
//! Input is line based. Every character of a plain line is looked up in the
//! configured [`KeyBindings`], so `jjj` moves down three times and plays each
//! sample on the way. Lines starting with `/` set the search text and lines
//! starting with `:` are commands:
//!
//! | Line            | Effect                                  |
//! |-----------------|-----------------------------------------|
//! | `/text`         | search for `text` (`/` alone clears)    |
//! | `:c Kick`       | category filter (`:c All` clears)       |
//! | `:g 3`          | jump to page 3                          |
//! | `:s 12`         | select entry 12                         |
//! | `:v 0.5`        | set volume                              |
//! | `:e`            | export the active sample                |
//! | `:d 12`         | start dragging entry 12                 |
//! | `:drop <dir>`   | drop the dragged sample into `<dir>`    |
//! | `:q`            | quit                                    |

use std::io::Write;
use std::path::PathBuf;

use redpack_core::{
    BrowserSession, CategoryFilter, ExportTarget, Exporter, KeyBindings, LibraryEvent,
    NavigationCommand, Player,
};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

use crate::commands::{AppState, CliResult, Notice, render_outcome, render_page};

/// One thing a line of input asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A bound key.
    Navigate(NavigationCommand),
    /// New search text.
    Search(String),
    /// New category filter.
    Category(CategoryFilter),
    /// Jump to a one-based page.
    Page(usize),
    /// Select a view index.
    Select(usize),
    /// Set the playback volume.
    Volume(f32),
    /// Export the active sample to the configured target.
    Export,
    /// Start dragging a view index.
    Drag(usize),
    /// Drop the dragged sample into a folder.
    Drop(PathBuf),
    /// Print the help text.
    Help,
    /// Leave the browser.
    Quit,
    /// Input that could not be understood.
    Invalid(String),
}

/// Turn one line of input into actions.
pub fn parse_line(line: &str, bindings: &KeyBindings) -> Vec<Action> {
    if let Some(search) = line.strip_prefix('/') {
        return vec![Action::Search(search.trim().to_string())];
    }
    if let Some(command) = line.strip_prefix(':') {
        return vec![parse_command(command.trim())];
    }
    line.chars()
        .map(|key| {
            bindings
                .command_for(key)
                .map_or_else(|| Action::Invalid(format!("unbound key {key:?}")), Action::Navigate)
        })
        .collect()
}

fn parse_command(command: &str) -> Action {
    let (name, argument) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));

    match name {
        "c" => argument
            .parse()
            .map_or_else(|e| Action::Invalid(format!("{e}")), Action::Category),
        "g" => parse_index(argument).map_or_else(|| invalid(command), Action::Page),
        "s" => parse_index(argument).map_or_else(|| invalid(command), Action::Select),
        "d" => parse_index(argument).map_or_else(|| invalid(command), Action::Drag),
        "v" => argument
            .parse()
            .map_or_else(|_| invalid(command), Action::Volume),
        "e" => Action::Export,
        "drop" if !argument.is_empty() => Action::Drop(PathBuf::from(argument)),
        "h" | "help" => Action::Help,
        "q" | "quit" => Action::Quit,
        _ => invalid(command),
    }
}

fn parse_index(argument: &str) -> Option<usize> {
    argument.parse().ok()
}

fn invalid(command: &str) -> Action {
    Action::Invalid(format!("unknown command :{command}"))
}

/// Whether the loop should keep going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop browsing.
    Quit,
}

/// Apply one action to the session.
///
/// Failures of a single action are reported on `out` and browsing goes on.
pub fn apply(
    state: &mut AppState,
    action: Action,
    player: &dyn Player,
    out: &mut impl Write,
) -> CliResult<Flow> {
    let exporter = state.exporter().clone();
    let target = state.config().export_target.clone();
    let bindings = state.config().key_bindings.clone();
    let session = state.session_mut();

    match action {
        Action::Navigate(command) => match session.handle(command, player) {
            Ok(Some(sample)) => writeln!(out, "playing {sample}")?,
            Ok(None) => {}
            Err(err) => writeln!(out, "error: {err}")?,
        },
        Action::Search(search) => session.set_search(search),
        Action::Category(category) => session.set_category(category),
        Action::Page(page) => {
            session.jump_to_page(page.saturating_sub(1));
        }
        Action::Select(index) => {
            if let Err(err) = session.select(index) {
                writeln!(out, "error: {err}")?;
            }
        }
        Action::Volume(volume) => {
            session.set_volume(volume);
            writeln!(out, "volume {:.2}", session.volume())?;
        }
        Action::Export => export_active(session, &exporter, &target, out)?,
        Action::Drag(index) => match session.begin_drag(index) {
            Ok(sample) => writeln!(out, "dragging {sample}")?,
            Err(err) => writeln!(out, "error: {err}")?,
        },
        Action::Drop(dir) => match session.drop_dragged(&exporter, &dir) {
            Ok(copied) => writeln!(out, "copied to {}", copied.display())?,
            Err(err) => writeln!(out, "error: {err}")?,
        },
        Action::Help => print_help(&bindings, out)?,
        Action::Quit => return Ok(Flow::Quit),
        Action::Invalid(reason) => writeln!(out, "{reason} (:h for help)")?,
    }
    Ok(Flow::Continue)
}

fn export_active(
    session: &BrowserSession,
    exporter: &Exporter,
    target: &ExportTarget,
    out: &mut impl Write,
) -> CliResult<()> {
    match session.export_active(exporter, target) {
        Ok(Some(copied)) => writeln!(out, "exported to {}", copied.display())?,
        Ok(None) => writeln!(out, "nothing selected")?,
        Err(err) => writeln!(out, "error: {err}")?,
    }
    Ok(())
}

fn print_help(bindings: &KeyBindings, out: &mut impl Write) -> CliResult<()> {
    writeln!(
        out,
        "keys: {:?} play, {:?} down, {:?} up, {:?} next page, {:?} previous page",
        bindings.play,
        bindings.move_down,
        bindings.move_up,
        bindings.next_page,
        bindings.previous_page
    )?;
    writeln!(
        out,
        "/text search  :c <category>  :g <page>  :s <index>  :v <volume>  :e export  :d <index> drag  :drop <dir>  :q quit"
    )?;
    Ok(())
}

/// Run the browser until `input` ends or the user quits.
///
/// Imports keep running while the user browses; the page is redrawn each
/// time one finishes and its outcome is printed.
pub async fn run<R>(
    state: &mut AppState,
    input: R,
    player: &dyn Player,
    out: &mut impl Write,
) -> CliResult<()>
where
    R: AsyncRead + Unpin,
{
    let bindings = state.config().key_bindings.clone();
    let mut lines = BufReader::new(input).lines();
    render_page(state.session(), out)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                let mut quit = false;
                for action in parse_line(&line, &bindings) {
                    if apply(state, action, player, out)? == Flow::Quit {
                        quit = true;
                        break;
                    }
                }
                // Events from the actions above only mirror session state.
                state.pump_events();
                if quit {
                    break;
                }
                render_page(state.session(), out)?;
            }
            Some(notice) = state.next_notice() => match notice {
                Notice::Event(LibraryEvent::LibraryChanged { added }) => {
                    if added == 0 {
                        warn!("An import finished without adding samples");
                    }
                    state.session_mut().refresh();
                    state.pump_events();
                    render_page(state.session(), out)?;
                }
                Notice::Event(_) => {}
                Notice::Import(outcome) => render_outcome(&outcome, out)?,
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use redpack_core::{AppConfig, Category, MemoryFileSystem, PlaybackError};

    use super::*;

    /// Records every path it is asked to play.
    #[derive(Default)]
    struct RecordingPlayer {
        played: Mutex<Vec<PathBuf>>,
    }

    impl Player for RecordingPlayer {
        fn play(&self, path: &Path, _volume: f32) -> Result<(), PlaybackError> {
            self.played.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    impl RecordingPlayer {
        fn names(&self) -> Vec<String> {
            self.played
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        }
    }

    async fn state_with(files: &[&str]) -> AppState {
        let fs = MemoryFileSystem::new();
        for file in files {
            fs.add_file(*file, b"data");
        }
        fs.add_dir("/out");
        let config = AppConfig {
            library_roots: vec![PathBuf::from("/kit")],
            export_target: ExportTarget::Folder(PathBuf::from("/out")),
            ..AppConfig::default()
        };
        let mut state = AppState::with_file_system(config, Arc::new(fs));
        state.import(&[], false).await.unwrap();
        state
    }

    #[test]
    fn test_parse_keys_in_order() {
        let actions = parse_line("jk ", &KeyBindings::default());
        assert_eq!(
            actions,
            [
                Action::Navigate(NavigationCommand::MoveDown),
                Action::Navigate(NavigationCommand::MoveUp),
                Action::Navigate(NavigationCommand::Play),
            ]
        );
        assert!(matches!(
            parse_line("x", &KeyBindings::default())[..],
            [Action::Invalid(_)]
        ));
    }

    #[test]
    fn test_parse_search_and_commands() {
        let bindings = KeyBindings::default();
        assert_eq!(
            parse_line("/Loop", &bindings),
            [Action::Search("Loop".to_string())]
        );
        assert_eq!(parse_line("/", &bindings), [Action::Search(String::new())]);
        assert_eq!(
            parse_line(":c Hi-Hat", &bindings),
            [Action::Category(CategoryFilter::Only(Category::HiHat))]
        );
        assert_eq!(
            parse_line(":c All", &bindings),
            [Action::Category(CategoryFilter::All)]
        );
        assert_eq!(parse_line(":g 2", &bindings), [Action::Page(2)]);
        assert_eq!(parse_line(":v 0.5", &bindings), [Action::Volume(0.5)]);
        assert_eq!(
            parse_line(":drop /tmp/out", &bindings),
            [Action::Drop(PathBuf::from("/tmp/out"))]
        );
        assert_eq!(parse_line(":q", &bindings), [Action::Quit]);
        assert!(matches!(
            parse_line(":c Bass", &bindings)[..],
            [Action::Invalid(_)]
        ));
        assert!(matches!(
            parse_line(":s x", &bindings)[..],
            [Action::Invalid(_)]
        ));
    }

    #[tokio::test]
    async fn test_move_then_play() {
        let mut state = state_with(&["/kit/a_kick.wav", "/kit/b_snare.wav", "/kit/c_tom.wav"]).await;
        let player = RecordingPlayer::default();
        let mut out = Vec::new();

        for action in parse_line("jj j", &KeyBindings::default()) {
            apply(&mut state, action, &player, &mut out).unwrap();
        }
        assert_eq!(
            player.names(),
            ["b_snare.wav", "c_tom.wav", "c_tom.wav", "a_kick.wav"]
        );
        assert_eq!(state.session().active_index(), Some(0));
    }

    #[tokio::test]
    async fn test_export_and_drag_actions() {
        let mut state = state_with(&["/kit/a_kick.wav", "/kit/b_snare.wav"]).await;
        let player = RecordingPlayer::default();
        let mut out = Vec::new();

        apply(&mut state, Action::Export, &player, &mut out).unwrap();
        apply(&mut state, Action::Drag(1), &player, &mut out).unwrap();
        apply(&mut state, Action::Drop(PathBuf::from("/out")), &player, &mut out).unwrap();
        apply(&mut state, Action::Export, &player, &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(
            lines,
            [
                "exported to /out/a_kick.wav",
                "dragging b_snare.wav: Snare",
                "copied to /out/b_snare.wav",
                "error: Export destination already exists: /out/a_kick.wav",
            ]
        );
        assert!(state.session().dragged().is_none());
    }

    #[tokio::test]
    async fn test_run_reads_until_quit() {
        let mut state = state_with(&["/kit/a_kick.wav", "/kit/b_snare.wav"]).await;
        let player = RecordingPlayer::default();
        let mut out = Vec::new();
        let input: &[u8] = b":c Snare\n \n:q\nj\n";

        run(&mut state, input, &player, &mut out).await.unwrap();

        assert_eq!(player.names(), ["b_snare.wav"]);
        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("playing b_snare.wav: Snare"));
        assert!(output.contains("category: Snare"));
    }
}
