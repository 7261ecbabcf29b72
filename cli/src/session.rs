use std::io::{BufRead, Write};

use anyhow::Result;
use minado_core::{
    Coord, Coord2, DEFAULT_COLS, DEFAULT_ROWS, FlagOutcome, Game, GameConfig, GameState, MAX_COLS,
    MAX_ROWS, OpenOutcome,
};

use crate::render;

/// Invalid setup answers tolerated before falling back to the default.
const SETUP_ATTEMPTS: u32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Action {
    Open,
    Flag,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Turn {
    coords: Coord2,
    action: Action,
}

/// Interactive game driver over arbitrary input/output streams. All
/// input validation happens here; the engine only ever sees in-bounds
/// coordinates.
pub struct Session<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn run(
        &mut self,
        rows: Option<Coord>,
        cols: Option<Coord>,
        seed: Option<u64>,
    ) -> Result<()> {
        self.welcome()?;

        let rows = match rows {
            Some(rows) => rows,
            None => self.prompt_dimension("rows", MAX_ROWS, DEFAULT_ROWS)?,
        };
        let cols = match cols {
            Some(cols) => cols,
            None => self.prompt_dimension("columns", MAX_COLS, DEFAULT_COLS)?,
        };

        let config = GameConfig::from_size(rows, cols);
        let seed = seed.unwrap_or_else(seed_from_clock);
        log::info!(
            "Starting a {}x{} game with {} mines (seed {})",
            config.size.0,
            config.size.1,
            config.mines,
            seed
        );

        self.play(&mut Game::from_config(config, seed))
    }

    fn welcome(&mut self) -> Result<()> {
        write!(self.output, "{}", render::CLEAR_SCREEN)?;
        writeln!(self.output, "Welcome to Minesweeper!\n")?;
        writeln!(self.output, "To win, open all cells that are not mines.")?;
        writeln!(self.output, "Opening a mine or flagging a safe cell loses.")?;
        writeln!(self.output, "Good luck!\n")?;
        writeln!(self.output, "Press enter to continue...")?;
        self.output.flush()?;
        self.read_line()?;
        Ok(())
    }

    /// Asks for a board dimension, retrying a few times before giving
    /// up and using the default.
    fn prompt_dimension(&mut self, name: &str, max: Coord, default: Coord) -> Result<Coord> {
        for _ in 0..SETUP_ATTEMPTS {
            write!(
                self.output,
                "How many {name} would you like to play with? (1-{max}): "
            )?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else { break };
            match line.trim().parse::<Coord>() {
                Ok(value) if (1..=max).contains(&value) => return Ok(value),
                _ => writeln!(self.output, "Please enter a number between 1 and {max}")?,
            }
        }

        writeln!(self.output, "Defaulting to {default} {name}.")?;
        Ok(default)
    }

    fn play(&mut self, game: &mut Game) -> Result<()> {
        while !game.is_finished() {
            write!(self.output, "{}", render::CLEAR_SCREEN)?;
            write!(self.output, "{}", render::format_board(&game.view()))?;
            write!(
                self.output,
                "\nEnter row, column and action ('o' opens, 'f' flags), e.g. 2 3 o: "
            )?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                log::info!("Input closed, leaving the game");
                return Ok(());
            };

            // invalid input re-prompts without consuming an engine call
            match parse_turn(&line, game.size()) {
                Ok(turn) => {
                    if let Some(notice) = apply_turn(game, turn)? {
                        writeln!(self.output, "{notice}")?;
                    }
                }
                Err(message) => writeln!(self.output, "{message}")?,
            }
        }

        write!(self.output, "{}", render::format_board(&game.view()))?;
        let verdict = match game.state() {
            GameState::Won => "Congratulations! You won!",
            _ => "Game over.",
        };
        writeln!(self.output, "{verdict}")?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }
}

/// Runs one turn against the engine and picks the notice shown for it;
/// terminal verdicts are printed when the loop exits instead.
fn apply_turn(game: &mut Game, turn: Turn) -> Result<Option<&'static str>> {
    let notice = match turn.action {
        Action::Open => match game.open(turn.coords)? {
            OpenOutcome::AlreadyOpen => Some("Cell already opened."),
            OpenOutcome::Exploded => Some("You hit a mine!"),
            OpenOutcome::Opened | OpenOutcome::Won => None,
        },
        Action::Flag => match game.flag(turn.coords)? {
            FlagOutcome::AlreadyOpen => Some("Cell already opened."),
            FlagOutcome::AlreadyFlagged => Some("Cell already flagged."),
            FlagOutcome::WrongFlag => Some("You flagged a cell that doesn't have a mine."),
            FlagOutcome::Flagged => None,
        },
    };
    Ok(notice)
}

/// Parses a `row col action` turn line, 1-indexed at the user boundary.
fn parse_turn(line: &str, (rows, cols): Coord2) -> Result<Turn, String> {
    let mut parts = line.split_whitespace();
    let (Some(row), Some(col), Some(action), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err("Enter a row, a column and an action, e.g. 2 3 o".into());
    };

    let row =
        parse_index(row, rows).ok_or_else(|| format!("Row must be a number between 1 and {rows}"))?;
    let col = parse_index(col, cols)
        .ok_or_else(|| format!("Column must be a number between 1 and {cols}"))?;
    let action = match action {
        "o" => Action::Open,
        "f" => Action::Flag,
        other => return Err(format!("Unknown action '{other}', use 'o' to open or 'f' to flag")),
    };

    Ok(Turn {
        coords: (row, col),
        action,
    })
}

/// 1-indexed user input to a 0-indexed board coordinate.
fn parse_index(token: &str, limit: Coord) -> Option<Coord> {
    let value: Coord = token.parse().ok()?;
    (1..=limit).contains(&value).then(|| value - 1)
}

fn seed_from_clock() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}
