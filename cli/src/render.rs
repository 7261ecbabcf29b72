use minado_core::BoardView;

/// Cursor-home plus clear-screen, printed before each turn.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// Framed text grid with the header and counters: a column-index row,
/// `--+` separator lines, and 2-wide cells of display symbols, rows and
/// columns labeled 1-indexed.
pub fn format_board(view: &BoardView) -> String {
    let (_, cols) = view.size;
    let mut out = String::new();

    out.push_str("Minesweeper+\n\n");
    out.push_str("To win: flag every mine, or open every cell that is not a mine.\n");
    out.push_str("You lose if you open a mine or flag a cell without one.\n\n");
    out.push_str(&format!(
        "Remaining unopened cells: {}\n",
        view.remaining_unopened
    ));
    out.push_str(&format!("Remaining mines: {}\n\n", view.remaining_mines));

    out.push_str("   ");
    for col in 0..cols {
        out.push_str(&format!("{:2} ", col + 1));
    }
    out.push('\n');

    let separator = {
        let mut line = String::from("  +");
        for _ in 0..cols {
            line.push_str("--+");
        }
        line.push('\n');
        line
    };

    out.push_str(&separator);
    for (row, symbols) in view.symbols.iter().enumerate() {
        out.push_str(&format!("{:2}|", row + 1));
        for &symbol in symbols {
            out.push_str(&format!("{:>2}|", symbol));
        }
        out.push('\n');
        out.push_str(&separator);
    }

    out
}
