use editor_state::document::{Document, ViewSize, TAB_SIZE};

use crate::screen::Screen;

/// Paints one text line starting at byte `pos`: tabs expanded, the part
/// left of the horizontal margin skipped, and any selected span shown in
/// reverse video. `fullline` appends the newline used by the full-screen
/// repaint.
pub fn display_line(
    screen: &mut Screen,
    doc: &Document,
    view: ViewSize,
    mut pos: usize,
    fullline: bool,
) -> std::io::Result<()> {
    let (selstart, selend) = doc.selection().unwrap_or((usize::MAX, usize::MAX));
    let maxcol = view.cols + doc.margin;
    let mut margin = doc.margin;
    let mut col = 0;
    let mut hilite = false;
    let mut chunk: Vec<u8> = Vec::with_capacity(view.cols);

    while col < maxcol {
        if margin == 0 {
            if !hilite && pos >= selstart && pos < selend {
                screen.put_bytes(&chunk)?;
                chunk.clear();
                screen.select_style()?;
                hilite = true;
            } else if hilite && pos >= selend {
                screen.put_bytes(&chunk)?;
                chunk.clear();
                screen.text_style()?;
                hilite = false;
            }
        }

        let Some(ch) = doc.buf.get(pos) else {
            break;
        };
        if ch == b'\r' || ch == b'\n' {
            break;
        }

        if ch == b'\t' {
            let mut spaces = TAB_SIZE - col % TAB_SIZE;
            while spaces > 0 && col < maxcol {
                if margin > 0 {
                    margin -= 1;
                } else {
                    chunk.push(b' ');
                }
                col += 1;
                spaces -= 1;
            }
        } else {
            if margin > 0 {
                margin -= 1;
            } else {
                chunk.push(ch);
            }
            col += 1;
        }

        pos += 1;
    }

    if hilite {
        // Flood the selected tail so multi-line selections read as a block.
        while col < maxcol {
            chunk.push(b' ');
            col += 1;
        }
    } else if col == margin {
        chunk.push(b' ');
    }
    screen.put_bytes(&chunk)?;

    if col < maxcol {
        screen.clear_to_eol()?;
        if fullline {
            screen.put("\r\n")?;
        }
    }

    if hilite {
        screen.text_style()?;
    }
    Ok(())
}

/// Full repaint of the text area from the top visible line down.
pub fn draw_screen(
    screen: &mut Screen,
    doc: &Document,
    view: ViewSize,
) -> std::io::Result<()> {
    screen.goto(0, 0)?;
    screen.text_style()?;

    let mut pos = Some(doc.top_pos);
    for _ in 0..view.rows {
        match pos {
            None => {
                screen.clear_to_eol()?;
                screen.put("\r\n")?;
            }
            Some(p) => {
                display_line(screen, doc, view, p, true)?;
                pos = doc.next_line(p);
            }
        }
    }
    Ok(())
}

/// Repaints only the line the cursor is on.
pub fn update_line(
    screen: &mut Screen,
    doc: &Document,
    view: ViewSize,
) -> std::io::Result<()> {
    screen.goto(0, doc.line - doc.top_line)?;
    display_line(screen, doc, view, doc.line_pos, false)
}

/// Filename, dirty marker and cursor coordinates on the bottom row.
pub fn draw_statusline(
    screen: &mut Screen,
    doc: &Document,
    view: ViewSize,
) -> std::io::Result<()> {
    screen.goto(0, view.rows)?;
    screen.status_style()?;

    let namewidth = view.cols.saturating_sub(19);
    let text = format!(
        "{:<w$.w$}{} Ln {:<6}Col {:<4}",
        doc.name(),
        if doc.dirty { '*' } else { ' ' },
        doc.line + 1,
        doc.visual_col(doc.line_pos, doc.col) + 1,
        w = namewidth
    );
    screen.put(&text)?;
    screen.clear_to_eol()?;
    screen.text_style()
}

/// Parks the terminal cursor on the document cursor.
pub fn position_cursor(screen: &mut Screen, doc: &Document) -> std::io::Result<()> {
    let col = doc.visual_col(doc.line_pos, doc.col);
    screen.goto(col.saturating_sub(doc.margin), doc.line - doc.top_line)
}
