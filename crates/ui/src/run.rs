use editor_core::key::Key;
use editor_state::workspace::Workspace;

use crate::help;
use crate::input::{self, Input};
use crate::prompt;
use crate::render;
use crate::screen::Screen;

/// Runtime switches for the main loop.
#[derive(Debug, Default)]
pub struct Options {
    /// Pager mode: every mutating binding is disabled and Esc exits.
    pub view_only: bool,
}

enum Flow {
    Continue,
    Quit,
}

/// The editor loop: repaint per the document's redraw flags, park the
/// cursor, block for a key, dispatch. Runs until quit is confirmed or the
/// workspace empties.
///
/// # Errors
///
/// Returns an error only for terminal I/O failures; every editing error is
/// reported on the status bar instead.
pub fn run(ws: &mut Workspace, options: &Options) -> std::io::Result<()> {
    let mut screen = Screen::new()?;
    ws.view = screen.size()?;
    if let Some(doc) = ws.current_mut() {
        doc.refresh = true;
    }

    let mut status: Option<String> = None;
    loop {
        if ws.current().is_none() {
            break;
        }
        draw(&mut screen, ws, status.as_deref())?;

        let input = input::read_input()?;
        status = None;
        match input {
            Input::Resize => {
                ws.view = screen.size()?;
                if let Some(doc) = ws.current_mut() {
                    doc.refresh = true;
                }
            }
            Input::Key(key) => match dispatch(&mut screen, ws, options, key, &mut status)? {
                Flow::Continue => {}
                Flow::Quit => {
                    if confirm_quit(&mut screen, ws)? {
                        break;
                    }
                    if let Some(doc) = ws.current_mut() {
                        doc.refresh = true;
                    }
                }
            },
        }
    }

    screen.shutdown(ws.view)
}

/// One repaint pass: full screen, single line, or status bar only,
/// whichever the last operation asked for. A pending status message
/// overrides the status bar until the next keystroke.
fn draw(screen: &mut Screen, ws: &mut Workspace, status: Option<&str>) -> std::io::Result<()> {
    let view = ws.view;
    let Some(doc) = ws.current_mut() else {
        return Ok(());
    };

    if doc.refresh {
        render::draw_screen(screen, doc, view)?;
        render::draw_statusline(screen, doc, view)?;
        doc.refresh = false;
        doc.lineupdate = false;
    } else if doc.lineupdate {
        render::update_line(screen, doc, view)?;
        doc.lineupdate = false;
        render::draw_statusline(screen, doc, view)?;
    } else {
        render::draw_statusline(screen, doc, view)?;
    }

    if let Some(text) = status {
        prompt::message(screen, view, text)?;
    }

    render::position_cursor(screen, doc)?;
    screen.flush()
}

/// Buffer errors become status-bar messages; nothing else escapes a
/// dispatch.
fn report(status: &mut Option<String>, result: editor_core::errors::BufferResult<()>) {
    if let Err(e) = result {
        *status = Some(e.to_string());
    }
}

fn dispatch(
    screen: &mut Screen,
    ws: &mut Workspace,
    options: &Options,
    key: Key,
    status: &mut Option<String>,
) -> std::io::Result<Flow> {
    let view = ws.view;
    let edit_ok = !options.view_only;

    // Workspace-level commands first.
    match key {
        Key::Escape if options.view_only => return Ok(Flow::Quit),
        Key::Ctrl('q') => return Ok(Flow::Quit),
        Key::BackTab => {
            ws.next_file();
            return Ok(Flow::Continue);
        }
        Key::CtrlTab => {
            ws.prev_file();
            return Ok(Flow::Continue);
        }
        Key::Ctrl('c') => {
            ws.copy_selection();
            return Ok(Flow::Continue);
        }
        Key::Ctrl('x') if edit_ok => {
            report(status, ws.cut_selection());
            return Ok(Flow::Continue);
        }
        Key::Ctrl('v') if edit_ok => {
            report(status, ws.paste());
            return Ok(Flow::Continue);
        }
        Key::Ctrl('f') => return find_text(screen, ws, false).map(|()| Flow::Continue),
        Key::Ctrl('g') => return find_text(screen, ws, true).map(|()| Flow::Continue),
        Key::Ctrl('l') => return goto_line(screen, ws).map(|()| Flow::Continue),
        Key::Ctrl('o') if edit_ok => return open_file(screen, ws, status).map(|()| Flow::Continue),
        Key::Ctrl('n') if edit_ok => {
            report(status, ws.new_untitled());
            return Ok(Flow::Continue);
        }
        Key::Ctrl('w') if edit_ok => {
            return close_file(screen, ws, status).map(|()| Flow::Continue);
        }
        Key::Ctrl('s') if edit_ok => return save_file(screen, ws, status).map(|()| Flow::Continue),
        Key::Ctrl('p') if edit_ok => {
            return pipe_command(screen, ws, status).map(|()| Flow::Continue);
        }
        Key::F(3) | Key::Ctrl('u') => return jump_to_file(screen, ws).map(|()| Flow::Continue),
        Key::F(1) | Key::Ctrl('y') => {
            help::show(screen, view)?;
            if let Some(doc) = ws.current_mut() {
                doc.refresh = true;
            }
            return Ok(Flow::Continue);
        }
        Key::F(5) => {
            ws.view = screen.size()?;
            if let Some(doc) = ws.current_mut() {
                doc.refresh = true;
            }
            return Ok(Flow::Continue);
        }
        _ => {}
    }

    // Everything else acts on the current document.
    let Some(doc) = ws.current_mut() else {
        return Ok(Flow::Continue);
    };
    match key {
        Key::Char(ch) if edit_ok => report(status, doc.insert_char(ch, view)),
        Key::Tab if edit_ok => report(status, doc.insert_char(b'\t', view)),
        Key::Enter if edit_ok => report(status, doc.newline(view)),
        Key::Backspace if edit_ok => report(status, doc.backspace(view)),
        Key::Delete if edit_ok => report(status, doc.del(view)),
        Key::Ctrl('z') if edit_ok => report(status, doc.undo(view)),
        Key::Ctrl('r') if edit_ok => report(status, doc.redo(view)),
        Key::Ctrl('a') => doc.select_all(view),
        Key::Ctrl('t') => doc.top(false),
        Key::Ctrl('b') => doc.bottom(false, view),
        Key::Up(m) => {
            if m.ctrl {
                doc.top(m.shift);
            } else {
                doc.up(m.shift, view);
            }
        }
        Key::Down(m) => {
            if m.ctrl {
                doc.bottom(m.shift, view);
            } else {
                doc.down(m.shift, view);
            }
        }
        Key::Left(m) => {
            if m.ctrl {
                doc.word_left(m.shift, view);
            } else {
                doc.left(m.shift, view);
            }
        }
        Key::Right(m) => {
            if m.ctrl {
                doc.word_right(m.shift, view);
            } else {
                doc.right(m.shift, view);
            }
        }
        Key::Home(m) => {
            if m.ctrl {
                doc.top(m.shift);
            } else {
                doc.home(m.shift, view);
            }
        }
        Key::End(m) => {
            if m.ctrl {
                doc.bottom(m.shift, view);
            } else {
                doc.end(m.shift, view);
            }
        }
        Key::PageUp(m) => doc.page_up(m.shift, view),
        Key::PageDown(m) => doc.page_down(m.shift, view),
        // Anything unbound is silently ignored.
        _ => {}
    }

    Ok(Flow::Continue)
}

/*

==================================
====== PROMPTED COMMANDS =========
==================================

*/

fn open_file(
    screen: &mut Screen,
    ws: &mut Workspace,
    status: &mut Option<String>,
) -> std::io::Result<()> {
    let view = ws.view;
    let answer = match ws.current() {
        Some(doc) => prompt::prompt(screen, doc, view, "Open file: ")?,
        None => None,
    };
    if let Some(doc) = ws.current_mut() {
        doc.refresh = true;
    }

    let Some(name) = answer else {
        return Ok(());
    };
    if let Err(e) = ws.open(std::path::Path::new(&name)) {
        *status = Some(format!(
            "Error {} opening {} ({})",
            e.raw_os_error().unwrap_or(0),
            name,
            e
        ));
    } else if let Some(doc) = ws.current_mut() {
        doc.refresh = true;
    }
    Ok(())
}

fn save_file(
    screen: &mut Screen,
    ws: &mut Workspace,
    status: &mut Option<String>,
) -> std::io::Result<()> {
    let view = ws.view;
    let Some(doc) = ws.current_mut() else {
        return Ok(());
    };
    if !doc.dirty && !doc.new_file {
        return Ok(());
    }

    if doc.new_file {
        let Some(name) = prompt::prompt(screen, doc, view, "Save as: ")? else {
            doc.refresh = true;
            return Ok(());
        };
        if std::path::Path::new(&name).exists()
            && !prompt::ask(screen, view, &format!("Overwrite {name} (y/n)? "))?
        {
            doc.refresh = true;
            return Ok(());
        }
        doc.filename = std::path::PathBuf::from(name);
        doc.new_file = false;
    }

    if let Err(e) = doc.save() {
        *status = Some(format!(
            "Error {} saving document ({})",
            e.raw_os_error().unwrap_or(0),
            e
        ));
    }
    doc.refresh = true;
    Ok(())
}

fn close_file(
    screen: &mut Screen,
    ws: &mut Workspace,
    status: &mut Option<String>,
) -> std::io::Result<()> {
    let view = ws.view;
    if let Some(doc) = ws.current() {
        if doc.dirty {
            let msg = format!("Close {} without saving changes (y/n)? ", doc.name());
            if !prompt::ask(screen, view, &msg)? {
                if let Some(doc) = ws.current_mut() {
                    doc.refresh = true;
                }
                return Ok(());
            }
        }
    }

    ws.close_current();
    if ws.current().is_none() {
        report(status, ws.new_untitled());
    }
    if let Some(doc) = ws.current_mut() {
        doc.refresh = true;
    }
    Ok(())
}

fn find_text(screen: &mut Screen, ws: &mut Workspace, next: bool) -> std::io::Result<()> {
    let view = ws.view;
    if !next {
        let answer = match ws.current() {
            Some(doc) => prompt::prompt(screen, doc, view, "Find: ")?,
            None => None,
        };
        match answer {
            Some(text) => ws.search = Some(text),
            None => {
                if let Some(doc) = ws.current_mut() {
                    doc.refresh = true;
                }
                return Ok(());
            }
        }
    }

    let Some(needle) = ws.search.clone() else {
        return Ok(());
    };
    if let Some(doc) = ws.current_mut() {
        if !doc.find_next(needle.as_bytes(), view) {
            screen.bell()?;
        }
    }
    Ok(())
}

fn goto_line(screen: &mut Screen, ws: &mut Workspace) -> std::io::Result<()> {
    let view = ws.view;
    if let Some(doc) = ws.current_mut() {
        doc.anchor = None;
    }
    let answer = match ws.current() {
        Some(doc) => prompt::prompt(screen, doc, view, "Goto line: ")?,
        None => None,
    };

    if let Some(doc) = ws.current_mut() {
        doc.refresh = true;
        if let Some(text) = answer {
            // Leading digits only, like atoi; anything else means line 0.
            let lineno = text
                .trim()
                .bytes()
                .take_while(u8::is_ascii_digit)
                .fold(0usize, |n, d| n * 10 + usize::from(d - b'0'));
            if !doc.goto_line(lineno, view) {
                screen.bell()?;
            }
        }
    }
    Ok(())
}

fn jump_to_file(screen: &mut Screen, ws: &mut Workspace) -> std::io::Result<()> {
    let view = ws.view;
    let Some((name, lineno)) = ws
        .current()
        .and_then(editor_state::document::Document::jump_target)
    else {
        return Ok(());
    };

    if ws.open(std::path::Path::new(&name)).is_err() {
        screen.bell()?;
    } else if lineno > 0 {
        if let Some(doc) = ws.current_mut() {
            doc.goto_line(lineno, view);
        }
    }

    if let Some(doc) = ws.current_mut() {
        doc.refresh = true;
    }
    Ok(())
}

fn pipe_command(
    screen: &mut Screen,
    ws: &mut Workspace,
    status: &mut Option<String>,
) -> std::io::Result<()> {
    let view = ws.view;
    let answer = match ws.current() {
        Some(doc) => prompt::prompt(screen, doc, view, "Command: ")?,
        None => None,
    };
    let Some(cmdline) = answer else {
        if let Some(doc) = ws.current_mut() {
            doc.refresh = true;
        }
        return Ok(());
    };

    tracing::debug!(command = %cmdline, "piping shell output into buffer");
    match std::process::Command::new("sh")
        .arg("-c")
        .arg(&cmdline)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .spawn()
    {
        Err(e) => {
            *status = Some(format!(
                "Error {} running command ({})",
                e.raw_os_error().unwrap_or(0),
                e
            ));
        }
        Ok(mut child) => {
            if let Some(doc) = ws.current_mut() {
                report(status, doc.erase_selection(view).map(|_| ()));
                let mut pos = doc.pos();
                if let Some(mut out) = child.stdout.take() {
                    let mut chunk = [0u8; 512];
                    loop {
                        match std::io::Read::read(&mut out, &mut chunk) {
                            Ok(0) | Err(_) => break,
                            Ok(n) => {
                                if doc.insert(pos, &chunk[..n]).is_err() {
                                    break;
                                }
                                pos += n;
                            }
                        }
                    }
                }
                doc.moveto(pos, false, view);
            }
            let _ = child.wait();
        }
    }

    if let Some(doc) = ws.current_mut() {
        doc.refresh = true;
    }
    Ok(())
}

/// Walks every open document and asks about each one with unsaved changes;
/// any refusal cancels the quit.
fn confirm_quit(screen: &mut Screen, ws: &Workspace) -> std::io::Result<bool> {
    let view = ws.view;
    for doc in ws.docs() {
        if doc.dirty {
            let msg = format!("Close {} without saving changes (y/n)? ", doc.name());
            if !prompt::ask(screen, view, &msg)? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
