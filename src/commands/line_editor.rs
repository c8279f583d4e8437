//! Line editor shared by the login prompts and the chat loop
//!
//! The editor carries a [`MaskingHelper`] that can hide what is typed. It is
//! switched on only while a password is being read.

use std::borrow::Cow;

use rustyline::config::Configurer;
use rustyline::highlight::Highlighter;
use rustyline::history::DefaultHistory;
use rustyline::{ColorMode, Editor};
use rustyline::{Completer, Helper, Hinter, Validator};

use crate::error::Result;

/// Character shown in place of each typed password character
pub const MASK_CHAR: char = '*';

/// rustyline editor with password masking support
pub type LineEditor = Editor<MaskingHelper, DefaultHistory>;

/// Highlighter that replaces the line with [`MASK_CHAR`] while masking
#[derive(Debug, Default, Completer, Helper, Hinter, Validator)]
pub struct MaskingHelper {
    masking: bool,
}

impl MaskingHelper {
    /// Returns `true` while input is being hidden
    pub fn is_masking(&self) -> bool {
        self.masking
    }
}

impl Highlighter for MaskingHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Cow::Owned(MASK_CHAR.to_string().repeat(line.chars().count()))
        } else {
            Cow::Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.masking
    }
}

/// Creates an editor with masking available but off
pub fn new_editor() -> Result<LineEditor> {
    let mut rl = LineEditor::new()?;
    rl.set_helper(Some(MaskingHelper::default()));
    Ok(rl)
}

/// Reads one line, trimming the trailing newline only
pub fn prompt_line(rl: &mut LineEditor, prompt: &str) -> Result<String> {
    let line = rl.readline(prompt)?;
    Ok(trim_newline(&line))
}

/// Reads one line with the typed characters masked
///
/// Masking and cursor visibility are restored whether or not the read
/// succeeds. Nothing is added to the history.
pub fn prompt_password(rl: &mut LineEditor, prompt: &str) -> Result<String> {
    set_masking(rl, true);
    rl.set_color_mode(ColorMode::Forced);
    let cursor = rl.set_cursor_visibility(false);

    let line = rl.readline(prompt);

    drop(cursor);
    rl.set_color_mode(ColorMode::Enabled);
    set_masking(rl, false);
    Ok(trim_newline(&line?))
}

fn set_masking(rl: &mut LineEditor, masking: bool) {
    if let Some(helper) = rl.helper_mut() {
        helper.masking = masking;
    }
}

fn trim_newline(line: &str) -> String {
    line.trim_end_matches(&['\r', '\n'][..]).to_string()
}
