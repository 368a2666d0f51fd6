//! Shareable summary text and best-effort clipboard copy.

use std::io::{IsTerminal, Write};

use base64::Engine;

use crate::analysis::AnalysisResult;

pub const DISCLAIMER: &str = "DISCLAIMER: This is a safety verification using AI research, not medical advice. Always consult a qualified physician before beginning any traditional or alternative treatment.";

/// Chat-friendly verdict block (WhatsApp-style `*bold*` / `_italic_` markup).
pub fn share_text(result: &AnalysisResult) -> String {
    format!(
        "*Remedy Check Result*\n\n*Verdict:* {}\n\n*English:* {}\n\n*Local:* {}\n\n_Verification by Remedy Check_",
        result.verdict.safety_rating,
        result.multilingual_summary.english,
        result.multilingual_summary.local,
    )
}

/// Where a copied summary ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Placed on the system clipboard.
    Clipboard,
    /// Handed to the terminal as an OSC 52 request. Terminals without
    /// support ignore it, so delivery is not confirmed.
    Terminal,
    /// No clipboard and stdout is not a terminal.
    Unavailable,
}

/// Copy `text` to the system clipboard, falling back to OSC 52 when there
/// is no display server and stdout is an interactive terminal.
pub fn copy_to_clipboard(text: &str) -> CopyOutcome {
    let stdout = std::io::stdout();
    let mut terminal = stdout.is_terminal().then(|| stdout.lock());
    copy_with(
        text,
        |text| {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.set_text(text.to_owned())
        },
        terminal.as_mut().map(|t| t as &mut dyn Write),
    )
}

fn copy_with(
    text: &str,
    native: impl FnOnce(&str) -> Result<(), arboard::Error>,
    terminal: Option<&mut dyn Write>,
) -> CopyOutcome {
    match native(text) {
        Ok(()) => return CopyOutcome::Clipboard,
        Err(err) => tracing::debug!(error = %err, "system clipboard unavailable"),
    }
    let Some(terminal) = terminal else {
        return CopyOutcome::Unavailable;
    };
    let written = terminal
        .write_all(osc52_sequence(text).as_bytes())
        .and_then(|()| terminal.flush());
    match written {
        Ok(()) => CopyOutcome::Terminal,
        Err(err) => {
            tracing::debug!(error = %err, "OSC 52 write failed");
            CopyOutcome::Unavailable
        }
    }
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{}\x07", encoded)
}
