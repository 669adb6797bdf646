//! Completion audio cue

use std::{io::Write, thread, time::Duration};
use thiserror::Error;
use tracing::warn;

/// One bell of the cue, held for `duration_ms` before the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub duration_ms: u64,
}

/// Two short bells and a long one, played when a focus session completes
pub const COMPLETION_CHIME: [Tone; 3] = [
    Tone { duration_ms: 150 },
    Tone { duration_ms: 150 },
    Tone { duration_ms: 300 },
];

#[derive(Debug, Error)]
pub enum ChimeError {
    #[error("audio output unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
}

/// Best-effort audio cue; callers log and ignore failures
pub trait Chime: Send + Sync {
    fn play(&self) -> Result<(), ChimeError>;
}

/// Write one BEL per tone, waiting out each tone's duration after it
fn ring<W: Write>(
    out: &mut W,
    tones: &[Tone],
    mut wait: impl FnMut(Duration),
) -> std::io::Result<()> {
    for tone in tones {
        out.write_all(b"\x07")?;
        out.flush()?;
        wait(Duration::from_millis(tone.duration_ms));
    }
    Ok(())
}

/// Rings the terminal bell for each tone of [`COMPLETION_CHIME`] on a
/// background thread
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&self) -> Result<(), ChimeError> {
        thread::Builder::new().name("chime".into()).spawn(|| {
            let mut out = std::io::stderr();
            if let Err(e) = ring(&mut out, &COMPLETION_CHIME, thread::sleep) {
                warn!("Terminal bell failed: {}", e);
            }
        })?;
        Ok(())
    }
}

/// Plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentChime;

impl Chime for SilentChime {
    fn play(&self) -> Result<(), ChimeError> {
        Ok(())
    }
}
