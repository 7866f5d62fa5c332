use std::io::Write;

/// Destination for the text a command prints as its result.
///
/// Diagnostics go through `log` instead, so this is the only stream a command writes to. The
/// binary hands in stdout; tests pass a `Vec<u8>` and read it back.
pub trait Host: Send + Sync {
    fn output(&mut self) -> impl Write;
}

impl Host for Vec<u8> {
    fn output(&mut self) -> impl Write {
        self
    }
}
