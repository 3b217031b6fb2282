//! Line ending helpers shared by the engine adapters

/// Newline sequence of the host platform
#[cfg(windows)]
pub const NEWLINE: &str = "\r\n";

/// Newline sequence of the host platform
#[cfg(not(windows))]
pub const NEWLINE: &str = "\n";

/// Rewrite every line ending (`\r\n` or `\n`) to the host convention
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n");
    if NEWLINE == "\n" {
        unified
    } else {
        unified.replace('\n', NEWLINE)
    }
}

/// Drop leading byte-order-mark characters
pub fn strip_bom(text: &str) -> &str {
    text.trim_start_matches('\u{FEFF}')
}
