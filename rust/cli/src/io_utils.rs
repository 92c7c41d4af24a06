//! Line input for interactive commands.

use std::io::BufRead;

/// Reads one line from `stdin`, trimmed.
///
/// Returns `None` on EOF or a read error, which interactive commands treat
/// as the player leaving.
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// # use pairs_cli::io_utils::read_stdin_line;
///
/// let mut input = Cursor::new(" 17 \n");
/// assert_eq!(read_stdin_line(&mut input).as_deref(), Some("17"));
/// assert_eq!(read_stdin_line(&mut input), None);
/// ```
pub fn read_stdin_line(stdin: &mut dyn BufRead) -> Option<String> {
    let mut line = String::new();
    match stdin.read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}
