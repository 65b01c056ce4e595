use super::scheduler::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, timeout or protocol failure on an outbound call.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The command cannot be turned into a request, e.g. an id-dependent
    /// command with no known id.
    #[error("command {0} not supported")]
    UnsupportedCommand(Command),
}

/// Renders an error and every nested cause, one per line.
///
/// ```text
/// error sending request for url (http://localhost:5000/api/values)
///
/// === Details ===
/// client error (Connect)
/// tcp connect error: Connection refused (os error 111)
/// ```
pub fn render_error_chain(error: &anyhow::Error) -> String {
    let mut text = error.to_string();
    let mut causes = error.chain().skip(1).peekable();

    if causes.peek().is_some() {
        text.push_str("\n\n=== Details ===");
        for cause in causes {
            text.push('\n');
            text.push_str(&cause.to_string());
        }
    }

    text
}
