use arboard::Clipboard;

use crate::core::Cmd;

/// Copies `text` to the system clipboard. `what` names the copied value in
/// the command's status label.
pub fn copy_to_clipboard<M: Send + 'static>(
    text: impl Into<String>,
    what: &str,
    on_ok: impl FnOnce(()) -> M + Send + 'static,
    on_err: impl FnOnce(String) -> M + Send + 'static,
) -> Cmd<M> {
    Cmd::attempt(
        format!("Copying {what}"),
        |text: String| async move {
            let mut clipboard = Clipboard::new()?;
            clipboard.set_text(text)
        },
        text.into(),
        on_ok,
        on_err,
    )
}
