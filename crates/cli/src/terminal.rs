//! Confirm/notify capabilities backed by the terminal.

use std::io::{BufRead, Write};

use supplydesk_console::{Confirm, NotificationKind, Notify};

/// Asks on stderr and reads the answer from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}

#[async_trait::async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || {
            let mut stderr = std::io::stderr();
            let _ = write!(stderr, "{prompt} [y/N] ");
            let _ = stderr.flush();
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => is_yes(&line),
            _ => false,
        }
    }
}

/// Prints outcomes on stdout and mirrors them into the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notify for TerminalNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        println!("{kind}: {message}");
        tracing::debug!(%kind, %message, "notification shown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_english_and_spanish_yes() {
        for answer in ["y", "YES\n", " s ", "sí"] {
            assert!(is_yes(answer), "{answer:?}");
        }
        for answer in ["", "n", "no", "nope"] {
            assert!(!is_yes(answer), "{answer:?}");
        }
    }
}
