//! Terminal implementations of the consent and navigation collaborators.

use std::io::{BufRead, Write};

use async_trait::async_trait;
use recon_flow::{ConsentError, ConsentPrompt, NavigationError, Navigator};
use url::Url;

/// How the `run` subcommand answers the consent prompt.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsentMode {
    /// Ask on the terminal.
    #[default]
    Prompt,
    /// Always consent.
    Accept,
    /// Always decline.
    Decline,
}

/// Asks the reader on stderr and reads the answer from stdin.
#[derive(Debug, Clone, Default)]
pub struct TerminalConsent;

#[async_trait]
impl ConsentPrompt for TerminalConsent {
    async fn consent_deferred_account_creation(&self) -> Result<bool, ConsentError> {
        tokio::task::spawn_blocking(|| {
            let stdin = std::io::stdin();
            ask(&mut stdin.lock(), &mut std::io::stderr())
        })
        .await
        .map_err(|e| ConsentError::Failed(e.to_string()))?
    }
}

/// Pre-decided answer, for scripted runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedConsent(pub bool);

#[async_trait]
impl ConsentPrompt for FixedConsent {
    async fn consent_deferred_account_creation(&self) -> Result<bool, ConsentError> {
        tracing::debug!(granted = self.0, "consent answered by flag");
        Ok(self.0)
    }
}

/// Prints the redirect target on stdout.
#[derive(Debug, Clone, Default)]
pub struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate_to(&self, url: &Url) -> Result<(), NavigationError> {
        let mut out = std::io::stdout();
        writeln!(out, "redirect: {url}").map_err(|e| NavigationError {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

fn ask(input: &mut impl BufRead, output: &mut impl Write) -> Result<bool, ConsentError> {
    loop {
        write!(
            output,
            "No publisher account is linked to this entitlement. Create one now? [y/N] "
        )
        .and_then(|_| output.flush())
        .map_err(|e| ConsentError::Failed(e.to_string()))?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|e| ConsentError::Failed(e.to_string()))?;
        if read == 0 {
            return Err(ConsentError::Unavailable("stdin closed".into()));
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "" | "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(input: &str) -> Result<bool, ConsentError> {
        let mut out = Vec::new();
        ask(&mut input.as_bytes(), &mut out)
    }

    #[test]
    fn yes_variants_accept() {
        assert!(answer("y\n").unwrap());
        assert!(answer("YES\n").unwrap());
    }

    #[test]
    fn empty_and_no_decline() {
        assert!(!answer("\n").unwrap());
        assert!(!answer("no\n").unwrap());
    }

    #[test]
    fn reprompts_on_garbage() {
        let mut out = Vec::new();
        assert!(ask(&mut "maybe\ny\n".as_bytes(), &mut out).unwrap());
        let shown = String::from_utf8(out).unwrap();
        assert_eq!(shown.matches("[y/N]").count(), 2);
    }

    #[test]
    fn closed_stdin_is_unavailable() {
        assert!(matches!(answer(""), Err(ConsentError::Unavailable(_))));
    }

    #[tokio::test]
    async fn fixed_consent_returns_flag() {
        assert!(FixedConsent(true).consent_deferred_account_creation().await.unwrap());
        assert!(!FixedConsent(false).consent_deferred_account_creation().await.unwrap());
    }
}
