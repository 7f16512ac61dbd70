//! Handlers for `svara auth`.

use std::io::{BufRead, Write};

use svara_auth::{AuthProvider, Credentials, SignUpOutcome};

use crate::cli::AuthAction;
use crate::error::Result;

/// Where a password comes from when `--password` is not given.
pub enum PasswordSource<'a> {
    /// Prompt on the terminal with echo turned off.
    Terminal,
    /// Read one line, for piped input.
    Lines(&'a mut dyn BufRead),
}

impl PasswordSource<'_> {
    fn read(&mut self) -> Result<String> {
        match self {
            Self::Terminal => Ok(rpassword::prompt_password("Password: ")?),
            Self::Lines(input) => {
                let mut line = String::new();
                input.read_line(&mut line)?;
                Ok(line.trim_end_matches(['\r', '\n']).to_string())
            }
        }
    }
}

/// Dispatches a `svara auth` action.
pub async fn handle_auth_command(
    auth: &dyn AuthProvider,
    action: AuthAction,
    mut passwords: PasswordSource<'_>,
    out: &mut dyn Write,
) -> Result<()> {
    match action {
        AuthAction::SignIn { email, password } => {
            let password = password_or_prompt(password, &mut passwords)?;
            let session = auth.sign_in(&Credentials::new(email, password)).await?;
            writeln!(out, "Signed in as {}", session.user.email)?;
        }
        AuthAction::SignUp { email, password } => {
            let password = password_or_prompt(password, &mut passwords)?;
            match auth.sign_up(&Credentials::new(email, password)).await? {
                SignUpOutcome::SignedIn(session) => {
                    writeln!(out, "Account created, signed in as {}", session.user.email)?;
                }
                SignUpOutcome::ConfirmationPending { email } => {
                    writeln!(
                        out,
                        "Account created. Open the confirmation link sent to {email}, then sign in."
                    )?;
                }
            }
        }
        AuthAction::SignOut => {
            auth.sign_out().await?;
            writeln!(out, "Signed out")?;
        }
        AuthAction::Status => match auth.current_session().await? {
            Some(session) => writeln!(
                out,
                "Signed in as {} (token valid until {})",
                session.user.email,
                session.expires_at.format("%Y-%m-%d %H:%M UTC")
            )?,
            None => writeln!(out, "Not signed in")?,
        },
    }
    Ok(())
}

fn password_or_prompt(password: Option<String>, source: &mut PasswordSource<'_>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => source.read(),
    }
}
