//! Command-line parsing
//!
//! Simple positional parsing: an optional `--config <path>` anywhere, then a
//! subcommand and its arguments.

use crate::error::{Error, Result};

pub const USAGE: &str = "sessionctl [--config <path>] <command>

commands:
  login                               log in via the hosted login page
  store <id_token> [refresh_token]    persist tokens obtained elsewhere
  profile                             restore the session and print the profile
  refresh                             force a token renewal
  status                              show what is stored (no network)
  roles                               print the user's roles
  logout                              wipe every stored secret";

/// A parsed subcommand.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Login,
    Store {
        id_token: String,
        refresh_token: Option<String>,
    },
    Profile,
    Refresh,
    Status,
    Roles,
    Logout,
}

/// Parsed invocation.
#[derive(Debug, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: Option<String>,
    pub command: Command,
}

impl Invocation {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut config_path = None;
        let mut rest = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--config" {
                let path = iter
                    .next()
                    .ok_or_else(|| Error::Usage("--config requires a path".into()))?;
                config_path = Some(path.clone());
            } else {
                rest.push(arg.as_str());
            }
        }

        let command = match rest.as_slice() {
            ["login"] => Command::Login,
            ["store", id_token] => Command::Store {
                id_token: id_token.to_string(),
                refresh_token: None,
            },
            ["store", id_token, refresh_token] => Command::Store {
                id_token: id_token.to_string(),
                refresh_token: Some(refresh_token.to_string()),
            },
            ["profile"] => Command::Profile,
            ["refresh"] => Command::Refresh,
            ["status"] => Command::Status,
            ["roles"] => Command::Roles,
            ["logout"] => Command::Logout,
            [] => return Err(Error::Usage("missing command".into())),
            [other, ..] => {
                return Err(Error::Usage(format!(
                    "unknown command or arguments: {other}"
                )));
            }
        };

        Ok(Self {
            config_path,
            command,
        })
    }
}
