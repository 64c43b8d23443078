//! The credential table backing mailbox lookups.
//!
//! Accounts are loaded once at startup from a newline-delimited source where
//! each line is `email|password|refresh_token|client_id`. The table is
//! read-only for the lifetime of the process, so handlers can share it
//! without locking.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use tracing::warn;

/// Stored OAuth2 credentials for a single mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Mailbox password as it appears in the source file. Carried along but
    /// never used; the account list format predates the refresh-token flow.
    pub password: String,
    /// Long-lived token exchanged for access tokens.
    pub refresh_token: String,
    /// OAuth2 application id the refresh token was issued to.
    pub client_id: String,
}

/// Errors raised while loading the account source.
#[derive(Debug, thiserror::Error)]
pub enum AccountsError {
    /// The account source file could not be read.
    #[error("failed to read account file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// In-memory account table keyed by lowercased email address.
///
/// Keys are lowercased verbatim at load time; `+`-tag stripping happens at
/// lookup time via [`crate::normalize_email`], not here.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: HashMap<String, Account>,
}

impl AccountStore {
    /// Loads the account table from a file, one account per line.
    ///
    /// # Errors
    ///
    /// Returns [`AccountsError::Read`] if the file cannot be opened or a line
    /// cannot be read. Malformed lines are not errors; they are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AccountsError> {
        let path = path.as_ref();
        let read_err = |source| AccountsError::Read {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(read_err)?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;

        Ok(Self::parse(lines.iter().map(String::as_str)))
    }

    /// Builds the table from raw account lines.
    ///
    /// A line is accepted only if it contains a `|` separator and splits into
    /// exactly four fields (`email|password|refresh_token|client_id`);
    /// anything else is skipped with a warning. Later lines win on duplicate
    /// emails.
    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut accounts = HashMap::new();

        for (number, line) in lines.into_iter().enumerate() {
            let line = line.trim();
            if !line.contains('|') {
                continue;
            }

            let fields: Vec<&str> = line.split('|').collect();
            let &[email, password, refresh_token, client_id] = fields.as_slice() else {
                warn!(line = number + 1, "skipping malformed account line");
                continue;
            };

            accounts.insert(
                email.to_lowercase(),
                Account {
                    password: password.to_string(),
                    refresh_token: refresh_token.to_string(),
                    client_id: client_id.to_string(),
                },
            );
        }

        Self { accounts }
    }

    /// Looks up an account by its normalized email key.
    pub fn get(&self, email: &str) -> Option<&Account> {
        self.accounts.get(email)
    }

    /// Number of loaded accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
