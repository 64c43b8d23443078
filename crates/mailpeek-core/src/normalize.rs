//! Email address canonicalization for credential lookup.

/// Canonicalizes an email address into the account-table lookup key.
///
/// The input is trimmed and lowercased, and any `+tag` suffix in the local
/// part is stripped at the first `+`, so `User+shop@Example.com` and
/// `user@example.com` resolve to the same account.
///
/// Total function: never fails, always returns a string (possibly empty).
pub fn normalize_email(email: &str) -> String {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) => {
            let local = local.split_once('+').map_or(local, |(base, _)| base);
            format!("{local}@{domain}")
        }
        None => email,
    }
}
