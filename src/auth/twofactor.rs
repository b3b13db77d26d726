use anyhow::{anyhow, Result};
use totp_rs::{Algorithm, Secret, TOTP};

const ISSUER: &str = "kunci";
const DIGITS: usize = 6;
const SKEW: u8 = 1;
const STEP: u64 = 30;

/// Generate a fresh base32-encoded TOTP secret.
#[must_use]
pub fn generate_secret() -> String {
    Secret::generate_secret().to_encoded().to_string()
}

fn totp_for(secret_base32: &str, account: &str) -> Result<TOTP> {
    let secret = Secret::Encoded(secret_base32.to_string())
        .to_bytes()
        .map_err(|err| anyhow!("invalid TOTP secret: {err:?}"))?;

    TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP,
        secret,
        Some(ISSUER.to_string()),
        account.to_string(),
    )
    .map_err(|err| anyhow!("failed to build TOTP: {err:?}"))
}

/// otpauth:// URL for enrolling an authenticator app.
///
/// # Errors
///
/// Returns an error if the stored secret is not valid base32.
pub fn provisioning_url(secret_base32: &str, account: &str) -> Result<String> {
    Ok(totp_for(secret_base32, account)?.get_url())
}

/// Check a code against the current time window (one step of skew allowed).
///
/// # Errors
///
/// Returns an error if the stored secret is invalid or the system clock is
/// unreadable.
pub fn verify_code(secret_base32: &str, account: &str, code: &str) -> Result<bool> {
    let totp = totp_for(secret_base32, account)?;
    totp.check_current(code)
        .map_err(|err| anyhow!("system time error: {err}"))
}
