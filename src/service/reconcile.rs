//! Expiration reconciliation for share tokens.
//!
//! Given a share's declared last valid day and the access token's own `exp`,
//! decides what lifetime to request from the registration endpoint, or that
//! the share has run out. The decision is pure; applying it (registering or
//! persisting the expired state) is up to [`super::ShareService`].

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::db::Share;
use crate::error::HelperError;
use crate::utils::jwt::token_expiry;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Register upstream with this `expires_in`.
    Proceed { expires_in: i64 },
    /// Already recorded as expired; nothing to do.
    Skip,
    /// Past its last day and not yet recorded: revoke and persist.
    MarkExpired,
}

/// Decides how to (re)register `share` at instant `now`.
///
/// The declared date is read as the last *valid* day, so the share lives until
/// 23:59:59 of that day in `now`'s timezone.
pub fn reconcile<Tz: TimeZone>(
    share: &Share,
    access_token: &str,
    now: &DateTime<Tz>,
) -> Result<Reconciliation, HelperError> {
    let Some(expires_at) = share.expiry_date() else {
        return Ok(Reconciliation::Proceed {
            expires_in: share.expires_in,
        });
    };

    let token_exp = token_expiry(access_token)?;
    let share_exp = end_of_day(expires_at, &now.timezone())?;
    let now = now.timestamp();

    let decision = if share_exp > token_exp {
        // The token dies first; let it set the lifetime.
        Reconciliation::Proceed { expires_in: 0 }
    } else if share_exp > now {
        Reconciliation::Proceed {
            expires_in: share_exp - now,
        }
    } else if share.is_expired() {
        Reconciliation::Skip
    } else {
        Reconciliation::MarkExpired
    };
    Ok(decision)
}

/// Unix timestamp of `date` at 23:59:59 in `tz`.
fn end_of_day<Tz: TimeZone>(date: &str, tz: &Tz) -> Result<i64, HelperError> {
    let day = NaiveDate::parse_from_str(date, DATE_FORMAT)?;
    day.and_hms_opt(23, 59, 59)
        .and_then(|last_second| tz.from_local_datetime(&last_second).latest())
        .map(|dt| dt.timestamp())
        .ok_or_else(|| HelperError::validation(format!("{date} 23:59:59 does not exist locally")))
}
