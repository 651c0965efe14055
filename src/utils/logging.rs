use serde::Serialize;

/// Logs `value` as pretty JSON under `label`, but only when DEBUG is enabled.
pub(crate) fn debug_pretty_json<T>(label: &str, value: &T)
where
    T: Serialize + ?Sized,
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty_json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
    tracing::debug!(payload = %pretty_json, "{label}");
}

/// Keeps the first few characters of a credential for log correlation.
pub(crate) fn mask_secret(secret: &str) -> String {
    const VISIBLE: usize = 6;
    match secret.char_indices().nth(VISIBLE) {
        Some((idx, _)) => format!("{}***", &secret[..idx]),
        None if secret.is_empty() => "<empty>".to_string(),
        None => "***".to_string(),
    }
}
