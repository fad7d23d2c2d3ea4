//! Login gate for action destinations.

/// Login page that accepts a `next` destination.
pub const LOGIN_PATH: &str = "/login";

/// Route an action target through the login page, preserving the destination.
///
/// ```
/// use equipregistry_core::actions::login_gate;
///
/// assert_eq!(
///     login_gate("/action?type=report&registryId=ER-STOL-777"),
///     "/login?next=%2Faction%3Ftype%3Dreport%26registryId%3DER-STOL-777"
/// );
/// ```
pub fn login_gate(target: &str) -> String {
    format!("{}?next={}", LOGIN_PATH, urlencoding::encode(target))
}

/// Recover the destination from a gated target, if it is one.
pub fn gated_destination(target: &str) -> Option<String> {
    let query = target.strip_prefix(LOGIN_PATH)?.strip_prefix('?')?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("next="))
        .and_then(|encoded| urlencoding::decode(encoded).ok())
        .map(|decoded| decoded.into_owned())
}
