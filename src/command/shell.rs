//! POSIX shell helpers shared by every command dialect.
use std::borrow::Cow;

use sha2::{Digest, Sha256};

use super::Action;

/// Directory on the guest that holds run-once markers.
pub const RUN_ONCE_DIR: &str = "/var/lib/smart-provision/run-once";

/// Number of hex characters of the action digest used as the marker name.
const MARKER_LEN: usize = 16;

/// Quote `s` for a POSIX shell, leaving it bare when that is unambiguous.
#[must_use]
pub fn quote(s: &str) -> Cow<'_, str> {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));
    if safe {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(format!("'{}'", s.replace('\'', r"'\''")))
    }
}

/// Marker file name for an action: a prefix of the SHA-256 of its rendering.
#[must_use]
pub fn marker_key(action: &Action) -> String {
    let digest = format!("{:x}", Sha256::digest(action.render().as_bytes()));
    digest.chars().take(MARKER_LEN).collect()
}

/// Wrap `action` so that it runs only until it has succeeded once on a guest.
#[must_use]
pub fn run_once(action: Action) -> Action {
    let marker = format!("{RUN_ONCE_DIR}/{}", marker_key(&action));
    let body = format!(
        "{}\nmkdir -p {RUN_ONCE_DIR} && touch {marker}",
        action.render().trim_end_matches('\n')
    );
    Action::conditional(
        Action::command(format!("[ ! -f {marker} ]")),
        Action::command(body),
        None,
    )
}
