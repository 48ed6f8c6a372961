// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel id to collection name mapping.
//!
//! The name is `c` followed by the first 62 lowercase hex digits of the
//! SHA-256 of the channel root, so it is always 63 characters, starts with a
//! letter, and is safe as an index identifier whatever the channel id holds.

use sha2::{Digest, Sha256};

/// Leading character of every collection name.
pub const COLLECTION_PREFIX: char = 'c';

/// Number of hex digits kept from the digest.
pub const NAME_HEX_LEN: usize = 62;

/// The portion of `channel_id` before the first `/`, or all of it.
///
/// `"guild/thread"` and `"guild/other"` share the root `"guild"`.
pub fn channel_root(channel_id: &str) -> &str {
    channel_id.split('/').next().unwrap_or(channel_id)
}

/// Deterministic collection name for a channel.
pub fn collection_name(channel_id: &str) -> String {
    let digest = Sha256::digest(channel_root(channel_id).as_bytes());
    let hex = hex::encode(digest);
    let mut name = String::with_capacity(1 + NAME_HEX_LEN);
    name.push(COLLECTION_PREFIX);
    name.push_str(&hex[..NAME_HEX_LEN]);
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn root_of_plain_channel_is_itself() {
        assert_eq!(channel_root("chan1"), "chan1");
    }

    #[test]
    fn root_stops_at_first_slash() {
        assert_eq!(channel_root("chan1/a/b"), "chan1");
        assert_eq!(channel_root("/leading"), "");
    }

    #[test]
    fn known_digest() {
        assert_eq!(
            collection_name("chan1"),
            "c797e5887b3e390bc65acb5a81c47d1fe418c9bc160a4adb71fb31fa18981bc"
        );
    }

    #[test]
    fn sub_channels_share_a_collection() {
        assert_eq!(collection_name("chan1/a"), collection_name("chan1/b"));
        assert_eq!(collection_name("chan1/a"), collection_name("chan1"));
    }

    #[test]
    fn different_roots_differ() {
        assert_ne!(collection_name("chan1"), collection_name("chan2"));
    }

    proptest! {
        #[test]
        fn names_are_well_formed(channel in ".*") {
            let name = collection_name(&channel);
            prop_assert_eq!(name.len(), 63);
            prop_assert!(name.starts_with(COLLECTION_PREFIX));
            prop_assert!(name[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }

        #[test]
        fn suffix_after_slash_is_ignored(root in "[^/]*", suffix in ".*") {
            prop_assert_eq!(
                collection_name(&format!("{root}/{suffix}")),
                collection_name(&root)
            );
        }
    }
}
