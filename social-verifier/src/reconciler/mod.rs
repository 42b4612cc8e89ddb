//! Matching a claimed profile link against a verified proof.
//!
//! The claimed username is the last `/`-separated segment of the link, taken
//! as-is: no case folding, trimming or URL decoding. A trailing slash therefore
//! yields an empty claim and never matches.

use crate::proof::Proof;

/// Username claimed by a profile link
#[must_use]
pub fn claimed_username(profile_reference: &str) -> &str {
    profile_reference.rsplit('/').next().unwrap_or(profile_reference)
}

/// Returns true iff `profile_reference` names the same username the proof verified.
///
/// An absent proof, or one without readable claim data, is a non-match.
#[must_use]
pub fn reconcile(proof: Option<&Proof>, profile_reference: &str) -> bool {
    let Some(verified) = proof.and_then(Proof::verified_username) else {
        return false;
    };

    verified == claimed_username(profile_reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::fixtures::proof_for;
    use serde_json::json;

    #[test]
    fn test_claimed_username_is_last_segment() {
        assert_eq!(claimed_username("https://instagram.com/alice"), "alice");
        assert_eq!(claimed_username("alice"), "alice");
        assert_eq!(claimed_username("https://github.com/alice/"), "");
        assert_eq!(claimed_username(""), "");
    }

    #[test]
    fn test_matching_profile_link() {
        let proof = proof_for("alice");

        assert!(reconcile(Some(&proof), "https://instagram.com/alice"));
    }

    #[test]
    fn test_mismatching_profile_link() {
        let proof = proof_for("alice");

        assert!(!reconcile(Some(&proof), "https://instagram.com/bob"));
    }

    #[test]
    fn test_no_normalization_is_applied() {
        let proof = proof_for("alice");

        assert!(!reconcile(Some(&proof), "https://instagram.com/Alice"));
        assert!(!reconcile(Some(&proof), "https://instagram.com/alice "));
        assert!(!reconcile(Some(&proof), "https://instagram.com/alice/"));
    }

    #[test]
    fn test_absent_proof_or_claim_data_never_matches() {
        assert!(!reconcile(None, "https://instagram.com/alice"));

        let no_claim = Proof::from_payload(json!({ "identifier": "0x1" })).unwrap();
        assert!(!reconcile(Some(&no_claim), "https://instagram.com/alice"));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let proof = proof_for("alice");
        let link = "https://instagram.com/alice";

        let first = reconcile(Some(&proof), link);
        let second = reconcile(Some(&proof), link);
        assert_eq!(first, second);
    }
}
