//! Redemption codes handed to students and typed or scanned by staff.
//!
//! Codes are 7 symbols from a 32-symbol alphabet without the look-alikes
//! `I`, `O`, `0` and `1`, giving 32^7 (about 3.4e10) possible codes.
//! Uniqueness is enforced by the database; collisions are retried by the
//! caller with a fresh code.

use rand::seq::SliceRandom;

pub const CLAIM_CODE_LEN: usize = 7;
pub const CLAIM_CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub fn generate_claim_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CLAIM_CODE_LEN)
        .filter_map(|_| CLAIM_CODE_ALPHABET.choose(&mut rng))
        .map(|&b| b as char)
        .collect()
}

/// Canonical form of a code as typed at the counter.
pub fn normalize_claim_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

pub fn is_well_formed(code: &str) -> bool {
    code.len() == CLAIM_CODE_LEN && code.bytes().all(|b| CLAIM_CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_codes_use_fixed_length_and_alphabet() {
        for _ in 0..500 {
            let code = generate_claim_code();
            assert_eq!(code.len(), CLAIM_CODE_LEN);
            assert!(is_well_formed(&code), "unexpected code {code}");
        }
    }

    #[test]
    fn generated_codes_rarely_repeat() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_claim_code()).collect();
        assert!(codes.len() >= 999);
    }

    #[test]
    fn normalization_trims_and_uppercases() {
        assert_eq!(normalize_claim_code("  ab3k9zq \n"), "AB3K9ZQ");
        assert!(is_well_formed(&normalize_claim_code("ab3k9zq")));
    }

    #[test]
    fn ambiguous_symbols_are_not_well_formed() {
        assert!(!is_well_formed("AB0K9ZQ"));
        assert!(!is_well_formed("ABIK9ZQ"));
        assert!(!is_well_formed("AB3K9Z"));
        assert!(!is_well_formed("AB3K9ZQQ"));
    }
}
