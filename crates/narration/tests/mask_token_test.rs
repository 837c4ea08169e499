//! Tests for [`narration::mask_token`], used when the OpenAI narrator logs its key.

use narration::mask_token;

/// **Test:** The length threshold sits between 11 and 12 bytes.
///
/// **Expected:** 11 bytes are fully hidden; 12 bytes keep a 7-byte head and 4-byte tail.
#[test]
fn test_mask_token_threshold() {
    assert_eq!(mask_token("ollama-key1"), "***");
    assert_eq!(mask_token("ollama-key12"), "ollama-***ey12");
    assert_eq!(mask_token(""), "***");
}

/// **Test:** The secret middle of a vision API key never appears in the masked form.
#[test]
fn test_mask_token_hides_middle() {
    let key = "sk-garden-SECRETSECRETSECRET-9f3a";
    let masked = mask_token(key);

    assert_eq!(masked, "sk-gard***9f3a");
    assert!(!masked.contains("SECRET"));
}

/// **Test:** Cut points inside multi-byte characters fall back to full masking.
#[test]
fn test_mask_token_multibyte_cut_points() {
    assert_eq!(mask_token("鑰匙鑰匙鑰匙鑰匙"), "***");
    assert_eq!(mask_token("abcdefg-middle-wxyz"), "abcdefg***wxyz");
    assert_eq!(mask_token("abcdef鑰-middle-wxyz"), "***");
}
