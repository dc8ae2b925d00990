/*!
 * Tests for language utility functions
 */

use colloquial::language_utils::{validate_language_code, normalize_language_code, language_codes_match, get_language_name};

/// Test validation of language codes
#[test]
fn test_validateLanguageCode_withVariousCodes_shouldAcceptIsoCodes() {
    assert!(validate_language_code("mi").is_ok());
    assert!(validate_language_code("mri").is_ok());
    assert!(validate_language_code("mao").is_ok());
    assert!(validate_language_code(" EN ").is_ok());

    assert!(validate_language_code("xyz").is_err());
    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
    assert!(validate_language_code("").is_err());
}

/// Test normalization prefers ISO 639-1
#[test]
fn test_normalizeLanguageCode_withValidCodes_shouldPreferTwoLetterCodes() {
    assert_eq!(normalize_language_code("mi").unwrap(), "mi");
    assert_eq!(normalize_language_code("MRI").unwrap(), "mi");
    assert_eq!(normalize_language_code("mao").unwrap(), "mi");
    assert_eq!(normalize_language_code("fre").unwrap(), "fr");
    assert_eq!(normalize_language_code("eng").unwrap(), "en");

    assert!(normalize_language_code("xx").is_err());
}

/// Test matching across code forms
#[test]
fn test_languageCodesMatch_withDifferentForms_shouldMatchSameLanguage() {
    assert!(language_codes_match("mi", "mao"));
    assert!(language_codes_match("mri", "MI"));
    assert!(language_codes_match("ger", "de"));

    assert!(!language_codes_match("mi", "en"));
    assert!(!language_codes_match("mi", "invalid"));
}

/// Test language names
#[test]
fn test_getLanguageName_withCodeForms_shouldReturnSameName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("mi").unwrap(), get_language_name("mao").unwrap());
    assert!(get_language_name("xyz").is_err());
}
