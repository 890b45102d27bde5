use super::domain::Provider;

/// Trim and collapse internal whitespace runs. Case is preserved.
pub fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep only the digits of an NPI (`"123-456 7890"` -> `"1234567890"`).
pub fn normalize_npi(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Key used for case-insensitive name comparison.
pub(crate) fn name_match_key(value: &str) -> String {
    normalize_name(value).to_lowercase()
}

pub fn normalize_provider(provider: &mut Provider) {
    provider.first_name = normalize_name(&provider.first_name);
    provider.last_name = normalize_name(&provider.last_name);
    if let Some(middle) = provider.middle_name.as_mut() {
        *middle = normalize_name(middle);
    }
    provider.npi = normalize_npi(&provider.npi);
}
