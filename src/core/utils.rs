//! String transformation utilities shared by the parser and the generator

/// Title-cases a string word by word.
///
/// A word is a run of alphabetic characters: its first letter is upper-cased
/// and the rest lower-cased. Every other character passes through unchanged and
/// starts a new word, so `get_pets_petId` becomes `Get_Pets_Petid` and
/// `v2api` becomes `V2Api`.
///
/// # Examples
/// ```
/// use mcpforge::core::utils::title_case;
///
/// assert_eq!(title_case("createPet"), "Createpet");
/// assert_eq!(title_case("get_pets"), "Get_Pets");
/// ```
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_word = false;

    for ch in s.chars() {
        if ch.is_alphabetic() {
            if in_word {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(ch);
            in_word = false;
        }
    }

    result
}

/// Title-cases `s` and drops underscores, e.g. `get_pets` -> `GetPets`
pub fn title_case_joined(s: &str) -> String {
    title_case(s).replace('_', "")
}

/// Reduces a string to the ASCII alphanumerics a class name may contain.
///
/// Returns `fallback` when nothing usable is left or the result would start
/// with a digit.
pub fn class_identifier(s: &str, fallback: &str) -> String {
    let ident: String = s.chars().filter(char::is_ascii_alphanumeric).collect();
    match ident.chars().next() {
        Some(first) if !first.is_ascii_digit() => ident,
        Some(_) => format!("{fallback}{ident}"),
        None => fallback.to_string(),
    }
}
