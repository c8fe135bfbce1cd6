/// Default length for generated shortcodes.
pub const CODE_LENGTH: usize = 6;

/// 62-character alphanumeric alphabet: digits, upper case, lower case.
const ALPHABET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I',
    'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b',
    'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u',
    'v', 'w', 'x', 'y', 'z',
];

/// Draw a fresh uniformly-random candidate code. Stateless; uniqueness is the
/// resolver's concern, not the generator's.
pub fn generate_candidate(length: usize) -> String {
    nanoid::nanoid!(length, ALPHABET)
}
