use rand::Rng;

pub const LOGIN_SUFFIX: &str = "@metis";

pub const STUDENT_PASSWORD_LENGTH: usize = 6;
pub const RESET_PASSWORD_LENGTH: usize = 8;

const PASSWORD_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// Resets are read over the phone or copied by hand; 0/O, 1/l/I and friends
// are left out.
const RESET_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyzABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub fn generate_password(length: usize) -> String {
    draw_from(length, PASSWORD_ALPHABET)
}

pub fn generate_reset_password() -> String {
    draw_from(RESET_PASSWORD_LENGTH, RESET_ALPHABET)
}

fn draw_from(length: usize, alphabet: &[u8]) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let index = rng.gen_range(0..alphabet.len());
            alphabet[index] as char
        })
        .collect()
}

/// Base login identifier: first whitespace-delimited name token, lowercased,
/// diacritics stripped, non-alphanumeric characters dropped.
pub fn derive_login_base(full_name: &str) -> String {
    let first_token = full_name.split_whitespace().next().unwrap_or_default();
    let folded: String = first_token
        .to_lowercase()
        .chars()
        .map(fold_diacritic)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if folded.is_empty() {
        "aluno".to_string()
    } else {
        folded
    }
}

/// Candidate identifier for the nth collision-resolution attempt: the bare
/// base for attempt 1, `base2`, `base3`, ... afterwards.
pub fn login_candidate(base: &str, attempt: usize) -> String {
    if attempt <= 1 {
        format!("{base}{LOGIN_SUFFIX}")
    } else {
        format!("{base}{attempt}{LOGIN_SUFFIX}")
    }
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
