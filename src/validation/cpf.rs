/// Number of digits in a CPF, check digits included
const CPF_LEN: usize = 11;

/// Check digit over `digits`, weighted from `len + 1` down to 2.
fn check_digit(digits: &[u32]) -> u32 {
    let n = digits.len() as u32;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (n + 1 - i as u32))
        .sum();

    let remainder = 11 - (sum % 11);
    if remainder >= 10 {
        0
    } else {
        remainder
    }
}

/// Validate a Brazilian CPF, masked (`313.716.772-80`) or bare (`31371677280`).
///
/// Every non-digit character is dropped before checking, so mask placement
/// does not matter. Malformed input is simply invalid.
pub fn is_valid_cpf(raw: &str) -> bool {
    let stripped: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if stripped.len() != CPF_LEN {
        return false;
    }

    let mut digits = Vec::with_capacity(CPF_LEN);
    for c in stripped.chars() {
        match c.to_digit(10) {
            Some(d) => digits.push(d),
            None => return false,
        }
    }

    // 000.000.000-00, 111.111.111-11, ... pass the checksum but are not issued
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}
