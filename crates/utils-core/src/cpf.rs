//! Brazilian individual tax-id (CPF) validation.
//!
//! A CPF is eleven digits, the last two being check digits computed with the
//! official modulo-11 algorithm over the preceding digits.

use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid CPF")]
pub struct InvalidCpf;

/// A structurally valid CPF, stored as its eleven digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpf(String);

impl Cpf {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Cpf {
    type Err = InvalidCpf;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
        if is_valid_digits(&digits) {
            Ok(Self(digits))
        } else {
            Err(InvalidCpf)
        }
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks whether `input` holds a structurally valid CPF, ignoring any
/// formatting characters (dots, dashes, spaces).
pub fn is_valid(input: &str) -> bool {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    is_valid_digits(&digits)
}

fn is_valid_digits(digits: &str) -> bool {
    if digits.len() != 11 {
        return false;
    }

    let d: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    // All-same-digit numbers pass the checksum but are not issued.
    if d.iter().all(|&x| x == d[0]) {
        return false;
    }

    check_digit(&d[..9], 10) == d[9] && check_digit(&d[..10], 11) == d[10]
}

fn check_digit(digits: &[u32], initial_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &digit)| digit * (initial_weight - i as u32))
        .sum();
    let remainder = 11 - (sum % 11);
    if remainder > 9 { 0 } else { remainder }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_cpf() {
        assert!(is_valid("52998224725"));
        assert!(is_valid("529.982.247-25"));
    }

    #[test]
    fn rejects_bad_check_digits() {
        assert!(!is_valid("52998224724"));
        assert!(!is_valid("52998224735"));
    }

    #[test]
    fn rejects_repeated_digit_sequences() {
        assert!(!is_valid("00000000000"));
        assert!(!is_valid("111.111.111-11"));
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!is_valid(""));
        assert!(!is_valid("5299822472"));
        assert!(!is_valid("529982247255"));
    }

    #[test]
    fn cpf_newtype_strips_formatting() {
        let cpf: Cpf = "529.982.247-25".parse().unwrap();
        assert_eq!(cpf.as_str(), "52998224725");
        assert!("123.456.789-00".parse::<Cpf>().is_err());
    }
}
