use num_bigint::{BigInt, BigUint, Sign};

/// Signed reading of a field element: values above `prime / 2` are negative
/// residues (`value - prime`).
pub fn signed_repr(value: &BigUint, prime: &BigUint) -> BigInt {
    if value > &(prime / 2u32) {
        BigInt::from(value.clone()) - BigInt::from(prime.clone())
    } else {
        BigInt::from(value.clone())
    }
}

/// Signed decimal rendering of `value`, plus the raw decimal form when the
/// value folds to a negative residue (the two forms differ).
pub fn signed_with_raw(value: &BigUint, prime: &BigUint) -> (String, Option<String>) {
    let signed = signed_repr(value, prime);
    if signed.sign() == Sign::Minus {
        (signed.to_string(), Some(value.to_string()))
    } else {
        (signed.to_string(), None)
    }
}

/// Parse a field element from its artifact form: `0x`-prefixed hex or plain
/// decimal.
pub fn parse_felt(text: &str) -> Option<BigUint> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        BigUint::parse_bytes(hex.as_bytes(), 16)
    } else {
        BigUint::parse_bytes(text.as_bytes(), 10)
    }
}
