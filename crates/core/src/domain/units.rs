use crate::error::{CoreError, Result};

const WEI_DECIMALS: usize = 18;

/// Render a wei amount (decimal string) in ether without losing precision.
pub fn format_wei_as_eth(wei: &str) -> Result<String> {
    let digits = wei.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidAmount(wei.to_string()));
    }

    let digits = digits.trim_start_matches('0');
    let padded = format!("{:0>width$}", digits, width = WEI_DECIMALS + 1);
    let (whole, fraction) = padded.split_at(padded.len() - WEI_DECIMALS);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        Ok(whole.to_string())
    } else {
        Ok(format!("{}.{}", whole, fraction))
    }
}

/// Add wei amounts given as decimal strings, without an integer width limit.
pub fn sum_wei<'a>(amounts: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let mut total: Vec<u8> = vec![0];

    for amount in amounts {
        let digits = amount.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidAmount(amount.to_string()));
        }

        // Little-endian digit vector.
        let mut carry = 0u8;
        for (i, b) in digits.bytes().rev().enumerate() {
            if i == total.len() {
                total.push(0);
            }
            let sum = total[i] + (b - b'0') + carry;
            total[i] = sum % 10;
            carry = sum / 10;
        }
        let mut i = digits.len();
        while carry > 0 {
            if i == total.len() {
                total.push(0);
            }
            let sum = total[i] + carry;
            total[i] = sum % 10;
            carry = sum / 10;
            i += 1;
        }
    }

    while total.len() > 1 && total.last() == Some(&0) {
        total.pop();
    }
    Ok(total.iter().rev().map(|d| char::from(b'0' + d)).collect())
}
