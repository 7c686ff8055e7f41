use super::ObjectPathError;

/// Validate that `bytes` is a well-formed D-Bus object path.
///
/// * The path must begin with an ASCII `/`.
/// * Elements are separated by a single `/` and may only contain
///   `[A-Z][a-z][0-9]_`.
/// * No element may be empty.
/// * A trailing `/` is only allowed for the root path `/` itself.
pub(super) const fn validate(bytes: &[u8]) -> Result<(), ObjectPathError> {
    if bytes.is_empty() || bytes[0] != b'/' {
        return Err(ObjectPathError);
    }

    if bytes.len() == 1 {
        // The root path.
        return Ok(());
    }

    let mut element_len = 0;
    let mut n = 1;

    while n < bytes.len() {
        let b = bytes[n];

        if b == b'/' {
            if element_len == 0 {
                return Err(ObjectPathError);
            }

            element_len = 0;
            n += 1;
            continue;
        }

        if !is_valid_byte(b) {
            return Err(ObjectPathError);
        }

        element_len += 1;
        n += 1;
    }

    if element_len == 0 {
        // Trailing slash on a non-root path.
        return Err(ObjectPathError);
    }

    Ok(())
}

#[inline]
const fn is_valid_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
