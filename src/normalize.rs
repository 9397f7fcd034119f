//! Canonical forms for Sui addresses and Move type tags.
//!
//! The same address can be written as `0x2`, `0x0002` or with upper-case hex
//! digits, and coin types embed addresses (`0x2::sui::SUI`). Everything that
//! compares recipients or assets goes through these functions first.

/// Number of hex digits in a full Sui address.
pub const ADDRESS_HEX_LEN: usize = 64;

/// Normalize a Sui address to `0x` followed by 64 lower-case hex digits.
///
/// Input that is not hex, or that has more than 64 digits, cannot be padded
/// into an address; it is returned lower-cased so it only ever equals itself.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty()
        || digits.len() > ADDRESS_HEX_LEN
        || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return trimmed.to_ascii_lowercase();
    }

    format!(
        "0x{:0>width$}",
        digits.to_ascii_lowercase(),
        width = ADDRESS_HEX_LEN
    )
}

/// Normalize a Move type tag such as `0x2::sui::SUI` or
/// `0xabc::pool::LP<0x2::sui::SUI, 0x5d4b::coin::COIN>`.
///
/// The address of every struct tag is normalized, recursively through type
/// parameters and `vector<..>` elements. Module and struct names are
/// case-sensitive in Move and are kept as written. Primitive types pass through.
#[must_use]
pub fn normalize_type_tag(tag: &str) -> String {
    let tag = tag.trim();

    if let Some(inner) = tag
        .strip_prefix("vector<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        return format!("vector<{}>", normalize_type_tag(inner));
    }

    let (head, params) = match tag.find('<') {
        Some(open) if tag.ends_with('>') => (&tag[..open], Some(&tag[open + 1..tag.len() - 1])),
        _ => (tag, None),
    };

    let mut parts = head.splitn(3, "::");
    let (Some(address), Some(module), Some(name)) = (parts.next(), parts.next(), parts.next())
    else {
        // Primitive (u64, bool, address, ...) or something unparseable.
        return tag.to_string();
    };

    let mut normalized = format!("{}::{}::{}", normalize_address(address), module.trim(), name.trim());
    if let Some(params) = params {
        let params: Vec<String> = split_type_params(params)
            .into_iter()
            .map(normalize_type_tag)
            .collect();
        normalized.push('<');
        normalized.push_str(&params.join(", "));
        normalized.push('>');
    }
    normalized
}

/// Split a type parameter list on top-level commas only.
fn split_type_params(params: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in params.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = params[start..].trim();
    if !last.is_empty() {
        out.push(last);
    }
    out
}
