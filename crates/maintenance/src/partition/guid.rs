//! GPT partition type resolution.

/// Short type codes accepted in place of a full partition type GUID.
const TYPE_ALIASES: &[(&str, &str)] = &[
    ("ef00", "C12A7328-F81F-11D2-BA4B-00A0C93EC93B"), // EFI system partition
    ("8300", "0FC63DAF-8483-4772-8E79-3D69D8477DE4"), // Linux filesystem
    ("8200", "0657FD6D-A4AB-43C4-84E5-0933C84B4F4F"), // Linux swap
    ("0700", "EBD0A0A2-B9E5-4433-87C0-68B6B72699C7"), // Basic data
    ("0c01", "F4019732-066E-4E12-8273-346C5641494F"), // Microsoft basic data (alternative)
];

/// Hyphen offsets in the canonical 8-4-4-4-12 form.
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Resolve a type alias or GUID to its canonical uppercase GUID.
///
/// Returns `None` for anything that is neither a known alias nor a
/// well-formed GUID.
pub fn resolve(input: &str) -> Option<String> {
    let token = input.trim().to_ascii_lowercase();
    if let Some((_, guid)) = TYPE_ALIASES.iter().find(|(alias, _)| *alias == token) {
        return Some((*guid).to_string());
    }
    if is_guid(&token) {
        return Some(token.to_ascii_uppercase());
    }
    None
}

fn is_guid(s: &str) -> bool {
    s.len() == 36
        && s.bytes().enumerate().all(|(i, b)| {
            if HYPHEN_POSITIONS.contains(&i) {
                b == b'-'
            } else {
                b.is_ascii_hexdigit()
            }
        })
}
