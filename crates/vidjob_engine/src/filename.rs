const MAX_NAME_LEN: usize = 180;

/// Makes a deterministic artifact name safe to create on common filesystems.
///
/// Forbidden characters become `_`, surrounding dots/spaces are trimmed and
/// over-long names are shortened in the stem so the extension survives.
/// Names that are already safe come back unchanged.
pub fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut cleaned = cleaned.trim_matches(&[' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "download".to_string();
    }

    if cleaned.chars().count() > MAX_NAME_LEN {
        let (stem, ext) = match cleaned.rfind('.') {
            Some(idx) if idx > 0 => (&cleaned[..idx], &cleaned[idx..]),
            _ => (cleaned.as_str(), ""),
        };
        let keep = MAX_NAME_LEN.saturating_sub(ext.chars().count());
        let stem: String = stem.chars().take(keep).collect();
        cleaned = format!("{stem}{ext}");
    }

    let stem_len = cleaned.split('.').next().map_or(0, str::len);
    if is_reserved_windows_name(&cleaned[..stem_len]) {
        cleaned.insert(stem_len, '_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::safe_file_name;

    #[test]
    fn safe_names_pass_through() {
        assert_eq!(
            safe_file_name("frames_my clip.mp4_12.zip"),
            "frames_my clip.mp4_12.zip"
        );
    }

    #[test]
    fn path_separators_are_replaced() {
        assert_eq!(
            safe_file_name("frames_../etc/passwd_3.zip"),
            "frames_.._etc_passwd_3.zip"
        );
        assert_eq!(safe_file_name("a:b?.zip"), "a_b_.zip");
    }

    #[test]
    fn long_names_keep_extension() {
        let long = format!("frames_{}_1.zip", "x".repeat(400));
        let safe = safe_file_name(&long);
        assert_eq!(safe.chars().count(), 180);
        assert!(safe.ends_with(".zip"));
    }

    #[test]
    fn reserved_and_empty_names() {
        assert_eq!(safe_file_name("CON.zip"), "CON_.zip");
        assert_eq!(safe_file_name(" .. "), "download");
    }
}
