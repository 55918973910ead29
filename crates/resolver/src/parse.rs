//! Pure parsers for host query output
//!
//! These extract just what resolution needs from `diskutil` and
//! `sw_vers` text; the full plist schema is deliberately not modeled.

use sealpatch_errors::{Error, ResolveError};

/// Pull the `DeviceIdentifier` string out of `diskutil info -plist`
/// output.
#[must_use]
pub fn extract_device_identifier(plist: &str) -> Option<String> {
    let key_at = plist.find("<key>DeviceIdentifier</key>")?;
    let rest = &plist[key_at..];
    let start = rest.find("<string>")? + "<string>".len();
    let end = rest[start..].find("</string>")? + start;
    let identifier = rest[start..end].trim();
    if identifier.is_empty() {
        None
    } else {
        Some(identifier.to_string())
    }
}

/// Find the data-bearing volume backing a sealed snapshot: the last
/// whitespace-delimited field of the line immediately above the first
/// line naming `origin` in `diskutil list` output.
#[must_use]
pub fn parse_backing_identifier(listing: &str, origin: &str) -> Option<String> {
    let lines: Vec<&str> = listing.lines().collect();
    let position = lines.iter().position(|line| line.contains(origin))?;
    if position == 0 {
        return None;
    }
    lines[position - 1]
        .split_whitespace()
        .last()
        .map(ToString::to_string)
}

/// Parse the major component of a `sw_vers -productVersion` string.
///
/// # Errors
///
/// Returns an error when the leading component is not a number.
pub fn parse_os_major(version: &str) -> Result<u32, Error> {
    version
        .trim()
        .split('.')
        .next()
        .and_then(|major| major.parse().ok())
        .ok_or_else(|| {
            Error::Resolve(ResolveError::UnparsableOsVersion {
                raw: version.trim().to_string(),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_identifier_is_extracted_from_plist_text() {
        let plist = "<dict>\n<key>DeviceIdentifier</key>\n<string>disk3s1s1</string>\n</dict>";
        assert_eq!(
            extract_device_identifier(plist).as_deref(),
            Some("disk3s1s1")
        );
    }

    #[test]
    fn missing_identifier_yields_none() {
        assert!(extract_device_identifier("<dict></dict>").is_none());
        assert!(extract_device_identifier("<key>DeviceIdentifier</key>").is_none());
    }

    #[test]
    fn backing_identifier_is_previous_line_last_field() {
        let listing = "\
   1:                APFS Volume Macintosh HD            11.3 GB    disk3s1
   2:              APFS Snapshot com.apple.os.update    11.3 GB    disk3s1s1
";
        assert_eq!(
            parse_backing_identifier(listing, "disk3s1s1").as_deref(),
            Some("disk3s1")
        );
    }

    #[test]
    fn origin_on_first_line_has_no_backing_volume() {
        assert!(parse_backing_identifier("disk3s1s1\n", "disk3s1s1").is_none());
        assert!(parse_backing_identifier("", "disk3s1s1").is_none());
    }

    #[test]
    fn os_major_parses_modern_and_legacy_versions() {
        assert_eq!(parse_os_major("14.5\n").unwrap(), 14);
        assert_eq!(parse_os_major("10.15.7").unwrap(), 10);
        assert!(parse_os_major("beta").is_err());
    }
}
