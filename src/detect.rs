use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of leading bytes inspected by the text/binary heuristic.
pub const TEXT_SNIFF_LEN: usize = 1024;

/// Coarse content category of an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentCategory {
    Png,
    Jpeg,
    Zip,
    Gzip,
    SevenZip,
    Bzip2,
    Zstd,
    Text,
    Binary,
    /// Fewer than four bytes; nothing to sniff.
    Unknown,
    /// Several inputs packed into one archive.
    Archive,
}

impl ContentCategory {
    pub fn label(self) -> &'static str {
        match self {
            ContentCategory::Png => "PNG",
            ContentCategory::Jpeg => "JPEG",
            ContentCategory::Zip => "ZIP",
            ContentCategory::Gzip => "GZIP",
            ContentCategory::SevenZip => "7ZIP",
            ContentCategory::Bzip2 => "BZIP2",
            ContentCategory::Zstd => "ZSTD",
            ContentCategory::Text => "Text",
            ContentCategory::Binary => "Binary",
            ContentCategory::Unknown => "Unknown",
            ContentCategory::Archive => "Archive",
        }
    }

    /// True for formats that are already entropy coded.
    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            ContentCategory::Png
                | ContentCategory::Jpeg
                | ContentCategory::Zip
                | ContentCategory::Gzip
                | ContentCategory::SevenZip
                | ContentCategory::Bzip2
                | ContentCategory::Zstd
        )
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const SIGNATURES: &[(&[u8], ContentCategory)] = &[
    (&[0x89, b'P', b'N', b'G'], ContentCategory::Png),
    (&[0xFF, 0xD8, 0xFF], ContentCategory::Jpeg),
    (&[b'P', b'K', 0x03, 0x04], ContentCategory::Zip),
    (&[0x1F, 0x8B], ContentCategory::Gzip),
    (&[0x37, 0x7A, 0xBC, 0xAF], ContentCategory::SevenZip),
    (&[0x42, 0x5A, 0x68], ContentCategory::Bzip2),
    (&[0x28, 0xB5, 0x2F, 0xFD], ContentCategory::Zstd),
];

/// Sniff magic numbers, then fall back to a NUL-byte text/binary check.
pub fn detect_content_category(data: &[u8]) -> ContentCategory {
    if data.len() < 4 {
        return ContentCategory::Unknown;
    }
    for (magic, category) in SIGNATURES {
        if data.starts_with(magic) {
            return *category;
        }
    }
    let head = &data[..data.len().min(TEXT_SNIFF_LEN)];
    if head.contains(&0) {
        ContentCategory::Binary
    } else {
        ContentCategory::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_numbers() {
        assert_eq!(detect_content_category(b"\x89PNG\r\n\x1a\n"), ContentCategory::Png);
        assert_eq!(detect_content_category(&[0xFF, 0xD8, 0xFF, 0xE0]), ContentCategory::Jpeg);
        assert_eq!(detect_content_category(b"PK\x03\x04rest"), ContentCategory::Zip);
        assert_eq!(detect_content_category(&[0x1F, 0x8B, 8, 0]), ContentCategory::Gzip);
        assert_eq!(
            detect_content_category(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),
            ContentCategory::SevenZip
        );
        assert_eq!(detect_content_category(b"BZh91AY"), ContentCategory::Bzip2);
        assert_eq!(detect_content_category(&[0x28, 0xB5, 0x2F, 0xFD, 0]), ContentCategory::Zstd);
    }

    #[test]
    fn only_entropy_coded_formats_count_as_compressed() {
        assert!(ContentCategory::Gzip.is_compressed());
        assert!(ContentCategory::Jpeg.is_compressed());
        assert!(!ContentCategory::Text.is_compressed());
        assert!(!ContentCategory::Archive.is_compressed());
    }

    #[test]
    fn short_input_is_unknown() {
        assert_eq!(detect_content_category(b"abc"), ContentCategory::Unknown);
    }

    #[test]
    fn nul_only_counts_in_first_kilobyte() {
        let mut data = vec![b'a'; TEXT_SNIFF_LEN];
        assert_eq!(detect_content_category(&data), ContentCategory::Text);
        data.push(0);
        assert_eq!(detect_content_category(&data), ContentCategory::Text);
        data[10] = 0;
        assert_eq!(detect_content_category(&data), ContentCategory::Binary);
    }
}
