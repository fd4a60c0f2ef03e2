//! Content sniffing from magic bytes.

use super::{TypeCategory, OCTET_STREAM};

/// Number of header bytes read for sniffing
pub const SNIFF_LEN: usize = 512;

const HEIF_BRANDS: [&[u8; 4]; 8] = [
    b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevx", b"mif1", b"msf1",
];

/// ISO base media brand at offset 8, if the header is an `ftyp` box
fn ftyp_brand(bytes: &[u8]) -> Option<&[u8]> {
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        Some(&bytes[8..12])
    } else {
        None
    }
}

fn is_riff(bytes: &[u8], form: &[u8; 4]) -> bool {
    bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == form
}

/// Guess the category from the header bytes alone
pub fn sniff_category(bytes: &[u8]) -> TypeCategory {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return TypeCategory::Photo;
    }

    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
        || bytes.starts_with(b"GIF8")
        || bytes.starts_with(b"BM")
        || bytes.starts_with(b"II*\0")
        || bytes.starts_with(b"MM\0*")
        || is_riff(bytes, b"WEBP")
    {
        return TypeCategory::OtherImage;
    }

    if let Some(brand) = ftyp_brand(bytes) {
        if HEIF_BRANDS.iter().any(|b| b.as_slice() == brand) {
            return TypeCategory::HeifPhoto;
        }
        if brand == b"crx " {
            return TypeCategory::RawPhoto;
        }
        return TypeCategory::Video;
    }

    if is_riff(bytes, b"AVI ") || bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return TypeCategory::Video;
    }

    TypeCategory::Unknown
}

/// Sniff a MIME type from the header bytes
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return "image/png";
    }
    if bytes.starts_with(b"GIF8") {
        return "image/gif";
    }
    if bytes.starts_with(b"BM") {
        return "image/bmp";
    }
    if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
        return "image/tiff";
    }
    if is_riff(bytes, b"WEBP") {
        return "image/webp";
    }
    if is_riff(bytes, b"AVI ") {
        return "video/avi";
    }
    if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return "video/webm";
    }
    if let Some(brand) = ftyp_brand(bytes) {
        if HEIF_BRANDS.iter().any(|b| b.as_slice() == brand) || brand == b"crx " {
            return OCTET_STREAM;
        }
        if brand == b"qt  " {
            return "video/quicktime";
        }
        return "video/mp4";
    }

    sniff_text(bytes).unwrap_or(OCTET_STREAM)
}

fn sniff_text(bytes: &[u8]) -> Option<&'static str> {
    if bytes.is_empty() {
        return None;
    }

    let body = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    let text = match std::str::from_utf8(body) {
        Ok(text) => text,
        // A multi-byte character cut off by the sniff window is still text
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&body[..e.valid_up_to()]).ok()?,
        Err(_) => return None,
    };

    let binary = text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r' | '\x0C'));
    if binary {
        return None;
    }

    if text.trim_start().starts_with("<?xml") {
        Some("text/xml; charset=utf-8")
    } else {
        Some("text/plain; charset=utf-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_image_signatures() {
        assert_eq!(sniff_category(&[0xFF, 0xD8, 0xFF, 0xE1]), TypeCategory::Photo);
        assert_eq!(
            sniff_category(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            TypeCategory::OtherImage
        );
        assert_eq!(sniff_category(b"RIFF\0\0\0\0WEBPVP8 "), TypeCategory::OtherImage);
    }

    #[test]
    fn sniffs_iso_media_brands() {
        assert_eq!(sniff_category(b"\0\0\0\x18ftypheic\0\0\0\0"), TypeCategory::HeifPhoto);
        assert_eq!(sniff_category(b"\0\0\0\x18ftypcrx \0\0\0\0"), TypeCategory::RawPhoto);
        assert_eq!(sniff_category(b"\0\0\0\x18ftypisom\0\0\0\0"), TypeCategory::Video);
        assert_eq!(sniff_mime(b"\0\0\0\x18ftypqt  \0\0\0\0"), "video/quicktime");
    }

    #[test]
    fn text_is_not_a_media_category() {
        assert_eq!(sniff_category(b"hello world"), TypeCategory::Unknown);
        assert_eq!(sniff_mime(b"hello world"), "text/plain; charset=utf-8");
    }

    #[test]
    fn xml_declaration_is_xml() {
        assert_eq!(
            sniff_mime(b"\xEF\xBB\xBF<?xml version=\"1.0\"?>"),
            "text/xml; charset=utf-8"
        );
    }

    #[test]
    fn truncated_utf8_is_still_text() {
        let mut bytes = "caf\u{e9} ".repeat(3).into_bytes();
        bytes.push(0xC3);
        assert_eq!(sniff_mime(&bytes), "text/plain; charset=utf-8");
    }

    #[test]
    fn binary_and_empty_fall_back_to_octet_stream() {
        assert_eq!(sniff_mime(&[0x00, 0x01, 0x02, 0x03]), OCTET_STREAM);
        assert_eq!(sniff_mime(&[]), OCTET_STREAM);
    }
}
