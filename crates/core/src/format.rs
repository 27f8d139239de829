/// Target audio container formats the extraction pipeline can produce.
///
/// Each format knows its file extension, the `Content-Type` it is served
/// with, and how to recognize its own leading bytes. The signature check is
/// what stands between a silently failed transcode and a client downloading
/// garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// MPEG layer III audio.
    Mp3,
}

impl AudioFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
        }
    }

    /// MIME type used when serving files of this format.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
        }
    }

    /// Returns `true` if `header` starts with a plausible signature for this
    /// format.
    ///
    /// For MP3 that is either an ID3v2 tag or an MPEG frame sync (eleven set
    /// bits across the first two bytes). An empty or truncated header never
    /// matches.
    pub fn matches_signature(self, header: &[u8]) -> bool {
        match self {
            Self::Mp3 => {
                header.starts_with(b"ID3")
                    || (header.len() >= 2 && header[0] == 0xFF && (header[1] & 0xE0) == 0xE0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp3_metadata() {
        assert_eq!(AudioFormat::Mp3.extension(), "mp3");
        assert_eq!(AudioFormat::Mp3.content_type(), "audio/mpeg");
    }

    #[test]
    fn id3_tag_matches() {
        assert!(AudioFormat::Mp3.matches_signature(b"ID3\x04\x00"));
    }

    #[test]
    fn frame_sync_matches() {
        assert!(AudioFormat::Mp3.matches_signature(&[0xFF, 0xFB, 0x90]));
        assert!(AudioFormat::Mp3.matches_signature(&[0xFF, 0xE0]));
    }

    #[test]
    fn garbage_does_not_match() {
        assert!(!AudioFormat::Mp3.matches_signature(b""));
        assert!(!AudioFormat::Mp3.matches_signature(&[0xFF]));
        assert!(!AudioFormat::Mp3.matches_signature(b"RIFF"));
        assert!(!AudioFormat::Mp3.matches_signature(&[0xFF, 0x1B, 0x00]));
        assert!(!AudioFormat::Mp3.matches_signature(b"ID2junk"));
    }
}
