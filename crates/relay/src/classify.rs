/// Whether an attachment with this declared media type is worth uploading.
///
/// Prefix match for `image/`, `video/` and `audio/`; substring match for
/// `pdf`, `text/` and `application/`. Case-sensitive, no normalization.
#[must_use]
pub fn is_supported_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
        || media_type.starts_with("video/")
        || media_type.starts_with("audio/")
        || media_type.contains("pdf")
        || media_type.contains("text/")
        || media_type.contains("application/")
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("image/png", true)]
    #[case("image/jpeg", true)]
    #[case("video/mp4", true)]
    #[case("audio/ogg", true)]
    #[case("application/pdf", true)]
    #[case("application/zip", true)]
    #[case("application/octet-stream", true)]
    #[case("text/plain", true)]
    #[case("text/markdown; charset=utf-8", true)]
    #[case("x-pdf", true)]
    #[case("vnd.custom+text/", true)]
    #[case("font/ttf", false)]
    #[case("model/gltf+json", false)]
    #[case("multipart/form-data", false)]
    #[case("", false)]
    #[case("IMAGE/PNG", false)]
    #[case("my-image/png", false)]
    fn classifies_media_types(#[case] media_type: &str, #[case] expected: bool) {
        assert_eq!(is_supported_media_type(media_type), expected, "{media_type}");
    }
}
