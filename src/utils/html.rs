// src/utils/html.rs

/// Strips unsafe markup from user-authored forum text.
///
/// Whitelist based: formatting tags such as `<b>` and `<p>` survive, while
/// `<script>` (with its body), `<iframe>` and event-handler attributes are removed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
