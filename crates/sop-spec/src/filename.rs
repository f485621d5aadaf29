use std::sync::LazyLock;

use regex::Regex;

/// Prefix of every exported filename.
pub const FILENAME_PREFIX: &str = "SOP_";

/// Stand-in when nothing usable is left of the name.
pub const UNKNOWN_NAME: &str = "Unknown";

static RESERVED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\?%*:|"<>]"#).expect("reserved character class"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("dash pattern"));
static UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("underscore pattern"));
static EDGES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[_-]+|[_-]+$").expect("edge pattern"));

/// Makes a name safe for use as a filename stem. May return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    let name = name.trim();
    let name = RESERVED.replace_all(name, "-");
    let name = WHITESPACE.replace_all(&name, "_");
    let name = DASHES.replace_all(&name, "-");
    let name = UNDERSCORES.replace_all(&name, "_");
    EDGES.replace_all(&name, "").into_owned()
}

/// `SOP_<safe name>.<extension>`, falling back to `Unknown` for the name.
pub fn derive_filename(name: &str, extension: &str) -> String {
    let safe = sanitize_filename(name);
    let stem = if safe.is_empty() {
        UNKNOWN_NAME
    } else {
        safe.as_str()
    };
    format!("{FILENAME_PREFIX}{stem}.{extension}")
}
