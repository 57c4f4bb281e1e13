//! Placeholder substitution for command templates.
//!
//! Templates are stored with apostrophes escaped as [`APOSTROPHE_ESCAPE`]. [`render`] substitutes
//! `$(touser)`, `$(user)` and `$(counter)` and decodes the escape marker in a single left-to-right
//! scan: only template text is decoded, substituted values are copied verbatim.
//! [`render_list_item`] does the same and also fills `$(list)` in that scan.

pub const TOUSER_PLACEHOLDER: &str = "$(touser)";
pub const USER_PLACEHOLDER: &str = "$(user)";
pub const COUNTER_PLACEHOLDER: &str = "$(counter)";
/// Marks a list-backed command; only [`render_list_item`] fills it.
pub const LIST_MARKER: &str = "$(list)";
pub const APOSTROPHE_ESCAPE: &str = "&apos;";

/// Renders `template` for one invocation.
///
/// `target` is the explicit second token of the invoking message, if any; it wins over the
/// invoker's display name for both user placeholders. `$(counter)` is left in place when
/// `counter` is `None`.
pub fn render(template: &str, target: Option<&str>, invoker: &str, counter: Option<i64>) -> String {
    render_with(template, None, target, invoker, counter)
}

/// Renders the lookup text of a list-backed command: `$(list)` becomes `item` (stored form,
/// apostrophes escaped) and the user placeholders name the invoker.
pub fn render_list_item(template: &str, item: &str, invoker: &str, counter: Option<i64>) -> String {
    let item = item.replace(APOSTROPHE_ESCAPE, "'");
    render_with(template, Some(&item), None, invoker, counter)
}

fn render_with(
    template: &str,
    list_item: Option<&str>,
    target: Option<&str>,
    invoker: &str,
    counter: Option<i64>,
) -> String {
    let user = target.unwrap_or(invoker);
    let counter = counter.map(|c| c.to_string());

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(&['$', '&'][..]) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if let Some(tail) = rest.strip_prefix(TOUSER_PLACEHOLDER) {
            out.push_str(user);
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix(USER_PLACEHOLDER) {
            out.push_str(user);
            rest = tail;
        } else if let (Some(value), Some(tail)) =
            (counter.as_deref(), rest.strip_prefix(COUNTER_PLACEHOLDER))
        {
            out.push_str(value);
            rest = tail;
        } else if let (Some(item), Some(tail)) = (list_item, rest.strip_prefix(LIST_MARKER)) {
            out.push_str(item);
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix(APOSTROPHE_ESCAPE) {
            out.push('\'');
            rest = tail;
        } else {
            // '$' and '&' are single-byte
            out.push_str(&rest[..1]);
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Escapes apostrophes for storage.
pub fn escape_apostrophes(text: &str) -> String {
    text.replace('\'', APOSTROPHE_ESCAPE)
}

pub fn has_list_marker(template: &str) -> bool {
    template.contains(LIST_MARKER)
}

/// Template text of a list-backed command without the list marker.
pub fn strip_list_marker(template: &str) -> String {
    template.replace(LIST_MARKER, "").trim().to_string()
}
