/// Normalizes caller text before it is used as a prompt.
///
/// Trims surrounding whitespace, then turns every `\n` and `\t` into a single
/// space. Trimming first means no newline or tab can survive at either end,
/// so the output never has leading/trailing whitespace. Runs of whitespace
/// inside the text are kept as they are.
pub fn sanitize_query(raw: &str) -> String {
    raw.trim().replace('\n', " ").replace('\t', " ")
}
