
/// True when `value` has nothing but whitespace.
pub fn is_str_blank(value: &str) -> bool {
    value.trim().is_empty()
}
