//! Small utility helpers used across modules.

/// Integer completion percentage; 0 when there is nothing to complete.
pub fn percentage(completed: usize, total: usize) -> usize {
  if total == 0 { 0 } else { completed * 100 / total }
}

/// Log-safe truncation for long strings (titles, code snippets).
pub fn trunc_for_log(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    None => s.to_string(),
    Some((cut, _)) => format!("{}… ({} bytes total)", &s[..cut], s.len()),
  }
}

/// `error: cause: cause ...` for errors whose message leaves the source out.
pub fn error_chain(err: &dyn std::error::Error) -> String {
  let mut out = err.to_string();
  let mut source = err.source();
  while let Some(cause) = source {
    out.push_str(": ");
    out.push_str(&cause.to_string());
    source = cause.source();
  }
  out
}
