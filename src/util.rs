//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Render a number the way players type it: `60`, `37.5`, never `-0`.
pub fn fmt_num(v: f64) -> String {
  if v == 0.0 { "0".into() } else { format!("{}", v) }
}

/// Round to one decimal place (half away from zero).
pub fn round1(v: f64) -> f64 {
  (v * 10.0).round() / 10.0
}
