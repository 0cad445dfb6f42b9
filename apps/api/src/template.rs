//! `{placeholder}` substitution for prompts and reports.

/// Single-pass placeholder substitution: inserted values are never rescanned,
/// so braces in user text stay literal. Keys include their braces.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        match values.iter().find(|(key, _)| rest.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &rest[key.len()..];
            }
            None => {
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_every_occurrence() {
        let out = fill("{a} and {a}, then {b}", &[("{a}", "x"), ("{b}", "y")]);
        assert_eq!(out, "x and x, then y");
    }

    #[test]
    fn test_inserted_values_are_not_rescanned() {
        let out = fill("{a}|{b}", &[("{a}", "{b}"), ("{b}", "B")]);
        assert_eq!(out, "{b}|B");
    }

    #[test]
    fn test_unknown_braces_are_kept() {
        assert_eq!(fill("css { color: red }", &[("{a}", "x")]), "css { color: red }");
    }
}
