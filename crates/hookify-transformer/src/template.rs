//! Template reconstruction and body re-indentation.

/// Indentation of template lines inside the generated `return ( ... )`.
pub const TEMPLATE_INDENT: &str = "    ";

/// Re-indents and linearizes a markup expression for emission.
///
/// Every line is trimmed, blank lines are dropped, and the remaining lines are
/// joined with a newline plus [`TEMPLATE_INDENT`]. Nesting indentation of the
/// original markup is not preserved.
pub fn reconstruct_template(template: &str) -> String {
    template
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(&format!("\n{}", TEMPLATE_INDENT))
}

/// Re-indents a block of statements to `indent`.
///
/// Leading and trailing blank lines are removed and the common indentation of
/// the remaining lines is replaced by `indent`. A first line that shares its
/// line with an opening brace (no leading newline in `body`) does not take
/// part in computing the common indentation.
pub fn reindent(body: &str, indent: &str) -> String {
    let first_inline = !body
        .trim_start_matches(|c: char| c == ' ' || c == '\t')
        .starts_with(['\n', '\r']);

    let lines: Vec<&str> = body.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };

    let common = lines[first..=last]
        .iter()
        .enumerate()
        .filter(|(idx, line)| !(first_inline && first + idx == 0) && !line.trim().is_empty())
        .map(|(_, line)| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    lines[first..=last]
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if line.trim().is_empty() {
                String::new()
            } else if first_inline && first + idx == 0 {
                format!("{}{}", indent, line.trim())
            } else {
                let stripped: String = line.chars().skip(common).collect();
                format!("{}{}", indent, stripped.trim_end())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}
