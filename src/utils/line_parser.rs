/// Pull a betting line out of a free-text selection.
///
/// "Chiefs -7.5" -> -7.5
/// "Over 45.5" -> 45.5
/// "Lakers +3 (-110)" -> 3.0 (anything in parentheses is treated as a price)
/// "Chiefs -7.5 -110" -> -7.5 (a signed price after the line is dropped)
/// "Eagles PK" -> 0.0
///
/// Returns None when no number is present, or when more than one line is
/// left after prices are removed; callers must not guess a line.
pub fn parse_line(selection: &str) -> Option<f64> {
    let stripped = strip_parenthesized(selection);

    let mut candidates: Vec<Candidate> = Vec::new();
    for token in stripped.split_whitespace() {
        let token = token.trim_end_matches(',');
        let lower = token.to_ascii_lowercase();
        if matches!(lower.as_str(), "pk" | "pick" | "pick'em" | "pickem") {
            candidates.push(Candidate {
                value: 0.0,
                looks_like_price: false,
            });
            continue;
        }
        // Shorthand like "o45.5" / "u45.5"
        let numeric = lower
            .strip_prefix('o')
            .or_else(|| lower.strip_prefix('u'))
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit() || c == '.'))
            .unwrap_or(lower.as_str());
        if let Some(candidate) = parse_candidate(numeric) {
            // A price only counts as one when a line came before it
            if candidate.looks_like_price && !candidates.is_empty() {
                continue;
            }
            candidates.push(candidate);
        }
    }

    match candidates.as_slice() {
        [only] => Some(only.value),
        _ => None,
    }
}

struct Candidate {
    value: f64,
    /// Signed whole number of magnitude 100 or more, e.g. "-110" or "+150"
    looks_like_price: bool,
}

fn strip_parenthesized(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn parse_candidate(token: &str) -> Option<Candidate> {
    // "½" shows up in copy-pasted sportsbook lines
    let token = token.replace('½', ".5");
    let signed = token.starts_with('+') || token.starts_with('-');
    let body = token.strip_prefix('+').unwrap_or(&token);
    if body.is_empty() || !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !body
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == '.' || (i == 0 && c == '-'))
    {
        return None;
    }
    let value = body.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(Candidate {
        value,
        looks_like_price: signed && !body.contains('.') && value.abs() >= 100.0,
    })
}
