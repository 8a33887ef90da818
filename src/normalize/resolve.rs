use std::io::{self, BufRead, Write};

use tracing::warn;

/// Operator-supplied answer for a displacement field with more numbers
/// than target sub-fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub standard: f64,
    pub full_load: Option<f64>,
}

/// Decides ambiguous displacement values. The displacement pass itself
/// stays a pure function; the one interactive side effect lives behind
/// this seam so batch and test runs can swap in a non-interactive policy.
pub trait DisplacementResolver {
    fn resolve(&mut self, raw: &str) -> Option<Resolution>;
}

/// Asks the operator on stdin/stdout. An unparsable or empty standard
/// value declines the row.
pub struct PromptResolver;

impl DisplacementResolver for PromptResolver {
    fn resolve(&mut self, raw: &str) -> Option<Resolution> {
        println!("Ambiguous displacement value:");
        println!("  {}", raw.trim());
        let standard = prompt("  standard displacement: ")?.parse().ok()?;
        let full_load = full_load_answer(prompt("  full-load displacement (blank to skip): "));
        Some(Resolution {
            standard,
            full_load,
        })
    }
}

/// Blank means no second value; an answer that does not parse is reported
/// before being discarded rather than silently dropped.
fn full_load_answer(answer: Option<String>) -> Option<f64> {
    let answer = answer?;
    match answer.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            println!("  ignoring unparsable full-load value {:?}", answer);
            None
        }
    }
}

fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let line = line.trim().to_string();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

/// Never resolves; rows are left without displacement fields and logged
/// for manual review. Drop-in policy for batch runs.
pub struct SkipResolver;

impl DisplacementResolver for SkipResolver {
    fn resolve(&mut self, raw: &str) -> Option<Resolution> {
        warn!("Skipping ambiguous displacement (manual review): {}", raw.trim());
        None
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_load_answer_parses_or_declines() {
        assert_eq!(full_load_answer(Some("6020".to_string())), Some(6020.0));
        assert_eq!(full_load_answer(Some("6020.5".to_string())), Some(6020.5));
        // Reported, then treated as no second value.
        assert_eq!(full_load_answer(Some("6,020 tons".to_string())), None);
        assert_eq!(full_load_answer(None), None);
    }
}
