use crate::aggregate::Counts;

const BAR_WIDTH: usize = 50;

/// Terminal rendering of the aggregation: per-year totals as a bar chart,
/// then the per-manufacturer totals.
pub fn render(counts: &Counts, start_year: i32, end_year: i32) {
    let mut totals: Vec<(i32, u32)> = (start_year..end_year).map(|y| (y, 0)).collect();
    for per_year in counts.values() {
        for (year, count) in per_year {
            if let Some(slot) = totals.iter_mut().find(|(y, _)| y == year) {
                slot.1 += count;
            }
        }
    }
    let max = totals.iter().map(|(_, n)| *n).max().unwrap_or(0);

    println!("Ships constructed per year, {}..{}", start_year, end_year);
    println!("{}", "-".repeat(BAR_WIDTH + 12));
    for (year, count) in &totals {
        let bar = if max == 0 {
            String::new()
        } else {
            "#".repeat((*count as usize * BAR_WIDTH) / max as usize)
        };
        println!("{:>5} | {:<width$} {}", year, bar, count, width = BAR_WIDTH);
    }

    if counts.is_empty() {
        println!("\nNo manufacturers with ships in range.");
        return;
    }

    let mut by_total: Vec<(&String, u32)> = counts
        .iter()
        .map(|(manufacturer, per_year)| (manufacturer, per_year.values().sum()))
        .collect();
    by_total.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    println!("\n--- By manufacturer ---");
    for (manufacturer, total) in by_total {
        println!("{:>5} | {}", total, truncate(manufacturer, 60));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("Schichau-Werke", 60), "Schichau-Werke");
        assert_eq!(truncate("Königliche Werft Wilhelmshaven", 8), "Königlic...");
    }
}
