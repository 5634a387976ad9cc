use crate::model::HeatmapOutput;
use anyhow::Result;
use console::style;
use std::collections::BTreeMap;

pub fn output_json(output: &HeatmapOutput) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

fn intensity_char(count: u32, max: u32) -> &'static str {
    if count == 0 || max == 0 {
        return "·";
    }
    match ((count as f64 / max as f64) * 4.0).ceil() as u32 {
        0 | 1 => "░",
        2 => "▒",
        3 => "▓",
        _ => "█",
    }
}

/// Split `"YYYY-MM-DD-HH"` keys back into per-date hour rows.
fn rows(commits: &BTreeMap<String, u32>) -> BTreeMap<&str, [u32; 24]> {
    let mut rows: BTreeMap<&str, [u32; 24]> = BTreeMap::new();
    for (key, &count) in commits {
        let Some((date, hour)) = key.rsplit_once('-') else {
            continue;
        };
        let Ok(hour) = hour.parse::<usize>() else {
            continue;
        };
        if hour < 24 {
            rows.entry(date).or_insert([0; 24])[hour] += count;
        }
    }
    rows
}

pub fn output_heatmap(output: &HeatmapOutput) -> Result<()> {
    println!(
        "{} {} (since {})",
        style("Commit Activity Heatmap").bold(),
        style(&output.repo_name).cyan(),
        output.since_date
    );
    println!("{}", "─".repeat(61));

    if output.commits.is_empty() {
        println!("No commits to display");
    } else {
        let rows = rows(&output.commits);
        let max = rows.values().flat_map(|r| r.iter().copied()).max().unwrap_or(0);

        let header: String = (0..24).map(|h| if h % 6 == 0 { format!("{h:<2}") } else { "  ".to_string() }).collect();
        println!("{:<12}{}", "", header);
        for (date, hours) in &rows {
            let cells: String = hours
                .iter()
                .map(|&c| format!("{} ", intensity_char(c, max)))
                .collect();
            let total: u32 = hours.iter().sum();
            println!("{:<12}{}{:>4}", date, style(cells).green(), total);
        }
    }

    let stats = &output.stats;
    println!("\n{}", style("Statistics").bold());
    println!("  Total commits:      {}", stats.total_commits);
    println!("  Active days:        {}", stats.unique_days);
    println!("  Peak hour:          {:02}:00", stats.peak_hour);
    println!("  Current streak:     {} days", stats.current_streak);
    println!("  Busiest day:        {}", stats.busiest_day);
    println!("  Commits/active day: {:.1}", stats.avg_commits_per_day);

    println!("\n{}", style("Legend").bold());
    println!("  {} commits per hour, relative to the busiest hour", style("░▒▓█").green());

    Ok(())
}
