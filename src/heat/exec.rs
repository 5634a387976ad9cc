use super::{output_heatmap, output_json, Heatmap, HeatmapStats};
use crate::config::Settings;
use crate::error::{GlyphError, Result};
use crate::git::GitLog;
use crate::model::HeatmapOutput;
use crate::registry::{Registry, ResolvedRepo};
use crate::translate::{translator_from_env, Language};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn parse_since(since: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(since.trim(), "%Y-%m-%d")
        .map_err(|_| GlyphError::Validation(format!("Invalid since date '{since}', expected YYYY-MM-DD")))
}

/// Heatmap and statistics for one resolved repository.
pub async fn build_heatmap(
    repo: &ResolvedRepo,
    git: &GitLog,
    since: Option<&str>,
    lang: Language,
    today: NaiveDate,
) -> Result<HeatmapOutput> {
    let since = since
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_since)
        .transpose()?;

    let stamps = git.hour_stamps(&repo.full_path, since).await?;
    let heatmap = Heatmap::from_lines(&stamps);
    log::info!(
        "{}: {} commits in {} buckets",
        repo.entry.id,
        heatmap.total(),
        heatmap.iter().count()
    );

    let since_date = match since {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => git
            .first_commit_date(&repo.full_path)
            .await?
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
    };

    let stats = HeatmapStats::compute(&heatmap, today, lang);
    Ok(HeatmapOutput {
        repo: repo.entry.path.clone(),
        repo_name: repo.repo_name(),
        since_date,
        commits: heatmap.keyed(),
        stats,
    })
}

pub async fn exec(
    settings: &Settings,
    id: &str,
    since: Option<&str>,
    lang: Language,
    json: bool,
) -> anyhow::Result<()> {
    let registry = Registry::new(settings, translator_from_env());
    registry.initialize().context("Failed to initialize repository registry")?;
    let repo = registry
        .resolve(id)
        .with_context(|| format!("Failed to resolve repository '{id}'"))?;

    let pb = if json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };
    pb.set_message(format!("Reading history of {}...", repo.entry.label()));

    let output = build_heatmap(&repo, &settings.git_log(), since, lang, Local::now().date_naive()).await;
    pb.finish_and_clear();
    let output = output.context("Failed to build commit heatmap")?;

    if json {
        output_json(&output)?;
    } else {
        output_heatmap(&output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(unix)]
    use crate::git::timestamps::tests::fake_git;
    use crate::registry::tests::Fixture;

    #[test]
    fn since_must_be_a_calendar_date() {
        assert_eq!(
            parse_since(" 2024-02-29 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(matches!(parse_since("2023-02-29"), Err(GlyphError::Validation(_))));
        assert!(matches!(parse_since("2 weeks ago"), Err(GlyphError::Validation(_))));
    }

    #[tokio::test]
    async fn bad_since_fails_before_running_git() {
        let fx = Fixture::new();
        fx.make_repo("app");
        let registry = fx.registry();
        registry.add("app", None).unwrap();
        let repo = registry.resolve("app").unwrap();

        let git = GitLog::new("definitely-not-a-git-binary");
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let err = build_heatmap(&repo, &git, Some("yesterday"), Language::En, today)
            .await
            .unwrap_err();
        assert!(matches!(err, GlyphError::Validation(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn repository_without_commits_starts_today() {
        let fx = Fixture::new();
        fx.make_repo("empty");
        let registry = fx.registry();
        registry.add("empty", None).unwrap();
        let repo = registry.resolve("empty").unwrap();

        let git = GitLog::new(fake_git(fx.dir.path(), "exit 0").to_string_lossy());
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let output = build_heatmap(&repo, &git, None, Language::En, today).await.unwrap();
        assert_eq!(output.since_date, "2024-06-01");
        assert!(output.commits.is_empty());
        assert_eq!(output.stats.total_commits, 0);
        assert_eq!(output.stats.peak_hour, 12);
        assert_eq!(output.repo_name, "empty");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn explicit_since_is_echoed_and_passed_to_git() {
        let fx = Fixture::new();
        fx.make_repo("app");
        let registry = fx.registry();
        registry.add("app", None).unwrap();
        let repo = registry.resolve("app").unwrap();

        // prints one commit only when asked for the bounded window
        let script = r#"case "$*" in *--since=2024-05-01*) echo "2024-05-02 08";; esac"#;
        let git = GitLog::new(fake_git(fx.dir.path(), script).to_string_lossy());
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let output = build_heatmap(&repo, &git, Some("2024-05-01"), Language::Fr, today)
            .await
            .unwrap();
        assert_eq!(output.since_date, "2024-05-01");
        assert_eq!(output.commits.get("2024-05-02-08"), Some(&1));
        assert_eq!(output.stats.busiest_day, "Jeudi");
    }
}
