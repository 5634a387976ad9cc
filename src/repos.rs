use crate::cli::ReposAction;
use crate::config::Settings;
use crate::model::{MetadataUpdate, RepoListing, RepositoryEntry};
use crate::registry::Registry;
use crate::translate::translator_from_env;
use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

pub fn exec(settings: &Settings, action: ReposAction) -> anyhow::Result<()> {
    let registry = Registry::new(settings, translator_from_env());
    registry
        .initialize()
        .context("Failed to initialize repository registry")?;

    match action {
        ReposAction::List { json } => {
            let listing = registry.list().context("Failed to list repositories")?;
            if json {
                print_json(&listing)
            } else {
                output_listing(&listing);
                Ok(())
            }
        }
        ReposAction::Discover { json } => discover(&registry, json),
        ReposAction::Add { path, name, json } => {
            let entry = registry
                .add(&path, name.as_deref())
                .with_context(|| format!("Failed to add repository '{path}'"))?;
            if json {
                return print_json(&entry);
            }
            println!(
                "{} {} {}",
                style("Added").green().bold(),
                style(&entry.id).cyan(),
                style(format!("({})", registry.full_path(&entry.path).display())).dim()
            );
            Ok(())
        }
        ReposAction::Remove { id, json } => {
            let outcome = registry
                .delete(&id)
                .with_context(|| format!("Failed to remove repository '{id}'"))?;
            if json {
                return print_json(&outcome);
            }
            println!("{} {}", style("Removed").green().bold(), style(&id).cyan());
            if let Some(default) = &outcome.new_default_repo {
                println!("Default repository: {}", style(default).cyan());
            }
            Ok(())
        }
        ReposAction::Default { id, json } => {
            let outcome = registry
                .set_default(&id)
                .with_context(|| format!("Failed to set default repository '{id}'"))?;
            if json {
                return print_json(&outcome);
            }
            println!(
                "Default repository: {}",
                style(&outcome.default_repo).cyan()
            );
            Ok(())
        }
        ReposAction::Update {
            id,
            display_name,
            description,
            url,
            source_lang,
            json,
        } => {
            let update = MetadataUpdate {
                display_name: display_name.map(Some),
                description: description.map(Some),
                url: url.map(Some),
                source_lang: Some(source_lang),
            };
            let entry = registry
                .update_metadata(&id, update)
                .with_context(|| format!("Failed to update repository '{id}'"))?;
            if json {
                return print_json(&entry);
            }
            output_entry(&entry);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn discover(registry: &Registry, json: bool) -> anyhow::Result<()> {
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
    pb.set_message(format!("Scanning {}...", registry.base().display()));
    let output = registry.discover();
    pb.finish_and_clear();
    let output = output.context("Failed to discover repositories")?;

    if json {
        return print_json(&output);
    }
    if let Some(error) = &output.error {
        println!("{} {}", style("Error:").red().bold(), error);
        return Ok(());
    }
    if output.discovered.is_empty() {
        println!("No unregistered repositories under {}", registry.base().display());
        return Ok(());
    }
    println!("{:<40} {}", style("Id").bold(), style("Path").bold());
    println!("{}", "─".repeat(80));
    for repo in &output.discovered {
        println!("{:<40} {}", repo.id, repo.path);
    }
    Ok(())
}

fn output_listing(listing: &RepoListing) {
    if listing.repos.is_empty() {
        println!("No repositories registered");
        return;
    }
    println!(
        "  {:<32} {:<28} {}",
        style("Id").bold(),
        style("Name").bold(),
        style("Path").bold()
    );
    println!("{}", "─".repeat(90));
    for repo in &listing.repos {
        let marker = if repo.is_default { "*" } else { " " };
        println!(
            "{} {:<32} {:<28} {}",
            style(marker).yellow().bold(),
            repo.id,
            repo.display_name.as_deref().unwrap_or(&repo.name),
            style(&repo.full_path).dim()
        );
        if let Some(description) = &repo.description {
            let text = description.text_in("en");
            if !text.is_empty() {
                println!("  {}", style(text).dim());
            }
        }
    }
}

fn output_entry(entry: &RepositoryEntry) {
    println!("{} {}", style("Updated").green().bold(), style(&entry.id).cyan());
    println!("  Name:        {}", entry.label());
    if let Some(description) = &entry.description {
        println!("  Description: {}", description.text_in("fr"));
        println!("               {}", description.text_in("en"));
    }
    if let Some(url) = &entry.url {
        println!("  URL:         {url}");
    }
}
