use std::io::Write;

use anyhow::Result;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

/// Terminal stand-in for a quick-pick: prints the configured project labels
/// as a numbered list and reads one choice from stdin. Empty input or an
/// unknown number selects nothing.
pub async fn pick_project(projects: &[String]) -> Result<Option<String>> {
    if projects.is_empty() {
        println!("No projects configured.");
        return Ok(None);
    }

    println!("Select a project to track time under:");
    for (index, project) in projects.iter().enumerate() {
        println!("  {}. {project}", index + 1);
    }
    print!("> ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(stdin()).read_line(&mut line).await?;
    let choice = line.trim();
    if choice.is_empty() {
        return Ok(None);
    }

    match choice.parse::<usize>() {
        Ok(n) if (1..=projects.len()).contains(&n) => Ok(Some(projects[n - 1].clone())),
        _ => {
            println!("No such project.");
            Ok(None)
        }
    }
}
