//! Command runners framed with cliclack intro/outro

use super::prompt::TerminalPrompt;
use crate::context::{GenerationMode, PipelineContext};
use crate::error::Result;
use crate::pipeline::{self, NewProjectOptions, NewProjectOutcome, PipelineStage};
use crate::project::ProjectDefinition;
use crate::release::{ArtifactCache, ReleaseIndexClient};
use std::path::{Path, PathBuf};

const TITLE: &str = "NovelRT";

/// Generate a new project, optionally configuring and building it
pub async fn new_project(
    ctx: &PipelineContext,
    options: NewProjectOptions,
) -> Result<NewProjectOutcome> {
    cliclack::intro(TITLE)?;

    let index = ReleaseIndexClient::from_config(&ctx.config)?;
    let pipeline = pipeline::NewProjectPipeline::new(ctx, index);
    let mut prompt = TerminalPrompt::new();
    let outcome = pipeline.run(&options, &mut prompt).await?;

    let engine = match (&outcome.mode, &outcome.engine_tag) {
        (GenerationMode::Prebuilt, Some(tag)) => format!("NovelRT {}", tag),
        _ => "a source build of NovelRT".to_string(),
    };
    cliclack::log::success(format!(
        "Project {} created in {} with {}",
        outcome.project_name,
        outcome.project_dir.display(),
        engine
    ))?;

    print_next_steps(&outcome)?;
    Ok(outcome)
}

fn next_steps(outcome: &NewProjectOutcome) -> Vec<String> {
    let mut steps = Vec::new();
    let current = std::env::current_dir().ok();

    if current.as_deref() != Some(outcome.project_dir.as_path()) {
        steps.push(format!("cd {}", outcome.project_dir.display()));
    }

    match outcome.stage {
        PipelineStage::Built => {}
        PipelineStage::Configured => steps.push("novelrt build".to_string()),
        _ => steps.push("novelrt build (or cmake -S . -B build)".to_string()),
    }
    steps.push("novelrt publish <output directory>".to_string());
    steps
}

fn print_next_steps(outcome: &NewProjectOutcome) -> Result<()> {
    let steps = next_steps(outcome);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy coding!")?;
    Ok(())
}

/// Install, configure and build the project in `project_dir`
pub async fn build(ctx: &PipelineContext, project_dir: &Path) -> Result<ProjectDefinition> {
    cliclack::intro(TITLE)?;

    let mut prompt = TerminalPrompt::new();
    let definition = pipeline::build_project(ctx, project_dir, &mut prompt).await?;

    cliclack::outro(format!(
        "Built {} ({})",
        definition.name, definition.last_build_configuration
    ))?;
    Ok(definition)
}

/// Release-build `project_dir` into `output_dir`
pub async fn publish(ctx: &PipelineContext, project_dir: &Path, output_dir: &Path) -> Result<PathBuf> {
    cliclack::intro(TITLE)?;
    cliclack::log::info(format!("Publishing to {}", output_dir.display()))?;

    let published = crate::publish::publish(ctx, project_dir, output_dir).await?;

    cliclack::outro(format!("Published to {}", published.display()))?;
    Ok(published)
}

/// List the engine versions present in the local cache
pub fn versions(ctx: &PipelineContext) -> Result<Vec<String>> {
    let cache = ArtifactCache::from_config(&ctx.config);
    let tags = cache.list()?;

    cliclack::intro(TITLE)?;
    if tags.is_empty() {
        cliclack::log::info("None are locally available at this time.")?;
    } else {
        cliclack::log::info(format!("Locally available versions in {}:", cache.root().display()))?;
        for tag in &tags {
            println!("  {}", tag);
        }
    }
    cliclack::outro(format!("{} version(s)", tags.len()))?;
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(stage: PipelineStage) -> NewProjectOutcome {
        NewProjectOutcome {
            project_name: "demo".to_string(),
            project_dir: PathBuf::from("/definitely/not/cwd/demo"),
            mode: GenerationMode::Prebuilt,
            engine_tag: Some("v0.1.0".to_string()),
            stage,
        }
    }

    #[test]
    fn test_next_steps_follow_stage() {
        let steps = next_steps(&outcome(PipelineStage::Generated));
        assert_eq!(steps[0], "cd /definitely/not/cwd/demo");
        assert!(steps[1].starts_with("novelrt build"));

        let steps = next_steps(&outcome(PipelineStage::Built));
        assert_eq!(steps.len(), 2);
        assert!(steps[1].starts_with("novelrt publish"));
    }
}
