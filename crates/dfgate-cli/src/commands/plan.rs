use dfgate_core::{CiMode, GateConfig};
use dfgate_runner::GenerationMode;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What `dfgate run` would do, as resolved from the environment.
#[derive(Serialize)]
struct Plan<'a> {
    mode: CiMode,
    base_branch: &'a str,
    path_of_interest: String,
    build_dir: &'a Path,
    context_dir: PathBuf,
    generator: Vec<String>,
    build_command: Vec<String>,
}

pub async fn plan(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = GateConfig::from_env(config_path)?;
    let context_dir = config.context_dir();

    let plan = Plan {
        mode: config.ci.mode(),
        base_branch: &config.ci.branch,
        path_of_interest: config.coordinates.path_of_interest(),
        build_dir: &config.ci.build_dir,
        generator: vec![
            config.tools.generator.interpreter.clone(),
            config.generator_script().display().to_string(),
            GenerationMode::Dir.as_arg().to_owned(),
            format!("-d{}", context_dir.display()),
        ],
        build_command: std::iter::once(config.tools.build.program.clone())
            .chain(config.tools.build.args.iter().cloned())
            .collect(),
        context_dir,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Mode:             {}", plan.mode);
    println!("Base branch:      {}", plan.base_branch);
    println!("Path of interest: {}", plan.path_of_interest);
    println!("Build dir:        {}", plan.build_dir.display());
    println!("Context dir:      {}", plan.context_dir.display());
    println!("Generator:        {}", plan.generator.join(" "));
    println!("Build command:    {}", plan.build_command.join(" "));
    Ok(())
}
