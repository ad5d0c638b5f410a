use agent_recipes::cli::commands::{
    CheckCommand, ListCommand, ShowCommand, ToolCommand, ValidateCommand,
};
use agent_recipes::cli::output::*;
use agent_recipes::cli::{Cli, Command};
use agent_recipes::core::checks::{advertised_template, check_catalog_with, ADVERTISED};
use agent_recipes::core::{RecipeConfig, Settings, TemplateCatalog, Workflow};
use agent_recipes::tools::registry_for;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{error, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.templates {
        settings.templates_dir = Some(dir.clone());
    }

    // Execute command
    match &cli.command {
        Command::List(cmd) => list_templates(cmd, &settings)?,
        Command::Show(cmd) => show_template(cmd, &settings)?,
        Command::Validate(cmd) => validate_recipe(cmd, &settings)?,
        Command::Check(cmd) => check_templates(cmd, &settings)?,
        Command::Tool(cmd) => call_tool(cmd, &settings).await?,
    }

    Ok(())
}

fn open_catalog(settings: &Settings) -> Result<TemplateCatalog> {
    TemplateCatalog::open(settings.templates_dir())
}

fn list_templates(cmd: &ListCommand, settings: &Settings) -> Result<()> {
    let catalog = open_catalog(settings)?;

    if cmd.json {
        let templates: Vec<_> = catalog
            .names()
            .iter()
            .map(|name| {
                let description = catalog
                    .load(name)
                    .ok()
                    .and_then(|recipe| recipe.config.description);
                json!({
                    "name": name,
                    "layer": advertised_template(name).map(|t| t.layer),
                    "description": description,
                    "tools": registry_for(name, settings)
                        .map(|r| r.names().iter().map(|n| n.to_string()).collect::<Vec<_>>())
                        .unwrap_or_default(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json!({ "templates": templates }))?);
        return Ok(());
    }

    if catalog.names().is_empty() {
        println!("{} No templates found in {}", INFO, catalog.root().display());
        return Ok(());
    }

    println!(
        "{} Templates in {}:",
        INFO,
        style(catalog.root().display()).dim()
    );
    for name in catalog.names() {
        let tools = registry_for(name, settings).map_or(0, |r| r.len());
        println!(
            "  {} [{}] {}",
            style(name).bold(),
            format_layer(advertised_template(name).map(|t| t.layer)),
            style(format!("{} tools", tools)).dim()
        );
    }

    Ok(())
}

fn show_template(cmd: &ShowCommand, settings: &Settings) -> Result<()> {
    let catalog = open_catalog(settings)?;
    let recipe = catalog.load(&cmd.name)?;
    let registry = registry_for(&cmd.name, settings);

    if cmd.json {
        let tools: Vec<_> = registry
            .iter()
            .flat_map(|r| r.all())
            .map(|t| json!({ "name": t.name(), "description": t.description() }))
            .collect();
        let data = json!({
            "name": recipe.name,
            "dir": recipe.dir,
            "descriptor": recipe.config,
            "execution_order": recipe.workflow.execution_order(),
            "tools": tools,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} {}", INFO, style(&recipe.name).bold());
    if let Some(description) = &recipe.config.description {
        println!("  {}", description.trim());
    }
    println!(
        "  Layer: {}",
        format_layer(advertised_template(&recipe.name).map(|t| t.layer))
    );

    let keys: Vec<String> = recipe
        .config
        .config
        .keys()
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect();
    if !keys.is_empty() {
        println!("  Config: {}", style(keys.join(", ")).cyan());
    }
    if recipe.config.has_input() {
        println!("  Input: {}", style("declared").green());
    }

    if !recipe.workflow.is_empty() {
        println!("\n  {}", style("Workflow:").bold());
        for line in format_workflow(&recipe.workflow) {
            println!("  {}", line);
        }
    }

    match &registry {
        Some(registry) => {
            println!("\n  {}", style("Tools:").bold());
            for tool in registry.all() {
                println!(
                    "    {}{} - {}",
                    TOOL,
                    style(tool.name()).cyan(),
                    style(tool.description()).dim()
                );
            }
        }
        None => println!("\n{} No tools registered for {}", WARN, recipe.name),
    }

    Ok(())
}

fn validate_recipe(cmd: &ValidateCommand, settings: &Settings) -> Result<()> {
    println!("{} Validating recipe...", INFO);

    let result = match (&cmd.name, &cmd.file) {
        (_, Some(file)) => RecipeConfig::from_file(file),
        (Some(name), None) => open_catalog(settings)
            .and_then(|catalog| catalog.load(name))
            .map(|recipe| recipe.config),
        (None, None) => anyhow::bail!("Either a template name or --file is required"),
    };

    match result {
        Ok(config) => {
            let workflow = Workflow::from_stages(config.workflow_stages());
            println!("{} Recipe descriptor is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Config keys: {}", style(config.config.len()).cyan());
            println!("  Stages: {}", style(workflow.len()).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    }
}

fn check_templates(cmd: &CheckCommand, settings: &Settings) -> Result<()> {
    let catalog = open_catalog(settings)?;

    let report = if cmd.json {
        check_catalog_with(&catalog, settings, |_| {})
    } else {
        let progress = create_progress_bar(ADVERTISED.len());
        let report = check_catalog_with(&catalog, settings, |check| {
            progress.set_message(check.name.clone());
            progress.inc(1);
        });
        progress.finish_and_clear();
        report
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for check in &report.templates {
            println!("{}", format_check(check));
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        if !cmd.json {
            println!(
                "\n{} {} of {} templates {}",
                CROSS,
                style(failed).red(),
                report.templates.len(),
                style("failed").red()
            );
        }
        std::process::exit(1);
    }

    if !cmd.json {
        println!(
            "\n{} All {} templates passed {}",
            CHECK,
            report.templates.len(),
            style("successfully").green()
        );
    }
    Ok(())
}

async fn call_tool(cmd: &ToolCommand, settings: &Settings) -> Result<()> {
    let registry = registry_for(&cmd.template, settings)
        .with_context(|| format!("Template '{}' has no tools", cmd.template))?;

    // Recipe config supplies defaults when the template is in the catalog
    let args = cmd.arguments()?;
    let args = match open_catalog(settings).and_then(|catalog| catalog.load(&cmd.template)) {
        Ok(recipe) => recipe.tool_arguments(args)?,
        Err(e) => {
            tracing::debug!("No recipe defaults for {}: {:#}", cmd.template, e);
            args
        }
    };

    let Some(output) = registry.invoke(&cmd.tool, &args).await else {
        println!(
            "{} Unknown tool {} (available: {})",
            CROSS,
            style(&cmd.tool).red(),
            registry.names().join(", ")
        );
        std::process::exit(1);
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    if let Some(message) = output.get("error").and_then(|e| e.as_str()) {
        error!("{} failed: {}", cmd.tool, message);
        std::process::exit(1);
    }

    Ok(())
}
