use lightrig::cli::{Args, Command};
use lightrig::config::Settings;
use lightrig::core::store::AttributeStore;
use lightrig::core::transfer::{TransferEngine, TransferReport, TransferRequest, transferable_attributes};
use lightrig::entities::{EntityType, NodeHandle, SchemaRegistry};
use lightrig::paths::{self, PathConfig};
use lightrig::scene::MemoryScene;
use lightrig::widgets::ae::{ControlSpec, panel_for};
use lightrig::SyncController;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    init_logging(&args, &path_config)?;
    debug!("Command-line args: {:?}", args);

    let settings_path = paths::config_file(paths::SETTINGS_FILE, &path_config);
    info!("Config path: {}", settings_path.display());
    let settings = Settings::load(&settings_path)?;
    let registry = Arc::new(SchemaRegistry::builtin());

    match &args.command {
        Command::Schema { type_name } => print_schema(&registry, type_name),
        Command::List => {
            let scene = load_scene(args.scene.as_deref())?;
            print_lights(scene, registry, settings);
            Ok(())
        }
        Command::Controls { node } => {
            let scene = load_scene(args.scene.as_deref())?;
            print_controls(&scene, &registry, &settings, node)
        }
        Command::Attrs { node } => {
            let scene = load_scene(args.scene.as_deref())?;
            for attr in transferable_attributes(&scene, &registry, node)? {
                println!("{attr}");
            }
            Ok(())
        }
        Command::Copy {
            from,
            attrs,
            to,
            json,
            output,
        } => {
            let mut scene = load_scene(args.scene.as_deref())?;
            let request = TransferRequest::new(
                resolve(&scene, from)?,
                attrs.clone(),
                to.iter().map(|n| resolve(&scene, n)).collect::<Result<Vec<_>>>()?,
            );
            let report = TransferEngine::new(registry).transfer(&mut scene, &request)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&scene, &report);
            }
            if let Some(path) = output {
                scene.save(path)?;
                info!("Scene written to {}", path.display());
            }
            Ok(())
        }
    }
}

fn init_logging(args: &Args, path_config: &PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = match log_path_opt {
            Some(p) => p.clone(),
            None => {
                paths::ensure_dirs(path_config)?;
                paths::data_file(paths::LOG_FILE, path_config)
            }
        };
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging, RUST_LOG wins when set
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level.as_str()))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn load_scene(path: Option<&Path>) -> Result<MemoryScene> {
    let Some(path) = path else {
        bail!("this command needs a scene: pass --scene <FILE>");
    };
    info!("Loading scene {}", path.display());
    MemoryScene::load(path)
}

fn resolve(scene: &MemoryScene, name: &str) -> Result<NodeHandle> {
    scene
        .handle_of(name)
        .with_context(|| format!("No such node in scene: {name}"))
}

fn print_schema(registry: &SchemaRegistry, type_name: &str) -> Result<()> {
    let entity_type: EntityType = type_name.parse()?;
    println!("{} ({:?})", entity_type, entity_type.family());
    for def in registry.lookup_strict(entity_type)? {
        let mut flags = Vec::new();
        if def.is_display() {
            flags.push("panel");
        }
        if def.is_transfer() {
            flags.push("copy");
        }
        let alias = def.alias.map(|g| format!(" alias={g}")).unwrap_or_default();
        println!("  {:<26} {:<13} {}{}", def.name, format!("{:?}", def.kind), flags.join(","), alias);
    }
    Ok(())
}

/// Open a sync session on the scene and print what it bound.
fn print_lights(scene: MemoryScene, registry: Arc<SchemaRegistry>, settings: Settings) {
    let mut ctl = SyncController::new(scene, registry, settings);
    ctl.open();
    for inst in ctl.instances() {
        println!(
            "{:<20} {:<20} {:<20} {:?}  {} bindings",
            inst.transform_name,
            inst.display_name,
            inst.entity_type,
            inst.entity_type.family(),
            ctl.bindings(inst.handle).len()
        );
    }
    ctl.close();
}

fn print_controls(scene: &MemoryScene, registry: &SchemaRegistry, settings: &Settings, node: &str) -> Result<()> {
    let handle = resolve(scene, node)?;
    let entity_type: EntityType = scene.node_type(node)?.parse()?;
    for spec in panel_for(scene, registry, handle, entity_type, settings.default_bound) {
        match spec {
            ControlSpec::Toggle { label, .. } => println!("  [toggle]  {label}"),
            ControlSpec::Numeric { label, min, max, .. } => println!("  [numeric] {label} ({min} .. {max})"),
        }
    }
    Ok(())
}

fn print_report(scene: &MemoryScene, report: &TransferReport) {
    let name = |h: NodeHandle| scene.name_of(h).unwrap_or_else(|_| h.to_string());
    for (dest, attr) in &report.successes {
        println!("ok    {}.{}", name(*dest), attr);
    }
    for f in &report.failures {
        println!("fail  {}.{}: {:?}", name(f.destination), f.attr, f.reason);
    }
    println!("{} copied, {} failed", report.successes.len(), report.failures.len());
}
