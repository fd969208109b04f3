use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use exprmap::diagnostics::render_span_error;
use exprmap::rewrite::resolve_member;
use exprmap::{demo, parse_manifest, Expr, MemberKind, Reflect, Rewriter};

#[derive(Parser)]
#[command(name = "exprmap", version, about = "Retarget expression trees from one set of types to another")]
struct Cli {
    /// Log level for rewrite tracing (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite the built-in item/group query and print it before and after
    Demo {
        /// Print both trees as JSON
        #[arg(long)]
        json: bool,
        /// Substitute items first, then groups, as two separate passes
        #[arg(long)]
        staged: bool,
    },
    /// Resolve every member of every substituted class in a manifest
    Check {
        /// Manifest path
        manifest: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(cli.log)
        .init();

    match cli.command {
        Commands::Demo { json, staged } => {
            if let Err(msg) = run_demo(json, staged) {
                eprintln!("error: {msg}");
                std::process::exit(1);
            }
        }
        Commands::Check { manifest } => {
            if let Err(msg) = run_check(&manifest) {
                eprintln!("error [{}]: {msg}", manifest.display());
                std::process::exit(1);
            }
        }
    }
}

fn run_demo(json: bool, staged: bool) -> Result<(), String> {
    let catalog = demo::catalog();
    let before = demo::query(&catalog).map_err(|e| e.to_string())?;
    let after = if staged {
        let (items, groups) = (demo::item_config(), demo::group_config());
        exprmap::rewrite_staged(&before, &[&items, &groups], &catalog)
    } else {
        Rewriter::new(&demo::config(), &catalog).rewrite(&before)
    }
    .map_err(|e| e.to_string())?;

    if json {
        print_json(&before, &after)
    } else {
        println!("before: {before}");
        println!("after:  {after}");
        Ok(())
    }
}

fn print_json(before: &Expr, after: &Expr) -> Result<(), String> {
    let doc = serde_json::json!({ "before": before, "after": after });
    let text = serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn run_check(path: &Path) -> Result<(), String> {
    let source = std::fs::read_to_string(path).map_err(|e| format!("failed to read manifest: {e}"))?;
    let manifest = match parse_manifest(&source) {
        Ok(m) => m,
        Err(err) => {
            if let Some(span) = err.span() {
                render_span_error(&source, &path.display().to_string(), &err.to_string(), span);
            }
            return Err(err.to_string());
        }
    };

    let mut resolved = 0usize;
    for (from, to) in manifest.config.substitutions() {
        let Some(class) = manifest.catalog.class(from.full_name()) else {
            continue;
        };
        for (kind, decl) in class.members() {
            let member = match kind {
                MemberKind::Property => manifest.catalog.property(from, &decl.name),
                MemberKind::Field => manifest.catalog.field(from, &decl.name),
            };
            let Some(member) = member else { continue };
            let target = resolve_member(&member, &manifest.config, &manifest.catalog).map_err(|e| e.to_string())?;
            println!("{member} -> {target} ({kind})");
            resolved += 1;
        }
        eprintln!("{from} -> {to}: ok");
    }
    eprintln!("check: {resolved} member(s) resolved");
    Ok(())
}
