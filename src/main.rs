use anyhow::{Context, Result};
use clap::Parser;
use classpath_resolver::assembler::ClassPathAssembler;
use classpath_resolver::cli::{Cli, Commands, OutputFormat};
use classpath_resolver::config::{ClassPathSettings, resolve_settings};
use classpath_resolver::context::ClassPathContext;
use classpath_resolver::expand::expand_path;
use classpath_resolver::merged::MergedClassPath;
use classpath_resolver::node::{ClassPath, ClassPathKind, ClassPathRef};
use classpath_resolver::rep::ClassRep;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = parse_cli()?;
    init_logging(cli.verbose);

    let settings = resolve_settings(&cli)?;

    match cli.command.clone() {
        Commands::Find { class_name, format } => {
            let start = Instant::now();
            let classpath = assemble(&settings);
            let class_name = normalize_class_name(&class_name);
            let result = find_class(&classpath, &class_name, start)?;
            print_output(&result, format, render_find_text)?;
        }
        Commands::List { package, format } => {
            let classpath = assemble(&settings);
            let result = list_package(&classpath, package.as_deref())?;
            print_output(&result, format, render_list_text)?;
        }
        Commands::Entries { format } => {
            let classpath = assemble(&settings);
            let result = EntriesResult {
                settings: settings.clone(),
                entries: classpath.entries().iter().map(entry_info).collect(),
            };
            print_output(&result, format, render_entries_text)?;
        }
        Commands::Expand {
            path,
            no_star,
            format,
        } => {
            let result = ExpandResult {
                expanded: expand_path(&path, !no_star, &settings.base_dir),
                path,
            };
            print_output(&result, format, render_expand_text)?;
        }
        Commands::Stats { format } => {
            let classpath = assemble(&settings);
            let stats = collect_stats(&classpath)?;
            print_output(&stats, format, render_stats_text)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn parse_cli() -> Result<Cli> {
    let args: Vec<String> = std::env::args().collect();
    Ok(Cli::parse_from(rewrite_args_for_implicit_find(args)))
}

const VALUE_FLAGS: [&str; 7] = [
    "--bootclasspath",
    "--extdirs",
    "--classpath",
    "--cp",
    "--sourcepath",
    "--codebase",
    "--base-dir",
];

fn rewrite_args_for_implicit_find(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["find", "list", "entries", "expand", "stats", "help"];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--" {
            idx += 1;
            break;
        }

        if VALUE_FLAGS.contains(&a) {
            idx += 2;
            continue;
        }

        if a.starts_with('-') {
            idx += 1;
            continue;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) {
            args.insert(idx, "find".to_string());
        }
    }

    args
}

fn assemble(settings: &ClassPathSettings) -> MergedClassPath {
    ClassPathAssembler::new(Arc::new(ClassPathContext::new())).assemble(settings)
}

fn normalize_class_name(raw: &str) -> String {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("import") {
        s = rest.trim();
    }
    if s.ends_with(';') {
        s = s.trim_end_matches(';').trim();
    }
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    s.replace('/', ".")
        .trim_end_matches(".class")
        .to_string()
}

#[derive(Debug, Serialize)]
struct ClassEntry {
    name: String,
    binary: Option<String>,
    source: Option<String>,
}

impl From<&ClassRep> for ClassEntry {
    fn from(rep: &ClassRep) -> Self {
        Self {
            name: rep.name().to_string(),
            binary: rep.binary().map(|f| f.path()),
            source: rep.source().map(|f| f.path()),
        }
    }
}

#[derive(Debug, Serialize)]
struct FindResult {
    class_name: String,
    binary: Option<String>,
    source: Option<String>,
    complete: bool,
    duration_ms: u64,
}

#[derive(Debug, Serialize)]
struct ListResult {
    package: String,
    kind: ClassPathKind,
    packages: Vec<String>,
    classes: Vec<ClassEntry>,
}

#[derive(Debug, Serialize)]
struct EntryInfo {
    name: String,
    kind: ClassPathKind,
    source_paths: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EntriesResult {
    settings: ClassPathSettings,
    entries: Vec<EntryInfo>,
}

#[derive(Debug, Serialize)]
struct ExpandResult {
    path: String,
    expanded: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
struct EntryStats {
    name: String,
    kind: Option<ClassPathKind>,
    packages: usize,
    classes: usize,
    with_binary: usize,
    with_source: usize,
}

#[derive(Debug, Serialize)]
struct StatsResult {
    entries: Vec<EntryStats>,
    merged: EntryStats,
    duration_ms: u64,
}

fn find_class(classpath: &MergedClassPath, class_name: &str, start: Instant) -> Result<FindResult> {
    let rep = classpath
        .find_class(class_name)
        .with_context(|| format!("Failed to resolve class {class_name}"))?
        .with_context(|| format!("Class not found: {class_name}"))?;

    Ok(FindResult {
        class_name: class_name.to_string(),
        binary: rep.binary().map(|f| f.path()),
        source: rep.source().map(|f| f.path()),
        complete: rep.is_complete(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn list_package(classpath: &MergedClassPath, package: Option<&str>) -> Result<ListResult> {
    let (name, node): (String, &dyn ClassPath) = match package.filter(|p| !p.is_empty()) {
        Some(p) => {
            let found = classpath
                .find_package(p)
                .with_context(|| format!("Failed to resolve package {p}"))?
                .with_context(|| format!("Package not found: {p}"))?;
            (p.to_string(), found.as_ref())
        }
        None => (String::new(), classpath),
    };

    Ok(ListResult {
        package: name,
        kind: node.kind(),
        packages: node.packages()?.iter().map(|p| p.name().to_string()).collect(),
        classes: node.classes()?.iter().map(ClassEntry::from).collect(),
    })
}

fn entry_info(entry: &ClassPathRef) -> EntryInfo {
    EntryInfo {
        name: entry.name().to_string(),
        kind: entry.kind(),
        source_paths: entry.source_paths().iter().map(|f| f.path()).collect(),
    }
}

fn collect_stats(classpath: &MergedClassPath) -> Result<StatsResult> {
    let start = Instant::now();
    let entries = classpath
        .entries()
        .par_iter()
        .map(|entry| {
            let mut stats = EntryStats {
                name: entry.name().to_string(),
                kind: Some(entry.kind()),
                ..Default::default()
            };
            count_tree(entry.as_ref(), &mut stats)?;
            Ok(stats)
        })
        .collect::<classpath_resolver::Result<Vec<_>>>()?;

    let mut merged = EntryStats {
        kind: Some(classpath.kind()),
        ..Default::default()
    };
    count_tree(classpath, &mut merged)?;

    Ok(StatsResult {
        entries,
        merged,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn count_tree(node: &dyn ClassPath, stats: &mut EntryStats) -> classpath_resolver::Result<()> {
    for class in node.classes()? {
        stats.classes += 1;
        stats.with_binary += usize::from(class.binary().is_some());
        stats.with_source += usize::from(class.source().is_some());
    }
    for package in node.packages()? {
        stats.packages += 1;
        count_tree(package.as_ref(), stats)?;
    }
    Ok(())
}

fn print_output<T: Serialize>(
    result: &T,
    format: OutputFormat,
    render_text: fn(&T) -> String,
) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Text => render_text(result),
    };
    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn render_find_text(result: &FindResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("class_name: {}\n", result.class_name));
    out.push_str(&format!("binary: {}\n", result.binary.as_deref().unwrap_or("-")));
    out.push_str(&format!("source: {}\n", result.source.as_deref().unwrap_or("-")));
    out.push_str(&format!("duration_ms: {}\n", result.duration_ms));
    out
}

fn render_list_text(result: &ListResult) -> String {
    let mut out = String::new();
    for package in &result.packages {
        out.push_str(&format!("{package}/\n"));
    }
    for class in &result.classes {
        let marker = match (&class.binary, &class.source) {
            (Some(_), Some(_)) => "binary+source",
            (Some(_), None) => "binary",
            _ => "source",
        };
        out.push_str(&format!("{} ({marker})\n", class.name));
    }
    out
}

fn render_entries_text(result: &EntriesResult) -> String {
    let mut out = String::new();
    for entry in &result.entries {
        out.push_str(&format!("- {} ({:?})\n", entry.name, entry.kind));
        for source in &entry.source_paths {
            out.push_str(&format!("    source: {source}\n"));
        }
    }
    out
}

fn render_expand_text(result: &ExpandResult) -> String {
    result.expanded.iter().map(|p| format!("{p}\n")).collect()
}

fn render_stats_text(result: &StatsResult) -> String {
    let mut out = String::new();
    for entry in result.entries.iter().chain(std::iter::once(&result.merged)) {
        let name = if entry.name.is_empty() { "<merged>" } else { entry.name.as_str() };
        out.push_str(&format!(
            "{name}: packages={} classes={} binary={} source={}\n",
            entry.packages, entry.classes, entry.with_binary, entry.with_source
        ));
    }
    out.push_str(&format!("duration_ms: {}\n", result.duration_ms));
    out
}
