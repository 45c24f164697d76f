mod init;
pub use init::cmd_init;

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::autosave::Autosave;
use crate::io::{paths, registry, session, snapshot};
use crate::model::{Field, TaxonomyIndex, Workspace};
use crate::ops::{check, export, import, tag_ops};
use crate::parse::{parse_table, serialize_table};

/// Global override for the data directory's parent (set by -C flag)
static DATA_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    if let Some(ref dir) = cli.data_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        DATA_DIR_OVERRIDE.lock().unwrap().replace(abs);
    }

    match cli.command {
        // Init is handled in main.rs before data-dir discovery
        Commands::Init(args) => cmd_init(args, cli.data_dir.as_deref()),

        // Read commands
        Commands::Taxonomy(args) => cmd_taxonomy(args, json),
        Commands::List => cmd_list(json),
        Commands::Show(args) => cmd_show(args, json),
        Commands::Stats => cmd_stats(json),
        Commands::Check => cmd_check(json),
        Commands::Export(args) => cmd_export(args),
        Commands::Backup(args) => cmd_backup(args),

        // Write commands
        Commands::Import(args) => cmd_import(args),
        Commands::Tag(args) => cmd_tag(args),
        Commands::Restore(args) => cmd_restore(args),

        // Workspace management
        Commands::Ws(args) => match args.action {
            WsAction::New { name } => cmd_ws_new(&name),
            WsAction::List => cmd_ws_list(json),
            WsAction::Use { name } => cmd_ws_use(&name),
            WsAction::Clear { name } => cmd_ws_clear(&name),
        },
    }
}

// ---------------------------------------------------------------------------
// The open store: active workspace + taxonomy + autosave tracking
// ---------------------------------------------------------------------------

struct Store {
    data_dir: PathBuf,
    taxonomy: TaxonomyIndex,
    workspace: Workspace,
    autosave: Autosave,
    dirty: bool,
}

impl Store {
    /// Discover the data directory and load the active workspace.
    fn open() -> Result<Store, Box<dyn std::error::Error>> {
        let start = match DATA_DIR_OVERRIDE.lock().unwrap().as_ref() {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let data_dir = paths::discover_data_dir(&start)?;

        let active = session::read_session(&data_dir)
            .map(|s| s.active)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "default".to_string());

        let mut autosave = Autosave::new();
        let workspace = match snapshot::load_snapshot(&data_dir, &active) {
            Some(snap) => {
                autosave.seed(snap.saved_at);
                snap.into_workspace(&active)
            }
            // Absent or corrupt snapshot: start the workspace fresh
            None => Workspace::new(&active),
        };

        let taxonomy = load_taxonomy_file(&data_dir);

        Ok(Store {
            data_dir,
            taxonomy,
            workspace,
            autosave,
            dirty: false,
        })
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// End the interaction cycle: save if a mutation happened, or if the
    /// autosave interval has elapsed since the last known save.
    fn finish(mut self) {
        let now = Utc::now();
        if self.dirty || self.autosave.due(now) {
            if snapshot::save_snapshot(&self.data_dir, &self.workspace) {
                self.autosave.mark_saved(now);
            } else if self.dirty {
                eprintln!("warning: changes to '{}' were not saved", self.workspace.name);
            }
        }
    }
}

/// Read the shared taxonomy copy, if one has been loaded. The file was
/// schema-checked when it was loaded, so problems here just mean an empty
/// index and a warning.
fn load_taxonomy_file(data_dir: &std::path::Path) -> TaxonomyIndex {
    let path = paths::taxonomy_path(data_dir);
    if !path.exists() {
        return TaxonomyIndex::default();
    }
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("warning: could not read {}: {}", path.display(), e);
            return TaxonomyIndex::default();
        }
    };
    match parse_table(&content).map(|t| import::load_taxonomy(&t)) {
        Some(Ok(tax)) => tax,
        _ => {
            eprintln!("warning: {} is not a valid taxonomy file", path.display());
            TaxonomyIndex::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

fn cmd_taxonomy(args: TaxonomyArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;

    if let Some(file) = args.file {
        let content = fs::read_to_string(&file)
            .map_err(|e| format!("could not read {}: {}", file, e))?;
        let table = parse_table(&content).ok_or_else(|| format!("{} is empty", file))?;
        let taxonomy = import::load_taxonomy(&table)?;

        snapshot::atomic_write(&paths::taxonomy_path(&store.data_dir), content.as_bytes())?;
        println!(
            "Loaded {} subject-topic-subtopic combinations ({} subjects)",
            taxonomy.leaf_count(),
            taxonomy.subjects().len()
        );
        store.finish();
        return Ok(());
    }

    if store.taxonomy.is_empty() {
        println!("No taxonomy loaded. Run `qt taxonomy <file.csv>` first.");
        store.finish();
        return Ok(());
    }

    if json {
        let subjects: Vec<serde_json::Value> = store
            .taxonomy
            .subjects()
            .iter()
            .map(|s| {
                serde_json::json!({
                    "subject": s,
                    "topics": store.taxonomy.topics(s).iter().map(|t| {
                        serde_json::json!({
                            "topic": t,
                            "subtopics": store.taxonomy.subtopics(s, t),
                        })
                    }).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&subjects)?);
    } else {
        for subject in store.taxonomy.subjects() {
            println!("{}", subject);
            for topic in store.taxonomy.topics(subject) {
                println!(
                    "  {} ({})",
                    topic,
                    store.taxonomy.subtopics(subject, topic).join(", ")
                );
            }
        }
    }
    store.finish();
    Ok(())
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

fn cmd_import(args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = Store::open()?;

    let content = fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file, e))?;
    let table = parse_table(&content).ok_or_else(|| format!("{} is empty", args.file))?;
    let loaded = import::load_questions(&table)?;

    let count = loaded.records.len();
    let ws = &mut store.workspace;
    ws.records = loaded.records;
    ws.question_col = loaded.question_col;
    ws.answer_col = loaded.answer_col;
    // Fresh import, fresh tagging state: one empty mapping per question
    ws.tags.clear();
    for idx in 0..count {
        tag_ops::ensure_question(&mut ws.tags, idx);
    }

    store.mark_dirty();
    println!(
        "Loaded {} questions into workspace '{}'",
        count, store.workspace.name
    );
    store.finish();
    Ok(())
}

fn cmd_list(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let ws = &store.workspace;

    if json {
        let questions = ws
            .records
            .iter()
            .enumerate()
            .map(|(idx, rec)| QuestionJson {
                index: idx,
                question: rec.question.clone(),
                answer: rec.answer.clone(),
                mappings: ws
                    .mappings(idx)
                    .iter()
                    .enumerate()
                    .map(|(pos, m)| MappingJson::new(pos, m, &store.taxonomy))
                    .collect(),
            })
            .collect();
        let out = QuestionListJson {
            workspace: ws.name.clone(),
            questions,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if ws.records.is_empty() {
        println!(
            "Workspace '{}' has no questions. Run `qt import <file.csv>` first.",
            ws.name
        );
    } else {
        for (idx, rec) in ws.records.iter().enumerate() {
            println!("{:>4}  {}", idx, truncate(&rec.question, 64));
            for (pos, mapping) in ws.mappings(idx).iter().enumerate() {
                println!("      [{}] {}", pos, format_mapping(mapping, &store.taxonomy));
            }
        }
    }
    store.finish();
    Ok(())
}

fn cmd_show(args: ShowArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let ws = &store.workspace;
    let rec = ws
        .records
        .get(args.index)
        .ok_or_else(|| format!("no question at index {}", args.index))?;

    if json {
        let out = QuestionJson {
            index: args.index,
            question: rec.question.clone(),
            answer: rec.answer.clone(),
            mappings: ws
                .mappings(args.index)
                .iter()
                .enumerate()
                .map(|(pos, m)| MappingJson::new(pos, m, &store.taxonomy))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Question {}: {}", args.index, rec.question);
        println!("Answer: {}", rec.answer);
        for (pos, mapping) in ws.mappings(args.index).iter().enumerate() {
            println!("  [{}] {}", pos, format_mapping(mapping, &store.taxonomy));
        }
    }
    store.finish();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tagging
// ---------------------------------------------------------------------------

fn cmd_tag(args: TagCmd) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = Store::open()?;

    match args.action {
        TagAction::Set {
            index,
            pos,
            field,
            value,
        } => {
            set_field_checked(&mut store, index, pos, field, Some(&value))?;
            println!(
                "q{} [{}] {}",
                index,
                pos,
                format_mapping(&store.workspace.mappings(index)[pos], &store.taxonomy)
            );
        }
        TagAction::Unset { index, pos, field } => {
            set_field_checked(&mut store, index, pos, field, None)?;
            println!(
                "q{} [{}] {}",
                index,
                pos,
                format_mapping(&store.workspace.mappings(index)[pos], &store.taxonomy)
            );
        }
        TagAction::Add { index } => {
            check_index(&store, index)?;
            tag_ops::ensure_question(&mut store.workspace.tags, index);
            tag_ops::add_mapping(&mut store.workspace.tags, index)?;
            store.mark_dirty();
            println!(
                "q{} now has {} mappings",
                index,
                store.workspace.mappings(index).len()
            );
        }
        TagAction::Rm { index, pos } => {
            check_index(&store, index)?;
            tag_ops::remove_mapping(&mut store.workspace.tags, index, pos)?;
            store.mark_dirty();
            println!(
                "q{} now has {} mappings",
                index,
                store.workspace.mappings(index).len()
            );
        }
    }
    store.finish();
    Ok(())
}

fn check_index(store: &Store, index: usize) -> Result<(), Box<dyn std::error::Error>> {
    if index >= store.workspace.records.len() {
        return Err(format!("no question at index {}", index).into());
    }
    Ok(())
}

fn set_field_checked(
    store: &mut Store,
    index: usize,
    pos: usize,
    field: Field,
    value: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    check_index(store, index)?;
    tag_ops::ensure_question(&mut store.workspace.tags, index);
    tag_ops::set_field(
        &mut store.workspace.tags,
        &store.taxonomy,
        index,
        pos,
        field,
        value,
    )?;
    store.mark_dirty();
    Ok(())
}

fn cmd_stats(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let (tagged, total) = tag_ops::completion_stats(&store.workspace.tags);

    if json {
        let out = StatsJson {
            workspace: store.workspace.name.clone(),
            questions: store.workspace.records.len(),
            tagged_mappings: tagged,
            total_mappings: total,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "Workspace '{}': {} questions, {}/{} mappings fully tagged",
            store.workspace.name,
            store.workspace.records.len(),
            tagged,
            total
        );
    }
    store.finish();
    Ok(())
}

fn cmd_check(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let findings = check::check_workspace(&store.workspace, &store.taxonomy);

    if json {
        let out = CheckJson {
            workspace: store.workspace.name.clone(),
            findings: findings.iter().map(FindingJson::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if findings.is_empty() {
        println!("All mappings are consistent with the taxonomy.");
    } else {
        for f in &findings {
            println!("q{} [{}]: {}", f.question, f.mapping, f.problem);
        }
        println!("{} stale mapping(s) found", findings.len());
    }
    store.finish();
    Ok(())
}

// ---------------------------------------------------------------------------
// Export / backup
// ---------------------------------------------------------------------------

fn cmd_export(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let rows = export::flatten(&store.workspace);
    let table = export::export_table(&rows);
    fs::write(&args.out, serialize_table(&table))
        .map_err(|e| format!("could not write {}: {}", args.out, e))?;
    println!("Exported {} rows to {}", rows.len(), args.out);
    store.finish();
    Ok(())
}

fn cmd_backup(args: BackupArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let snap = snapshot::Snapshot::of(&store.workspace);
    let content = serde_json::to_string_pretty(&snap)?;
    fs::write(&args.file, content)
        .map_err(|e| format!("could not write {}: {}", args.file, e))?;
    println!(
        "Backed up workspace '{}' to {}",
        store.workspace.name, args.file
    );
    store.finish();
    Ok(())
}

fn cmd_restore(args: RestoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = Store::open()?;
    let content = fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file, e))?;
    let snap: snapshot::Snapshot = serde_json::from_str(&content)
        .map_err(|e| format!("{} is not a valid snapshot: {}", args.file, e))?;

    let name = store.workspace.name.clone();
    store.workspace = snap.into_workspace(&name);
    store.mark_dirty();
    println!(
        "Restored workspace '{}' from {} ({} questions)",
        name,
        args.file,
        store.workspace.records.len()
    );
    store.finish();
    Ok(())
}

// ---------------------------------------------------------------------------
// Workspaces
// ---------------------------------------------------------------------------

fn cmd_ws_new(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    if !registry::register_workspace(&store.data_dir, name) {
        return Err(format!("could not create workspace '{}' (blank or already exists)", name).into());
    }
    println!("Created workspace '{}'", name);
    store.finish();
    Ok(())
}

fn cmd_ws_list(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    let reg = registry::read_registry(&store.data_dir);

    if json {
        let out = WorkspaceListJson {
            active: store.workspace.name.clone(),
            workspaces: reg.workspaces.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for name in &reg.workspaces {
            let marker = if *name == store.workspace.name { "*" } else { " " };
            println!("{} {}", marker, name);
        }
    }
    store.finish();
    Ok(())
}

/// Switching is a two-step transaction: persist the outgoing workspace, then
/// load the incoming one. The save step runs even when it fails (log and
/// continue) so a switch can never silently skip it.
fn cmd_ws_use(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;

    let reg = registry::read_registry(&store.data_dir);
    if !reg.contains(name) {
        return Err(format!("no workspace named '{}' (see `qt ws list`)", name).into());
    }

    // Step 1: persist the outgoing workspace
    if !snapshot::save_snapshot(&store.data_dir, &store.workspace) {
        eprintln!(
            "warning: could not save outgoing workspace '{}'; switching anyway",
            store.workspace.name
        );
    }

    // Step 2: make the incoming workspace active
    session::write_session(
        &store.data_dir,
        &session::SessionState {
            active: name.to_string(),
        },
    )?;

    let questions = snapshot::load_snapshot(&store.data_dir, name)
        .map(|s| s.records.len())
        .unwrap_or(0);
    println!("Switched to workspace '{}' ({} questions)", name, questions);
    Ok(())
}

fn cmd_ws_clear(name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;
    if !registry::remove_workspace(&store.data_dir, name) {
        return Err(format!("no workspace named '{}'", name).into());
    }

    // Clearing the active workspace moves the session to whatever is left;
    // clearing the last one falls back to a freshly registered default so
    // the active workspace is always a registered one
    if store.workspace.name == name {
        let reg = registry::read_registry(&store.data_dir);
        let next = match reg.workspaces.first() {
            Some(n) => n.clone(),
            None => {
                if !registry::register_workspace(&store.data_dir, "default") {
                    return Err("could not recreate the default workspace".into());
                }
                "default".to_string()
            }
        };
        session::write_session(
            &store.data_dir,
            &session::SessionState {
                active: next.clone(),
            },
        )?;
        println!("Cleared workspace '{}' (now on '{}')", name, next);
        return Ok(());
    }

    println!("Cleared workspace '{}'", name);
    store.finish();
    Ok(())
}
