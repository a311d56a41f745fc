//! `fb`: command-line companion to the form builder.
//!
//! ```bash
//! fb types
//! fb new --title "Contact us" > contact.json
//! fb add contact.json email --label "Work email"
//! fb lint contact.json
//! fb render contact.json --mode fill
//! fb check contact.json answers.json
//! ```
//!
//! `RUST_LOG=debug` turns on engine logging.

use clap::{Parser, Subcommand, ValueEnum};
use fb_core::id::FieldId;
use fb_core::lint::{LintSeverity, lint_schema};
use fb_core::model::{FieldPatch, FieldPosition, FormSchema};
use fb_core::registry::{self, UnknownFieldType};
use fb_core::validation::{SubmissionValues, validate_submission};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fb", version, about = "Create, lint, render and check form schemas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the field types the palette offers
    Types,
    /// Print a fresh, empty schema
    New {
        #[arg(long)]
        title: Option<String>,
    },
    /// Append a field to a schema file in place
    Add {
        schema: PathBuf,
        /// Field type tag, e.g. `text` or `dropdown`
        tag: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        required: bool,
    },
    /// Report structural problems
    Lint { schema: PathBuf },
    /// Render a schema as HTML
    Render {
        schema: PathBuf,
        #[arg(long, value_enum, default_value = "design")]
        mode: Mode,
        /// Field to mark as selected (design mode)
        #[arg(long)]
        selected: Option<String>,
    },
    /// Validate submitted values against a schema
    Check { schema: PathBuf, values: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Design,
    Fill,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    UnknownFieldType(#[from] UnknownFieldType),

    #[error("failed to encode schema: {0}")]
    Encode(#[source] serde_json::Error),
}

/// What a command produced: text for stdout and whether it passed.
struct Outcome {
    output: String,
    ok: bool,
}

impl Outcome {
    fn ok(output: String) -> Self {
        Self { output, ok: true }
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_schema(path: &Path) -> Result<FormSchema, CliError> {
    FormSchema::from_json(&read(path)?).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn load_values(path: &Path) -> Result<SubmissionValues, CliError> {
    serde_json::from_str(&read(path)?).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

// ─── Commands ────────────────────────────────────────────────────────────

fn types() -> Outcome {
    let mut out = String::new();
    for def in registry::all() {
        out.push_str(&format!(
            "{:<10} {:<15} {}\n",
            def.field_type.tag(),
            def.display_label,
            def.description
        ));
    }
    Outcome::ok(out)
}

fn new_schema(title: Option<String>) -> Result<Outcome, CliError> {
    let schema = title.map(FormSchema::new).unwrap_or_default();
    Ok(Outcome::ok(schema.to_json().map_err(CliError::Encode)? + "\n"))
}

fn add_field(
    schema: &mut FormSchema,
    tag: &str,
    label: Option<String>,
    required: bool,
) -> Result<FieldId, CliError> {
    let def = registry::lookup(tag)?;
    let mut field = schema.create_field(def.field_type.clone(), FieldPosition::stacked(schema.len()));
    field.apply(&FieldPatch {
        label,
        required: Some(required),
        ..FieldPatch::default()
    });
    let id = field.id;
    schema.add_field(field);
    schema.renumber();
    log::debug!("added {tag} field {id}");
    Ok(id)
}

fn lint(schema: &FormSchema) -> Outcome {
    let diags = lint_schema(schema);
    let mut out = String::new();
    for d in &diags {
        let level = match d.severity {
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        };
        out.push_str(&format!("{level}[{}] {}: {}\n", d.rule, d.field_id, d.message));
    }
    let warnings = diags
        .iter()
        .filter(|d| d.severity == LintSeverity::Warning)
        .count();
    out.push_str(&format!("{} finding(s), {warnings} warning(s)\n", diags.len()));
    Outcome {
        output: out,
        ok: warnings == 0,
    }
}

fn render(schema: &FormSchema, mode: Mode, selected: Option<&str>) -> Outcome {
    let html = match mode {
        Mode::Design => fb_render::render_canvas(schema, selected.map(FieldId::intern)),
        Mode::Fill => fb_render::render_form(schema, &SubmissionValues::new(), &[]),
    };
    Outcome::ok(html)
}

fn check(schema: &FormSchema, values: &SubmissionValues) -> Result<Outcome, CliError> {
    let errors = validate_submission(schema, values);
    if errors.is_empty() {
        return Ok(Outcome::ok("ok\n".to_string()));
    }
    let json = serde_json::to_string_pretty(&errors).map_err(CliError::Encode)?;
    Ok(Outcome {
        output: json + "\n",
        ok: false,
    })
}

fn run(cli: Cli) -> Result<Outcome, CliError> {
    match cli.command {
        Command::Types => Ok(types()),
        Command::New { title } => new_schema(title),
        Command::Add {
            schema: path,
            tag,
            label,
            required,
        } => {
            let mut schema = load_schema(&path)?;
            let id = add_field(&mut schema, &tag, label, required)?;
            let json = schema.to_json().map_err(CliError::Encode)?;
            std::fs::write(&path, json + "\n").map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(Outcome::ok(format!("{id}\n")))
        }
        Command::Lint { schema } => Ok(lint(&load_schema(&schema)?)),
        Command::Render {
            schema,
            mode,
            selected,
        } => Ok(render(&load_schema(&schema)?, mode, selected.as_deref())),
        Command::Check { schema, values } => check(&load_schema(&schema)?, &load_values(&values)?),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(outcome) => {
            print!("{}", outcome.output);
            if outcome.ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("fb: {e}");
            ExitCode::from(2)
        }
    }
}
