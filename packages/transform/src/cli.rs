//! Command-line interface for the transformer.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;

use crate::error::{Result, TransformError};
use crate::node::{Fragment, Node};
use crate::registry::handlers::PruneMode;
use crate::registry::{
    create_identity_registry, AttributeAssignment, RuleSet, TemplateEngine, TemplateRegistry,
};
use crate::xml::{first_difference, parse_with_options, serialize_fragment, ParseOptions};

/// RegelRecht Transform - Rewrite XML trees with ordered template rules.
#[derive(Parser)]
#[command(name = "regelrecht-transform")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply rules to an XML file (or a JSON node tree ending in .json).
    Transform {
        /// Input file
        input: PathBuf,

        /// Upgrade http:// links in href/src attributes to https://
        #[arg(long)]
        secure_links: bool,

        /// Remove elements with this tag, including their content
        #[arg(long, value_name = "TAG")]
        prune: Vec<String>,

        /// What a pruned element leaves behind
        #[arg(long, value_enum, default_value_t = PruneModeArg::Remove)]
        prune_mode: PruneModeArg,

        /// Replace elements with this tag by their children
        #[arg(long, value_name = "TAG")]
        unwrap: Vec<String>,

        /// Rename elements, e.g. --rename b=strong
        #[arg(long, value_name = "FROM=TO", value_parser = parse_rename)]
        rename: Vec<(String, String)>,

        /// Set an attribute wherever another is present, e.g. --set-attr rel=noopener@href
        #[arg(long, value_name = "NAME=VALUE@ATTR", value_parser = parse_assignment)]
        set_attr: Vec<AttributeAssignment>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Xml)]
        format: OutputFormat,

        /// Maximum template depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print which rule handled each node to stderr
        #[arg(long)]
        trace: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify that the identity transform reproduces the input.
    Check {
        /// Input XML file
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xml,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PruneModeArg {
    /// Drop the element from its parent
    Remove,
    /// Leave an empty text node in its place
    EmptyText,
}

impl From<PruneModeArg> for PruneMode {
    fn from(mode: PruneModeArg) -> Self {
        match mode {
            PruneModeArg::Remove => PruneMode::Remove,
            PruneModeArg::EmptyText => PruneMode::EmptyText,
        }
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            input,
            secure_links,
            prune,
            prune_mode,
            unwrap,
            rename,
            set_attr,
            format,
            max_depth,
            trace,
            output,
        } => {
            let rules = RuleSet {
                prune,
                prune_mode: prune_mode.into(),
                unwrap,
                rename,
                set_attributes: set_attr,
                secure_links,
            };
            let options = TransformOptions {
                format,
                max_depth,
                trace,
            };
            transform_command(&input, &rules, options, output.as_deref())
        }
        Commands::Check { input } => check_command(&input),
    }
}

/// Options for the transform command besides the rules themselves.
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions {
    pub format: OutputFormat,
    pub max_depth: Option<usize>,
    pub trace: bool,
}

fn parse_rename(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('=') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => {
            Ok((from.to_string(), to.to_string()))
        }
        _ => Err(format!("expected FROM=TO, got '{value}'")),
    }
}

fn parse_assignment(value: &str) -> std::result::Result<AttributeAssignment, String> {
    let parsed = value.rsplit_once('@').and_then(|(assignment, when)| {
        let (name, assigned) = assignment.split_once('=')?;
        (!name.is_empty() && !when.is_empty()).then(|| AttributeAssignment {
            name: name.to_string(),
            value: assigned.to_string(),
            when: when.to_string(),
        })
    });
    parsed.ok_or_else(|| format!("expected NAME=VALUE@ATTR, got '{value}'"))
}

/// Load a node tree from an XML or JSON file.
///
/// XML nesting deeper than `max_depth` is rejected while parsing; JSON
/// input is bounded by `serde_json`'s own recursion limit.
pub fn load_tree(path: &Path, max_depth: usize) -> Result<Node> {
    let content = fs::read_to_string(path)?;
    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(&content)?)
    } else {
        let options = ParseOptions {
            max_depth,
            ..ParseOptions::default()
        };
        parse_with_options(&content, options)
    }
}

/// One line per rule: position, name and predicate.
pub fn describe_rules(registry: &TemplateRegistry) -> String {
    if registry.is_empty() {
        return "(none, every node is copied)".to_string();
    }
    registry
        .rules()
        .iter()
        .enumerate()
        .map(|(index, rule)| format!("{}. {} {}", index + 1, rule.name(), rule.predicate()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a transformation result in the requested format.
pub fn render(fragment: &Fragment, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Xml => Ok(serialize_fragment(fragment)),
        OutputFormat::Json => {
            let json = match fragment {
                Fragment::Single(node) => serde_json::to_string_pretty(node)?,
                Fragment::Sequence(nodes) => serde_json::to_string_pretty(nodes)?,
            };
            Ok(json)
        }
    }
}

/// Execute the transform command.
fn transform_command(
    input: &Path,
    rules: &RuleSet,
    options: TransformOptions,
    output: Option<&Path>,
) -> Result<()> {
    let registry = rules.build()?;
    let mut engine = TemplateEngine::new(registry);
    if let Some(depth) = options.max_depth {
        engine = engine.with_max_depth(depth)?;
    }

    let tree = load_tree(input, engine.max_depth())?;
    tracing::debug!(rules = ?engine.registry().rule_names(), "Transforming {}", input.display());

    let result = if options.trace {
        eprintln!("{}", style("Rules:").bold());
        eprintln!("{}", describe_rules(engine.registry()));
        let (result, trace) = engine.apply_with_trace(tree)?;
        eprintln!("{}", style("Dispatch trace:").bold());
        eprintln!("{}", trace.render());
        result
    } else {
        engine.apply_templates(tree)?
    };

    let rendered = render(&result, options.format)?;
    match output {
        Some(path) => {
            fs::write(path, rendered + "\n")?;
            println!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Execute the check command.
///
/// The identity output is compared with the source text itself, so
/// anything the XML adapter cannot carry (comments, processing
/// instructions) fails the check.
fn check_command(input: &Path) -> Result<()> {
    let source = fs::read_to_string(input)?;
    let options = ParseOptions::default();
    let tree = parse_with_options(&source, options)?;
    let engine = TemplateEngine::new(create_identity_registry());
    let output = serialize_fragment(&engine.transform(&tree)?);

    if let Some(difference) = first_difference(&source, &output, options)? {
        return Err(TransformError::IdentityMismatch {
            path: input.display().to_string(),
            difference,
        });
    }

    println!(
        "{} {} round-trips unchanged",
        style("OK").green().bold(),
        style(input.display()).cyan()
    );
    Ok(())
}
