use crate::customizer::{HateoasLinksCustomizer, OpenApiCustomizer};
use crate::descriptor::RouteDescriptor;
use crate::extractor::functional::FunctionalRouteExtractor;
use crate::extractor::RouteExtractor;
use crate::group::GroupedOpenApi;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::parser::{DefinitionParser, ParsedFile};
use crate::scanner::FileScanner;
use crate::schema_generator::SchemaGenerator;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Group name used when filters are given without `--group`
const DEFAULT_GROUP: &str = "default";

/// OpenAPI from routes - generate OpenAPI documentation from functional router definitions
#[derive(Parser, Debug)]
#[command(name = "openapi-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Directory containing router definition files (YAML or JSON)
    #[arg(value_name = "ROUTES_PATH")]
    pub routes_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// API title
    #[arg(long = "title", default_value = "Generated API")]
    pub title: String,

    /// API version
    #[arg(long = "api-version", default_value = "1.0.0")]
    pub api_version: String,

    /// Name of the route group to document
    #[arg(long = "group")]
    pub group: Option<String>,

    /// Only document paths matching these patterns
    #[arg(long = "paths-to-match", value_name = "PATTERN")]
    pub paths_to_match: Vec<String>,

    /// Never document paths matching these patterns
    #[arg(long = "paths-to-exclude", value_name = "PATTERN")]
    pub paths_to_exclude: Vec<String>,

    /// Only document handlers in these packages
    #[arg(long = "packages-to-scan", value_name = "PACKAGE")]
    pub packages_to_scan: Vec<String>,

    /// Never document handlers in these packages
    #[arg(long = "packages-to-exclude", value_name = "PACKAGE")]
    pub packages_to_exclude: Vec<String>,

    /// Only document routes producing one of these media types
    #[arg(long = "produces-to-match", value_name = "MEDIA_TYPE")]
    pub produces_to_match: Vec<String>,

    /// Only document routes consuming one of these media types
    #[arg(long = "consumes-to-match", value_name = "MEDIA_TYPE")]
    pub consumes_to_match: Vec<String>,

    /// Only document routes declaring one of these headers
    #[arg(long = "headers-to-match", value_name = "HEADER")]
    pub headers_to_match: Vec<String>,

    /// Add the HATEOAS Link and Links component schemas
    #[arg(long = "hateoas-links")]
    pub hateoas_links: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl CliArgs {
    fn has_group_filters(&self) -> bool {
        [
            &self.paths_to_match,
            &self.paths_to_exclude,
            &self.packages_to_scan,
            &self.packages_to_exclude,
            &self.produces_to_match,
            &self.consumes_to_match,
            &self.headers_to_match,
        ]
        .iter()
        .any(|list| !list.is_empty())
    }
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.routes_path.exists() {
        anyhow::bail!("Routes path does not exist: {}", args.routes_path.display());
    }

    if !args.routes_path.is_dir() {
        anyhow::bail!("Routes path is not a directory: {}", args.routes_path.display());
    }

    info!("Routes path: {}", args.routes_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if let Some(ref group) = args.group {
        info!("Group: {}", group);
    }

    Ok(args)
}

/// Group described by the command line, if any group option was given
pub fn build_group(args: &CliArgs) -> Result<Option<GroupedOpenApi>> {
    if args.group.is_none() && !args.has_group_filters() {
        return Ok(None);
    }

    let name = args.group.clone().unwrap_or_else(|| DEFAULT_GROUP.to_string());
    let group = GroupedOpenApi::builder()
        .group(name)
        .paths_to_match(args.paths_to_match.iter().cloned())
        .paths_to_exclude(args.paths_to_exclude.iter().cloned())
        .packages_to_scan(args.packages_to_scan.iter().cloned())
        .packages_to_exclude(args.packages_to_exclude.iter().cloned())
        .produces_to_match(args.produces_to_match.iter().cloned())
        .consumes_to_match(args.consumes_to_match.iter().cloned())
        .headers_to_match(args.headers_to_match.iter().cloned())
        .build()?;

    debug!("Configured group: {:?}", group);
    Ok(Some(group))
}

/// Scan, extract and assemble the document described by `args`
pub fn generate(args: &CliArgs) -> Result<OpenApiDocument> {
    let group = build_group(args)?;

    // Step 1: Scan directory for definition files
    info!("Scanning routes directory...");
    let scanner = FileScanner::new(args.routes_path.clone());
    let scan_result = scanner.scan()?;

    info!("Found {} router definition files", scan_result.definition_files.len());
    for warning in &scan_result.warnings {
        warn!("{}", warning);
    }

    if scan_result.definition_files.is_empty() {
        anyhow::bail!("No router definition files found in the routes directory");
    }

    // Step 2: Load definitions
    info!("Loading router definitions...");
    let parsed_files: Vec<ParsedFile> = DefinitionParser::parse_files(&scan_result.definition_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {:#}", e);
                None
            }
        })
        .collect();

    info!("Successfully loaded {} definitions", parsed_files.len());

    if parsed_files.is_empty() {
        anyhow::bail!("No router definitions could be loaded");
    }

    // Step 3: Visit routers and flatten routes
    info!("Extracting routes...");
    let routes = FunctionalRouteExtractor.extract_routes(&parsed_files);
    info!("Extracted {} routes", routes.len());

    // Step 4: Apply group filters
    let routes: Vec<RouteDescriptor> = match &group {
        Some(group) => {
            let kept = group.filter(routes);
            info!("Group {} documents {} routes", group.group(), kept.len());
            kept
        }
        None => routes,
    };

    if routes.is_empty() {
        warn!("No routes to document");
    }

    // Step 5: Build OpenAPI document
    info!("Building OpenAPI document...");
    let mut schema_gen = SchemaGenerator::new();
    let mut builder = OpenApiBuilder::new().with_info(args.title.clone(), args.api_version.clone(), None);
    if let Some(group) = &group {
        for customizer in group.operation_customizers() {
            builder.add_operation_customizer(customizer.clone());
        }
    }

    for route in &routes {
        builder.add_route(route, &mut schema_gen);
    }

    let mut document = builder.build(schema_gen);

    // Step 6: Customize
    if let Some(group) = &group {
        group.customize(&mut document);
    }
    if args.hateoas_links {
        HateoasLinksCustomizer.customize(&mut document);
    }

    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.definition_files.len());
    info!("  - Files loaded: {}", parsed_files.len());
    info!("  - Routes documented: {}", routes.len());
    info!("  - Paths: {}", document.paths.len());
    info!("  - Operations: {}", document.operation_count());

    Ok(document)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting OpenAPI document generation...");

    let document = generate(&args)?;

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote OpenAPI document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    Ok(())
}
