use clap::Parser;
use jobfilter::api::FilterModel;
use jobfilter::config::FilterConfig;
use jobfilter::error::{FilterError, Result};
use jobfilter::model::parse_jobs;
use jobfilter::registry::{FilterRegistry, ALL_RESULT_STATUSES};
use jobfilter::store::memory::InMemoryParamStore;
use std::fs;
use std::path::Path;

mod args;
mod logging;
mod print;
use args::{Cli, Commands};

type Model = FilterModel<InMemoryParamStore>;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let store = InMemoryParamStore::from_query(&cli.query)?;
    let mut model = FilterModel::new(store, config.to_registry())?;

    match cli.command {
        Commands::Show { jobs, all } => return handle_show(&model, &jobs, all),
        Commands::State => return handle_state(&model),
        Commands::Filters => {
            print::print_filters(
                &model.field_filter_entries(),
                &model.non_field_filter_entries(),
            );
            return Ok(());
        }
        Commands::Fields => {
            print::print_fields(model.registry());
            return Ok(());
        }
        Commands::Add { field, value } => model.add_filter(&field, &value)?,
        Commands::Remove { field, value } => model.remove_filter(&field, value.as_deref())?,
        Commands::Replace { field, values } => model.replace_filter(&field, values)?,
        Commands::Toggle { field, values, off } => {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            model.toggle_filters(&field, &values, !off)?
        }
        Commands::ToggleStatus { statuses } => {
            let statuses = expand_statuses(&statuses)?;
            let statuses: Vec<&str> = statuses.iter().map(String::as_str).collect();
            model.toggle_result_statuses(&statuses)?
        }
        Commands::ToggleClassified { state } => model.toggle_classified_state(state.as_str())?,
        Commands::Unclassified => model.toggle_unclassified_failures()?,
        Commands::Superseded => model.set_only_superseded()?,
        Commands::ClearFields => model.remove_all_field_filters()?,
        Commands::Reset => model.reset_non_field_filters()?,
        Commands::Clear => model.clear_all_filters()?,
    };

    print::print_query(&model.query_string());
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<FilterConfig> {
    match path {
        Some(path) if !path.exists() => Err(FilterError::Config(format!(
            "config file not found: {}",
            path.display()
        ))),
        Some(path) => FilterConfig::load_file(path),
        None => match FilterConfig::default_config_dir() {
            Some(dir) => FilterConfig::load(dir),
            None => Ok(FilterConfig::default()),
        },
    }
}

fn handle_show(model: &Model, path: &Path, all: bool) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let jobs = parse_jobs(&content)?;
    let rows: Vec<_> = jobs.iter().map(|job| (job, model.show_job(job))).collect();
    print::print_jobs(&rows, all);
    Ok(())
}

fn handle_state(model: &Model) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(model.state())?);
    Ok(())
}

/// Expand group names and check that every status is known.
fn expand_statuses(input: &[String]) -> Result<Vec<String>> {
    let mut statuses = Vec::new();
    for raw in input {
        let name = raw.to_lowercase();
        if let Some(group) = FilterRegistry::status_group(&name) {
            statuses.extend(group.iter().map(|s| s.to_string()));
        } else if ALL_RESULT_STATUSES.contains(&name.as_str()) {
            statuses.push(name);
        } else {
            return Err(FilterError::Api(format!("unknown result status: {}", raw)));
        }
    }
    Ok(statuses)
}
