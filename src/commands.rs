use std::path::{Path, PathBuf};

use mlcatalog::config::{default_config_path, ensure_db_dir, write_config, CatalogConfig};
use mlcatalog::secrets::{self, SecretProfile};
use mlcatalog::storage::schema::ALL_TABLES;
use mlcatalog::ui::{self, Icons};
use mlcatalog::{CatalogLoader, CatalogStore, LoadReport, QueryEngine, ReferenceCheck, SeedSet};
use serde::Serialize;

use crate::OutputFormat;

/// Resolved settings shared by every subcommand
pub struct Context {
    pub database: PathBuf,
    pub config: CatalogConfig,
    pub format: OutputFormat,
}

impl Context {
    fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Open a catalog that must already exist; never creates a file
    fn open_existing(&self) -> anyhow::Result<CatalogStore> {
        if !self.database.exists() {
            anyhow::bail!(
                "database not found at {} (run `mlcatalog setup` first)",
                self.database.display()
            );
        }
        Ok(CatalogStore::open(&self.database)?)
    }

    fn open_with_schema(&self) -> anyhow::Result<CatalogStore> {
        ensure_db_dir(&self.database)?;
        let store = CatalogStore::open(&self.database)?;
        store.ensure_schema()?;
        Ok(store)
    }
}

fn emit_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(title: &str, table: String) {
    ui::section(title);
    if table.is_empty() {
        println!("{}", ui::dim("No results found."));
    } else {
        println!("{}", table);
    }
}

pub fn run_init(
    ctx: &Context,
    config_path: Option<&Path>,
    env_file: Option<PathBuf>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let config = CatalogConfig {
        database: Some(ctx.database.display().to_string()),
        env_file: Some(ctx.config.env_file_path(env_file.as_deref()).display().to_string()),
    };
    write_config(&path, &config, force)?;
    ctx.open_with_schema()?.close()?;

    if ctx.is_json() {
        return emit_json(&serde_json::json!({
            "config": path.display().to_string(),
            "database": ctx.database.display().to_string(),
        }));
    }
    ui::success(&format!("Wrote {}", path.display()));
    ui::status(Icons::DATABASE, "Database", &ctx.database.display().to_string());
    Ok(())
}

pub fn run_schema(ctx: &Context) -> anyhow::Result<()> {
    ctx.open_with_schema()?.close()?;

    if ctx.is_json() {
        return emit_json(&serde_json::json!({
            "database": ctx.database.display().to_string(),
            "tables": ALL_TABLES,
        }));
    }
    ui::success(&format!("Schema ready ({} tables)", ALL_TABLES.len()));
    ui::status(Icons::DATABASE, "Database", &ctx.database.display().to_string());
    Ok(())
}

fn apply_sets(
    ctx: &Context,
    store: &mut CatalogStore,
    sets: &[SeedSet],
    check: ReferenceCheck,
) -> anyhow::Result<Vec<LoadReport>> {
    let mut loader = CatalogLoader::new(store).with_reference_check(check);
    let mut reports = Vec::new();
    for set in sets {
        if !ctx.is_json() {
            ui::phase(&format!("Loading seed set '{}'", set.name));
        }
        let batch = set.apply(&mut loader)?;
        if !ctx.is_json() {
            batch.iter().for_each(ui::load_report);
        }
        reports.extend(batch);
    }
    Ok(reports)
}

pub fn run_seed(
    ctx: &Context,
    set: Option<&str>,
    file: Option<&Path>,
    check: ReferenceCheck,
) -> anyhow::Result<()> {
    let sets = match (set, file) {
        (_, Some(path)) => vec![SeedSet::from_path(path)?],
        (Some(name), None) => vec![SeedSet::builtin(name)?],
        (None, None) => SeedSet::all_builtin()?,
    };

    let mut store = ctx.open_existing()?;
    let reports = apply_sets(ctx, &mut store, &sets, check)?;

    if ctx.is_json() {
        return emit_json(&reports);
    }
    let written: usize = reports.iter().map(|r| r.written).sum();
    ui::success(&format!("Seeding complete: {} rows written", written));
    Ok(())
}

pub fn run_setup(ctx: &Context, env_file: Option<&Path>) -> anyhow::Result<()> {
    if !ctx.is_json() {
        ui::header("Setting up ML technologies catalog");
    }
    let mut store = ctx.open_with_schema()?;
    let reports = apply_sets(ctx, &mut store, &SeedSet::all_builtin()?, ReferenceCheck::Off)?;

    let mut provisioned = Vec::new();
    if let Some(path) = env_file {
        for profile in SecretProfile::ALL {
            let written = secrets::provision(path, profile)?;
            provisioned.extend(written.into_iter().map(|s| s.key));
        }
    }

    let summary = QueryEngine::new(&store).catalog_summary()?;
    if ctx.is_json() {
        return emit_json(&serde_json::json!({
            "database": ctx.database.display().to_string(),
            "loads": reports,
            "secrets": provisioned,
            "summary": summary,
        }));
    }

    if let Some(path) = env_file {
        ui::status(
            Icons::KEY,
            "Secrets",
            &format!("{} settings written to {}", provisioned.len(), path.display()),
        );
    }
    print_summary(&summary);
    ui::success("Catalog setup complete");
    ui::status(Icons::DATABASE, "Database", &ctx.database.display().to_string());
    Ok(())
}

pub fn run_secrets(ctx: &Context, profile: SecretProfile, path: &Path) -> anyhow::Result<()> {
    let written = secrets::provision(path, profile)?;
    let keys: Vec<&str> = written.iter().map(|s| s.key).collect();

    // Values stay in the settings file; only names are reported
    if ctx.is_json() {
        return emit_json(&serde_json::json!({
            "profile": profile.as_str(),
            "path": path.display().to_string(),
            "keys": keys,
        }));
    }
    ui::success(&format!(
        "Wrote {} '{}' settings to {}",
        keys.len(),
        profile,
        path.display()
    ));
    for key in keys {
        ui::summary_row(Icons::KEY, key);
    }
    Ok(())
}

pub fn run_organizations(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let organizations = QueryEngine::new(&store).list_organizations()?;

    if ctx.is_json() {
        return emit_json(&organizations);
    }
    print_table("Companies", ui::organizations_table(&organizations));
    Ok(())
}

pub fn run_technologies(ctx: &Context, company: Option<&str>) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let technologies = QueryEngine::new(&store).list_technologies(company)?;

    if ctx.is_json() {
        return emit_json(&technologies);
    }
    let title = match company {
        Some(name) => format!("ML Technologies for {}", name),
        None => "All ML Technologies".to_string(),
    };
    print_table(&title, ui::technologies_table(&technologies));
    Ok(())
}

pub fn run_categories(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let categories = QueryEngine::new(&store).list_categories()?;

    if ctx.is_json() {
        return emit_json(&categories);
    }
    print_table("Technology Categories", ui::categories_table(&categories));
    Ok(())
}

pub fn run_stats(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let engine = QueryEngine::new(&store);
    let organizations = engine.organization_statistics()?;
    let types = engine.technology_type_distribution()?;

    if ctx.is_json() {
        return emit_json(&serde_json::json!({
            "organizations": organizations,
            "technology_types": types,
        }));
    }
    print_table("Company Statistics", ui::organization_stats_table(&organizations));
    print_table("Technology Type Distribution", ui::type_distribution_table(&types));
    Ok(())
}

pub fn run_search(ctx: &Context, keyword: &str) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let results = QueryEngine::new(&store).search_technologies(keyword)?;

    if ctx.is_json() {
        return emit_json(&results);
    }
    ui::status(Icons::SEARCH, "Keyword", keyword);
    print_table(
        &format!("Search results ({})", results.len()),
        ui::technologies_table(&results),
    );
    Ok(())
}

pub fn run_equipment(ctx: &Context, category: Option<&str>) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let equipment = QueryEngine::new(&store).list_equipment(category)?;

    if ctx.is_json() {
        return emit_json(&equipment);
    }
    print_table("Equipment", ui::equipment_table(&equipment));
    Ok(())
}

pub fn run_flight_control(ctx: &Context, open_source_only: bool) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let systems = QueryEngine::new(&store).list_flight_control_systems(open_source_only)?;

    if ctx.is_json() {
        return emit_json(&systems);
    }
    print_table("Flight Control Systems", ui::flight_control_table(&systems));
    Ok(())
}

pub fn run_sensors(ctx: &Context, sensor_type: Option<&str>) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let sensors = QueryEngine::new(&store).list_sensors(sensor_type)?;

    if ctx.is_json() {
        return emit_json(&sensors);
    }
    print_table("Sensors", ui::sensors_table(&sensors));
    Ok(())
}

pub fn run_dangling(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let dangling = QueryEngine::new(&store).dangling_technologies()?;

    if ctx.is_json() {
        return emit_json(&dangling);
    }
    if dangling.is_empty() {
        ui::success("Every technology names a known organization");
        return Ok(());
    }
    ui::warn(&format!("{} technologies reference unknown organizations", dangling.len()));
    print_table("Unlinked Technologies", ui::technologies_table(&dangling));
    Ok(())
}

fn print_summary(summary: &mlcatalog::query::CatalogSummary) {
    ui::section("Catalog Summary");
    println!(
        "{}",
        ui::stats_table(&[
            ("Companies", &summary.organizations.to_string()),
            ("Technology Categories", &summary.categories.to_string()),
            ("ML Technologies", &summary.technologies.to_string()),
            ("Equipment", &summary.equipment.to_string()),
            ("Flight Control Systems", &summary.flight_control_systems.to_string()),
            ("Sensors", &summary.sensors.to_string()),
        ])
    );
}

pub fn run_summary(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let summary = QueryEngine::new(&store).catalog_summary()?;

    if ctx.is_json() {
        return emit_json(&summary);
    }
    print_summary(&summary);
    Ok(())
}

/// Every listing and statistic in one pass
pub fn run_report(ctx: &Context, company: &str, keyword: &str) -> anyhow::Result<()> {
    let store = ctx.open_existing()?;
    let engine = QueryEngine::new(&store);

    let organizations = engine.list_organizations()?;
    let categories = engine.list_categories()?;
    let technologies = engine.list_technologies(None)?;
    let stats = engine.organization_statistics()?;
    let types = engine.technology_type_distribution()?;
    let featured = engine.list_technologies(Some(company))?;
    let matches = engine.search_technologies(keyword)?;

    if ctx.is_json() {
        return emit_json(&serde_json::json!({
            "organizations": organizations,
            "categories": categories,
            "technologies": technologies,
            "organization_statistics": stats,
            "technology_types": types,
            "featured": { "company": company, "technologies": featured },
            "search": { "keyword": keyword, "results": matches },
        }));
    }

    ui::header("ML Technologies Catalog Report");
    print_table("Companies", ui::organizations_table(&organizations));
    print_table("Technology Categories", ui::categories_table(&categories));
    print_table("All ML Technologies", ui::technologies_table(&technologies));
    print_table("Company Statistics", ui::organization_stats_table(&stats));
    print_table("Technology Type Distribution", ui::type_distribution_table(&types));
    print_table(
        &format!("{} Technologies", company),
        ui::technologies_table(&featured),
    );
    print_table(
        &format!("Search results for '{}'", keyword),
        ui::technologies_table(&matches),
    );

    println!();
    ui::status(Icons::DATABASE, "Database", &ctx.database.display().to_string());
    ui::status(
        Icons::KEY,
        "Environment file",
        &ctx.config.env_file_path(None).display().to_string(),
    );
    Ok(())
}
