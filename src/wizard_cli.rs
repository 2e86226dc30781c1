// src/wizard_cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::search_languages;
use crate::core::{ServiceClient, SessionStore};
use crate::country::convert_location_to_country;
use crate::editor::ProfileEditor;
use crate::environment::WizardConfig;
use crate::import::{BuiltinExtractor, CvImport, TextExtractor, GUIDANCE_STEPS};
use crate::router::{decide, Destination, InitOutcome, ProfileRouter, View, IMPORT_PATH};
use crate::services::{LocationService, ProfileService};
use crate::session::{NavigationEvent, Session, TerminalNavigator};
use crate::types::profile::Profile;
use crate::utils::{chunk_text, safe_json_parse, scan_basic_info, DEFAULT_CHUNK_LENGTH};

#[derive(Parser)]
#[command(name = "profile-wizard")]
#[command(about = "Import a CV and build a professional profile")]
pub struct WizardCli {
    #[command(subcommand)]
    pub command: WizardCommand,

    /// Override the session database location
    #[arg(long)]
    pub session_db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum WizardCommand {
    /// Show the session and configuration state
    Status,
    /// Authenticate and route to the right page
    Start {
        #[arg(long)]
        path: Option<String>,
    },
    /// Import a CV file (PDF, DOC, DOCX or TXT) and create the profile
    Import { file: PathBuf },
    /// Create a profile from a JSON document, possibly wrapped in other text
    ImportJson { file: PathBuf },
    /// Inspect or delete the stored profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Edit the imported profile
    Editor {
        #[command(subcommand)]
        action: EditorAction,
    },
    /// List or search supported languages
    Languages {
        #[arg(long)]
        search: Option<String>,
    },
    /// List countries and their time zones
    Timezones,
    /// List reference data used by the profile editor
    Reference {
        #[command(subcommand)]
        kind: ReferenceKind,
    },
    /// Show the location derived from the user's IP
    Location {
        #[arg(long)]
        history: bool,
        #[arg(long)]
        ip: Option<String>,
    },
    /// Split a CV into bounded chunks
    Chunk {
        file: PathBuf,
        #[arg(long, default_value_t = DEFAULT_CHUNK_LENGTH)]
        max_length: usize,
    },
    /// Run the local heuristics over a CV without calling the backend
    Scan { file: PathBuf },
    /// Clear the session and return to the host application
    Logout,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    Show,
    Exists,
    Delete,
}

#[derive(Subcommand)]
pub enum ReferenceKind {
    Industries,
    Activities,
    Skills { category: String },
}

#[derive(Subcommand)]
pub enum EditorAction {
    /// Replace the professional summary
    Summary { text: String },
    /// Ask the backend for a new summary
    Regenerate,
    /// Mark the basic profile complete and continue to the dashboard
    Complete,
}

/// Everything a command needs, wired from the configuration
pub struct WizardContext {
    pub config: WizardConfig,
    pub session: Arc<Session>,
    pub client: Arc<ServiceClient>,
    pub profiles: Arc<ProfileService>,
}

impl WizardContext {
    pub async fn open(config: WizardConfig) -> Result<Self> {
        let store = SessionStore::open(&config.session_db).await?;
        let session = Arc::new(
            Session::open(
                store,
                Arc::new(TerminalNavigator),
                config.host_app_url(),
                config.hostname(),
                config.is_secure(),
            )
            .await?,
        );
        let client = Arc::new(ServiceClient::from_config(&config, session.clone())?);
        let profiles = Arc::new(ProfileService::new(client.clone()));

        Ok(Self {
            config,
            session,
            client,
            profiles,
        })
    }

    fn router(&self, path: &str) -> ProfileRouter {
        ProfileRouter::new(self.config.clone(), self.profiles.clone(), path)
    }

    fn import_path(&self) -> String {
        format!("{}{}", self.config.base_path().trim_end_matches('/'), IMPORT_PATH)
    }
}

pub async fn handle_wizard_command(cli: WizardCli, mut config: WizardConfig) -> Result<()> {
    if let Some(path) = cli.session_db {
        config.session_db = path;
    }
    let ctx = WizardContext::open(config).await?;
    ctx.session.handle_token_removed().await?;

    match cli.command {
        WizardCommand::Status => show_status(&ctx).await?,

        WizardCommand::Start { path } => {
            let path = path.unwrap_or_else(|| ctx.import_path());
            let mut router = ctx.router(&path);
            let outcome = router.initialize().await?;
            print_outcome(&outcome);
            print_view(&router.view());
        }

        WizardCommand::Import { file } => run_import(&ctx, &file).await?,

        WizardCommand::ImportJson { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read file: {}", file.display()))?;
            let document = safe_json_parse(&content)
                .context("No usable profile document found in the file")?;
            let profile: Profile =
                serde_json::from_value(document).context("Profile document is malformed")?;

            let created = ctx.profiles.create_profile(&profile).await?;
            println!(
                "✅ Profile created: {}",
                created.id.as_deref().unwrap_or("<no id>")
            );
        }

        WizardCommand::Profile { action } => match action {
            ProfileAction::Show => match ctx.profiles.get_profile(None).await {
                Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                None => println!("❌ No profile found"),
            },
            ProfileAction::Exists => {
                let user_id = ctx.session.user_id().await?;
                let exists = ctx.client.check_profile_exists(user_id.as_deref()).await;
                println!("{}", if exists { "✅ Profile exists" } else { "❌ No profile" });
            }
            ProfileAction::Delete => {
                ctx.profiles.delete_profile().await?;
                println!("✅ Profile deleted");
            }
        },

        WizardCommand::Editor { action } => run_editor(&ctx, action).await?,

        WizardCommand::Languages { search } => {
            let languages = ctx.client.get_all_languages().await?;
            let matches = search_languages(&languages, search.as_deref().unwrap_or(""));
            println!("{:<6} {:<20} {:<20}", "Code", "Name", "Native name");
            println!("{}", "-".repeat(46));
            for language in matches {
                println!(
                    "{:<6} {:<20} {:<20}",
                    language.code, language.name, language.native_name
                );
            }
        }

        WizardCommand::Timezones => {
            let countries = ctx.client.get_timezones().await?;
            for country in countries {
                println!(
                    "{:<4} {:<30} {}",
                    country.country_code,
                    country.country_name,
                    country.timezone.as_deref().unwrap_or("")
                );
            }
        }

        WizardCommand::Reference { kind } => {
            let items = match kind {
                ReferenceKind::Industries => ctx.client.get_industries().await?,
                ReferenceKind::Activities => ctx.client.get_activities().await?,
                ReferenceKind::Skills { category } => ctx.client.get_skills(&category).await?,
            };
            for item in items {
                match &item.description {
                    Some(description) => println!("{:<30} {}", item.name, description),
                    None => println!("{}", item.name),
                }
            }
        }

        WizardCommand::Location { history, ip } => show_location(&ctx, history, ip).await?,

        WizardCommand::Chunk { file, max_length } => {
            let text = BuiltinExtractor.extract(&file).await?;
            let chunks = chunk_text(&text, max_length);
            info!("Split {} into {} chunks", file.display(), chunks.len());
            for (i, chunk) in chunks.iter().enumerate() {
                println!("--- chunk {} ({} chars) ---", i + 1, chunk.chars().count());
                println!("{}", chunk);
            }
        }

        WizardCommand::Scan { file } => {
            let text = BuiltinExtractor.extract(&file).await?;
            println!("{}", serde_json::to_string_pretty(&scan_basic_info(&text))?);
        }

        WizardCommand::Logout => {
            ctx.session.logout().await;
            println!("✅ Logged out");
        }
    }

    Ok(())
}

async fn show_status(ctx: &WizardContext) -> Result<()> {
    let user_id = ctx.session.user_id().await?;
    let has_token = ctx.session.token().await?.is_some();

    println!("Run mode:      {:?}", ctx.config.run_mode);
    println!("API:           {}", ctx.client.base_url());
    println!("Host app:      {}", ctx.session.host_app_url());
    println!("Session store: {}", ctx.session.store().database_path().display());
    println!("User id:       {}", user_id.as_deref().unwrap_or("-"));
    println!("Token:         {}", if has_token { "present" } else { "missing" });
    println!(
        "Authenticated: {}",
        if ctx.session.is_authenticated().await? { "yes" } else { "no" }
    );
    Ok(())
}

async fn run_import(ctx: &WizardContext, file: &Path) -> Result<()> {
    let mut router = ctx.router(&ctx.import_path());
    match router.initialize().await? {
        InitOutcome::Routed(Destination::Dashboard(url)) => {
            println!("✅ Profile already complete, continue at {}", url);
            return Ok(());
        }
        InitOutcome::NoUserId | InitOutcome::TokenUnavailable => {
            anyhow::bail!("Not signed in: no user id or token available");
        }
        _ => {}
    }

    println!("Welcome to the Profile Import Wizard!");
    for (i, step) in GUIDANCE_STEPS.iter().enumerate() {
        println!("  {}. {}: {}", i + 1, step.title, step.description);
    }

    let mut import = CvImport::from_config(ctx.profiles.clone(), &ctx.config);
    if let Err(e) = import.select_file(file).await {
        println!("❌ {}", e);
        return Err(e.into());
    }
    println!("✅ CV Successfully Uploaded! ({} chars)", import.text().len());

    let result = import.parse_profile().await;
    for step in import.steps() {
        let marker = if step.error { "❌" } else { "•" };
        println!("{} [{}] {}", marker, step.timestamp.format("%H:%M:%S"), step.text);
    }

    match result {
        Ok(imported) => {
            println!("\n{}\n", imported.generated_summary);
            router.handle_imported(imported);
            print_view(&router.view());
            Ok(())
        }
        Err(e) => {
            error!("Import failed: {}", e);
            Err(e.into())
        }
    }
}

async fn run_editor(ctx: &WizardContext, action: EditorAction) -> Result<()> {
    let profile = ctx
        .profiles
        .get_profile(None)
        .await
        .context("No profile to edit; import a CV first")?;
    let mut editor = ProfileEditor::from_profile(ctx.profiles.clone(), profile);

    match action {
        EditorAction::Summary { text } => {
            editor.set_summary(&text);
            editor.save().await?;
            println!("✅ Summary saved");
        }
        EditorAction::Regenerate => {
            let summary = editor.regenerate_summary().await?.to_string();
            editor.save().await?;
            println!("{}", summary);
        }
        EditorAction::Complete => {
            let profile = editor.complete().await?;
            println!("✅ Basic profile completed");
            if let Destination::Dashboard(url) = decide(Some(profile), ctx.config.dashboard_url()) {
                if !url.is_empty() {
                    ctx.session.navigator().navigate(NavigationEvent::Assign(url));
                }
            }
        }
    }
    Ok(())
}

async fn show_location(ctx: &WizardContext, history: bool, ip: Option<String>) -> Result<()> {
    if let Some(ip) = ip {
        match ctx.client.get_ip_location_info(&ip).await? {
            Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
            None => println!("❌ No location info for {}", ip),
        }
        return Ok(());
    }

    let user_id = ctx
        .session
        .user_id()
        .await?
        .context("No user id in the session")?;

    if history {
        let records = ctx.client.get_user_location_history(&user_id).await?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    let locations = LocationService::new(ctx.client.clone());
    if locations.get_user_location(Some(&user_id)).await.is_none() {
        println!("❌ No location data available");
        return Ok(());
    }

    let country = match locations.location_info().await {
        Some(info) => {
            let available = ctx.client.get_timezones().await.unwrap_or_default();
            convert_location_to_country(&info, &available)
        }
        None => locations.country_object().await,
    };
    match country {
        Some(country) => println!(
            "{} ({}) {}",
            country.country_name,
            country.country_code,
            country.timezone.as_deref().unwrap_or("")
        ),
        None => println!("❌ Location has no country"),
    }
    Ok(())
}

fn print_outcome(outcome: &InitOutcome) {
    match outcome {
        InitOutcome::AlreadyAttempted | InitOutcome::Skipped => {}
        InitOutcome::NoUserId => println!("❌ No user ID found; sign in through the host application"),
        InitOutcome::TokenUnavailable => println!("❌ Failed to obtain token"),
        InitOutcome::Routed(Destination::Dashboard(url)) => {
            println!("✅ Profile complete, continue at {}", url)
        }
        InitOutcome::Routed(Destination::Page(route)) => println!("✅ Ready: {}", route.path()),
    }
}

fn print_view(view: &View<'_>) {
    match view {
        View::Loading => println!("Loading your profile..."),
        View::Import => println!("Ready to import your CV: run `profile-wizard import <file>`"),
        View::Editor {
            profile,
            generated_summary,
        } => {
            println!("Editing profile of {}", profile.personal_info.name);
            if !generated_summary.is_empty() {
                println!("Summary: {}", generated_summary);
            }
        }
    }
}
