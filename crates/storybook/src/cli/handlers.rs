//! Command handlers.

use super::commands::{Commands, OutputFormat, SettingsCommands};
use std::path::PathBuf;
use std::sync::Arc;
use storybook::{
    HttpGateway, HttpTransport, ImageEngine, ImageGeneratorChain, JsonError, ListQuery,
    LocalSettingsStore, Orchestrator, ProviderTransport, ProxyClient, ProxyStoryGenerator, Store,
    StoryRequest, StorybookResult, ValidationError, wait_for_push,
};
use tracing::warn;

/// Everything a command needs: the gateway, a proxy transport and the store.
pub struct Context {
    server: String,
    gateway: Arc<HttpGateway>,
    transport: Arc<dyn ProviderTransport>,
    store: Store,
}

impl Context {
    /// Context for the server at `server`, with settings in `settings_dir`.
    ///
    /// When the settings directory is unusable the CLI still runs with
    /// default, unsaved settings.
    pub fn new(server: &str, settings_dir: Option<PathBuf>) -> Self {
        let gateway = Arc::new(HttpGateway::new(server));
        let local = match settings_dir {
            Some(dir) => LocalSettingsStore::open(dir),
            None => LocalSettingsStore::open_default(),
        };

        let mut store = Store::new(gateway.clone()).with_shared_settings(gateway.clone());
        match local {
            Ok(local) => store = store.with_local_settings(local),
            Err(e) => warn!(error = %e, "Local settings unavailable; using defaults"),
        }

        Self {
            server: server.to_string(),
            gateway,
            transport: Arc::new(HttpTransport::new()),
            store,
        }
    }

    fn client(&self) -> ProxyClient {
        let settings = &self.store.state().settings;
        ProxyClient::new(self.transport.clone(), self.server.clone()).with_keys(
            settings.gemini_api_key.clone(),
            settings.freepik_api_key.clone(),
        )
    }

    fn orchestrator(&self, engine: Option<ImageEngine>) -> Orchestrator {
        let mut settings = self.store.state().settings.clone();
        if let Some(engine) = engine {
            settings.image_engine = engine;
        }
        let client = self.client();
        Orchestrator::new(
            Arc::new(ProxyStoryGenerator::new(client.clone())),
            Arc::new(ImageGeneratorChain::for_engines(&settings.engine_chain(), client)),
            self.gateway.clone(),
        )
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> StorybookResult<String> {
    Ok(serde_json::to_string_pretty(value).map_err(|e| JsonError::encode("output", e))?)
}

/// Run one command.
pub async fn handle_command(ctx: &mut Context, command: Commands) -> StorybookResult<()> {
    match command {
        Commands::Generate {
            theme,
            character,
            age,
            moral,
            genre,
            style,
            character_type,
            language,
            engine,
        } => {
            let mut request = StoryRequest::new(theme)
                .with_main_character(character)
                .with_target_age(age)
                .with_moral_value(moral)
                .with_language(language);
            request.genre = genre;
            request.illustration_style = style;
            request.character_type = character_type;
            generate(ctx, &request, engine).await
        }

        Commands::List {
            sort_by,
            order,
            format,
        } => {
            let query = ListQuery { sort_by, order };
            list(ctx, &query, format).await
        }

        Commands::Show { id } => show(ctx, &id).await,

        Commands::Redraw { id, page } => redraw(ctx, &id, page).await,

        Commands::Delete { id, all } => delete(ctx, id, all).await,

        Commands::Check => {
            ctx.store.refresh_books(&ListQuery::default()).await?;
            println!("Server at {} is reachable", ctx.server);
            ctx.client().test_connection().await?;
            println!("Text model answered through the proxy");
            Ok(())
        }

        Commands::Settings(cmd) => handle_settings(ctx, cmd).await,
    }
}

async fn generate(
    ctx: &mut Context,
    request: &StoryRequest,
    engine: Option<ImageEngine>,
) -> StorybookResult<()> {
    let orchestrator = ctx.orchestrator(engine);
    println!("Writing a story about '{}'...", request.theme);
    let report = ctx.store.generate_book(request, &orchestrator).await?;

    let book = report.book();
    println!("Saved '{}' ({})", book.title, book.id);
    println!("{} pages", book.pages.len());
    for failure in report.failed_pages() {
        println!("  page {} has no illustration: {}", failure.page_number, failure.message);
    }
    if report.is_partial() {
        println!("Use `storybook redraw {} --page N` to retry missing illustrations", book.id);
    }
    Ok(())
}

async fn list(ctx: &mut Context, query: &ListQuery, format: OutputFormat) -> StorybookResult<()> {
    ctx.store.refresh_books(query).await?;
    let books = ctx.store.state().visible_books();

    match format {
        OutputFormat::Json => println!("{}", to_json(&books)?),
        OutputFormat::Human => {
            println!("{:<38} {:<32} {:<8} Created", "ID", "Title", "Age");
            println!("{:-<100}", "");
            for book in &books {
                let created = book
                    .created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{:<38} {:<32} {:<8} {}", book.id, book.title, book.target_age, created);
            }
            println!("Total: {} books", books.len());
        }
    }
    Ok(())
}

async fn show(ctx: &mut Context, id: &str) -> StorybookResult<()> {
    ctx.store.open_book(id).await?;
    if let Some(book) = &ctx.store.state().current_book {
        println!("{}", to_json(book)?);
    }
    Ok(())
}

async fn redraw(ctx: &mut Context, id: &str, page: i32) -> StorybookResult<()> {
    ctx.store.open_book(id).await?;
    let orchestrator = ctx.orchestrator(None);
    ctx.store.regenerate_page_image(page, &orchestrator).await?;
    ctx.store.save_current_book().await?;
    println!("Redrew page {} of {}", page, id);
    Ok(())
}

async fn delete(ctx: &mut Context, id: Option<String>, all: bool) -> StorybookResult<()> {
    if all {
        ctx.store.refresh_books(&ListQuery::default()).await?;
        let deleted = ctx
            .store
            .delete_all_books()
            .await
            .ok_or_else(|| ValidationError::new("failed to delete books"))?;
        println!("Deleted {} books", deleted);
        return Ok(());
    }

    let id = id.ok_or_else(|| ValidationError::new("a book id or --all is required"))?;
    if ctx.store.delete_book(&id).await {
        println!("Deleted {}", id);
    } else if let Some(failure) = ctx.store.state().failed_deletes.last() {
        eprintln!("Failed to delete {}: {}", failure.id, failure.message);
    }
    Ok(())
}

async fn handle_settings(ctx: &mut Context, cmd: SettingsCommands) -> StorybookResult<()> {
    match cmd {
        SettingsCommands::Show => {
            println!("{}", to_json(&ctx.store.state().settings)?);
        }

        SettingsCommands::Brand {
            name,
            logo,
            logo_url,
        } => {
            if let Some(push) = ctx.store.set_brand(name, logo, logo_url) {
                // The process exits right after; let the push finish.
                wait_for_push(push).await;
            }
            println!("Brand updated");
        }

        SettingsCommands::Engine { engine } => {
            if let Some(push) = ctx.store.set_image_engine(engine) {
                wait_for_push(push).await;
            }
            println!("Image engine set to {}", engine);
        }

        SettingsCommands::Keys { gemini, freepik } => {
            let settings = &ctx.store.state().settings;
            let gemini = gemini.or_else(|| settings.gemini_api_key.clone());
            let freepik = freepik.or_else(|| settings.freepik_api_key.clone());
            ctx.store.set_api_keys(gemini, freepik);
            println!("Keys updated");
        }

        SettingsCommands::Validate { key } => {
            let key = key
                .or_else(|| ctx.store.state().settings.gemini_api_key.clone())
                .unwrap_or_default();
            let client = ctx.client();
            let result = ctx.store.validate_gemini_key(&client, &key).await;
            let mark = if result.valid { "valid" } else { "invalid" };
            println!("{}: {}", mark, result.message);
        }

        SettingsCommands::Pull => {
            ctx.store.load_shared_settings().await?;
            println!("{}", to_json(&ctx.store.state().settings)?);
        }
    }
    Ok(())
}
