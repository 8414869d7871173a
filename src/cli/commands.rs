use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::app::{AppContext, DiaryError, Result};
use crate::domain::OrderedSource;
use crate::sources::{fetch_catalog, AppState, SourceRefresh};

async fn load_sources(ctx: &AppContext) -> Result<Vec<OrderedSource>> {
    fetch_catalog(ctx.fetcher.as_ref(), &ctx.network.catalog_url, &ctx.prefs).await
}

pub async fn list_sources(ctx: &AppContext) -> Result<()> {
    let sources = load_sources(ctx).await?;

    if sources.is_empty() {
        println!("No sources");
        return Ok(());
    }

    for source in sources {
        let marker = if source.enabled { "[x]" } else { "[ ]" };
        println!("{} {}\n    {}", marker, source.name(), source.href());
    }

    Ok(())
}

pub async fn show_headlines(ctx: &AppContext, name: &str, page: u32, share: bool) -> Result<()> {
    let controller = load_page(ctx, name, page).await?;

    if let Some(banner) = controller.error_banner() {
        eprintln!("{}", banner);
        return Ok(());
    }

    let lines = if share {
        share_lines(&controller)
    } else {
        page_lines(&controller, Local::now().date_naive(), Utc::now())
    };
    for line in lines {
        println!("{}", line);
    }

    Ok(())
}

/// Fetch page `page` of the named source.
async fn load_page(ctx: &AppContext, name: &str, page: u32) -> Result<SourceRefresh> {
    let source = load_sources(ctx)
        .await?
        .into_iter()
        .find(|source| source.name() == name)
        .ok_or_else(|| DiaryError::SourceNotFound(name.to_string()))?;

    // Asking for a source by name shows it even when it is disabled
    let source = OrderedSource {
        enabled: true,
        ..source
    };
    let mut controller = SourceRefresh::new(source, ctx.policy, AppState::Active);

    let mut request = controller.mount();
    for _ in 0..page {
        request = controller.next();
    }
    controller.resolve(ctx.fetcher.as_ref(), request).await;

    Ok(controller)
}

pub async fn digest(ctx: &AppContext) -> Result<()> {
    let mut controllers: Vec<SourceRefresh> = load_sources(ctx)
        .await?
        .into_iter()
        .filter(|source| source.enabled)
        .map(|source| SourceRefresh::new(source, ctx.policy, AppState::Active))
        .collect();

    if controllers.is_empty() {
        println!("No enabled sources");
        return Ok(());
    }

    let requests = controllers.iter_mut().filter_map(|c| c.mount()).collect();
    let results = ctx.parallel_fetcher.fetch_all(requests).await;

    let now = Utc::now();
    for (request, result) in results {
        if let Some(controller) = controllers.iter_mut().find(|c| c.name() == request.source) {
            controller.complete(request.seq, result, now);
        }
    }

    let today = Local::now().date_naive();
    let mut errors = 0;
    for controller in &controllers {
        println!("== {} ==", controller.name());
        if let Some(banner) = controller.error_banner() {
            errors += 1;
            eprintln!("  {}", banner);
            continue;
        }
        for line in page_lines(controller, today, now) {
            println!("{}", line);
        }
        println!();
    }

    println!(
        "Digest complete: {} sources, {} errors",
        controllers.len(),
        errors
    );
    Ok(())
}

pub async fn set_source(ctx: &AppContext, name: &str, enabled: bool) -> Result<()> {
    if enabled {
        ctx.prefs.set_enabled(name).await?;
        println!("Enabled {}", name);
    } else {
        ctx.prefs.set_disabled(name).await?;
        println!("Disabled {}", name);
    }
    Ok(())
}

pub async fn clear_selections(ctx: &AppContext) -> Result<()> {
    ctx.prefs.clear_all().await?;
    println!("Cleared all source selections; catalog defaults apply again");
    Ok(())
}

pub fn print_links(ctx: &AppContext) {
    println!("Contact:   {}", ctx.network.contact_url);
    println!("Subscribe: {}", ctx.network.subscribe_url);
}

fn page_lines(controller: &SourceRefresh, today: NaiveDate, now: DateTime<Utc>) -> Vec<String> {
    let Some(rows) = controller.visible_headlines() else {
        if controller.shows_no_data() {
            return vec![controller.no_data_message()];
        }
        return Vec::new();
    };

    let mut lines = Vec::new();
    if let Some(hint) = controller.header_hint(now) {
        lines.push(hint);
    }
    for headline in rows {
        lines.push(format!(
            "{}  {}",
            SourceRefresh::date_label(headline, today),
            headline.title
        ));
        lines.push(format!("    {}", headline.url));
    }
    lines
}

fn share_lines(controller: &SourceRefresh) -> Vec<String> {
    controller
        .visible_headlines()
        .unwrap_or_default()
        .iter()
        .map(|headline| headline.share_message(controller.name()))
        .collect()
}
