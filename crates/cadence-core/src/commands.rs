use std::thread;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info, instrument};

use crate::bucket::{list_view, posts_for_day, posts_for_week, posts_in_range, summarize_posts};
use crate::cli::{Command, FilterArgs, ViewArgs};
use crate::config::Config;
use crate::datastore::PostStore;
use crate::datetime::{parse_date_expr, today_in_project};
use crate::filter::filter_posts;
use crate::grid::month_grid_with_posts;
use crate::navigation::ViewMode;
use crate::post::ContentPost;
use crate::render::Renderer;
use crate::reveal::{RevealPanel, RevealTick};
use crate::sample::sample_posts;
use crate::view_state::{Action, ViewState};

#[instrument(skip(store, cfg, renderer, command))]
pub fn dispatch(
    store: &PostStore,
    cfg: &Config,
    renderer: &mut Renderer,
    command: Option<Command>,
) -> anyhow::Result<()> {
    let today = today_in_project(Utc::now());

    let command = match command {
        Some(command) => command,
        None => {
            let mode = cfg.default_view()?;
            debug!(mode = mode.as_key(), "no command given, using default.view");
            match mode {
                ViewMode::Month => Command::Month(ViewArgs::default()),
                ViewMode::Week => Command::Week(ViewArgs::default()),
                ViewMode::List => Command::List(FilterArgs::default()),
            }
        }
    };

    match command {
        Command::Month(args) => {
            let view = view_state_for(&args, ViewMode::Month, today)?;
            cmd_month(store, renderer, &view)
        }
        Command::Week(args) => {
            let view = view_state_for(&args, ViewMode::Week, today)?;
            cmd_week(store, renderer, &view)
        }
        Command::Day(args) => {
            let view = view_state_for(&args, ViewMode::Month, today)?;
            cmd_day(store, renderer, &view)
        }
        Command::List(args) => {
            let view = ViewState::new(today)
                .reduce(Action::SetViewMode(ViewMode::List))
                .reduce(Action::SetFilter(args.to_filter_state()));
            cmd_list(store, renderer, &view)
        }
        Command::Init { force } => cmd_init(store, renderer, today, force),
        Command::Reveal { text } => cmd_reveal(cfg, renderer, &text.join(" ")),
    }
}

fn view_state_for(args: &ViewArgs, mode: ViewMode, today: NaiveDate) -> anyhow::Result<ViewState> {
    let reference = parse_date_expr(&args.date, today)
        .with_context(|| format!("invalid --date value: {}", args.date))?;

    Ok(ViewState::new(reference)
        .reduce(Action::SetViewMode(mode))
        .reduce(Action::SetFilter(args.filter.to_filter_state())))
}

fn load_filtered<'a>(posts: &'a [ContentPost], view: &ViewState) -> Vec<&'a ContentPost> {
    let filtered = filter_posts(posts, &view.filter);
    info!(total = posts.len(), shown = filtered.len(), "applied filters");
    filtered
}

#[instrument(skip(store, renderer, view))]
fn cmd_month(store: &PostStore, renderer: &mut Renderer, view: &ViewState) -> anyhow::Result<()> {
    let posts = store.load_posts()?;
    let filtered = load_filtered(&posts, view);
    let reference = view.navigation.reference_date();

    let cells = month_grid_with_posts(&filtered, reference.year(), reference.month0());
    renderer.print_month(&view.navigation.title(), &cells)?;

    let (start, end) = view
        .navigation
        .displayed_range()
        .ok_or_else(|| anyhow!("month view has no date range"))?;
    let in_month = list_view(&posts_in_range(&filtered, start, end));
    renderer.print_line("")?;
    renderer.print_summary(&summarize_posts(&in_month))?;
    renderer.print_posts("Posts this month", &in_month)
}

#[instrument(skip(store, renderer, view))]
fn cmd_week(store: &PostStore, renderer: &mut Renderer, view: &ViewState) -> anyhow::Result<()> {
    let posts = store.load_posts()?;
    let filtered = load_filtered(&posts, view);

    let bucket = list_view(&posts_for_week(&filtered, view.navigation.reference_date()));
    renderer.print_summary(&summarize_posts(&bucket))?;
    renderer.print_posts(&view.navigation.title(), &bucket)
}

#[instrument(skip(store, renderer, view))]
fn cmd_day(store: &PostStore, renderer: &mut Renderer, view: &ViewState) -> anyhow::Result<()> {
    let posts = store.load_posts()?;
    let filtered = load_filtered(&posts, view);
    let day = view.navigation.reference_date();

    let bucket = list_view(&posts_for_day(&filtered, day.year(), day.month0(), day.day()));
    renderer.print_posts(&format!("Day View {}", day.format("%A, %Y-%m-%d")), &bucket)
}

#[instrument(skip(store, renderer, view))]
fn cmd_list(store: &PostStore, renderer: &mut Renderer, view: &ViewState) -> anyhow::Result<()> {
    let posts = store.load_posts()?;
    let filtered = load_filtered(&posts, view);

    let ordered = list_view(&filtered);
    renderer.print_summary(&summarize_posts(&ordered))?;
    renderer.print_posts(&view.navigation.title(), &ordered)
}

#[instrument(skip(store, renderer))]
fn cmd_init(
    store: &PostStore,
    renderer: &mut Renderer,
    today: NaiveDate,
    force: bool,
) -> anyhow::Result<()> {
    if store.has_posts_file() && !force {
        return Err(anyhow!(
            "{} already exists; pass --force to overwrite",
            store.posts_path.display()
        ));
    }

    let posts = sample_posts(today);
    store.save_posts(&posts)?;
    info!(count = posts.len(), "wrote sample posts");
    renderer.print_line(&format!(
        "Wrote {} sample posts to {}",
        posts.len(),
        store.posts_path.display()
    ))
}

#[instrument(skip(cfg, renderer, text))]
fn cmd_reveal(cfg: &Config, renderer: &mut Renderer, text: &str) -> anyhow::Result<()> {
    let interval = Duration::from_millis(cfg.reveal_interval_ms()?);
    let mut panel = RevealPanel::new();
    let generation = panel.start(text);
    debug!(generation, "revealing text");

    let mut shown = 0;
    while let Some(tick) = panel.tick() {
        let revealed = panel.revealed().unwrap_or_default();
        renderer.print_fragment(&revealed[shown..])?;
        shown = revealed.len();

        match tick {
            RevealTick::Advanced => thread::sleep(interval),
            RevealTick::Finished | RevealTick::Cancelled => break,
        }
    }
    renderer.print_line("")
}
