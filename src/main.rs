use log::{info, warn};
use slideshow_pager::file_utils;
use slideshow_pager::{
    CachedThumbnailSource, FileThumbnailSource, OrderMode, SlideshowConfig, SlideshowEvent,
    SlideshowService,
};
use std::path::PathBuf;

/// Command line: `<directory> [--config <file.json>] [--start <file name>]`.
struct Args {
    directory: PathBuf,
    config: Option<PathBuf>,
    start: Option<String>,
}

fn parse_args() -> Option<Args> {
    let mut args = std::env::args_os().skip(1);
    let mut directory = None;
    let mut config = None;
    let mut start = None;

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy().into_owned();
        match text.as_str() {
            "--config" => config = args.next().map(PathBuf::from),
            "--start" => start = args.next().map(|s| s.to_string_lossy().into_owned()),
            flag if flag.starts_with('-') => warn!("Ignoring unknown flag {}", flag),
            _ => directory = Some(PathBuf::from(arg)),
        }
    }

    Some(Args {
        directory: directory?,
        config,
        start,
    })
}

fn load_config(path: Option<&PathBuf>) -> Result<SlideshowConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(SlideshowConfig::from_json_str(&std::fs::read_to_string(path)?)?),
        None => Ok(SlideshowConfig::default()),
    }
}

#[async_std::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();
    #[cfg(not(debug_assertions))]
    env_logger::init();

    let Some(args) = parse_args() else {
        eprintln!("usage: slideshow-pager <directory> [--config <file.json>] [--start <file name>]");
        return Ok(());
    };

    let config = load_config(args.config.as_ref())?;
    let items = file_utils::scan_directory(&args.directory)?;
    let start = match &args.start {
        Some(name) => items.iter().find(|item| &item.name == name),
        None => items.first(),
    }
    .map(|item| item.id)
    .ok_or("no media to show")?;

    let source = CachedThumbnailSource::new(FileThumbnailSource::default());
    let mut slideshow = SlideshowService::from_items(items, start, source, config)?;
    let events = slideshow.subscribe();

    slideshow.sort(OrderMode::NewestFirst);
    slideshow.start_initial_load();
    if !slideshow.load_current_item_preview() {
        info!("Showing placeholder for {}", slideshow.current_item().name);
    }
    slideshow.wait_for_pending().await;

    // Walk to the end and back to the start, one step at a time.
    let last = slideshow.len() - 1;
    let walk = (slideshow.current_index()..last)
        .map(|index| (index + 1, index))
        .chain((1..=last).rev().map(|index| (index - 1, index)));
    for (next, current) in walk {
        slideshow.on_index_changed(next, current)?;
        slideshow.wait_for_pending().await;
        info!(
            "At {}: {} resident (bound {})",
            next,
            slideshow.resident_count(),
            slideshow.config().resident_bound()
        );
    }

    let failed = events
        .drain()
        .into_iter()
        .filter(|event| matches!(event, SlideshowEvent::Failed { .. }))
        .count();
    println!(
        "{} items, {} resident at the end, {} failed acquisitions",
        slideshow.len(),
        slideshow.resident_count(),
        failed
    );

    slideshow.dismiss();
    Ok(())
}
