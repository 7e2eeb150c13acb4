use std::fmt::{self, Write};

use clap::Parser;
use encore::config::get_config;
use encore::festival::{FestivalData, PerformanceIdentity};
use encore::likes::LikeStore;
use encore::time::{TimeOfDay, Weekday};
use encore::views::{
    FullScheduleView, LikedView, NowPlayingView, TimelineView, full_schedule_view, liked_view,
    now_playing_view, timeline_view,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
enum Command {
    /// Who is playing right now, per stage.
    Now {
        #[clap(long)]
        day: Option<Weekday>,
        /// Wall-clock override, e.g. 19:30.
        #[clap(long)]
        at: Option<TimeOfDay>,
    },
    /// Your liked performances.
    Liked,
    /// The complete stage x day listing.
    Schedule,
    /// Absolute-minute timeline blocks for every stage.
    Timeline {
        #[clap(long)]
        zoom: Option<f64>,
    },
    /// Toggle the liked state of a performance identity.
    Like { id: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = get_config();
    let mut likes = LikeStore::load(&config.likes_path);

    if let Command::Like { id } = &args.cmd {
        let id = PerformanceIdentity::from(id.as_str());
        let liked = likes.toggle(&id);
        println!("{} {id}", if liked { "liked" } else { "unliked" });
        return;
    }

    let data = match FestivalData::from_file(&config.schedule_path) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("could not load festival data: {err}");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    match args.cmd {
        Command::Now { day, at } => {
            let now = jiff::Zoned::now();
            let day = day.unwrap_or_else(|| Weekday::today(&now));
            let minutes = at
                .map(TimeOfDay::minutes)
                .unwrap_or(now.hour() as u32 * 60 + now.minute() as u32);
            let view = now_playing_view(&data, &likes, day, minutes, config.default_set_length_minutes);
            render_now(&view, &mut buf)
        }
        Command::Liked => render_liked(&liked_view(&data, &likes), &mut buf),
        Command::Schedule => render_schedule(&full_schedule_view(&data, &likes, &config.week()), &mut buf),
        Command::Timeline { zoom } => {
            let zoom = match zoom {
                Some(factor) => config.zoom().with_factor(factor),
                None => config.zoom(),
            };
            let view = timeline_view(
                &data,
                &likes,
                &config.week(),
                config.default_set_length_minutes,
                zoom,
            );
            render_timeline(&view, &mut buf)
        }
        Command::Like { .. } => unreachable!(),
    }
    .unwrap();
    print!("{buf}");
}

fn like_marker(liked: bool) -> &'static str {
    if liked { " *" } else { "" }
}

fn render_now(view: &NowPlayingView, out: &mut String) -> fmt::Result {
    writeln!(out, "Now playing ({})", view.day)?;
    for stage in &view.stages {
        match &stage.now_playing {
            Some(slot) => writeln!(
                out,
                "  {}: {} {}{}",
                stage.stage,
                slot.time,
                slot.artist,
                like_marker(slot.liked)
            )?,
            None => writeln!(out, "  {}: nothing right now", stage.stage)?,
        }
    }
    Ok(())
}

fn render_liked(view: &LikedView, out: &mut String) -> fmt::Result {
    if view.entries.is_empty() {
        writeln!(out, "No liked performances yet.")?;
        return Ok(());
    }
    for entry in &view.entries {
        writeln!(
            out,
            "  {} at {} ({} {})",
            entry.artist, entry.stage, entry.day, entry.time
        )?;
        writeln!(out, "    id: {}", entry.identity)?;
    }
    Ok(())
}

fn render_schedule(view: &FullScheduleView, out: &mut String) -> fmt::Result {
    writeln!(out, "{}", view.festival_name)?;
    for stage in &view.stages {
        writeln!(out, "\n{}", stage.stage)?;
        if !stage.description.is_empty() {
            writeln!(out, "  {}", stage.description)?;
        }
        for day in &stage.days {
            writeln!(out, "  {}", day.day)?;
            for slot in &day.slots {
                writeln!(
                    out,
                    "    {} {}{}  [{}]",
                    slot.time,
                    slot.artist,
                    like_marker(slot.liked),
                    slot.identity
                )?;
            }
        }
    }
    Ok(())
}

fn render_timeline(view: &TimelineView, out: &mut String) -> fmt::Result {
    writeln!(
        out,
        "Timeline (zoom {:.2}, {:.0}px wide)",
        view.zoom, view.total_width_px
    )?;
    for row in &view.rows {
        writeln!(out, "{}", row.stage)?;
        for block in &row.blocks {
            writeln!(
                out,
                "  @{:>7.0}px +{:>5.0}px  {}{}",
                block.left_px,
                block.width_px,
                block.artist,
                like_marker(block.liked)
            )?;
        }
    }
    Ok(())
}
