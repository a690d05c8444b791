use std::io::Write;
use std::{
    env,
    fs::{self, OpenOptions},
};

use anyhow::Context;
use courseforge::config::Config;
use courseforge::curriculum::{render_outline, CourseId, SyncGateway};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const DEFAULT_OUTPUT_DIR: &str = "output/outline";

struct Options {
    course_id: CourseId,
    output_dir: String,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> anyhow::Result<Options> {
    let course_id = args.next().context("course_id is required")?;
    let output_dir = args.next().unwrap_or(DEFAULT_OUTPUT_DIR.to_string());

    Ok(Options {
        course_id: CourseId::new(course_id),
        output_dir,
    })
}

fn main() -> anyhow::Result<()> {
    courseforge::logging::init();

    let options = match parse_options(env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Usage: export_outline <course_id> [output_dir]");
            return Err(e);
        }
    };

    let config = Config::from_env()?;
    let gateway = SyncGateway::new(config.backend());
    let curriculum = gateway.load(&options.course_id).context(format!(
        "could not fetch curriculum for course {}",
        options.course_id
    ))?;

    fs::create_dir_all(&options.output_dir).context("failed to create output directory")?;
    let path = format!("{}/course-{}.md", options.output_dir, options.course_id);
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&path)
        .context(format!("failed to open file for {}", path))?;

    let content = render_outline(&options.course_id, &curriculum)?;
    write!(file, "{}", content).context("failed to write outline")?;

    println!(
        "wrote {BOLD}{}{RESET} sections to {BOLD}{}{RESET}",
        curriculum.sections.len(),
        path
    );

    Ok(())
}
