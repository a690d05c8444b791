use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use courseforge::config::Config;
use courseforge::curriculum::{read_curriculum, write_curriculum, CourseId, SyncGateway};
use tracing::info;

const USAGE: &str = "Usage: courseforge <fetch|push|draft> <course_id> [file]";

enum Command {
    Fetch,
    Push,
    Draft,
}

struct Args {
    command: Command,
    course_id: CourseId,
    file: PathBuf,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let command = match args.next().context("command is required")?.as_str() {
        "fetch" => Command::Fetch,
        "push" => Command::Push,
        "draft" => Command::Draft,
        other => return Err(anyhow::anyhow!("unknown command '{}'", other)),
    };
    let course_id = CourseId::new(args.next().context("course_id is required")?);
    let file = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("curriculum-{}.yaml", course_id)));

    Ok(Args {
        command,
        course_id,
        file,
    })
}

fn main() -> Result<()> {
    courseforge::logging::init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{USAGE}");
            return Err(e);
        }
    };

    let config = Config::from_env()?;
    let gateway = SyncGateway::new(config.backend());

    match args.command {
        Command::Fetch => {
            let curriculum = gateway
                .load(&args.course_id)
                .context(format!("failed to fetch curriculum for course {}", args.course_id))?;
            write_curriculum(&args.file, &curriculum)?;
            info!(file = %args.file.display(), sections = curriculum.sections.len(), "curriculum written");
        }
        Command::Push => {
            let curriculum = read_curriculum(&args.file)?;
            gateway
                .save_final(&args.course_id, &curriculum)
                .context("failed to save curriculum")?;
        }
        Command::Draft => {
            let curriculum = read_curriculum(&args.file)?;
            gateway
                .save_draft(&args.course_id, &curriculum)
                .context("failed to save draft")?;
        }
    }

    Ok(())
}
