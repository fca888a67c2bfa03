use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use degree_planner::extract::{self, ParseOptions, ParseStatus, ScrapedCourse};
use dotenvy::dotenv;
use serde::Serialize;

struct Args {
    data_dir: PathBuf,
    /// `--write DIR`; without it nothing is written.
    write_to: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut data_dir = None;
    let mut write_to = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--write" {
            write_to = args.next().map(PathBuf::from);
        } else if data_dir.is_none() {
            data_dir = Some(PathBuf::from(arg));
        }
    }

    Args {
        data_dir: data_dir
            .or_else(|| env::var("DATA_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("./_context")),
        write_to,
    }
}

#[derive(Serialize)]
struct Dump<'a> {
    semester: &'a str,
    totals: &'a BTreeMap<String, f64>,
    courses: &'a [ScrapedCourse],
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let args = parse_args();
    let options = ParseOptions {
        line_match_fallback: env::var("LINE_MATCH_FALLBACK").is_ok_and(|v| v == "1" || v == "true"),
        ..ParseOptions::default()
    };

    let parsed = extract::parse_directory(&args.data_dir, &options)?;

    for report in &parsed.reports {
        match report.status {
            ParseStatus::Success => println!("{:<40} {:>4} courses", report.filename, report.courses_found),
            ParseStatus::Error => println!(
                "{:<40} ERROR {}",
                report.filename,
                report.error.as_deref().unwrap_or_default()
            ),
        }
    }

    for file in &parsed.files {
        let stem = Path::new(&file.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&file.filename);
        let dump = Dump {
            semester: &file.semester,
            totals: &file.totals,
            courses: &file.courses,
        };

        match &args.write_to {
            Some(out) => {
                std::fs::create_dir_all(out)?;
                let path = out.join(format!("{}.json", stem));
                std::fs::write(&path, serde_json::to_string_pretty(&dump)?)?;
                println!("Wrote {}", path.display());
            }
            None => println!("[DRY RUN] Would write {}.json ({} courses)", stem, file.courses.len()),
        }
    }

    println!("Credit totals:");
    for (category, credits) in &parsed.totals {
        println!("  {:<30} {:>6.1}", category, credits);
    }
    println!(
        "Unique course codes: {} / {}",
        parsed.dedupe_by_code().len(),
        parsed.courses().count()
    );

    Ok(())
}
