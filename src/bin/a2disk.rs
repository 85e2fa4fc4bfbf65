use clap::{App, Arg};
use std::io::{self, Write};
use std::process;

use a2dos::disk::{Disk, Location};

// Possible exit codes
static _EXIT_SUCCESS: i32 = 0;
static EXIT_FAILURE: i32 = 1;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse command-line arguments
    let app = App::new("Apple ][ DOS 3.3 Disk Image Reader")
        .version("0.1.0")
        .about("Show the catalog of a DOS 3.3 disk image, or the contents of one file.")
        .usage(
            "a2disk <IMAGE>           -- display catalog\n    \
             a2disk <IMAGE> <FILE>    -- dump contents of file",
        )
        .arg(
            Arg::with_name("operands")
                .multiple(true)
                .help("Disk image, optionally followed by a file name"),
        )
        .arg(
            Arg::with_name("map")
                .short("m")
                .long("map")
                .help("Show the free sector map after the catalog"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Show more detail"),
        );

    let mut app_clone = app.clone();
    let matches = app.get_matches();

    let operands: Vec<&str> = matches
        .values_of("operands")
        .map(|values| values.collect())
        .unwrap_or_default();
    let result = match operands[..] {
        [diskimage] => cmd_catalog(
            diskimage,
            matches.occurrences_of("verbose"),
            matches.is_present("map"),
        ),
        [diskimage, filename] => cmd_dump(diskimage, filename),
        _ => {
            // Usage goes to standard output, and no image is opened.
            if app_clone.print_help().is_ok() {
                println!();
            }
            process::exit(EXIT_FAILURE);
        }
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(EXIT_FAILURE);
    }
}

fn cmd_catalog(diskimage: &str, verbosity: u64, map: bool) -> io::Result<()> {
    let disk = Disk::open(diskimage)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(out, "{}", disk)?;
    writeln!(out)?;
    for entry in disk.iter() {
        let entry = entry?;
        if verbosity > 0 {
            writeln!(out, " {:#}", entry)?;
            if verbosity > 1 {
                let file = disk.open_file_from_entry(&entry);
                writeln!(
                    out,
                    "     sectors: {}",
                    Location::format_locations(&file.occupied_sectors()?)
                )?;
            }
        } else {
            writeln!(out, " {}", entry)?;
        }
    }
    writeln!(out)?;
    if map {
        write!(out, "{:?}", disk.bam())?;
    }
    Ok(())
}

fn cmd_dump(diskimage: &str, filename: &str) -> io::Result<()> {
    let disk = Disk::open(diskimage)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    disk.render_file(filename, &mut out)
}
