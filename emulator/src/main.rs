mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use session::Session;

fn main() -> io::Result<()> {
    let store_path = parse_store_path().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: node-emulator [--store <path>]");
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new(store_path)?;
    let mut line = String::new();

    writeln!(
        writer,
        "Inertia node emulator ready. Commands: `sleep`, `stime:<seconds>`; `exit` to quit."
    )?;
    writer.flush()?;

    session.boot();

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        session.handle_line(trimmed);
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_store_path() -> Result<PathBuf, String> {
    let mut args = env::args().skip(1);
    match args.next() {
        None => Ok(PathBuf::from(".node-backup")),
        Some(arg) => {
            if let Some(value) = arg.strip_prefix("--store=") {
                Ok(PathBuf::from(value))
            } else if arg == "--store" {
                args.next()
                    .map(PathBuf::from)
                    .ok_or_else(|| "Expected value after --store".to_string())
            } else {
                Err(format!("Unknown argument `{arg}`"))
            }
        }
    }
}
