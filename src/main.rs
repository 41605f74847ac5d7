use std::{
    env::args,
    fs::read_to_string,
    io::{self, stderr, stdin, stdout, BufRead, Write},
    process,
};

use lispy::{Config, Interpreter};

fn main() {
    init_tracing();

    let config = match Config::from_args(args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: lispy [--overflow=wrapping|checked|saturating] [--prompt=TEXT] [--quiet] [FILE...]");
            process::exit(2);
        }
    };

    let result = if config.files.is_empty() {
        repl(&config)
    } else {
        run_files(&config)
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Logging goes to stderr and is only switched on through `RUST_LOG`,
/// e.g. `RUST_LOG=lispy=debug`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn repl(config: &Config) -> io::Result<()> {
    let lispy = Interpreter::with_config(config);

    if config.banner {
        println!("Lispy Version 0.0.0.0.1");
        println!("Press Ctrl+c to Exit\n");
    }

    let mut line = String::new();
    loop {
        write!(stdout().lock(), "{}", config.prompt).and_then(|_| stdout().lock().flush())?;

        line.clear();
        match stdin().lock().read_line(&mut line) {
            Ok(0) => return Ok(()),
            Err(e) => return Err(e),
            Ok(_) if line.trim().is_empty() => continue,
            _ => (),
        }

        match lispy.evaluate_line(&line) {
            Ok(val) => writeln!(stdout().lock(), "{}", val)?,
            Err(e) => writeln!(stderr().lock(), "Error: {}", e)?,
        }
    }
}

fn run_files(config: &Config) -> io::Result<()> {
    let lispy = Interpreter::with_config(config);

    for file in &config.files {
        let source = read_to_string(file).map_err(|e| {
            io::Error::new(e.kind(), format!("could not read {}: {}", file.display(), e))
        })?;

        for result in lispy.run_source(&source) {
            if let Err(e) = result {
                writeln!(stderr().lock(), "{}: Error: {}", file.display(), e)?;
            }
        }
    }

    Ok(())
}
