use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use unpacker::{unpack, UnpackConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract original DEX files from a Jiagu-packed APK", long_about = None)]
struct Args {
    /// Path to the packed APK
    #[arg(short, long)]
    apk: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "unpacked")]
    out: PathBuf,

    /// Clear the central directory encryption flags before the first read
    /// instead of waiting for the archive reader to reject the entry
    #[arg(long)]
    force_clean: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let apk = fs::read(&args.apk).with_context(|| format!("reading {}", args.apk.display()))?;

    let config = UnpackConfig {
        force_clean: args.force_clean,
        ..UnpackConfig::default()
    };
    let app = unpack(&apk, &config)?;

    // Everything is recovered in memory before the first write.
    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    fs::write(args.out.join("shell.dex"), &app.shell_dex)?;
    fs::write(
        args.out.join("original_application.txt"),
        app.app_name.as_bytes(),
    )?;

    for (i, dex) in app.dex_files.iter().enumerate() {
        let name = if i == 0 {
            "classes.dex".to_string()
        } else {
            format!("classes{}.dex", i + 1)
        };
        fs::write(args.out.join(&name), &dex.data)?;
    }

    println!(
        "Unpacked {} -> {}",
        args.apk.display(),
        args.out.display()
    );
    println!("  original application: {}", app.app_name);
    println!("  shell dex: {} bytes", app.shell_dex.len());
    println!(
        "  recovered dex files: {} ({} with valid magic)",
        app.dex_files.len(),
        app.dex_files.iter().filter(|d| d.valid).count()
    );

    Ok(())
}
